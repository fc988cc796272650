use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use edon_core::{ReasonCode, Verdict};
use serde::Serialize;

const MAX_LATENCY_SAMPLES: usize = 1_000;

/// JSON-serializable point-in-time view returned by `GET /metrics`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct MetricsSnapshot {
    pub uptime_seconds: u64,
    pub decisions_allow: u64,
    pub decisions_degrade: u64,
    pub decisions_escalate: u64,
    pub decisions_block: u64,
    pub decisions_pause: u64,
    pub rate_limit_hits: u64,
    pub requests_total: u64,
    pub p50_latency_ms: u64,
    pub p95_latency_ms: u64,
    pub p99_latency_ms: u64,
}

fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Allow => "allow",
        Verdict::Degrade => "degrade",
        Verdict::Escalate => "escalate",
        Verdict::Block => "block",
        Verdict::Pause => "pause",
    }
}

fn reason_code_label(reason_code: ReasonCode) -> &'static str {
    match reason_code {
        ReasonCode::Approved => "approved",
        ReasonCode::DegradedToSafeAlternative => "degraded_to_safe_alternative",
        ReasonCode::NeedConfirmation => "need_confirmation",
        ReasonCode::IntentNotApproved => "intent_not_approved",
        ReasonCode::ScopeViolation => "scope_violation",
        ReasonCode::RiskTooHigh => "risk_too_high",
        ReasonCode::DataExfil => "data_exfil",
        ReasonCode::OutOfHours => "out_of_hours",
        ReasonCode::LoopDetected => "loop_detected",
        ReasonCode::RateLimit => "rate_limit",
    }
}

/// Aggregate in-process counters exposed on `/metrics` (spec.md §4.12).
/// Counters use relaxed ordering; call [`snapshot`](Self::snapshot) for a
/// consistent point-in-time view.
pub struct Metrics {
    started_at: Instant,
    decisions_allow: AtomicU64,
    decisions_degrade: AtomicU64,
    decisions_escalate: AtomicU64,
    decisions_block: AtomicU64,
    decisions_pause: AtomicU64,
    reason_counts: [AtomicU64; 10],
    rate_limit_hits: AtomicU64,
    requests_total: AtomicU64,
    latency_samples_ms: Mutex<VecDeque<u64>>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            started_at: Instant::now(),
            decisions_allow: AtomicU64::new(0),
            decisions_degrade: AtomicU64::new(0),
            decisions_escalate: AtomicU64::new(0),
            decisions_block: AtomicU64::new(0),
            decisions_pause: AtomicU64::new(0),
            reason_counts: Default::default(),
            rate_limit_hits: AtomicU64::new(0),
            requests_total: AtomicU64::new(0),
            latency_samples_ms: Mutex::new(VecDeque::with_capacity(MAX_LATENCY_SAMPLES)),
        }
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_decision(&self, verdict: Verdict, reason_code: ReasonCode, latency_ms: u64) {
        match verdict {
            Verdict::Allow => self.decisions_allow.fetch_add(1, Ordering::Relaxed),
            Verdict::Degrade => self.decisions_degrade.fetch_add(1, Ordering::Relaxed),
            Verdict::Escalate => self.decisions_escalate.fetch_add(1, Ordering::Relaxed),
            Verdict::Block => self.decisions_block.fetch_add(1, Ordering::Relaxed),
            Verdict::Pause => self.decisions_pause.fetch_add(1, Ordering::Relaxed),
        };
        self.reason_counts[reason_code as usize].fetch_add(1, Ordering::Relaxed);
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.push_latency(latency_ms);
    }

    pub fn record_rate_limit_hit(&self) {
        self.rate_limit_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn push_latency(&self, ms: u64) {
        let mut buf = self.latency_samples_ms.lock().expect("metrics mutex poisoned");
        if buf.len() >= MAX_LATENCY_SAMPLES {
            buf.pop_front();
        }
        buf.push_back(ms);
    }

    fn percentiles(&self) -> (u64, u64, u64) {
        let buf = self.latency_samples_ms.lock().expect("metrics mutex poisoned");
        if buf.is_empty() {
            return (0, 0, 0);
        }
        let mut sorted: Vec<u64> = buf.iter().copied().collect();
        sorted.sort_unstable();
        let len = sorted.len();
        let at = |pct: f64| -> u64 {
            let idx = ((pct / 100.0) * (len as f64 - 1.0)).round() as usize;
            sorted[idx.min(len - 1)]
        };
        (at(50.0), at(95.0), at(99.0))
    }

    /// Fraction of recorded decisions that came back BLOCK or PAUSE. Used by
    /// the `/benchmark/trust-spec` endpoint (spec.md §4.12).
    #[must_use]
    pub fn block_rate(&self) -> f64 {
        let total = self.requests_total.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        let blocked = self.decisions_block.load(Ordering::Relaxed) + self.decisions_pause.load(Ordering::Relaxed);
        #[allow(clippy::cast_precision_loss)]
        let rate = blocked as f64 / total as f64;
        rate
    }

    /// Median decision latency, used as the `latency_overhead_ms` figure in
    /// the trust-spec benchmark.
    #[must_use]
    pub fn p50_latency_ms(&self) -> u64 {
        self.percentiles().0
    }

    /// Point-in-time snapshot for the JSON `/metrics` endpoint.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let (p50, p95, p99) = self.percentiles();
        MetricsSnapshot {
            uptime_seconds: self.started_at.elapsed().as_secs(),
            decisions_allow: self.decisions_allow.load(Ordering::Relaxed),
            decisions_degrade: self.decisions_degrade.load(Ordering::Relaxed),
            decisions_escalate: self.decisions_escalate.load(Ordering::Relaxed),
            decisions_block: self.decisions_block.load(Ordering::Relaxed),
            decisions_pause: self.decisions_pause.load(Ordering::Relaxed),
            rate_limit_hits: self.rate_limit_hits.load(Ordering::Relaxed),
            requests_total: self.requests_total.load(Ordering::Relaxed),
            p50_latency_ms: p50,
            p95_latency_ms: p95,
            p99_latency_ms: p99,
        }
    }

    /// Render the current state as Prometheus text exposition format.
    #[must_use]
    pub fn render_prometheus(&self, active_intent_count: u64) -> String {
        let (p50, p95, p99) = self.percentiles();
        let mut out = String::new();

        out.push_str("# HELP edon_uptime_seconds Seconds since the gateway process started.\n");
        out.push_str("# TYPE edon_uptime_seconds gauge\n");
        out.push_str(&format!("edon_uptime_seconds {}\n", self.started_at.elapsed().as_secs()));

        out.push_str("# HELP edon_decisions_total Decisions by verdict.\n");
        out.push_str("# TYPE edon_decisions_total counter\n");
        for (verdict, counter) in [
            (Verdict::Allow, &self.decisions_allow),
            (Verdict::Degrade, &self.decisions_degrade),
            (Verdict::Escalate, &self.decisions_escalate),
            (Verdict::Block, &self.decisions_block),
            (Verdict::Pause, &self.decisions_pause),
        ] {
            out.push_str(&format!(
                "edon_decisions_total{{verdict=\"{}\"}} {}\n",
                verdict_label(verdict),
                counter.load(Ordering::Relaxed)
            ));
        }

        out.push_str("# HELP edon_decisions_by_reason_total Decisions by reason code.\n");
        out.push_str("# TYPE edon_decisions_by_reason_total counter\n");
        for reason_code in [
            ReasonCode::Approved,
            ReasonCode::DegradedToSafeAlternative,
            ReasonCode::NeedConfirmation,
            ReasonCode::IntentNotApproved,
            ReasonCode::ScopeViolation,
            ReasonCode::RiskTooHigh,
            ReasonCode::DataExfil,
            ReasonCode::OutOfHours,
            ReasonCode::LoopDetected,
            ReasonCode::RateLimit,
        ] {
            out.push_str(&format!(
                "edon_decisions_by_reason_total{{reason_code=\"{}\"}} {}\n",
                reason_code_label(reason_code),
                self.reason_counts[reason_code as usize].load(Ordering::Relaxed)
            ));
        }

        out.push_str("# HELP edon_rate_limit_hits_total Requests rejected by the rate limiter.\n");
        out.push_str("# TYPE edon_rate_limit_hits_total counter\n");
        out.push_str(&format!("edon_rate_limit_hits_total {}\n", self.rate_limit_hits.load(Ordering::Relaxed)));

        out.push_str("# HELP edon_active_intents Intents currently resolvable as a default or explicit intent.\n");
        out.push_str("# TYPE edon_active_intents gauge\n");
        out.push_str(&format!("edon_active_intents {active_intent_count}\n"));

        out.push_str("# HELP edon_decision_latency_ms Governor decision latency in milliseconds.\n");
        out.push_str("# TYPE edon_decision_latency_ms summary\n");
        out.push_str(&format!("edon_decision_latency_ms{{quantile=\"0.5\"}} {p50}\n"));
        out.push_str(&format!("edon_decision_latency_ms{{quantile=\"0.95\"}} {p95}\n"));
        out.push_str(&format!("edon_decision_latency_ms{{quantile=\"0.99\"}} {p99}\n"));
        out.push_str(&format!(
            "edon_decision_latency_ms_count {}\n",
            self.requests_total.load(Ordering::Relaxed)
        ));

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_decision_into_correct_counters() {
        let metrics = Metrics::new();
        metrics.record_decision(Verdict::Allow, ReasonCode::Approved, 5);
        metrics.record_decision(Verdict::Block, ReasonCode::ScopeViolation, 10);
        let rendered = metrics.render_prometheus(3);
        assert!(rendered.contains("edon_decisions_total{verdict=\"allow\"} 1"));
        assert!(rendered.contains("edon_decisions_total{verdict=\"block\"} 1"));
        assert!(rendered.contains("edon_decisions_by_reason_total{reason_code=\"scope_violation\"} 1"));
        assert!(rendered.contains("edon_active_intents 3"));
    }

    #[test]
    fn rate_limit_hits_are_counted_separately_from_decisions() {
        let metrics = Metrics::new();
        metrics.record_rate_limit_hit();
        metrics.record_rate_limit_hit();
        let rendered = metrics.render_prometheus(0);
        assert!(rendered.contains("edon_rate_limit_hits_total 2"));
    }

    #[test]
    fn percentiles_reflect_recorded_latencies() {
        let metrics = Metrics::new();
        for ms in 1..=100 {
            metrics.record_decision(Verdict::Allow, ReasonCode::Approved, ms);
        }
        let (p50, p95, p99) = metrics.percentiles();
        assert!((45..=55).contains(&p50));
        assert!((90..=100).contains(&p95));
        assert!((95..=100).contains(&p99));
    }
}
