use chrono::{DateTime, Utc};

/// Default decision count threshold (`N` in spec step 5).
pub const DEFAULT_THRESHOLD: usize = 5;
/// Default lookback window in seconds (`T` in spec step 5).
pub const DEFAULT_WINDOW_SECONDS: i64 = 10;

/// Step 5 of the decision flow: loop/rate detection. Stays pure by taking
/// the timestamps of prior decisions for this exact `action_fingerprint` as
/// an input rather than querying the store itself — the Pipeline is
/// responsible for fetching that history before calling the Governor.
///
/// Returns `true` (PAUSE, `LOOP_DETECTED`) if `recent_decision_timestamps`
/// contains at least `threshold` entries within `window_seconds` of `now`.
#[must_use]
pub fn is_loop_detected(
    recent_decision_timestamps: &[DateTime<Utc>],
    now: DateTime<Utc>,
    threshold: usize,
    window_seconds: i64,
) -> bool {
    let count = recent_decision_timestamps
        .iter()
        .filter(|ts| (now - **ts).num_seconds() <= window_seconds && **ts <= now)
        .count();
    count >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn below_threshold_is_not_a_loop() {
        let now = Utc::now();
        let timestamps = vec![now - Duration::seconds(1), now - Duration::seconds(2)];
        assert!(!is_loop_detected(&timestamps, now, DEFAULT_THRESHOLD, DEFAULT_WINDOW_SECONDS));
    }

    #[test]
    fn at_threshold_within_window_is_a_loop() {
        let now = Utc::now();
        let timestamps: Vec<_> = (0..5).map(|i| now - Duration::seconds(i)).collect();
        assert!(is_loop_detected(&timestamps, now, DEFAULT_THRESHOLD, DEFAULT_WINDOW_SECONDS));
    }

    #[test]
    fn entries_outside_window_are_not_counted() {
        let now = Utc::now();
        let timestamps: Vec<_> = (0..5).map(|i| now - Duration::seconds(20 + i)).collect();
        assert!(!is_loop_detected(&timestamps, now, DEFAULT_THRESHOLD, DEFAULT_WINDOW_SECONDS));
    }
}
