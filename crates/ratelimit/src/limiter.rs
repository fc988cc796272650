use chrono::{DateTime, Utc};
use edon_core::WindowGranularity;
use edon_store::Store;

use crate::limits::{Limits, ANONYMOUS, AUTHENTICATED};

/// Raised when a principal has exhausted one of its minute/hour/day buckets.
#[derive(Debug, Clone)]
pub struct RateLimitExceeded {
    pub granularity: WindowGranularity,
    pub limit: i64,
    pub retry_after_seconds: i64,
}

/// Sliding-window counters keyed by `(principal, window)` (spec.md §4.5).
///
/// Callers must derive `principal` from headers or query parameters only —
/// never from the request body — so a rate-limit check never forces a body
/// read ahead of the Validator's size checks.
pub struct RateLimiter<S: Store> {
    store: S,
}

const GRANULARITIES: [WindowGranularity; 3] = [
    WindowGranularity::Minute,
    WindowGranularity::Hour,
    WindowGranularity::Day,
];

impl<S: Store> RateLimiter<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Check minute, then hour, then day, in that order. If all three are
    /// within their limits, increments all three buckets and returns `Ok`.
    /// If any is exceeded, returns immediately with no increment — "counters
    /// incremented only after a non-rate-limited decision is produced"
    /// (spec.md §4.5), avoiding charging a principal for a 429 response.
    pub async fn check_and_record(
        &self,
        principal: &str,
        authenticated: bool,
        now: DateTime<Utc>,
    ) -> Result<(), RateLimitExceeded> {
        let limits = if authenticated { AUTHENTICATED } else { ANONYMOUS };

        for granularity in GRANULARITIES {
            self.ensure_within_limit(principal, granularity, limits, now).await?;
        }

        for granularity in GRANULARITIES {
            let window_start = granularity.bucket_start(now);
            self.store
                .increment_counter(principal, granularity, window_start)
                .await
                .map_err(|_| RateLimitExceeded {
                    granularity,
                    limit: limits.for_granularity(granularity),
                    retry_after_seconds: retry_after(granularity, now),
                })?;
        }

        Ok(())
    }

    async fn ensure_within_limit(
        &self,
        principal: &str,
        granularity: WindowGranularity,
        limits: Limits,
        now: DateTime<Utc>,
    ) -> Result<(), RateLimitExceeded> {
        let window_start = granularity.bucket_start(now);
        let limit = limits.for_granularity(granularity);
        let count = self
            .store
            .get_counter(principal, granularity, window_start)
            .await
            .unwrap_or(0);

        if count >= limit {
            return Err(RateLimitExceeded {
                granularity,
                limit,
                retry_after_seconds: retry_after(granularity, now),
            });
        }
        Ok(())
    }
}

/// Seconds remaining until `granularity`'s bucket containing `now` rolls over.
fn retry_after(granularity: WindowGranularity, now: DateTime<Utc>) -> i64 {
    let window_start = granularity.bucket_start(now);
    (window_start.timestamp() + granularity.seconds() - now.timestamp()).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edon_store::{SqliteStore, StoreConfig};

    async fn test_store() -> SqliteStore {
        SqliteStore::connect(&StoreConfig {
            database_path: ":memory:".into(),
            pool_size: 1,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn allows_requests_under_limit() {
        let limiter = RateLimiter::new(test_store().await);
        let now = Utc::now();
        for _ in 0..5 {
            limiter.check_and_record("agent-1", true, now).await.unwrap();
        }
    }

    #[tokio::test]
    async fn anonymous_tier_is_stricter() {
        let limiter = RateLimiter::new(test_store().await);
        let now = Utc::now();
        for _ in 0..10 {
            limiter.check_and_record("anon", false, now).await.unwrap();
        }
        let result = limiter.check_and_record("anon", false, now).await;
        assert!(matches!(
            result,
            Err(RateLimitExceeded { granularity: WindowGranularity::Minute, .. })
        ));
    }

    #[tokio::test]
    async fn minute_limit_exceeded_does_not_increment_hour_or_day() {
        let limiter = RateLimiter::new(test_store().await);
        let now = Utc::now();
        for _ in 0..10 {
            limiter.check_and_record("anon", false, now).await.unwrap();
        }
        let before = limiter
            .store
            .get_counter("anon", WindowGranularity::Hour, WindowGranularity::Hour.bucket_start(now))
            .await
            .unwrap();
        let _ = limiter.check_and_record("anon", false, now).await;
        let after = limiter
            .store
            .get_counter("anon", WindowGranularity::Hour, WindowGranularity::Hour.bucket_start(now))
            .await
            .unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn retry_after_is_positive() {
        let limiter = RateLimiter::new(test_store().await);
        let now = Utc::now();
        for _ in 0..10 {
            limiter.check_and_record("anon2", false, now).await.unwrap();
        }
        let err = limiter.check_and_record("anon2", false, now).await.unwrap_err();
        assert!(err.retry_after_seconds > 0);
        assert_eq!(err.limit, 10);
    }
}
