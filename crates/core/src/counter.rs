use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The time granularity a [`CounterKey`] is bucketed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowGranularity {
    Minute,
    Hour,
    Day,
}

impl WindowGranularity {
    /// Window length in seconds.
    #[must_use]
    pub fn seconds(self) -> i64 {
        match self {
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => 86_400,
        }
    }

    /// Floor `now` to the start of the bucket this granularity defines.
    #[must_use]
    pub fn bucket_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let secs = now.timestamp();
        let window = self.seconds();
        let floored = secs - secs.rem_euclid(window);
        DateTime::from_timestamp(floored, 0).unwrap_or(now)
    }
}

/// Key identifying a sliding-window counter bucket: `{principal, window
/// granularity, time bucket}` (spec.md §3, Counter entity).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CounterKey {
    pub principal: String,
    pub granularity: WindowGranularity,
}

impl CounterKey {
    #[must_use]
    pub fn new(principal: impl Into<String>, granularity: WindowGranularity) -> Self {
        Self {
            principal: principal.into(),
            granularity,
        }
    }

    /// Canonical string form used as the Store row key.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}:{:?}", self.principal, self.granularity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_start_floors_to_window() {
        let t = DateTime::from_timestamp(125, 0).unwrap();
        let bucket = WindowGranularity::Minute.bucket_start(t);
        assert_eq!(bucket.timestamp(), 120);
    }

    #[test]
    fn counter_key_canonical_distinguishes_granularity() {
        let a = CounterKey::new("p1", WindowGranularity::Minute);
        let b = CounterKey::new("p1", WindowGranularity::Hour);
        assert_ne!(a.canonical(), b.canonical());
    }
}
