use edon_core::WindowGranularity;

/// Per-principal request ceilings for one window granularity each
/// (spec.md §4.5).
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub minute: i64,
    pub hour: i64,
    pub day: i64,
}

impl Limits {
    #[must_use]
    pub fn for_granularity(self, granularity: WindowGranularity) -> i64 {
        match granularity {
            WindowGranularity::Minute => self.minute,
            WindowGranularity::Hour => self.hour,
            WindowGranularity::Day => self.day,
        }
    }
}

/// Default tier for requests carrying a valid, bound token.
pub const AUTHENTICATED: Limits = Limits {
    minute: 60,
    hour: 1_000,
    day: 10_000,
};

/// Default tier for requests with no token at all.
pub const ANONYMOUS: Limits = Limits {
    minute: 10,
    hour: 100,
    day: 500,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_granularity_selects_matching_field() {
        assert_eq!(AUTHENTICATED.for_granularity(WindowGranularity::Minute), 60);
        assert_eq!(ANONYMOUS.for_granularity(WindowGranularity::Day), 500);
    }
}
