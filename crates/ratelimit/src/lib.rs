pub mod limits;
pub mod limiter;

pub use limits::Limits;
pub use limiter::{RateLimitExceeded, RateLimiter};
