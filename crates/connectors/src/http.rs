use std::time::Duration;

use reqwest::Client;

/// Default timeouts applied to every downstream connector's HTTP client
/// (spec.md §5): a 10s connect timeout and a 60s overall request timeout.
pub(crate) fn default_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(60))
        .build()
        .expect("reqwest client builder with only timeouts set should never fail")
}
