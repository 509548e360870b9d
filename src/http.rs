//! Shared HTTP client construction.

use std::time::Duration;

use reqwest::Client;

/// Per-request timeout for every outbound API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the client used for all outbound API calls.
///
/// Falls back to the default client if the builder fails.
pub fn api_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_builds() {
        // Construction must never panic.
        let _ = api_client();
    }
}
