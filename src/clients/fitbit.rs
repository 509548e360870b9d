//! Fitbit wearable API client.

use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::http;

use super::payload;

const BASE_URL: &str = "https://api.fitbit.com/1";

/// Client for the Fitbit web API.
///
/// Authenticates with an OAuth bearer token; token acquisition is out of
/// scope, the token is taken as-is from configuration.
pub struct FitbitClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl FitbitClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, BASE_URL)
    }

    /// Override the API host. Tests point this at a local mock server.
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: http::api_client(),
            base_url: base_url.into(),
            access_token: access_token.into(),
        }
    }

    /// Liveness probe: true when the API accepts our token.
    pub async fn check_connection(&self) -> bool {
        let url = format!("{}/user/-/profile.json", self.base_url);
        match self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                warn!("fitbit liveness probe failed: {err}");
                false
            }
        }
    }

    /// Sleep log summary for one calendar date.
    pub async fn get_sleep_summary(&self, date: NaiveDate) -> Result<Value> {
        let url = format!("{}/user/-/sleep/date/{}.json", self.base_url, date);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        payload(resp).await
    }

    /// Heart-rate series (including resting rate) for one calendar date.
    pub async fn get_heart_rate(&self, date: NaiveDate) -> Result<Value> {
        let url = format!(
            "{}/user/-/activities/heart/date/{}/1d.json",
            self.base_url, date
        );
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        payload(resp).await
    }
}
