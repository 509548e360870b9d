//! Hevy workout-tracker API client.

use reqwest::Client;
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::http;

use super::payload;

const BASE_URL: &str = "https://api.hevyapp.com/v1";

/// Client for the Hevy v1 REST API.
///
/// Authenticates with an `api-key` header. Routines and workouts come back
/// as the raw paged JSON payloads Hevy serves; see the module docs for the
/// error contract.
pub struct HevyClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HevyClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Override the API host. Tests point this at a local mock server.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: http::api_client(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Liveness probe: true when the API accepts our key.
    pub async fn check_connection(&self) -> bool {
        let url = format!("{}/workouts/count", self.base_url);
        match self
            .client
            .get(&url)
            .header("api-key", &self.api_key)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                warn!("hevy liveness probe failed: {err}");
                false
            }
        }
    }

    /// Fetch a page of saved routines.
    pub async fn get_routines(&self, page: u32, page_size: u32) -> Result<Value> {
        let url = format!("{}/routines", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("api-key", &self.api_key)
            .query(&[("page", page), ("pageSize", page_size)])
            .send()
            .await?;
        payload(resp).await
    }

    /// Fetch a page of logged workouts, newest first.
    pub async fn get_workouts(&self, page: u32, page_size: u32) -> Result<Value> {
        let url = format!("{}/workouts", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("api-key", &self.api_key)
            .query(&[("page", page), ("pageSize", page_size)])
            .send()
            .await?;
        payload(resp).await
    }

    /// Replace a routine's exercises and notes.
    ///
    /// `routine` is sent as the PUT body verbatim; Hevy expects an object
    /// with an `exercises` array and a `notes` string.
    pub async fn update_routine(&self, routine_id: &str, routine: &Value) -> Result<Value> {
        let url = format!("{}/routines/{}", self.base_url, routine_id);
        let resp = self
            .client
            .put(&url)
            .header("api-key", &self.api_key)
            .json(routine)
            .send()
            .await?;
        payload(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> HevyClient {
        HevyClient::with_base_url("test-key", server.uri())
    }

    #[tokio::test]
    async fn test_get_workouts_passes_payload_through() {
        let server = MockServer::start().await;
        let body = json!({
            "page": 1,
            "page_count": 1,
            "workouts": [{"id": "w1", "title": "Push Day"}]
        });
        Mock::given(method("GET"))
            .and(path("/workouts"))
            .and(header("api-key", "test-key"))
            .and(query_param("page", "1"))
            .and(query_param("pageSize", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let payload = client.get_workouts(1, 3).await.unwrap();
        assert_eq!(payload, body);
    }

    #[tokio::test]
    async fn test_error_status_becomes_error_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/routines"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let payload = client.get_routines(1, 5).await.unwrap();
        assert_eq!(payload["error"], "invalid api key");
    }

    #[tokio::test]
    async fn test_update_routine_puts_body_verbatim() {
        let server = MockServer::start().await;
        let update = json!({
            "exercises": [{"title": "Squat", "sets": [{"weight_kg": 100, "reps": 5}]}],
            "notes": "Volume trimmed after a short night."
        });
        Mock::given(method("PUT"))
            .and(path("/routines/r42"))
            .and(header("api-key", "test-key"))
            .and(body_json(update.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "r42"})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let payload = client.update_routine("r42", &update).await.unwrap();
        assert_eq!(payload["id"], "r42");
    }

    #[tokio::test]
    async fn test_check_connection_true_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/workouts/count"))
            .and(header("api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"workout_count": 12})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.check_connection().await);
    }

    #[tokio::test]
    async fn test_check_connection_false_on_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/workouts/count"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(!client.check_connection().await);
    }

    #[tokio::test]
    async fn test_check_connection_false_when_unreachable() {
        // Nothing listens on this port.
        let client = HevyClient::with_base_url("test-key", "http://127.0.0.1:9");
        assert!(!client.check_connection().await);
    }
}
