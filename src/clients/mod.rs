//! HTTP gateways for the external fitness services.
//!
//! Each client wraps one third-party API with a thin, stateless surface:
//! one outbound call per operation, no caching, no retries. Data calls
//! return the raw JSON payload; a non-success HTTP status becomes an
//! `{"error": <body>}` payload instead of an `Err`, so callers (and the
//! model reading tool output) see exactly what the service said. Only
//! transport-level failures surface as errors.

mod fitbit;
mod hevy;

pub use fitbit::FitbitClient;
pub use hevy::HevyClient;

use serde_json::{json, Value};
use tracing::debug;

use crate::error::Result;

/// Decode a success payload, or fold an error status into data.
async fn payload(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp.json().await?)
    } else {
        let body = resp.text().await.unwrap_or_default();
        debug!(%status, "gateway returned an error payload");
        Ok(json!({ "error": body }))
    }
}
