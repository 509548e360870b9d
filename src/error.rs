//! Error types for FitCoach
//!
//! Every component returns [`CoachError`]; the binary edge wraps it with
//! `anyhow` context where needed.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CoachError>;

/// All failure modes surfaced by FitCoach components.
#[derive(Error, Debug)]
pub enum CoachError {
    /// Filesystem or terminal I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure (connect, timeout, TLS).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Conversation store failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid or missing configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The LLM endpoint rejected the request or sent an unusable reply.
    #[error("provider error: {0}")]
    Provider(String),

    /// Tool invocation failure (bad arguments, unusable payload).
    #[error("tool error: {0}")]
    Tool(String),

    /// Agent loop failure (hop budget exhausted, inconsistent state).
    #[error("agent error: {0}")]
    Agent(String),

    /// Message append against a session id the store has never seen.
    #[error("unknown session: {0}")]
    SessionNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoachError::SessionNotFound("abc-123".into());
        assert_eq!(err.to_string(), "unknown session: abc-123");

        let err = CoachError::Tool("missing 'routine_name' argument".into());
        assert!(err.to_string().starts_with("tool error:"));
    }

    #[test]
    fn test_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CoachError = io.into();
        assert!(matches!(err, CoachError::Io(_)));
    }

    #[test]
    fn test_from_json() {
        let bad: std::result::Result<serde_json::Value, _> = serde_json::from_str("{nope");
        let err: CoachError = bad.unwrap_err().into();
        assert!(matches!(err, CoachError::Json(_)));
    }
}
