//! Configuration loaded from the environment.
//!
//! Everything is optional or defaulted: a missing fitness credential only
//! degrades the matching gateway to "disconnected", and the LLM settings
//! default to a local Ollama-style server so no key is required.
//!
//! Recognized variables:
//!
//! | Variable              | Meaning                              | Default                      |
//! |-----------------------|--------------------------------------|------------------------------|
//! | `HEVY_API_KEY`        | Hevy API key                         | unset (gateway disabled)     |
//! | `FITBIT_ACCESS_TOKEN` | Fitbit OAuth bearer token            | unset (gateway disabled)     |
//! | `LLM_BASE_URL`        | OpenAI-compatible endpoint base      | `http://localhost:11434/v1`  |
//! | `LLM_API_KEY`         | Bearer key for the LLM endpoint      | unset                        |
//! | `LLM_MODEL`           | Model name sent with each request    | `qwen2.5:14b-instruct`       |
//! | `FITCOACH_DB`         | SQLite database path                 | `~/.fitcoach/history.db`     |

use std::path::PathBuf;

use crate::providers::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Settings for the chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL up to (not including) `/chat/completions`.
    pub base_url: String,
    /// Optional bearer key; local servers usually need none.
    pub api_key: Option<String>,
    /// Model name sent with each request.
    pub model: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hevy API key, when the workout gateway is configured.
    pub hevy_api_key: Option<String>,
    /// Fitbit bearer token, when the wearable gateway is configured.
    pub fitbit_access_token: Option<String>,
    /// Chat-completion endpoint settings.
    pub llm: LlmConfig,
    /// Where the conversation database lives.
    pub db_path: PathBuf,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            hevy_api_key: get("HEVY_API_KEY"),
            fitbit_access_token: get("FITBIT_ACCESS_TOKEN"),
            llm: LlmConfig {
                base_url: get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                api_key: get("LLM_API_KEY"),
                model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            },
            db_path: get("FITCOACH_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|| Self::dir().join("history.db")),
        }
    }

    /// Application data directory (`~/.fitcoach`).
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join(".fitcoach"))
            .unwrap_or_else(|| PathBuf::from(".fitcoach"))
    }
}
