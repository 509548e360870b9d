//! Language-model provider abstraction.
//!
//! The agent loop talks to any backend through [`LLMProvider`]; replies come
//! back as a [`ModelReply`] so callers branch on exactly two cases: a final
//! answer, or a request for tool execution.

mod openai;

pub use openai::{OpenAiCompatProvider, DEFAULT_BASE_URL, DEFAULT_MODEL};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::session::{Message, ToolCall};

/// Declaration of a callable tool, as advertised to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the accepted arguments.
    pub parameters: Value,
}

/// One model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// Final assistant text; the turn is complete.
    Answer(String),
    /// The model wants tools executed before it answers.
    ToolCalls {
        /// Commentary accompanying the calls, when the model sent any.
        text: Option<String>,
        calls: Vec<ToolCall>,
    },
}

/// A chat-completion backend.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Provider name for logs and the status report.
    fn name(&self) -> &str;

    /// One completion round trip over the full message list.
    ///
    /// `tools` may be empty, in which case the model cannot request calls.
    async fn chat(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelReply>;

    /// Liveness probe: true when the endpoint answers.
    async fn health_check(&self) -> bool;
}
