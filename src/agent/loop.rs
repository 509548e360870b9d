//! The per-turn agent state machine.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{CoachError, Result};
use crate::providers::{LLMProvider, ModelReply};
use crate::session::{Message, ToolCall};
use crate::tools::{ToolContext, ToolRegistry};

use super::ContextBuilder;

/// Model invocations allowed per turn before the loop fails closed.
pub const MAX_TOOL_HOPS: usize = 8;

/// Where a turn currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnState {
    /// Waiting for the model's next reply.
    AwaitingModel,
    /// Executing the calls the model requested, in request order.
    AwaitingToolResults(Vec<ToolCall>),
    /// The model produced its final answer.
    Done(String),
}

/// Drives one conversation turn against the provider and tool registry.
///
/// A turn starts with the stored history plus the newest user message and
/// ends with exactly one final assistant text. In between, the model may
/// request tool calls; their results re-enter the conversation as tool
/// messages and the model is consulted again.
pub struct AgentLoop {
    provider: Arc<dyn LLMProvider>,
    tools: Arc<ToolRegistry>,
    context: ContextBuilder,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn LLMProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            tools,
            context: ContextBuilder::new(),
        }
    }

    /// Replace the default context builder.
    pub fn with_context(mut self, context: ContextBuilder) -> Self {
        self.context = context;
        self
    }

    /// Run one turn: history in, final assistant text out.
    ///
    /// # Errors
    ///
    /// Fails when the provider fails, or with [`CoachError::Agent`] when
    /// the model still wants tools after [`MAX_TOOL_HOPS`] invocations.
    /// Tool execution failures do NOT fail the turn; they come back to the
    /// model as error payloads.
    pub async fn run_turn(&self, history: &[Message], ctx: &ToolContext) -> Result<String> {
        let mut messages = self.context.build(history);
        let specs = self.tools.specs();
        let mut state = TurnState::AwaitingModel;
        let mut hops = 0usize;

        loop {
            match state {
                TurnState::AwaitingModel => {
                    if hops >= MAX_TOOL_HOPS {
                        warn!(hops, "tool-call budget exhausted, aborting turn");
                        return Err(CoachError::Agent(format!(
                            "no final answer after {MAX_TOOL_HOPS} model calls"
                        )));
                    }
                    hops += 1;
                    debug!(hop = hops, "requesting model reply");
                    state = match self.provider.chat(&messages, &specs).await? {
                        ModelReply::Answer(text) => TurnState::Done(text),
                        ModelReply::ToolCalls { text, calls } => {
                            messages.push(Message::assistant_with_tools(
                                text.unwrap_or_default(),
                                calls.clone(),
                            ));
                            TurnState::AwaitingToolResults(calls)
                        }
                    };
                }
                TurnState::AwaitingToolResults(calls) => {
                    for call in &calls {
                        let output = self.tools.dispatch(call, ctx).await;
                        debug!(tool = %call.name, bytes = output.len(), "tool call finished");
                        messages.push(Message::tool_result(&call.id, output));
                    }
                    state = TurnState::AwaitingModel;
                }
                TurnState::Done(text) => {
                    debug!(hops, "turn complete");
                    return Ok(text);
                }
            }
        }
    }
}
