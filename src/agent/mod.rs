//! Agent module - the tool-calling conversation loop
//!
//! This module drives one chat turn end to end. The agent is responsible
//! for:
//!
//! - Building conversation context with the coach system prompt and history
//! - Calling the LLM provider for a reply
//! - Executing requested tool calls and feeding results back to the model
//! - Terminating with exactly one final assistant answer per turn
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Chat shell  │────>│  AgentLoop  │────>│ LLMProvider │
//! │ (one turn)  │     │             │     │ (chat API)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                            │                   │
//!                            ▼                   ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │    Tool     │────>│ Hevy/Fitbit │
//!                     │  Registry   │     │  gateways   │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fitcoach::agent::AgentLoop;
//! use fitcoach::providers::OpenAiCompatProvider;
//! use fitcoach::session::Message;
//! use fitcoach::tools::{ToolContext, ToolRegistry};
//!
//! async fn one_turn(provider: Arc<OpenAiCompatProvider>) {
//!     let registry = Arc::new(ToolRegistry::new());
//!     let agent = AgentLoop::new(provider, registry);
//!
//!     let history = vec![Message::user("How hard should I train today?")];
//!     let answer = agent.run_turn(&history, &ToolContext::new()).await.unwrap();
//!     println!("{answer}");
//! }
//! ```

mod context;
mod r#loop;

pub use context::ContextBuilder;
pub use r#loop::{AgentLoop, TurnState, MAX_TOOL_HOPS};
