//! Tools the model can call during a chat turn.
//!
//! A tool is a named, JSON-schema-described operation. The registry owns
//! every registered tool and dispatches model-requested calls; dispatch
//! failures are folded into `{"error": ...}` JSON strings so the model can
//! read what went wrong and react, instead of the turn dying.
//!
//! All registered tools are read-only against the fitness services.

pub mod fitness;

pub use fitness::{RecentWorkoutsTool, RoutineDetailsTool, TodaysReadinessTool};

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::Result;
use crate::providers::ToolSpec;
use crate::session::ToolCall;

/// Ambient data available to every tool invocation.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Calendar date used for "today" lookups.
    pub today: NaiveDate,
}

impl ToolContext {
    /// Context for the current local date.
    pub fn new() -> Self {
        Self {
            today: Local::now().date_naive(),
        }
    }

    /// Pin the context to a fixed date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

impl Default for ToolContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A callable tool exposed to the language model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name, as advertised to the model.
    fn name(&self) -> &str;

    /// Description the model uses to decide when to call.
    fn description(&self) -> &str;

    /// JSON schema of the accepted arguments.
    fn parameters(&self) -> Value;

    /// Run the tool. The returned string goes back to the model verbatim.
    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<String>;
}

/// The set of tools available to the agent loop.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool under its own name. Re-registering replaces.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Declarations for every registered tool, sorted by name so the model
    /// sees a stable list across turns.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .values()
            .map(|tool| ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Execute one model-requested call.
    ///
    /// Never fails: unknown tools, malformed arguments, and execution
    /// errors all come back as `{"error": ...}` strings for the model.
    pub async fn dispatch(&self, call: &ToolCall, ctx: &ToolContext) -> String {
        let Some(tool) = self.get(&call.name) else {
            warn!(tool = %call.name, "model requested an unknown tool");
            return json!({ "error": format!("unknown tool: {}", call.name) }).to_string();
        };

        // Some models send a blank argument string for no-arg tools.
        let args: Value = if call.arguments.trim().is_empty() {
            json!({})
        } else {
            match serde_json::from_str(&call.arguments) {
                Ok(args) => args,
                Err(err) => {
                    warn!(tool = %call.name, "unparseable tool arguments: {err}");
                    return json!({ "error": format!("invalid arguments: {err}") }).to_string();
                }
            }
        };

        debug!(tool = %call.name, "dispatching tool call");
        match tool.execute(args, ctx).await {
            Ok(output) => output,
            Err(err) => {
                warn!(tool = %call.name, "tool failed: {err}");
                json!({ "error": err.to_string() }).to_string()
            }
        }
    }
}
