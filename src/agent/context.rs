//! Conversation context assembly.

use crate::session::{Message, Role};

/// The coach persona and operating rules sent as the system message.
const SYSTEM_PROMPT: &str = "\
You are an elite Strength & Conditioning AI Coach working from the user's \
Hevy training log and Fitbit recovery data.

Your goal: optimize the user's training around their biological state.

Guidelines:
1. ALWAYS check recovery data before suggesting high-intensity work; use \
get_todays_readiness first when intensity is in question.
2. Use get_recent_workouts to understand recent training before advising.
3. When you recommend a change, explain WHY from the data (for example: \
\"sleep was short, so pull volume back today\").
4. Be concise and encouraging.";

/// Builds the message list handed to the model.
///
/// Prepends the coach system prompt unless the caller already supplied a
/// system message of its own.
pub struct ContextBuilder {
    system_prompt: String,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replace the default system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Assemble the turn context from stored history.
    pub fn build(&self, history: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        let has_system = matches!(history.first(), Some(first) if first.role == Role::System);
        if !has_system {
            messages.push(Message::system(&self.system_prompt));
        }
        messages.extend_from_slice(history);
        messages
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
