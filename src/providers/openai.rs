//! OpenAI-compatible chat-completions provider.
//!
//! Works against any server speaking the OpenAI chat API: Ollama, LM Studio,
//! vLLM, or the hosted services. Tool declarations go out as `tools`
//! function entries with `tool_choice: "auto"`; a reply either carries
//! `content` or a `tool_calls` list.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::error::{CoachError, Result};
use crate::http;
use crate::session::{Message, ToolCall};

use super::{LLMProvider, ModelReply, ToolSpec};

/// Local Ollama endpoint, so the coach runs without any hosted account.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";
/// Default model served by that endpoint.
pub const DEFAULT_MODEL: &str = "qwen2.5:14b-instruct";

/// Provider for OpenAI-compatible chat endpoints.
pub struct OpenAiCompatProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiCompatProvider {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: http::api_client(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }
}

#[async_trait]
impl LLMProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn chat(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelReply> {
        let body = OpenAiRequest {
            model: &self.model,
            messages: messages.iter().map(to_wire_message).collect(),
            tools: tools.iter().map(to_wire_tool).collect(),
            tool_choice: (!tools.is_empty()).then_some("auto"),
            stream: false,
        };

        debug!(model = %self.model, messages = messages.len(), tools = tools.len(), "chat request");
        let resp = self
            .request(reqwest::Method::POST, "/chat/completions")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CoachError::Provider(format!(
                "chat endpoint returned {status}: {body}"
            )));
        }

        let reply: OpenAiResponse = resp.json().await?;
        let message = reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| CoachError::Provider("reply carried no choices".to_string()))?;

        let calls: Vec<ToolCall> = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall::new(call.id, call.function.name, call.function.arguments))
            .collect();

        if calls.is_empty() {
            Ok(ModelReply::Answer(message.content.unwrap_or_default()))
        } else {
            Ok(ModelReply::ToolCalls {
                text: message.content.filter(|text| !text.trim().is_empty()),
                calls,
            })
        }
    }

    async fn health_check(&self) -> bool {
        match self.request(reqwest::Method::GET, "/models").send().await {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                warn!("llm liveness probe failed: {err}");
                false
            }
        }
    }
}

fn to_wire_message(message: &Message) -> OpenAiMessage {
    let tool_calls: Vec<OpenAiToolCall> = message
        .tool_calls
        .iter()
        .map(|call| OpenAiToolCall {
            id: call.id.clone(),
            kind: "function".to_string(),
            function: OpenAiFunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            },
        })
        .collect();

    OpenAiMessage {
        role: message.role.as_str(),
        // Assistant tool-call requests may carry no text at all.
        content: if message.content.is_empty() && !tool_calls.is_empty() {
            None
        } else {
            Some(message.content.clone())
        },
        tool_call_id: message.tool_call_id.clone(),
        tool_calls: if tool_calls.is_empty() {
            None
        } else {
            Some(tool_calls)
        },
    }
}

fn to_wire_tool(spec: &ToolSpec) -> OpenAiTool<'_> {
    OpenAiTool {
        kind: "function",
        function: OpenAiFunction {
            name: &spec.name,
            description: &spec.description,
            parameters: &spec.parameters,
        },
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OpenAiTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    stream: bool,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Serialize)]
struct OpenAiTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: OpenAiFunction<'a>,
}

#[derive(Serialize)]
struct OpenAiFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: OpenAiFunctionCall,
}

#[derive(Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    /// JSON-encoded argument object, kept as the raw string.
    arguments: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiReplyMessage,
}

#[derive(Deserialize)]
struct OpenAiReplyMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAiCompatProvider {
        OpenAiCompatProvider::new(&LlmConfig {
            base_url: server.uri(),
            api_key: Some("sk-test".to_string()),
            model: "test-model".to_string(),
        })
    }

    fn spec() -> ToolSpec {
        ToolSpec {
            name: "get_todays_readiness".to_string(),
            description: "Readiness from sleep".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        }
    }

    #[tokio::test]
    async fn test_plain_reply_parses_as_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "test-model", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Rest today."}}]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let reply = provider
            .chat(&[Message::user("Should I train?")], &[])
            .await
            .unwrap();
        assert_eq!(reply, ModelReply::Answer("Rest today.".to_string()));
    }

    #[tokio::test]
    async fn test_tool_call_reply_parses_as_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "tool_choice": "auto",
                "tools": [{"type": "function", "function": {"name": "get_todays_readiness"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_todays_readiness", "arguments": "{}"}
                    }]
                }}]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let reply = provider
            .chat(&[Message::user("Am I recovered?")], &[spec()])
            .await
            .unwrap();
        match reply {
            ModelReply::ToolCalls { text, calls } => {
                assert!(text.is_none());
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].id, "call_1");
                assert_eq!(calls[0].name, "get_todays_readiness");
                assert_eq!(calls[0].arguments, "{}");
            }
            other => panic!("expected tool calls, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tool_and_result_messages_round_trip_on_the_wire() {
        let server = MockServer::start().await;
        // The replayed assistant message must echo its tool_calls, and the
        // tool result must carry the matching tool_call_id.
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "user", "content": "Am I recovered?"},
                    {"role": "assistant", "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_todays_readiness", "arguments": "{}"}
                    }]},
                    {"role": "tool", "tool_call_id": "call_1", "content": "{\"status\":\"High Readiness\"}"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Fully recovered, go lift."}}]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let messages = vec![
            Message::user("Am I recovered?"),
            Message::assistant_with_tools(
                "",
                vec![ToolCall::new("call_1", "get_todays_readiness", "{}")],
            ),
            Message::tool_result("call_1", "{\"status\":\"High Readiness\"}"),
        ];
        let reply = provider.chat(&messages, &[spec()]).await.unwrap();
        assert_eq!(
            reply,
            ModelReply::Answer("Fully recovered, go lift.".to_string())
        );
    }

    #[tokio::test]
    async fn test_error_status_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model melted"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .chat(&[Message::user("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::Provider(msg) if msg.contains("model melted")));
    }

    #[tokio::test]
    async fn test_empty_choices_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .chat(&[Message::user("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::Provider(_)));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        assert!(provider_for(&server).health_check().await);

        let dead = OpenAiCompatProvider::new(&LlmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            model: "test-model".to_string(),
        });
        assert!(!dead.health_check().await);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let provider = OpenAiCompatProvider::new(&LlmConfig {
            base_url: "http://localhost:11434/v1/".to_string(),
            api_key: None,
            model: "test-model".to_string(),
        });
        assert_eq!(provider.base_url, "http://localhost:11434/v1");
    }
}
