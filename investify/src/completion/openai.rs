//! OpenAI-compatible chat-completions client with a tool-call loop

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use super::{CompletionClient, CompletionRequest};
use crate::config::LlmConfig;
use crate::error::{ConfigError, UpstreamError};
use crate::tools::{Tool, ToolSpec};

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn with_role(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", content)
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_role("tool", content)
        }
    }

    /// Non-empty text content, if any
    pub fn into_text(self) -> Option<String> {
        self.content.filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments object
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

impl ChatResponse {
    pub fn into_first_message(self) -> Option<ChatMessage> {
        self.choices.into_iter().next().map(|choice| choice.message)
    }
}

pub(crate) fn tool_definition(spec: &ToolSpec) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": spec.name,
            "description": spec.description,
            "parameters": spec.parameters,
        }
    })
}

/// Run one tool call against the tools bound to the request
pub(crate) async fn dispatch_tool_call(
    tools: &[Arc<dyn Tool>],
    call: &ToolCall,
) -> Result<String, UpstreamError> {
    let name = call.function.name.as_str();
    let tool = tools
        .iter()
        .find(|tool| tool.spec().name == name)
        .ok_or_else(|| UpstreamError::UnknownTool(name.to_string()))?;

    let raw = if call.function.arguments.trim().is_empty() {
        "{}"
    } else {
        call.function.arguments.as_str()
    };
    let arguments: Value = serde_json::from_str(raw).map_err(|e| UpstreamError::Tool {
        name: name.to_string(),
        message: format!("invalid arguments: {e}"),
    })?;

    tool.call(arguments).await
}

// ============================================================================
// Client
// ============================================================================

/// [`CompletionClient`] for OpenAI-compatible `/chat/completions` endpoints
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn request_body<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        tools: &[Arc<dyn Tool>],
    ) -> ChatRequest<'a> {
        let tools: Vec<Value> = tools.iter().map(|tool| tool_definition(&tool.spec())).collect();
        let tool_choice = (!tools.is_empty()).then_some("auto");

        ChatRequest {
            model: &self.config.model,
            messages,
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
            top_p: None,
            tools,
            tool_choice,
        }
    }

    async fn send(
        &self,
        messages: &[ChatMessage],
        tools: &[Arc<dyn Tool>],
    ) -> Result<ChatMessage, UpstreamError> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(messages, tools))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(UpstreamError::Status {
                service: "OpenAI",
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatResponse = response.json().await?;
        reply
            .into_first_message()
            .ok_or_else(|| UpstreamError::MalformedResponse {
                service: "OpenAI",
                detail: "response has no choices".to_string(),
            })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, UpstreamError> {
        let mut messages = vec![
            ChatMessage::system(request.system_prompt),
            ChatMessage::user(request.prompt),
        ];
        let mut rounds = 0;

        loop {
            let reply = self.send(&messages, request.tools).await?;
            let calls = reply.tool_calls.clone().unwrap_or_default();

            if calls.is_empty() {
                return reply
                    .into_text()
                    .ok_or_else(|| UpstreamError::MalformedResponse {
                        service: "OpenAI",
                        detail: "reply has no text content".to_string(),
                    });
            }

            if rounds == self.config.max_tool_rounds {
                return Err(UpstreamError::ToolRoundsExceeded(rounds));
            }
            rounds += 1;

            messages.push(reply);
            for call in &calls {
                let output = dispatch_tool_call(request.tools, call).await?;
                messages.push(ChatMessage::tool(call.id.clone(), output));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ResearchClient, ResearchTool};

    fn tools() -> Vec<Arc<dyn Tool>> {
        let search: Arc<dyn Tool> =
            Arc::new(ResearchTool::web_search(Arc::new(ResearchClient::offline())));
        vec![search]
    }

    #[test]
    fn test_request_body_with_tools() {
        let client = OpenAiClient::new(LlmConfig::new("sk-test")).unwrap();
        let messages = [ChatMessage::system("sys"), ChatMessage::user("hi")];
        let body = serde_json::to_value(client.request_body(&messages, &tools())).unwrap();

        assert_eq!(body["model"], "gpt-4-1106-preview");
        assert_eq!(body["max_tokens"], 4000);
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "web_search");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body.get("top_p").is_none());
    }

    #[test]
    fn test_request_body_without_tools() {
        let client = OpenAiClient::new(LlmConfig::new("sk-test")).unwrap();
        let messages = [ChatMessage::user("hi")];
        let body = serde_json::to_value(client.request_body(&messages, &[])).unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn test_parse_tool_call_response() {
        let raw = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "web_search", "arguments": "{\"query\": \"solar market\"}"}
                    }]
                }
            }]
        }"#;
        let message = serde_json::from_str::<ChatResponse>(raw)
            .unwrap()
            .into_first_message()
            .unwrap();
        let calls = message.tool_calls.clone().unwrap();
        assert_eq!(calls[0].function.name, "web_search");
        assert_eq!(message.into_text(), None);
    }

    #[test]
    fn test_tool_message_serialization() {
        let value = serde_json::to_value(ChatMessage::tool("call_1", "result")).unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_call_id"], "call_1");
        assert!(value.get("tool_calls").is_none());
    }

    #[tokio::test]
    async fn test_dispatch_tool_call() {
        let call = ToolCall {
            id: "call_1".to_string(),
            kind: function_kind(),
            function: FunctionCall {
                name: "web_search".to_string(),
                arguments: "{\"query\": \"solar market\"}".to_string(),
            },
        };
        let output = dispatch_tool_call(&tools(), &call).await.unwrap();
        assert!(output.contains("solar market"));

        let unknown = ToolCall {
            function: FunctionCall {
                name: "calculator".to_string(),
                arguments: "{}".to_string(),
            },
            ..call.clone()
        };
        assert!(matches!(
            dispatch_tool_call(&tools(), &unknown).await,
            Err(UpstreamError::UnknownTool(name)) if name == "calculator"
        ));

        let garbled = ToolCall {
            function: FunctionCall {
                name: "web_search".to_string(),
                arguments: "{query".to_string(),
            },
            ..call
        };
        assert!(matches!(
            dispatch_tool_call(&tools(), &garbled).await,
            Err(UpstreamError::Tool { .. })
        ));
    }
}
