//! Chat-completions model access.
//!
//! [`ChatModel`] is the seam between the registry/dispatch loop and the hosted
//! model. [`AzureOpenAi`] talks to an Azure OpenAI deployment;
//! [`ScriptedModel`] replays canned responses in tests.

mod azure;
pub mod mock;

pub use azure::AzureOpenAi;
pub use mock::ScriptedModel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// System instruction used by the `summarize_paper` tool
pub const SUMMARY_INSTRUCTION: &str =
    "You are a helpful research assistant. Summarize this academic paper in plain English.";

/// Completion budget for a single summary
pub const SUMMARY_MAX_TOKENS: u32 = 500;

/// One message of a chat exchange, tagged by role on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(default)]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::User {
            content: content.into(),
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        ChatMessage::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }
}

/// A function call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: function_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Function name plus its JSON-encoded arguments, as sent by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Raw JSON text; may be malformed
    pub arguments: String,
}

/// A single completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Function-tool declarations; `None` forbids tool calls
    pub tools: Option<Vec<Value>>,
    pub max_completion_tokens: u32,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>, max_completion_tokens: u32) -> Self {
        Self {
            messages,
            tools: None,
            max_completion_tokens,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = Some(tools);
        self
    }
}

/// The assistant turn returned by the model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl ChatResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls: calls,
        }
    }

    /// The assistant message to append to the conversation history
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::Assistant {
            content: self.content.clone(),
            tool_calls: self.tool_calls.clone(),
        }
    }
}

/// A hosted chat-completions model
#[async_trait]
pub trait ChatModel: Send + Sync + std::fmt::Debug {
    /// Run one completion. Endpoint failures map to [`crate::Error::Provider`].
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// Summarize paper text in plain English
pub async fn summarize(model: &dyn ChatModel, text: &str) -> Result<String> {
    let request = ChatRequest::new(
        vec![
            ChatMessage::system(SUMMARY_INSTRUCTION),
            ChatMessage::user(text),
        ],
        SUMMARY_MAX_TOKENS,
    );

    let response = model.complete(&request).await?;
    Ok(response.content.unwrap_or_default().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_wire_format() {
        let msg = ChatMessage::tool("call_1", "[\"2301.1\"]");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "tool", "tool_call_id": "call_1", "content": "[\"2301.1\"]"})
        );

        let assistant = ChatResponse::tool_calls(vec![ToolCall::new(
            "call_1",
            "search_papers",
            "{\"topic\":\"x\"}",
        )])
        .to_message();
        let value = serde_json::to_value(&assistant).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["content"], Value::Null);
        assert_eq!(value["tool_calls"][0]["type"], "function");
        assert_eq!(value["tool_calls"][0]["function"]["name"], "search_papers");

        let plain = serde_json::to_value(ChatResponse::text("hi").to_message()).unwrap();
        assert!(plain.get("tool_calls").is_none());
    }

    #[tokio::test]
    async fn test_summarize_sends_fixed_instruction() {
        let model = ScriptedModel::new([ChatResponse::text("  A short summary.\n")]);

        let summary = summarize(&model, "Full paper text").await.unwrap();
        assert_eq!(summary, "A short summary.");

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_completion_tokens, SUMMARY_MAX_TOKENS);
        assert!(requests[0].tools.is_none());
        assert_eq!(
            requests[0].messages,
            vec![
                ChatMessage::system(SUMMARY_INSTRUCTION),
                ChatMessage::user("Full paper text"),
            ]
        );
    }
}
