//! Azure OpenAI chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::llm::{ChatMessage, ChatModel, ChatRequest, ChatResponse, ToolCall};
use crate::utils::HttpClient;

/// Client for one Azure OpenAI deployment
#[derive(Debug, Clone)]
pub struct AzureOpenAi {
    client: HttpClient,
    config: LlmConfig,
}

impl AzureOpenAi {
    pub fn new(client: HttpClient, config: LlmConfig) -> Self {
        Self { client, config }
    }

    pub fn deployment(&self) -> &str {
        &self.config.deployment
    }
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [Value]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    max_completion_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[async_trait]
impl ChatModel for AzureOpenAi {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let tools = request.tools.as_deref().filter(|tools| !tools.is_empty());
        let body = CompletionBody {
            messages: &request.messages,
            tools,
            tool_choice: tools.map(|_| "auto"),
            max_completion_tokens: request.max_completion_tokens,
        };

        tracing::debug!(
            deployment = %self.config.deployment,
            messages = request.messages.len(),
            tools = tools.map_or(0, |t| t.len()),
            "Requesting chat completion"
        );

        let response = self
            .client
            .post(&self.config.chat_completions_url())
            .header("api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Azure OpenAI request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Provider(format!("Failed to read Azure OpenAI response: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(Error::Provider(format!(
                "Azure OpenAI returned {}: {}",
                status, detail
            )));
        }

        let parsed: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| Error::Provider(format!("Invalid Azure OpenAI response: {}", e)))?;

        let message = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Provider("Azure OpenAI returned no choices".to_string()))?
            .message;

        Ok(ChatResponse {
            content: message.content,
            tool_calls: message.tool_calls.unwrap_or_default(),
        })
    }
}
