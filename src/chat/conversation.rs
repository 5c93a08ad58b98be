//! Model-mediated tool calling for a single free-text query.
//!
//! ```text
//! AwaitModel --(text answer)--> Done
//! AwaitModel --(tool calls)---> ExecuteTools --> AwaitModel
//! ```
//!
//! Tool failures never end the exchange: they go back to the model as a tool
//! message starting with `Error:`. Only model (provider) failures abort it.

use serde_json::{json, Value};

use crate::config::ChatConfig;
use crate::error::Result;
use crate::llm::{ChatMessage, ChatModel, ChatRequest, ToolCall};
use crate::mcp::{result_text, Registry};

/// Tool whose results trigger automatic follow-up calls
const SEARCH_TOOL: &str = "search_papers";
const INFO_TOOL: &str = "extract_info";
const SUMMARY_TOOL: &str = "summarize_paper";

/// Where the exchange currently stands
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationState {
    AwaitModel,
    ExecuteTools(Vec<ToolCall>),
    Done(String),
}

/// Progress notifications emitted while a query runs
#[derive(Debug, Clone, PartialEq)]
pub enum Event<'a> {
    /// The model asked for a tool
    ToolCall { name: &'a str, arguments: &'a str },
    ToolResult { name: &'a str, text: &'a str },
    ToolError { name: &'a str, message: &'a str },
    /// Automatic follow-up after a search
    ChainInfo { paper_id: &'a str, info: &'a str },
    ChainSummary { paper_id: &'a str, summary: &'a str },
    ChainError { message: &'a str },
}

/// Receives [`Event`]s
pub trait Observer {
    fn on_event(&mut self, event: Event<'_>);
}

/// Discards every event
#[derive(Debug, Default)]
pub struct Silent;

impl Observer for Silent {
    fn on_event(&mut self, _event: Event<'_>) {}
}

/// One query's exchange with the model
pub struct Conversation<'a> {
    registry: &'a Registry,
    model: &'a dyn ChatModel,
    config: &'a ChatConfig,
}

impl<'a> Conversation<'a> {
    pub fn new(registry: &'a Registry, model: &'a dyn ChatModel, config: &'a ChatConfig) -> Self {
        Self {
            registry,
            model,
            config,
        }
    }

    /// Run the query to a final answer
    pub async fn run(&self, query: &str, observer: &mut dyn Observer) -> Result<String> {
        let tools = self.registry.tool_schemas();
        let mut messages = vec![ChatMessage::user(query)];
        let mut rounds = 0usize;
        let mut state = ConversationState::AwaitModel;

        loop {
            state = match state {
                ConversationState::AwaitModel => {
                    let tools_allowed = rounds < self.config.max_tool_rounds;
                    let mut request =
                        ChatRequest::new(messages.clone(), self.config.max_completion_tokens);
                    if tools_allowed {
                        request = request.with_tools(tools.clone());
                    }

                    let response = self.model.complete(&request).await?;
                    messages.push(response.to_message());

                    if response.tool_calls.is_empty() || !tools_allowed {
                        ConversationState::Done(response.content.unwrap_or_default())
                    } else {
                        ConversationState::ExecuteTools(response.tool_calls)
                    }
                }
                ConversationState::ExecuteTools(calls) => {
                    rounds += 1;
                    tracing::debug!(round = rounds, calls = calls.len(), "Executing tool calls");
                    for call in calls {
                        let content = self.execute(&call, observer).await;
                        messages.push(ChatMessage::tool(call.id, content));
                    }
                    if rounds >= self.config.max_tool_rounds {
                        tracing::info!(rounds, "Tool round limit reached, asking for a final answer");
                    }
                    ConversationState::AwaitModel
                }
                ConversationState::Done(answer) => return Ok(answer),
            };
        }
    }

    /// Run one requested tool and return the text sent back to the model
    async fn execute(&self, call: &ToolCall, observer: &mut dyn Observer) -> String {
        let name = call.function.name.as_str();
        let raw = call.function.arguments.as_str();
        observer.on_event(Event::ToolCall {
            name,
            arguments: raw,
        });

        let args = if raw.trim().is_empty() {
            Ok(json!({}))
        } else {
            serde_json::from_str::<Value>(raw)
        };

        let args = match args {
            Ok(args) => args,
            Err(e) => {
                let message = format!("malformed arguments for {}: {}", name, e);
                observer.on_event(Event::ToolError {
                    name,
                    message: &message,
                });
                return format!("Error: {}", message);
            }
        };

        match self.registry.call_tool(name, args).await {
            Ok(value) => {
                let text = result_text(&value);
                observer.on_event(Event::ToolResult { name, text: &text });
                if name == SEARCH_TOOL {
                    self.chain(&value, observer).await;
                }
                text
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(tool = name, error = %message, "Tool call failed");
                observer.on_event(Event::ToolError {
                    name,
                    message: &message,
                });
                format!("Error: {}", message)
            }
        }
    }

    /// Extract and summarize the first few papers a search returned.
    ///
    /// Stops at the first failure; the outcome is reported to the observer
    /// only and never reaches the model.
    async fn chain(&self, search_result: &Value, observer: &mut dyn Observer) {
        if self.config.chain_limit == 0
            || self.registry.tool(INFO_TOOL).is_none()
            || self.registry.tool(SUMMARY_TOOL).is_none()
        {
            return;
        }

        let ids = search_result
            .as_array()
            .map(|ids| ids.iter().filter_map(Value::as_str).collect::<Vec<_>>())
            .unwrap_or_default();

        for paper_id in ids.into_iter().take(self.config.chain_limit) {
            let info = match self
                .registry
                .call_tool(INFO_TOOL, json!({ "paper_id": paper_id }))
                .await
            {
                Ok(value) => result_text(&value),
                Err(e) => {
                    observer.on_event(Event::ChainError {
                        message: &e.to_string(),
                    });
                    return;
                }
            };
            observer.on_event(Event::ChainInfo {
                paper_id,
                info: &info,
            });

            match self
                .registry
                .call_tool(SUMMARY_TOOL, json!({ "text": info }))
                .await
            {
                Ok(value) => observer.on_event(Event::ChainSummary {
                    paper_id,
                    summary: &result_text(&value),
                }),
                Err(e) => {
                    observer.on_event(Event::ChainError {
                        message: &e.to_string(),
                    });
                    return;
                }
            }
        }
    }
}
