//! Scripted chat model for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::error::{Error, Result};
use crate::llm::{ChatModel, ChatRequest, ChatResponse};

#[derive(Debug)]
enum Step {
    Reply(ChatResponse),
    Fail(String),
}

/// Replays queued responses in order and records every request.
///
/// Once the script is exhausted each call fails with a provider error.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new(responses: impl IntoIterator<Item = ChatResponse>) -> Self {
        let model = Self::default();
        for response in responses {
            model.push(response);
        }
        model
    }

    /// Queue a response
    pub fn push(&self, response: ChatResponse) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Step::Reply(response));
    }

    /// Queue a provider failure
    pub fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Step::Fail(message.into()));
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let step = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match step {
            Some(Step::Reply(response)) => Ok(response),
            Some(Step::Fail(message)) => Err(Error::Provider(message)),
            None => Err(Error::Provider("scripted model has no more responses".to_string())),
        }
    }
}
