//! Shared test doubles for the integration tests.

#![allow(dead_code)]

use research_assistant::{GenerateOptions, ModelClient, ProviderError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted model reply.
pub enum Reply {
    Text(String),
    Fail(String),
}

impl Reply {
    pub fn json(value: serde_json::Value) -> Self {
        Reply::Text(value.to_string())
    }
}

/// A recorded call to the model.
#[derive(Debug, Clone)]
pub struct Call {
    pub prompt: String,
    pub options: GenerateOptions,
}

/// A model client that replays scripted replies in order and records every
/// call it receives.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl ModelClient for ScriptedClient {
    fn provider(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(Call {
            prompt: prompt.to_string(),
            options: options.clone(),
        });

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(reason)) => Err(ProviderError::Request {
                provider: "scripted".to_string(),
                reason,
            }),
            None => panic!("model called more times than scripted"),
        }
    }
}
