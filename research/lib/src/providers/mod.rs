//! The model client boundary.
//!
//! The pipeline only needs one capability from a language model: turn a
//! prompt (plus an optional system instruction) into text. [`ModelClient`]
//! is that seam; [`gemini`] provides the production implementation on top of
//! rig, and tests drive the pipeline with scripted doubles.

pub mod gemini;

use serde_json::{Value, json};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::ProviderError;

pub use gemini::{GEMINI_API_KEY_ENV, RigModelClient, gemini_from_env};

/// Output shape requested from the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Json,
    Text,
}

impl ResponseFormat {
    /// Provider parameters that ask for this format, if any are needed.
    pub fn generation_params(&self) -> Option<Value> {
        match self {
            ResponseFormat::Json => Some(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })),
            ResponseFormat::Text => None,
        }
    }
}

/// Per-call options passed alongside the prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    pub system_instruction: Option<String>,
    pub response_format: ResponseFormat,
}

impl GenerateOptions {
    /// Options requesting JSON output with no system instruction.
    pub fn json() -> Self {
        Self::default()
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

/// A language model that turns a prompt into raw text.
///
/// The text is expected to be JSON, possibly fenced; interpreting it is the
/// caller's job. Implementations report transport, auth and quota failures
/// as [`ProviderError`] and do not retry.
pub trait ModelClient {
    /// Short provider name used in logs and error messages.
    fn provider(&self) -> &str;

    fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}

impl<C: ModelClient + Sync> ModelClient for &C {
    fn provider(&self) -> &str {
        (**self).provider()
    }

    fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send {
        (**self).generate(prompt, options)
    }
}

/// Wraps a client and fails any call that runs longer than `timeout`.
#[derive(Debug, Clone)]
pub struct WithTimeout<C> {
    inner: C,
    timeout: Duration,
}

impl<C: ModelClient> WithTimeout<C> {
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: ModelClient + Sync> ModelClient for WithTimeout<C> {
    fn provider(&self) -> &str {
        self.inner.provider()
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ProviderError> {
        match tokio::time::timeout(self.timeout, self.inner.generate(prompt, options)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    provider = self.inner.provider(),
                    timeout_secs = self.timeout.as_secs_f32(),
                    "Model request timed out"
                );
                Err(ProviderError::Timeout {
                    provider: self.inner.provider().to_string(),
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }
}
