//! Error types for the research assistant.
//!
//! Errors are split by tier: a [`ProviderError`] is a failed model call, a
//! [`PipelineError`] is what the caller of the pipeline sees, and
//! [`StoreError`] covers persistence of finished artifacts. Malformed model
//! output is never an error at this level; stages recover from it locally.

use thiserror::Error;

use crate::pipeline::Stage;

/// Failure of the model client itself (transport, auth, quota, timeout).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("model request failed: {0}")]
    Completion(#[from] rig::completion::CompletionError),

    #[error("Missing API key for {provider}. Set {env_var}")]
    MissingApiKey {
        provider: String,
        env_var: String,
    },

    #[error("Timeout waiting for {provider} after {seconds}s")]
    Timeout { provider: String, seconds: u64 },

    #[error("{provider} request failed: {reason}")]
    Request { provider: String, reason: String },
}

/// Failure of a full pipeline run. No artifact exists when this is returned.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: ProviderError,
    },
}

impl PipelineError {
    /// The stage whose model call failed.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Stage { stage, .. } => *stage,
        }
    }
}

/// The model's text could not be read as JSON.
#[derive(Debug, Error)]
#[error("response payload is not valid JSON: {0}")]
pub struct PayloadError(#[from] pub serde_json::Error);

/// Errors raised while persisting or mutating stored artifacts.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write result store at {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize artifacts: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("In-memory result store is unavailable: its lock was poisoned")]
    Poisoned,

    #[error("No research artifact with id '{0}'")]
    NotFound(String),

    #[error("Id prefix '{prefix}' matches {count} artifacts")]
    Ambiguous { prefix: String, count: usize },
}

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}
