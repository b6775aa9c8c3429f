//! Pipeline configuration.
//!
//! The two text bounds are tuning constants rather than protocol limits, so
//! they are exposed here and can be overridden through the environment or the
//! CLI.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Maximum number of characters of source text sent to the Analyze stage.
pub const DEFAULT_MAX_ANALYZED_CHARS: usize = 15_000;

/// Number of leading source characters sent to SuggestReferences as context.
pub const DEFAULT_CONTEXT_SNIPPET_CHARS: usize = 500;

pub const MODEL_ENV: &str = "RESEARCH_MODEL";
pub const MAX_ANALYZED_CHARS_ENV: &str = "RESEARCH_MAX_ANALYZED_CHARS";
pub const CONTEXT_SNIPPET_CHARS_ENV: &str = "RESEARCH_CONTEXT_SNIPPET_CHARS";
pub const TIMEOUT_SECS_ENV: &str = "RESEARCH_TIMEOUT_SECS";

/// Settings shared by the stages and the model client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Provider model name
    pub model: String,
    /// Cap applied to the text submitted for analysis
    pub max_analyzed_chars: usize,
    /// Cap applied to the context snippet sent with the summary
    pub context_snippet_chars: usize,
    /// Per-request timeout at the model client boundary; `None` waits forever
    pub request_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_analyzed_chars: DEFAULT_MAX_ANALYZED_CHARS,
            context_snippet_chars: DEFAULT_CONTEXT_SNIPPET_CHARS,
            request_timeout: None,
        }
    }
}

impl PipelineConfig {
    /// Build a configuration from defaults overridden by `RESEARCH_*`
    /// environment variables. Unset or empty variables keep the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(model) = read_var(MODEL_ENV) {
            config.model = model;
        }
        if let Some(n) = read_number(MAX_ANALYZED_CHARS_ENV)? {
            config.max_analyzed_chars = n;
        }
        if let Some(n) = read_number(CONTEXT_SNIPPET_CHARS_ENV)? {
            config.context_snippet_chars = n;
        }
        if let Some(secs) = read_number(TIMEOUT_SECS_ENV)? {
            config.request_timeout = Some(Duration::from_secs(secs as u64));
        }

        Ok(config)
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_number(name: &'static str) -> Result<Option<usize>, ConfigError> {
    match read_var(name) {
        None => Ok(None),
        Some(value) => match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(ConfigError::InvalidNumber { var: name, value }),
        },
    }
}
