//! Stage 1: deep analysis and summarization of the source text.

use serde_json::Value;
use tracing::{debug, instrument};

use super::{fill_template, prompts, request_payload};
use crate::config::PipelineConfig;
use crate::error::ProviderError;
use crate::parser::{string_list, text_field};
use crate::pipeline::Stage;
use crate::providers::{GenerateOptions, ModelClient};
use crate::utils::{exceeds_chars, truncate_chars};

pub const SUMMARY_FALLBACK: &str = "Could not generate summary.";
pub const REASONING_FALLBACK: &str = "Analysis complete.";

pub const SYSTEM_INSTRUCTION: &str =
    "You are a meticulous research analyst. Always think step-by-step.";

/// Normalized output of the Analyze stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Never empty; later stages depend on it
    pub summary: String,
    pub key_points: Vec<String>,
    pub quotes: Vec<String>,
    pub reasoning: String,
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            summary: SUMMARY_FALLBACK.to_string(),
            key_points: Vec::new(),
            quotes: Vec::new(),
            reasoning: REASONING_FALLBACK.to_string(),
        }
    }
}

impl Analysis {
    /// Coalesce a model payload field by field.
    pub fn from_payload(payload: &Value) -> Self {
        let defaults = Self::default();
        Self {
            summary: text_field(payload, "summary").unwrap_or(defaults.summary),
            key_points: string_list(payload, "keyPoints"),
            quotes: string_list(payload, "quotes"),
            reasoning: text_field(payload, "thoughtProcess").unwrap_or(defaults.reasoning),
        }
    }
}

/// Build the analysis prompt over at most `max_chars` characters of `text`.
pub fn build_prompt(text: &str, max_chars: usize) -> String {
    fill_template(prompts::ANALYZE, &[("text", truncate_chars(text, max_chars))])
}

/// Run the Analyze stage.
#[instrument(skip_all, fields(source_chars = text.chars().count()))]
pub async fn analyze<C: ModelClient>(
    client: &C,
    text: &str,
    config: &PipelineConfig,
) -> Result<Analysis, ProviderError> {
    if exceeds_chars(text, config.max_analyzed_chars) {
        debug!(
            max_chars = config.max_analyzed_chars,
            "Source text truncated for analysis"
        );
    }

    let prompt = build_prompt(text, config.max_analyzed_chars);
    let options = GenerateOptions::json().with_system_instruction(SYSTEM_INSTRUCTION);

    let analysis = request_payload(client, Stage::Analyze, &prompt, &options)
        .await?
        .map(|payload| Analysis::from_payload(&payload))
        .unwrap_or_default();

    Ok(analysis)
}
