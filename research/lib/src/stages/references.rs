//! Stage 2: reference suggestions, fed by the Analyze summary.

use serde_json::{Map, Value};
use tracing::instrument;

use super::{fill_template, prompts, request_payload};
use crate::artifact::Reference;
use crate::config::PipelineConfig;
use crate::error::ProviderError;
use crate::parser::{object_list, scalar_text, string_list, text_field};
use crate::pipeline::Stage;
use crate::providers::{GenerateOptions, ModelClient};
use crate::utils::truncate_chars;

pub const REASONING_FALLBACK: &str = "References generated.";

/// Normalized output of the SuggestReferences stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSuggestions {
    pub references: Vec<Reference>,
    pub related_topics: Vec<String>,
    pub reasoning: String,
}

impl Default for ReferenceSuggestions {
    fn default() -> Self {
        Self {
            references: Vec::new(),
            related_topics: Vec::new(),
            reasoning: REASONING_FALLBACK.to_string(),
        }
    }
}

impl ReferenceSuggestions {
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            references: object_list(payload, "references")
                .into_iter()
                .map(reference_from_object)
                .collect(),
            related_topics: string_list(payload, "relatedTopics"),
            reasoning: text_field(payload, "thoughtProcess")
                .unwrap_or_else(|| REASONING_FALLBACK.to_string()),
        }
    }
}

// Kind is passed through unvalidated; `kind` is accepted as an alias of `type`.
fn reference_from_object(entry: &Map<String, Value>) -> Reference {
    let field = |key: &str| entry.get(key).and_then(scalar_text);
    Reference {
        title: field("title").unwrap_or_default(),
        kind: field("type").or_else(|| field("kind")).unwrap_or_default(),
        relevance: field("relevance").unwrap_or_default(),
    }
}

/// Build the reference prompt. Only a short prefix of the source goes in,
/// as disambiguating context for the summary.
pub fn build_prompt(summary: &str, source_text: &str, snippet_chars: usize) -> String {
    fill_template(
        prompts::REFERENCES,
        &[
            ("summary", summary),
            ("snippet", truncate_chars(source_text, snippet_chars)),
        ],
    )
}

/// Run the SuggestReferences stage.
#[instrument(skip_all)]
pub async fn suggest_references<C: ModelClient>(
    client: &C,
    summary: &str,
    source_text: &str,
    config: &PipelineConfig,
) -> Result<ReferenceSuggestions, ProviderError> {
    let prompt = build_prompt(summary, source_text, config.context_snippet_chars);

    let suggestions = request_payload(
        client,
        Stage::SuggestReferences,
        &prompt,
        &GenerateOptions::json(),
    )
    .await?
    .map(|payload| ReferenceSuggestions::from_payload(&payload))
    .unwrap_or_default();

    Ok(suggestions)
}
