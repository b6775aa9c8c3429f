//! Stage 3: categorization and tagging.

use serde_json::Value;
use tracing::instrument;

use super::{fill_template, prompts, request_payload};
use crate::error::ProviderError;
use crate::parser::{string_list, text_field};
use crate::pipeline::Stage;
use crate::providers::{GenerateOptions, ModelClient};

pub const CATEGORY_FALLBACK: &str = "General";
pub const REASONING_FALLBACK: &str = "Categorization complete.";

/// Normalized output of the Organize stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    /// Distinct tags in the order the model gave them
    pub tags: Vec<String>,
    pub category: String,
    pub reasoning: String,
}

impl Default for Organization {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            category: CATEGORY_FALLBACK.to_string(),
            reasoning: REASONING_FALLBACK.to_string(),
        }
    }
}

impl Organization {
    pub fn from_payload(payload: &Value) -> Self {
        let mut tags: Vec<String> = Vec::new();
        for tag in string_list(payload, "tags") {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Self {
            tags,
            category: text_field(payload, "category")
                .unwrap_or_else(|| CATEGORY_FALLBACK.to_string()),
            reasoning: text_field(payload, "thoughtProcess")
                .unwrap_or_else(|| REASONING_FALLBACK.to_string()),
        }
    }
}

/// Build the organize prompt; topics are embedded as a JSON array.
pub fn build_prompt(summary: &str, related_topics: &[String]) -> String {
    let topics = serde_json::to_string(related_topics).unwrap_or_else(|_| "[]".to_string());
    fill_template(prompts::ORGANIZE, &[("summary", summary), ("topics", topics.as_str())])
}

/// Run the Organize stage.
#[instrument(skip_all, fields(topic_count = related_topics.len()))]
pub async fn organize<C: ModelClient>(
    client: &C,
    summary: &str,
    related_topics: &[String],
) -> Result<Organization, ProviderError> {
    let prompt = build_prompt(summary, related_topics);

    let organization = request_payload(client, Stage::Organize, &prompt, &GenerateOptions::json())
        .await?
        .map(|payload| Organization::from_payload(&payload))
        .unwrap_or_default();

    Ok(organization)
}
