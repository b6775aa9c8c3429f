//! The three pipeline stages.
//!
//! Each stage builds its prompt, calls the model once, and normalizes the
//! reply into a record whose every field has a safe default. A failed model
//! call is returned as an error; an unreadable reply is not and degrades to
//! the stage's default record.

pub mod analyze;
pub mod organize;
pub mod references;

pub use analyze::{Analysis, analyze};
pub use organize::{Organization, organize};
pub use references::{ReferenceSuggestions, suggest_references};

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::parser::extract_payload;
use crate::pipeline::Stage;
use crate::providers::{GenerateOptions, ModelClient};

/// Embedded prompt templates
mod prompts {
    pub const ANALYZE: &str = include_str!("../../prompts/analyze.md");
    pub const REFERENCES: &str = include_str!("../../prompts/references.md");
    pub const ORGANIZE: &str = include_str!("../../prompts/organize.md");
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"));

/// Substitute `{{name}}` placeholders in one pass. Inserted values are never
/// scanned again, and unknown placeholders are left as they are.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Call the model and parse its reply.
///
/// `Ok(None)` means the call succeeded but the reply was not JSON.
async fn request_payload<C: ModelClient>(
    client: &C,
    stage: Stage,
    prompt: &str,
    options: &GenerateOptions,
) -> Result<Option<Value>, ProviderError> {
    let raw = client.generate(prompt, options).await?;
    debug!(%stage, response_len = raw.len(), "Stage response received");

    match extract_payload(&raw) {
        Ok(payload) => Ok(Some(payload)),
        Err(e) => {
            warn!(%stage, error = %e, "Unreadable model response, using stage defaults");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_substitutes_known_placeholders() {
        let filled = fill_template("A: {{a}}, B: {{b}}", &[("a", "one"), ("b", "two")]);
        assert_eq!(filled, "A: one, B: two");
    }

    #[test]
    fn test_fill_template_does_not_rescan_values() {
        let filled = fill_template(
            "{{snippet}} / {{summary}}",
            &[("summary", "S"), ("snippet", "see {{summary}}")],
        );
        assert_eq!(filled, "see {{summary}} / S");
    }

    #[test]
    fn test_fill_template_keeps_unknown_placeholders() {
        assert_eq!(fill_template("{{other}} {x}", &[]), "{{other}} {x}");
    }
}
