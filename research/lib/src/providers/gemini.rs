//! Gemini model client built on rig.
//!
//! [`RigModelClient`] adapts any rig completion model to [`ModelClient`];
//! [`gemini_from_env`] wires it to Google's Gemini API using the
//! `GEMINI_API_KEY` environment variable.

use rig::client::{CompletionClient, ProviderClient};
use rig::completion::{AssistantContent, CompletionModel};
use rig::providers::gemini;
use std::env;
use tracing::{debug, instrument};

use super::{GenerateOptions, ModelClient};
use crate::error::ProviderError;

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// A [`ModelClient`] backed by a rig completion model.
#[derive(Clone)]
pub struct RigModelClient<M> {
    provider: String,
    model: M,
}

impl<M: CompletionModel> RigModelClient<M> {
    pub fn new(provider: impl Into<String>, model: M) -> Self {
        Self {
            provider: provider.into(),
            model,
        }
    }
}

impl<M> ModelClient for RigModelClient<M>
where
    M: CompletionModel + Send + Sync,
{
    fn provider(&self) -> &str {
        &self.provider
    }

    #[instrument(skip_all, fields(provider = %self.provider, prompt_len = prompt.len()))]
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ProviderError> {
        let mut request = self.model.completion_request(prompt);

        if let Some(system) = &options.system_instruction {
            request = request.preamble(system.clone());
        }
        if let Some(params) = options.response_format.generation_params() {
            request = request.additional_params(params);
        }

        let response = request.send().await?;

        let content: String = response
            .choice
            .into_iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            content_len = content.len(),
            "Received model response"
        );

        Ok(content)
    }
}

/// Build a Gemini-backed client for `model` from the environment.
///
/// Fails with [`ProviderError::MissingApiKey`] instead of panicking when
/// the key is not set. The returned client does not borrow `model`.
pub fn gemini_from_env(
    model: &str,
) -> Result<RigModelClient<impl CompletionModel + Send + Sync + use<>>, ProviderError> {
    let has_key = env::var(GEMINI_API_KEY_ENV)
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false);
    if !has_key {
        return Err(ProviderError::MissingApiKey {
            provider: "gemini".to_string(),
            env_var: GEMINI_API_KEY_ENV.to_string(),
        });
    }

    let client = gemini::Client::from_env();
    Ok(RigModelClient::new("gemini", client.completion_model(model)))
}
