//! The three-stage research pipeline.
//!
//! Analyze → SuggestReferences → Organize, strictly in that order: each stage
//! consumes what the previous one produced, so nothing runs in parallel. A
//! failed model call in any stage aborts the run and no artifact is built;
//! malformed replies are absorbed by the stages' defaults instead.

use chrono::Utc;
use std::fmt;
use std::time::Instant;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::artifact::ResearchArtifact;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, ProviderError};
use crate::providers::ModelClient;
use crate::stages::{analyze, organize, suggest_references};

/// One of the three model-backed stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Analyze,
    SuggestReferences,
    Organize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Analyze => write!(f, "Analyze"),
            Stage::SuggestReferences => write!(f, "SuggestReferences"),
            Stage::Organize => write!(f, "Organize"),
        }
    }
}

/// Progress notifications, emitted in declaration order before the work
/// each one announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Analyzing,
    SearchingReferences,
    Organizing,
    Finalizing,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Analyzing,
        Phase::SearchingReferences,
        Phase::Organizing,
        Phase::Finalizing,
    ];

    /// Short fixed label.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Analyzing => "analyzing",
            Phase::SearchingReferences => "searching references",
            Phase::Organizing => "organizing",
            Phase::Finalizing => "finalizing",
        }
    }

    /// Status line suitable for showing to a user.
    pub fn description(&self) -> &'static str {
        match self {
            Phase::Analyzing => "Analyzing content & extracting key insights...",
            Phase::SearchingReferences => "Searching for references & related works...",
            Phase::Organizing => "Organizing & categorizing research notes...",
            Phase::Finalizing => "Finalizing report...",
        }
    }

    /// 1-based position in the run.
    pub fn step(&self) -> usize {
        match self {
            Phase::Analyzing => 1,
            Phase::SearchingReferences => 2,
            Phase::Organizing => 3,
            Phase::Finalizing => 4,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A model client paired with its configuration.
pub struct Pipeline<C> {
    client: C,
    config: PipelineConfig,
}

impl<C: ModelClient> Pipeline<C> {
    pub fn new(client: C, config: PipelineConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run all three stages over `source_text`. See [`run_pipeline`].
    pub async fn run<F>(
        &self,
        source_text: &str,
        on_progress: F,
    ) -> Result<ResearchArtifact, PipelineError>
    where
        F: FnMut(Phase),
    {
        run_pipeline(&self.client, &self.config, source_text, on_progress).await
    }
}

fn stage_failed(stage: Stage) -> impl FnOnce(ProviderError) -> PipelineError {
    move |source| {
        warn!(%stage, error = %source, "Stage failed, aborting pipeline");
        PipelineError::Stage { stage, source }
    }
}

/// Run Analyze, SuggestReferences and Organize in order and assemble the
/// artifact.
///
/// `on_progress` is called with each [`Phase`] before that phase starts; it
/// cannot influence the run. The returned artifact has a fresh id, the
/// current time, and the full untruncated `source_text`.
pub async fn run_pipeline<C, F>(
    client: &C,
    config: &PipelineConfig,
    source_text: &str,
    mut on_progress: F,
) -> Result<ResearchArtifact, PipelineError>
where
    C: ModelClient,
    F: FnMut(Phase),
{
    let span = info_span!(
        "research_pipeline",
        provider = client.provider(),
        model = %config.model,
        source_chars = source_text.chars().count()
    );

    async move {
        let start = Instant::now();
        info!("Starting research pipeline");

        on_progress(Phase::Analyzing);
        let analysis = analyze(client, source_text, config)
            .instrument(info_span!("stage", stage = %Stage::Analyze))
            .await
            .map_err(stage_failed(Stage::Analyze))?;
        info!(
            key_points = analysis.key_points.len(),
            quotes = analysis.quotes.len(),
            "Analysis complete"
        );

        on_progress(Phase::SearchingReferences);
        let suggestions = suggest_references(client, &analysis.summary, source_text, config)
            .instrument(info_span!("stage", stage = %Stage::SuggestReferences))
            .await
            .map_err(stage_failed(Stage::SuggestReferences))?;
        info!(
            references = suggestions.references.len(),
            related_topics = suggestions.related_topics.len(),
            "Reference suggestions complete"
        );

        on_progress(Phase::Organizing);
        let organization = organize(client, &analysis.summary, &suggestions.related_topics)
            .instrument(info_span!("stage", stage = %Stage::Organize))
            .await
            .map_err(stage_failed(Stage::Organize))?;
        info!(
            category = %organization.category,
            tags = organization.tags.len(),
            "Organization complete"
        );

        on_progress(Phase::Finalizing);
        let artifact = ResearchArtifact {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            source_text: source_text.to_string(),
            summary: analysis.summary,
            key_points: analysis.key_points,
            quotes: analysis.quotes,
            references: suggestions.references,
            related_topics: suggestions.related_topics,
            tags: organization.tags,
            category: organization.category,
            reasoning_log: [
                analysis.reasoning,
                suggestions.reasoning,
                organization.reasoning,
            ],
            user_note: None,
        };

        info!(
            id = %artifact.id,
            elapsed_secs = start.elapsed().as_secs_f32(),
            "Research pipeline complete"
        );
        Ok(artifact)
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::GenerateOptions;

    /// Returns the same reply for every stage.
    struct EchoClient {
        reply: Result<&'static str, &'static str>,
    }

    impl ModelClient for EchoClient {
        fn provider(&self) -> &str {
            "echo"
        }

        async fn generate(
            &self,
            _prompt: &str,
            _options: &GenerateOptions,
        ) -> Result<String, ProviderError> {
            self.reply
                .map(str::to_string)
                .map_err(|reason| ProviderError::Request {
                    provider: "echo".to_string(),
                    reason: reason.to_string(),
                })
        }
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_run_emits_tracing_events() {
        let pipeline = Pipeline::new(EchoClient { reply: Ok("{}") }, PipelineConfig::default());

        let artifact = pipeline.run("text", |_| {}).await.unwrap();

        assert_eq!(artifact.category, "General");
        assert!(logs_contain("Starting research pipeline"));
        assert!(logs_contain("Research pipeline complete"));
        assert!(logs_contain("research_pipeline"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_unreadable_reply_is_logged_not_returned() {
        let pipeline = Pipeline::new(
            EchoClient {
                reply: Ok("definitely not json"),
            },
            PipelineConfig::default(),
        );

        let artifact = pipeline.run("text", |_| {}).await.unwrap();

        assert_eq!(artifact.summary, crate::stages::analyze::SUMMARY_FALLBACK);
        assert!(logs_contain("Unreadable model response"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_failure_is_logged_with_stage() {
        let pipeline = Pipeline::new(
            EchoClient {
                reply: Err("service unavailable"),
            },
            PipelineConfig::default(),
        );

        let err = pipeline.run("text", |_| {}).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Analyze);
        assert!(logs_contain("Stage failed, aborting pipeline"));
    }

    #[test]
    fn test_phase_labels_in_order() {
        let labels: Vec<&str> = Phase::ALL.iter().map(Phase::label).collect();
        assert_eq!(
            labels,
            vec!["analyzing", "searching references", "organizing", "finalizing"]
        );
        let steps: Vec<usize> = Phase::ALL.iter().map(Phase::step).collect();
        assert_eq!(steps, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_stage_error_message_is_readable() {
        let err = PipelineError::Stage {
            stage: Stage::SuggestReferences,
            source: ProviderError::Timeout {
                provider: "gemini".to_string(),
                seconds: 30,
            },
        };
        assert_eq!(
            err.to_string(),
            "SuggestReferences stage failed: Timeout waiting for gemini after 30s"
        );
        assert_eq!(err.stage(), Stage::SuggestReferences);
    }
}
