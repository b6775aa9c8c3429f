//! Research Assistant Library - structured research notes from free text
//!
//! A pasted text goes through three model-backed stages, each feeding the
//! next:
//!
//! 1. **Analyze** - summary, key points, quotes
//! 2. **SuggestReferences** - references and related topics for the summary
//! 3. **Organize** - one broad category and a few tags
//!
//! The result is a single [`ResearchArtifact`] carrying every stage's output
//! and a three-entry reasoning log. Model replies are never trusted: each
//! field falls back to a safe default when missing or malformed. A failed
//! model call, on the other hand, aborts the whole run and produces nothing.
//!
//! ```no_run
//! use research_assistant::{PipelineConfig, gemini_from_env, run_pipeline};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_env()?;
//! let client = gemini_from_env(&config.model)?;
//! let artifact = run_pipeline(&client, &config, "Some article text", |phase| {
//!     eprintln!("{}", phase.description());
//! })
//! .await?;
//! println!("{}", artifact.summary);
//! # Ok(())
//! # }
//! ```
//!
//! Persistence lives in [`store`]: the pipeline itself never touches it.

pub mod artifact;
pub mod config;
pub mod error;
pub mod format;
pub mod parser;
pub mod pipeline;
pub mod providers;
pub mod stages;
pub mod store;
pub mod utils;

pub use artifact::{Reference, ReferenceKind, ResearchArtifact};
pub use config::PipelineConfig;
pub use error::{ConfigError, PayloadError, PipelineError, ProviderError, StoreError};
pub use parser::extract_payload;
pub use pipeline::{Phase, Pipeline, Stage, run_pipeline};
pub use providers::{
    GenerateOptions, ModelClient, ResponseFormat, RigModelClient, WithTimeout, gemini_from_env,
};
pub use store::{JsonFileStore, MemoryStore, ResearchHistory, ResultStore};
