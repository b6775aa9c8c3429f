//! The research artifact: the single structured result of a pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A suggested reference for further reading.
///
/// Fields are passed through from the model as-is; `kind` is expected to be
/// one of the [`ReferenceKind`] names but this is not enforced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reference {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub relevance: String,
}

/// The reference kinds the prompt asks for. Only used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Academic,
    Article,
    Book,
    Web,
}

impl ReferenceKind {
    /// Case-insensitive match on the kind name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "academic" => Some(Self::Academic),
            "article" => Some(Self::Article),
            "book" => Some(Self::Book),
            "web" => Some(Self::Web),
            _ => None,
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Academic => write!(f, "Academic"),
            ReferenceKind::Article => write!(f, "Article"),
            ReferenceKind::Book => write!(f, "Book"),
            ReferenceKind::Web => write!(f, "Web"),
        }
    }
}

impl Reference {
    /// The recognised kind, if the model used one of the known names.
    pub fn known_kind(&self) -> Option<ReferenceKind> {
        ReferenceKind::parse(&self.kind)
    }

    /// Whether the model rated this reference as highly relevant.
    pub fn is_high_relevance(&self) -> bool {
        self.relevance.to_lowercase().contains("high")
    }
}

/// The result of one complete pipeline run.
///
/// Everything except `user_note` is fixed at creation. `reasoning_log` is
/// positional: index 0 is Analyze, 1 is SuggestReferences, 2 is Organize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResearchArtifact {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// The full input, even when analysis only saw a prefix of it
    pub source_text: String,
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub quotes: Vec<String>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub related_topics: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: String,
    pub reasoning_log: [String; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_note: Option<String>,
}

impl ResearchArtifact {
    /// A short single-line preview of the source text.
    pub fn source_preview(&self, max_chars: usize) -> String {
        let flat = self.source_text.split_whitespace().collect::<Vec<_>>().join(" ");
        let preview = crate::utils::truncate_chars(&flat, max_chars);
        if preview.len() < flat.len() {
            format!("{}…", preview)
        } else {
            flat
        }
    }
}
