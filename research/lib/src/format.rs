//! Output formatting for artifacts and the saved-research list.
//!
//! Terminal formatting uses colored output:
//! - **BOLD**: section headings and titles
//! - **GREEN**: high-relevance references
//! - **YELLOW**: other references
//! - **DIMMED**: reasoning log and metadata

use owo_colors::OwoColorize;

use crate::artifact::{Reference, ResearchArtifact};

/// Formats any serializable value (an artifact or a list) as pretty JSON.
pub fn format_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Formats a full artifact report for the terminal.
///
/// Sections mirror the report tabs: summary, insights, references and
/// notes, followed by the reasoning log.
pub fn format_artifact(artifact: &ResearchArtifact) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "{} {}",
        artifact.category.bold().cyan(),
        format!("· {} · {}", artifact.created_at.format("%Y-%m-%d %H:%M"), artifact.id).dimmed()
    ));
    if !artifact.tags.is_empty() {
        let tags: Vec<String> = artifact.tags.iter().map(|t| format!("#{}", t)).collect();
        lines.push(tags.join(" ").dimmed().to_string());
    }

    lines.push(String::new());
    lines.push("Summary".bold().to_string());
    lines.push(artifact.summary.clone());

    push_list(&mut lines, "Key Points", &artifact.key_points, |p| format!("- {}", p));
    push_list(&mut lines, "Quotes", &artifact.quotes, |q| format!("> {}", q));

    if !artifact.references.is_empty() {
        lines.push(String::new());
        lines.push("References".bold().to_string());
        for reference in &artifact.references {
            lines.push(format_reference(reference));
        }
    }

    push_list(&mut lines, "Related Topics", &artifact.related_topics, |t| {
        format!("- {}", t)
    });

    if let Some(note) = &artifact.user_note {
        lines.push(String::new());
        lines.push("Notes".bold().to_string());
        lines.push(note.clone());
    }

    lines.push(String::new());
    lines.push("Reasoning".bold().dimmed().to_string());
    let stages = ["analysis", "references", "organization"];
    for (stage, reasoning) in stages.iter().zip(artifact.reasoning_log.iter()) {
        lines.push(format!("  {}: {}", stage, reasoning).dimmed().to_string());
    }

    lines.join("\n")
}

fn push_list<F>(lines: &mut Vec<String>, heading: &str, items: &[String], render: F)
where
    F: Fn(&String) -> String,
{
    if items.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(heading.bold().to_string());
    lines.extend(items.iter().map(render));
}

fn format_reference(reference: &Reference) -> String {
    let kind = match reference.known_kind() {
        Some(kind) => kind.to_string(),
        None if reference.kind.is_empty() => "Reference".to_string(),
        None => reference.kind.clone(),
    };
    let badge = format!("[{}]", kind);
    let relevance = if reference.relevance.is_empty() {
        String::new()
    } else {
        format!(" ({} relevance)", reference.relevance)
    };

    let line = format!("- {} {}{}", badge, reference.title, relevance);
    if reference.is_high_relevance() {
        line.green().to_string()
    } else {
        line.yellow().to_string()
    }
}

/// Formats the saved-research list, one line per artifact.
///
/// ```text
/// - {id-prefix} [{category}] {source preview} 📝
/// ```
/// The 📝 marker means the artifact has a note.
pub fn format_history(items: &[ResearchArtifact]) -> String {
    items
        .iter()
        .map(|item| {
            let short_id: String = item.id.chars().take(8).collect();
            let note = if item.user_note.is_some() { " 📝" } else { "" };
            format!(
                "- {} {} {}{}",
                short_id.bold(),
                format!("[{}]", item.category).cyan(),
                item.source_preview(60),
                note
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
