//! Persistence of finished research artifacts.
//!
//! The pipeline never touches storage. A [`ResultStore`] persists the whole
//! ordered list of artifacts at once, and [`ResearchHistory`] is the
//! controller a front end uses to mutate that list and keep it saved.

pub mod history;

pub use history::ResearchHistory;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::artifact::ResearchArtifact;
use crate::error::StoreError;

/// Keyed persistence of artifacts across sessions.
pub trait ResultStore {
    /// Load every stored artifact, newest first. Missing or malformed data
    /// yields an empty list rather than an error.
    fn load(&self) -> Vec<ResearchArtifact>;

    /// Replace the stored list with `items`.
    fn save_all(&self, items: &[ResearchArtifact]) -> Result<(), StoreError>;
}

/// Decode a stored list, treating anything unreadable as empty.
fn decode(content: &str, origin: &str) -> Vec<ResearchArtifact> {
    match serde_json::from_str(content) {
        Ok(items) => items,
        Err(e) => {
            warn!(origin, error = %e, "Stored research items are malformed, starting empty");
            Vec::new()
        }
    }
}

/// Stores artifacts as a pretty-printed JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`default_store_path`].
    pub fn at_default_location() -> Self {
        Self::new(default_store_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultStore for JsonFileStore {
    fn load(&self) -> Vec<ResearchArtifact> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let items = decode(&content, &self.path.display().to_string());
                debug!(path = %self.path.display(), count = items.len(), "Loaded research items");
                items
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read result store");
                Vec::new()
            }
        }
    }

    fn save_all(&self, items: &[ResearchArtifact]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(items)?;
        let write_err = |source| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&self.path, content).map_err(write_err)?;

        debug!(path = %self.path.display(), count = items.len(), "Saved research items");
        Ok(())
    }
}

/// Keeps the serialized list in memory. Useful for tests and throwaway
/// sessions; it goes through the same JSON encoding as the file store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    content: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw stored content, as if read from disk.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Mutex::new(Some(content.into())),
        }
    }

    /// The raw content last saved, if any.
    pub fn content(&self) -> Option<String> {
        self.content.lock().ok().and_then(|c| c.clone())
    }
}

impl ResultStore for MemoryStore {
    fn load(&self) -> Vec<ResearchArtifact> {
        match self.content() {
            Some(content) => decode(&content, "memory"),
            None => Vec::new(),
        }
    }

    fn save_all(&self, items: &[ResearchArtifact]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(items)?;
        let mut guard = self.content.lock().map_err(|_| StoreError::Poisoned)?;
        *guard = Some(content);
        Ok(())
    }
}

/// `$RESEARCH_DIR/.research/assistant/history.json`, using the home
/// directory when `RESEARCH_DIR` is not set.
pub fn default_store_path() -> PathBuf {
    let base = std::env::var("RESEARCH_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));

    base.join(".research").join("assistant").join("history.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serial_test::serial;
    use tempfile::tempdir;

    fn artifact(id: &str) -> ResearchArtifact {
        ResearchArtifact {
            id: id.to_string(),
            created_at: Utc::now(),
            source_text: format!("source {}", id),
            summary: format!("summary {}", id),
            key_points: vec![],
            quotes: vec![],
            references: vec![],
            related_topics: vec![],
            tags: vec![],
            category: "General".to_string(),
            reasoning_log: ["a".to_string(), "b".to_string(), "c".to_string()],
            user_note: None,
        }
    }

    #[test]
    fn test_file_store_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("history.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_file_store_round_trip_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("history.json"));

        store.save_all(&[artifact("a"), artifact("b")]).unwrap();

        let loaded = store.load();
        let ids: Vec<&str> = loaded.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_file_store_malformed_content_fails_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{ this is not a list").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_memory_store_malformed_content_fails_open() {
        let store = MemoryStore::with_content("[{\"id\": 1}]");
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().is_empty());
        store.save_all(&[artifact("x")]).unwrap();
        assert_eq!(store.load()[0].id, "x");
        assert!(store.content().unwrap().contains("\"sourceText\""));
    }

    #[test]
    fn test_memory_store_reports_poisoned_lock() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let poisoner = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.content.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        let result = store.save_all(&[artifact("x")]);
        assert!(matches!(result, Err(StoreError::Poisoned)));
    }

    #[test]
    #[serial]
    fn test_default_store_path_respects_research_dir() {
        unsafe {
            std::env::set_var("RESEARCH_DIR", "/tmp/research-home");
        }
        let path = default_store_path();
        unsafe {
            std::env::remove_var("RESEARCH_DIR");
        }
        assert_eq!(
            path,
            PathBuf::from("/tmp/research-home/.research/assistant/history.json")
        );
    }
}
