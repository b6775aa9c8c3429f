//! The saved-research list as seen by a front end.

use tracing::info;

use super::ResultStore;
use crate::artifact::ResearchArtifact;
use crate::error::StoreError;

/// All saved artifacts plus the one currently on display.
///
/// Every mutation is written through to the store before returning.
pub struct ResearchHistory<S> {
    store: S,
    items: Vec<ResearchArtifact>,
    current: Option<String>,
}

impl<S: ResultStore> ResearchHistory<S> {
    /// Load everything the store holds. Nothing is selected.
    pub fn open(store: S) -> Self {
        let items = store.load();
        Self {
            store,
            items,
            current: None,
        }
    }

    /// Saved artifacts, newest first.
    pub fn items(&self) -> &[ResearchArtifact] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn get(&self, id: &str) -> Option<&ResearchArtifact> {
        self.items.iter().find(|item| item.id == id)
    }

    /// The artifact on display, if any.
    pub fn current(&self) -> Option<&ResearchArtifact> {
        self.current.as_deref().and_then(|id| self.get(id))
    }

    /// Find an artifact by exact id, or by an id prefix that matches exactly
    /// one artifact.
    pub fn resolve(&self, id_or_prefix: &str) -> Result<&ResearchArtifact, StoreError> {
        if let Some(item) = self.get(id_or_prefix) {
            return Ok(item);
        }

        let matches: Vec<&ResearchArtifact> = self
            .items
            .iter()
            .filter(|item| !id_or_prefix.is_empty() && item.id.starts_with(id_or_prefix))
            .collect();

        match matches.as_slice() {
            [item] => Ok(item),
            [] => Err(StoreError::NotFound(id_or_prefix.to_string())),
            many => Err(StoreError::Ambiguous {
                prefix: id_or_prefix.to_string(),
                count: many.len(),
            }),
        }
    }

    /// Save a new artifact at the front of the list and display it.
    pub fn record(&mut self, artifact: ResearchArtifact) -> Result<(), StoreError> {
        info!(id = %artifact.id, "Recording research artifact");
        let id = artifact.id.clone();
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.push(artifact);
        items.extend(self.items.iter().cloned());

        self.commit(items)?;
        self.current = Some(id);
        Ok(())
    }

    /// Display an existing artifact.
    pub fn select(&mut self, id: &str) -> Option<&ResearchArtifact> {
        if self.get(id).is_some() {
            self.current = Some(id.to_string());
        }
        self.current()
    }

    /// Replace the note on artifact `id`. Nothing else changes.
    pub fn save_note(&mut self, id: &str, note: impl Into<String>) -> Result<(), StoreError> {
        let index = self.position(id)?;
        let mut items = self.items.clone();
        items[index].user_note = Some(note.into());

        self.commit(items)?;
        info!(id, "Saved note");
        Ok(())
    }

    /// Delete artifact `id`; if it was on display, nothing is displayed
    /// afterwards.
    pub fn delete(&mut self, id: &str) -> Result<ResearchArtifact, StoreError> {
        let index = self.position(id)?;
        let mut items = self.items.clone();
        let removed = items.remove(index);

        self.commit(items)?;
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }

        info!(id, "Deleted research artifact");
        Ok(removed)
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Write `items` to the store and only then adopt them, so a failed
    /// write leaves the in-memory list as it was.
    fn commit(&mut self, items: Vec<ResearchArtifact>) -> Result<(), StoreError> {
        self.store.save_all(&items)?;
        self.items = items;
        Ok(())
    }
}
