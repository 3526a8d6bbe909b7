//! Boundary contracts for the remote collaborators.
//!
//! The grid only ever hands a filtered record array to an `EntityStore`;
//! mapping to the remote schema and the transport belong to the
//! implementation. Failures are reported to the host (toast, status line)
//! and never flow back into the grid: local edits are the working copy.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use surveygrid_engine::EntityRecord;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("'{0}' not found")]
    NotFound(String),
    #[error("rejected by server: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Persistence API for one form's entity array.
pub trait EntityStore {
    fn save(&mut self, form: &str, entities: &[EntityRecord]) -> Result<(), SyncError>;

    /// `NotFound` when the form has never been saved.
    fn load(&self, form: &str) -> Result<Vec<EntityRecord>, SyncError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMeta {
    pub id: u64,
    pub form: String,
    pub name: String,
    pub size: usize,
    pub uploaded_at: DateTime<Utc>,
}

/// Image-store API used by survey forms alongside the grid.
pub trait ImageStore {
    fn upload(&mut self, form: &str, name: &str, bytes: Vec<u8>) -> Result<ImageMeta, SyncError>;
    fn list(&self, form: &str) -> Result<Vec<ImageMeta>, SyncError>;
    fn delete(&mut self, id: u64) -> Result<(), SyncError>;
}

/// Build an `on_change` callback that saves every flush to `store`.
///
/// Save failures are logged and dropped; there is no retry and no rollback.
pub fn persist_to<S>(
    store: Rc<RefCell<S>>,
    form: impl Into<String>,
) -> impl FnMut(Vec<EntityRecord>) + 'static
where
    S: EntityStore + 'static,
{
    let form = form.into();
    move |records| match store.borrow_mut().save(&form, &records) {
        Ok(()) => log::debug!("saved {} entities for '{}'", records.len(), form),
        Err(e) => log::warn!("save of '{}' failed: {}", form, e),
    }
}

// ============================================================================
// In-memory collaborators
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryEntityStore {
    forms: HashMap<String, Vec<EntityRecord>>,
    saves: usize,
    fail_next: Option<SyncError>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next save fail with `err`.
    pub fn fail_next_save(&mut self, err: SyncError) {
        self.fail_next = Some(err);
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn saved(&self, form: &str) -> Option<&[EntityRecord]> {
        self.forms.get(form).map(Vec::as_slice)
    }
}

impl EntityStore for MemoryEntityStore {
    fn save(&mut self, form: &str, entities: &[EntityRecord]) -> Result<(), SyncError> {
        if let Some(err) = self.fail_next.take() {
            return Err(err);
        }
        self.forms.insert(form.to_string(), entities.to_vec());
        self.saves += 1;
        Ok(())
    }

    fn load(&self, form: &str) -> Result<Vec<EntityRecord>, SyncError> {
        self.forms
            .get(form)
            .cloned()
            .ok_or_else(|| SyncError::NotFound(form.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryImageStore {
    images: Vec<ImageMeta>,
    next_id: u64,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageStore for MemoryImageStore {
    fn upload(&mut self, form: &str, name: &str, bytes: Vec<u8>) -> Result<ImageMeta, SyncError> {
        if bytes.is_empty() {
            return Err(SyncError::Rejected(format!("empty upload '{}'", name)));
        }
        self.next_id += 1;
        let meta = ImageMeta {
            id: self.next_id,
            form: form.to_string(),
            name: name.to_string(),
            size: bytes.len(),
            uploaded_at: Utc::now(),
        };
        self.images.push(meta.clone());
        Ok(meta)
    }

    fn list(&self, form: &str) -> Result<Vec<ImageMeta>, SyncError> {
        Ok(self
            .images
            .iter()
            .filter(|m| m.form == form)
            .cloned()
            .collect())
    }

    fn delete(&mut self, id: u64) -> Result<(), SyncError> {
        let pos = self
            .images
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| SyncError::NotFound(format!("image {}", id)))?;
        self.images.remove(pos);
        Ok(())
    }
}
