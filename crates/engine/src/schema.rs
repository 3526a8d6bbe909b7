//! Field-key schema shared by every entity in a collection.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::GridError;

/// Key reserved for the entity identifier in emitted records.
pub const RESERVED_ID_KEY: &str = "id";

/// Ordered, duplicate-free set of field keys.
///
/// Entities store their cells positionally against this list, so every
/// entity in a collection carries exactly these keys and no others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    keys: Arc<[String]>,
}

impl FieldSchema {
    pub fn new<I, S>(keys: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(GridError::EmptySchema);
        }

        let mut seen = HashSet::new();
        for key in &keys {
            if key == RESERVED_ID_KEY {
                return Err(GridError::ReservedFieldKey(key.clone()));
            }
            if !seen.insert(key.as_str()) {
                return Err(GridError::DuplicateFieldKey(key.clone()));
            }
        }

        Ok(Self { keys: keys.into() })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false: construction rejects empty schemas.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index_of(key).is_some()
    }

    /// Resolve a key or reject it as a caller bug.
    pub fn resolve(&self, key: &str) -> Result<usize, GridError> {
        self.index_of(key)
            .ok_or_else(|| GridError::InvalidFieldKey(key.to_string()))
    }
}
