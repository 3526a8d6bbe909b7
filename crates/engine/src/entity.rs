//! Entities: one repeating record in the grid (a cabinet, a PDU, an antenna).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::FieldSchema;

/// Identifier of an entity within its collection.
///
/// Positive, unique, and never reused after deletion within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One field of one entity, with its auto-fill bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCell {
    pub value: String,
    /// Current value was propagated from the primary entity.
    pub auto_filled: bool,
    /// User edited this field directly; propagation skips it until reset.
    pub manual_override: bool,
}

impl FieldCell {
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    id: EntityId,
    cells: Vec<FieldCell>,
}

impl Entity {
    /// A fresh entity with every field blank.
    pub fn blank(id: EntityId, schema: &FieldSchema) -> Self {
        Self {
            id,
            cells: vec![FieldCell::default(); schema.len()],
        }
    }

    /// Build from an externally loaded record.
    ///
    /// Keys outside the schema are dropped and missing keys are left blank.
    /// Loaded values carry no auto-fill or override flags.
    pub fn from_record(id: EntityId, record: &EntityRecord, schema: &FieldSchema) -> Self {
        let mut entity = Self::blank(id, schema);
        for (key, value) in &record.fields {
            match schema.index_of(key) {
                Some(idx) => entity.cells[idx].value = value.clone(),
                None => log::debug!("dropping unknown key '{}' from loaded entity {}", key, id),
            }
        }
        entity
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn cells(&self) -> &[FieldCell] {
        &self.cells
    }

    pub fn cell(&self, field: usize) -> Option<&FieldCell> {
        self.cells.get(field)
    }

    pub(crate) fn cell_mut(&mut self, field: usize) -> Option<&mut FieldCell> {
        self.cells.get_mut(field)
    }

    /// True iff every field's trimmed value is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(FieldCell::is_blank)
    }

    /// Apply a direct user edit to one field.
    ///
    /// Marks the field as manually overridden and clears its auto-fill flag.
    /// Out-of-range field indices return the entity unchanged.
    pub fn with_field(mut self, field: usize, value: &str) -> Self {
        if let Some(cell) = self.cells.get_mut(field) {
            cell.value = value.to_string();
            cell.manual_override = true;
            cell.auto_filled = false;
        }
        self
    }

    /// Values only, keyed by field name.
    pub fn to_record(&self, schema: &FieldSchema) -> EntityRecord {
        let fields = schema
            .keys()
            .iter()
            .zip(&self.cells)
            .map(|(key, cell)| (key.clone(), cell.value.clone()))
            .collect();
        EntityRecord { id: self.id, fields }
    }
}

/// Wire shape of an entity: id plus field/value pairs, no bookkeeping flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl EntityRecord {
    pub fn new(id: u64) -> Self {
        Self {
            id: EntityId::from_raw(id),
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}
