//! Serializable grid operations.
//!
//! Hosts translate UI events (keystrokes, delete buttons, drag/drop pairs)
//! into `GridOp`s; the replay CLI reads them from JSON scripts.

use serde::{Deserialize, Serialize};

use crate::collection::EntityCollection;
use crate::entity::{EntityId, EntityRecord};
use crate::error::GridError;
use crate::events::MutationReport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GridOp {
    SetField {
        index: usize,
        key: String,
        value: String,
    },
    Remove {
        id: EntityId,
    },
    Reorder {
        from: usize,
        to: usize,
    },
    Cleanup,
    ResetOverride {
        index: usize,
        key: String,
    },
    Load {
        entities: Vec<EntityRecord>,
    },
}

impl GridOp {
    pub fn set_field(index: usize, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SetField {
            index,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SetField { .. } => "set_field",
            Self::Remove { .. } => "remove",
            Self::Reorder { .. } => "reorder",
            Self::Cleanup => "cleanup",
            Self::ResetOverride { .. } => "reset_override",
            Self::Load { .. } => "load",
        }
    }
}

impl EntityCollection {
    /// Dispatch one operation.
    pub fn apply(&mut self, op: &GridOp) -> Result<MutationReport, GridError> {
        match op {
            GridOp::SetField { index, key, value } => self.set_field(*index, key, value),
            GridOp::Remove { id } => self.remove(*id),
            GridOp::Reorder { from, to } => self.reorder(*from, *to),
            GridOp::Cleanup => Ok(self.cleanup()),
            GridOp::ResetOverride { index, key } => self.reset_override(*index, key),
            GridOp::Load { entities } => Ok(self.load(entities.clone())),
        }
    }
}
