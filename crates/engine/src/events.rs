//! Mutation bookkeeping for entity collections.
//!
//! Every mutation returns a `MutationReport`. Hosts use it to decide whether
//! to schedule persistence and which cells to re-render; the test harness
//! uses it to verify what the policies did.

use serde::Serialize;

use crate::entity::EntityId;

/// Who caused the most recent mutation.
///
/// Consulted synchronously instead of out-of-band "is this a user
/// interaction" flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationSource {
    /// Typing, deleting, dragging, resetting an override.
    User,
    /// Contents replaced from the persistence collaborator.
    ExternalLoad,
    /// Invariant maintenance or an explicit cleanup sweep.
    #[default]
    Policy,
}

impl MutationSource {
    /// Loads must not echo back to the collaborator as saves.
    pub fn should_persist(self) -> bool {
        !matches!(self, MutationSource::ExternalLoad)
    }
}

/// What a single mutation did to the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MutationReport {
    pub source: MutationSource,
    /// Revision after this mutation (unchanged for no-ops).
    pub revision: u64,
    /// Entity whose field the user edited directly.
    pub edited: Option<EntityId>,
    /// Entities created (expansion, floor backfill, cleanup synthesis).
    pub appended: Vec<EntityId>,
    /// Entities destroyed (explicit delete or cleanup sweep).
    pub removed: Vec<EntityId>,
    /// Siblings that received a propagated value.
    pub auto_filled: Vec<EntityId>,
    /// Order changed without membership changing.
    pub reordered: bool,
    /// Anything at all changed.
    pub changed: bool,
}

impl MutationReport {
    pub fn new(source: MutationSource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// Report for an operation that left the collection untouched.
    pub fn unchanged(source: MutationSource, revision: u64) -> Self {
        Self {
            source,
            revision,
            ..Self::default()
        }
    }
}
