//! Runtime check of the collection invariants.
//!
//! Used by the test harness after every operation and available to hosts
//! that want a debug assertion after applying untrusted scripts.

use std::collections::HashSet;

use thiserror::Error;

use crate::collection::EntityCollection;
use crate::entity::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{len} entities is below the floor of {min}")]
    BelowFloor { len: usize, min: usize },

    #[error("trailing entity {0} is not blank")]
    TrailingNotBlank(EntityId),

    #[error("duplicate entity id {0}")]
    DuplicateId(EntityId),

    #[error("entity {id} has {found} fields, schema has {expected}")]
    SchemaMismatch {
        id: EntityId,
        expected: usize,
        found: usize,
    },
}

/// Every invariant violation currently present (empty when healthy).
pub fn check(collection: &EntityCollection) -> Vec<Violation> {
    let mut violations = Vec::new();
    let options = collection.options();
    let entities = collection.entities();

    if entities.len() < options.min_columns {
        violations.push(Violation::BelowFloor {
            len: entities.len(),
            min: options.min_columns,
        });
    }

    if options.auto_expand {
        if let Some(last) = entities.last().filter(|e| !e.is_empty()) {
            violations.push(Violation::TrailingNotBlank(last.id()));
        }
    }

    let mut seen = HashSet::new();
    let expected = collection.schema().len();
    for entity in entities {
        if !seen.insert(entity.id()) {
            violations.push(Violation::DuplicateId(entity.id()));
        }
        if entity.cells().len() != expected {
            violations.push(Violation::SchemaMismatch {
                id: entity.id(),
                expected,
                found: entity.cells().len(),
            });
        }
    }

    violations
}
