//! Auto-fill propagation from the primary entity.
//!
//! A value typed into the first entity fans out to every sibling whose field
//! is still blank or holds a previously propagated value, unless the user has
//! overridden that field on the sibling. The source is always index 0: edits
//! elsewhere never fan out and never flow back into the primary.

use crate::entity::{Entity, FieldCell};

/// Index of the propagation source.
pub const PRIMARY_INDEX: usize = 0;

/// Whether a sibling cell may receive a propagated value.
///
/// Loaded values (non-blank, neither auto-filled nor overridden) are treated
/// as owned data and are left alone.
pub fn accepts_auto_fill(cell: &FieldCell) -> bool {
    !cell.manual_override && (cell.is_blank() || cell.auto_filled)
}

/// Sibling indices that should receive a value propagated into `field`.
///
/// `placeholder` is the trailing blank slot kept by auto-expansion; it is
/// skipped so propagation never triggers another append.
pub fn targets(entities: &[Entity], field: usize, placeholder: Option<usize>) -> Vec<usize> {
    entities
        .iter()
        .enumerate()
        .skip(PRIMARY_INDEX + 1)
        .filter(|(idx, _)| Some(*idx) != placeholder)
        .filter(|(_, entity)| entity.cell(field).is_some_and(accepts_auto_fill))
        .map(|(idx, _)| idx)
        .collect()
}

/// Write a propagated value into a sibling cell.
///
/// Clearing the primary clears auto-filled siblings and drops their
/// highlight, since a blank cell has nothing to indicate.
pub fn fill(cell: &mut FieldCell, value: &str) {
    cell.value = value.to_string();
    cell.auto_filled = !cell.is_blank();
}
