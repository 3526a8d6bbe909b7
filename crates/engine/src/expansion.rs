//! Auto-expansion: keep a blank entity in the trailing slot.
//!
//! Expansion is both an edit-triggered action (`should_expand`) and a
//! maintained invariant (`needs_trailing_blank`), evaluated directly from the
//! mutation call site rather than by a reactive watcher.

use crate::collection::GridOptions;
use crate::entity::Entity;

/// Decide whether an edit to entity `index` must append a new blank entity.
///
/// `was_empty` is the emptiness of the edited entity before the edit and
/// `len` the collection length before any append.
pub fn should_expand(
    options: &GridOptions,
    index: usize,
    len: usize,
    was_empty: bool,
    value: &str,
) -> bool {
    if !options.auto_expand {
        return false;
    }
    // Only the trailing slot expands
    if index + 1 != len {
        return false;
    }
    was_empty && !value.trim().is_empty()
}

/// True when the last entity has content and auto-expand requires a blank after it.
pub fn needs_trailing_blank(options: &GridOptions, entities: &[Entity]) -> bool {
    options.auto_expand && entities.last().is_some_and(|last| !last.is_empty())
}

/// Index of the trailing placeholder, if the grid keeps one.
///
/// The placeholder never receives propagated values: filling it would make
/// it non-empty and force another append.
pub fn placeholder_index(options: &GridOptions, entities: &[Entity]) -> Option<usize> {
    if !options.auto_expand {
        return None;
    }
    match entities.last() {
        Some(last) if last.is_empty() => Some(entities.len() - 1),
        _ => None,
    }
}
