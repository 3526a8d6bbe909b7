//! The authoritative, invariant-preserving list of entities.
//!
//! After every mutation:
//! 1. `len() >= min_columns`
//! 2. with `auto_expand`, the last entity is empty
//! 3. ids are unique (not necessarily contiguous)
//! 4. every entity carries exactly the schema's field keys
//!
//! Operations are total: anything a caller gets wrong comes back as a
//! `GridError` with the collection untouched, and deleting an unknown id is
//! a silent no-op.

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityRecord, FieldCell};
use crate::error::GridError;
use crate::events::{MutationReport, MutationSource};
use crate::expansion;
use crate::propagation::{self, PRIMARY_INDEX};
use crate::schema::FieldSchema;

/// Per-screen behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    /// Floor on the number of entities (clamped to at least 1).
    pub min_columns: usize,
    /// Keep a blank entity in the trailing slot.
    pub auto_expand: bool,
    pub enable_reorder: bool,
    pub enable_delete: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            min_columns: 1,
            auto_expand: true,
            enable_reorder: true,
            enable_delete: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EntityCollection {
    schema: FieldSchema,
    options: GridOptions,
    entities: Vec<Entity>,
    /// Highest id ever issued; ids are never reused within a session.
    high_water: u64,
    revision: u64,
    last_mutation: MutationSource,
}

impl EntityCollection {
    /// Mount a collection, seeding it from `initial` (which may be empty).
    pub fn new(schema: FieldSchema, options: GridOptions, initial: Vec<EntityRecord>) -> Self {
        let options = GridOptions {
            min_columns: options.min_columns.max(1),
            ..options
        };
        let mut collection = Self {
            schema,
            options,
            entities: Vec::new(),
            high_water: 0,
            revision: 0,
            last_mutation: MutationSource::Policy,
        };
        collection.load(initial);
        collection
    }

    // Accessors

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Always false once mounted: the floor keeps at least one entity.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id() == id)
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(Entity::id).collect()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn last_mutation(&self) -> MutationSource {
        self.last_mutation
    }

    /// Cell at (`index`, `key`), if both exist.
    pub fn cell(&self, index: usize, key: &str) -> Option<&FieldCell> {
        let field = self.schema.index_of(key)?;
        self.entities.get(index)?.cell(field)
    }

    pub fn value(&self, index: usize, key: &str) -> Option<&str> {
        self.cell(index, key).map(|c| c.value.as_str())
    }

    /// Whether the cell should be highlighted as auto-filled.
    pub fn is_auto_filled(&self, index: usize, key: &str) -> bool {
        self.cell(index, key).is_some_and(|c| c.auto_filled)
    }

    pub fn is_manual_override(&self, index: usize, key: &str) -> bool {
        self.cell(index, key).is_some_and(|c| c.manual_override)
    }

    /// Every entity as a plain record, in display order.
    pub fn records(&self) -> Vec<EntityRecord> {
        self.entities
            .iter()
            .map(|e| e.to_record(&self.schema))
            .collect()
    }

    /// Records with content only; placeholders never leave the grid.
    pub fn non_empty_records(&self) -> Vec<EntityRecord> {
        self.entities
            .iter()
            .filter(|e| !e.is_empty())
            .map(|e| e.to_record(&self.schema))
            .collect()
    }

    // Mutations

    /// Apply a direct user edit, then expansion and propagation.
    pub fn set_field(
        &mut self,
        index: usize,
        key: &str,
        value: &str,
    ) -> Result<MutationReport, GridError> {
        let field = self.schema.resolve(key).inspect_err(|e| {
            log::warn!("rejected edit at index {}: {}", index, e);
        })?;
        let len = self.entities.len();
        if index >= len {
            log::warn!("rejected edit of '{}' at index {} (len {})", key, index, len);
            return Err(GridError::IndexOutOfRange { index, len });
        }

        let mut report = MutationReport::new(MutationSource::User);

        let was_empty = self.entities[index].is_empty();
        let edited = self.entities[index].clone().with_field(field, value);
        report.edited = Some(edited.id());
        self.entities[index] = edited;

        if expansion::should_expand(&self.options, index, len, was_empty, value) {
            let fresh = self.create();
            log::debug!("trailing slot gained content, appending entity {}", fresh.id());
            report.appended.push(fresh.id());
            self.entities.push(fresh);
        }

        if index == PRIMARY_INDEX {
            let placeholder = expansion::placeholder_index(&self.options, &self.entities);
            for target in propagation::targets(&self.entities, field, placeholder) {
                let entity = &mut self.entities[target];
                if let Some(cell) = entity.cell_mut(field) {
                    propagation::fill(cell, value);
                    report.auto_filled.push(entity.id());
                }
            }
            if !report.auto_filled.is_empty() {
                log::debug!("propagated '{}' to {} sibling(s)", key, report.auto_filled.len());
            }
        }

        report.changed = true;
        Ok(self.commit(report))
    }

    /// Delete an entity by id, backfilling to the floor.
    ///
    /// Unknown ids are a no-op.
    pub fn remove(&mut self, id: EntityId) -> Result<MutationReport, GridError> {
        if !self.options.enable_delete {
            log::warn!("rejected delete of entity {}: deletion disabled", id);
            return Err(GridError::DeleteDisabled);
        }
        let Some(pos) = self.position(id) else {
            log::debug!("delete of unknown entity {} ignored", id);
            return Ok(MutationReport::unchanged(MutationSource::User, self.revision));
        };

        let mut report = MutationReport::new(MutationSource::User);
        self.entities.remove(pos);
        report.removed.push(id);
        report.changed = true;
        Ok(self.commit(report))
    }

    /// Move the entity at `from` to `to`, shifting the others. Ids are untouched.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<MutationReport, GridError> {
        if !self.options.enable_reorder {
            log::warn!("rejected reorder {} -> {}: reordering disabled", from, to);
            return Err(GridError::ReorderDisabled);
        }
        let len = self.entities.len();
        for index in [from, to] {
            if index >= len {
                log::warn!("rejected reorder {} -> {} (len {})", from, to, len);
                return Err(GridError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(MutationReport::unchanged(MutationSource::User, self.revision));
        }

        let mut report = MutationReport::new(MutationSource::User);
        let moved = self.entities.remove(from);
        self.entities.insert(to, moved);
        report.reordered = true;
        report.changed = true;
        Ok(self.commit(report))
    }

    /// Sweep empty entities, keeping one trailing blank, sorted by id.
    ///
    /// Non-empty entities are all kept. The trailing blank is the highest-id
    /// empty entity when it sorts after every non-empty one, otherwise a
    /// freshly created entity. Shortfalls below the floor reuse the remaining
    /// empties (highest id first) before creating new ones, so a second
    /// sweep with no edits in between changes nothing.
    pub fn cleanup(&mut self) -> MutationReport {
        let before = self.ids();
        let (mut kept, mut empties): (Vec<Entity>, Vec<Entity>) =
            std::mem::take(&mut self.entities)
                .into_iter()
                .partition(|e| !e.is_empty());
        kept.sort_by_key(Entity::id);
        empties.sort_by_key(|e| std::cmp::Reverse(e.id()));

        let newest_content = kept.last().map(Entity::id);
        let mut empties = empties.into_iter().peekable();
        let mut report = MutationReport::new(MutationSource::Policy);

        let trailing_ok = match (empties.peek(), newest_content) {
            (Some(_), None) => true,
            (Some(blank), Some(newest)) => blank.id() > newest,
            (None, _) => false,
        };
        let trailing = match empties.next_if(|_| trailing_ok) {
            Some(blank) => blank,
            None => {
                let fresh = self.create();
                report.appended.push(fresh.id());
                fresh
            }
        };
        kept.push(trailing);

        while kept.len() < self.options.min_columns {
            let filler = match empties.next() {
                Some(blank) => blank,
                None => {
                    let fresh = self.create();
                    report.appended.push(fresh.id());
                    fresh
                }
            };
            kept.push(filler);
        }

        report.removed = empties.map(|e| e.id()).collect();
        kept.sort_by_key(Entity::id);
        self.entities = kept;

        report.changed = self.ids() != before;
        if report.changed {
            log::debug!(
                "cleanup removed {} and created {} entities",
                report.removed.len(),
                report.appended.len()
            );
        }
        self.commit(report)
    }

    /// Clear the manual-override flag on one field.
    ///
    /// Non-primary entities immediately re-adopt the primary's value as an
    /// auto-filled value (the trailing placeholder stays blank).
    pub fn reset_override(&mut self, index: usize, key: &str) -> Result<MutationReport, GridError> {
        let field = self.schema.resolve(key)?;
        let len = self.entities.len();
        if index >= len {
            return Err(GridError::IndexOutOfRange { index, len });
        }

        let placeholder = expansion::placeholder_index(&self.options, &self.entities);
        let primary_value = self.entities[PRIMARY_INDEX]
            .cell(field)
            .map(|c| c.value.clone())
            .unwrap_or_default();

        let mut report = MutationReport::new(MutationSource::User);
        let entity = &mut self.entities[index];
        let id = entity.id();
        report.edited = Some(id);
        if let Some(cell) = entity.cell_mut(field) {
            let before = cell.clone();
            cell.manual_override = false;
            if index != PRIMARY_INDEX && Some(index) != placeholder {
                propagation::fill(cell, &primary_value);
                if cell.auto_filled && *cell != before {
                    report.auto_filled.push(id);
                }
            }
            report.changed = *cell != before;
        }

        Ok(self.commit(report))
    }

    /// Replace the contents with records from the persistence collaborator.
    ///
    /// Zero or duplicate ids are re-issued; invariants are restored afterwards.
    pub fn load(&mut self, records: Vec<EntityRecord>) -> MutationReport {
        let mut report = MutationReport::new(MutationSource::ExternalLoad);
        report.removed = self.ids();

        let max_loaded = records.iter().map(|r| r.id.raw()).max().unwrap_or(0);
        self.high_water = self.high_water.max(max_loaded);

        let mut seen = std::collections::HashSet::new();
        let mut loaded = Vec::with_capacity(records.len());
        for record in &records {
            let id = if record.id.raw() == 0 || !seen.insert(record.id) {
                let fresh = self.next_id();
                log::debug!("re-issuing id {} for loaded entity {}", fresh, record.id);
                fresh
            } else {
                record.id
            };
            loaded.push(Entity::from_record(id, record, &self.schema));
        }
        self.entities = loaded;

        log::info!("loaded {} entities", self.entities.len());
        report.changed = true;
        self.commit(report)
    }

    // Internals

    fn next_id(&mut self) -> EntityId {
        let max_live = self.entities.iter().map(|e| e.id().raw()).max().unwrap_or(0);
        self.high_water = self.high_water.max(max_live) + 1;
        EntityId::from_raw(self.high_water)
    }

    /// A blank entity with a fresh id. The caller inserts it.
    fn create(&mut self) -> Entity {
        let id = self.next_id();
        Entity::blank(id, &self.schema)
    }

    /// Restore the floor and trailing-blank invariants.
    fn maintain(&mut self, report: &mut MutationReport) {
        while self.entities.len() < self.options.min_columns {
            let fresh = self.create();
            report.appended.push(fresh.id());
            self.entities.push(fresh);
            report.changed = true;
        }
        if expansion::needs_trailing_blank(&self.options, &self.entities) {
            let fresh = self.create();
            log::debug!("restoring trailing blank with entity {}", fresh.id());
            report.appended.push(fresh.id());
            self.entities.push(fresh);
            report.changed = true;
        }
    }

    fn commit(&mut self, mut report: MutationReport) -> MutationReport {
        self.maintain(&mut report);
        if report.changed {
            self.revision += 1;
            self.last_mutation = report.source;
        }
        report.revision = self.revision;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FieldSchema {
        FieldSchema::new(["make", "rating"]).unwrap()
    }

    fn grid(options: GridOptions) -> EntityCollection {
        EntityCollection::new(schema(), options, Vec::new())
    }

    fn fixed(n: usize) -> GridOptions {
        GridOptions {
            min_columns: n,
            auto_expand: false,
            ..GridOptions::default()
        }
    }

    fn raw_ids(c: &EntityCollection) -> Vec<u64> {
        c.ids().into_iter().map(EntityId::raw).collect()
    }

    #[test]
    fn test_mount_empty_creates_one_blank() {
        let c = grid(GridOptions::default());
        assert_eq!(c.len(), 1);
        assert!(c.get(0).unwrap().is_empty());
        assert_eq!(raw_ids(&c), vec![1]);
    }

    #[test]
    fn test_mount_pads_to_min_columns() {
        let c = grid(fixed(3));
        assert_eq!(raw_ids(&c), vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_min_columns_is_clamped() {
        let c = grid(GridOptions {
            min_columns: 0,
            ..GridOptions::default()
        });
        assert_eq!(c.options().min_columns, 1);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_typing_into_only_slot_expands() {
        let mut c = grid(GridOptions::default());
        let report = c.set_field(0, "make", "Eltek").unwrap();

        assert_eq!(c.len(), 2);
        assert_eq!(report.appended, vec![EntityId::from_raw(2)]);
        assert!(c.get(1).unwrap().is_empty());
        // The new placeholder is not auto-filled
        assert_eq!(c.value(1, "make"), Some(""));
        assert!(report.auto_filled.is_empty());
    }

    #[test]
    fn test_typing_into_primary_of_three_does_not_expand() {
        let mut c = grid(GridOptions::default());
        c.set_field(0, "make", "Eltek").unwrap();
        c.set_field(1, "make", "Delta").unwrap();
        assert_eq!(c.len(), 3);

        let report = c.set_field(0, "rating", "25").unwrap();
        assert_eq!(c.len(), 3);
        assert!(report.appended.is_empty());
        assert_eq!(c.value(1, "rating"), Some("25"));
        assert_eq!(c.value(2, "rating"), Some(""));
    }

    #[test]
    fn test_second_keystroke_does_not_expand_again() {
        let mut c = grid(GridOptions::default());
        c.set_field(0, "make", "E").unwrap();
        c.set_field(0, "make", "El").unwrap();
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_propagation_precedence() {
        let mut c = grid(fixed(3));

        c.set_field(0, "rating", "25").unwrap();
        assert_eq!(c.value(1, "rating"), Some("25"));
        assert_eq!(c.value(2, "rating"), Some("25"));
        assert!(c.is_auto_filled(1, "rating"));
        assert!(c.is_auto_filled(2, "rating"));
        assert!(!c.is_auto_filled(0, "rating"));
        assert!(c.is_manual_override(0, "rating"));

        c.set_field(1, "rating", "99").unwrap();
        assert!(c.is_manual_override(1, "rating"));
        assert!(!c.is_auto_filled(1, "rating"));

        let report = c.set_field(0, "rating", "50").unwrap();
        assert_eq!(c.value(1, "rating"), Some("99"));
        assert_eq!(c.value(2, "rating"), Some("50"));
        assert_eq!(report.auto_filled, vec![EntityId::from_raw(3)]);
    }

    #[test]
    fn test_non_primary_edits_never_fan_out() {
        let mut c = grid(fixed(3));
        let report = c.set_field(1, "make", "Delta").unwrap();
        assert!(report.auto_filled.is_empty());
        assert_eq!(c.value(0, "make"), Some(""));
        assert_eq!(c.value(2, "make"), Some(""));
    }

    #[test]
    fn test_invalid_field_key_is_noop() {
        let mut c = grid(fixed(2));
        let before = c.clone().records();
        let err = c.set_field(0, "colour", "red").unwrap_err();
        assert_eq!(err, GridError::InvalidFieldKey("colour".into()));
        assert_eq!(c.records(), before);
        assert_eq!(c.revision(), 1);
    }

    #[test]
    fn test_out_of_range_edit_is_noop() {
        let mut c = grid(fixed(2));
        let err = c.set_field(5, "make", "x").unwrap_err();
        assert_eq!(err, GridError::IndexOutOfRange { index: 5, len: 2 });
    }

    #[test]
    fn test_delete_last_entity_backfills() {
        let mut c = grid(GridOptions::default());
        let report = c.remove(EntityId::from_raw(1)).unwrap();

        assert_eq!(c.len(), 1);
        assert!(c.get(0).unwrap().is_empty());
        assert_eq!(report.removed, vec![EntityId::from_raw(1)]);
        assert_eq!(report.appended, vec![EntityId::from_raw(2)]);
    }

    #[test]
    fn test_delete_keeps_floor() {
        let mut c = grid(fixed(3));
        c.remove(EntityId::from_raw(2)).unwrap();
        assert_eq!(raw_ids(&c), vec![1, 3, 4]);
    }

    #[test]
    fn test_delete_placeholder_restores_trailing_blank() {
        let mut c = grid(GridOptions::default());
        c.set_field(0, "make", "Eltek").unwrap();
        let placeholder = c.get(1).unwrap().id();

        c.remove(placeholder).unwrap();
        assert_eq!(c.len(), 2);
        assert!(c.get(1).unwrap().is_empty());
        assert_ne!(c.get(1).unwrap().id(), placeholder);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut c = grid(GridOptions::default());
        c.set_field(0, "make", "Eltek").unwrap();
        c.remove(EntityId::from_raw(2)).unwrap();
        c.remove(EntityId::from_raw(3)).unwrap();
        assert_eq!(raw_ids(&c), vec![1, 4]);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut c = grid(fixed(2));
        let revision = c.revision();
        let report = c.remove(EntityId::from_raw(42)).unwrap();
        assert!(!report.changed);
        assert_eq!(c.revision(), revision);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_delete_disabled() {
        let mut c = grid(GridOptions {
            enable_delete: false,
            ..GridOptions::default()
        });
        assert_eq!(c.remove(EntityId::from_raw(1)), Err(GridError::DeleteDisabled));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_reorder_moves_without_renumbering() {
        let mut c = grid(fixed(4));
        c.reorder(0, 2).unwrap();
        assert_eq!(raw_ids(&c), vec![2, 3, 1, 4]);
        c.reorder(3, 0).unwrap();
        assert_eq!(raw_ids(&c), vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_reorder_placeholder_keeps_trailing_blank() {
        let mut c = grid(GridOptions::default());
        c.set_field(0, "make", "Eltek").unwrap();
        c.reorder(1, 0).unwrap();

        assert_eq!(c.len(), 3);
        assert_eq!(c.value(1, "make"), Some("Eltek"));
        assert!(c.get(2).unwrap().is_empty());
    }

    #[test]
    fn test_reorder_rejections() {
        let mut c = grid(fixed(2));
        assert_eq!(
            c.reorder(0, 2),
            Err(GridError::IndexOutOfRange { index: 2, len: 2 })
        );

        let mut locked = grid(GridOptions {
            enable_reorder: false,
            ..fixed(2)
        });
        assert_eq!(locked.reorder(0, 1), Err(GridError::ReorderDisabled));
    }

    #[test]
    fn test_cleanup_keeps_highest_trailing_empty() {
        let blank = |id| EntityRecord::new(id).with("make", "");
        let mut c = EntityCollection::new(
            schema(),
            GridOptions {
                auto_expand: false,
                ..GridOptions::default()
            },
            vec![
                blank(1),
                EntityRecord::new(2).with("make", "Eltek"),
                blank(3),
                EntityRecord::new(4).with("make", "Delta"),
                blank(5),
            ],
        );

        let report = c.cleanup();
        assert_eq!(raw_ids(&c), vec![2, 4, 5]);
        assert_eq!(report.removed, vec![EntityId::from_raw(3), EntityId::from_raw(1)]);
        assert!(report.appended.is_empty());
    }

    #[test]
    fn test_cleanup_synthesizes_trailing_blank() {
        let mut c = grid(fixed(3));
        c.set_field(2, "make", "Eltek").unwrap();
        c.set_field(1, "make", "Delta").unwrap();

        let report = c.cleanup();
        assert_eq!(raw_ids(&c), vec![2, 3, 4]);
        assert_eq!(report.removed, vec![EntityId::from_raw(1)]);
        assert_eq!(report.appended, vec![EntityId::from_raw(4)]);
    }

    #[test]
    fn test_cleanup_sorts_by_id() {
        let mut c = grid(GridOptions::default());
        c.set_field(0, "make", "A").unwrap();
        c.set_field(1, "make", "B").unwrap();
        c.reorder(1, 0).unwrap();
        assert_eq!(raw_ids(&c), vec![2, 1, 3]);

        c.cleanup();
        assert_eq!(raw_ids(&c), vec![1, 2, 3]);
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let mut c = grid(GridOptions {
            min_columns: 4,
            ..GridOptions::default()
        });
        c.set_field(1, "make", "Eltek").unwrap();
        c.set_field(3, "make", "Delta").unwrap();
        assert_eq!(raw_ids(&c), vec![1, 2, 3, 4, 5]);

        let first = c.cleanup();
        assert!(first.changed);
        assert_eq!(raw_ids(&c), vec![2, 3, 4, 5]);
        assert_eq!(first.removed, vec![EntityId::from_raw(1)]);
        let snapshot = c.entities().to_vec();

        let second = c.cleanup();
        assert!(!second.changed);
        assert_eq!(c.entities(), snapshot.as_slice());
    }

    #[test]
    fn test_reset_override_readopts_primary() {
        let mut c = grid(fixed(3));
        c.set_field(0, "rating", "25").unwrap();
        c.set_field(1, "rating", "99").unwrap();

        let report = c.reset_override(1, "rating").unwrap();
        assert_eq!(c.value(1, "rating"), Some("25"));
        assert!(c.is_auto_filled(1, "rating"));
        assert!(!c.is_manual_override(1, "rating"));
        assert_eq!(report.auto_filled, vec![EntityId::from_raw(2)]);

        c.set_field(0, "rating", "30").unwrap();
        assert_eq!(c.value(1, "rating"), Some("30"));
    }

    #[test]
    fn test_reset_override_without_override_is_noop() {
        let mut c = grid(fixed(3));
        c.set_field(0, "rating", "25").unwrap();
        let revision = c.revision();

        // Entity 1 already follows the primary
        let report = c.reset_override(1, "rating").unwrap();
        assert!(!report.changed);
        assert!(report.auto_filled.is_empty());
        assert_eq!(c.revision(), revision);

        c.set_field(2, "rating", "99").unwrap();
        let report = c.reset_override(2, "rating").unwrap();
        assert!(report.changed);
        assert_eq!(c.revision(), revision + 2);
    }

    #[test]
    fn test_load_normalizes_and_restores_invariants() {
        let mut c = grid(GridOptions::default());
        let report = c.load(vec![
            EntityRecord::new(5).with("make", "Eltek").with("colour", "grey"),
            EntityRecord::new(5).with("make", "Delta"),
        ]);

        assert_eq!(report.source, MutationSource::ExternalLoad);
        assert_eq!(c.last_mutation(), MutationSource::ExternalLoad);
        assert_eq!(raw_ids(&c), vec![5, 6, 7]);
        assert_eq!(c.value(1, "make"), Some("Delta"));
        assert!(c.get(2).unwrap().is_empty());
        assert_eq!(c.records()[0].get("colour"), None);
    }

    #[test]
    fn test_ids_continue_after_load() {
        let mut c = grid(GridOptions::default());
        c.load(vec![EntityRecord::new(9).with("make", "Eltek")]);
        c.remove(EntityId::from_raw(10)).unwrap();
        assert_eq!(raw_ids(&c), vec![9, 11]);
    }

    #[test]
    fn test_non_empty_records_filter_placeholders() {
        let mut c = grid(GridOptions::default());
        c.set_field(0, "make", "Eltek").unwrap();
        let records = c.non_empty_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("make"), Some("Eltek"));
        assert_eq!(c.records().len(), 2);
    }

    #[test]
    fn test_revision_and_source_tracking() {
        let mut c = grid(GridOptions::default());
        let mounted = c.revision();
        c.set_field(0, "make", "Eltek").unwrap();
        assert_eq!(c.revision(), mounted + 1);
        assert_eq!(c.last_mutation(), MutationSource::User);

        c.cleanup();
        assert_eq!(c.revision(), mounted + 1);
        assert_eq!(c.last_mutation(), MutationSource::User);
    }
}
