//! Test harness for entity collections with invariant tracking.
//!
//! `GridHarness` wraps an `EntityCollection` and:
//! - Applies operation sequences, recording every report and rejection
//! - Checks all invariants after each operation
//!
//! Use it to test policy interplay without a host UI.

use crate::collection::{EntityCollection, GridOptions};
use crate::error::GridError;
use crate::events::MutationReport;
use crate::invariants::{self, Violation};
use crate::ops::GridOp;
use crate::schema::FieldSchema;

/// Outcome of one applied op.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub op: GridOp,
    pub outcome: Result<MutationReport, GridError>,
    pub violations: Vec<Violation>,
}

pub struct GridHarness {
    collection: EntityCollection,
    steps: Vec<StepResult>,
}

impl GridHarness {
    pub fn new(keys: &[&str], options: GridOptions) -> Self {
        let schema = FieldSchema::new(keys.iter().copied()).expect("valid test schema");
        Self::with_collection(EntityCollection::new(schema, options, Vec::new()))
    }

    pub fn with_collection(collection: EntityCollection) -> Self {
        Self {
            collection,
            steps: Vec::new(),
        }
    }

    pub fn collection(&self) -> &EntityCollection {
        &self.collection
    }

    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    /// Apply one op and record the invariant check that follows it.
    pub fn apply(&mut self, op: GridOp) -> &StepResult {
        let revision = self.collection.revision();
        let before = self.collection.entities().to_vec();
        let outcome = self.collection.apply(&op);

        // A rejected op must leave the collection untouched
        if outcome.is_err() {
            assert_eq!(self.collection.entities(), before.as_slice());
            assert_eq!(self.collection.revision(), revision);
        }

        let violations = invariants::check(&self.collection);
        self.steps.push(StepResult {
            op,
            outcome,
            violations,
        });
        self.steps.last().expect("step just pushed")
    }

    pub fn apply_all(&mut self, ops: impl IntoIterator<Item = GridOp>) {
        for op in ops {
            self.apply(op);
        }
    }

    /// Panic with the first step that broke an invariant.
    pub fn assert_healthy(&self) {
        for (idx, step) in self.steps.iter().enumerate() {
            assert!(
                step.violations.is_empty(),
                "step {} ({:?}) broke invariants: {:?}",
                idx,
                step.op,
                step.violations
            );
        }
    }

    pub fn rejected(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.is_err()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;

    #[test]
    fn test_harness_tracks_rejections() {
        let mut h = GridHarness::new(&["make"], GridOptions::default());
        h.apply_all([
            GridOp::set_field(0, "make", "Eltek"),
            GridOp::set_field(0, "colour", "red"),
            GridOp::Reorder { from: 0, to: 9 },
            GridOp::Remove { id: EntityId::from_raw(1) },
        ]);

        h.assert_healthy();
        assert_eq!(h.rejected(), 2);
        assert_eq!(h.steps().len(), 4);
        assert_eq!(h.collection().len(), 1);
    }

    #[test]
    fn test_survey_session_walkthrough() {
        // Cabinet screen: three cabinets, rating typed once, one customised
        let mut h = GridHarness::new(&["make", "rating"], GridOptions::default());
        h.apply_all([
            GridOp::set_field(0, "make", "Eltek"),
            GridOp::set_field(1, "make", "Eltek"),
            GridOp::set_field(2, "make", "Delta"),
            GridOp::set_field(0, "rating", "25"),
            GridOp::set_field(2, "rating", "40"),
            GridOp::set_field(0, "rating", "30"),
            GridOp::Reorder { from: 2, to: 0 },
            GridOp::Cleanup,
        ]);
        h.assert_healthy();

        let c = h.collection();
        assert_eq!(c.len(), 4);
        assert_eq!(c.value(0, "rating"), Some("30"));
        assert_eq!(c.value(1, "rating"), Some("30"));
        assert_eq!(c.value(2, "rating"), Some("40"));
        assert!(c.is_auto_filled(1, "rating"));
        assert!(c.get(3).unwrap().is_empty());
    }
}
