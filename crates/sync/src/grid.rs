//! Live grid: an entity collection wired to a debounced `on_change` callback.
//!
//! Every persisted mutation re-arms the bridge and replaces the pending
//! flush task on a single-threaded smol executor. Dropping the previous
//! `Task` cancels its timer, so at most one flush is ever pending. The task
//! holds only a weak handle to the grid and reads the collection when it
//! fires, so a flush always carries the latest state and a flush against a
//! disposed or dropped grid is a no-op.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use smol::{LocalExecutor, Task, Timer};
use surveygrid_engine::{
    EntityCollection, EntityId, EntityRecord, GridError, GridOp, MutationReport,
};

use crate::bridge::{flush_payload, PersistenceBridge};

/// Receives the non-empty entities on every flush.
pub type ChangeCallback = Box<dyn FnMut(Vec<EntityRecord>)>;

struct GridState {
    collection: EntityCollection,
    bridge: PersistenceBridge,
    on_change: Option<ChangeCallback>,
    pending: Option<Task<()>>,
}

pub struct EntityGrid {
    state: Rc<RefCell<GridState>>,
    executor: Rc<LocalExecutor<'static>>,
}

impl EntityGrid {
    pub fn new(
        collection: EntityCollection,
        debounce: Duration,
        executor: Rc<LocalExecutor<'static>>,
        on_change: impl FnMut(Vec<EntityRecord>) + 'static,
    ) -> Self {
        Self {
            state: Rc::new(RefCell::new(GridState {
                collection,
                bridge: PersistenceBridge::new(debounce),
                on_change: Some(Box::new(on_change)),
                pending: None,
            })),
            executor,
        }
    }

    // Mutations

    pub fn set_field(
        &self,
        index: usize,
        key: &str,
        value: &str,
    ) -> Result<MutationReport, GridError> {
        self.mutate(|c| c.set_field(index, key, value))
    }

    pub fn remove(&self, id: EntityId) -> Result<MutationReport, GridError> {
        self.mutate(|c| c.remove(id))
    }

    /// Drop target from the host's drag/drop translation.
    pub fn reorder(&self, from: usize, to: usize) -> Result<MutationReport, GridError> {
        self.mutate(|c| c.reorder(from, to))
    }

    pub fn cleanup(&self) -> MutationReport {
        let report = self.state.borrow_mut().collection.cleanup();
        self.after_mutation(&report);
        report
    }

    pub fn reset_override(&self, index: usize, key: &str) -> Result<MutationReport, GridError> {
        self.mutate(|c| c.reset_override(index, key))
    }

    /// Replace contents from the collaborator. Never schedules a flush, and
    /// drops one already pending so the loaded records are not saved back.
    pub fn load(&self, records: Vec<EntityRecord>) -> MutationReport {
        let mut state = self.state.borrow_mut();
        if state.bridge.cancel() {
            state.pending = None;
            log::debug!("pending flush dropped by external load");
        }
        state.collection.load(records)
    }

    pub fn apply(&self, op: &GridOp) -> Result<MutationReport, GridError> {
        match op {
            GridOp::Load { entities } => Ok(self.load(entities.clone())),
            _ => self.mutate(|c| c.apply(op)),
        }
    }

    // Queries

    /// Read the live collection.
    pub fn with_collection<R>(&self, f: impl FnOnce(&EntityCollection) -> R) -> R {
        f(&self.state.borrow().collection)
    }

    pub fn is_flush_pending(&self) -> bool {
        self.state.borrow().bridge.is_pending()
    }

    pub fn flushes(&self) -> u64 {
        self.state.borrow().bridge.flushes()
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().bridge.is_disposed()
    }

    /// Unmount: cancel any pending flush and stop scheduling new ones.
    pub fn dispose(&self) {
        let mut state = self.state.borrow_mut();
        let had_pending = state.bridge.is_pending();
        state.bridge.dispose();
        // Dropping the task cancels its timer
        state.pending = None;
        state.on_change = None;
        log::info!("grid disposed (pending flush cancelled: {})", had_pending);
    }

    // Internals

    fn mutate(
        &self,
        f: impl FnOnce(&mut EntityCollection) -> Result<MutationReport, GridError>,
    ) -> Result<MutationReport, GridError> {
        let report = f(&mut self.state.borrow_mut().collection)?;
        self.after_mutation(&report);
        Ok(report)
    }

    fn after_mutation(&self, report: &MutationReport) {
        if report.changed && report.source.should_persist() {
            self.schedule_flush();
        }
    }

    fn schedule_flush(&self) {
        let mut state = self.state.borrow_mut();
        let Some(generation) = state.bridge.arm(Instant::now()) else {
            return;
        };
        let debounce = state.bridge.debounce();
        let weak = Rc::downgrade(&self.state);

        let task = self.executor.spawn(async move {
            Timer::after(debounce).await;
            fire(&weak, generation);
        });
        // Replacing the handle cancels the superseded timer
        state.pending = Some(task);
    }
}

/// Timer callback: flush the collection as it is now.
fn fire(weak: &Weak<RefCell<GridState>>, generation: u64) {
    let Some(state) = weak.upgrade() else {
        log::debug!("flush for dropped grid ignored");
        return;
    };

    let (payload, mut callback) = {
        let mut guard = state.borrow_mut();
        if !guard.bridge.fire(generation) {
            log::debug!("stale flush (generation {}) ignored", generation);
            return;
        }
        (flush_payload(&guard.collection), guard.on_change.take())
    };

    log::debug!("flushing {} entities", payload.len());
    // The callback runs without the state borrowed so it may read the grid
    if let Some(cb) = callback.as_mut() {
        cb(payload);
    }

    let mut guard = state.borrow_mut();
    if guard.on_change.is_none() && !guard.bridge.is_disposed() {
        guard.on_change = callback;
    }
}
