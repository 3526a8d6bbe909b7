//! Dynamic, self-expanding entity grid.
//!
//! Pure state crate: an ordered collection of entities that keeps a trailing
//! blank slot, auto-fills siblings from the primary entity until they are
//! overridden, and survives deletes and drags without breaking its floor.
//! No IO and no timers; persistence lives in `surveygrid-sync`.

pub mod collection;
pub mod entity;
pub mod error;
pub mod events;
pub mod expansion;
pub mod invariants;
pub mod ops;
pub mod propagation;
pub mod schema;

#[cfg(test)]
pub mod harness;

pub use collection::{EntityCollection, GridOptions};
pub use entity::{Entity, EntityId, EntityRecord, FieldCell};
pub use error::GridError;
pub use events::{MutationReport, MutationSource};
pub use ops::GridOp;
pub use schema::FieldSchema;
