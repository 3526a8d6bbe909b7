//! Persistence plumbing for entity grids.
//!
//! `bridge` is the pure debounce state machine, `grid` drives it with smol
//! timers, and `store` defines the remote collaborators a flush lands in.

pub mod bridge;
pub mod grid;
pub mod store;

pub use bridge::{flush_payload, BridgePhase, PersistenceBridge, DEFAULT_DEBOUNCE};
pub use grid::{ChangeCallback, EntityGrid};
pub use store::{
    persist_to, EntityStore, ImageMeta, ImageStore, MemoryEntityStore, MemoryImageStore,
    SyncError,
};
