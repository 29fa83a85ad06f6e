//! Persistence: registry snapshots and their on-disk form.
//!
//! # Invariants
//! - A snapshot shares nothing with live registry state.
//! - Restore validates the whole snapshot before touching the registry.
//! - Loading a file whose checksum does not match fails closed.

mod snapshot;
mod store;

pub use snapshot::{Snapshot, SnapshotError};
pub use store::{SnapshotStore, StoreError};
