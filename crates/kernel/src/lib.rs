//! Registry kernel: authoritative store of static map objects.
//!
//! # Invariants
//! - Every mutation goes through [`ObjectRegistry`]; callers only ever get
//!   shared references or freshly built records back.
//! - An object lives on exactly one map for its whole lifetime.
//! - Store and chunk index always agree; a map's layer is dropped as soon as
//!   it holds no objects.
//! - Collision checks only look at objects sharing a chunk with the candidate.
//! - No operation blocks or suspends. The host runs at most one mutation at a
//!   time, so there is no internal locking.

pub mod catalog;
mod collision;
pub mod config;
pub mod inventory;
pub mod registry;

pub use catalog::{ItemCatalog, ItemMetadata, PlacementInfo, StaticItemCatalog};
pub use collision::{Exemption, Overlap, classify_overlap};
pub use config::{ConfigError, RegistryConfig, WorldConfig};
pub use inventory::{Inventory, InventoryLedger};
pub use registry::{
    ObjectRegistry, PlaceOptions, PlaceRequest, RegistryEvent, RegistryStats, RestoreError,
};
