//! Shared types for the map object registry.
//!
//! Everything here is plain data: identifiers, pixel-space geometry, the
//! persisted [`MapObject`] record and its typed [`ObjectMetadata`].

mod metadata;
mod object;
mod types;

pub use metadata::{Footprint, MAX_FOOTPRINT_TILES, MetadataError, ObjectKind, ObjectMetadata};
pub use object::{ItemRef, MapObject};
pub use types::{ClientId, MapId, ObjectId, OwnerId, Position, Rect};
