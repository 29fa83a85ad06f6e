//! Spatial index: fixed-size chunk buckets over object footprints.
//!
//! # Invariants
//! - The chunk keys an object is recorded under always equal the chunks its
//!   current rectangle spans. No stale or missing entries after insert/remove.
//! - Every object has a reverse entry listing its chunks, so removal touches
//!   only those buckets.
//! - Empty buckets are deleted.

mod chunk;
mod index;

pub use chunk::{ChunkKey, ChunkSpan};
pub use index::ChunkIndex;
