use std::collections::{BTreeSet, HashMap, HashSet};

use objectmap_common::{ObjectId, Rect};

use crate::chunk::{ChunkKey, ChunkSpan};

/// Chunk buckets for one map, plus the reverse index used for removal.
///
/// Objects are registered under every chunk their rectangle spans. Queries
/// only visit the buckets a query rectangle spans.
#[derive(Debug, Clone)]
pub struct ChunkIndex {
    chunk_size: f32,
    cells: HashMap<ChunkKey, HashSet<ObjectId>>,
    reverse: HashMap<ObjectId, Vec<ChunkKey>>,
}

impl ChunkIndex {
    /// Create an empty index with the given chunk side length in pixels.
    pub fn new(chunk_size: f32) -> Self {
        assert!(chunk_size > 0.0, "chunk_size must be positive");
        Self {
            chunk_size,
            cells: HashMap::new(),
            reverse: HashMap::new(),
        }
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    /// Chunks covered by a pixel-space rectangle.
    pub fn span(&self, rect: &Rect) -> ChunkSpan {
        ChunkSpan::of(rect, self.chunk_size)
    }

    /// Register `id` under every chunk `rect` spans.
    ///
    /// Re-inserting an id first drops its previous entries.
    pub fn insert(&mut self, id: ObjectId, rect: Rect) {
        if self.reverse.contains_key(&id) {
            self.remove(id);
        }
        let keys: Vec<ChunkKey> = self.span(&rect).keys().collect();
        for key in &keys {
            self.cells.entry(*key).or_default().insert(id);
        }
        tracing::trace!(%id, chunks = keys.len(), "indexed object");
        self.reverse.insert(id, keys);
    }

    /// Remove `id` from its recorded buckets. Returns whether it was indexed.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        let Some(keys) = self.reverse.remove(&id) else {
            return false;
        };
        for key in &keys {
            if let Some(bucket) = self.cells.get_mut(key) {
                bucket.remove(&id);
                if bucket.is_empty() {
                    self.cells.remove(key);
                }
            }
        }
        tracing::trace!(%id, chunks = keys.len(), "unindexed object");
        true
    }

    /// Ids registered in any chunk the rectangle spans, each once.
    ///
    /// This is a broad phase: returned objects share a chunk with the
    /// rectangle but do not necessarily overlap it.
    pub fn query(&self, rect: &Rect) -> BTreeSet<ObjectId> {
        let mut result = BTreeSet::new();
        for key in self.span(rect).keys() {
            if let Some(bucket) = self.cells.get(&key) {
                result.extend(bucket.iter().copied());
            }
        }
        result
    }

    /// Ids registered in a single chunk.
    pub fn objects_in_chunk(&self, key: ChunkKey) -> HashSet<ObjectId> {
        self.cells.get(&key).cloned().unwrap_or_default()
    }

    /// Chunk keys recorded for `id`.
    pub fn chunks_of(&self, id: ObjectId) -> Option<&[ChunkKey]> {
        self.reverse.get(&id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.reverse.contains_key(&id)
    }

    /// Number of indexed objects.
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    /// Number of non-empty chunks.
    pub fn chunk_count(&self) -> usize {
        self.cells.len()
    }

    /// Total number of (chunk, object) memberships.
    pub fn total_placements(&self) -> usize {
        self.cells.values().map(HashSet::len).sum()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.reverse.clear();
    }
}
