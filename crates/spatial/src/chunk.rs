use objectmap_common::Rect;

/// Integer coordinate of a chunk in the map grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    pub x: i32,
    pub y: i32,
}

impl ChunkKey {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk containing a pixel-space point.
    pub fn containing(x: f32, y: f32, chunk_size: f32) -> Self {
        Self {
            x: (x / chunk_size).floor() as i32,
            y: (y / chunk_size).floor() as i32,
        }
    }
}

/// Inclusive rectangle of chunk keys covered by a pixel-space rectangle.
///
/// Both corners are taken with `floor`, so a rectangle whose far edge lies
/// exactly on a chunk boundary also covers the next chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub min: ChunkKey,
    pub max: ChunkKey,
}

impl ChunkSpan {
    pub fn of(rect: &Rect, chunk_size: f32) -> Self {
        let (lo, hi) = (rect.min(), rect.max());
        Self {
            min: ChunkKey::containing(lo.x, lo.y, chunk_size),
            max: ChunkKey::containing(hi.x, hi.y, chunk_size),
        }
    }

    pub fn len(&self) -> usize {
        let w = (i64::from(self.max.x) - i64::from(self.min.x) + 1).max(0) as u64;
        let h = (i64::from(self.max.y) - i64::from(self.min.y) + 1).max(0) as u64;
        w.saturating_mul(h).try_into().unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: ChunkKey) -> bool {
        (self.min.x..=self.max.x).contains(&key.x) && (self.min.y..=self.max.y).contains(&key.y)
    }

    /// Keys in row-major order.
    pub fn keys(&self) -> impl Iterator<Item = ChunkKey> + use<> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| ChunkKey::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHUNK: f32 = 512.0;

    #[test]
    fn containing_floors_negative_coordinates() {
        assert_eq!(ChunkKey::containing(10.0, 10.0, CHUNK), ChunkKey::new(0, 0));
        assert_eq!(ChunkKey::containing(520.0, -5.0, CHUNK), ChunkKey::new(1, -1));
        assert_eq!(ChunkKey::containing(-512.0, -513.0, CHUNK), ChunkKey::new(-1, -2));
    }

    #[test]
    fn single_tile_spans_one_chunk() {
        let span = ChunkSpan::of(&Rect::new(0.0, 0.0, 32.0, 32.0), CHUNK);
        assert_eq!(span.len(), 1);
        assert_eq!(span.keys().collect::<Vec<_>>(), vec![ChunkKey::new(0, 0)]);
    }

    #[test]
    fn wide_footprint_spans_two_columns() {
        let span = ChunkSpan::of(&Rect::new(0.0, 0.0, 640.0, 32.0), CHUNK);
        assert_eq!(
            span.keys().collect::<Vec<_>>(),
            vec![ChunkKey::new(0, 0), ChunkKey::new(1, 0)]
        );
    }

    #[test]
    fn far_edge_on_boundary_includes_next_chunk() {
        let span = ChunkSpan::of(&Rect::new(480.0, 0.0, 32.0, 32.0), CHUNK);
        assert_eq!(span.min, ChunkKey::new(0, 0));
        assert_eq!(span.max, ChunkKey::new(1, 0));
    }

    #[test]
    fn len_at_extreme_coordinates() {
        let span = ChunkSpan {
            min: ChunkKey::new(i32::MIN, 0),
            max: ChunkKey::new(i32::MAX, 0),
        };
        assert_eq!(span.len() as u64, 1u64 << 32);
        assert!(!span.is_empty());

        let inverted = ChunkSpan {
            min: ChunkKey::new(i32::MAX, 0),
            max: ChunkKey::new(i32::MIN, 0),
        };
        assert!(inverted.is_empty());
    }

    #[test]
    fn contains_matches_keys() {
        let span = ChunkSpan::of(&Rect::new(-100.0, -100.0, 1200.0, 600.0), CHUNK);
        for key in span.keys() {
            assert!(span.contains(key));
        }
        assert_eq!(span.keys().count(), span.len());
        assert!(!span.contains(ChunkKey::new(5, 5)));
    }
}
