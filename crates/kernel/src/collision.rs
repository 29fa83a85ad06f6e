//! Placement collision rules.
//!
//! A candidate footprint is only compared against objects sharing a chunk
//! with it. For each overlapping neighbour the exemptions are tried first,
//! in order; otherwise the overlap blocks if either item blocks placement or
//! the neighbour is a building. Overlaps that neither block nor are exempt
//! are tolerated.

use glam::Vec2;

use objectmap_common::{ItemRef, MapId, MapObject, ObjectKind, ObjectMetadata, Position, Rect};

use crate::registry::ObjectRegistry;

/// Why an overlap is allowed outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    /// Candidate asked to sit on resource nodes, and the neighbour is one.
    ResourceNode,
    /// Candidate is a storage pile inside its own parent building.
    ParentBuilding,
}

/// Outcome of an overlapping candidate/neighbour pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    Exempt(Exemption),
    Blocking,
    Tolerated,
}

/// Classify an overlapping pair.
///
/// `candidate_blocks` / `neighbor_blocks` are the items' registered
/// `blocks_placement` flags.
pub fn classify_overlap(
    candidate: &ObjectMetadata,
    candidate_blocks: bool,
    neighbor: &ObjectMetadata,
    neighbor_blocks: bool,
) -> Overlap {
    if candidate.allow_overlap_resource_nodes && neighbor.is_resource_node() {
        return Overlap::Exempt(Exemption::ResourceNode);
    }
    if let (
        ObjectKind::StoragePile {
            building_instance_id: Some(pile_parent),
        },
        ObjectKind::Building {
            instance_id: Some(instance),
            ..
        },
    ) = (&candidate.kind, &neighbor.kind)
    {
        if pile_parent == instance {
            return Overlap::Exempt(Exemption::ParentBuilding);
        }
    }
    if candidate_blocks || neighbor_blocks || neighbor.is_building() {
        Overlap::Blocking
    } else {
        Overlap::Tolerated
    }
}

impl ObjectRegistry {
    /// Footprint size in pixels.
    ///
    /// Metadata footprint wins over the item's registered size, which wins
    /// over the configured default.
    pub fn footprint_pixels(
        &self,
        item: Option<&ItemRef>,
        metadata: Option<&ObjectMetadata>,
    ) -> Vec2 {
        let tiles = metadata
            .and_then(|m| m.footprint)
            .or_else(|| {
                item.and_then(|i| self.catalog.placement(&i.item_type))
                    .and_then(|p| p.size)
            })
            .unwrap_or(self.config.default_footprint);
        let tile = self.config.tile_size as f32;
        Vec2::new(tiles.width as f32 * tile, tiles.height as f32 * tile)
    }

    /// Rectangle an existing object occupies.
    pub fn object_rect(&self, object: &MapObject) -> Rect {
        let size = self.footprint_pixels(Some(&object.item), Some(&object.metadata));
        Rect::at(object.position, size.x, size.y)
    }

    /// Whether placing the candidate at `position` would hit a blocking overlap.
    pub fn check_collision(
        &self,
        map_id: &MapId,
        position: Position,
        item: Option<&ItemRef>,
        metadata: Option<&ObjectMetadata>,
    ) -> bool {
        let size = self.footprint_pixels(item, metadata);
        let candidate = Rect::at(position, size.x, size.y);
        let default_metadata = ObjectMetadata::default();
        let candidate_meta = metadata.unwrap_or(&default_metadata);
        let candidate_blocks = item.is_some_and(|i| self.catalog.blocks_placement(&i.item_type));

        for neighbor in self.objects_in_area(map_id, position, size.x, size.y) {
            if !candidate.overlaps(&self.object_rect(neighbor)) {
                continue;
            }
            let neighbor_blocks = self.catalog.blocks_placement(&neighbor.item.item_type);
            let overlap = classify_overlap(
                candidate_meta,
                candidate_blocks,
                &neighbor.metadata,
                neighbor_blocks,
            );
            match overlap {
                Overlap::Blocking => {
                    tracing::trace!(neighbor = %neighbor.id, "blocking overlap");
                    return true;
                }
                Overlap::Exempt(reason) => {
                    tracing::trace!(neighbor = %neighbor.id, ?reason, "overlap exempt");
                }
                Overlap::Tolerated => {}
            }
        }
        false
    }

    /// Negation of [`check_collision`](Self::check_collision).
    pub fn can_place_at(
        &self,
        map_id: &MapId,
        position: Position,
        item: Option<&ItemRef>,
        metadata: Option<&ObjectMetadata>,
    ) -> bool {
        !self.check_collision(map_id, position, item, metadata)
    }
}
