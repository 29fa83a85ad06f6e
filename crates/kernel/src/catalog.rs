//! Item placement data, looked up by item type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use objectmap_common::Footprint;

/// Placement properties registered for an item type.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacementInfo {
    /// Footprint in tiles.
    pub size: Option<Footprint>,
    pub blocks_movement: bool,
    pub blocks_placement: bool,
}

/// Item content definition, reduced to what the registry reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemMetadata {
    pub placement: Option<PlacementInfo>,
}

/// Lookup of item content definitions. Owned by the item system.
pub trait ItemCatalog {
    fn item_metadata(&self, item_type: &str) -> Option<ItemMetadata>;

    fn placement(&self, item_type: &str) -> Option<PlacementInfo> {
        self.item_metadata(item_type).and_then(|m| m.placement)
    }

    fn blocks_placement(&self, item_type: &str) -> bool {
        self.placement(item_type).is_some_and(|p| p.blocks_placement)
    }
}

/// In-memory catalog built from a fixed item table.
#[derive(Debug, Clone, Default)]
pub struct StaticItemCatalog {
    items: BTreeMap<String, ItemMetadata>,
}

impl StaticItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: BTreeMap<String, ItemMetadata>) -> Self {
        Self { items }
    }

    /// Builder-style registration of one item type.
    pub fn with_item(mut self, item_type: impl Into<String>, placement: PlacementInfo) -> Self {
        self.insert(item_type, placement);
        self
    }

    pub fn insert(&mut self, item_type: impl Into<String>, placement: PlacementInfo) {
        self.items.insert(
            item_type.into(),
            ItemMetadata {
                placement: Some(placement),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemCatalog for StaticItemCatalog {
    fn item_metadata(&self, item_type: &str) -> Option<ItemMetadata> {
        self.items.get(item_type).cloned()
    }
}

impl PlacementInfo {
    /// Placement that blocks others, with the given footprint.
    pub fn blocking(width: u32, height: u32) -> Self {
        Self {
            size: Some(Footprint::new(width, height)),
            blocks_movement: true,
            blocks_placement: true,
        }
    }

    /// Placement that tolerates overlap, with the given footprint.
    pub fn passable(width: u32, height: u32) -> Self {
        Self {
            size: Some(Footprint::new(width, height)),
            blocks_movement: false,
            blocks_placement: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_item_has_no_placement() {
        let catalog = StaticItemCatalog::new();
        assert!(catalog.item_metadata("ghost").is_none());
        assert!(!catalog.blocks_placement("ghost"));
    }

    #[test]
    fn registered_item_reports_blocking() {
        let catalog = StaticItemCatalog::new()
            .with_item("wall", PlacementInfo::blocking(1, 1))
            .with_item("rug", PlacementInfo::passable(2, 2));
        assert!(catalog.blocks_placement("wall"));
        assert!(!catalog.blocks_placement("rug"));
        assert_eq!(
            catalog.placement("rug").and_then(|p| p.size),
            Some(Footprint::new(2, 2))
        );
        assert_eq!(catalog.len(), 2);
    }
}
