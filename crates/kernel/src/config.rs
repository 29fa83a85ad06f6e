//! Registry configuration and the world config file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use objectmap_common::{Footprint, MAX_FOOTPRINT_TILES};

use crate::catalog::{ItemMetadata, StaticItemCatalog};

/// Side of one tile, in pixels.
pub const TILE_SIZE: u32 = 32;
/// Side of one chunk, in tiles.
pub const CHUNK_TILES: u32 = 16;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("tile_size must be positive")]
    ZeroTileSize,
    #[error("chunk_tiles must be positive")]
    ZeroChunkTiles,
    #[error("chunk size {tile_size}x{chunk_tiles} does not fit in 32 bits")]
    ChunkSizeOverflow { tile_size: u32, chunk_tiles: u32 },
    #[error(
        "default_footprint must be 1..={max} tiles per side, got {width}x{height}",
        max = MAX_FOOTPRINT_TILES
    )]
    InvalidDefaultFootprint { width: u32, height: u32 },
    #[error(
        "item `{item_type}` footprint must be 1..={max} tiles per side, got {width}x{height}",
        max = MAX_FOOTPRINT_TILES
    )]
    InvalidItemFootprint {
        item_type: String,
        width: u32,
        height: u32,
    },
}

/// Grid geometry used by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Pixels per tile.
    pub tile_size: u32,
    /// Tiles per chunk side.
    pub chunk_tiles: u32,
    /// Footprint used when neither metadata nor the item catalog gives one.
    pub default_footprint: Footprint,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            chunk_tiles: CHUNK_TILES,
            default_footprint: Footprint::SINGLE_TILE,
        }
    }
}

impl RegistryConfig {
    /// Chunk side length in pixels.
    pub fn chunk_size(&self) -> f32 {
        (u64::from(self.tile_size) * u64::from(self.chunk_tiles)) as f32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 {
            return Err(ConfigError::ZeroTileSize);
        }
        if self.chunk_tiles == 0 {
            return Err(ConfigError::ZeroChunkTiles);
        }
        if self.tile_size.checked_mul(self.chunk_tiles).is_none() {
            return Err(ConfigError::ChunkSizeOverflow {
                tile_size: self.tile_size,
                chunk_tiles: self.chunk_tiles,
            });
        }
        if !self.default_footprint.is_valid() {
            let Footprint { width, height } = self.default_footprint;
            return Err(ConfigError::InvalidDefaultFootprint { width, height });
        }
        Ok(())
    }
}

/// Contents of a world config file: grid settings plus item placement data.
///
/// ```yaml
/// registry:
///   tile_size: 32
///   chunk_tiles: 16
/// items:
///   stone_wall:
///     placement:
///       size: { width: 1, height: 1 }
///       blocksPlacement: true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub registry: RegistryConfig,
    pub items: BTreeMap<String, ItemMetadata>,
}

impl WorldConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.registry.validate()?;
        for (item_type, item) in &config.items {
            let size = item.placement.as_ref().and_then(|p| p.size);
            if let Some(fp) = size.filter(|fp| !fp.is_valid()) {
                return Err(ConfigError::InvalidItemFootprint {
                    item_type: item_type.clone(),
                    width: fp.width,
                    height: fp.height,
                });
            }
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(
            path = %path.as_ref().display(),
            items = config.items.len(),
            "loaded world config"
        );
        Ok(config)
    }

    pub fn catalog(&self) -> StaticItemCatalog {
        StaticItemCatalog::from_items(self.items.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chunk_is_512_pixels() {
        let config = RegistryConfig::default();
        assert_eq!(config.chunk_size(), 512.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_sizes_rejected() {
        let config = RegistryConfig {
            tile_size: 0,
            ..RegistryConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTileSize)));

        let config = RegistryConfig {
            chunk_tiles: 0,
            ..RegistryConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroChunkTiles)));

        let config = RegistryConfig {
            default_footprint: Footprint::new(0, 1),
            ..RegistryConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDefaultFootprint { .. })
        ));
    }

    #[test]
    fn yaml_world_config() {
        let text = r#"
registry:
  chunk_tiles: 8
items:
  stone_wall:
    placement:
      size: { width: 2, height: 1 }
      blocksPlacement: true
  rug: {}
"#;
        let config = WorldConfig::from_yaml_str(text).unwrap();
        assert_eq!(config.registry.tile_size, TILE_SIZE);
        assert_eq!(config.registry.chunk_tiles, 8);
        assert_eq!(config.items.len(), 2);
        let wall = config.items["stone_wall"].placement.as_ref().unwrap();
        assert!(wall.blocks_placement);
        assert_eq!(wall.size, Some(Footprint::new(2, 1)));
        assert!(config.items["rug"].placement.is_none());
    }

    #[test]
    fn oversized_chunk_rejected() {
        let config = RegistryConfig {
            tile_size: 65536,
            chunk_tiles: 65536,
            ..RegistryConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ChunkSizeOverflow { .. })
        ));
        assert_eq!(config.chunk_size(), 4_294_967_296.0);

        let text = "registry:\n  tile_size: 65536\n  chunk_tiles: 65536\n";
        assert!(matches!(
            WorldConfig::from_yaml_str(text),
            Err(ConfigError::ChunkSizeOverflow { .. })
        ));
    }

    #[test]
    fn oversized_footprints_rejected() {
        let config = RegistryConfig {
            default_footprint: Footprint::new(1, MAX_FOOTPRINT_TILES + 1),
            ..RegistryConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDefaultFootprint { .. })
        ));

        let text = r#"
items:
  castle:
    placement:
      size: { width: 16000, height: 16000 }
"#;
        match WorldConfig::from_yaml_str(text) {
            Err(ConfigError::InvalidItemFootprint { item_type, .. }) => {
                assert_eq!(item_type, "castle")
            }
            other => panic!("expected InvalidItemFootprint, got {other:?}"),
        }
    }

    #[test]
    fn yaml_with_invalid_registry_rejected() {
        let text = "registry:\n  tile_size: 0\n";
        assert!(matches!(
            WorldConfig::from_yaml_str(text),
            Err(ConfigError::ZeroTileSize)
        ));
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("world.yaml");
        std::fs::write(&path, "items:\n  torch: {}\n").unwrap();
        let config = WorldConfig::load(&path).unwrap();
        assert!(config.items.contains_key("torch"));
    }
}
