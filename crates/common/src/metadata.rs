//! Typed object metadata.
//!
//! On the wire metadata is an open JSON object. The recognised keys are
//! decoded into [`ObjectMetadata`] when a record crosses the boundary;
//! anything else is carried untouched in [`ObjectMetadata::extra`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const FOOTPRINT: &str = "footprint";
const BUILDING_ID: &str = "buildingId";
const BUILDING_INSTANCE_ID: &str = "buildingInstanceId";
const STORAGE_PILE: &str = "storagePile";
const RESOURCE_NODE: &str = "resourceNode";
const ALLOW_OVERLAP_RESOURCE_NODES: &str = "allowOverlapResourceNodes";

/// Errors from decoding a metadata bag.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata key `{key}` is malformed: {reason}")]
    InvalidField { key: &'static str, reason: String },
    #[error("metadata declares both `{first}` and `{second}`")]
    ConflictingKinds {
        first: &'static str,
        second: &'static str,
    },
}

/// Largest accepted footprint side, in tiles (four 16-tile chunks).
pub const MAX_FOOTPRINT_TILES: u32 = 64;

/// Occupied area of an object, in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub const SINGLE_TILE: Self = Self {
        width: 1,
        height: 1,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Non-empty and no side above [`MAX_FOOTPRINT_TILES`].
    pub fn is_valid(&self) -> bool {
        (1..=MAX_FOOTPRINT_TILES).contains(&self.width)
            && (1..=MAX_FOOTPRINT_TILES).contains(&self.height)
    }
}

impl Default for Footprint {
    fn default() -> Self {
        Self::SINGLE_TILE
    }
}

/// What an object is, as far as placement rules care.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ObjectKind {
    /// Dropped or placed item with no special role.
    #[default]
    Generic,
    /// Footprint of a constructed building. Buildings always block placement.
    Building {
        building_id: String,
        instance_id: Option<String>,
    },
    /// Harvestable node; synced through its own channel.
    ResourceNode,
    /// Storage pile that may sit inside its parent building's footprint.
    StoragePile { building_instance_id: Option<String> },
}

/// Decoded metadata of a [`MapObject`](crate::MapObject).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ObjectMetadata {
    /// Overrides the item-derived footprint when set.
    pub footprint: Option<Footprint>,
    pub kind: ObjectKind,
    /// Placement request flag: may overlap resource nodes.
    pub allow_overlap_resource_nodes: bool,
    /// Unrecognised keys, preserved verbatim.
    pub extra: BTreeMap<String, Value>,
}

impl ObjectMetadata {
    pub fn building(building_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::Building {
                building_id: building_id.into(),
                instance_id: Some(instance_id.into()),
            },
            ..Self::default()
        }
    }

    pub fn storage_pile(building_instance_id: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::StoragePile {
                building_instance_id: Some(building_instance_id.into()),
            },
            ..Self::default()
        }
    }

    pub fn resource_node() -> Self {
        Self {
            kind: ObjectKind::ResourceNode,
            ..Self::default()
        }
    }

    pub fn with_footprint(mut self, width: u32, height: u32) -> Self {
        self.footprint = Some(Footprint::new(width, height));
        self
    }

    pub fn allowing_resource_nodes(mut self) -> Self {
        self.allow_overlap_resource_nodes = true;
        self
    }

    pub fn is_building(&self) -> bool {
        matches!(self.kind, ObjectKind::Building { .. })
    }

    pub fn is_resource_node(&self) -> bool {
        matches!(self.kind, ObjectKind::ResourceNode)
    }

    pub fn is_storage_pile(&self) -> bool {
        matches!(self.kind, ObjectKind::StoragePile { .. })
    }

    pub fn building_id(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::Building { building_id, .. } => Some(building_id),
            _ => None,
        }
    }

    /// Building instance this object belongs to (a building's own instance,
    /// or the parent building of a storage pile).
    pub fn building_instance_id(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::Building { instance_id, .. } => instance_id.as_deref(),
            ObjectKind::StoragePile {
                building_instance_id,
            } => building_instance_id.as_deref(),
            _ => None,
        }
    }

    /// Decode an open metadata bag.
    pub fn from_bag(mut bag: Map<String, Value>) -> Result<Self, MetadataError> {
        let footprint = match take(&mut bag, FOOTPRINT) {
            Some(v) => Some(decode_footprint(v)?),
            None => None,
        };
        let building_id = take_string(&mut bag, BUILDING_ID)?;
        let instance_id = take_string(&mut bag, BUILDING_INSTANCE_ID)?;
        let storage_pile = take_bool(&mut bag, STORAGE_PILE)?;
        let resource_node = take_bool(&mut bag, RESOURCE_NODE)?;
        let allow_overlap_resource_nodes = take_bool(&mut bag, ALLOW_OVERLAP_RESOURCE_NODES)?;

        let mut declared = Vec::new();
        if building_id.is_some() {
            declared.push(BUILDING_ID);
        }
        if storage_pile {
            declared.push(STORAGE_PILE);
        }
        if resource_node {
            declared.push(RESOURCE_NODE);
        }
        if let [first, second, ..] = declared.as_slice() {
            return Err(MetadataError::ConflictingKinds {
                first: *first,
                second: *second,
            });
        }

        let mut extra: BTreeMap<String, Value> = bag.into_iter().collect();
        let kind = if let Some(building_id) = building_id {
            ObjectKind::Building {
                building_id,
                instance_id,
            }
        } else if storage_pile {
            ObjectKind::StoragePile {
                building_instance_id: instance_id,
            }
        } else {
            // An instance id on anything else has no rule attached; keep it as-is.
            if let Some(instance_id) = instance_id {
                extra.insert(BUILDING_INSTANCE_ID.to_owned(), Value::String(instance_id));
            }
            if resource_node {
                ObjectKind::ResourceNode
            } else {
                ObjectKind::Generic
            }
        };

        Ok(Self {
            footprint,
            kind,
            allow_overlap_resource_nodes,
            extra,
        })
    }

    /// Encode back into the open bag shape.
    pub fn to_bag(&self) -> Map<String, Value> {
        let mut bag: Map<String, Value> = self
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(fp) = self.footprint {
            bag.insert(
                FOOTPRINT.to_owned(),
                serde_json::json!({ "width": fp.width, "height": fp.height }),
            );
        }
        match &self.kind {
            ObjectKind::Generic => {}
            ObjectKind::Building {
                building_id,
                instance_id,
            } => {
                bag.insert(BUILDING_ID.to_owned(), Value::String(building_id.clone()));
                if let Some(instance_id) = instance_id {
                    bag.insert(
                        BUILDING_INSTANCE_ID.to_owned(),
                        Value::String(instance_id.clone()),
                    );
                }
            }
            ObjectKind::ResourceNode => {
                bag.insert(RESOURCE_NODE.to_owned(), Value::Bool(true));
            }
            ObjectKind::StoragePile {
                building_instance_id,
            } => {
                bag.insert(STORAGE_PILE.to_owned(), Value::Bool(true));
                if let Some(instance_id) = building_instance_id {
                    bag.insert(
                        BUILDING_INSTANCE_ID.to_owned(),
                        Value::String(instance_id.clone()),
                    );
                }
            }
        }
        if self.allow_overlap_resource_nodes {
            bag.insert(ALLOW_OVERLAP_RESOURCE_NODES.to_owned(), Value::Bool(true));
        }
        bag
    }
}

impl TryFrom<Map<String, Value>> for ObjectMetadata {
    type Error = MetadataError;

    fn try_from(bag: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_bag(bag)
    }
}

impl From<ObjectMetadata> for Map<String, Value> {
    fn from(metadata: ObjectMetadata) -> Self {
        metadata.to_bag()
    }
}

/// Remove a key, treating an explicit `null` as absent.
fn take(bag: &mut Map<String, Value>, key: &str) -> Option<Value> {
    bag.remove(key).filter(|v| !v.is_null())
}

fn take_string(
    bag: &mut Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, MetadataError> {
    match take(bag, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(MetadataError::InvalidField {
            key,
            reason: format!("expected a string, got {other}"),
        }),
    }
}

fn take_bool(bag: &mut Map<String, Value>, key: &'static str) -> Result<bool, MetadataError> {
    match take(bag, key) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(b),
        Some(other) => Err(MetadataError::InvalidField {
            key,
            reason: format!("expected a boolean, got {other}"),
        }),
    }
}

fn decode_footprint(value: Value) -> Result<Footprint, MetadataError> {
    let fp: Footprint =
        serde_json::from_value(value).map_err(|e| MetadataError::InvalidField {
            key: FOOTPRINT,
            reason: e.to_string(),
        })?;
    if !fp.is_valid() {
        return Err(MetadataError::InvalidField {
            key: FOOTPRINT,
            reason: format!(
                "footprint must be 1..={MAX_FOOTPRINT_TILES} tiles per side, got {}x{}",
                fp.width, fp.height
            ),
        });
    }
    Ok(fp)
}
