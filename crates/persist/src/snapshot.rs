use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};

use objectmap_common::{MapId, MapObject, ObjectId};
use objectmap_kernel::{ObjectRegistry, RestoreError};

/// Errors from decoding or restoring a snapshot. These mean persisted state
/// is corrupt and are not recoverable at runtime.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("object {object_id} is listed under map `{key}` but records map `{record_map}`")]
    MapMismatch {
        object_id: ObjectId,
        key: MapId,
        record_map: MapId,
    },
    #[error("object {0} appears more than once")]
    DuplicateId(ObjectId),
    #[error(transparent)]
    Restore(#[from] RestoreError),
}

/// Self-contained copy of every object, grouped by map.
///
/// Serialises as a JSON object from map id to an array of object records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub maps: BTreeMap<MapId, Vec<MapObject>>,
}

impl Snapshot {
    /// Deep-copy the registry's current objects.
    pub fn capture(registry: &ObjectRegistry) -> Self {
        let maps: BTreeMap<MapId, Vec<MapObject>> = registry
            .map_ids()
            .map(|map_id| {
                let objects = registry
                    .objects_for_map(map_id)
                    .into_iter()
                    .cloned()
                    .collect();
                (map_id.clone(), objects)
            })
            .collect();
        let snapshot = Self { maps };
        tracing::info!(
            maps = snapshot.maps.len(),
            objects = snapshot.object_count(),
            "captured registry snapshot"
        );
        snapshot
    }

    pub fn object_count(&self) -> usize {
        self.maps.values().map(Vec::len).sum()
    }

    /// Check that every record sits under its own map and ids are unique.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::new();
        for (key, objects) in &self.maps {
            for object in objects {
                if &object.map_id != key {
                    return Err(SnapshotError::MapMismatch {
                        object_id: object.id,
                        key: key.clone(),
                        record_map: object.map_id.clone(),
                    });
                }
                if !seen.insert(object.id) {
                    return Err(SnapshotError::DuplicateId(object.id));
                }
            }
        }
        Ok(())
    }

    /// Replace the registry's contents with this snapshot.
    ///
    /// Records are trusted: no collision validation, no events. On error the
    /// registry is left untouched.
    pub fn restore_into(&self, registry: &mut ObjectRegistry) -> Result<usize, SnapshotError> {
        self.validate()?;
        registry.reset();
        let mut restored = 0;
        for object in self.maps.values().flatten() {
            registry.restore_object(object.clone())?;
            restored += 1;
        }
        tracing::info!(maps = self.maps.len(), objects = restored, "restored registry snapshot");
        Ok(restored)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode and validate.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(text)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Hex sha256 of the canonical JSON encoding.
    pub fn content_hash(&self) -> Result<String, SnapshotError> {
        Ok(sha256_hex(serde_json::to_string(self)?.as_bytes()))
    }
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
