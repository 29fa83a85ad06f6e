use crate::metadata::ObjectMetadata;
use crate::types::{MapId, ObjectId, OwnerId, Position};
use serde::{Deserialize, Serialize};

/// Reference to the item an object was created from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    pub id: String,
    pub item_type: String,
}

impl ItemRef {
    pub fn new(id: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type: item_type.into(),
        }
    }
}

/// Persisted record of a static object placed on a map.
///
/// `id` and `map_id` never change after creation; there is no in-place
/// update, only removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapObject {
    pub id: ObjectId,
    pub item: ItemRef,
    pub position: Position,
    #[serde(default)]
    pub rotation: f32,
    pub owner_id: OwnerId,
    pub map_id: MapId,
    #[serde(default)]
    pub metadata: ObjectMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> MapObject {
        MapObject {
            id: ObjectId::new(),
            item: ItemRef::new("item-1", "crate"),
            position: Position::new(64.0, 96.0),
            rotation: 90.0,
            owner_id: OwnerId::from("alice"),
            map_id: MapId::from("town"),
            metadata: ObjectMetadata::storage_pile("b-1"),
        }
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let obj = sample();
        let value = serde_json::to_value(&obj).unwrap();
        assert_eq!(value["item"], json!({ "id": "item-1", "itemType": "crate" }));
        assert_eq!(value["position"], json!({ "x": 64.0, "y": 96.0 }));
        assert_eq!(value["ownerId"], json!("alice"));
        assert_eq!(value["mapId"], json!("town"));
        assert_eq!(value["metadata"]["storagePile"], json!(true));
        assert_eq!(value["metadata"]["buildingInstanceId"], json!("b-1"));
    }

    #[test]
    fn decodes_record_without_metadata() {
        let id = ObjectId::new();
        let obj: MapObject = serde_json::from_value(json!({
            "id": id,
            "item": { "id": "i", "itemType": "torch" },
            "position": { "x": 0.0, "y": 0.0 },
            "ownerId": "bob",
            "mapId": "m"
        }))
        .unwrap();
        assert_eq!(obj.id, id);
        assert_eq!(obj.rotation, 0.0);
        assert_eq!(obj.metadata, ObjectMetadata::default());
    }

    #[test]
    fn malformed_metadata_fails_record_decode() {
        let result: Result<MapObject, _> = serde_json::from_value(json!({
            "id": ObjectId::new(),
            "item": { "id": "i", "itemType": "torch" },
            "position": { "x": 0.0, "y": 0.0 },
            "ownerId": "bob",
            "mapId": "m",
            "metadata": { "resourceNode": "maybe" }
        }));
        assert!(result.is_err());
    }
}
