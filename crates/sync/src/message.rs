use serde::{Deserialize, Serialize};

use objectmap_common::{MapId, MapObject, ObjectId};

/// Errors from decoding or encoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Messages a client sends that this subsystem consumes.
///
/// Unknown fields are ignored, so join notifications may carry extra player data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    RemoveObject { object_id: ObjectId },
    PlayerJoinedMap { map_id: MapId },
    PlayerTransitionedToMap { map_id: MapId },
}

impl ClientMessage {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Messages this subsystem emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    ObjectSpawned { object: MapObject },
    ObjectDespawned { object_id: ObjectId },
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn object_id(&self) -> ObjectId {
        match self {
            Self::ObjectSpawned { object } => object.id,
            Self::ObjectDespawned { object_id } => *object_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objectmap_common::{ItemRef, ObjectMetadata, OwnerId, Position};
    use serde_json::json;

    #[test]
    fn decodes_remove_object() {
        let id = ObjectId::new();
        let text = json!({ "type": "remove-object", "objectId": id }).to_string();
        assert_eq!(
            ClientMessage::from_json(&text).unwrap(),
            ClientMessage::RemoveObject { object_id: id }
        );
    }

    #[test]
    fn join_ignores_extra_fields() {
        let text = r#"{"type":"player-joined-map","mapId":"town","playerName":"alice","x":3}"#;
        assert_eq!(
            ClientMessage::from_json(text).unwrap(),
            ClientMessage::PlayerJoinedMap {
                map_id: MapId::from("town")
            }
        );
        let text = r#"{"type":"player-transitioned-to-map","mapId":"cave"}"#;
        assert_eq!(
            ClientMessage::from_json(text).unwrap(),
            ClientMessage::PlayerTransitionedToMap {
                map_id: MapId::from("cave")
            }
        );
    }

    #[test]
    fn unknown_message_type_rejected() {
        assert!(ClientMessage::from_json(r#"{"type":"teleport"}"#).is_err());
        assert!(ClientMessage::from_json(r#"{"type":"remove-object"}"#).is_err());
    }

    #[test]
    fn outbound_wire_shape() {
        let object = MapObject {
            id: ObjectId::new(),
            item: ItemRef::new("i", "torch"),
            position: Position::new(32.0, 64.0),
            rotation: 0.0,
            owner_id: OwnerId::from("alice"),
            map_id: MapId::from("town"),
            metadata: ObjectMetadata::default(),
        };
        let spawned = ServerMessage::ObjectSpawned {
            object: object.clone(),
        };
        let spawned: serde_json::Value = serde_json::from_str(&spawned.to_json().unwrap()).unwrap();
        assert_eq!(spawned["type"], json!("object-spawned"));
        assert_eq!(spawned["object"]["mapId"], json!("town"));

        let despawned: serde_json::Value = serde_json::from_str(
            &ServerMessage::ObjectDespawned { object_id: object.id }
                .to_json()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(
            despawned,
            json!({ "type": "object-despawned", "objectId": object.id })
        );
    }
}
