use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use objectmap_common::{
    ClientId, ItemRef, MapId, MapObject, ObjectId, ObjectMetadata, OwnerId, Position, Rect,
};
use objectmap_spatial::ChunkIndex;

use crate::catalog::ItemCatalog;
use crate::config::{ConfigError, RegistryConfig};
use crate::inventory::Inventory;

/// A mutation recorded by the registry.
///
/// Restoring from a snapshot and resetting never produce events.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// Object was placed on its map.
    Spawned { object: MapObject },
    /// Object was removed from its map.
    Despawned { object_id: ObjectId, map_id: MapId },
}

impl RegistryEvent {
    pub fn map_id(&self) -> &MapId {
        match self {
            Self::Spawned { object } => &object.map_id,
            Self::Despawned { map_id, .. } => map_id,
        }
    }
}

/// What a caller wants placed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRequest {
    pub map_id: MapId,
    pub item: ItemRef,
    pub position: Position,
    pub rotation: f32,
    pub metadata: ObjectMetadata,
}

impl PlaceRequest {
    pub fn new(map_id: impl Into<MapId>, item: ItemRef, position: Position) -> Self {
        Self {
            map_id: map_id.into(),
            item,
            position,
            rotation: 0.0,
            metadata: ObjectMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ObjectMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaceOptions {
    /// Trusted callers that already validated the spot.
    pub skip_collision_check: bool,
}

/// Errors from restoring a trusted record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RestoreError {
    #[error("object {0} is already registered")]
    DuplicateId(ObjectId),
}

/// Aggregate counts for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryStats {
    pub maps: usize,
    pub objects: usize,
    pub chunks: usize,
    pub placements: usize,
}

impl fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Registry: maps={} objects={} chunks={} chunk_placements={}",
            self.maps, self.objects, self.chunks, self.placements
        )
    }
}

/// Objects and chunk index of one map.
#[derive(Debug, Clone)]
pub(crate) struct MapLayer {
    pub(crate) objects: BTreeMap<ObjectId, MapObject>,
    pub(crate) index: ChunkIndex,
}

impl MapLayer {
    fn new(chunk_size: f32) -> Self {
        Self {
            objects: BTreeMap::new(),
            index: ChunkIndex::new(chunk_size),
        }
    }

    fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.index.is_empty()
    }
}

/// The authoritative registry of static objects, across all maps.
///
/// One instance is owned by the host's message loop. Read accessors hand out
/// shared references; every write path goes through a method here.
pub struct ObjectRegistry {
    pub(crate) config: RegistryConfig,
    pub(crate) catalog: Arc<dyn ItemCatalog + Send + Sync>,
    pub(crate) maps: BTreeMap<MapId, MapLayer>,
    /// Map of every live object, for process-wide id lookup.
    locations: HashMap<ObjectId, MapId>,
    event_log: Vec<RegistryEvent>,
}

impl fmt::Debug for ObjectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRegistry")
            .field("config", &self.config)
            .field("maps", &self.maps.len())
            .field("objects", &self.locations.len())
            .field("pending_events", &self.event_log.len())
            .finish_non_exhaustive()
    }
}

impl ObjectRegistry {
    /// Empty registry with the default grid.
    pub fn new(catalog: Arc<dyn ItemCatalog + Send + Sync>) -> Self {
        Self {
            config: RegistryConfig::default(),
            catalog,
            maps: BTreeMap::new(),
            locations: HashMap::new(),
            event_log: Vec::new(),
        }
    }

    pub fn with_config(
        config: RegistryConfig,
        catalog: Arc<dyn ItemCatalog + Send + Sync>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(catalog)
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn catalog(&self) -> &(dyn ItemCatalog + Send + Sync) {
        self.catalog.as_ref()
    }

    /// Place a new object, unless it would collide.
    ///
    /// Returns `None` when placement is denied; that is an ordinary outcome.
    pub fn place_object(
        &mut self,
        owner_id: OwnerId,
        request: PlaceRequest,
        client: ClientId,
        options: PlaceOptions,
    ) -> Option<MapObject> {
        let _span = tracing::debug_span!("place_object", map = %request.map_id, %client).entered();

        if !options.skip_collision_check
            && self.check_collision(
                &request.map_id,
                request.position,
                Some(&request.item),
                Some(&request.metadata),
            )
        {
            tracing::debug!(
                item_type = %request.item.item_type,
                x = request.position.x,
                y = request.position.y,
                "placement denied"
            );
            return None;
        }

        let object = MapObject {
            id: ObjectId::new(),
            item: request.item,
            position: request.position,
            rotation: request.rotation,
            owner_id,
            map_id: request.map_id,
            metadata: request.metadata,
        };
        self.insert(object.clone());
        tracing::debug!(id = %object.id, owner = %object.owner_id, "object placed");
        self.event_log.push(RegistryEvent::Spawned {
            object: object.clone(),
        });
        Some(object)
    }

    /// Register a record without validation. Only for snapshot load.
    pub fn restore_object(&mut self, object: MapObject) -> Result<(), RestoreError> {
        if self.locations.contains_key(&object.id) {
            return Err(RestoreError::DuplicateId(object.id));
        }
        self.insert(object);
        Ok(())
    }

    /// Client-initiated removal: returns the item to the requester.
    ///
    /// Ignored (returns `None`) when the object is unknown or lives on a map
    /// other than `active_map`, which covers stale and replayed requests.
    pub fn remove_object(
        &mut self,
        object_id: ObjectId,
        client: ClientId,
        active_map: &MapId,
        inventory: &mut dyn Inventory,
    ) -> Option<MapObject> {
        let Some(map_id) = self.locations.get(&object_id) else {
            tracing::debug!(%object_id, %client, "removal ignored: unknown object");
            return None;
        };
        if map_id != active_map {
            tracing::debug!(
                %object_id,
                %client,
                object_map = %map_id,
                %active_map,
                "removal ignored: object is on another map"
            );
            return None;
        }

        let object = self.detach(object_id)?;
        inventory.add_item(client, &object.item);
        self.event_log.push(RegistryEvent::Despawned {
            object_id,
            map_id: object.map_id.clone(),
        });
        Some(object)
    }

    /// System-initiated removal. Never touches any inventory.
    pub fn remove_object_by_id(&mut self, object_id: ObjectId, map_id: &MapId) -> bool {
        if self.locations.get(&object_id) != Some(map_id) {
            tracing::debug!(%object_id, %map_id, "silent removal ignored: not on map");
            return false;
        }
        if self.detach(object_id).is_none() {
            return false;
        }
        self.event_log.push(RegistryEvent::Despawned {
            object_id,
            map_id: map_id.clone(),
        });
        true
    }

    /// Objects whose chunks intersect the rectangle's chunks, each once.
    pub fn objects_in_area(
        &self,
        map_id: &MapId,
        position: Position,
        width: f32,
        height: f32,
    ) -> Vec<&MapObject> {
        let Some(layer) = self.maps.get(map_id) else {
            return Vec::new();
        };
        layer
            .index
            .query(&Rect::at(position, width, height))
            .into_iter()
            .filter_map(|id| {
                let found = layer.objects.get(&id);
                if found.is_none() {
                    tracing::warn!(%id, %map_id, "index entry without stored object");
                }
                found
            })
            .collect()
    }

    pub fn objects_for_map(&self, map_id: &MapId) -> Vec<&MapObject> {
        self.maps
            .get(map_id)
            .map(|layer| layer.objects.values().collect())
            .unwrap_or_default()
    }

    /// Every object on every map, grouped by map.
    pub fn all_objects(&self) -> impl Iterator<Item = &MapObject> {
        self.maps.values().flat_map(|layer| layer.objects.values())
    }

    pub fn object(&self, object_id: ObjectId) -> Option<&MapObject> {
        let map_id = self.locations.get(&object_id)?;
        self.maps.get(map_id)?.objects.get(&object_id)
    }

    /// Maps that currently hold at least one object.
    pub fn map_ids(&self) -> impl Iterator<Item = &MapId> {
        self.maps.keys()
    }

    pub fn object_count(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn has_map(&self, map_id: &MapId) -> bool {
        self.maps.contains_key(map_id)
    }

    /// Chunk index of a map, for inspection.
    pub fn chunk_index(&self, map_id: &MapId) -> Option<&ChunkIndex> {
        self.maps.get(map_id).map(|layer| &layer.index)
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            maps: self.maps.len(),
            objects: self.locations.len(),
            chunks: self.maps.values().map(|l| l.index.chunk_count()).sum(),
            placements: self.maps.values().map(|l| l.index.total_placements()).sum(),
        }
    }

    /// Read-only access to pending events.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.event_log
    }

    /// Drain and return pending events.
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Drop all objects, indexes and pending events.
    pub fn reset(&mut self) {
        self.maps.clear();
        self.locations.clear();
        self.event_log.clear();
    }

    fn insert(&mut self, object: MapObject) {
        let rect = self.object_rect(&object);
        let chunk_size = self.config.chunk_size();
        let layer = self
            .maps
            .entry(object.map_id.clone())
            .or_insert_with(|| MapLayer::new(chunk_size));
        layer.index.insert(object.id, rect);
        self.locations.insert(object.id, object.map_id.clone());
        layer.objects.insert(object.id, object);
    }

    fn detach(&mut self, object_id: ObjectId) -> Option<MapObject> {
        let map_id = self.locations.remove(&object_id)?;
        let layer = self.maps.get_mut(&map_id)?;
        layer.index.remove(object_id);
        let object = layer.objects.remove(&object_id);
        if object.is_none() {
            tracing::warn!(%object_id, %map_id, "located object missing from store");
        }
        if layer.is_empty() {
            tracing::trace!(%map_id, "pruning empty map layer");
            self.maps.remove(&map_id);
        }
        object
    }
}
