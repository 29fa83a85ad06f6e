use std::collections::HashMap;

use objectmap_common::{ClientId, MapId, MapObject, ObjectId, OwnerId};
use objectmap_kernel::{Inventory, ObjectRegistry, PlaceOptions, PlaceRequest, RegistryEvent};

use crate::message::{ClientMessage, ProtocolError, ServerMessage};
use crate::transport::{Recipient, Transport};

/// Options for sending a map's existing objects to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncOptions {
    /// Resource nodes normally go through their own chunked channel.
    pub include_resource_nodes: bool,
}

/// Front door of the registry for connected clients.
///
/// Owns the registry together with its transport and inventory
/// collaborators, and remembers which map each client is on.
pub struct ClientSync<T, I> {
    registry: ObjectRegistry,
    transport: T,
    inventory: I,
    sessions: HashMap<ClientId, MapId>,
    join_options: SyncOptions,
}

impl<T: Transport, I: Inventory> ClientSync<T, I> {
    pub fn new(registry: ObjectRegistry, transport: T, inventory: I) -> Self {
        Self {
            registry,
            transport,
            inventory,
            sessions: HashMap::new(),
            join_options: SyncOptions::default(),
        }
    }

    /// Options used when a join or transition message arrives.
    pub fn with_join_options(mut self, options: SyncOptions) -> Self {
        self.join_options = options;
        self
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Direct registry access for trusted bulk work such as snapshot restore.
    /// Call [`flush_events`](Self::flush_events) afterwards if anything was placed or removed.
    pub fn registry_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.registry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    /// Map the client last joined or transitioned to.
    pub fn active_map(&self, client: ClientId) -> Option<&MapId> {
        self.sessions.get(&client)
    }

    /// Dispatch one inbound message.
    pub fn handle(&mut self, client: ClientId, message: ClientMessage) {
        match message {
            ClientMessage::RemoveObject { object_id } => {
                self.remove_object(client, object_id);
            }
            ClientMessage::PlayerJoinedMap { map_id }
            | ClientMessage::PlayerTransitionedToMap { map_id } => {
                let options = self.join_options;
                self.enter_map(client, map_id, options);
            }
        }
    }

    /// Decode and dispatch a JSON message.
    pub fn handle_json(&mut self, client: ClientId, text: &str) -> Result<(), ProtocolError> {
        let message = ClientMessage::from_json(text)?;
        self.handle(client, message);
        Ok(())
    }

    /// Record the client's new map and send it that map's objects.
    /// Returns the number of objects sent.
    pub fn enter_map(&mut self, client: ClientId, map_id: MapId, options: SyncOptions) -> usize {
        let previous = self.sessions.insert(client, map_id.clone());
        tracing::info!(%client, map = %map_id, previous = ?previous, "client entered map");
        self.sync_map_to_client(client, &map_id, options)
    }

    /// Send one spawn message per existing object on the map, to this client only.
    pub fn sync_map_to_client(
        &mut self,
        client: ClientId,
        map_id: &MapId,
        options: SyncOptions,
    ) -> usize {
        let objects: Vec<MapObject> = self
            .registry
            .objects_for_map(map_id)
            .into_iter()
            .filter(|o| options.include_resource_nodes || !o.metadata.is_resource_node())
            .cloned()
            .collect();
        let sent = objects.len();
        for object in objects {
            self.transport
                .deliver(Recipient::Client(client), ServerMessage::ObjectSpawned { object });
        }
        tracing::debug!(%client, map = %map_id, sent, "synced map objects to client");
        sent
    }

    /// Forget a client's session.
    pub fn disconnect(&mut self, client: ClientId) -> Option<MapId> {
        let map = self.sessions.remove(&client);
        tracing::debug!(%client, map = ?map, "client disconnected");
        map
    }

    /// Place an object and broadcast it to the map.
    pub fn place_object(
        &mut self,
        owner_id: OwnerId,
        request: PlaceRequest,
        client: ClientId,
        options: PlaceOptions,
    ) -> Option<MapObject> {
        let placed = self
            .registry
            .place_object(owner_id, request, client, options);
        self.flush_events();
        placed
    }

    /// Client-initiated removal against the client's active map.
    pub fn remove_object(&mut self, client: ClientId, object_id: ObjectId) -> Option<MapObject> {
        let Some(active_map) = self.sessions.get(&client) else {
            tracing::debug!(%client, %object_id, "removal ignored: client is on no map");
            return None;
        };
        let removed =
            self.registry
                .remove_object(object_id, client, active_map, &mut self.inventory);
        self.flush_events();
        removed
    }

    /// Silent removal for trusted internal callers; still broadcast.
    pub fn remove_object_by_id(&mut self, object_id: ObjectId, map_id: &MapId) -> bool {
        let removed = self.registry.remove_object_by_id(object_id, map_id);
        self.flush_events();
        removed
    }

    /// Broadcast every pending registry event to its map. Returns how many were sent.
    pub fn flush_events(&mut self) -> usize {
        let events = self.registry.drain_events();
        let count = events.len();
        for event in events {
            let map = event.map_id().clone();
            let message = match event {
                RegistryEvent::Spawned { object } => ServerMessage::ObjectSpawned { object },
                RegistryEvent::Despawned { object_id, .. } => {
                    ServerMessage::ObjectDespawned { object_id }
                }
            };
            self.transport.deliver(Recipient::Map(map), message);
        }
        count
    }
}
