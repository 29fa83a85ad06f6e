use objectmap_common::{ClientId, MapId};

use crate::message::ServerMessage;

/// Addressing for an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// Only this connection.
    Client(ClientId),
    /// Every connection currently grouped on the map.
    Map(MapId),
}

/// Message delivery owned by the network layer.
pub trait Transport {
    fn deliver(&mut self, to: Recipient, message: ServerMessage);
}

/// Transport that keeps every delivery in order, for hosts that flush
/// outbound traffic at the end of a turn.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    deliveries: Vec<(Recipient, ServerMessage)>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> &[(Recipient, ServerMessage)] {
        &self.deliveries
    }

    /// Messages addressed to a single recipient, in order.
    pub fn sent_to<'a>(
        &'a self,
        to: &'a Recipient,
    ) -> impl Iterator<Item = &'a ServerMessage> + 'a {
        self.deliveries
            .iter()
            .filter(move |(r, _)| r == to)
            .map(|(_, m)| m)
    }

    pub fn drain(&mut self) -> Vec<(Recipient, ServerMessage)> {
        std::mem::take(&mut self.deliveries)
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }
}

impl Transport for Outbox {
    fn deliver(&mut self, to: Recipient, message: ServerMessage) {
        self.deliveries.push((to, message));
    }
}
