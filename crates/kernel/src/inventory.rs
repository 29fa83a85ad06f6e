//! Inventory collaborator used by client-initiated removal.

use objectmap_common::{ClientId, ItemRef};

/// Receives items returned to a player when they pick an object back up.
pub trait Inventory {
    fn add_item(&mut self, owner: ClientId, item: &ItemRef);
}

/// Inventory that records every deposit in order.
#[derive(Debug, Clone, Default)]
pub struct InventoryLedger {
    deposits: Vec<(ClientId, ItemRef)>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deposits(&self) -> &[(ClientId, ItemRef)] {
        &self.deposits
    }

    pub fn items_for(&self, owner: ClientId) -> impl Iterator<Item = &ItemRef> {
        self.deposits
            .iter()
            .filter(move |(c, _)| *c == owner)
            .map(|(_, item)| item)
    }
}

impl Inventory for InventoryLedger {
    fn add_item(&mut self, owner: ClientId, item: &ItemRef) {
        tracing::debug!(%owner, item = %item.id, "item returned to inventory");
        self.deposits.push((owner, item.clone()));
    }
}
