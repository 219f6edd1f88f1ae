//! Inventory collaborator.
//!
//! The simulation never owns items; it asks an `Inventory` to check, remove
//! and add them. Hosts plug their own storage in through these traits.

use crate::core_types::ActorId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Definition of an item that can be placed in an inventory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub display_name: String,
}

impl ItemDef {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Item storage of one actor
pub trait Inventory {
    /// Whether at least `quantity` of `item_id` is held
    fn has_item(&self, item_id: &str, quantity: u32) -> bool;

    /// Remove `quantity` of `item_id`. Returns `false` and removes nothing if
    /// not enough is held.
    fn remove_item(&mut self, item_id: &str, quantity: u32) -> bool;

    /// Add `quantity` of `item`. Returns `false` if the inventory refused it.
    fn add_item(&mut self, item: &ItemDef, quantity: u32) -> bool;

    fn item_count(&self, item_id: &str) -> u32;
}

/// Resolves the inventory of an actor for the duration of one call
pub trait InventoryProvider {
    fn inventory_mut(&mut self, actor: ActorId) -> Option<&mut dyn Inventory>;
}

/// Unbounded in-memory inventory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleInventory {
    counts: FxHashMap<String, u32>,
}

impl SimpleInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper for setting up inventories
    pub fn with_item(mut self, item_id: impl Into<String>, quantity: u32) -> Self {
        *self.counts.entry(item_id.into()).or_insert(0) += quantity;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl Inventory for SimpleInventory {
    fn has_item(&self, item_id: &str, quantity: u32) -> bool {
        self.item_count(item_id) >= quantity
    }

    fn remove_item(&mut self, item_id: &str, quantity: u32) -> bool {
        let Some(count) = self.counts.get_mut(item_id) else {
            return quantity == 0;
        };
        if *count < quantity {
            return false;
        }
        *count -= quantity;
        if *count == 0 {
            self.counts.remove(item_id);
        }
        true
    }

    fn add_item(&mut self, item: &ItemDef, quantity: u32) -> bool {
        if quantity > 0 {
            *self.counts.entry(item.id.clone()).or_insert(0) += quantity;
        }
        true
    }

    fn item_count(&self, item_id: &str) -> u32 {
        self.counts.get(item_id).copied().unwrap_or(0)
    }
}

/// Inventories of every actor, keyed by actor id
#[derive(Debug, Clone, Default)]
pub struct Inventories {
    by_actor: FxHashMap<ActorId, SimpleInventory>,
}

impl Inventories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, actor: ActorId, inventory: SimpleInventory) {
        self.by_actor.insert(actor, inventory);
    }

    pub fn get(&self, actor: ActorId) -> Option<&SimpleInventory> {
        self.by_actor.get(&actor)
    }

    pub fn get_mut(&mut self, actor: ActorId) -> Option<&mut SimpleInventory> {
        self.by_actor.get_mut(&actor)
    }
}

impl InventoryProvider for Inventories {
    fn inventory_mut(&mut self, actor: ActorId) -> Option<&mut dyn Inventory> {
        self.by_actor
            .get_mut(&actor)
            .map(|inventory| inventory as &mut dyn Inventory)
    }
}

/// Provider with no inventories, for world-driven ticks
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInventories;

impl InventoryProvider for NoInventories {
    fn inventory_mut(&mut self, _actor: ActorId) -> Option<&mut dyn Inventory> {
        None
    }
}
