//! Tunables for capacity limits and new-player stats.
//!
//! These values correspond to the `capacity` and `player` sections of
//! `outpost-config.yaml`. The core crate parses the file and hands these
//! structs to the inventory functions, so tests can build them directly.

use std::collections::BTreeMap;

use outpost_types::ItemId;
use rust_decimal::Decimal;

/// Inventory slot count and storage cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// Distinct stacks a player may carry (default: 36).
    pub inventory_slots: u32,

    /// Optional hard weight cap on storage in kilograms.
    ///
    /// `None` (the default) makes storage unbounded.
    pub storage_hard_cap_kg: Option<Decimal>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            inventory_slots: 36,
            storage_hard_cap_kg: None,
        }
    }
}

/// Starting stats for newly created players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerDefaults {
    /// Starting level (default: 1).
    pub level: u32,
    /// Hunger ceiling; new players start full (default: 100).
    pub max_hunger: u32,
    /// Thirst ceiling; new players start full (default: 100).
    pub max_thirst: u32,
    /// Health ceiling; new players start full (default: 100).
    pub max_health: u32,
    /// Water counter ceiling (default: 20).
    pub max_water_storage: u32,
    /// Starting coins (default: 0).
    pub coins: u32,
    /// Whether expedition overflow goes to storage (default: false).
    pub auto_storage: bool,
    /// Items placed in a new player's inventory.
    pub starting_items: BTreeMap<ItemId, u32>,
}

impl Default for PlayerDefaults {
    fn default() -> Self {
        Self {
            level: 1,
            max_hunger: 100,
            max_thirst: 100,
            max_health: 100,
            max_water_storage: 20,
            coins: 0,
            auto_storage: false,
            starting_items: BTreeMap::new(),
        }
    }
}
