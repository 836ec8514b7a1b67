//! Shared type definitions for the Outpost expedition and inventory core.
//!
//! This crate is the single source of truth for all types used across the
//! workspace. Types defined here flow downstream to `TypeScript` via `ts-rs`
//! for the web client.
//!
//! # Modules
//!
//! - [`ids`] -- UUID wrappers for runtime entities, slug wrappers for catalog entries
//! - [`enums`] -- Rarity, categories, slots, tool types, expedition status
//! - [`structs`] -- Player, catalog entries, item rows, expeditions, auto-repeat
//! - [`events`] -- Notification events fanned out to clients

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    EquipmentSlot, ExpeditionStatus, Rarity, ResourceCategory, ResourceKind, ReturnReason,
    ToolType,
};
pub use events::GameEvent;
pub use ids::{BiomeId, ExpeditionId, InventoryItemId, ItemId, PlayerId, StorageItemId};
pub use structs::{
    AutoRepeatSetting, Biome, BiomeResourceView, CapacityConstraints, ConsumableEffect,
    DepositReport, Equipment, Equipped, Expedition, ExpeditionMode, InventoryItem,
    ManualEstimate, Player, Resource, StorageItem, TickOutcome,
};
