//! Core entity structs for the Outpost core.
//!
//! Covers the player aggregate, catalog entries, inventory and storage rows,
//! the expedition run record, auto-repeat settings, and the small result
//! payloads the API hands back to clients.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    EquipmentSlot, ExpeditionStatus, Rarity, ResourceCategory, ResourceKind, ReturnReason,
    ToolType,
};
use crate::ids::{BiomeId, ExpeditionId, InventoryItemId, ItemId, PlayerId, StorageItemId};

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Equipment currently worn or held by a player, one optional item per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Equipped {
    /// Head slot.
    pub helmet: Option<ItemId>,
    /// Body slot.
    pub chestplate: Option<ItemId>,
    /// Legs slot.
    pub leggings: Option<ItemId>,
    /// Feet slot.
    pub boots: Option<ItemId>,
    /// Weapon slot.
    pub weapon: Option<ItemId>,
    /// Tool slot.
    pub tool: Option<ItemId>,
}

impl Equipped {
    /// Return the item in `slot`, if any.
    pub const fn get(&self, slot: EquipmentSlot) -> Option<&ItemId> {
        match slot {
            EquipmentSlot::Helmet => self.helmet.as_ref(),
            EquipmentSlot::Chestplate => self.chestplate.as_ref(),
            EquipmentSlot::Leggings => self.leggings.as_ref(),
            EquipmentSlot::Boots => self.boots.as_ref(),
            EquipmentSlot::Weapon => self.weapon.as_ref(),
            EquipmentSlot::Tool => self.tool.as_ref(),
        }
    }

    /// Put `item` into `slot`, returning whatever was there before.
    pub fn set(&mut self, slot: EquipmentSlot, item: Option<ItemId>) -> Option<ItemId> {
        let target = match slot {
            EquipmentSlot::Helmet => &mut self.helmet,
            EquipmentSlot::Chestplate => &mut self.chestplate,
            EquipmentSlot::Leggings => &mut self.leggings,
            EquipmentSlot::Boots => &mut self.boots,
            EquipmentSlot::Weapon => &mut self.weapon,
            EquipmentSlot::Tool => &mut self.tool,
        };
        core::mem::replace(target, item)
    }

    /// Iterate over every occupied slot.
    pub fn iter(&self) -> impl Iterator<Item = (EquipmentSlot, &ItemId)> {
        [
            EquipmentSlot::Helmet,
            EquipmentSlot::Chestplate,
            EquipmentSlot::Leggings,
            EquipmentSlot::Boots,
            EquipmentSlot::Weapon,
            EquipmentSlot::Tool,
        ]
        .into_iter()
        .filter_map(|slot| self.get(slot).map(|item| (slot, item)))
    }
}

/// The player aggregate root.
///
/// Hunger and thirst are fullness meters: `0` is starving, the maximum is
/// sated. Expeditions drain them; consuming items restores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Unique identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Current level (starts at 1).
    pub level: u32,
    /// Experience accumulated toward the next level.
    pub experience: u32,
    /// Current hunger (fullness).
    pub hunger: u32,
    /// Hunger ceiling.
    pub max_hunger: u32,
    /// Current thirst (fullness).
    pub thirst: u32,
    /// Thirst ceiling.
    pub max_thirst: u32,
    /// Current health.
    pub health: u32,
    /// Health ceiling.
    pub max_health: u32,
    /// Currency balance.
    pub coins: u32,
    /// Weight currently carried in inventory, in kilograms.
    #[ts(as = "String")]
    pub inventory_weight: Decimal,
    /// Weight ceiling derived from level, in kilograms.
    #[ts(as = "String")]
    pub max_inventory_weight: Decimal,
    /// Units of water held in the water counter.
    pub water_storage: u32,
    /// Water counter ceiling.
    pub max_water_storage: u32,
    /// Equipment in each slot.
    pub equipped: Equipped,
    /// Route expedition overflow into storage instead of dropping it.
    pub auto_storage: bool,
    /// When the player was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Catalog entries
// ---------------------------------------------------------------------------

/// Vitals restored by consuming one unit of an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConsumableEffect {
    /// Hunger restored per unit.
    pub hunger: u32,
    /// Thirst restored per unit.
    pub thirst: u32,
}

/// An immutable resource definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Resource {
    /// Catalog slug.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Display glyph.
    pub emoji: String,
    /// Weight of one unit in kilograms.
    #[ts(as = "String")]
    pub weight: Decimal,
    /// Sale value in coins.
    pub value: u32,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Basic or unique.
    pub kind: ResourceKind,
    /// Gathering category used by the gating table.
    pub category: ResourceCategory,
    /// Explicit tool requirement overriding the category rule.
    pub required_tool: Option<ToolType>,
    /// Experience granted per unit collected.
    pub experience_value: u32,
    /// Expedition progress (0--100) before this resource can be found.
    pub distance_from_camp: u32,
    /// Vitals restored when consumed, if edible or drinkable.
    pub consumable: Option<ConsumableEffect>,
}

/// An immutable equipment definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Equipment {
    /// Catalog slug.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Display glyph.
    pub emoji: String,
    /// Human-readable effect description.
    pub effect: String,
    /// Stat bonuses keyed by stat name.
    pub bonuses: BTreeMap<String, i32>,
    /// Slot the piece occupies.
    pub slot: EquipmentSlot,
    /// Gathering capability, for tools and some weapons.
    pub tool_type: Option<ToolType>,
    /// Weight in kilograms.
    #[ts(as = "String")]
    pub weight: Decimal,
}

/// An immutable, level-gated collection area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Biome {
    /// Catalog slug.
    pub id: BiomeId,
    /// Display name.
    pub name: String,
    /// Display glyph.
    pub emoji: String,
    /// Minimum player level to enter.
    pub required_level: u32,
    /// Resources found here, in display order.
    pub available_resources: Vec<ItemId>,
}

// ---------------------------------------------------------------------------
// Item rows
// ---------------------------------------------------------------------------

/// A stack carried in a player's inventory.
///
/// Quantity is always at least 1; rows reaching zero are deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InventoryItem {
    /// Row identifier.
    pub id: InventoryItemId,
    /// Owning player.
    pub player_id: PlayerId,
    /// Resource or equipment held.
    pub item_id: ItemId,
    /// Stack size.
    pub quantity: u32,
}

/// A stack kept in a player's home-base storage.
///
/// Quantity is always at least 1; rows reaching zero are deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StorageItem {
    /// Row identifier.
    pub id: StorageItemId,
    /// Owning player.
    pub player_id: PlayerId,
    /// Resource or equipment held.
    pub item_id: ItemId,
    /// Stack size.
    pub quantity: u32,
}

/// Weight and slot usage of an inventory.
///
/// `percentage` is unclamped so callers can detect overflow;
/// `display_percentage` is clamped to 0--100 for progress bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CapacityConstraints {
    /// Carried weight in kilograms.
    #[ts(as = "String")]
    pub current_weight: Decimal,
    /// Weight ceiling in kilograms.
    #[ts(as = "String")]
    pub max_weight: Decimal,
    /// Occupied slots.
    pub current_slots: u32,
    /// Slot ceiling.
    pub max_slots: u32,
    /// `current_weight / max_weight * 100`, unclamped.
    #[ts(as = "String")]
    pub percentage: Decimal,
    /// `percentage` clamped to 0--100.
    #[ts(as = "String")]
    pub display_percentage: Decimal,
}

// ---------------------------------------------------------------------------
// Expedition
// ---------------------------------------------------------------------------

/// How an expedition decides how long it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "mode", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ExpeditionMode {
    /// Runs until an auto-return condition fires or the player finalizes.
    Open,
    /// Runs for a fixed duration chasing per-resource targets.
    Manual {
        /// Target quantity per resource.
        targets: BTreeMap<ItemId, u32>,
        /// Planned duration in minutes (5--120).
        duration_minutes: u32,
    },
}

/// Where collected resources ended up when an expedition completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DepositReport {
    /// Units placed in inventory.
    pub deposited: BTreeMap<ItemId, u32>,
    /// Units routed to storage (auto-storage overflow).
    pub stored: BTreeMap<ItemId, u32>,
    /// Units that did not fit anywhere and were left behind.
    pub dropped: BTreeMap<ItemId, u32>,
    /// Units of water added to the water counter.
    pub water_added: u32,
}

impl DepositReport {
    /// Total units dropped across all resources.
    pub fn dropped_total(&self) -> u32 {
        self.dropped.values().fold(0_u32, |acc, q| acc.saturating_add(*q))
    }
}

/// The run record of one expedition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Expedition {
    /// Unique identifier.
    pub id: ExpeditionId,
    /// Player on the expedition.
    pub player_id: PlayerId,
    /// Biome being explored.
    pub biome_id: BiomeId,
    /// Lifecycle status.
    pub status: ExpeditionStatus,
    /// Open or manual.
    pub mode: ExpeditionMode,
    /// Resources the player chose to pursue.
    pub selected_resources: BTreeSet<ItemId>,
    /// Equipment the player brought along.
    pub selected_equipment: Vec<ItemId>,
    /// Units collected so far.
    pub collected_resources: BTreeMap<ItemId, u32>,
    /// Progress from 0 to 100.
    pub progress: u32,
    /// Ticks applied so far.
    pub ticks_elapsed: u64,
    /// Hunger drained so far.
    pub hunger_drained: u32,
    /// Thirst drained so far.
    pub thirst_drained: u32,
    /// Experience granted so far.
    pub experience_gained: u32,
    /// Most recent collection, for client feedback.
    pub last_collected: Option<ItemId>,
    /// When the expedition entered `in_progress`.
    pub start_time: Option<DateTime<Utc>>,
    /// When the expedition became terminal.
    pub end_time: Option<DateTime<Utc>>,
    /// Why the expedition returned on its own, if it did.
    pub auto_return_trigger: Option<ReturnReason>,
    /// Deposit outcome, present once completed.
    pub deposit: Option<DepositReport>,
}

impl Expedition {
    /// Total units collected across all resources.
    pub fn collected_total(&self) -> u32 {
        self.collected_resources
            .values()
            .fold(0_u32, |acc, q| acc.saturating_add(*q))
    }
}

/// Result of one expedition tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TickOutcome {
    /// The expedition that was ticked.
    pub expedition_id: ExpeditionId,
    /// Resource collected this tick, if the roll hit.
    pub resource_collected: Option<ItemId>,
    /// Whether an auto-return condition holds.
    pub should_return: bool,
    /// The condition that fired.
    pub return_reason: Option<ReturnReason>,
    /// Estimated seconds of collection left.
    pub collection_time_remaining: u64,
    /// Progress after the tick.
    pub progress: u32,
}

/// Estimated cost and reward of a manual expedition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ManualEstimate {
    /// `floor(total_targets * 2 + duration * 0.5)`.
    pub estimated_xp: u32,
    /// `floor(duration * 0.8)`.
    pub hunger_cost: u32,
    /// `floor(duration * 0.6)`.
    pub thirst_cost: u32,
}

// ---------------------------------------------------------------------------
// Auto-repeat
// ---------------------------------------------------------------------------

/// Auto-repeat preference for one (player, biome) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AutoRepeatSetting {
    /// Owning player.
    pub player_id: PlayerId,
    /// Biome to repeat.
    pub biome_id: BiomeId,
    /// Whether repeating is switched on.
    pub enabled: bool,
    /// Resource selection to relaunch with.
    pub resources: BTreeSet<ItemId>,
    /// Seconds until the next launch, `0` when not counting.
    pub countdown: u32,
}

/// A resource as seen from a biome screen, with its gating verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BiomeResourceView {
    /// The resource definition.
    pub resource: Resource,
    /// Whether the player's current equipment allows collecting it.
    pub collectible: bool,
}
