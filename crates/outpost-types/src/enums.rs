//! Enumeration types for the Outpost core.
//!
//! All enums serialize in `snake_case` so the wire format matches the
//! strings the web client already uses (`"fishing_rod"`, `"in_progress"`).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Catalog classification
// ---------------------------------------------------------------------------

/// How rare a resource is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Rarity {
    /// Found everywhere.
    Common,
    /// Found occasionally.
    Uncommon,
    /// Found seldom.
    Rare,
}

/// Whether a resource is a freely gatherable basic or a unique find.
///
/// Basic resources never require a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    /// Fiber, loose stones, sticks, mushrooms, berries, shells, clay.
    Basic,
    /// Anything else.
    Unique,
}

/// Gathering category of a resource, keyed into the catalog's gating table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceCategory {
    /// Picked up by hand.
    Basic,
    /// Logs and timber.
    Wood,
    /// Quarried stone.
    Stone,
    /// Metal ores.
    Ore,
    /// Crystals and gems.
    Crystal,
    /// Fresh water, stored in the separate water counter.
    Water,
    /// Fish.
    Fish,
    /// Hunted animals.
    Animal,
    /// Anything the gating table does not know about.
    Other,
}

/// The slot an equipment piece occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EquipmentSlot {
    /// Head armor.
    Helmet,
    /// Body armor.
    Chestplate,
    /// Leg armor.
    Leggings,
    /// Foot armor.
    Boots,
    /// Hand weapon.
    Weapon,
    /// Gathering tool.
    Tool,
}

/// The gathering capability a tool (or weapon) provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ToolType {
    /// Fells trees.
    Axe,
    /// Breaks stone, ore, and crystal.
    Pickaxe,
    /// Catches fish.
    FishingRod,
    /// Skins hunted animals.
    Knife,
    /// Carries water.
    Bucket,
    /// Carries water.
    BambooBottle,
}

// ---------------------------------------------------------------------------
// Expedition lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle status of an expedition.
///
/// Transitions are monotonic: `Planning -> InProgress -> {Completed | Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ExpeditionStatus {
    /// Configured but not yet started.
    Planning,
    /// Running and receiving ticks.
    InProgress,
    /// Finished and deposited.
    Completed,
    /// Abandoned with no inventory changes.
    Cancelled,
}

impl ExpeditionStatus {
    /// Whether the status is final.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether moving from `self` to `next` respects the lifecycle order.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Planning, Self::InProgress | Self::Cancelled)
                | (Self::InProgress, Self::Completed | Self::Cancelled)
        )
    }
}

/// Why an expedition returned on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ReturnReason {
    /// Carried weight reached the auto-return share of capacity.
    InventoryFull,
    /// Hunger fell to the low threshold.
    HungerLow,
    /// Thirst fell to the low threshold.
    ThirstLow,
    /// Progress reached 100.
    MaxDistanceReached,
    /// Every target of a manual expedition was collected.
    TargetsReached,
}
