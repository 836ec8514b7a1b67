//! Error types for the outpost-inventory crate.
//!
//! Every transfer, vitals, and progression operation validates fully before
//! mutating and reports failure as an [`InventoryError`]. Each variant has a
//! stable machine-readable [`code`](InventoryError::code) that the HTTP layer
//! forwards to clients.

use outpost_types::{EquipmentSlot, InventoryItemId, ItemId, PlayerId, StorageItemId};
use rust_decimal::Decimal;

/// Errors that can occur during inventory and storage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    /// Quantity was zero, negative, non-integer, or out of range.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Attempted to take more of an item than the row holds.
    #[error("insufficient quantity: wanted {requested} of {item} but only have {available}")]
    InsufficientQuantity {
        /// The item being taken.
        item: ItemId,
        /// The quantity the caller asked for.
        requested: u32,
        /// The quantity actually held.
        available: u32,
    },

    /// Adding the items would exceed the inventory's weight or slot limit.
    #[error(
        "inventory capacity exceeded: adding {quantity} of {item} (carrying {current_weight} of {max_weight} kg)"
    )]
    InventoryCapacityExceeded {
        /// The item being added.
        item: ItemId,
        /// The quantity the caller attempted to add.
        quantity: u32,
        /// Weight carried before the addition.
        current_weight: Decimal,
        /// Weight ceiling for the player's level.
        max_weight: Decimal,
    },

    /// Adding the items would exceed the configured storage hard cap.
    #[error("storage capacity exceeded: adding {quantity} of {item} would pass {cap} kg")]
    StorageCapacityExceeded {
        /// The item being stored.
        item: ItemId,
        /// The quantity the caller attempted to store.
        quantity: u32,
        /// The configured hard cap.
        cap: Decimal,
    },

    /// The item has no consumable effect.
    #[error("item is not consumable: {0}")]
    ItemNotConsumable(ItemId),

    /// No inventory row with this id belongs to the player.
    #[error("inventory item not found: {0}")]
    InventoryItemNotFound(InventoryItemId),

    /// No storage row with this id belongs to the player.
    #[error("storage item not found: {0}")]
    StorageItemNotFound(StorageItemId),

    /// The player does not carry the item (needed to equip it).
    #[error("item not held in inventory: {0}")]
    ItemNotHeld(ItemId),

    /// The item exists but is not equipment.
    #[error("item is not equipment: {0}")]
    NotEquipment(ItemId),

    /// Unequip was asked for an empty slot.
    #[error("nothing equipped in slot {0:?}")]
    SlotEmpty(EquipmentSlot),

    /// No player with the given ID exists.
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// The catalog has no resource or equipment with this id.
    #[error("unknown item: {0}")]
    UnknownItem(ItemId),

    /// An arithmetic overflow occurred.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}

impl InventoryError {
    /// Stable machine-readable error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidQuantity(_) => "InvalidQuantity",
            Self::InsufficientQuantity { .. } => "InsufficientQuantity",
            Self::InventoryCapacityExceeded { .. } => "InventoryCapacityExceeded",
            Self::StorageCapacityExceeded { .. } => "StorageCapacityExceeded",
            Self::ItemNotConsumable(_) => "ItemNotConsumable",
            Self::InventoryItemNotFound(_) | Self::StorageItemNotFound(_) | Self::ItemNotHeld(_) => {
                "ItemNotFound"
            }
            Self::NotEquipment(_) => "NotEquipment",
            Self::SlotEmpty(_) => "SlotEmpty",
            Self::PlayerNotFound(_) => "PlayerNotFound",
            Self::UnknownItem(_) => "UnknownItem",
            Self::ArithmeticOverflow { .. } => "ArithmeticOverflow",
        }
    }
}
