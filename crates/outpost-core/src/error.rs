//! Error types for expedition and game operations.
//!
//! [`ExpeditionError`] covers the expedition lifecycle; [`GameError`] is the
//! umbrella returned by every [`Game`](crate::game::Game) operation. Each
//! error reports a stable [`code`](GameError::code) and an [`ErrorKind`]
//! that the HTTP layer maps to a status.

use outpost_inventory::InventoryError;
use outpost_types::{BiomeId, ExpeditionId, ExpeditionStatus, ItemId, PlayerId};

/// Coarse classification used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// The request conflicts with current state or a precondition.
    Conflict,
    /// A weight, slot, or storage limit would be exceeded.
    Capacity,
    /// An invariant broke inside the engine.
    Internal,
}

/// Errors from starting, ticking, and finishing expeditions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpeditionError {
    /// No biome has this id.
    #[error("unknown biome: {0}")]
    UnknownBiome(BiomeId),

    /// The player's level is below the biome's requirement.
    #[error("biome {biome} requires level {required}, player is level {current}")]
    BiomeLocked {
        /// The locked biome.
        biome: BiomeId,
        /// Level needed.
        required: u32,
        /// Player's level.
        current: u32,
    },

    /// The plan selected no resources.
    #[error("no resources selected")]
    NoResourcesSelected,

    /// The catalog has no resource with this id.
    #[error("unknown resource: {0}")]
    UnknownResource(ItemId),

    /// A selected resource does not occur in the biome.
    #[error("resource {resource} is not found in biome {biome}")]
    ResourceNotInBiome {
        /// The biome.
        biome: BiomeId,
        /// The offending resource.
        resource: ItemId,
    },

    /// Manual duration outside the allowed range.
    #[error("duration {minutes} min is outside {min}..={max}")]
    InvalidDuration {
        /// Requested minutes.
        minutes: u32,
        /// Shortest allowed.
        min: u32,
        /// Longest allowed.
        max: u32,
    },

    /// A manual target was zero.
    #[error("target for {0} must be at least 1")]
    InvalidTarget(ItemId),

    /// Selected equipment is not a piece of equipment.
    #[error("not equipment: {0}")]
    NotEquipment(ItemId),

    /// Not enough hunger banked for the manual run.
    #[error("insufficient hunger: need {required}, have {available}")]
    InsufficientHunger {
        /// Hunger the run will drain.
        required: u32,
        /// Player's current hunger.
        available: u32,
    },

    /// Not enough thirst banked for the manual run.
    #[error("insufficient thirst: need {required}, have {available}")]
    InsufficientThirst {
        /// Thirst the run will drain.
        required: u32,
        /// Player's current thirst.
        available: u32,
    },

    /// The player already has an expedition in progress.
    #[error("player {player} already has expedition {active} in progress")]
    ExpeditionAlreadyActive {
        /// The player.
        player: PlayerId,
        /// The running expedition.
        active: ExpeditionId,
    },

    /// The expedition is not in progress.
    #[error("expedition {0} is not in progress")]
    ExpeditionNotActive(ExpeditionId),

    /// No expedition with this id exists.
    #[error("expedition not found: {0}")]
    ExpeditionNotFound(ExpeditionId),

    /// The requested status change is not allowed.
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// Current status.
        from: ExpeditionStatus,
        /// Requested status.
        to: ExpeditionStatus,
    },

    /// An arithmetic overflow occurred.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A wrapped inventory error (missing player, deposit failure).
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl ExpeditionError {
    /// Stable machine-readable error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownBiome(_) => "UnknownBiome",
            Self::BiomeLocked { .. } => "BiomeLocked",
            Self::NoResourcesSelected => "NoResourcesSelected",
            Self::UnknownResource(_) => "UnknownResource",
            Self::ResourceNotInBiome { .. } => "ResourceNotInBiome",
            Self::InvalidDuration { .. } => "InvalidDuration",
            Self::InvalidTarget(_) => "InvalidTarget",
            Self::NotEquipment(_) => "NotEquipment",
            Self::InsufficientHunger { .. } => "InsufficientHunger",
            Self::InsufficientThirst { .. } => "InsufficientThirst",
            Self::ExpeditionAlreadyActive { .. } => "ExpeditionAlreadyActive",
            Self::ExpeditionNotActive(_) => "ExpeditionNotActive",
            Self::ExpeditionNotFound(_) => "ExpeditionNotFound",
            Self::InvalidTransition { .. } => "InvalidTransition",
            Self::ArithmeticOverflow { .. } => "ArithmeticOverflow",
            Self::Inventory(inner) => inner.code(),
        }
    }

    /// Classification for response mapping.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoResourcesSelected
            | Self::InvalidDuration { .. }
            | Self::InvalidTarget(_)
            | Self::NotEquipment(_)
            | Self::ResourceNotInBiome { .. } => ErrorKind::Validation,
            Self::UnknownBiome(_) | Self::UnknownResource(_) | Self::ExpeditionNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::BiomeLocked { .. }
            | Self::InsufficientHunger { .. }
            | Self::InsufficientThirst { .. }
            | Self::ExpeditionAlreadyActive { .. }
            | Self::ExpeditionNotActive(_)
            | Self::InvalidTransition { .. } => ErrorKind::Conflict,
            Self::ArithmeticOverflow { .. } => ErrorKind::Internal,
            Self::Inventory(inner) => inventory_kind(inner),
        }
    }

    /// Whether the failure came from inside the engine rather than from a
    /// rejected request.
    pub const fn is_internal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Internal)
    }
}

/// Errors from toggling auto-repeat.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutoRepeatError {
    /// No expedition has been run in this biome to copy a selection from.
    #[error("no remembered resource selection for player {player} in biome {biome}")]
    NoRememberedSelection {
        /// The player.
        player: PlayerId,
        /// The biome.
        biome: BiomeId,
    },
}

/// Umbrella error for [`Game`](crate::game::Game) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// An inventory, storage, or vitals operation failed.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// An expedition operation failed.
    #[error(transparent)]
    Expedition(#[from] ExpeditionError),

    /// An auto-repeat operation failed.
    #[error(transparent)]
    AutoRepeat(#[from] AutoRepeatError),
}

impl GameError {
    /// Stable machine-readable error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Inventory(inner) => inner.code(),
            Self::Expedition(inner) => inner.code(),
            Self::AutoRepeat(AutoRepeatError::NoRememberedSelection { .. }) => {
                "NoRememberedSelection"
            }
        }
    }

    /// Classification for response mapping.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Inventory(inner) => inventory_kind(inner),
            Self::Expedition(inner) => inner.kind(),
            Self::AutoRepeat(_) => ErrorKind::Conflict,
        }
    }
}

const fn inventory_kind(err: &InventoryError) -> ErrorKind {
    match err {
        InventoryError::InvalidQuantity(_)
        | InventoryError::ItemNotConsumable(_)
        | InventoryError::NotEquipment(_) => ErrorKind::Validation,
        InventoryError::InventoryItemNotFound(_)
        | InventoryError::StorageItemNotFound(_)
        | InventoryError::ItemNotHeld(_)
        | InventoryError::PlayerNotFound(_)
        | InventoryError::UnknownItem(_) => ErrorKind::NotFound,
        InventoryError::InsufficientQuantity { .. } | InventoryError::SlotEmpty(_) => {
            ErrorKind::Conflict
        }
        InventoryError::InventoryCapacityExceeded { .. }
        | InventoryError::StorageCapacityExceeded { .. } => ErrorKind::Capacity,
        InventoryError::ArithmeticOverflow { .. } => ErrorKind::Internal,
    }
}
