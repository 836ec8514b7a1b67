//! Player inventory, storage, vitals, and progression for the Outpost core.
//!
//! This crate holds the logic for what a player carries and how it moves,
//! without any I/O. It sits between `outpost-catalog` (static content) and
//! `outpost-core` (expeditions and orchestration).
//!
//! # Modules
//!
//! - [`capacity`] -- Weight/slot limits and level breakpoints ([`CapacityModel`])
//! - [`config`] -- Slot count, storage cap, and new-player stats
//! - [`error`] -- Error types for all inventory operations ([`InventoryError`])
//! - [`progression`] -- Experience and level-ups
//! - [`state`] -- Keyed in-memory store of players and item rows ([`PlayerStore`])
//! - [`transfer`] -- Inventory/storage moves, consuming, equipping ([`TransferEngine`])
//! - [`vitals`] -- Clamped hunger/thirst/health adjustments

pub mod capacity;
pub mod config;
pub mod error;
pub mod progression;
pub mod state;
pub mod transfer;
pub mod vitals;

// Re-export primary types at crate root for convenience.
pub use capacity::{CapacityModel, InventoryRows, max_weight_for_level};
pub use config::{InventoryConfig, PlayerDefaults};
pub use error::InventoryError;
pub use progression::{MAX_LEVEL, grant_experience, xp_for_next_level};
pub use state::{PlayerStore, StorageRows};
pub use transfer::{ConsumeReport, StoreAllReport, Transfer, TransferEngine, validate_quantity};
pub use vitals::PlayerPatch;
