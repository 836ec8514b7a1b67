//! Notification events pushed to connected clients.
//!
//! Every mutation of a player, their inventory, their storage, or one of
//! their expeditions produces one [`GameEvent`] carrying the fresh state.
//! Delivery is best-effort: a client that misses an event re-fetches over
//! REST.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::PlayerId;
use crate::structs::{CapacityConstraints, Expedition, InventoryItem, Player, StorageItem};

/// A typed state delta keyed by player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GameEvent {
    /// Player stats changed.
    PlayerUpdate {
        /// The player after the change.
        player: Player,
    },
    /// Inventory rows changed.
    InventoryUpdate {
        /// Owning player.
        player_id: PlayerId,
        /// All inventory rows after the change.
        items: Vec<InventoryItem>,
        /// Capacity usage after the change.
        constraints: CapacityConstraints,
    },
    /// Storage rows changed.
    StorageUpdate {
        /// Owning player.
        player_id: PlayerId,
        /// All storage rows after the change.
        items: Vec<StorageItem>,
    },
    /// An expedition changed.
    ExpeditionUpdate {
        /// The expedition after the change.
        expedition: Expedition,
    },
}

impl GameEvent {
    /// The player this event concerns.
    pub const fn player_id(&self) -> PlayerId {
        match self {
            Self::PlayerUpdate { player } => player.id,
            Self::InventoryUpdate { player_id, .. } | Self::StorageUpdate { player_id, .. } => {
                *player_id
            }
            Self::ExpeditionUpdate { expedition } => expedition.player_id,
        }
    }

    /// The wire name of the event type.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PlayerUpdate { .. } => "player_update",
            Self::InventoryUpdate { .. } => "inventory_update",
            Self::StorageUpdate { .. } => "storage_update",
            Self::ExpeditionUpdate { .. } => "expedition_update",
        }
    }
}
