//! The game facade: one owner of all mutable state.
//!
//! [`Game`] holds the players, expeditions, and auto-repeat table together
//! with the catalog, config, and RNG, and exposes every operation the API
//! serves. Each method is a synchronous read-validate-write over `&mut
//! self`, so callers that wrap the game in a single lock get atomic
//! operations for free. After each successful mutation the fresh entity
//! snapshots are published to the [`NotificationSink`].

use std::collections::BTreeMap;
use std::sync::Arc;

use outpost_catalog::{Catalog, can_collect};
use outpost_inventory::vitals::{self, PlayerPatch};
use outpost_inventory::{
    CapacityModel, ConsumeReport, InventoryConfig, PlayerDefaults, PlayerStore,
    StoreAllReport, Transfer, TransferEngine,
};
use outpost_types::{
    AutoRepeatSetting, BiomeId, BiomeResourceView, CapacityConstraints, EquipmentSlot,
    Expedition, ExpeditionId, ExpeditionMode, GameEvent, InventoryItem, InventoryItemId, ItemId,
    ManualEstimate, Player, PlayerId, StorageItem, StorageItemId, TickOutcome,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auto_repeat::AutoRepeatScheduler;
use crate::config::OutpostConfig;
use crate::error::{ExpeditionError, GameError};
use crate::expedition::{ExpeditionBook, ExpeditionEngine, ExpeditionPlan};
use crate::manual;
use crate::notify::NotificationSink;

/// Name given to players created without one.
pub const DEFAULT_PLAYER_NAME: &str = "Survivor";

/// Everything that changes while the game runs. Snapshotted as one unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    /// Players, inventory, and storage.
    pub players: PlayerStore,
    /// Expedition records and active pointers.
    pub expeditions: ExpeditionBook,
    /// Auto-repeat settings and remembered selections.
    pub auto_repeat: AutoRepeatScheduler,
}

/// A player with their current capacity usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    /// The player.
    pub player: Player,
    /// Weight and slot usage.
    pub constraints: CapacityConstraints,
}

/// Inventory rows with capacity usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryView {
    /// One row per item.
    pub items: Vec<InventoryItem>,
    /// Weight and slot usage.
    pub constraints: CapacityConstraints,
}

/// What happened to one due auto-repeat entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AutoRepeatAction {
    /// A new expedition was launched and the countdown re-armed.
    Started {
        /// The player.
        player: PlayerId,
        /// The biome.
        biome: BiomeId,
        /// The launched expedition.
        expedition: ExpeditionId,
    },
    /// An expedition is still running; retried next second.
    Held {
        /// The player.
        player: PlayerId,
        /// The biome.
        biome: BiomeId,
    },
    /// The entry was switched off.
    Disabled {
        /// The player.
        player: PlayerId,
        /// The biome.
        biome: BiomeId,
        /// Error code that caused it.
        code: &'static str,
    },
}

/// Owner of all game state and entry point for every operation.
pub struct Game {
    state: GameState,
    catalog: Arc<Catalog>,
    config: OutpostConfig,
    inventory: InventoryConfig,
    defaults: PlayerDefaults,
    rng: StdRng,
    sink: Arc<dyn NotificationSink>,
}

impl Game {
    /// Create a game with empty state. The RNG is seeded from
    /// `config.world.seed`.
    pub fn new(config: OutpostConfig, catalog: Arc<Catalog>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            state: GameState::default(),
            catalog,
            inventory: config.inventory(),
            defaults: config.player_defaults(),
            rng: StdRng::seed_from_u64(config.world.seed),
            config,
            sink,
        }
    }

    /// Replace the state, e.g. with a loaded snapshot.
    #[must_use]
    pub fn with_state(mut self, state: GameState) -> Self {
        self.state = state;
        self
    }

    /// Current state.
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// The catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The loaded configuration.
    pub const fn config(&self) -> &OutpostConfig {
        &self.config
    }

    // -----------------------------------------------------------------
    // Players
    // -----------------------------------------------------------------

    /// Create a player with the configured starting stats and items.
    ///
    /// # Errors
    ///
    /// Returns `UnknownItem` if a configured starting item is not in the
    /// catalog.
    pub fn create_player(&mut self, name: Option<String>) -> Result<PlayerView, GameError> {
        let name = name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_PLAYER_NAME));
        let player =
            self.state
                .players
                .create_player(name, &self.defaults, &self.catalog, &self.inventory)?;
        self.publish_player(player.id);
        self.publish_inventory(player.id);
        self.player(player.id)
    }

    /// A player with capacity usage.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNotFound` for an unknown id.
    pub fn player(&self, id: PlayerId) -> Result<PlayerView, GameError> {
        let player = self.state.players.player(id)?;
        Ok(PlayerView {
            player: player.clone(),
            constraints: self.capacity().constraints(self.state.players.inventory(id), player),
        })
    }

    /// Apply clamped stat deltas.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNotFound` for an unknown id.
    pub fn patch_player(&mut self, id: PlayerId, patch: &PlayerPatch) -> Result<PlayerView, GameError> {
        vitals::apply_patch(self.state.players.player_mut(id)?, patch);
        self.publish_player(id);
        self.player(id)
    }

    // -----------------------------------------------------------------
    // Inventory and storage
    // -----------------------------------------------------------------

    /// Inventory rows with capacity usage.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNotFound` for an unknown id.
    pub fn inventory(&self, id: PlayerId) -> Result<InventoryView, GameError> {
        let player = self.state.players.player(id)?;
        Ok(InventoryView {
            items: self.state.players.inventory_items(id),
            constraints: self.capacity().constraints(self.state.players.inventory(id), player),
        })
    }

    /// Storage rows.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNotFound` for an unknown id.
    pub fn storage(&self, id: PlayerId) -> Result<Vec<StorageItem>, GameError> {
        self.state.players.player(id)?;
        Ok(self.state.players.storage_items(id))
    }

    /// Move units of an inventory row into storage.
    ///
    /// # Errors
    ///
    /// See [`TransferEngine::move_to_storage`].
    pub fn move_to_storage(
        &mut self,
        player: PlayerId,
        row: InventoryItemId,
        quantity: u32,
    ) -> Result<Transfer, GameError> {
        let transfer = TransferEngine::new(&self.catalog, &self.inventory).move_to_storage(
            &mut self.state.players,
            player,
            row,
            quantity,
        )?;
        self.publish_all(player);
        Ok(transfer)
    }

    /// Move units of a storage row back into inventory.
    ///
    /// # Errors
    ///
    /// See [`TransferEngine::withdraw`].
    pub fn withdraw(
        &mut self,
        player: PlayerId,
        row: StorageItemId,
        quantity: u32,
    ) -> Result<Transfer, GameError> {
        let transfer = TransferEngine::new(&self.catalog, &self.inventory).withdraw(
            &mut self.state.players,
            player,
            row,
            quantity,
        )?;
        self.publish_all(player);
        Ok(transfer)
    }

    /// Move every unequipped inventory row into storage.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNotFound` for an unknown id. Per-row failures are in
    /// the report.
    pub fn store_all(&mut self, player: PlayerId) -> Result<StoreAllReport, GameError> {
        let report = TransferEngine::new(&self.catalog, &self.inventory)
            .store_all(&mut self.state.players, player)?;
        self.publish_all(player);
        Ok(report)
    }

    /// Eat or drink units of an inventory row.
    ///
    /// # Errors
    ///
    /// See [`TransferEngine::consume`].
    pub fn consume(
        &mut self,
        player: PlayerId,
        row: InventoryItemId,
        quantity: u32,
    ) -> Result<ConsumeReport, GameError> {
        let report = TransferEngine::new(&self.catalog, &self.inventory).consume(
            &mut self.state.players,
            player,
            row,
            quantity,
        )?;
        self.publish_player(player);
        self.publish_inventory(player);
        Ok(report)
    }

    /// Drink from the water counter.
    ///
    /// # Errors
    ///
    /// See [`TransferEngine::drink_water`].
    pub fn drink_water(&mut self, player: PlayerId, amount: u32) -> Result<ConsumeReport, GameError> {
        let report = TransferEngine::new(&self.catalog, &self.inventory).drink_water(
            &mut self.state.players,
            player,
            amount,
        )?;
        self.publish_player(player);
        Ok(report)
    }

    /// Equip a carried piece of equipment into its slot.
    ///
    /// # Errors
    ///
    /// See [`TransferEngine::equip`].
    pub fn equip(&mut self, player: PlayerId, item: &ItemId) -> Result<PlayerView, GameError> {
        TransferEngine::new(&self.catalog, &self.inventory).equip(
            &mut self.state.players,
            player,
            item,
        )?;
        self.publish_player(player);
        self.player(player)
    }

    /// Empty an equipment slot.
    ///
    /// # Errors
    ///
    /// See [`TransferEngine::unequip`].
    pub fn unequip(&mut self, player: PlayerId, slot: EquipmentSlot) -> Result<PlayerView, GameError> {
        TransferEngine::new(&self.catalog, &self.inventory).unequip(
            &mut self.state.players,
            player,
            slot,
        )?;
        self.publish_player(player);
        self.player(player)
    }

    /// Every resource of a biome with whether the player can collect it
    /// with their current equipment.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNotFound` or `UnknownBiome`.
    pub fn biome_view(
        &self,
        player: PlayerId,
        biome: &BiomeId,
    ) -> Result<Vec<BiomeResourceView>, GameError> {
        let player = self.state.players.player(player)?;
        let biome = self
            .catalog
            .biome(biome)
            .ok_or_else(|| ExpeditionError::UnknownBiome(biome.clone()))?;
        Ok(biome
            .available_resources
            .iter()
            .filter_map(|id| self.catalog.resource(id))
            .map(|resource| BiomeResourceView {
                resource: resource.clone(),
                collectible: can_collect(resource, player, &self.catalog),
            })
            .collect())
    }

    // -----------------------------------------------------------------
    // Expeditions
    // -----------------------------------------------------------------

    /// Start an expedition and remember its selection for auto-repeat.
    ///
    /// # Errors
    ///
    /// See [`ExpeditionEngine::start`].
    pub fn start_expedition(&mut self, plan: &ExpeditionPlan) -> Result<Expedition, GameError> {
        let expedition = ExpeditionEngine::new(&self.catalog, &self.config.expedition, &self.inventory)
            .start(&self.state.players, &mut self.state.expeditions, plan)?;
        self.state.auto_repeat.remember(
            expedition.player_id,
            &expedition.biome_id,
            &expedition.selected_resources,
        );
        self.publish_expedition(&expedition);
        Ok(expedition)
    }

    /// Reward and cost of a manual run without starting it.
    ///
    /// # Errors
    ///
    /// `InvalidTarget` or `InvalidDuration`.
    pub fn estimate(
        &self,
        targets: &BTreeMap<ItemId, u32>,
        duration_minutes: u32,
    ) -> Result<ManualEstimate, GameError> {
        manual::validate_targets(targets)?;
        manual::validate_duration(duration_minutes, &self.config.expedition)?;
        Ok(manual::estimate(targets, duration_minutes, &self.config.expedition))
    }

    /// Read one expedition.
    ///
    /// # Errors
    ///
    /// Returns `ExpeditionNotFound` for an unknown id.
    pub fn expedition(&self, id: ExpeditionId) -> Result<Expedition, GameError> {
        Ok(self.state.expeditions.get(id)?.clone())
    }

    /// Advance one expedition by one tick.
    ///
    /// # Errors
    ///
    /// See [`ExpeditionEngine::tick`].
    pub fn tick_expedition(&mut self, id: ExpeditionId) -> Result<TickOutcome, GameError> {
        let result = ExpeditionEngine::new(&self.catalog, &self.config.expedition, &self.inventory)
            .tick(&mut self.state.players, &mut self.state.expeditions, id, &mut self.rng);

        // A failed tick may have cancelled the expedition; publish either way.
        if let Ok(expedition) = self.state.expeditions.get(id) {
            let player = expedition.player_id;
            let expedition = expedition.clone();
            self.publish_expedition(&expedition);
            self.publish_player(player);
            if matches!(&result, Ok(outcome) if outcome.should_return) {
                self.publish_inventory(player);
                self.publish_storage(player);
            }
        }
        result.map_err(GameError::from)
    }

    /// Finish an expedition and deposit its haul.
    ///
    /// # Errors
    ///
    /// See [`ExpeditionEngine::complete`].
    pub fn complete_expedition(&mut self, id: ExpeditionId) -> Result<Expedition, GameError> {
        let expedition = ExpeditionEngine::new(&self.catalog, &self.config.expedition, &self.inventory)
            .complete(&mut self.state.players, &mut self.state.expeditions, id, None)?;
        self.publish_expedition(&expedition);
        self.publish_all(expedition.player_id);
        Ok(expedition)
    }

    /// Abandon an expedition.
    ///
    /// # Errors
    ///
    /// See [`ExpeditionEngine::cancel`].
    pub fn cancel_expedition(&mut self, id: ExpeditionId) -> Result<Expedition, GameError> {
        let expedition = ExpeditionEngine::new(&self.catalog, &self.config.expedition, &self.inventory)
            .cancel(&mut self.state.expeditions, id)?;
        self.publish_expedition(&expedition);
        Ok(expedition)
    }

    /// Tick every in-progress expedition once. Failures are logged and
    /// skipped.
    pub fn tick_all(&mut self) -> Vec<TickOutcome> {
        let ids = self.state.expeditions.in_progress();
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            match self.tick_expedition(id) {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    warn!(expedition_id = %id, code = err.code(), error = %err, "scheduled tick failed");
                }
            }
        }
        outcomes
    }

    // -----------------------------------------------------------------
    // Auto-repeat
    // -----------------------------------------------------------------

    /// Switch auto-repeat for a biome on or off.
    ///
    /// # Errors
    ///
    /// `PlayerNotFound`, `UnknownBiome`, or `NoRememberedSelection`.
    pub fn toggle_auto_repeat(
        &mut self,
        player: PlayerId,
        biome: &BiomeId,
    ) -> Result<AutoRepeatSetting, GameError> {
        self.state.players.player(player)?;
        if self.catalog.biome(biome).is_none() {
            return Err(ExpeditionError::UnknownBiome(biome.clone()).into());
        }
        let setting =
            self.state
                .auto_repeat
                .toggle(player, biome, self.config.auto_repeat.countdown_secs)?;
        info!(player_id = %player, biome = %biome, enabled = setting.enabled, "auto-repeat toggled");
        Ok(setting)
    }

    /// A player's auto-repeat settings.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNotFound` for an unknown id.
    pub fn auto_repeat_settings(&self, player: PlayerId) -> Result<Vec<AutoRepeatSetting>, GameError> {
        self.state.players.player(player)?;
        Ok(self.state.auto_repeat.settings_for(player))
    }

    /// Count auto-repeat timers down and act on every due entry.
    pub fn advance_auto_repeat(&mut self, seconds: u32) -> Vec<AutoRepeatAction> {
        let due = self.state.auto_repeat.advance(seconds);
        due.into_iter()
            .map(|(player, biome)| self.run_auto_repeat(player, biome))
            .collect()
    }

    fn run_auto_repeat(&mut self, player: PlayerId, biome: BiomeId) -> AutoRepeatAction {
        if self.state.expeditions.active_for(player).is_some() {
            return AutoRepeatAction::Held { player, biome };
        }

        let floor = self.config.auto_repeat.vitals_floor;
        let below_floor = match self.state.players.player(player) {
            Ok(p) => p.hunger < floor || p.thirst < floor,
            Err(err) => return self.disable_auto_repeat(player, biome, err.code()),
        };
        if below_floor {
            return self.disable_auto_repeat(player, biome, "VitalsBelowFloor");
        }

        let resources = self
            .state
            .auto_repeat
            .setting(player, &biome)
            .map(|s| s.resources.clone())
            .unwrap_or_default();
        let plan = ExpeditionPlan {
            player_id: player,
            biome_id: biome.clone(),
            resources,
            equipment: Vec::new(),
            mode: ExpeditionMode::Open,
        };
        match self.start_expedition(&plan) {
            Ok(expedition) => {
                self.state
                    .auto_repeat
                    .re_arm(player, &biome, self.config.auto_repeat.countdown_secs);
                info!(player_id = %player, biome = %biome, expedition_id = %expedition.id, "auto-repeat launched expedition");
                AutoRepeatAction::Started {
                    player,
                    biome,
                    expedition: expedition.id,
                }
            }
            Err(err) => self.disable_auto_repeat(player, biome, err.code()),
        }
    }

    fn disable_auto_repeat(&mut self, player: PlayerId, biome: BiomeId, code: &'static str) -> AutoRepeatAction {
        warn!(player_id = %player, biome = %biome, code, "auto-repeat disabled");
        self.state.auto_repeat.disable(player, &biome);
        AutoRepeatAction::Disabled {
            player,
            biome,
            code,
        }
    }

    // -----------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------

    fn capacity(&self) -> CapacityModel<'_> {
        CapacityModel::new(&self.catalog, &self.inventory)
    }

    fn publish_player(&self, id: PlayerId) {
        if let Ok(player) = self.state.players.player(id) {
            self.sink.publish(&GameEvent::PlayerUpdate {
                player: player.clone(),
            });
        }
    }

    fn publish_inventory(&self, id: PlayerId) {
        if let Ok(view) = self.inventory(id) {
            self.sink.publish(&GameEvent::InventoryUpdate {
                player_id: id,
                items: view.items,
                constraints: view.constraints,
            });
        }
    }

    fn publish_storage(&self, id: PlayerId) {
        self.sink.publish(&GameEvent::StorageUpdate {
            player_id: id,
            items: self.state.players.storage_items(id),
        });
    }

    fn publish_all(&self, id: PlayerId) {
        self.publish_player(id);
        self.publish_inventory(id);
        self.publish_storage(id);
    }

    fn publish_expedition(&self, expedition: &Expedition) {
        self.sink.publish(&GameEvent::ExpeditionUpdate {
            expedition: expedition.clone(),
        });
    }
}
