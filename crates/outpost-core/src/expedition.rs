//! Expedition records and lifecycle.
//!
//! An expedition moves `planning -> in_progress -> completed | cancelled`.
//! Terminal states are final. [`ExpeditionBook`] stores every record plus a
//! per-player pointer to the one in progress; [`ExpeditionEngine`] validates
//! and applies lifecycle changes against the player store.
//!
//! Ticking lives in [`crate::tick`] and the completion deposit in
//! [`crate::deposit`]; both extend [`ExpeditionEngine`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use outpost_catalog::Catalog;
use outpost_inventory::{InventoryConfig, InventoryError, PlayerStore};
use outpost_types::{
    BiomeId, Expedition, ExpeditionId, ExpeditionMode, ExpeditionStatus, ItemId, PlayerId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ExpeditionConfig;
use crate::error::ExpeditionError;
use crate::manual;

/// A request to start an expedition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpeditionPlan {
    /// Player setting out.
    pub player_id: PlayerId,
    /// Biome to explore.
    pub biome_id: BiomeId,
    /// Resources to pursue. Manual target keys are added automatically.
    #[serde(default)]
    pub resources: BTreeSet<ItemId>,
    /// Equipment to bring; each piece must be carried.
    #[serde(default)]
    pub equipment: Vec<ItemId>,
    /// Open or manual.
    #[serde(default = "open_mode")]
    pub mode: ExpeditionMode,
}

const fn open_mode() -> ExpeditionMode {
    ExpeditionMode::Open
}

impl ExpeditionPlan {
    /// Selected resources including manual target keys.
    pub fn selection(&self) -> BTreeSet<ItemId> {
        let mut selected = self.resources.clone();
        if let ExpeditionMode::Manual { targets, .. } = &self.mode {
            selected.extend(targets.keys().cloned());
        }
        selected
    }
}

/// Every expedition record and the active pointer per player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpeditionBook {
    expeditions: BTreeMap<ExpeditionId, Expedition>,
    active: BTreeMap<PlayerId, ExpeditionId>,
}

impl ExpeditionBook {
    /// Create an empty book.
    pub const fn new() -> Self {
        Self {
            expeditions: BTreeMap::new(),
            active: BTreeMap::new(),
        }
    }

    /// Look up an expedition.
    ///
    /// # Errors
    ///
    /// Returns [`ExpeditionError::ExpeditionNotFound`] if the id is unknown.
    pub fn get(&self, id: ExpeditionId) -> Result<&Expedition, ExpeditionError> {
        self.expeditions
            .get(&id)
            .ok_or(ExpeditionError::ExpeditionNotFound(id))
    }

    /// Look up an expedition for mutation.
    ///
    /// # Errors
    ///
    /// Returns [`ExpeditionError::ExpeditionNotFound`] if the id is unknown.
    pub fn get_mut(&mut self, id: ExpeditionId) -> Result<&mut Expedition, ExpeditionError> {
        self.expeditions
            .get_mut(&id)
            .ok_or(ExpeditionError::ExpeditionNotFound(id))
    }

    /// The player's in-progress expedition, if any.
    pub fn active_for(&self, player: PlayerId) -> Option<ExpeditionId> {
        self.active.get(&player).copied()
    }

    /// Ids of every in-progress expedition, in id order.
    pub fn in_progress(&self) -> Vec<ExpeditionId> {
        self.active.values().copied().collect()
    }

    /// Every expedition a player has run, oldest first.
    pub fn for_player(&self, player: PlayerId) -> Vec<&Expedition> {
        self.expeditions
            .values()
            .filter(|e| e.player_id == player)
            .collect()
    }

    /// Record a new in-progress expedition and point the player at it.
    ///
    /// # Errors
    ///
    /// Returns [`ExpeditionError::ExpeditionAlreadyActive`] if the player
    /// already has one; nothing is inserted in that case.
    fn open(&mut self, expedition: Expedition) -> Result<(), ExpeditionError> {
        if let Some(active) = self.active_for(expedition.player_id) {
            return Err(ExpeditionError::ExpeditionAlreadyActive {
                player: expedition.player_id,
                active,
            });
        }
        self.active.insert(expedition.player_id, expedition.id);
        self.expeditions.insert(expedition.id, expedition);
        Ok(())
    }

    /// Drop the player's active pointer if it names `id`.
    pub(crate) fn release(&mut self, player: PlayerId, id: ExpeditionId) {
        if self.active.get(&player) == Some(&id) {
            self.active.remove(&player);
        }
    }
}

/// Apply a status change if the state machine allows it.
///
/// # Errors
///
/// Returns [`ExpeditionError::InvalidTransition`] otherwise.
pub const fn transition(
    expedition: &mut Expedition,
    next: ExpeditionStatus,
) -> Result<(), ExpeditionError> {
    if !expedition.status.can_transition_to(next) {
        return Err(ExpeditionError::InvalidTransition {
            from: expedition.status,
            to: next,
        });
    }
    expedition.status = next;
    Ok(())
}

/// Validates and drives expeditions against a catalog and config.
#[derive(Debug, Clone, Copy)]
pub struct ExpeditionEngine<'a> {
    pub(crate) catalog: &'a Catalog,
    pub(crate) config: &'a ExpeditionConfig,
    pub(crate) inventory: &'a InventoryConfig,
}

impl<'a> ExpeditionEngine<'a> {
    /// Create an engine.
    pub const fn new(
        catalog: &'a Catalog,
        config: &'a ExpeditionConfig,
        inventory: &'a InventoryConfig,
    ) -> Self {
        Self {
            catalog,
            config,
            inventory,
        }
    }

    /// Validate a plan and start it.
    ///
    /// Preconditions are checked in a fixed order and nothing is mutated
    /// unless all pass. The active-expedition check and insert happen under
    /// the same `&mut` borrow of the book.
    ///
    /// # Errors
    ///
    /// `PlayerNotFound`, `UnknownBiome`, `BiomeLocked`,
    /// `NoResourcesSelected`, `UnknownResource`, `ResourceNotInBiome`,
    /// `InvalidTarget`, `InvalidDuration`, `InsufficientHunger`,
    /// `InsufficientThirst`, equipment errors, or
    /// `ExpeditionAlreadyActive`.
    pub fn start(
        &self,
        store: &PlayerStore,
        book: &mut ExpeditionBook,
        plan: &ExpeditionPlan,
    ) -> Result<Expedition, ExpeditionError> {
        let player = store.player(plan.player_id)?;
        let biome = self
            .catalog
            .biome(&plan.biome_id)
            .ok_or_else(|| ExpeditionError::UnknownBiome(plan.biome_id.clone()))?;
        if !Catalog::is_unlocked(biome, player) {
            return Err(ExpeditionError::BiomeLocked {
                biome: biome.id.clone(),
                required: biome.required_level,
                current: player.level,
            });
        }

        let selected = plan.selection();
        if selected.is_empty() {
            return Err(ExpeditionError::NoResourcesSelected);
        }
        for resource in &selected {
            if self.catalog.resource(resource).is_none() {
                return Err(ExpeditionError::UnknownResource(resource.clone()));
            }
            if !Catalog::biome_offers(biome, resource) {
                return Err(ExpeditionError::ResourceNotInBiome {
                    biome: biome.id.clone(),
                    resource: resource.clone(),
                });
            }
        }

        if let ExpeditionMode::Manual {
            targets,
            duration_minutes,
        } = &plan.mode
        {
            manual::validate_targets(targets)?;
            manual::validate_duration(*duration_minutes, self.config)?;
            let cost = manual::estimate(targets, *duration_minutes, self.config);
            if player.hunger < cost.hunger_cost {
                return Err(ExpeditionError::InsufficientHunger {
                    required: cost.hunger_cost,
                    available: player.hunger,
                });
            }
            if player.thirst < cost.thirst_cost {
                return Err(ExpeditionError::InsufficientThirst {
                    required: cost.thirst_cost,
                    available: player.thirst,
                });
            }
        }

        for item in &plan.equipment {
            if !self.catalog.is_known_item(item) {
                return Err(InventoryError::UnknownItem(item.clone()).into());
            }
            if self.catalog.equipment(item).is_none() {
                return Err(ExpeditionError::NotEquipment(item.clone()));
            }
            if store.inventory_quantity(player.id, item) == 0 {
                return Err(InventoryError::ItemNotHeld(item.clone()).into());
            }
        }

        let mut expedition = Expedition {
            id: ExpeditionId::new(),
            player_id: player.id,
            biome_id: biome.id.clone(),
            status: ExpeditionStatus::Planning,
            mode: plan.mode.clone(),
            selected_resources: selected,
            selected_equipment: plan.equipment.clone(),
            collected_resources: BTreeMap::new(),
            progress: 0,
            ticks_elapsed: 0,
            hunger_drained: 0,
            thirst_drained: 0,
            experience_gained: 0,
            last_collected: None,
            start_time: None,
            end_time: None,
            auto_return_trigger: None,
            deposit: None,
        };
        transition(&mut expedition, ExpeditionStatus::InProgress)?;
        expedition.start_time = Some(Utc::now());

        book.open(expedition.clone())?;
        info!(
            expedition_id = %expedition.id,
            player_id = %expedition.player_id,
            biome = %expedition.biome_id,
            resources = expedition.selected_resources.len(),
            "expedition started"
        );
        Ok(expedition)
    }

    /// Abandon an in-progress expedition. Collected items are discarded.
    ///
    /// # Errors
    ///
    /// `ExpeditionNotFound`, or `InvalidTransition` if already terminal.
    pub fn cancel(
        &self,
        book: &mut ExpeditionBook,
        id: ExpeditionId,
    ) -> Result<Expedition, ExpeditionError> {
        let expedition = book.get_mut(id)?;
        transition(expedition, ExpeditionStatus::Cancelled)?;
        expedition.end_time = Some(Utc::now());
        let snapshot = expedition.clone();
        book.release(snapshot.player_id, id);
        info!(expedition_id = %id, player_id = %snapshot.player_id, "expedition cancelled");
        Ok(snapshot)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use outpost_catalog::create_starting_catalog;
    use outpost_inventory::PlayerDefaults;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    pub(crate) struct Fixture {
        pub catalog: Catalog,
        pub config: ExpeditionConfig,
        pub inventory: InventoryConfig,
        pub store: PlayerStore,
        pub book: ExpeditionBook,
        pub player: PlayerId,
    }

    impl Fixture {
        pub fn new() -> Self {
            let catalog = create_starting_catalog().unwrap();
            let inventory = InventoryConfig::default();
            let mut store = PlayerStore::new();
            let player = store
                .create_player(String::from("Ada"), &PlayerDefaults::default(), &catalog, &inventory)
                .unwrap()
                .id;
            Self {
                catalog,
                config: ExpeditionConfig::default(),
                inventory,
                store,
                book: ExpeditionBook::new(),
                player,
            }
        }

        pub fn engine(&self) -> ExpeditionEngine<'_> {
            ExpeditionEngine::new(&self.catalog, &self.config, &self.inventory)
        }

        pub fn plan(&self, biome: &str, resources: &[&str]) -> ExpeditionPlan {
            ExpeditionPlan {
                player_id: self.player,
                biome_id: BiomeId::from(biome),
                resources: resources.iter().map(|r| ItemId::from(*r)).collect(),
                equipment: Vec::new(),
                mode: ExpeditionMode::Open,
            }
        }

        pub fn start(&mut self, plan: &ExpeditionPlan) -> Result<Expedition, ExpeditionError> {
            let engine = ExpeditionEngine::new(&self.catalog, &self.config, &self.inventory);
            engine.start(&self.store, &mut self.book, plan)
        }
    }

    #[test]
    fn start_moves_to_in_progress() {
        let mut f = Fixture::new();
        let plan = f.plan("forest", &["fiber", "sticks"]);
        let exp = f.start(&plan).unwrap();
        assert_eq!(exp.status, ExpeditionStatus::InProgress);
        assert!(exp.start_time.is_some());
        assert_eq!(f.book.active_for(f.player), Some(exp.id));
    }

    #[test]
    fn second_start_is_rejected() {
        let mut f = Fixture::new();
        f.config.collection_chance_pct = 100;
        let plan = f.plan("forest", &["fiber"]);
        let first = f.start(&plan).unwrap();

        let mut rng = SmallRng::seed_from_u64(17);
        let engine = ExpeditionEngine::new(&f.catalog, &f.config, &f.inventory);
        let outcome = engine.tick(&mut f.store, &mut f.book, first.id, &mut rng).unwrap();
        assert!(!outcome.should_return);
        let before = f.book.get(first.id).unwrap().clone();
        assert_eq!(before.collected_total(), 1);

        let err = f.start(&plan).unwrap_err();
        assert_eq!(
            err,
            ExpeditionError::ExpeditionAlreadyActive {
                player: f.player,
                active: first.id,
            }
        );
        assert_eq!(f.book.for_player(f.player).len(), 1);
        assert_eq!(f.book.active_for(f.player), Some(first.id));
        let after = f.book.get(first.id).unwrap();
        assert_eq!(after.collected_resources, before.collected_resources);
        assert_eq!(after.progress, before.progress);
        assert_eq!(after.status, ExpeditionStatus::InProgress);
    }

    #[test]
    fn locked_biome_is_rejected() {
        let mut f = Fixture::new();
        let plan = f.plan("mountains", &["stone"]);
        assert_eq!(f.start(&plan).unwrap_err().code(), "BiomeLocked");
        assert!(f.book.active_for(f.player).is_none());
    }

    #[test]
    fn preconditions_checked_in_order() {
        let mut f = Fixture::new();
        assert_eq!(f.start(&f.plan("swamp", &[])).unwrap_err().code(), "UnknownBiome");
        assert_eq!(f.start(&f.plan("forest", &[])).unwrap_err().code(), "NoResourcesSelected");
        assert_eq!(
            f.start(&f.plan("forest", &["salmon"])).unwrap_err().code(),
            "ResourceNotInBiome"
        );
        assert_eq!(
            f.start(&f.plan("forest", &["dragon_scale"])).unwrap_err().code(),
            "UnknownResource"
        );
        let mut ghost = f.plan("forest", &["fiber"]);
        ghost.player_id = PlayerId::new();
        assert_eq!(f.start(&ghost).unwrap_err().code(), "PlayerNotFound");
    }

    #[test]
    fn manual_plan_checks_duration_and_vitals() {
        let mut f = Fixture::new();
        let mut plan = f.plan("forest", &[]);
        plan.mode = ExpeditionMode::Manual {
            targets: [(ItemId::from("fiber"), 5)].into_iter().collect(),
            duration_minutes: 200,
        };
        assert_eq!(f.start(&plan).unwrap_err().code(), "InvalidDuration");

        plan.mode = ExpeditionMode::Manual {
            targets: [(ItemId::from("fiber"), 5)].into_iter().collect(),
            duration_minutes: 120,
        };
        f.store.player_mut(f.player).unwrap().hunger = 50;
        // 120 min drains 96 hunger.
        assert_eq!(f.start(&plan).unwrap_err().code(), "InsufficientHunger");

        f.store.player_mut(f.player).unwrap().hunger = 100;
        f.store.player_mut(f.player).unwrap().thirst = 10;
        assert_eq!(f.start(&plan).unwrap_err().code(), "InsufficientThirst");

        f.store.player_mut(f.player).unwrap().thirst = 100;
        let exp = f.start(&plan).unwrap();
        assert!(exp.selected_resources.contains(&ItemId::from("fiber")));
    }

    #[test]
    fn selected_equipment_must_be_carried() {
        let mut f = Fixture::new();
        let mut plan = f.plan("forest", &["oak_wood"]);
        plan.equipment = vec![ItemId::from("stone_axe")];
        assert_eq!(f.start(&plan).unwrap_err().code(), "ItemNotFound");
        f.store
            .add_inventory(f.player, &ItemId::from("stone_axe"), 1)
            .unwrap();
        assert!(f.start(&plan).is_ok());
    }

    #[test]
    fn cancel_is_terminal() {
        let mut f = Fixture::new();
        let plan = f.plan("forest", &["fiber"]);
        let exp = f.start(&plan).unwrap();
        let engine = ExpeditionEngine::new(&f.catalog, &f.config, &f.inventory);
        let cancelled = engine.cancel(&mut f.book, exp.id).unwrap();
        assert_eq!(cancelled.status, ExpeditionStatus::Cancelled);
        assert!(cancelled.end_time.is_some());
        assert!(f.book.active_for(f.player).is_none());
        assert!(matches!(
            engine.cancel(&mut f.book, exp.id),
            Err(ExpeditionError::InvalidTransition { .. })
        ));
        // A new run may start once the old one is terminal.
        assert!(f.start(&plan).is_ok());
    }
}
