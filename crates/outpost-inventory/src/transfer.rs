//! Moving items between inventory and storage, consuming them, and
//! managing equipment.
//!
//! Every operation validates fully before touching the store, so a failed
//! call leaves inventory, storage, and the player exactly as they were.
//! Successful calls recompute the player's carried weight.
//!
//! Equipped items are ordinary inventory rows. When the last unit of an
//! equipped item leaves the inventory, its slot is cleared.

use std::collections::BTreeMap;

use outpost_catalog::Catalog;
use outpost_types::{EquipmentSlot, InventoryItemId, ItemId, PlayerId, StorageItemId};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::capacity::{CapacityModel, max_weight_for_level};
use crate::config::InventoryConfig;
use crate::error::InventoryError;
use crate::state::{PlayerStore, StorageRows};
use crate::vitals;

/// Item id reported when the water counter runs short.
pub const WATER_COUNTER: &str = "water";

/// A completed move of one item between inventory and storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    /// The item moved.
    pub item_id: ItemId,
    /// Units moved.
    pub quantity: u32,
}

/// Outcome of [`TransferEngine::store_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreAllReport {
    /// Units moved per item.
    pub moved: BTreeMap<ItemId, u32>,
    /// Items left in inventory, with the error code that stopped them.
    pub failed: BTreeMap<ItemId, String>,
}

/// Vitals actually restored by a consume or drink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsumeReport {
    /// Hunger points applied.
    pub hunger_restored: u32,
    /// Thirst points applied.
    pub thirst_restored: u32,
}

/// Reject a zero quantity.
///
/// # Errors
///
/// Returns [`InventoryError::InvalidQuantity`] when `quantity` is zero.
pub fn validate_quantity(quantity: u32) -> Result<u32, InventoryError> {
    if quantity == 0 {
        return Err(InventoryError::InvalidQuantity(String::from("0")));
    }
    Ok(quantity)
}

/// Inventory/storage transfer operations against a catalog and limits.
#[derive(Debug, Clone, Copy)]
pub struct TransferEngine<'a> {
    catalog: &'a Catalog,
    config: &'a InventoryConfig,
}

impl<'a> TransferEngine<'a> {
    /// Create an engine over `catalog` with the given limits.
    pub const fn new(catalog: &'a Catalog, config: &'a InventoryConfig) -> Self {
        Self { catalog, config }
    }

    /// The capacity model these transfers validate against.
    pub const fn capacity(&self) -> CapacityModel<'a> {
        CapacityModel::new(self.catalog, self.config)
    }

    /// Total weight held in storage.
    pub fn storage_weight(&self, rows: &StorageRows) -> Decimal {
        self.capacity()
            .compute_weight(rows.values().map(|row| (&row.item_id, row.quantity)))
    }

    /// Fail if `quantity` more of `item` would pass the storage hard cap.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::StorageCapacityExceeded`] when a cap is
    /// configured and would be exceeded.
    pub fn check_storage_room(
        &self,
        rows: &StorageRows,
        item: &ItemId,
        quantity: u32,
    ) -> Result<(), InventoryError> {
        let Some(cap) = self.config.storage_hard_cap_kg else {
            return Ok(());
        };
        let added = self
            .catalog
            .item_weight_or_zero(item)
            .saturating_mul(Decimal::from(quantity));
        if self.storage_weight(rows).saturating_add(added) > cap {
            return Err(InventoryError::StorageCapacityExceeded {
                item: item.clone(),
                quantity,
                cap,
            });
        }
        Ok(())
    }

    /// Largest quantity of `item` storage can still take.
    pub fn storage_max_fit(&self, rows: &StorageRows, item: &ItemId) -> u32 {
        let Some(cap) = self.config.storage_hard_cap_kg else {
            return u32::MAX;
        };
        let unit = self.catalog.item_weight_or_zero(item);
        if unit.is_zero() {
            return u32::MAX;
        }
        let remaining = cap.saturating_sub(self.storage_weight(rows));
        if remaining <= Decimal::ZERO {
            return 0;
        }
        remaining
            .checked_div(unit)
            .map(|units| units.floor())
            .and_then(|units| rust_decimal::prelude::ToPrimitive::to_u32(&units))
            .unwrap_or(u32::MAX)
    }

    /// Move `quantity` units of an inventory row into storage.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity`, `PlayerNotFound`, `ItemNotFound`,
    /// `InsufficientQuantity`, or `StorageCapacityExceeded`.
    pub fn move_to_storage(
        &self,
        store: &mut PlayerStore,
        player: PlayerId,
        row: InventoryItemId,
        quantity: u32,
    ) -> Result<Transfer, InventoryError> {
        validate_quantity(quantity)?;
        store.player(player)?;
        let item = store.inventory_row(player, row)?;
        let item_id = item.item_id.clone();
        ensure_available(&item_id, quantity, item.quantity)?;
        self.check_storage_room(store.storage(player), &item_id, quantity)?;

        store.remove_inventory(player, &item_id, quantity)?;
        store.add_storage(player, &item_id, quantity)?;
        self.settle(store, player)?;

        debug!(player_id = %player, item = %item_id, quantity, "moved to storage");
        Ok(Transfer { item_id, quantity })
    }

    /// Move `quantity` units of a storage row into inventory.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity`, `PlayerNotFound`, `ItemNotFound`,
    /// `InsufficientQuantity`, or `InventoryCapacityExceeded`.
    pub fn withdraw(
        &self,
        store: &mut PlayerStore,
        player: PlayerId,
        row: StorageItemId,
        quantity: u32,
    ) -> Result<Transfer, InventoryError> {
        validate_quantity(quantity)?;
        let p = store.player(player)?;
        let item = store.storage_row(player, row)?;
        let item_id = item.item_id.clone();
        ensure_available(&item_id, quantity, item.quantity)?;

        let capacity = self.capacity();
        let rows = store.inventory(player);
        if !capacity.can_add(rows, &item_id, quantity, p) {
            return Err(InventoryError::InventoryCapacityExceeded {
                item: item_id,
                quantity,
                current_weight: capacity.rows_weight(rows),
                max_weight: max_weight_for_level(p.level),
            });
        }

        store.remove_storage(player, &item_id, quantity)?;
        store.add_inventory(player, &item_id, quantity)?;
        self.settle(store, player)?;

        debug!(player_id = %player, item = %item_id, quantity, "withdrew from storage");
        Ok(Transfer { item_id, quantity })
    }

    /// Move every unequipped inventory row into storage, best effort.
    ///
    /// Rows that cannot move (storage cap) stay put and are listed in the
    /// report; the rest still move.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNotFound` if the player does not exist.
    pub fn store_all(
        &self,
        store: &mut PlayerStore,
        player: PlayerId,
    ) -> Result<StoreAllReport, InventoryError> {
        let p = store.player(player)?;
        let candidates: Vec<(ItemId, u32)> = store
            .inventory(player)
            .values()
            .filter(|row| !p.equipped.iter().any(|(_, id)| *id == row.item_id))
            .map(|row| (row.item_id.clone(), row.quantity))
            .collect();

        let mut report = StoreAllReport::default();
        for (item_id, quantity) in candidates {
            let moved = self
                .check_storage_room(store.storage(player), &item_id, quantity)
                .and_then(|()| store.remove_inventory(player, &item_id, quantity))
                .and_then(|()| store.add_storage(player, &item_id, quantity));
            match moved {
                Ok(()) => {
                    report.moved.insert(item_id, quantity);
                }
                Err(err) => {
                    warn!(player_id = %player, item = %item_id, error = %err, "store-all skipped row");
                    report.failed.insert(item_id, String::from(err.code()));
                }
            }
        }
        self.settle(store, player)?;
        Ok(report)
    }

    /// Eat or drink `quantity` units of an inventory row.
    ///
    /// Restores are capped at the player's maxima; the report holds the
    /// amounts actually applied.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity`, `PlayerNotFound`, `ItemNotFound`,
    /// `ItemNotConsumable`, or `InsufficientQuantity`.
    pub fn consume(
        &self,
        store: &mut PlayerStore,
        player: PlayerId,
        row: InventoryItemId,
        quantity: u32,
    ) -> Result<ConsumeReport, InventoryError> {
        validate_quantity(quantity)?;
        store.player(player)?;
        let item = store.inventory_row(player, row)?;
        let item_id = item.item_id.clone();
        let effect = self
            .catalog
            .resource(&item_id)
            .and_then(|r| r.consumable)
            .ok_or_else(|| InventoryError::ItemNotConsumable(item_id.clone()))?;
        ensure_available(&item_id, quantity, item.quantity)?;

        store.remove_inventory(player, &item_id, quantity)?;
        let p = store.player_mut(player)?;
        let report = ConsumeReport {
            hunger_restored: vitals::restore_hunger(p, effect.hunger.saturating_mul(quantity)),
            thirst_restored: vitals::restore_thirst(p, effect.thirst.saturating_mul(quantity)),
        };
        self.settle(store, player)?;

        debug!(player_id = %player, item = %item_id, quantity, ?report, "consumed");
        Ok(report)
    }

    /// Drink `amount` units from the water counter into thirst.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity`, `PlayerNotFound`, or `InsufficientQuantity` when
    /// the counter holds less than `amount`.
    pub fn drink_water(
        &self,
        store: &mut PlayerStore,
        player: PlayerId,
        amount: u32,
    ) -> Result<ConsumeReport, InventoryError> {
        validate_quantity(amount)?;
        let p = store.player_mut(player)?;
        ensure_available(&ItemId::from(WATER_COUNTER), amount, p.water_storage)?;
        p.water_storage = p.water_storage.saturating_sub(amount);
        let thirst_restored = vitals::restore_thirst(p, amount);
        Ok(ConsumeReport {
            hunger_restored: 0,
            thirst_restored,
        })
    }

    /// Equip a carried piece of equipment into its catalog slot.
    ///
    /// Returns whatever the slot held before.
    ///
    /// # Errors
    ///
    /// `PlayerNotFound`, `UnknownItem`, `NotEquipment`, or `ItemNotFound`
    /// when the item is not in the inventory.
    pub fn equip(
        &self,
        store: &mut PlayerStore,
        player: PlayerId,
        item: &ItemId,
    ) -> Result<Option<ItemId>, InventoryError> {
        store.player(player)?;
        if !self.catalog.is_known_item(item) {
            return Err(InventoryError::UnknownItem(item.clone()));
        }
        let equipment = self
            .catalog
            .equipment(item)
            .ok_or_else(|| InventoryError::NotEquipment(item.clone()))?;
        if store.inventory_quantity(player, item) == 0 {
            return Err(InventoryError::ItemNotHeld(item.clone()));
        }
        let slot = equipment.slot;
        let previous = store.player_mut(player)?.equipped.set(slot, Some(item.clone()));
        debug!(player_id = %player, item = %item, ?slot, "equipped");
        Ok(previous)
    }

    /// Clear an equipment slot. The item stays in inventory.
    ///
    /// # Errors
    ///
    /// `PlayerNotFound`, or `SlotEmpty` if nothing was equipped there.
    pub fn unequip(
        &self,
        store: &mut PlayerStore,
        player: PlayerId,
        slot: EquipmentSlot,
    ) -> Result<ItemId, InventoryError> {
        let p = store.player_mut(player)?;
        p.equipped.set(slot, None).ok_or(InventoryError::SlotEmpty(slot))
    }

    /// Recompute weight and clear slots whose item left the inventory.
    fn settle(&self, store: &mut PlayerStore, player: PlayerId) -> Result<(), InventoryError> {
        let vacated: Vec<EquipmentSlot> = {
            let rows = store.inventory(player);
            store
                .player(player)?
                .equipped
                .iter()
                .filter(|(_, id)| !rows.contains_key(*id))
                .map(|(slot, _)| slot)
                .collect()
        };
        let p = store.player_mut(player)?;
        for slot in vacated {
            p.equipped.set(slot, None);
        }
        store.refresh_weight(player, &self.capacity())
    }
}

fn ensure_available(item: &ItemId, requested: u32, available: u32) -> Result<(), InventoryError> {
    if requested > available {
        return Err(InventoryError::InsufficientQuantity {
            item: item.clone(),
            requested,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_catalog::create_starting_catalog;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::PlayerDefaults;

    struct Fixture {
        catalog: Catalog,
        config: InventoryConfig,
        store: PlayerStore,
        player: PlayerId,
    }

    impl Fixture {
        fn new(config: InventoryConfig) -> Self {
            let catalog = create_starting_catalog().unwrap();
            let mut store = PlayerStore::new();
            let player = store
                .create_player(String::from("Ada"), &PlayerDefaults::default(), &catalog, &config)
                .unwrap()
                .id;
            Self {
                catalog,
                config,
                store,
                player,
            }
        }

        fn give(&mut self, item: &str, quantity: u32) -> InventoryItemId {
            let id = ItemId::from(item);
            self.store.add_inventory(self.player, &id, quantity).unwrap();
            let engine = TransferEngine::new(&self.catalog, &self.config);
            self.store.refresh_weight(self.player, &engine.capacity()).unwrap();
            self.store.inventory(self.player).get(&id).unwrap().id
        }

        fn stash(&mut self, item: &str, quantity: u32) -> StorageItemId {
            let id = ItemId::from(item);
            self.store.add_storage(self.player, &id, quantity).unwrap();
            self.store.storage(self.player).get(&id).unwrap().id
        }

        fn total(&self, item: &str) -> u32 {
            let id = ItemId::from(item);
            let inv = self.store.inventory_quantity(self.player, &id);
            let sto = self.store.storage(self.player).get(&id).map_or(0, |r| r.quantity);
            inv + sto
        }
    }

    #[test]
    fn move_to_storage_conserves_quantity() {
        let mut f = Fixture::new(InventoryConfig::default());
        let row = f.give("clay", 5);
        let engine = TransferEngine::new(&f.catalog, &f.config);
        let moved = engine.move_to_storage(&mut f.store, f.player, row, 3).unwrap();
        assert_eq!(moved.quantity, 3);
        assert_eq!(f.total("clay"), 5);
        assert_eq!(f.store.player(f.player).unwrap().inventory_weight, dec!(2.0));
    }

    #[test]
    fn store_then_withdraw_restores_inventory() {
        let mut f = Fixture::new(InventoryConfig::default());
        let row = f.give("clay", 5);
        let clay = ItemId::from("clay");
        let weight_before = f.store.player(f.player).unwrap().inventory_weight;

        let engine = TransferEngine::new(&f.catalog, &f.config);
        engine.move_to_storage(&mut f.store, f.player, row, 3).unwrap();
        let stored = f.store.storage(f.player).get(&clay).unwrap().id;
        engine.withdraw(&mut f.store, f.player, stored, 3).unwrap();

        assert_eq!(f.store.inventory_quantity(f.player, &clay), 5);
        assert!(f.store.storage(f.player).get(&clay).is_none());
        assert_eq!(f.store.player(f.player).unwrap().inventory_weight, weight_before);
        assert_eq!(weight_before, dec!(5.0));
    }

    #[test]
    fn zero_quantity_is_invalid() {
        let mut f = Fixture::new(InventoryConfig::default());
        let row = f.give("clay", 5);
        let engine = TransferEngine::new(&f.catalog, &f.config);
        let err = engine.move_to_storage(&mut f.store, f.player, row, 0).unwrap_err();
        assert_eq!(err.code(), "InvalidQuantity");
    }

    #[test]
    fn withdraw_too_much_fails_and_changes_nothing() {
        let mut f = Fixture::new(InventoryConfig::default());
        let row = f.stash("sticks", 3);
        let engine = TransferEngine::new(&f.catalog, &f.config);
        let err = engine.withdraw(&mut f.store, f.player, row, 4).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::InsufficientQuantity {
                requested: 4,
                available: 3,
                ..
            }
        ));
        assert_eq!(f.store.storage(f.player).get(&ItemId::from("sticks")).unwrap().quantity, 3);
        assert!(f.store.inventory(f.player).is_empty());
    }

    #[test]
    fn withdraw_respects_inventory_weight() {
        let mut f = Fixture::new(InventoryConfig::default());
        f.give("clay", 18);
        let row = f.stash("stone", 1);
        let engine = TransferEngine::new(&f.catalog, &f.config);
        let err = engine.withdraw(&mut f.store, f.player, row, 1).unwrap_err();
        assert_eq!(err.code(), "InventoryCapacityExceeded");
        assert_eq!(f.total("stone"), 1);
    }

    #[test]
    fn storage_cap_is_enforced_when_configured() {
        let mut f = Fixture::new(InventoryConfig {
            inventory_slots: 36,
            storage_hard_cap_kg: Some(dec!(5)),
        });
        let row = f.give("stone", 2);
        let engine = TransferEngine::new(&f.catalog, &f.config);
        engine.move_to_storage(&mut f.store, f.player, row, 1).unwrap();
        let row = f.store.inventory(f.player).get(&ItemId::from("stone")).unwrap().id;
        let err = engine.move_to_storage(&mut f.store, f.player, row, 1).unwrap_err();
        assert_eq!(err.code(), "StorageCapacityExceeded");
        assert_eq!(f.total("stone"), 2);
    }

    #[test]
    fn store_all_is_best_effort_and_keeps_equipment() {
        let mut f = Fixture::new(InventoryConfig {
            inventory_slots: 36,
            storage_hard_cap_kg: Some(dec!(10)),
        });
        f.give("stone_axe", 1);
        f.give("fiber", 10);
        f.give("iron_ore", 3);
        let engine = TransferEngine::new(&f.catalog, &f.config);
        engine.equip(&mut f.store, f.player, &ItemId::from("stone_axe")).unwrap();

        let report = engine.store_all(&mut f.store, f.player).unwrap();
        assert_eq!(report.moved.get(&ItemId::from("fiber")), Some(&10));
        assert_eq!(
            report.failed.get(&ItemId::from("iron_ore")).map(String::as_str),
            Some("StorageCapacityExceeded")
        );
        assert_eq!(f.store.inventory_quantity(f.player, &ItemId::from("stone_axe")), 1);
        assert_eq!(f.store.inventory_quantity(f.player, &ItemId::from("iron_ore")), 3);
    }

    #[test]
    fn consume_restores_capped_vitals() {
        let mut f = Fixture::new(InventoryConfig::default());
        f.store.player_mut(f.player).unwrap().hunger = 90;
        let row = f.give("mushrooms", 4);
        let engine = TransferEngine::new(&f.catalog, &f.config);
        let report = engine.consume(&mut f.store, f.player, row, 3).unwrap();
        assert_eq!(report.hunger_restored, 10);
        assert_eq!(f.store.player(f.player).unwrap().hunger, 100);
        assert_eq!(f.store.inventory_quantity(f.player, &ItemId::from("mushrooms")), 1);
    }

    #[test]
    fn consume_rejects_inedible_items() {
        let mut f = Fixture::new(InventoryConfig::default());
        let row = f.give("clay", 1);
        let engine = TransferEngine::new(&f.catalog, &f.config);
        let err = engine.consume(&mut f.store, f.player, row, 1).unwrap_err();
        assert_eq!(err, InventoryError::ItemNotConsumable(ItemId::from("clay")));
    }

    #[test]
    fn drink_water_moves_counter_into_thirst() {
        let mut f = Fixture::new(InventoryConfig::default());
        {
            let p = f.store.player_mut(f.player).unwrap();
            p.water_storage = 5;
            p.thirst = 90;
        }
        let engine = TransferEngine::new(&f.catalog, &f.config);
        let report = engine.drink_water(&mut f.store, f.player, 4).unwrap();
        assert_eq!(report.thirst_restored, 4);
        let p = f.store.player(f.player).unwrap();
        assert_eq!(p.water_storage, 1);
        assert_eq!(p.thirst, 94);
        assert!(engine.drink_water(&mut f.store, f.player, 2).is_err());
    }

    #[test]
    fn equip_requires_held_equipment() {
        let mut f = Fixture::new(InventoryConfig::default());
        let engine = TransferEngine::new(&f.catalog, &f.config);
        let axe = ItemId::from("stone_axe");
        assert_eq!(
            engine.equip(&mut f.store, f.player, &axe).unwrap_err().code(),
            "ItemNotFound"
        );
        assert_eq!(
            engine
                .equip(&mut f.store, f.player, &ItemId::from("clay"))
                .unwrap_err()
                .code(),
            "NotEquipment"
        );
        f.give("stone_axe", 1);
        let engine = TransferEngine::new(&f.catalog, &f.config);
        assert_eq!(engine.equip(&mut f.store, f.player, &axe).unwrap(), None);
        assert_eq!(f.store.player(f.player).unwrap().equipped.tool, Some(axe.clone()));
        assert_eq!(engine.unequip(&mut f.store, f.player, EquipmentSlot::Tool).unwrap(), axe);
        assert!(engine.unequip(&mut f.store, f.player, EquipmentSlot::Tool).is_err());
    }

    #[test]
    fn storing_last_equipped_unit_clears_slot() {
        let mut f = Fixture::new(InventoryConfig::default());
        let row = f.give("bucket", 1);
        let engine = TransferEngine::new(&f.catalog, &f.config);
        engine.equip(&mut f.store, f.player, &ItemId::from("bucket")).unwrap();
        engine.move_to_storage(&mut f.store, f.player, row, 1).unwrap();
        assert_eq!(f.store.player(f.player).unwrap().equipped.tool, None);
    }
}
