//! In-memory keyed store of players, their inventory, and their storage.
//!
//! Each player owns at most one row per item in inventory and one in
//! storage; rows whose quantity reaches zero are removed. The store is
//! plain data and serializes with serde so the core can snapshot it.

use std::collections::BTreeMap;

use chrono::Utc;
use outpost_catalog::Catalog;
use outpost_types::{
    Equipped, InventoryItem, InventoryItemId, ItemId, Player, PlayerId, StorageItem,
    StorageItemId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::capacity::{CapacityModel, InventoryRows, max_weight_for_level};
use crate::config::{InventoryConfig, PlayerDefaults};
use crate::error::InventoryError;

/// Storage rows of one player, keyed by item.
pub type StorageRows = BTreeMap<ItemId, StorageItem>;

/// Players and their item rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerStore {
    players: BTreeMap<PlayerId, Player>,
    inventory: BTreeMap<PlayerId, InventoryRows>,
    storage: BTreeMap<PlayerId, StorageRows>,
}

impl PlayerStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            players: BTreeMap::new(),
            inventory: BTreeMap::new(),
            storage: BTreeMap::new(),
        }
    }

    /// Create a player with starting stats and starting items.
    ///
    /// Unknown starting items are rejected before anything is inserted.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::UnknownItem`] if a starting item is not in
    /// the catalog.
    pub fn create_player(
        &mut self,
        name: String,
        defaults: &PlayerDefaults,
        catalog: &Catalog,
        config: &InventoryConfig,
    ) -> Result<Player, InventoryError> {
        if let Some(unknown) = defaults
            .starting_items
            .keys()
            .find(|id| !catalog.is_known_item(id))
        {
            return Err(InventoryError::UnknownItem(unknown.clone()));
        }

        let id = PlayerId::new();
        let rows: InventoryRows = defaults
            .starting_items
            .iter()
            .filter(|(_, quantity)| **quantity > 0)
            .map(|(item, quantity)| {
                let row = InventoryItem {
                    id: InventoryItemId::new(),
                    player_id: id,
                    item_id: item.clone(),
                    quantity: *quantity,
                };
                (item.clone(), row)
            })
            .collect();

        let level = defaults.level.max(1);
        let player = Player {
            id,
            name,
            level,
            experience: 0,
            hunger: defaults.max_hunger,
            max_hunger: defaults.max_hunger,
            thirst: defaults.max_thirst,
            max_thirst: defaults.max_thirst,
            health: defaults.max_health,
            max_health: defaults.max_health,
            coins: defaults.coins,
            inventory_weight: CapacityModel::new(catalog, config).rows_weight(&rows),
            max_inventory_weight: max_weight_for_level(level),
            water_storage: 0,
            max_water_storage: defaults.max_water_storage,
            equipped: Equipped::default(),
            auto_storage: defaults.auto_storage,
            created_at: Utc::now(),
        };

        // Fully built before anything is stored.
        self.players.insert(id, player.clone());
        if !rows.is_empty() {
            self.inventory.insert(id, rows);
        }

        info!(player_id = %id, "player created");
        Ok(player)
    }

    /// Look up a player.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::PlayerNotFound`] if the id is unknown.
    pub fn player(&self, id: PlayerId) -> Result<&Player, InventoryError> {
        self.players.get(&id).ok_or(InventoryError::PlayerNotFound(id))
    }

    /// Look up a player for mutation.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::PlayerNotFound`] if the id is unknown.
    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, InventoryError> {
        self.players
            .get_mut(&id)
            .ok_or(InventoryError::PlayerNotFound(id))
    }

    /// Whether a player exists.
    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    /// All players, ordered by id.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// The player's inventory rows (empty if none).
    pub fn inventory(&self, id: PlayerId) -> &InventoryRows {
        static EMPTY: InventoryRows = BTreeMap::new();
        self.inventory.get(&id).unwrap_or(&EMPTY)
    }

    /// The player's storage rows (empty if none).
    pub fn storage(&self, id: PlayerId) -> &StorageRows {
        static EMPTY: StorageRows = BTreeMap::new();
        self.storage.get(&id).unwrap_or(&EMPTY)
    }

    /// Inventory rows as a list, ordered by item id.
    pub fn inventory_items(&self, id: PlayerId) -> Vec<InventoryItem> {
        self.inventory(id).values().cloned().collect()
    }

    /// Storage rows as a list, ordered by item id.
    pub fn storage_items(&self, id: PlayerId) -> Vec<StorageItem> {
        self.storage(id).values().cloned().collect()
    }

    /// Find an inventory row by its row id.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InventoryItemNotFound`] if the player has no
    /// such row.
    pub fn inventory_row(
        &self,
        player: PlayerId,
        row: InventoryItemId,
    ) -> Result<&InventoryItem, InventoryError> {
        self.inventory(player)
            .values()
            .find(|item| item.id == row)
            .ok_or(InventoryError::InventoryItemNotFound(row))
    }

    /// Find a storage row by its row id.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::StorageItemNotFound`] if the player has no
    /// such row.
    pub fn storage_row(
        &self,
        player: PlayerId,
        row: StorageItemId,
    ) -> Result<&StorageItem, InventoryError> {
        self.storage(player)
            .values()
            .find(|item| item.id == row)
            .ok_or(InventoryError::StorageItemNotFound(row))
    }

    /// Quantity of `item` in the player's inventory.
    pub fn inventory_quantity(&self, player: PlayerId, item: &ItemId) -> u32 {
        self.inventory(player).get(item).map_or(0, |row| row.quantity)
    }

    /// Add `quantity` of `item` to the player's inventory, merging stacks.
    ///
    /// No capacity check; callers validate with [`CapacityModel`] first.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::ArithmeticOverflow`] if the stack would
    /// overflow `u32`.
    pub fn add_inventory(
        &mut self,
        player: PlayerId,
        item: &ItemId,
        quantity: u32,
    ) -> Result<(), InventoryError> {
        if quantity == 0 {
            return Ok(());
        }
        let rows = self.inventory.entry(player).or_default();
        let row = rows.entry(item.clone()).or_insert_with(|| InventoryItem {
            id: InventoryItemId::new(),
            player_id: player,
            item_id: item.clone(),
            quantity: 0,
        });
        row.quantity = row
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| InventoryError::ArithmeticOverflow {
                context: format!("inventory stack overflow for {item}"),
            })?;
        Ok(())
    }

    /// Remove `quantity` of `item` from inventory, deleting the row at zero.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InsufficientQuantity`] if the row holds less.
    pub fn remove_inventory(
        &mut self,
        player: PlayerId,
        item: &ItemId,
        quantity: u32,
    ) -> Result<(), InventoryError> {
        let rows = self.inventory.entry(player).or_default();
        let available = rows.get(item).map_or(0, |row| row.quantity);
        let remaining =
            available
                .checked_sub(quantity)
                .ok_or_else(|| InventoryError::InsufficientQuantity {
                    item: item.clone(),
                    requested: quantity,
                    available,
                })?;
        if remaining == 0 {
            rows.remove(item);
        } else if let Some(row) = rows.get_mut(item) {
            row.quantity = remaining;
        }
        Ok(())
    }

    /// Add `quantity` of `item` to the player's storage, merging stacks.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::ArithmeticOverflow`] if the stack would
    /// overflow `u32`.
    pub fn add_storage(
        &mut self,
        player: PlayerId,
        item: &ItemId,
        quantity: u32,
    ) -> Result<(), InventoryError> {
        if quantity == 0 {
            return Ok(());
        }
        let rows = self.storage.entry(player).or_default();
        let row = rows.entry(item.clone()).or_insert_with(|| StorageItem {
            id: StorageItemId::new(),
            player_id: player,
            item_id: item.clone(),
            quantity: 0,
        });
        row.quantity = row
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| InventoryError::ArithmeticOverflow {
                context: format!("storage stack overflow for {item}"),
            })?;
        Ok(())
    }

    /// Remove `quantity` of `item` from storage, deleting the row at zero.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InsufficientQuantity`] if the row holds less.
    pub fn remove_storage(
        &mut self,
        player: PlayerId,
        item: &ItemId,
        quantity: u32,
    ) -> Result<(), InventoryError> {
        let rows = self.storage.entry(player).or_default();
        let available = rows.get(item).map_or(0, |row| row.quantity);
        let remaining =
            available
                .checked_sub(quantity)
                .ok_or_else(|| InventoryError::InsufficientQuantity {
                    item: item.clone(),
                    requested: quantity,
                    available,
                })?;
        if remaining == 0 {
            rows.remove(item);
        } else if let Some(row) = rows.get_mut(item) {
            row.quantity = remaining;
        }
        Ok(())
    }

    /// Recompute `inventory_weight` and `max_inventory_weight` from rows and
    /// level.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::PlayerNotFound`] if the id is unknown.
    pub fn refresh_weight(
        &mut self,
        player: PlayerId,
        capacity: &CapacityModel<'_>,
    ) -> Result<(), InventoryError> {
        let weight = capacity.rows_weight(self.inventory(player));
        let p = self.player_mut(player)?;
        p.inventory_weight = weight;
        p.max_inventory_weight = max_weight_for_level(p.level);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_catalog::create_starting_catalog;
    use rust_decimal_macros::dec;

    use super::*;

    fn store_with_player() -> (PlayerStore, PlayerId) {
        let catalog = create_starting_catalog().unwrap();
        let mut store = PlayerStore::new();
        let player = store
            .create_player(
                String::from("Ada"),
                &PlayerDefaults::default(),
                &catalog,
                &InventoryConfig::default(),
            )
            .unwrap();
        (store, player.id)
    }

    #[test]
    fn new_player_starts_full_at_level_one() {
        let (store, id) = store_with_player();
        let p = store.player(id).unwrap();
        assert_eq!(p.level, 1);
        assert_eq!(p.hunger, p.max_hunger);
        assert_eq!(p.thirst, p.max_thirst);
        assert_eq!(p.max_inventory_weight, dec!(20));
        assert!(store.inventory(id).is_empty());
    }

    #[test]
    fn starting_items_are_weighed() {
        let catalog = create_starting_catalog().unwrap();
        let mut defaults = PlayerDefaults::default();
        defaults.starting_items.insert(ItemId::from("stone_axe"), 1);
        defaults.starting_items.insert(ItemId::from("berries"), 5);
        let mut store = PlayerStore::new();
        let p = store
            .create_player(String::from("Bo"), &defaults, &catalog, &InventoryConfig::default())
            .unwrap();
        assert_eq!(p.inventory_weight, dec!(2.0));
        assert_eq!(store.inventory_quantity(p.id, &ItemId::from("berries")), 5);
    }

    #[test]
    fn unknown_starting_item_is_rejected() {
        let catalog = create_starting_catalog().unwrap();
        let mut defaults = PlayerDefaults::default();
        defaults.starting_items.insert(ItemId::from("unobtainium"), 1);
        let mut store = PlayerStore::new();
        let result =
            store.create_player(String::from("Cy"), &defaults, &catalog, &InventoryConfig::default());
        assert!(matches!(result, Err(InventoryError::UnknownItem(_))));
        assert_eq!(store.players().count(), 0);
    }

    #[test]
    fn created_player_matches_stored_record() {
        let catalog = create_starting_catalog().unwrap();
        let mut defaults = PlayerDefaults::default();
        defaults.starting_items.insert(ItemId::from("stone"), 2);
        defaults.starting_items.insert(ItemId::from("fiber"), 0);
        let mut store = PlayerStore::new();
        let p = store
            .create_player(String::from("Di"), &defaults, &catalog, &InventoryConfig::default())
            .unwrap();
        assert_eq!(store.player(p.id).unwrap(), &p);
        assert_eq!(p.inventory_weight, dec!(6.0));
        assert_eq!(store.inventory(p.id).len(), 1);
        assert_eq!(store.inventory_quantity(p.id, &ItemId::from("fiber")), 0);
        let row = store.inventory(p.id).get(&ItemId::from("stone")).unwrap();
        assert_eq!(row.player_id, p.id);
    }

    #[test]
    fn stacks_merge_and_rows_vanish_at_zero() {
        let (mut store, id) = store_with_player();
        let fiber = ItemId::from("fiber");
        store.add_inventory(id, &fiber, 3).unwrap();
        let row_id = store.inventory(id).get(&fiber).unwrap().id;
        store.add_inventory(id, &fiber, 2).unwrap();
        assert_eq!(store.inventory(id).len(), 1);
        assert_eq!(store.inventory_row(id, row_id).unwrap().quantity, 5);

        store.remove_inventory(id, &fiber, 5).unwrap();
        assert!(store.inventory(id).is_empty());
        assert!(matches!(
            store.inventory_row(id, row_id),
            Err(InventoryError::InventoryItemNotFound(_))
        ));
    }

    #[test]
    fn removing_too_much_fails_without_mutation() {
        let (mut store, id) = store_with_player();
        let clay = ItemId::from("clay");
        store.add_storage(id, &clay, 2).unwrap();
        let err = store.remove_storage(id, &clay, 3).unwrap_err();
        assert_eq!(
            err,
            InventoryError::InsufficientQuantity {
                item: clay.clone(),
                requested: 3,
                available: 2,
            }
        );
        assert_eq!(store.storage(id).get(&clay).unwrap().quantity, 2);
    }

    #[test]
    fn store_round_trips_through_json() {
        let (mut store, id) = store_with_player();
        store.add_inventory(id, &ItemId::from("sticks"), 4).unwrap();
        let json = serde_json::to_string(&store).unwrap();
        let restored: PlayerStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.inventory_quantity(id, &ItemId::from("sticks")), 4);
        assert_eq!(restored.player(id).unwrap().name, "Ada");
    }
}
