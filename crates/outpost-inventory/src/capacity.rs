//! Weight and slot capacity of a player's inventory.
//!
//! Carried weight is the sum of `quantity * unit weight` over every row,
//! resources and equipment alike. The weight ceiling depends only on level:
//!
//! | Level | Max weight |
//! |-------|-----------:|
//! | 1--5  | 20 kg |
//! | 6--10 | 30 kg |
//! | 11--15 | 40 kg |
//! | ... | +10 kg every 5 levels |
//! | 41+   | 100 kg (cap) |
//!
//! Slots count distinct stacks; adding to an existing stack is free.
//! Nothing here fails: every query returns a plain value.

use std::collections::BTreeMap;

use outpost_catalog::Catalog;
use outpost_types::{CapacityConstraints, InventoryItem, ItemId, Player};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::config::InventoryConfig;

/// Weight ceiling at levels 1 through 5, in kilograms.
pub const BASE_MAX_WEIGHT_KG: u32 = 20;

/// Extra kilograms granted at each breakpoint.
pub const WEIGHT_STEP_KG: u32 = 10;

/// Levels between breakpoints.
pub const LEVELS_PER_STEP: u32 = 5;

/// Absolute weight ceiling in kilograms.
pub const MAX_WEIGHT_CAP_KG: u32 = 100;

/// Inventory rows of one player, keyed by item so each item has one stack.
pub type InventoryRows = BTreeMap<ItemId, InventoryItem>;

/// Weight ceiling for a player level. Level 0 is treated as level 1.
pub fn max_weight_for_level(level: u32) -> Decimal {
    let steps = level
        .max(1)
        .saturating_sub(1)
        .checked_div(LEVELS_PER_STEP)
        .unwrap_or(0);
    let kg = BASE_MAX_WEIGHT_KG
        .saturating_add(steps.saturating_mul(WEIGHT_STEP_KG))
        .min(MAX_WEIGHT_CAP_KG);
    Decimal::from(kg)
}

/// Pure capacity calculations against a catalog and slot limit.
#[derive(Debug, Clone, Copy)]
pub struct CapacityModel<'a> {
    catalog: &'a Catalog,
    max_slots: u32,
}

impl<'a> CapacityModel<'a> {
    /// Create a model reading item weights from `catalog`.
    pub const fn new(catalog: &'a Catalog, config: &InventoryConfig) -> Self {
        Self {
            catalog,
            max_slots: config.inventory_slots,
        }
    }

    /// Slot ceiling.
    pub const fn max_slots(&self) -> u32 {
        self.max_slots
    }

    /// Sum of `quantity * weight` over `(item, quantity)` pairs.
    ///
    /// Unknown items weigh nothing (and are logged by the catalog).
    pub fn compute_weight<'i, I>(&self, items: I) -> Decimal
    where
        I: IntoIterator<Item = (&'i ItemId, u32)>,
    {
        items.into_iter().fold(Decimal::ZERO, |acc, (id, quantity)| {
            let unit = self.catalog.item_weight_or_zero(id);
            acc.saturating_add(unit.saturating_mul(Decimal::from(quantity)))
        })
    }

    /// Carried weight of a set of inventory rows.
    pub fn rows_weight(&self, rows: &InventoryRows) -> Decimal {
        self.compute_weight(rows.values().map(|row| (&row.item_id, row.quantity)))
    }

    /// Weight and slot usage for display and validation.
    pub fn constraints(&self, rows: &InventoryRows, player: &Player) -> CapacityConstraints {
        let current_weight = self.rows_weight(rows);
        let max_weight = max_weight_for_level(player.level);
        let percentage = current_weight
            .saturating_mul(Decimal::ONE_HUNDRED)
            .checked_div(max_weight)
            .unwrap_or(Decimal::ZERO)
            .round_dp(2);
        let display_percentage = percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);

        CapacityConstraints {
            current_weight,
            max_weight,
            current_slots: slot_count(rows),
            max_slots: self.max_slots,
            percentage,
            display_percentage,
        }
    }

    /// Whether `quantity` more of `item` fits by both weight and slots.
    pub fn can_add(&self, rows: &InventoryRows, item: &ItemId, quantity: u32, player: &Player) -> bool {
        if quantity == 0 {
            return true;
        }
        if !self.has_slot_for(rows, item) {
            return false;
        }
        let added = self
            .catalog
            .item_weight_or_zero(item)
            .saturating_mul(Decimal::from(quantity));
        self.rows_weight(rows).saturating_add(added) <= max_weight_for_level(player.level)
    }

    /// Largest quantity of `item` that still fits.
    ///
    /// Weightless items are limited only by slots and report `u32::MAX`.
    pub fn max_fit(&self, rows: &InventoryRows, item: &ItemId, player: &Player) -> u32 {
        if !self.has_slot_for(rows, item) {
            return 0;
        }
        let remaining = max_weight_for_level(player.level).saturating_sub(self.rows_weight(rows));
        if remaining <= Decimal::ZERO {
            return 0;
        }
        let unit = self.catalog.item_weight_or_zero(item);
        if unit.is_zero() {
            return u32::MAX;
        }
        remaining
            .checked_div(unit)
            .map(|units| units.floor())
            .and_then(|units| units.to_u32())
            .unwrap_or(u32::MAX)
    }

    fn has_slot_for(&self, rows: &InventoryRows, item: &ItemId) -> bool {
        rows.contains_key(item) || slot_count(rows) < self.max_slots
    }
}

fn slot_count(rows: &InventoryRows) -> u32 {
    u32::try_from(rows.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use outpost_catalog::create_starting_catalog;
    use outpost_types::{Equipped, InventoryItemId, PlayerId};
    use rust_decimal_macros::dec;

    use super::*;

    fn player(level: u32) -> Player {
        Player {
            id: PlayerId::new(),
            name: String::from("Tester"),
            level,
            experience: 0,
            hunger: 100,
            max_hunger: 100,
            thirst: 100,
            max_thirst: 100,
            health: 100,
            max_health: 100,
            coins: 0,
            inventory_weight: Decimal::ZERO,
            max_inventory_weight: max_weight_for_level(level),
            water_storage: 0,
            max_water_storage: 20,
            equipped: Equipped::default(),
            auto_storage: false,
            created_at: Utc::now(),
        }
    }

    fn rows(player: &Player, items: &[(&str, u32)]) -> InventoryRows {
        items
            .iter()
            .map(|(id, quantity)| {
                let item_id = ItemId::from(*id);
                let row = InventoryItem {
                    id: InventoryItemId::new(),
                    player_id: player.id,
                    item_id: item_id.clone(),
                    quantity: *quantity,
                };
                (item_id, row)
            })
            .collect()
    }

    #[test]
    fn level_breakpoints() {
        assert_eq!(max_weight_for_level(0), dec!(20));
        assert_eq!(max_weight_for_level(1), dec!(20));
        assert_eq!(max_weight_for_level(5), dec!(20));
        assert_eq!(max_weight_for_level(6), dec!(30));
        assert_eq!(max_weight_for_level(11), dec!(40));
        assert_eq!(max_weight_for_level(16), dec!(50));
        assert_eq!(max_weight_for_level(41), dec!(100));
        assert_eq!(max_weight_for_level(100), dec!(100));
        assert_eq!(max_weight_for_level(u32::MAX), dec!(100));
    }

    #[test]
    fn weight_counts_resources_and_equipment() {
        let catalog = create_starting_catalog().unwrap();
        let model = CapacityModel::new(&catalog, &InventoryConfig::default());
        let p = player(1);
        // 10 x 0.1 fiber + 2 x 3.0 stone + 1 x 1.5 axe
        let inv = rows(&p, &[("fiber", 10), ("stone", 2), ("stone_axe", 1)]);
        assert_eq!(model.rows_weight(&inv), dec!(8.5));
    }

    #[test]
    fn percentage_is_unclamped_but_display_is() {
        let catalog = create_starting_catalog().unwrap();
        let model = CapacityModel::new(&catalog, &InventoryConfig::default());
        let p = player(1);
        let inv = rows(&p, &[("clay", 25)]);
        let c = model.constraints(&inv, &p);
        assert_eq!(c.current_weight, dec!(25));
        assert_eq!(c.max_weight, dec!(20));
        assert_eq!(c.percentage, dec!(125));
        assert_eq!(c.display_percentage, dec!(100));
        assert_eq!(c.current_slots, 1);
        assert_eq!(c.max_slots, 36);
    }

    #[test]
    fn can_add_respects_weight() {
        let catalog = create_starting_catalog().unwrap();
        let model = CapacityModel::new(&catalog, &InventoryConfig::default());
        let p = player(1);
        let inv = rows(&p, &[("clay", 18)]);
        let clay = ItemId::from("clay");
        assert!(model.can_add(&inv, &clay, 2, &p));
        assert!(!model.can_add(&inv, &clay, 3, &p));
        assert_eq!(model.max_fit(&inv, &clay, &p), 2);
    }

    #[test]
    fn existing_stack_needs_no_new_slot() {
        let catalog = create_starting_catalog().unwrap();
        let config = InventoryConfig {
            inventory_slots: 2,
            storage_hard_cap_kg: None,
        };
        let model = CapacityModel::new(&catalog, &config);
        let p = player(1);
        let inv = rows(&p, &[("fiber", 1), ("sticks", 1)]);
        assert!(model.can_add(&inv, &ItemId::from("fiber"), 5, &p));
        assert!(!model.can_add(&inv, &ItemId::from("berries"), 1, &p));
        assert_eq!(model.max_fit(&inv, &ItemId::from("berries"), &p), 0);
    }

    #[test]
    fn max_fit_on_empty_inventory() {
        let catalog = create_starting_catalog().unwrap();
        let model = CapacityModel::new(&catalog, &InventoryConfig::default());
        let p = player(6);
        let inv = InventoryRows::new();
        // 30 kg / 4.0 kg iron ore
        assert_eq!(model.max_fit(&inv, &ItemId::from("iron_ore"), &p), 7);
    }
}
