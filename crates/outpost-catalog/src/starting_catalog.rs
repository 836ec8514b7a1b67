//! Default content seeded at startup.
//!
//! Four biomes of increasing level requirement, the resources found in them,
//! and the tools, weapons, and armor players equip. Weights are kilograms per
//! unit; `distance_from_camp` is the expedition progress (0--100) at which a
//! resource starts turning up.

use std::collections::BTreeMap;

use outpost_types::{
    Biome, BiomeId, ConsumableEffect, Equipment, EquipmentSlot, ItemId, Rarity, Resource,
    ResourceCategory, ResourceKind, ToolType,
};
use rust_decimal::Decimal;

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::gating::GatingTable;

/// Compact resource description used by [`res`].
struct Seed<'a> {
    id: &'a str,
    name: &'a str,
    emoji: &'a str,
    /// Weight in tenths of a kilogram.
    weight_dg: i64,
    value: u32,
    rarity: Rarity,
    category: ResourceCategory,
    xp: u32,
    distance: u32,
}

/// Helper to build a [`Resource`]. Basic-category resources are basic kind.
fn res(seed: &Seed<'_>, consumable: Option<ConsumableEffect>) -> Resource {
    let kind = if seed.category == ResourceCategory::Basic {
        ResourceKind::Basic
    } else {
        ResourceKind::Unique
    };
    Resource {
        id: ItemId::from(seed.id),
        name: seed.name.to_owned(),
        emoji: seed.emoji.to_owned(),
        weight: Decimal::new(seed.weight_dg, 1),
        value: seed.value,
        rarity: seed.rarity,
        kind,
        category: seed.category,
        required_tool: None,
        experience_value: seed.xp,
        distance_from_camp: seed.distance,
        consumable,
    }
}

/// Helper to build an [`Equipment`] piece.
#[allow(clippy::too_many_arguments)]
fn gear(
    id: &str,
    name: &str,
    emoji: &str,
    effect: &str,
    slot: EquipmentSlot,
    tool_type: Option<ToolType>,
    weight_dg: i64,
    bonuses: &[(&str, i32)],
) -> Equipment {
    Equipment {
        id: ItemId::from(id),
        name: name.to_owned(),
        emoji: emoji.to_owned(),
        effect: effect.to_owned(),
        bonuses: bonuses
            .iter()
            .map(|(k, v)| ((*k).to_owned(), *v))
            .collect::<BTreeMap<_, _>>(),
        slot,
        tool_type,
        weight: Decimal::new(weight_dg, 1),
    }
}

/// Helper to build a [`Biome`].
fn biome(id: &str, name: &str, emoji: &str, required_level: u32, resources: &[&str]) -> Biome {
    Biome {
        id: BiomeId::from(id),
        name: name.to_owned(),
        emoji: emoji.to_owned(),
        required_level,
        available_resources: resources.iter().map(|r| ItemId::from(*r)).collect(),
    }
}

const fn food(hunger: u32, thirst: u32) -> Option<ConsumableEffect> {
    Some(ConsumableEffect { hunger, thirst })
}

fn starting_resources() -> Vec<Resource> {
    use Rarity::{Common, Rare, Uncommon};
    use ResourceCategory::{Animal, Basic, Crystal, Fish, Ore, Stone, Water, Wood};

    #[rustfmt::skip]
    let table: [(Seed<'static>, Option<ConsumableEffect>); 20] = [
        // --- Basics: no tool ---
        (Seed { id: "fiber", name: "Fiber", emoji: "🌾", weight_dg: 1, value: 1, rarity: Common, category: Basic, xp: 1, distance: 0 }, None),
        (Seed { id: "small_stones", name: "Small Stones", emoji: "🪨", weight_dg: 5, value: 1, rarity: Common, category: Basic, xp: 1, distance: 0 }, None),
        (Seed { id: "sticks", name: "Sticks", emoji: "🥢", weight_dg: 3, value: 1, rarity: Common, category: Basic, xp: 1, distance: 0 }, None),
        (Seed { id: "mushrooms", name: "Mushrooms", emoji: "🍄", weight_dg: 2, value: 2, rarity: Common, category: Basic, xp: 2, distance: 10 }, food(5, 0)),
        (Seed { id: "berries", name: "Berries", emoji: "🫐", weight_dg: 1, value: 2, rarity: Common, category: Basic, xp: 1, distance: 0 }, food(3, 1)),
        (Seed { id: "shells", name: "Shells", emoji: "🐚", weight_dg: 2, value: 3, rarity: Uncommon, category: Basic, xp: 2, distance: 10 }, None),
        (Seed { id: "clay", name: "Clay", emoji: "🟫", weight_dg: 10, value: 2, rarity: Common, category: Basic, xp: 2, distance: 20 }, None),
        // --- Wood: axe ---
        (Seed { id: "oak_wood", name: "Oak Wood", emoji: "🪵", weight_dg: 20, value: 4, rarity: Common, category: Wood, xp: 3, distance: 10 }, None),
        (Seed { id: "birch_wood", name: "Birch Wood", emoji: "🌳", weight_dg: 15, value: 4, rarity: Common, category: Wood, xp: 3, distance: 20 }, None),
        (Seed { id: "bamboo", name: "Bamboo", emoji: "🎋", weight_dg: 10, value: 3, rarity: Uncommon, category: Wood, xp: 3, distance: 30 }, None),
        // --- Stone, ore, crystal: pickaxe ---
        (Seed { id: "stone", name: "Stone", emoji: "⛰️", weight_dg: 30, value: 3, rarity: Common, category: Stone, xp: 3, distance: 10 }, None),
        (Seed { id: "iron_ore", name: "Iron Ore", emoji: "🔩", weight_dg: 40, value: 10, rarity: Uncommon, category: Ore, xp: 6, distance: 40 }, None),
        (Seed { id: "copper_ore", name: "Copper Ore", emoji: "🟠", weight_dg: 40, value: 8, rarity: Uncommon, category: Ore, xp: 5, distance: 30 }, None),
        (Seed { id: "crystal", name: "Crystal", emoji: "💎", weight_dg: 5, value: 40, rarity: Rare, category: Crystal, xp: 15, distance: 70 }, None),
        // --- Water: bucket or bamboo bottle ---
        (Seed { id: "fresh_water", name: "Fresh Water", emoji: "💧", weight_dg: 10, value: 1, rarity: Common, category: Water, xp: 1, distance: 0 }, food(0, 10)),
        // --- Fish: fishing rod ---
        (Seed { id: "salmon", name: "Salmon", emoji: "🐟", weight_dg: 15, value: 8, rarity: Uncommon, category: Fish, xp: 5, distance: 20 }, food(15, 0)),
        (Seed { id: "trout", name: "Trout", emoji: "🐠", weight_dg: 10, value: 6, rarity: Common, category: Fish, xp: 4, distance: 10 }, food(10, 0)),
        // --- Animals: weapon + knife ---
        (Seed { id: "rabbit", name: "Rabbit", emoji: "🐇", weight_dg: 20, value: 8, rarity: Common, category: Animal, xp: 6, distance: 30 }, food(20, 0)),
        (Seed { id: "deer", name: "Deer", emoji: "🦌", weight_dg: 150, value: 30, rarity: Uncommon, category: Animal, xp: 15, distance: 50 }, food(40, 0)),
        (Seed { id: "boar", name: "Boar", emoji: "🐗", weight_dg: 100, value: 25, rarity: Rare, category: Animal, xp: 20, distance: 60 }, food(35, 0)),
    ];

    table
        .iter()
        .map(|(seed, consumable)| res(seed, *consumable))
        .collect()
}

fn starting_equipment() -> Vec<Equipment> {
    use EquipmentSlot::{Boots, Chestplate, Helmet, Leggings, Tool, Weapon};

    vec![
        gear("stone_axe", "Stone Axe", "🪓", "Fells trees", Tool, Some(ToolType::Axe), 15, &[("gather_wood", 10)]),
        gear("stone_pickaxe", "Stone Pickaxe", "⛏️", "Breaks stone and ore", Tool, Some(ToolType::Pickaxe), 20, &[("gather_stone", 10)]),
        gear("fishing_rod", "Fishing Rod", "🎣", "Catches fish", Tool, Some(ToolType::FishingRod), 10, &[]),
        gear("flint_knife", "Flint Knife", "🔪", "Skins game", Tool, Some(ToolType::Knife), 3, &[]),
        gear("bucket", "Bucket", "🪣", "Carries water", Tool, Some(ToolType::Bucket), 10, &[]),
        gear("bamboo_bottle", "Bamboo Bottle", "🎍", "Carries water", Tool, Some(ToolType::BambooBottle), 3, &[]),
        gear("wooden_spear", "Wooden Spear", "🗡️", "Hunts game", Weapon, None, 15, &[("attack", 5)]),
        gear("hunting_knife", "Hunting Knife", "🔪", "Hunts and skins game", Weapon, Some(ToolType::Knife), 5, &[("attack", 3)]),
        gear("leather_helmet", "Leather Helmet", "🪖", "Light head armor", Helmet, None, 10, &[("defense", 2)]),
        gear("leather_chestplate", "Leather Chestplate", "🦺", "Light body armor", Chestplate, None, 30, &[("defense", 4)]),
        gear("leather_leggings", "Leather Leggings", "👖", "Light leg armor", Leggings, None, 20, &[("defense", 3)]),
        gear("leather_boots", "Leather Boots", "🥾", "Light foot armor", Boots, None, 10, &[("defense", 1), ("speed", 5)]),
    ]
}

fn starting_biomes() -> Vec<Biome> {
    vec![
        biome(
            "forest",
            "Forest",
            "🌲",
            1,
            &["fiber", "sticks", "mushrooms", "berries", "oak_wood", "birch_wood", "fresh_water", "rabbit"],
        ),
        biome(
            "lakeside",
            "Lakeside",
            "🏞️",
            1,
            &["fiber", "small_stones", "shells", "clay", "bamboo", "fresh_water", "trout", "salmon"],
        ),
        biome(
            "mountains",
            "Mountains",
            "🏔️",
            6,
            &["small_stones", "stone", "copper_ore", "iron_ore", "crystal", "fresh_water"],
        ),
        biome(
            "deep_woods",
            "Deep Woods",
            "🌳",
            11,
            &["mushrooms", "oak_wood", "birch_wood", "rabbit", "deer", "boar"],
        ),
    ]
}

/// Build the default catalog with the standard gating table.
///
/// # Errors
///
/// Returns [`CatalogError`] if the seed content is inconsistent (duplicate
/// ids or biomes naming unknown resources).
pub fn create_starting_catalog() -> Result<Catalog, CatalogError> {
    let mut catalog = Catalog::new(GatingTable::default());
    for resource in starting_resources() {
        catalog.add_resource(resource)?;
    }
    for equipment in starting_equipment() {
        catalog.add_equipment(equipment)?;
    }
    for biome in starting_biomes() {
        catalog.add_biome(biome)?;
    }
    Ok(catalog)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn starting_catalog_is_consistent() {
        let catalog = create_starting_catalog().unwrap();
        assert_eq!(catalog.resources().count(), 20);
        assert_eq!(catalog.all_equipment().count(), 12);
        assert_eq!(catalog.biomes().count(), 4);
    }

    #[test]
    fn basics_are_basic_kind() {
        let catalog = create_starting_catalog().unwrap();
        let fiber = catalog.resource(&ItemId::from("fiber")).unwrap();
        assert_eq!(fiber.kind, ResourceKind::Basic);
        let wood = catalog.resource(&ItemId::from("oak_wood")).unwrap();
        assert_eq!(wood.kind, ResourceKind::Unique);
    }

    #[test]
    fn level_gates_increase() {
        let catalog = create_starting_catalog().unwrap();
        let forest = catalog.biome(&BiomeId::from("forest")).unwrap();
        let mountains = catalog.biome(&BiomeId::from("mountains")).unwrap();
        assert_eq!(forest.required_level, 1);
        assert!(mountains.required_level > forest.required_level);
    }

    #[test]
    fn catalog_serializes_for_clients() {
        let catalog = create_starting_catalog().unwrap();
        let json = serde_json::to_value(&catalog).unwrap();
        assert!(json["resources"]["fresh_water"].is_object());
        assert_eq!(json["gating"]["rules"]["fish"]["requires"], "any_tool");
    }
}
