//! Tool and weapon gating for resource collection.
//!
//! Which equipment a resource needs is data, not code: the catalog carries a
//! [`GatingTable`] mapping each [`ResourceCategory`] to a
//! [`GatherRequirement`]. A resource may also name an explicit
//! `required_tool`, which overrides its category entry.
//!
//! Rules, in order:
//!
//! 1. Basic resources are always collectible.
//! 2. An explicit `required_tool` must be equipped in the tool or weapon slot.
//! 3. Otherwise the category's table entry applies.
//! 4. A category without an entry is collectible (permissive fallback).
//!
//! [`can_collect`] is pure: it reads the player's equipped slots and the
//! catalog and nothing else.

use std::collections::BTreeMap;

use outpost_types::{Player, Resource, ResourceCategory, ResourceKind, ToolType};
use serde::Serialize;

use crate::catalog::Catalog;

/// What a player must have equipped to collect a resource category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "requires", rename_all = "snake_case")]
pub enum GatherRequirement {
    /// No equipment needed.
    Nothing,
    /// One of these tool types in the tool slot.
    AnyTool {
        /// Acceptable tool types.
        tools: Vec<ToolType>,
    },
    /// Any weapon equipped, and `tool` in either the tool or weapon slot.
    WeaponAndTool {
        /// Tool type required alongside the weapon.
        tool: ToolType,
    },
}

/// Declarative mapping from resource category to gathering requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatingTable {
    rules: BTreeMap<ResourceCategory, GatherRequirement>,
}

impl GatingTable {
    /// An empty table: every category falls back to collectible.
    pub const fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Set the requirement for a category, replacing any previous entry.
    pub fn set(&mut self, category: ResourceCategory, requirement: GatherRequirement) {
        self.rules.insert(category, requirement);
    }

    /// Look up the requirement for a category.
    pub fn requirement(&self, category: ResourceCategory) -> Option<&GatherRequirement> {
        self.rules.get(&category)
    }
}

impl Default for GatingTable {
    /// The standard rule set: axes for wood, pickaxes for stone, ore, and
    /// crystal, a bucket or bamboo bottle for water, a rod for fish, and a
    /// weapon plus knife for animals.
    fn default() -> Self {
        let mut table = Self::empty();
        table.set(ResourceCategory::Basic, GatherRequirement::Nothing);
        table.set(
            ResourceCategory::Wood,
            GatherRequirement::AnyTool {
                tools: vec![ToolType::Axe],
            },
        );
        for category in [
            ResourceCategory::Stone,
            ResourceCategory::Ore,
            ResourceCategory::Crystal,
        ] {
            table.set(
                category,
                GatherRequirement::AnyTool {
                    tools: vec![ToolType::Pickaxe],
                },
            );
        }
        table.set(
            ResourceCategory::Water,
            GatherRequirement::AnyTool {
                tools: vec![ToolType::Bucket, ToolType::BambooBottle],
            },
        );
        table.set(
            ResourceCategory::Fish,
            GatherRequirement::AnyTool {
                tools: vec![ToolType::FishingRod],
            },
        );
        table.set(
            ResourceCategory::Animal,
            GatherRequirement::WeaponAndTool {
                tool: ToolType::Knife,
            },
        );
        table
    }
}

/// Tool capabilities provided by a player's tool and weapon slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Loadout {
    tool: Option<ToolType>,
    weapon: Option<ToolType>,
    has_weapon: bool,
}

fn loadout(player: &Player, catalog: &Catalog) -> Loadout {
    let tool = player
        .equipped
        .tool
        .as_ref()
        .and_then(|id| catalog.equipment(id))
        .and_then(|e| e.tool_type);
    let weapon = player
        .equipped
        .weapon
        .as_ref()
        .and_then(|id| catalog.equipment(id))
        .and_then(|e| e.tool_type);
    Loadout {
        tool,
        weapon,
        has_weapon: player.equipped.weapon.is_some(),
    }
}

impl GatherRequirement {
    fn is_met(&self, loadout: Loadout) -> bool {
        match self {
            Self::Nothing => true,
            Self::AnyTool { tools } => loadout.tool.is_some_and(|t| tools.contains(&t)),
            Self::WeaponAndTool { tool } => {
                loadout.has_weapon
                    && (loadout.tool == Some(*tool) || loadout.weapon == Some(*tool))
            }
        }
    }
}

/// Whether `player`'s current equipment allows collecting `resource`.
pub fn can_collect(resource: &Resource, player: &Player, catalog: &Catalog) -> bool {
    if resource.kind == ResourceKind::Basic {
        return true;
    }

    let loadout = loadout(player, catalog);

    if let Some(required) = resource.required_tool {
        return loadout.tool == Some(required) || loadout.weapon == Some(required);
    }

    catalog
        .gating()
        .requirement(resource.category)
        .is_none_or(|requirement| requirement.is_met(loadout))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use outpost_types::{Equipped, ItemId, PlayerId};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::starting_catalog::create_starting_catalog;

    fn player_with(tool: Option<&str>, weapon: Option<&str>) -> Player {
        Player {
            id: PlayerId::new(),
            name: String::from("Tester"),
            level: 1,
            experience: 0,
            hunger: 100,
            max_hunger: 100,
            thirst: 100,
            max_thirst: 100,
            health: 100,
            max_health: 100,
            coins: 0,
            inventory_weight: dec!(0),
            max_inventory_weight: dec!(20),
            water_storage: 0,
            max_water_storage: 20,
            equipped: Equipped {
                tool: tool.map(ItemId::from),
                weapon: weapon.map(ItemId::from),
                ..Equipped::default()
            },
            auto_storage: false,
            created_at: Utc::now(),
        }
    }

    fn resource(catalog: &Catalog, id: &str) -> Resource {
        catalog.resource(&ItemId::from(id)).cloned().unwrap()
    }

    #[test]
    fn basic_resources_need_nothing() {
        let catalog = create_starting_catalog().unwrap();
        let bare = player_with(None, None);
        for id in ["fiber", "sticks", "mushrooms", "berries", "shells", "clay", "small_stones"] {
            assert!(can_collect(&resource(&catalog, id), &bare, &catalog), "{id}");
        }
    }

    #[test]
    fn wood_needs_axe() {
        let catalog = create_starting_catalog().unwrap();
        let wood = resource(&catalog, "oak_wood");
        assert!(!can_collect(&wood, &player_with(None, None), &catalog));
        assert!(!can_collect(&wood, &player_with(Some("stone_pickaxe"), None), &catalog));
        assert!(can_collect(&wood, &player_with(Some("stone_axe"), None), &catalog));
    }

    #[test]
    fn stone_ore_and_crystal_need_pickaxe() {
        let catalog = create_starting_catalog().unwrap();
        let miner = player_with(Some("stone_pickaxe"), None);
        let bare = player_with(None, None);
        for id in ["stone", "iron_ore", "crystal"] {
            assert!(can_collect(&resource(&catalog, id), &miner, &catalog), "{id}");
            assert!(!can_collect(&resource(&catalog, id), &bare, &catalog), "{id}");
        }
    }

    #[test]
    fn water_accepts_bucket_or_bottle() {
        let catalog = create_starting_catalog().unwrap();
        let water = resource(&catalog, "fresh_water");
        assert!(can_collect(&water, &player_with(Some("bucket"), None), &catalog));
        assert!(can_collect(&water, &player_with(Some("bamboo_bottle"), None), &catalog));
        assert!(!can_collect(&water, &player_with(Some("stone_axe"), None), &catalog));
    }

    #[test]
    fn fish_without_rod_is_blocked() {
        let catalog = create_starting_catalog().unwrap();
        let salmon = resource(&catalog, "salmon");
        assert!(!can_collect(&salmon, &player_with(Some("bucket"), None), &catalog));
        assert!(can_collect(&salmon, &player_with(Some("fishing_rod"), None), &catalog));
    }

    #[test]
    fn animals_need_weapon_and_knife() {
        let catalog = create_starting_catalog().unwrap();
        let rabbit = resource(&catalog, "rabbit");
        assert!(!can_collect(&rabbit, &player_with(Some("flint_knife"), None), &catalog));
        assert!(!can_collect(&rabbit, &player_with(None, Some("wooden_spear")), &catalog));
        assert!(can_collect(
            &rabbit,
            &player_with(Some("flint_knife"), Some("wooden_spear")),
            &catalog
        ));
        // A knife in the weapon slot is both the weapon and the knife.
        assert!(can_collect(&rabbit, &player_with(None, Some("hunting_knife")), &catalog));
    }

    #[test]
    fn unknown_category_is_permissive() {
        let mut catalog = create_starting_catalog().unwrap();
        let mut relic = resource(&catalog, "crystal");
        relic.id = ItemId::from("strange_relic");
        relic.category = ResourceCategory::Other;
        catalog.add_resource(relic.clone()).unwrap();
        assert!(can_collect(&relic, &player_with(None, None), &catalog));
    }

    #[test]
    fn explicit_required_tool_overrides_category() {
        let catalog = create_starting_catalog().unwrap();
        let mut crystal = resource(&catalog, "crystal");
        crystal.required_tool = Some(ToolType::Bucket);
        assert!(can_collect(&crystal, &player_with(Some("bucket"), None), &catalog));
        assert!(!can_collect(&crystal, &player_with(Some("stone_pickaxe"), None), &catalog));

        let mut rabbit = resource(&catalog, "rabbit");
        rabbit.required_tool = Some(ToolType::Knife);
        assert!(can_collect(&rabbit, &player_with(None, Some("hunting_knife")), &catalog));
        assert!(can_collect(&rabbit, &player_with(Some("flint_knife"), None), &catalog));
        assert!(!can_collect(&rabbit, &player_with(None, Some("wooden_spear")), &catalog));
    }

    #[test]
    fn predicate_is_deterministic() {
        let catalog = create_starting_catalog().unwrap();
        let player = player_with(Some("fishing_rod"), None);
        let salmon = resource(&catalog, "salmon");
        let first = can_collect(&salmon, &player, &catalog);
        for _ in 0..10 {
            assert_eq!(can_collect(&salmon, &player, &catalog), first);
        }
    }
}
