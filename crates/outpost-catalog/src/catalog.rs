//! The read-only content catalog: resources, equipment, and biomes.
//!
//! Resources and equipment share one [`ItemId`] namespace so inventory rows
//! can hold either; registering the same id twice is rejected. The catalog is
//! built once at startup and then shared behind an `Arc` by every engine.

use std::collections::BTreeMap;

use outpost_types::{Biome, BiomeId, Equipment, ItemId, Player, Resource};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::error::CatalogError;
use crate::gating::GatingTable;

/// Lookup tables for every static game definition the core needs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    resources: BTreeMap<ItemId, Resource>,
    equipment: BTreeMap<ItemId, Equipment>,
    biomes: BTreeMap<BiomeId, Biome>,
    gating: GatingTable,
}

impl Catalog {
    /// Create an empty catalog with the given gating table.
    pub const fn new(gating: GatingTable) -> Self {
        Self {
            resources: BTreeMap::new(),
            equipment: BTreeMap::new(),
            biomes: BTreeMap::new(),
            gating,
        }
    }

    /// Register a resource definition.
    pub fn add_resource(&mut self, resource: Resource) -> Result<(), CatalogError> {
        if self.is_known_item(&resource.id) {
            return Err(CatalogError::DuplicateItem(resource.id));
        }
        self.resources.insert(resource.id.clone(), resource);
        Ok(())
    }

    /// Register an equipment definition.
    pub fn add_equipment(&mut self, equipment: Equipment) -> Result<(), CatalogError> {
        if self.is_known_item(&equipment.id) {
            return Err(CatalogError::DuplicateItem(equipment.id));
        }
        self.equipment.insert(equipment.id.clone(), equipment);
        Ok(())
    }

    /// Register a biome. Every resource it lists must already be registered.
    pub fn add_biome(&mut self, biome: Biome) -> Result<(), CatalogError> {
        if self.biomes.contains_key(&biome.id) {
            return Err(CatalogError::DuplicateBiome(biome.id));
        }
        if let Some(missing) = biome
            .available_resources
            .iter()
            .find(|id| !self.resources.contains_key(*id))
        {
            return Err(CatalogError::DanglingBiomeResource {
                biome: biome.id.clone(),
                resource: missing.clone(),
            });
        }
        self.biomes.insert(biome.id.clone(), biome);
        Ok(())
    }

    /// Look up a resource.
    pub fn resource(&self, id: &ItemId) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// Look up a piece of equipment.
    pub fn equipment(&self, id: &ItemId) -> Option<&Equipment> {
        self.equipment.get(id)
    }

    /// Look up a biome.
    pub fn biome(&self, id: &BiomeId) -> Option<&Biome> {
        self.biomes.get(id)
    }

    /// Whether `id` names a resource or a piece of equipment.
    pub fn is_known_item(&self, id: &ItemId) -> bool {
        self.resources.contains_key(id) || self.equipment.contains_key(id)
    }

    /// Weight of one unit of `id`, whether a resource or equipment.
    pub fn item_weight(&self, id: &ItemId) -> Option<Decimal> {
        self.resource(id)
            .map(|r| r.weight)
            .or_else(|| self.equipment(id).map(|e| e.weight))
    }

    /// Weight of one unit, treating unknown ids as weightless.
    ///
    /// Unknown ids should never reach an inventory; this logs when one does.
    pub fn item_weight_or_zero(&self, id: &ItemId) -> Decimal {
        self.item_weight(id).unwrap_or_else(|| {
            warn!(item = %id, "weight lookup for unknown item, counting as zero");
            Decimal::ZERO
        })
    }

    /// All resources, ordered by id.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// All equipment, ordered by id.
    pub fn all_equipment(&self) -> impl Iterator<Item = &Equipment> {
        self.equipment.values()
    }

    /// All biomes, ordered by id.
    pub fn biomes(&self) -> impl Iterator<Item = &Biome> {
        self.biomes.values()
    }

    /// The category gating table.
    pub const fn gating(&self) -> &GatingTable {
        &self.gating
    }

    /// Whether `player` meets the biome's level requirement.
    pub const fn is_unlocked(biome: &Biome, player: &Player) -> bool {
        player.level >= biome.required_level
    }

    /// Whether the biome offers `resource`.
    pub fn biome_offers(biome: &Biome, resource: &ItemId) -> bool {
        biome.available_resources.contains(resource)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_types::{
        EquipmentSlot, Rarity, ResourceCategory, ResourceKind,
    };
    use rust_decimal_macros::dec;

    use super::*;

    fn stick() -> Resource {
        Resource {
            id: ItemId::from("sticks"),
            name: String::from("Sticks"),
            emoji: String::from("🪵"),
            weight: dec!(0.3),
            value: 1,
            rarity: Rarity::Common,
            kind: ResourceKind::Basic,
            category: ResourceCategory::Basic,
            required_tool: None,
            experience_value: 1,
            distance_from_camp: 0,
            consumable: None,
        }
    }

    fn axe() -> Equipment {
        Equipment {
            id: ItemId::from("stone_axe"),
            name: String::from("Stone Axe"),
            emoji: String::from("🪓"),
            effect: String::from("Fells trees"),
            bonuses: BTreeMap::new(),
            slot: EquipmentSlot::Tool,
            tool_type: Some(outpost_types::ToolType::Axe),
            weight: dec!(1.5),
        }
    }

    #[test]
    fn item_weight_covers_resources_and_equipment() {
        let mut catalog = Catalog::new(GatingTable::default());
        catalog.add_resource(stick()).unwrap();
        catalog.add_equipment(axe()).unwrap();
        assert_eq!(catalog.item_weight(&ItemId::from("sticks")), Some(dec!(0.3)));
        assert_eq!(catalog.item_weight(&ItemId::from("stone_axe")), Some(dec!(1.5)));
        assert_eq!(catalog.item_weight(&ItemId::from("nope")), None);
        assert_eq!(catalog.item_weight_or_zero(&ItemId::from("nope")), Decimal::ZERO);
    }

    #[test]
    fn shared_namespace_rejects_duplicates() {
        let mut catalog = Catalog::new(GatingTable::default());
        catalog.add_resource(stick()).unwrap();
        let mut clash = axe();
        clash.id = ItemId::from("sticks");
        assert!(matches!(
            catalog.add_equipment(clash),
            Err(CatalogError::DuplicateItem(_))
        ));
    }

    #[test]
    fn biome_must_reference_known_resources() {
        let mut catalog = Catalog::new(GatingTable::default());
        let biome = Biome {
            id: BiomeId::from("forest"),
            name: String::from("Forest"),
            emoji: String::from("🌲"),
            required_level: 1,
            available_resources: vec![ItemId::from("sticks")],
        };
        assert!(matches!(
            catalog.add_biome(biome.clone()),
            Err(CatalogError::DanglingBiomeResource { .. })
        ));
        catalog.add_resource(stick()).unwrap();
        catalog.add_biome(biome.clone()).unwrap();
        assert!(matches!(
            catalog.add_biome(biome),
            Err(CatalogError::DuplicateBiome(_))
        ));
    }
}
