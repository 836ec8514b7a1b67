//! Error types for the `outpost-catalog` crate.
//!
//! All fallible catalog operations return [`CatalogError`].

use outpost_types::{BiomeId, ItemId};

/// Errors that can occur while building or querying the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// An item id was registered twice (resources and equipment share ids).
    #[error("duplicate item id: {0}")]
    DuplicateItem(ItemId),

    /// A biome id was registered twice.
    #[error("duplicate biome id: {0}")]
    DuplicateBiome(BiomeId),

    /// A biome lists a resource the catalog does not define.
    #[error("biome {biome} references unknown resource {resource}")]
    DanglingBiomeResource {
        /// The biome being registered.
        biome: BiomeId,
        /// The missing resource.
        resource: ItemId,
    },
}
