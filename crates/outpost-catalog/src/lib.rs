//! Static game content for the Outpost core: resources, equipment, biomes,
//! and the tool gating rule that decides what a player can collect.
//!
//! # Modules
//!
//! - [`catalog`] -- [`Catalog`] lookup tables shared read-only by every engine.
//! - [`error`] -- Error types for catalog construction and lookups.
//! - [`gating`] -- Declarative category-to-tool table and [`can_collect`].
//! - [`starting_catalog`] -- Default biomes, resources, and equipment.

pub mod catalog;
pub mod error;
pub mod gating;
pub mod starting_catalog;

// Re-export primary types at crate root.
pub use catalog::Catalog;
pub use error::CatalogError;
pub use gating::{GatherRequirement, GatingTable, can_collect};
pub use starting_catalog::create_starting_catalog;
