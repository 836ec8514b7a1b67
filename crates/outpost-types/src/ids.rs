//! Type-safe identifier wrappers.
//!
//! Runtime entities (players, expeditions, inventory and storage rows) use
//! UUID v7 newtypes so they sort by creation time. Catalog entries
//! (resources, equipment, biomes) are addressed by short string slugs such
//! as `"wood"` or `"forest"`, because the catalog is static content seeded at
//! startup and the web client refers to entries by those slugs.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Generates a newtype wrapper around a catalog slug [`String`].
macro_rules! define_slug {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from a slug.
            pub fn new(slug: impl Into<String>) -> Self {
                Self(slug.into())
            }

            /// Borrow the slug.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(slug: &str) -> Self {
                Self(slug.to_owned())
            }
        }
    };
}

define_id! {
    /// Unique identifier for a player (the aggregate root of a save).
    PlayerId
}

define_id! {
    /// Unique identifier for an expedition run record.
    ExpeditionId
}

define_id! {
    /// Unique identifier for a carried inventory row.
    InventoryItemId
}

define_id! {
    /// Unique identifier for a storage (home base) row.
    StorageItemId
}

define_slug! {
    /// Catalog identifier shared by resources and equipment.
    ///
    /// Both live in one namespace so an inventory row can hold either.
    ItemId
}

define_slug! {
    /// Catalog identifier for a biome.
    BiomeId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let player = PlayerId::new();
        let expedition = ExpeditionId::new();
        assert_ne!(player.into_inner(), Uuid::nil());
        assert_ne!(expedition.into_inner(), Uuid::nil());
    }

    #[test]
    fn slug_serializes_as_plain_string() {
        let id = ItemId::new("fresh_water");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"fresh_water\""));
    }

    #[test]
    fn slug_display_matches_inner() {
        let id = BiomeId::from("forest");
        assert_eq!(id.to_string(), "forest");
        assert_eq!(id.as_str(), "forest");
    }
}
