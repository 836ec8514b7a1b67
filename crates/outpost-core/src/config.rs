//! Configuration loading and typed config structures for the Outpost core.
//!
//! The canonical configuration lives in `outpost-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads it. Every field has a
//! default, so an empty file (or no file at all) yields a working setup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use outpost_inventory::{InventoryConfig, PlayerDefaults};
use outpost_types::ItemId;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `outpost-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutpostConfig {
    /// World-level settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// HTTP bind address.
    #[serde(default)]
    pub server: ServerConfig,

    /// Expedition pacing and thresholds.
    #[serde(default)]
    pub expedition: ExpeditionConfig,

    /// Inventory and storage limits.
    #[serde(default)]
    pub capacity: CapacityConfig,

    /// Auto-repeat timing.
    #[serde(default)]
    pub auto_repeat: AutoRepeatConfig,

    /// New-player stats.
    #[serde(default)]
    pub player: PlayerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Snapshot persistence.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl OutpostConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `OUTPOST_HOST` overrides `server.host`
    /// - `OUTPOST_PORT` overrides `server.port`
    /// - `OUTPOST_SNAPSHOT_PATH` overrides `persistence.snapshot_path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override fields with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("OUTPOST_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("OUTPOST_PORT")
            && let Ok(port) = val.parse::<u16>()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("OUTPOST_SNAPSHOT_PATH") {
            self.persistence.snapshot_path = Some(PathBuf::from(val));
        }
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let e = &self.expedition;
        if e.progress_min > e.progress_max {
            return Err(ConfigError::Invalid {
                field: "expedition.progress_min",
                reason: format!("{} exceeds progress_max {}", e.progress_min, e.progress_max),
            });
        }
        if e.collection_chance_pct > 100 {
            return Err(ConfigError::Invalid {
                field: "expedition.collection_chance_pct",
                reason: String::from("must be at most 100"),
            });
        }
        if e.manual_min_minutes > e.manual_max_minutes {
            return Err(ConfigError::Invalid {
                field: "expedition.manual_min_minutes",
                reason: String::from("exceeds manual_max_minutes"),
            });
        }
        if e.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "expedition.tick_interval_ms",
                reason: String::from("must be positive"),
            });
        }
        Ok(())
    }

    /// Inventory limits in the form the inventory crate takes.
    pub fn inventory(&self) -> InventoryConfig {
        InventoryConfig {
            inventory_slots: self.capacity.inventory_slots,
            storage_hard_cap_kg: self.capacity.storage_hard_cap_kg,
        }
    }

    /// New-player stats in the form the inventory crate takes.
    pub fn player_defaults(&self) -> PlayerDefaults {
        let p = &self.player;
        PlayerDefaults {
            level: p.level,
            max_hunger: p.max_hunger,
            max_thirst: p.max_thirst,
            max_health: p.max_health,
            max_water_storage: p.max_water_storage,
            coins: p.coins,
            auto_storage: p.auto_storage,
            starting_items: p
                .starting_items
                .iter()
                .map(|(id, qty)| (ItemId::new(id.as_str()), *qty))
                .collect(),
        }
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducible rolls.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Who advances in-progress expeditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickDriver {
    /// The server runner ticks every in-progress expedition.
    #[default]
    Server,
    /// Clients call the tick endpoint themselves.
    Client,
}

/// Expedition pacing and thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpeditionConfig {
    /// Milliseconds of expedition time per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Smallest progress step per tick.
    #[serde(default = "default_progress_min")]
    pub progress_min: u32,

    /// Largest progress step per tick.
    #[serde(default = "default_progress_max")]
    pub progress_max: u32,

    /// Chance (0--100) that a tick yields a resource.
    #[serde(default = "default_collection_chance_pct")]
    pub collection_chance_pct: u32,

    /// Carried weight percentage that triggers `inventory_full`.
    #[serde(default = "default_auto_return_weight_pct")]
    pub auto_return_weight_pct: u32,

    /// Hunger/thirst percentage that triggers `hunger_low`/`thirst_low`.
    #[serde(default = "default_low_vitals_pct")]
    pub low_vitals_pct: u32,

    /// Hunger drained per hour of expedition time.
    #[serde(default = "default_hunger_drain_per_hour")]
    pub hunger_drain_per_hour: u32,

    /// Thirst drained per hour of expedition time.
    #[serde(default = "default_thirst_drain_per_hour")]
    pub thirst_drain_per_hour: u32,

    /// Shortest manual expedition in minutes.
    #[serde(default = "default_manual_min_minutes")]
    pub manual_min_minutes: u32,

    /// Longest manual expedition in minutes.
    #[serde(default = "default_manual_max_minutes")]
    pub manual_max_minutes: u32,

    /// Who drives ticks.
    #[serde(default)]
    pub tick_driver: TickDriver,
}

impl Default for ExpeditionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            progress_min: default_progress_min(),
            progress_max: default_progress_max(),
            collection_chance_pct: default_collection_chance_pct(),
            auto_return_weight_pct: default_auto_return_weight_pct(),
            low_vitals_pct: default_low_vitals_pct(),
            hunger_drain_per_hour: default_hunger_drain_per_hour(),
            thirst_drain_per_hour: default_thirst_drain_per_hour(),
            manual_min_minutes: default_manual_min_minutes(),
            manual_max_minutes: default_manual_max_minutes(),
            tick_driver: TickDriver::default(),
        }
    }
}

/// Inventory and storage limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CapacityConfig {
    /// Distinct stacks a player may carry.
    #[serde(default = "default_inventory_slots")]
    pub inventory_slots: u32,

    /// Optional storage weight cap in kilograms; unset means unbounded.
    #[serde(default)]
    pub storage_hard_cap_kg: Option<Decimal>,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            inventory_slots: default_inventory_slots(),
            storage_hard_cap_kg: None,
        }
    }
}

/// Auto-repeat timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AutoRepeatConfig {
    /// Seconds between a completed expedition and the relaunch.
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u32,

    /// Hunger and thirst must both be at least this to relaunch.
    #[serde(default = "default_vitals_floor")]
    pub vitals_floor: u32,
}

impl Default for AutoRepeatConfig {
    fn default() -> Self {
        Self {
            countdown_secs: default_countdown_secs(),
            vitals_floor: default_vitals_floor(),
        }
    }
}

/// New-player stats.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerConfig {
    /// Starting level.
    #[serde(default = "default_level")]
    pub level: u32,
    /// Hunger ceiling.
    #[serde(default = "default_vital_max")]
    pub max_hunger: u32,
    /// Thirst ceiling.
    #[serde(default = "default_vital_max")]
    pub max_thirst: u32,
    /// Health ceiling.
    #[serde(default = "default_vital_max")]
    pub max_health: u32,
    /// Water counter ceiling.
    #[serde(default = "default_max_water_storage")]
    pub max_water_storage: u32,
    /// Starting coins.
    #[serde(default)]
    pub coins: u32,
    /// Whether expedition overflow is routed to storage.
    #[serde(default)]
    pub auto_storage: bool,
    /// Items every new player starts with, by catalog id.
    #[serde(default)]
    pub starting_items: BTreeMap<String, u32>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            max_hunger: default_vital_max(),
            max_thirst: default_vital_max(),
            max_health: default_vital_max(),
            max_water_storage: default_max_water_storage(),
            coins: 0,
            auto_storage: false,
            starting_items: BTreeMap::new(),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Snapshot persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// File the game state is loaded from at startup and saved to on
    /// shutdown. Unset disables persistence.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Default value functions (required by serde)
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}

const fn default_tick_interval_ms() -> u64 {
    2000
}

const fn default_progress_min() -> u32 {
    10
}

const fn default_progress_max() -> u32 {
    25
}

const fn default_collection_chance_pct() -> u32 {
    60
}

const fn default_auto_return_weight_pct() -> u32 {
    90
}

const fn default_low_vitals_pct() -> u32 {
    10
}

const fn default_hunger_drain_per_hour() -> u32 {
    48
}

const fn default_thirst_drain_per_hour() -> u32 {
    36
}

const fn default_manual_min_minutes() -> u32 {
    5
}

const fn default_manual_max_minutes() -> u32 {
    120
}

const fn default_inventory_slots() -> u32 {
    36
}

const fn default_countdown_secs() -> u32 {
    10
}

const fn default_vitals_floor() -> u32 {
    5
}

const fn default_level() -> u32 {
    1
}

const fn default_vital_max() -> u32 {
    100
}

const fn default_max_water_storage() -> u32 {
    20
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = OutpostConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.expedition.tick_interval_ms, 2000);
        assert_eq!(config.expedition.collection_chance_pct, 60);
        assert_eq!(config.capacity.inventory_slots, 36);
        assert_eq!(config.capacity.storage_hard_cap_kg, None);
        assert_eq!(config.auto_repeat.countdown_secs, 10);
        assert_eq!(config.auto_repeat.vitals_floor, 5);
        assert_eq!(config.expedition.tick_driver, TickDriver::Server);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  seed: 123

server:
  host: "127.0.0.1"
  port: 9000

expedition:
  tick_interval_ms: 500
  progress_min: 5
  progress_max: 15
  collection_chance_pct: 100
  auto_return_weight_pct: 80
  low_vitals_pct: 20
  hunger_drain_per_hour: 60
  thirst_drain_per_hour: 30
  manual_min_minutes: 1
  manual_max_minutes: 60
  tick_driver: client

capacity:
  inventory_slots: 24
  storage_hard_cap_kg: 500

auto_repeat:
  countdown_secs: 3
  vitals_floor: 10

player:
  max_water_storage: 40
  coins: 15
  starting_items:
    stone_axe: 1
    berries: 5

logging:
  level: "debug"
  format: json
"#;

        let config = OutpostConfig::parse(yaml).unwrap();
        assert_eq!(config.world.seed, 123);
        assert_eq!(config.expedition.progress_max, 15);
        assert_eq!(config.expedition.tick_driver, TickDriver::Client);
        assert_eq!(config.capacity.storage_hard_cap_kg, Some(dec!(500)));
        assert_eq!(config.auto_repeat.countdown_secs, 3);
        assert_eq!(config.logging.format, LogFormat::Json);

        let defaults = config.player_defaults();
        assert_eq!(defaults.coins, 15);
        assert_eq!(defaults.starting_items.get(&ItemId::from("berries")), Some(&5));
        assert_eq!(config.inventory().inventory_slots, 24);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = OutpostConfig::parse("world:\n  seed: 7\n").unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.expedition.progress_min, 10);
        assert_eq!(config.expedition.progress_max, 25);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(OutpostConfig::parse("").is_ok());
    }

    #[test]
    fn inverted_progress_range_is_rejected() {
        let yaml = "expedition:\n  progress_min: 30\n  progress_max: 20\n";
        assert!(matches!(
            OutpostConfig::parse(yaml),
            Err(ConfigError::Invalid { field: "expedition.progress_min", .. })
        ));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("outpost-config.yaml");
        if path.exists() {
            let config = OutpostConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
