//! Expeditions, auto-repeat, and orchestration for the Outpost core.
//!
//! This crate owns the expedition lifecycle (start, tick, complete,
//! cancel), the auto-repeat scheduler, and the [`Game`] facade that ties
//! them to the player store from `outpost-inventory`. It also provides the
//! tokio loops that drive ticks in real time and JSON snapshots of the
//! whole state.
//!
//! # Modules
//!
//! - [`auto_repeat`] -- Per-biome relaunch countdowns ([`AutoRepeatScheduler`])
//! - [`config`] -- Configuration loading from `outpost-config.yaml` into
//!   strongly-typed structs.
//! - [`deposit`] -- Completing an expedition and depositing its haul.
//! - [`error`] -- [`ExpeditionError`] and the umbrella [`GameError`].
//! - [`expedition`] -- Records, the active pointer, start and cancel.
//! - [`game`] -- The [`Game`] facade every API call goes through.
//! - [`manual`] -- Fixed-duration, target-driven runs and estimates.
//! - [`notify`] -- [`NotificationSink`] and its implementations.
//! - [`runner`] -- Background tick and auto-repeat loops.
//! - [`snapshot`] -- Save and load [`GameState`] as JSON.
//! - [`tick`] -- One simulation step of an expedition.

pub mod auto_repeat;
pub mod config;
pub mod deposit;
pub mod error;
pub mod expedition;
pub mod game;
pub mod manual;
pub mod notify;
pub mod runner;
pub mod snapshot;
pub mod tick;

pub use auto_repeat::AutoRepeatScheduler;
pub use config::{OutpostConfig, TickDriver};
pub use error::{AutoRepeatError, ErrorKind, ExpeditionError, GameError};
pub use expedition::{ExpeditionBook, ExpeditionEngine, ExpeditionPlan};
pub use game::{AutoRepeatAction, Game, GameState, InventoryView, PlayerView};
pub use notify::{BroadcastSink, NoopSink, NotificationSink, RecordingSink};
pub use runner::{RunnerError, RunnerHandles, SharedGame};
pub use snapshot::SnapshotError;
