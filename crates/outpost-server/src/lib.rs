//! HTTP and `WebSocket` API for the Outpost game.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **REST endpoints** for players, inventory, storage, equipment,
//!   expeditions, and auto-repeat (see [`handlers`])
//! - **`WebSocket` endpoint** (`/ws/events`) streaming every game state
//!   change via [`tokio::sync::broadcast`]
//!
//! # Architecture
//!
//! The [`Game`](outpost_core::Game) lives behind one
//! [`tokio::sync::Mutex`] in [`AppState`]. Each request locks it for one
//! synchronous operation, so validation and mutation never interleave.
//! The game publishes events into the broadcast channel; `WebSocket`
//! clients receive them with automatic lag handling.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::{AppState, BROADCAST_CAPACITY};
