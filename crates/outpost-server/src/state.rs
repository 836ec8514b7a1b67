//! Shared application state for the Outpost API server.
//!
//! [`AppState`] holds the game behind one [`tokio::sync::Mutex`] and the
//! broadcast channel the game publishes its events into. Every handler
//! locks the game for one short synchronous operation.

use std::sync::Arc;

use outpost_catalog::Catalog;
use outpost_core::{BroadcastSink, Game, GameState, OutpostConfig, SharedGame};
use outpost_types::GameEvent;
use tokio::sync::{Mutex, broadcast};

/// Capacity of the broadcast channel for game events.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
pub const BROADCAST_CAPACITY: usize = 256;

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// The game, locked per operation.
    pub game: SharedGame,
    /// Sender side of the event channel the game publishes to.
    pub tx: broadcast::Sender<GameEvent>,
}

impl AppState {
    /// Create state around a fresh game.
    pub fn new(config: OutpostConfig, catalog: Arc<Catalog>) -> Self {
        Self::with_state(config, catalog, GameState::default())
    }

    /// Create state around a game restored from `state`.
    pub fn with_state(config: OutpostConfig, catalog: Arc<Catalog>, state: GameState) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let sink = Arc::new(BroadcastSink::new(tx.clone()));
        let game = Game::new(config, catalog, sink).with_state(state);
        Self {
            game: Arc::new(Mutex::new(game)),
            tx,
        }
    }

    /// Subscribe to game events.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }
}
