//! Outbound state notifications.
//!
//! [`Game`](crate::game::Game) publishes a [`GameEvent`] after every
//! mutation. Publishing never fails the operation that triggered it.

use std::sync::Mutex;

use outpost_types::GameEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Destination for game events.
pub trait NotificationSink: Send + Sync {
    /// Deliver one event. Must not block or fail.
    fn publish(&self, event: &GameEvent);
}

/// Fans events out over a tokio broadcast channel.
///
/// Delivery is at-most-once: receivers that fall behind skip events and
/// a send with no receivers is dropped silently.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<GameEvent>,
}

impl BroadcastSink {
    /// Wrap an existing sender.
    pub const fn new(sender: broadcast::Sender<GameEvent>) -> Self {
        Self { sender }
    }

    /// Open a new receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.sender.subscribe()
    }
}

impl NotificationSink for BroadcastSink {
    fn publish(&self, event: &GameEvent) {
        if self.sender.send(event.clone()).is_err() {
            trace!(kind = event.kind(), "no event subscribers");
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<GameEvent>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything published so far.
    pub fn events(&self) -> Vec<GameEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Wire names of everything published so far.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(GameEvent::kind).collect()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, event: &GameEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn publish(&self, _event: &GameEvent) {}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_types::{CapacityConstraints, PlayerId};
    use rust_decimal::Decimal;

    use super::*;

    fn storage_event(player: PlayerId) -> GameEvent {
        GameEvent::StorageUpdate {
            player_id: player,
            items: Vec::new(),
        }
    }

    #[test]
    fn broadcast_without_receivers_is_fine() {
        let (tx, _) = broadcast::channel(4);
        let sink = BroadcastSink::new(tx);
        sink.publish(&storage_event(PlayerId::new()));
    }

    #[tokio::test]
    async fn broadcast_reaches_subscribers() {
        let (tx, _) = broadcast::channel(4);
        let sink = BroadcastSink::new(tx);
        let mut rx = sink.subscribe();
        let player = PlayerId::new();
        sink.publish(&storage_event(player));
        let got = rx.recv().await.unwrap();
        assert_eq!(got.player_id(), player);
        assert_eq!(got.kind(), "storage_update");
    }

    #[test]
    fn recorder_keeps_order() {
        let sink = RecordingSink::new();
        let player = PlayerId::new();
        sink.publish(&storage_event(player));
        sink.publish(&GameEvent::InventoryUpdate {
            player_id: player,
            items: Vec::new(),
            constraints: CapacityConstraints {
                current_weight: Decimal::ZERO,
                max_weight: Decimal::from(20),
                current_slots: 0,
                max_slots: 36,
                percentage: Decimal::ZERO,
                display_percentage: Decimal::ZERO,
            },
        });
        assert_eq!(sink.kinds(), vec!["storage_update", "inventory_update"]);
    }
}
