//! Background loops that drive the game in real time.
//!
//! Two tokio tasks share the game behind one [`tokio::sync::Mutex`]:
//!
//! - **Expedition ticker**: every `tick_interval_ms`, ticks every
//!   in-progress expedition. Only spawned when the tick driver is
//!   [`TickDriver::Server`].
//! - **Auto-repeat clock**: once per second, advances auto-repeat
//!   countdowns and launches what is due.
//!
//! Both stop when the shutdown signal flips. A lock that is already held
//! finishes its critical section before the loop sees the signal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};

use crate::config::{OutpostConfig, TickDriver};
use crate::game::{AutoRepeatAction, Game};

/// The game as shared between the runner and the HTTP layer.
pub type SharedGame = Arc<Mutex<Game>>;

const AUTO_REPEAT_PERIOD: Duration = Duration::from_secs(1);

/// Errors from the background tasks.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A task panicked or was aborted.
    #[error("runner task failed: {source}")]
    Join {
        /// The underlying join error.
        #[from]
        source: JoinError,
    },
}

/// Handles to the running loops.
#[derive(Debug)]
pub struct RunnerHandles {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl RunnerHandles {
    /// Spawn the loops the config asks for.
    pub fn spawn(game: &SharedGame, config: &OutpostConfig) -> Self {
        let (shutdown, rx) = watch::channel(false);
        let mut tasks = Vec::with_capacity(2);

        if config.expedition.tick_driver == TickDriver::Server {
            let interval = Duration::from_millis(config.expedition.tick_interval_ms);
            tasks.push(tokio::spawn(run_expedition_ticks(
                Arc::clone(game),
                interval,
                rx.clone(),
            )));
        } else {
            info!("expedition ticks are client-driven");
        }
        tasks.push(tokio::spawn(run_auto_repeat(
            Arc::clone(game),
            AUTO_REPEAT_PERIOD,
            rx,
        )));

        Self { shutdown, tasks }
    }

    /// Number of spawned loops.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no loops were spawned.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Signal every loop to stop and wait for them.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Join`] for the first task that panicked.
    pub async fn shutdown(self) -> Result<(), RunnerError> {
        // Receivers may already be gone if every task exited.
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            task.await?;
        }
        info!("runner stopped");
        Ok(())
    }
}

/// Tick every in-progress expedition each `interval` until shutdown.
pub async fn run_expedition_ticks(
    game: SharedGame,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(interval_ms = interval.as_millis(), "expedition ticker starting");
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            () = tokio::time::sleep(interval) => {
                let outcomes = game.lock().await.tick_all();
                let returned = outcomes.iter().filter(|o| o.should_return).count();
                if !outcomes.is_empty() {
                    debug!(ticked = outcomes.len(), returned, "expedition ticks applied");
                }
            }
        }
    }
    info!("expedition ticker stopped");
}

/// Advance auto-repeat countdowns each `period` until shutdown.
pub async fn run_auto_repeat(
    game: SharedGame,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let seconds = u32::try_from(period.as_secs()).unwrap_or(u32::MAX).max(1);
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            () = tokio::time::sleep(period) => {
                let actions = game.lock().await.advance_auto_repeat(seconds);
                for action in &actions {
                    if let AutoRepeatAction::Started { player, biome, expedition } = action {
                        debug!(player_id = %player, biome = %biome, expedition_id = %expedition, "auto-repeat relaunch");
                    }
                }
            }
        }
    }
    info!("auto-repeat clock stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_catalog::create_starting_catalog;
    use outpost_types::{BiomeId, ExpeditionMode, ExpeditionStatus, ItemId};

    use super::*;
    use crate::expedition::ExpeditionPlan;
    use crate::notify::NoopSink;

    fn shared(config: OutpostConfig) -> SharedGame {
        let catalog = Arc::new(create_starting_catalog().unwrap());
        Arc::new(Mutex::new(Game::new(config, catalog, Arc::new(NoopSink))))
    }

    #[tokio::test]
    async fn server_driver_ticks_expeditions_to_completion() {
        let mut config = OutpostConfig::default();
        config.expedition.tick_interval_ms = 5;
        let game = shared(config.clone());

        let exp = {
            let mut g = game.lock().await;
            let player = g.create_player(None).unwrap().player.id;
            g.start_expedition(&ExpeditionPlan {
                player_id: player,
                biome_id: BiomeId::from("forest"),
                resources: [ItemId::from("fiber")].into_iter().collect(),
                equipment: Vec::new(),
                mode: ExpeditionMode::Open,
            })
            .unwrap()
        };

        let handles = RunnerHandles::spawn(&game, &config);
        assert_eq!(handles.len(), 2);
        // Ten ticks at most reach full distance.
        tokio::time::sleep(Duration::from_millis(400)).await;
        handles.shutdown().await.unwrap();

        let status = game.lock().await.expedition(exp.id).unwrap().status;
        assert_eq!(status, ExpeditionStatus::Completed);
    }

    #[tokio::test]
    async fn client_driver_spawns_only_auto_repeat() {
        let mut config = OutpostConfig::default();
        config.expedition.tick_driver = TickDriver::Client;
        let game = shared(config.clone());
        let handles = RunnerHandles::spawn(&game, &config);
        assert_eq!(handles.len(), 1);
        handles.shutdown().await.unwrap();
    }
}
