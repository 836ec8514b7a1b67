//! Outpost server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `outpost-config.yaml` (or defaults)
//! 2. Initialize structured logging (tracing)
//! 3. Build the starting catalog
//! 4. Restore the last snapshot, if persistence is configured
//! 5. Spawn the expedition ticker and auto-repeat clock
//! 6. Serve the API until Ctrl-C
//! 7. Stop the runner and write the snapshot

use std::path::{Path, PathBuf};
use std::sync::Arc;

use outpost_catalog::create_starting_catalog;
use outpost_core::config::{LogFormat, LoggingConfig};
use outpost_core::{OutpostConfig, RunnerHandles, snapshot};
use outpost_server::{AppState, start_server};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "outpost-config.yaml";

/// Application entry point for the Outpost server.
///
/// # Errors
///
/// Returns an error if configuration, snapshot loading, binding, or the
/// final snapshot write fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let path = std::env::var("OUTPOST_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, from_file) = load_config(&path)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    if from_file {
        info!(path = %path.display(), "Configuration loaded");
    } else {
        info!(path = %path.display(), "No config file found, using defaults");
    }
    info!(
        seed = config.world.seed,
        tick_interval_ms = config.expedition.tick_interval_ms,
        tick_driver = ?config.expedition.tick_driver,
        "Outpost server starting"
    );

    // 3. Catalog.
    let catalog = Arc::new(create_starting_catalog()?);
    info!(
        resources = catalog.resources().count(),
        biomes = catalog.biomes().count(),
        "Catalog ready"
    );

    // 4. Restore state.
    let restored = match &config.persistence.snapshot_path {
        Some(path) => snapshot::load(path)?,
        None => None,
    };
    let state = Arc::new(AppState::with_state(
        config.clone(),
        catalog,
        restored.unwrap_or_default(),
    ));

    // 5. Background loops.
    let runner = RunnerHandles::spawn(&state.game, &config);

    // 6. Serve until Ctrl-C.
    start_server(&config.server, Arc::clone(&state), shutdown_signal()).await?;

    // 7. Stop and persist.
    runner.shutdown().await?;
    if let Some(path) = &config.persistence.snapshot_path {
        let game = state.game.lock().await;
        snapshot::save(path, game.state())?;
    }
    info!("Outpost server exited cleanly");
    Ok(())
}

/// Read the config file, falling back to defaults (plus env overrides)
/// when it does not exist. The flag is whether a file was read.
fn load_config(path: &Path) -> Result<(OutpostConfig, bool), outpost_core::config::ConfigError> {
    if path.exists() {
        Ok((OutpostConfig::from_file(path)?, true))
    } else {
        Ok((OutpostConfig::parse("")?, false))
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
