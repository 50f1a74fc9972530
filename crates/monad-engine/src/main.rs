//! Host binary for The Monad.
//!
//! Wires configuration, logging and snapshot files around a single
//! [`World`] and ticks it in real time until the tick budget runs out or
//! the process receives Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `monad-config.yaml` (or `$MONAD_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Restore the world from the snapshot file, or build a fresh one
//! 4. Run the tick loop
//! 5. Log the result

mod error;
mod persist;
mod runner;

use std::path::PathBuf;
use std::sync::Arc;

use monad_core::config::LoggingConfig;
use monad_core::{MonadConfig, World};
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::runner::RunSettings;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "monad-config.yaml";

/// Environment variable that overrides [`CONFIG_FILE`].
const CONFIG_ENV: &str = "MONAD_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    match &config_path {
        Some(path) => info!(path = %path.display(), "configuration loaded"),
        None => info!("config file not found, using defaults"),
    }
    info!(
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        starting_func = config.world.starting_func,
        "monad-engine starting"
    );

    // 3. Restore or create the world.
    let world = match persist::load(&config.persistence.snapshot_path).await? {
        Some(snapshot) => {
            let seed = config.world.seed.wrapping_add(snapshot.clock.tick);
            World::from_snapshot(config.clone(), snapshot, seed)?
        }
        None => World::new(config.clone())?,
    };
    info!(tick = world.tick(), agents = world.agents().count(), "world ready");
    let world = Arc::new(Mutex::new(world));

    // 4. Run until the budget runs out or Ctrl-C.
    let settings = RunSettings::from_config(&config);
    let result = runner::run(&world, &settings, shutdown_signal()).await?;

    // 5. Log results.
    runner::log_run_end(&result);
    info!("monad-engine shutdown complete");
    Ok(())
}

/// Load configuration from `$MONAD_CONFIG` or `monad-config.yaml`.
///
/// Returns the path actually read, or `None` when no file exists and the
/// defaults are used.
fn load_config() -> Result<(MonadConfig, Option<PathBuf>), EngineError> {
    let path = std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    if path.exists() {
        let config = MonadConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        Ok((MonadConfig::default(), None))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if logging.is_json() {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolve on Ctrl-C. If the handler cannot be installed the loop runs
/// until its tick budget is spent.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
