//! The real-time tick loop.
//!
//! The loop owns no state of its own. It borrows the world's mutex, holds the lock for the whole of each tick so
//! commands from other tasks never interleave with one, and writes a
//! snapshot every `snapshot_interval_ticks` ticks and once more on exit.
//!
//! Termination conditions, checked before each tick:
//! - shutdown signal received
//! - `max_ticks` ticks run by this process

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use monad_core::{MonadConfig, TickSummary, World};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::persist;

/// Shortest wall-clock gap between ticks.
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Loop settings drawn from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Wall-clock time between ticks.
    pub tick_interval: Duration,
    /// Stop after this many ticks; unbounded when `None`.
    pub max_ticks: Option<u64>,
    /// Ticks between snapshot writes; 0 writes only on exit.
    pub snapshot_interval_ticks: u64,
    /// Where snapshots go.
    pub snapshot_path: PathBuf,
}

impl RunSettings {
    /// Pull loop settings out of the world configuration.
    pub fn from_config(config: &MonadConfig) -> Self {
        Self {
            tick_interval: Duration::from_millis(config.world.tick_interval_ms),
            max_ticks: config.world.max_ticks,
            snapshot_interval_ticks: config.persistence.snapshot_interval_ticks,
            snapshot_path: config.persistence.snapshot_path.clone(),
        }
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The configured tick budget was used up.
    MaxTicks,
    /// A shutdown signal arrived.
    Shutdown,
}

/// What a run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Why the loop stopped.
    pub end_reason: EndReason,
    /// Ticks run by this loop.
    pub total_ticks: u64,
    /// World tick when the loop stopped.
    pub final_tick: u64,
    /// Summary of the last tick run, if any.
    pub last_summary: Option<TickSummary>,
}

/// Whether a snapshot is due after `tick`.
const fn snapshot_due(tick: u64, every: u64) -> bool {
    match tick.checked_rem(every) {
        Some(rem) => rem == 0,
        None => false,
    }
}

/// Tick the world until `shutdown` resolves or the tick budget runs out.
///
/// # Errors
///
/// Returns [`EngineError::Tick`] if the world cannot advance, or a
/// snapshot error if a snapshot cannot be written.
pub async fn run(
    world: &Mutex<World>,
    settings: &RunSettings,
    shutdown: impl Future<Output = ()>,
) -> Result<RunResult, EngineError> {
    let mut interval = tokio::time::interval(settings.tick_interval.max(MIN_TICK_INTERVAL));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut total_ticks: u64 = 0;
    let mut last_summary = None;
    info!(
        tick_interval_ms = settings.tick_interval.as_millis(),
        max_ticks = ?settings.max_ticks,
        snapshot_interval_ticks = settings.snapshot_interval_ticks,
        "tick loop starting"
    );

    let end_reason = loop {
        if settings.max_ticks.is_some_and(|max| total_ticks >= max) {
            info!(total_ticks, "tick budget used up");
            break EndReason::MaxTicks;
        }

        tokio::select! {
            biased;
            () = &mut shutdown => {
                info!(total_ticks, "shutdown requested");
                break EndReason::Shutdown;
            }
            _ = interval.tick() => {}
        }

        // --- Tick under the lock ---
        let (summary, snapshot) = {
            let mut world = world.lock().await;
            let summary = world.advance_tick()?;
            let snapshot = snapshot_due(summary.tick, settings.snapshot_interval_ticks)
                .then(|| world.export_snapshot());
            (summary, snapshot)
        };
        total_ticks = total_ticks.saturating_add(1);
        log_tick(&summary);

        // --- Persist outside the lock ---
        if let Some(snapshot) = snapshot {
            persist::save(&settings.snapshot_path, &snapshot).await?;
            info!(tick = summary.tick, path = %settings.snapshot_path.display(), "snapshot saved");
        }
        last_summary = Some(summary);
    };

    let (final_tick, snapshot) = {
        let world = world.lock().await;
        (world.tick(), world.export_snapshot())
    };
    persist::save(&settings.snapshot_path, &snapshot).await?;
    info!(final_tick, path = %settings.snapshot_path.display(), "final snapshot saved");

    Ok(RunResult {
        end_reason,
        total_ticks,
        final_tick,
        last_summary,
    })
}

/// Log what a tick did.
fn log_tick(summary: &TickSummary) {
    if !summary.balanced {
        warn!(tick = summary.tick, "tick finished with a ledger anomaly");
    }
    if summary.new_season {
        info!(tick = summary.tick, season = summary.season, "new season");
    } else if summary.new_episode {
        info!(tick = summary.tick, episode = summary.episode, "new episode");
    }
    debug!(
        tick = summary.tick,
        decrees = summary.decrees.len(),
        events = summary.events.len(),
        spreads = summary.spreads,
        resolved = summary.resolved.len(),
        "tick complete"
    );
}

/// Log the end of a run.
pub fn log_run_end(result: &RunResult) {
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_tick,
        last_balanced = ?result.last_summary.as_ref().map(|summary| summary.balanced),
        "tick loop stopped"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use monad_core::{Command, CommandOutcome};
    use monad_types::Personality;

    use super::*;

    fn quiet_config() -> MonadConfig {
        let mut config = MonadConfig::default();
        config.landlord.high_chaos_chance = 0.0;
        config.landlord.gossip_overflow_chance = 0.0;
        config.landlord.random_decree_chance = 0.0;
        config.landlord.world_event_chance = 0.0;
        config.landlord.periodic_interval = 0;
        config
    }

    fn settings(name: &str, max_ticks: Option<u64>, every: u64) -> RunSettings {
        RunSettings {
            tick_interval: Duration::from_millis(10),
            max_ticks,
            snapshot_interval_ticks: every,
            snapshot_path: std::env::temp_dir().join(format!("monad-runner-{}-{name}.json", std::process::id())),
        }
    }

    #[test]
    fn settings_follow_config() {
        let mut config = MonadConfig::default();
        config.world.tick_interval_ms = 250;
        config.world.max_ticks = Some(9);
        let settings = RunSettings::from_config(&config);
        assert_eq!(settings.tick_interval, Duration::from_millis(250));
        assert_eq!(settings.max_ticks, Some(9));
        assert_eq!(settings.snapshot_path, config.persistence.snapshot_path);
    }

    #[test]
    fn snapshots_fall_on_multiples_of_the_interval() {
        assert!(snapshot_due(50, 50));
        assert!(snapshot_due(100, 50));
        assert!(!snapshot_due(51, 50));
        assert!(!snapshot_due(50, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_max_ticks_and_saves() {
        let settings = settings("budget", Some(5), 2);
        let world = Arc::new(Mutex::new(World::new(quiet_config()).unwrap()));

        let result = run(&world, &settings, std::future::pending()).await.unwrap();
        assert_eq!(result.end_reason, EndReason::MaxTicks);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_tick, 5);
        assert_eq!(result.last_summary.unwrap().tick, 5);

        let saved = persist::load(&settings.snapshot_path).await.unwrap().unwrap();
        assert_eq!(saved.clock.tick, 5);
        tokio::fs::remove_file(&settings.snapshot_path).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_wins_over_the_next_tick() {
        let settings = settings("shutdown", None, 0);
        let world = Arc::new(Mutex::new(World::new(quiet_config()).unwrap()));

        let result = run(&world, &settings, std::future::ready(())).await.unwrap();
        assert_eq!(result.end_reason, EndReason::Shutdown);
        assert_eq!(result.total_ticks, 0);
        assert!(result.last_summary.is_none());
        assert_eq!(world.lock().await.tick(), 0);
        tokio::fs::remove_file(&settings.snapshot_path).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn commands_share_the_world_with_the_loop() {
        let settings = settings("shared", Some(3), 0);
        let world = Arc::new(Mutex::new(World::new(quiet_config()).unwrap()));

        let outcome = world
            .lock()
            .await
            .execute(Command::RegisterAgent {
                name: "Amy".to_owned(),
                personality: Personality::Nerd,
            })
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::Registered { .. }));

        let result = run(&world, &settings, std::future::pending()).await.unwrap();
        assert_eq!(result.final_tick, 3);

        let saved = persist::load(&settings.snapshot_path).await.unwrap().unwrap();
        assert_eq!(saved.agents.len(), 1);
        let restored = World::from_snapshot(quiet_config(), saved, 1).unwrap();
        assert_eq!(restored.tick(), 3);
        tokio::fs::remove_file(&settings.snapshot_path).await.unwrap();
    }
}
