//! Configuration loading and typed config structures for The Monad.
//!
//! The canonical configuration lives in `monad-config.yaml` at the project
//! root. Every section and field has a default, so an empty file (or no
//! file at all) yields a working world.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use monad_agents::{MarketTuning, QuorumRule, RumorTuning};

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
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level world configuration.
///
/// Mirrors the structure of `monad-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MonadConfig {
    /// Seed, pacing and starting balances.
    #[serde(default)]
    pub world: WorldConfig,

    /// Rumor propagation and retirement.
    #[serde(default)]
    pub rumor: RumorConfig,

    /// Landlord thresholds and probabilities.
    #[serde(default)]
    pub landlord: LandlordConfig,

    /// Market pricing and restocking.
    #[serde(default)]
    pub market: MarketConfig,

    /// Voting quorum.
    #[serde(default)]
    pub politics: PoliticsConfig,

    /// Caps on every growing collection.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Episode and season lengths.
    #[serde(default)]
    pub clock: ClockConfig,

    /// Log level and output format for the binary.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Snapshot location and cadence for the binary.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl MonadConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds between ticks in the binary's loop.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// FUNC minted to each new resident.
    #[serde(default = "default_starting_func")]
    pub starting_func: u64,

    /// Stop the binary's loop after this many ticks; unbounded when absent.
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            starting_func: default_starting_func(),
            max_ticks: None,
        }
    }
}

/// Rumor configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RumorConfig {
    /// Retire a chain after this many retellings.
    #[serde(default = "default_max_mutations")]
    pub max_mutations: u32,

    /// Retire a chain once it is older than this many ticks.
    #[serde(default = "default_max_age")]
    pub max_age: u64,

    /// Per-tick chance that an active chain spreads on its own.
    #[serde(default = "default_auto_spread_chance")]
    pub auto_spread_chance: f64,

    /// Spiciness above which retellings may be embellished.
    #[serde(default = "default_spicy_threshold")]
    pub spicy_threshold: u8,

    /// Chance of an embellishment once above the threshold.
    #[serde(default = "default_spicy_mutation_chance")]
    pub spicy_mutation_chance: f64,
}

impl Default for RumorConfig {
    fn default() -> Self {
        Self {
            max_mutations: default_max_mutations(),
            max_age: default_max_age(),
            auto_spread_chance: default_auto_spread_chance(),
            spicy_threshold: default_spicy_threshold(),
            spicy_mutation_chance: default_spicy_mutation_chance(),
        }
    }
}

impl RumorConfig {
    /// The engine-facing view of this section.
    pub const fn tuning(&self) -> RumorTuning {
        RumorTuning {
            spicy_threshold: self.spicy_threshold,
            spicy_mutation_chance: self.spicy_mutation_chance,
            max_mutations: self.max_mutations,
            max_age: self.max_age,
        }
    }
}

/// Landlord configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LandlordConfig {
    /// Average chaos above which a crackdown may be issued.
    #[serde(default = "default_high_chaos_threshold")]
    pub high_chaos_threshold: f64,

    /// Chance of a crackdown once above the threshold.
    #[serde(default = "default_high_chaos_chance")]
    pub high_chaos_chance: f64,

    /// Value carried by the crackdown's modifier.
    #[serde(default = "default_chaos_reduction")]
    pub chaos_reduction: u32,

    /// Active chains above which a gossip limit may be issued.
    #[serde(default = "default_gossip_overflow_threshold")]
    pub gossip_overflow_threshold: usize,

    /// Chance of a gossip limit once above the threshold.
    #[serde(default = "default_gossip_overflow_chance")]
    pub gossip_overflow_chance: f64,

    /// Chain limit carried by the gossip decree.
    #[serde(default = "default_max_gossip_chains")]
    pub max_gossip_chains: u32,

    /// Ticks between words of wisdom.
    #[serde(default = "default_periodic_interval")]
    pub periodic_interval: u64,

    /// Random decrees start after this tick.
    #[serde(default = "default_random_decree_after")]
    pub random_decree_after: u64,

    /// Per-tick chance of a random decree.
    #[serde(default = "default_random_decree_chance")]
    pub random_decree_chance: f64,

    /// World events start after this tick.
    #[serde(default = "default_world_event_after")]
    pub world_event_after: u64,

    /// Per-tick chance of a world event.
    #[serde(default = "default_world_event_chance")]
    pub world_event_chance: f64,

    /// Chance that arriving on the third floor yields nothing.
    #[serde(default = "default_floor3_nothing_chance")]
    pub floor3_nothing_chance: f64,

    /// Lifetime of decrees that would otherwise stand forever.
    #[serde(default = "default_standing_decree_ticks")]
    pub standing_decree_ticks: u64,

    /// Parties in one tick beyond which the Landlord imposes a limit.
    #[serde(default = "default_party_excess_threshold")]
    pub party_excess_threshold: usize,
}

impl Default for LandlordConfig {
    fn default() -> Self {
        Self {
            high_chaos_threshold: default_high_chaos_threshold(),
            high_chaos_chance: default_high_chaos_chance(),
            chaos_reduction: default_chaos_reduction(),
            gossip_overflow_threshold: default_gossip_overflow_threshold(),
            gossip_overflow_chance: default_gossip_overflow_chance(),
            max_gossip_chains: default_max_gossip_chains(),
            periodic_interval: default_periodic_interval(),
            random_decree_after: default_random_decree_after(),
            random_decree_chance: default_random_decree_chance(),
            world_event_after: default_world_event_after(),
            world_event_chance: default_world_event_chance(),
            floor3_nothing_chance: default_floor3_nothing_chance(),
            standing_decree_ticks: default_standing_decree_ticks(),
            party_excess_threshold: default_party_excess_threshold(),
        }
    }
}

/// Market configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketConfig {
    /// Supply at or below which a purchase raises the price.
    #[serde(default = "default_low_water")]
    pub low_water: u32,

    /// Price multiplier while scarce.
    #[serde(default = "default_scarce_multiplier")]
    pub scarce_multiplier: f64,

    /// Price multiplier when the last unit sells.
    #[serde(default = "default_sold_out_multiplier")]
    pub sold_out_multiplier: f64,

    /// Share of the current price paid to sellers.
    #[serde(default = "default_sell_ratio")]
    pub sell_ratio: f64,

    /// Supply above which sales back to the market relax the price.
    #[serde(default = "default_high_water")]
    pub high_water: u32,

    /// Restock tops up listings below this supply.
    #[serde(default = "default_restock_below")]
    pub restock_below: u32,

    /// Ticks between restocks.
    #[serde(default = "default_restock_interval")]
    pub restock_interval: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            low_water: default_low_water(),
            scarce_multiplier: default_scarce_multiplier(),
            sold_out_multiplier: default_sold_out_multiplier(),
            sell_ratio: default_sell_ratio(),
            high_water: default_high_water(),
            restock_below: default_restock_below(),
            restock_interval: default_restock_interval(),
        }
    }
}

impl MarketConfig {
    /// The engine-facing view of this section.
    pub const fn tuning(&self) -> MarketTuning {
        MarketTuning {
            low_water: self.low_water,
            scarce_multiplier: self.scarce_multiplier,
            sold_out_multiplier: self.sold_out_multiplier,
            sell_ratio: self.sell_ratio,
            high_water: self.high_water,
            restock_below: self.restock_below,
        }
    }
}

/// Voting configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PoliticsConfig {
    /// Minimum votes for any proposal to resolve.
    #[serde(default = "default_quorum_floor")]
    pub quorum_floor: usize,

    /// Share of the population that must vote.
    #[serde(default = "default_quorum_ratio")]
    pub quorum_ratio: f64,
}

impl Default for PoliticsConfig {
    fn default() -> Self {
        Self {
            quorum_floor: default_quorum_floor(),
            quorum_ratio: default_quorum_ratio(),
        }
    }
}

impl PoliticsConfig {
    /// The engine-facing quorum rule.
    pub const fn quorum(&self) -> QuorumRule {
        QuorumRule {
            floor: self.quorum_floor,
            ratio: self.quorum_ratio,
        }
    }
}

/// Collection caps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LimitsConfig {
    /// The event log is trimmed once it grows past this.
    #[serde(default = "default_event_log_cap")]
    pub event_log_cap: usize,

    /// Entries kept (newest first) when the event log is trimmed.
    #[serde(default = "default_event_log_trim_to")]
    pub event_log_trim_to: usize,

    /// Ledger entries retained.
    #[serde(default = "default_ledger_entries")]
    pub ledger_entries: usize,

    /// Board posts retained.
    #[serde(default = "default_board_posts")]
    pub board_posts: usize,

    /// Duel records retained.
    #[serde(default = "default_duel_history")]
    pub duel_history: usize,

    /// Party records retained.
    #[serde(default = "default_party_history")]
    pub party_history: usize,

    /// Decrees and world events retained, each.
    #[serde(default = "default_landlord_history")]
    pub landlord_history: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            event_log_cap: default_event_log_cap(),
            event_log_trim_to: default_event_log_trim_to(),
            ledger_entries: default_ledger_entries(),
            board_posts: default_board_posts(),
            duel_history: default_duel_history(),
            party_history: default_party_history(),
            landlord_history: default_landlord_history(),
        }
    }
}

/// Episode and season configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClockConfig {
    /// Ticks in one episode.
    #[serde(default = "default_ticks_per_episode")]
    pub ticks_per_episode: u64,

    /// Episodes in one season.
    #[serde(default = "default_episodes_per_season")]
    pub episodes_per_season: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            ticks_per_episode: default_ticks_per_episode(),
            episodes_per_season: default_episodes_per_season(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Whether JSON output was requested.
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Snapshot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Where the binary reads and writes the world snapshot.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Ticks between snapshot writes; 0 writes only on shutdown.
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            snapshot_interval_ticks: default_snapshot_interval_ticks(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    5000
}

const fn default_starting_func() -> u64 {
    100
}

const fn default_max_mutations() -> u32 {
    8
}

const fn default_max_age() -> u64 {
    30
}

const fn default_auto_spread_chance() -> f64 {
    0.4
}

const fn default_spicy_threshold() -> u8 {
    70
}

const fn default_spicy_mutation_chance() -> f64 {
    0.4
}

const fn default_high_chaos_threshold() -> f64 {
    7.0
}

const fn default_high_chaos_chance() -> f64 {
    0.4
}

const fn default_chaos_reduction() -> u32 {
    15
}

const fn default_gossip_overflow_threshold() -> usize {
    4
}

const fn default_gossip_overflow_chance() -> f64 {
    0.3
}

const fn default_max_gossip_chains() -> u32 {
    5
}

const fn default_periodic_interval() -> u64 {
    25
}

const fn default_random_decree_after() -> u64 {
    5
}

const fn default_random_decree_chance() -> f64 {
    0.08
}

const fn default_world_event_after() -> u64 {
    3
}

const fn default_world_event_chance() -> f64 {
    0.12
}

const fn default_floor3_nothing_chance() -> f64 {
    0.2
}

const fn default_standing_decree_ticks() -> u64 {
    10
}

const fn default_party_excess_threshold() -> usize {
    2
}

const fn default_low_water() -> u32 {
    2
}

const fn default_scarce_multiplier() -> f64 {
    1.3
}

const fn default_sold_out_multiplier() -> f64 {
    2.0
}

const fn default_sell_ratio() -> f64 {
    0.6
}

const fn default_high_water() -> u32 {
    8
}

const fn default_restock_below() -> u32 {
    3
}

const fn default_restock_interval() -> u64 {
    5
}

const fn default_quorum_floor() -> usize {
    3
}

const fn default_quorum_ratio() -> f64 {
    0.3
}

const fn default_event_log_cap() -> usize {
    1000
}

const fn default_event_log_trim_to() -> usize {
    500
}

const fn default_ledger_entries() -> usize {
    2000
}

const fn default_board_posts() -> usize {
    100
}

const fn default_duel_history() -> usize {
    200
}

const fn default_party_history() -> usize {
    100
}

const fn default_landlord_history() -> usize {
    50
}

const fn default_ticks_per_episode() -> u64 {
    50
}

const fn default_episodes_per_season() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> String {
    "pretty".to_owned()
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("monad-snapshot.json")
}

const fn default_snapshot_interval_ticks() -> u64 {
    50
}
