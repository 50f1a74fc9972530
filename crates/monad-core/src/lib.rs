//! World orchestration for The Monad.
//!
//! This crate owns the mutable world: residents, the FUNC ledger, rumor
//! chains, politics, the market, quests and the Landlord. Every change
//! arrives as a [`Command`] through [`World::execute`]; the clock moves
//! only through [`World::advance_tick`], which runs the Landlord, spreads
//! gossip, resolves proposals and restocks the market.
//!
//! # Modules
//!
//! - [`actions`] -- Command handlers behind [`World::execute`].
//! - [`clock`] -- Tick, episode and season counters.
//! - [`command`] -- The [`Command`] surface, outcomes and error categories.
//! - [`config`] -- Configuration loading from `monad-config.yaml`.
//! - [`landlord`] -- The rule evaluator that issues decrees and events.
//! - [`snapshot`] -- Whole-world export and restore.
//! - [`tick`] -- The per-tick cycle and its [`TickSummary`].
//! - [`world`] -- The [`World`] itself and its read-only queries.

pub mod actions;
pub mod clock;
pub mod command;
pub mod config;
pub mod landlord;
pub mod snapshot;
pub mod tick;
pub mod world;

pub use clock::{ClockError, ClockState, WorldClock};
pub use command::{Command, CommandError, CommandOutcome, parse_input};
pub use config::{ConfigError, MonadConfig};
pub use landlord::{Landlord, LandlordOutput, LandlordState};
pub use snapshot::WorldSnapshot;
pub use tick::{TickError, TickSummary};
pub use world::{World, WorldError};
