//! Behavioral engines for The Monad.
//!
//! Everything here operates on borrowed entity state from `monad-types`
//! without touching I/O or the clock. The world orchestrator in
//! `monad-core` owns the state and calls into these engines one operation
//! at a time; every random draw goes through an injected [`Dice`].
//!
//! # Modules
//!
//! - [`agent`] -- Creation, stat bounds and mood shifts
//! - [`combat`] -- Best-of-three duel resolution
//! - [`dice`] -- The [`Dice`] trait and deterministic [`ScriptedDice`]
//! - [`exploration`] -- Artifacts, hidden rooms, lore and the [`QuestBoard`]
//! - [`market`] -- Catalog pricing and peer-to-peer trades ([`Marketplace`])
//! - [`party`] -- Left-to-right vibe composition
//! - [`politics`] -- Factions, proposals, votes and alliances ([`Politics`])
//! - [`rumor`] -- Rumor chains and the bind step ([`RumorMill`])
//! - [`social`] -- Two-way relationship bonds

pub mod agent;
pub mod combat;
pub mod dice;
pub mod exploration;
pub mod market;
pub mod party;
pub mod politics;
pub mod rumor;
pub mod social;

// Re-export primary types at crate root for convenience.
pub use agent::{ARTIFACT_STAT_CAP, STAT_MAX, STAT_MIN, create_agent, shift_mood, valid_name};
pub use dice::{Dice, ScriptedDice};
pub use exploration::{Discovery, QuestBoard, QuestError, StepOutcome, explore, visit_tag};
pub use market::{MarketError, MarketTuning, Marketplace, Purchase, Sale, TradeReceipt};
pub use party::{Composition, PartyError, compose};
pub use politics::{Alliance, FactionInfo, JoinOutcome, Politics, PoliticsError, QuorumRule};
pub use rumor::{RumorError, RumorMill, RumorTuning};
pub use social::{BondChange, bond, pair_mut};
