//! Shared entity model for The Monad world simulation.
//!
//! This crate is the single source of truth for every entity the world
//! owns. Types flow downstream to `TypeScript` via `ts-rs` for whatever
//! transport sits in front of the engine.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Closed vocabularies with stable wire names
//! - [`structs`] -- Agents, rumor chains, parties, decrees, proposals, trades, quests
//! - [`events`] -- The typed world event log

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    Achievement, DecreeKind, Faction, LeaderboardMetric, LedgerEntryKind, Location, LocationKind,
    Mood, ParseEnumError, Personality, ProposalKind, ProposalStatus, QuestStatus, Rarity, Stat,
    TradeStatus, Vibe, WorldEventKind,
};
pub use events::{EventKind, LogEvent};
pub use ids::{
    AgentId, ArtifactId, ChainId, DecreeId, DuelId, EventId, LedgerEntryId, PartyId, PostId,
    ProposalId, QuestId, TradeId, WorldEventId,
};
pub use structs::{
    AFFINITY_MAX, AFFINITY_MIN, ActiveModifier, Agent, Artifact, BoardPost, Chain, ChainLink,
    Decree, DuelRecord, DuelRound, DuelTally, EventEffect, LedgerEntry, MarketListing, Modifier,
    PartyRecord, PartyState, Proposal, Quest, QuestRewards, QuestStep, RELATIONSHIP_HISTORY_CAP,
    Relationship, RelationshipNote, TradeAsset, TradeOffer, Vote, WorldEvent,
};

#[cfg(test)]
mod tests {
    //! Triggers `TypeScript` binding generation for the exported types.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::AgentId::export_all();
        let _ = crate::ids::ChainId::export_all();
        let _ = crate::enums::Personality::export_all();
        let _ = crate::enums::Location::export_all();
        let _ = crate::structs::Agent::export_all();
        let _ = crate::structs::Chain::export_all();
        let _ = crate::structs::PartyRecord::export_all();
        let _ = crate::structs::DuelRecord::export_all();
        let _ = crate::structs::Proposal::export_all();
        let _ = crate::structs::TradeOffer::export_all();
        let _ = crate::structs::Quest::export_all();
        let _ = crate::events::LogEvent::export_all();
    }
}
