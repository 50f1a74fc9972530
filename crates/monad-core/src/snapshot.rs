//! Whole-world snapshots.
//!
//! A [`WorldSnapshot`] is a plain serde value holding everything needed
//! to rebuild an equivalent world: residents in registration order, the
//! ledger totals, rumors, politics, the market, quests, artifacts, the
//! Landlord's memory and the recent histories. The event log and the
//! dice are not part of it; a restored world starts a fresh log and is
//! reseeded by the caller.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use monad_agents::{Marketplace, Politics, QuestBoard, RumorMill};
use monad_ledger::{ConservationResult, Ledger, LedgerTotals};
use monad_types::{Agent, Artifact, BoardPost, Chain, DuelRecord, PartyRecord, Quest};

use crate::clock::{ClockState, WorldClock};
use crate::config::MonadConfig;
use crate::landlord::{Landlord, LandlordState};
use crate::world::{World, WorldError, validate_config};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything needed to rebuild a world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Crate version that wrote the snapshot.
    pub version: String,
    /// When the snapshot was taken.
    pub created_at: DateTime<Utc>,
    /// Clock position.
    pub clock: ClockState,
    /// Residents, in registration order.
    pub agents: Vec<Agent>,
    /// Lifetime FUNC totals.
    pub ledger: LedgerTotals,
    /// Chains still spreading.
    pub active_chains: Vec<Chain>,
    /// Retired chains, oldest first.
    pub completed_chains: Vec<Chain>,
    /// Factions, proposals and alliances.
    pub politics: Politics,
    /// Listings and trade offers.
    pub market: Marketplace,
    /// Every quest instance.
    pub quests: Vec<Quest>,
    /// Every artifact found.
    pub artifacts: Vec<Artifact>,
    /// Decrees, events and modifiers.
    pub landlord: LandlordState,
    /// Board posts, oldest first.
    pub board: Vec<BoardPost>,
    /// Recent duels, oldest first.
    #[serde(default)]
    pub duels: Vec<DuelRecord>,
    /// Recent parties, oldest first.
    #[serde(default)]
    pub parties: Vec<PartyRecord>,
}

impl World {
    /// Capture the world as a snapshot.
    pub fn export_snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            version: SNAPSHOT_VERSION.to_owned(),
            created_at: Utc::now(),
            clock: self.clock.state(),
            agents: self.agents().cloned().collect(),
            ledger: self.ledger.totals(),
            active_chains: self.rumors.active().cloned().collect(),
            completed_chains: self.rumors.completed().cloned().collect(),
            politics: self.politics.clone(),
            market: self.market.clone(),
            quests: self.quests.all().cloned().collect(),
            artifacts: self.artifacts.clone(),
            landlord: self.landlord.state(),
            board: self.board.iter().cloned().collect(),
            duels: self.duels.iter().cloned().collect(),
            parties: self.parties.iter().cloned().collect(),
        }
    }

    /// Rebuild a world from a snapshot, reseeding the dice with `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] or [`WorldError::Clock`] for a
    /// bad configuration or clock position, and [`WorldError::Snapshot`]
    /// when the snapshot contradicts itself: duplicate residents, or
    /// balances that do not add up to the ledger totals.
    pub fn from_snapshot(config: MonadConfig, snapshot: WorldSnapshot, seed: u64) -> Result<Self, WorldError> {
        validate_config(&config)?;
        let clock = WorldClock::from_parts(snapshot.clock, &config.clock)?;

        let mut seen = BTreeSet::new();
        let mut roster = Vec::with_capacity(snapshot.agents.len());
        let mut agents = BTreeMap::new();
        for agent in snapshot.agents {
            if !seen.insert(agent.id) {
                return Err(WorldError::Snapshot {
                    reason: format!("agent {} appears twice", agent.id),
                });
            }
            roster.push(agent.id);
            agents.insert(agent.id, agent);
        }

        let ledger = Ledger::from_totals(config.limits.ledger_entries, snapshot.ledger);
        if let ConservationResult::Anomaly(anomaly) = ledger.verify_conservation(clock.tick(), agents.values()) {
            return Err(WorldError::Snapshot {
                reason: anomaly.message,
            });
        }

        let mut board: VecDeque<BoardPost> = snapshot.board.into();
        while board.len() > config.limits.board_posts {
            board.pop_front();
        }
        let mut duels: VecDeque<DuelRecord> = snapshot.duels.into();
        while duels.len() > config.limits.duel_history {
            duels.pop_front();
        }
        let mut parties: VecDeque<PartyRecord> = snapshot.parties.into();
        while parties.len() > config.limits.party_history {
            parties.pop_front();
        }

        info!(
            tick = clock.tick(),
            agents = roster.len(),
            version = %snapshot.version,
            taken = %snapshot.created_at,
            "world restored from snapshot"
        );
        Ok(Self {
            clock,
            rng: SmallRng::seed_from_u64(seed),
            agents,
            roster,
            ledger,
            rumors: RumorMill::from_parts(snapshot.active_chains, snapshot.completed_chains),
            politics: snapshot.politics,
            market: snapshot.market,
            quests: QuestBoard::from_quests(snapshot.quests),
            artifacts: snapshot.artifacts,
            landlord: Landlord::restore(config.limits.landlord_history, snapshot.landlord),
            board,
            duels,
            parties,
            events: Vec::new(),
            config,
        })
    }
}
