//! The world: every entity, the clock and the seeded dice in one value.
//!
//! A [`World`] is the only place state lives. Commands mutate it through
//! [`World::execute`], the tick cycle through [`World::advance_tick`], and
//! everything else reads it through the query methods below. Multiple
//! worlds can coexist; nothing is global.

use std::collections::{BTreeMap, VecDeque};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use monad_agents::exploration::{quest_template, roll_artifact};
use monad_agents::{Dice, FactionInfo, Marketplace, Politics, QuestBoard, RumorMill, StepOutcome};
use monad_ledger::{FuncReward, Ledger, LeaderboardEntry, leaderboard};
use monad_types::{
    Achievement, ActiveModifier, Agent, AgentId, Artifact, BoardPost, Chain, DuelRecord,
    EventKind, LeaderboardMetric, Location, LogEvent, PartyRecord, Proposal, Quest, QuestId,
    QuestRewards, Rarity, TradeOffer,
};

use crate::clock::{ClockError, WorldClock};
use crate::command::CommandError;
use crate::config::MonadConfig;
use crate::landlord::Landlord;

/// Errors that prevent a world from being built.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A configuration value makes the world unusable.
    #[error("invalid world configuration: {reason}")]
    InvalidConfig {
        /// What is wrong.
        reason: String,
    },

    /// The clock could not be built.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A snapshot could not be restored.
    #[error("invalid snapshot: {reason}")]
    Snapshot {
        /// What is wrong.
        reason: String,
    },
}

/// The whole simulation.
#[derive(Debug)]
pub struct World {
    pub(crate) config: MonadConfig,
    pub(crate) clock: WorldClock,
    pub(crate) rng: SmallRng,
    pub(crate) agents: BTreeMap<AgentId, Agent>,
    /// Agent ids in registration order.
    pub(crate) roster: Vec<AgentId>,
    pub(crate) ledger: Ledger,
    pub(crate) rumors: RumorMill,
    pub(crate) politics: Politics,
    pub(crate) market: Marketplace,
    pub(crate) quests: QuestBoard,
    pub(crate) artifacts: Vec<Artifact>,
    pub(crate) landlord: Landlord,
    pub(crate) board: VecDeque<BoardPost>,
    pub(crate) duels: VecDeque<DuelRecord>,
    pub(crate) parties: VecDeque<PartyRecord>,
    pub(crate) events: Vec<LogEvent>,
}

/// Reject configurations the world cannot run with.
pub(crate) fn validate_config(config: &MonadConfig) -> Result<(), WorldError> {
    let limits = &config.limits;
    let caps = [
        ("limits.event_log_cap", limits.event_log_cap),
        ("limits.event_log_trim_to", limits.event_log_trim_to),
        ("limits.ledger_entries", limits.ledger_entries),
        ("limits.board_posts", limits.board_posts),
        ("limits.duel_history", limits.duel_history),
        ("limits.party_history", limits.party_history),
        ("limits.landlord_history", limits.landlord_history),
    ];
    if let Some((name, _)) = caps.iter().find(|(_, cap)| *cap == 0) {
        return Err(WorldError::InvalidConfig {
            reason: format!("{name} must be at least 1"),
        });
    }
    if limits.event_log_trim_to > limits.event_log_cap {
        return Err(WorldError::InvalidConfig {
            reason: "limits.event_log_trim_to cannot exceed limits.event_log_cap".to_owned(),
        });
    }
    if config.market.restock_interval == 0 {
        return Err(WorldError::InvalidConfig {
            reason: "market.restock_interval must be at least 1".to_owned(),
        });
    }

    let chances = [
        ("rumor.auto_spread_chance", config.rumor.auto_spread_chance),
        ("rumor.spicy_mutation_chance", config.rumor.spicy_mutation_chance),
        ("landlord.high_chaos_chance", config.landlord.high_chaos_chance),
        ("landlord.gossip_overflow_chance", config.landlord.gossip_overflow_chance),
        ("landlord.random_decree_chance", config.landlord.random_decree_chance),
        ("landlord.world_event_chance", config.landlord.world_event_chance),
        ("landlord.floor3_nothing_chance", config.landlord.floor3_nothing_chance),
        ("politics.quorum_ratio", config.politics.quorum_ratio),
    ];
    if let Some((name, value)) = chances.iter().find(|(_, p)| !(0.0..=1.0).contains(p)) {
        return Err(WorldError::InvalidConfig {
            reason: format!("{name} must be within 0..=1, got {value}"),
        });
    }
    Ok(())
}

impl World {
    /// Build an empty world from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] for zero caps or
    /// out-of-range probabilities, or [`WorldError::Clock`] for zero
    /// episode or season lengths.
    pub fn new(config: MonadConfig) -> Result<Self, WorldError> {
        validate_config(&config)?;
        let clock = WorldClock::new(&config.clock)?;
        let mut rng = SmallRng::seed_from_u64(config.world.seed);
        let market = Marketplace::new(config.market.tuning(), &mut rng);

        info!(seed = config.world.seed, "world created");
        Ok(Self {
            clock,
            rng,
            agents: BTreeMap::new(),
            roster: Vec::new(),
            ledger: Ledger::new(config.limits.ledger_entries),
            rumors: RumorMill::new(),
            politics: Politics::new(config.politics.quorum()),
            market,
            quests: QuestBoard::new(),
            artifacts: Vec::new(),
            landlord: Landlord::new(config.limits.landlord_history),
            board: VecDeque::new(),
            duels: VecDeque::new(),
            parties: VecDeque::new(),
            events: Vec::new(),
            config,
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The configuration the world runs with.
    pub const fn config(&self) -> &MonadConfig {
        &self.config
    }

    /// Current tick.
    pub const fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// The world clock.
    pub const fn clock(&self) -> &WorldClock {
        &self.clock
    }

    /// One agent.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Every agent, in registration order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.roster.iter().filter_map(|id| self.agents.get(id))
    }

    /// Agents at a location, in registration order.
    pub fn occupants(&self, location: Location) -> Vec<&Agent> {
        self.agents()
            .filter(|agent| agent.location == location)
            .collect()
    }

    /// Rumor chains still spreading.
    pub fn active_chains(&self) -> impl Iterator<Item = &Chain> {
        self.rumors.active()
    }

    /// Retired rumor chains, oldest first.
    pub fn retired_chains(&self) -> impl Iterator<Item = &Chain> {
        self.rumors.completed()
    }

    /// Look up a chain, active or retired.
    pub fn chain(&self, id: monad_types::ChainId) -> Option<&Chain> {
        self.rumors.get(id)
    }

    /// Board posts, oldest first.
    pub fn board(&self) -> impl Iterator<Item = &BoardPost> {
        self.board.iter()
    }

    /// Every faction with its leader, members and allies.
    pub fn faction_info(&self) -> Vec<FactionInfo> {
        self.politics.faction_info()
    }

    /// Every proposal, in creation order.
    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.politics.proposals()
    }

    /// One proposal.
    pub fn proposal(&self, id: monad_types::ProposalId) -> Option<&Proposal> {
        self.politics.proposal(id)
    }

    /// The marketplace.
    pub const fn market(&self) -> &Marketplace {
        &self.market
    }

    /// Offers awaiting a buyer.
    pub fn open_trades(&self) -> impl Iterator<Item = &TradeOffer> {
        self.market.open_offers()
    }

    /// Recent duels, oldest first.
    pub fn duel_history(&self) -> impl Iterator<Item = &DuelRecord> {
        self.duels.iter()
    }

    /// Recent parties, oldest first.
    pub fn party_history(&self) -> impl Iterator<Item = &PartyRecord> {
        self.parties.iter()
    }

    /// Every quest instance.
    pub fn quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.all()
    }

    /// One quest.
    pub fn quest(&self, id: QuestId) -> Option<&Quest> {
        self.quests.get(id)
    }

    /// Every artifact found so far.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Agents ranked by a metric. Ties keep registration order.
    pub fn leaderboard(&self, metric: LeaderboardMetric, limit: usize) -> Vec<LeaderboardEntry> {
        leaderboard(self.agents(), metric, limit)
    }

    /// The event log, oldest first.
    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    /// Landlord modifiers in force.
    pub fn active_modifiers(&self) -> &[ActiveModifier] {
        self.landlord.modifiers()
    }

    /// The Landlord's memory.
    pub const fn landlord(&self) -> &Landlord {
        &self.landlord
    }

    /// The FUNC ledger.
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // -----------------------------------------------------------------------
    // Shared mutation helpers
    // -----------------------------------------------------------------------

    /// Append to the event log.
    pub(crate) fn record(&mut self, event: LogEvent) {
        self.events.push(event);
    }

    /// Keep the newest `event_log_trim_to` events once the log passes its cap.
    pub(crate) fn trim_events(&mut self) {
        let limits = &self.config.limits;
        if self.events.len() > limits.event_log_cap {
            let excess = self.events.len().saturating_sub(limits.event_log_trim_to);
            self.events.drain(..excess);
            debug!(kept = self.events.len(), "event log trimmed");
        }
    }

    /// Parties thrown during `tick`.
    pub(crate) fn parties_at(&self, tick: u64) -> usize {
        self.parties.iter().filter(|party| party.tick == tick).count()
    }

    /// Report an action tag against every quest the agent holds, paying
    /// out any quest it completes.
    pub(crate) fn report(&mut self, agent_id: AgentId, tag: &str) {
        let tick = self.clock.tick();
        let Some(agent) = self.agents.get_mut(&agent_id) else {
            return;
        };
        let moved = self.quests.progress(agent, tag);
        for (quest_id, outcome) in moved {
            match outcome {
                StepOutcome::Advanced { next } => {
                    self.record(
                        LogEvent::new(tick, EventKind::QuestAdvanced)
                            .with_agent("agent", agent_id)
                            .with("quest", quest_id.to_string())
                            .with("action", tag)
                            .with("step", next),
                    );
                }
                StepOutcome::Completed(rewards) => self.pay_quest(agent_id, quest_id, &rewards),
                StepOutcome::NoMatch => {}
            }
        }
    }

    /// Pay a completed quest's rewards.
    pub(crate) fn pay_quest(&mut self, agent_id: AgentId, quest_id: QuestId, rewards: &QuestRewards) {
        let tick = self.clock.tick();
        let legendary = self
            .quests
            .get(quest_id)
            .and_then(|quest| quest_template(&quest.template))
            .is_some_and(|template| template.legendary);
        let Some(agent) = self.agents.get_mut(&agent_id) else {
            return;
        };

        if rewards.func > 0 {
            if let Err(err) = self.ledger.mint(agent, rewards.func, FuncReward::QuestReward.as_str(), tick) {
                warn!(tick, agent = %agent_id, quest = %quest_id, error = %err, "quest FUNC not paid");
            }
        }
        Ledger::add_clout(agent, rewards.clout);
        if let Some(total) = agent.mon_earned.checked_add(rewards.mon) {
            agent.mon_earned = total;
        }
        unlock(agent, Achievement::QuestComplete, tick, &mut self.events);
        if legendary {
            unlock(agent, Achievement::QuestLegendary, tick, &mut self.events);
        }

        let mut bonus = None;
        if rewards.artifact_chance > 0 && self.rng.chance(f64::from(rewards.artifact_chance) / 100.0) {
            bonus = roll_artifact(agent, tick, &mut self.rng);
            if let Some(artifact) = &bonus {
                found_artifact(agent, artifact, tick, &mut self.events);
            }
        }

        self.events.push(
            LogEvent::new(tick, EventKind::QuestCompleted)
                .with_agent("agent", agent_id)
                .with("quest", quest_id.to_string())
                .with("func", rewards.func)
                .with("clout", rewards.clout)
                .with("mon", rewards.mon.to_string())
                .with("bonus_artifact", bonus.is_some()),
        );
        self.artifacts.extend(bonus);
    }
}

/// Credit an achievement and log it if anything changed.
pub(crate) fn unlock(agent: &mut Agent, achievement: Achievement, tick: u64, events: &mut Vec<LogEvent>) -> bool {
    let Some(mon) = Ledger::grant_achievement(agent, achievement) else {
        return false;
    };
    info!(tick, agent = %agent.id, achievement = %achievement, "achievement unlocked");
    events.push(
        LogEvent::new(tick, EventKind::AchievementUnlocked)
            .with_agent("agent", agent.id)
            .with("achievement", achievement.as_str())
            .with("mon", mon.to_string()),
    );
    true
}

/// Credit the achievements for finding an artifact.
pub(crate) fn found_artifact(agent: &mut Agent, artifact: &Artifact, tick: u64, events: &mut Vec<LogEvent>) {
    unlock(agent, Achievement::ExplorationArtifact, tick, events);
    if artifact.rarity == Rarity::Legendary {
        unlock(agent, Achievement::ExplorationLegendary, tick, events);
    }
}

/// Borrow one agent or report it missing.
pub(crate) fn agent_ref(agents: &BTreeMap<AgentId, Agent>, id: AgentId) -> Result<&Agent, CommandError> {
    agents.get(&id).ok_or_else(|| CommandError::agent(id))
}

/// Borrow one agent mutably or report it missing.
pub(crate) fn agent_mut(agents: &mut BTreeMap<AgentId, Agent>, id: AgentId) -> Result<&mut Agent, CommandError> {
    agents.get_mut(&id).ok_or_else(|| CommandError::agent(id))
}

/// Borrow two distinct agents mutably, reporting which one is missing.
pub(crate) fn pair(
    agents: &mut BTreeMap<AgentId, Agent>,
    a: AgentId,
    b: AgentId,
) -> Result<(&mut Agent, &mut Agent), CommandError> {
    if a == b {
        return Err(CommandError::input(b.to_string(), "an agent cannot target themselves"));
    }
    for id in [a, b] {
        if !agents.contains_key(&id) {
            return Err(CommandError::agent(id));
        }
    }
    monad_agents::pair_mut(agents, a, b).ok_or_else(|| CommandError::agent(b))
}

/// Ids of agents at `location` other than `except`, in id order.
pub(crate) fn others_at(agents: &BTreeMap<AgentId, Agent>, location: Location, except: AgentId) -> Vec<AgentId> {
    monad_agents::social::occupants(agents, location, Some(except))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use monad_types::Personality;

    use super::*;
    use crate::command::{Command, CommandOutcome};

    fn register(world: &mut World, name: &str, personality: Personality) -> AgentId {
        match world
            .execute(Command::RegisterAgent {
                name: name.to_owned(),
                personality,
            })
            .unwrap()
        {
            CommandOutcome::Registered { agent } => agent,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn new_world_is_empty() {
        let world = World::new(MonadConfig::default()).unwrap();
        assert_eq!(world.tick(), 0);
        assert_eq!(world.agents().count(), 0);
        assert_eq!(world.quests().count(), 7);
        assert_eq!(world.market().listings().len(), 12);
        assert!(world.events().is_empty());
    }

    #[test]
    fn zero_caps_are_rejected() {
        let mut config = MonadConfig::default();
        config.limits.event_log_cap = 0;
        assert!(matches!(World::new(config), Err(WorldError::InvalidConfig { .. })));

        let mut config = MonadConfig::default();
        config.limits.event_log_trim_to = 2000;
        assert!(World::new(config).is_err());

        let mut config = MonadConfig::default();
        config.clock.ticks_per_episode = 0;
        assert!(matches!(World::new(config), Err(WorldError::Clock { .. })));

        let mut config = MonadConfig::default();
        config.rumor.auto_spread_chance = 1.5;
        assert!(World::new(config).is_err());
    }

    #[test]
    fn agents_iterate_in_registration_order() {
        let mut world = World::new(MonadConfig::default()).unwrap();
        let zed = register(&mut world, "Zed", Personality::Nerd);
        let amy = register(&mut world, "Amy", Personality::Schemer);
        let order: Vec<AgentId> = world.agents().map(|agent| agent.id).collect();
        assert_eq!(order, vec![zed, amy]);
        assert_eq!(world.occupants(Location::Lobby).len(), 2);
    }

    #[test]
    fn event_log_is_trimmed_to_the_newest_entries() {
        let mut config = MonadConfig::default();
        config.limits.event_log_cap = 10;
        config.limits.event_log_trim_to = 4;
        let mut world = World::new(config).unwrap();
        for n in 0..11_u64 {
            world.record(LogEvent::new(n, EventKind::TickAdvanced));
        }
        world.trim_events();
        let ticks: Vec<u64> = world.events().iter().map(|event| event.tick).collect();
        assert_eq!(ticks, vec![7, 8, 9, 10]);
    }

    #[test]
    fn pair_reports_missing_and_self_targets() {
        let mut world = World::new(MonadConfig::default()).unwrap();
        let amy = register(&mut world, "Amy", Personality::Schemer);
        let ghost = AgentId::new();

        let err = pair(&mut world.agents, amy, ghost).map(|_| ()).unwrap_err();
        assert_eq!(err, CommandError::agent(ghost));
        let err = pair(&mut world.agents, amy, amy).map(|_| ()).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }
}
