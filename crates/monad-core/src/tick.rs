//! Tick cycle: the phases that move the building forward one step.
//!
//! Each tick runs, in order:
//!
//! 1. **Clock** -- advance the tick, rolling episodes and seasons.
//! 2. **Landlord** -- evaluate the rules, record what was issued and apply
//!    the mechanical effects of decrees and world events.
//! 3. **Expiry** -- drop modifiers whose time is up.
//! 4. **Rumors** -- active chains may spread to someone standing near the
//!    latest teller; chains that have run their course retire.
//! 5. **Moods** -- residents drift toward the mood their surroundings
//!    encourage.
//! 6. **Milestones** -- clout thresholds unlock achievements.
//! 7. **Votes** -- proposals that reached quorum resolve.
//! 8. **Market** -- restock on the configured interval.
//! 9. **Bookkeeping** -- trim the event log and check FUNC conservation.
//!
//! Given the same world and seed, a tick is deterministic.

use tracing::{debug, info, warn};

use monad_agents::agent::offset_stat;
use monad_agents::rumor::RumorTuning;
use monad_agents::{ARTIFACT_STAT_CAP, Dice, STAT_MIN, shift_mood};
use monad_ledger::ConservationResult;
use monad_ledger::rewards::CLOUT_MILESTONES;
use monad_types::{
    AgentId, ChainId, Decree, DecreeKind, EventEffect, EventKind, Location, LocationKind,
    LogEvent, Modifier, Mood, ProposalId, ProposalStatus, Stat, WorldEvent, WorldEventKind,
};

use crate::clock::ClockError;
use crate::command::CommandError;
use crate::landlord::{self, LandlordInput, LandlordOutput};
use crate::world::{World, others_at, unlock};

/// Chance per resident per tick of a mood drift roll.
pub const MOOD_DRIFT_CHANCE: f64 = 0.1;

/// Chaos stat change for every resident when the Landlord cracks down.
pub const CRACKDOWN_CHAOS: i32 = -1;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

impl From<TickError> for CommandError {
    fn from(err: TickError) -> Self {
        match err {
            TickError::Clock { source } => source.into(),
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// The tick that ran.
    pub tick: u64,
    /// Episode after the tick.
    pub episode: u64,
    /// Season after the tick.
    pub season: u64,
    /// A new episode began.
    pub new_episode: bool,
    /// A new season began.
    pub new_season: bool,
    /// Decrees the Landlord issued.
    pub decrees: Vec<DecreeKind>,
    /// World events the Landlord triggered.
    pub events: Vec<WorldEventKind>,
    /// Modifiers that expired.
    pub expired: usize,
    /// Rumor retellings that happened on their own.
    pub spreads: usize,
    /// Chains retired this tick.
    pub retired: Vec<ChainId>,
    /// Proposals resolved this tick.
    pub resolved: Vec<(ProposalId, ProposalStatus)>,
    /// Residents whose mood drifted.
    pub mood_shifts: usize,
    /// Milestone achievements unlocked.
    pub achievements: usize,
    /// Market listings restocked.
    pub restocked: usize,
    /// FUNC balances matched the ledger.
    pub balanced: bool,
}

/// The mood a location kind pulls toward, and how hard.
const fn drift_target(kind: LocationKind) -> Option<(Mood, f64)> {
    match kind {
        LocationKind::Maybe => Some((Mood::Anxious, 0.3)),
        LocationKind::Either => Some((Mood::Scheming, 0.3)),
        LocationKind::List => Some((Mood::Excited, 0.3)),
        LocationKind::Bottom => Some((Mood::Suspicious, 0.5)),
        LocationKind::Io | LocationKind::Identity | LocationKind::NaturalTransformation => None,
    }
}

/// Whether an effect scoped to `scope` reaches someone at `at`.
fn in_scope(scope: Option<Location>, at: Location) -> bool {
    scope.is_none_or(|location| location == at)
}

impl World {
    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Clock`] if the clock cannot advance; nothing
    /// else in the world changes in that case.
    pub fn advance_tick(&mut self) -> Result<TickSummary, TickError> {
        // --- Phase 1: Clock ---
        let advance = self.clock.advance()?;
        let tick = advance.tick;
        let mut summary = TickSummary {
            tick,
            episode: self.clock.episode(),
            season: self.clock.season(),
            new_episode: advance.new_episode,
            new_season: advance.new_season,
            decrees: Vec::new(),
            events: Vec::new(),
            expired: 0,
            spreads: 0,
            retired: Vec::new(),
            resolved: Vec::new(),
            mood_shifts: 0,
            achievements: 0,
            restocked: 0,
            balanced: true,
        };

        // --- Phase 2: Landlord ---
        self.phase_landlord(&mut summary);

        // --- Phase 3: Expiry ---
        for modifier in self.landlord.expire(tick) {
            self.record(
                LogEvent::new(tick, EventKind::ModifierExpired)
                    .with("decree", modifier.decree.to_string())
                    .with("kind", modifier.kind.as_str()),
            );
            summary.expired = summary.expired.saturating_add(1);
        }

        // --- Phase 4: Rumors ---
        self.phase_rumors(&mut summary);

        // --- Phase 5: Moods ---
        summary.mood_shifts = self.phase_moods();

        // --- Phase 6: Milestones ---
        summary.achievements = self.phase_milestones();

        // --- Phase 7: Votes ---
        summary.resolved = self.politics.resolve_all(self.agents.len(), tick);
        for (proposal_id, status) in &summary.resolved {
            let result = self
                .politics
                .proposal(*proposal_id)
                .and_then(|proposal| proposal.result.clone())
                .unwrap_or_default();
            self.record(
                LogEvent::new(tick, EventKind::ProposalResolved)
                    .with("proposal", proposal_id.to_string())
                    .with("status", status.as_str())
                    .with("result", result),
            );
        }

        // --- Phase 8: Market ---
        if tick.checked_rem(self.config.market.restock_interval) == Some(0) {
            summary.restocked = self.market.restock();
            debug!(tick, restocked = summary.restocked, "market restocked");
        }

        // --- Phase 9: Bookkeeping ---
        if let ConservationResult::Anomaly(anomaly) = self.ledger.verify_conservation(tick, self.agents.values()) {
            warn!(tick, expected = %anomaly.expected, actual = %anomaly.actual, "{}", anomaly.message);
            summary.balanced = false;
        }
        if summary.new_episode {
            info!(tick, episode = summary.episode, season = summary.season, "new episode");
            self.record(
                LogEvent::new(tick, EventKind::EpisodeAdvanced)
                    .with("episode", summary.episode)
                    .with("season", summary.season)
                    .with("new_season", summary.new_season),
            );
        }
        self.record(
            LogEvent::new(tick, EventKind::TickAdvanced)
                .with("decrees", summary.decrees.len())
                .with("events", summary.events.len())
                .with("spreads", summary.spreads)
                .with("resolved", summary.resolved.len()),
        );
        self.trim_events();

        info!(
            tick,
            decrees = summary.decrees.len(),
            events = summary.events.len(),
            spreads = summary.spreads,
            retired = summary.retired.len(),
            resolved = summary.resolved.len(),
            "tick complete"
        );
        Ok(summary)
    }

    // -----------------------------------------------------------------------
    // Landlord
    // -----------------------------------------------------------------------

    fn phase_landlord(&mut self, summary: &mut TickSummary) {
        let tick = summary.tick;
        let input = LandlordInput {
            tick,
            avg_chaos: self.average_chaos(),
            active_chains: self.rumors.active_count(),
            recent_parties: self.parties_at(tick.saturating_sub(1)),
        };
        let outputs = landlord::evaluate(&input, &self.config.landlord, &mut self.rng);
        for output in outputs {
            self.landlord.record(&output);
            match output {
                LandlordOutput::Decree(decree) => {
                    self.apply_decree(&decree);
                    summary.decrees.push(decree.kind);
                }
                LandlordOutput::Event(event) => {
                    self.apply_event(&event, summary);
                    summary.events.push(event.kind);
                }
            }
        }
    }

    fn average_chaos(&self) -> f64 {
        let Ok(count) = u32::try_from(self.agents.len()) else {
            return 0.0;
        };
        if count == 0 {
            return 0.0;
        }
        let total: u32 = self
            .agents
            .values()
            .fold(0_u32, |sum, agent| sum.saturating_add(agent.stat(Stat::Chaos)));
        f64::from(total) / f64::from(count)
    }

    fn apply_decree(&mut self, decree: &Decree) {
        let tick = decree.issued_tick;
        if matches!(decree.modifier, Some(Modifier::ChaosReduction(_))) {
            for agent in self.agents.values_mut() {
                let lowered = offset_stat(agent.stat(Stat::Chaos), CRACKDOWN_CHAOS, STAT_MIN, ARTIFACT_STAT_CAP);
                agent.set_stat(Stat::Chaos, lowered);
            }
        }
        self.record(
            LogEvent::new(tick, EventKind::Decree)
                .with("decree", decree.id.to_string())
                .with("kind", decree.kind.as_str())
                .with("content", decree.content.clone())
                .with("duration", decree.duration.unwrap_or(0)),
        );
    }

    fn apply_event(&mut self, event: &WorldEvent, summary: &mut TickSummary) {
        let tick = event.tick;
        let scope = event.location;
        for effect in &event.effects {
            match effect {
                EventEffect::MoveAllTo(location) => {
                    for agent in self.agents.values_mut() {
                        agent.location = *location;
                    }
                }
                EventEffect::ChaosMod(delta) => {
                    for agent in self.agents.values_mut().filter(|agent| in_scope(scope, agent.location)) {
                        let shifted = offset_stat(agent.stat(Stat::Chaos), *delta, STAT_MIN, ARTIFACT_STAT_CAP);
                        agent.set_stat(Stat::Chaos, shifted);
                    }
                }
                EventEffect::MoodShift(mood) => {
                    for agent in self.agents.values_mut().filter(|agent| in_scope(scope, agent.location)) {
                        agent.mood = *mood;
                    }
                }
                EventEffect::ItemSpawn(item) => {
                    let nearby: Vec<AgentId> = self
                        .agents()
                        .filter(|agent| in_scope(scope, agent.location))
                        .map(|agent| agent.id)
                        .collect();
                    let lucky = self.rng.pick(&nearby).copied();
                    if let Some(agent) = lucky.and_then(|id| self.agents.get_mut(&id)) {
                        agent.inventory.push(item.clone());
                    }
                }
                EventEffect::GossipTrigger => {
                    let spiciest = self.rumors.spiciest().map(|chain| chain.id);
                    let tuning = self.config.rumor.tuning();
                    if let Some((chain_id, (tail, nearby))) =
                        spiciest.and_then(|id| self.spread_candidates(id).map(|found| (id, found)))
                    {
                        if let Some(target) = self.rng.pick(&nearby).copied() {
                            if self.retell(chain_id, tail, target, tick, &tuning) {
                                summary.spreads = summary.spreads.saturating_add(1);
                            }
                        }
                    }
                }
                EventEffect::SpicinessMod(delta) => {
                    if let Some(chain_id) = self.rumors.spiciest().map(|chain| chain.id) {
                        self.rumors.heat(chain_id, *delta);
                    }
                }
            }
        }
        self.record(
            LogEvent::new(tick, EventKind::WorldEvent)
                .with("event", event.id.to_string())
                .with("kind", event.kind.as_str())
                .with("location", scope.map_or("", Location::as_str))
                .with("headline", landlord::headline(event.kind)),
        );
    }

    // -----------------------------------------------------------------------
    // Rumors
    // -----------------------------------------------------------------------

    /// The latest teller of a chain and the unheard residents standing
    /// with them.
    fn spread_candidates(&self, chain_id: ChainId) -> Option<(AgentId, Vec<AgentId>)> {
        let chain = self.rumors.get(chain_id)?;
        let tail = chain.tail_agent();
        let location = self.agents.get(&tail)?.location;
        let nearby: Vec<AgentId> = others_at(&self.agents, location, tail)
            .into_iter()
            .filter(|id| !chain.involves(*id))
            .collect();
        if nearby.is_empty() {
            return None;
        }
        Some((tail, nearby))
    }

    /// Retell a chain through `target` without anyone asking.
    fn retell(&mut self, chain_id: ChainId, tail: AgentId, target: AgentId, tick: u64, tuning: &RumorTuning) -> bool {
        let Some(listener) = self.agents.get_mut(&target) else {
            return false;
        };
        let (text, links) = match self.rumors.propagate(chain_id, listener, tick, tuning, &mut self.rng) {
            Ok(chain) => (chain.current_text().to_owned(), chain.links.len()),
            Err(err) => {
                debug!(tick, chain = %chain_id, error = %err, "rumor did not spread");
                return false;
            }
        };
        self.record(
            LogEvent::new(tick, EventKind::RumorSpread)
                .with_agent("agent", tail)
                .with_agent("target", target)
                .with("chain", chain_id.to_string())
                .with("text", text)
                .with("links", links)
                .with("auto", true),
        );
        true
    }

    fn phase_rumors(&mut self, summary: &mut TickSummary) {
        let tick = summary.tick;
        let tuning = self.config.rumor.tuning();
        let spread_chance = self.config.rumor.auto_spread_chance;
        let active: Vec<ChainId> = self.rumors.active().map(|chain| chain.id).collect();
        for chain_id in active {
            let Some((tail, nearby)) = self.spread_candidates(chain_id) else {
                continue;
            };
            if !self.rng.chance(spread_chance) {
                continue;
            }
            if let Some(target) = self.rng.pick(&nearby).copied() {
                if self.retell(chain_id, tail, target, tick, &tuning) {
                    summary.spreads = summary.spreads.saturating_add(1);
                }
            }
        }

        for chain_id in self.rumors.due_for_retirement(tick, &tuning) {
            let Some(chain) = self.rumors.retire(chain_id) else {
                continue;
            };
            let links = chain.links.len();
            debug!(tick, chain = %chain_id, links, "rumor retired");
            self.record(
                LogEvent::new(tick, EventKind::RumorRetired)
                    .with("chain", chain_id.to_string())
                    .with("links", links),
            );
            summary.retired.push(chain_id);
        }
    }

    // -----------------------------------------------------------------------
    // Residents
    // -----------------------------------------------------------------------

    fn phase_moods(&mut self) -> usize {
        let tick = self.clock.tick();
        let mut shifted = 0_usize;
        for id in self.roster.clone() {
            let Some(agent) = self.agents.get_mut(&id) else {
                continue;
            };
            if !self.rng.chance(MOOD_DRIFT_CHANCE) {
                continue;
            }
            let Some((mood, pull)) = drift_target(agent.location.kind()) else {
                continue;
            };
            if shift_mood(agent, mood, pull, &mut self.rng) {
                shifted = shifted.saturating_add(1);
                let location = agent.location;
                self.record(
                    LogEvent::new(tick, EventKind::MoodDrift)
                        .with_agent("agent", id)
                        .with("mood", mood.as_str())
                        .with("location", location.as_str()),
                );
            }
        }
        shifted
    }

    fn phase_milestones(&mut self) -> usize {
        let tick = self.clock.tick();
        let mut unlocked = 0_usize;
        for id in &self.roster {
            let Some(agent) = self.agents.get_mut(id) else {
                continue;
            };
            for (threshold, achievement) in CLOUT_MILESTONES {
                if agent.clout >= threshold && unlock(agent, achievement, tick, &mut self.events) {
                    unlocked = unlocked.saturating_add(1);
                }
            }
        }
        unlocked
    }
}
