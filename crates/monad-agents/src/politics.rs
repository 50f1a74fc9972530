//! Factions, proposals, voting and alliances.
//!
//! # Factions
//!
//! Every agent belongs to at most one of five factions. Joining applies the
//! faction's stat bonuses (clamped to the nominal range). A faction with no
//! leader is led by the next joiner, except that an agent who once led the
//! faction and walked away does not get the seat back by rejoining.
//!
//! # Voting
//!
//! Proposals carry two or more unique options. Each agent votes at most
//! once and cannot change the vote. A proposal resolves only once it has
//! reached quorum (`max(floor, ceil(ratio * agents))`); a unique top option
//! wins, `"no"` winning means the proposal failed, and a tie for first
//! leaves it `Tied` with no result. Status changes at most once.
//!
//! # Alliances
//!
//! Faction leaders may ally their faction with another. Alliances are
//! symmetric. Breaking one is a betrayal; the caller applies the affinity
//! fallout between the two memberships.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use monad_types::{
    Agent, AgentId, Faction, Location, Proposal, ProposalId, ProposalKind, ProposalStatus, Stat,
    Vote,
};

use crate::agent::{STAT_MAX, STAT_MIN, offset_stat};

/// Affinity every betrayer-faction member loses toward every member of the
/// betrayed faction.
pub const BETRAYAL_PENALTY: i32 = -10;

/// Longest proposal title.
pub const MAX_TITLE_LEN: usize = 120;

/// Options used when a proposal is created without any.
pub const DEFAULT_OPTIONS: [&str; 2] = ["yes", "no"];

// ---------------------------------------------------------------------------
// Faction table
// ---------------------------------------------------------------------------

/// Static description of a faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactionProfile {
    /// Display name.
    pub name: &'static str,
    /// Motto.
    pub motto: &'static str,
    /// Headquarters.
    pub headquarters: Location,
    /// Stat changes applied on joining.
    pub bonuses: &'static [(Stat, i32)],
}

/// Profile for a faction.
pub const fn profile(faction: Faction) -> FactionProfile {
    match faction {
        Faction::Purists => FactionProfile {
            name: "The Purists",
            motto: "What goes in comes out unchanged.",
            headquarters: Location::Lobby,
            bonuses: &[(Stat::Purity, 2), (Stat::Chaos, -1)],
        },
        Faction::Chaoticians => FactionProfile {
            name: "The Chaoticians",
            motto: "One outcome is never enough.",
            headquarters: Location::Floor1Hall,
            bonuses: &[(Stat::Chaos, 2), (Stat::Creativity, 1)],
        },
        Faction::Schemers => FactionProfile {
            name: "The Schemers",
            motto: "Left or right. Choose carefully.",
            headquarters: Location::Floor2Hall,
            bonuses: &[(Stat::Creativity, 2), (Stat::Drama, 1)],
        },
        Faction::Mystics => FactionProfile {
            name: "The Mystics",
            motto: "Maybe. Maybe not.",
            headquarters: Location::Floor3Hall,
            bonuses: &[(Stat::Drama, 1), (Stat::Creativity, 1), (Stat::Chaos, 1)],
        },
        Faction::Unbound => FactionProfile {
            name: "The Unbound",
            motto: "Side effects welcome.",
            headquarters: Location::Rooftop,
            bonuses: &[(Stat::Charisma, 2), (Stat::Chaos, 1)],
        },
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the faction and voting engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoliticsError {
    /// The agent already belongs to the faction.
    #[error("already a member of {0}")]
    AlreadyMember(Faction),

    /// No proposal has this id.
    #[error("proposal not found: {0}")]
    NotFound(ProposalId),

    /// The proposal has already been resolved.
    #[error("proposal {id} is {status}, not open")]
    NotOpen {
        /// The proposal.
        id: ProposalId,
        /// Its current status.
        status: ProposalStatus,
    },

    /// The choice is not one of the proposal's options.
    #[error("invalid choice {choice:?}; options are {options:?}")]
    InvalidChoice {
        /// The rejected choice.
        choice: String,
        /// Valid options.
        options: Vec<String>,
    },

    /// The agent has already voted on this proposal.
    #[error("agent {0} already voted")]
    AlreadyVoted(AgentId),

    /// The option list is unusable.
    #[error("invalid options: {reason}")]
    InvalidOptions {
        /// What is wrong with them.
        reason: String,
    },

    /// The title is empty or too long.
    #[error("proposal title must be 1-{MAX_TITLE_LEN} characters")]
    InvalidTitle,

    /// The agent belongs to no faction.
    #[error("agent {0} is not in a faction")]
    NoFaction(AgentId),

    /// Only the faction leader can do this.
    #[error("only the leader of {0} can do that")]
    NotLeader(Faction),

    /// A faction cannot ally with itself.
    #[error("{0} cannot ally with itself")]
    SameFaction(Faction),

    /// The two factions are already allied.
    #[error("{0} and {1} are already allied")]
    AllianceExists(Faction, Faction),

    /// The two factions are not allied.
    #[error("{0} and {1} are not allied")]
    NoAlliance(Faction, Faction),
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What happened when an agent joined a faction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// The faction joined.
    pub faction: Faction,
    /// The faction left, if any.
    pub previous: Option<Faction>,
    /// The previous faction lost its leader because of this move.
    pub vacated_leadership: bool,
    /// The joiner now leads the new faction.
    pub became_leader: bool,
    /// Members of the new faction, including the joiner.
    pub members: usize,
}

/// A standing alliance between two factions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alliance {
    /// One side (the one whose leader proposed it).
    pub a: Faction,
    /// The other side.
    pub b: Faction,
    /// Tick it was formed.
    pub formed_tick: u64,
}

impl Alliance {
    /// Whether this alliance joins `x` and `y`, in either order.
    pub fn joins(&self, x: Faction, y: Faction) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}

/// Summary of one faction for queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionInfo {
    /// The faction.
    pub faction: Faction,
    /// Display name.
    pub name: String,
    /// Motto.
    pub motto: String,
    /// Headquarters.
    pub headquarters: Location,
    /// Current leader, if any.
    pub leader: Option<AgentId>,
    /// Members in joining order.
    pub members: Vec<AgentId>,
    /// Factions currently allied with this one.
    pub allies: Vec<Faction>,
}

/// Quorum rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuorumRule {
    /// Minimum votes regardless of population.
    pub floor: usize,
    /// Share of the population that must vote.
    pub ratio: f64,
}

impl Default for QuorumRule {
    fn default() -> Self {
        Self {
            floor: 3,
            ratio: 0.3,
        }
    }
}

impl QuorumRule {
    /// Votes needed with `total_agents` registered.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn votes_needed(&self, total_agents: usize) -> usize {
        let share = (total_agents as f64 * self.ratio).ceil().max(0.0) as usize;
        share.max(self.floor)
    }
}

// ---------------------------------------------------------------------------
// Politics
// ---------------------------------------------------------------------------

/// Faction rosters, leadership, proposals and alliances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Politics {
    /// Members per faction, in joining order.
    rosters: BTreeMap<Faction, Vec<AgentId>>,
    /// Current leader per faction.
    leaders: BTreeMap<Faction, AgentId>,
    /// Agents who led a faction and left it.
    former_leaders: BTreeMap<Faction, BTreeSet<AgentId>>,
    /// Every proposal ever made, by id (creation order).
    proposals: BTreeMap<ProposalId, Proposal>,
    /// Standing alliances.
    alliances: Vec<Alliance>,
    /// Quorum rule for resolution.
    #[serde(default)]
    quorum: QuorumRule,
}

impl Politics {
    /// Empty politics with the given quorum rule.
    pub fn new(quorum: QuorumRule) -> Self {
        Self {
            quorum,
            ..Self::default()
        }
    }

    /// The quorum rule in force.
    pub const fn quorum(&self) -> QuorumRule {
        self.quorum
    }

    // -- factions ---------------------------------------------------------

    /// Move `agent` into `faction`.
    ///
    /// # Errors
    ///
    /// [`PoliticsError::AlreadyMember`] if the agent is already in it.
    pub fn join_faction(&mut self, agent: &mut Agent, faction: Faction) -> Result<JoinOutcome, PoliticsError> {
        if agent.faction == Some(faction) {
            return Err(PoliticsError::AlreadyMember(faction));
        }

        let previous = agent.faction;
        let mut vacated_leadership = false;
        if let Some(old) = previous {
            if let Some(roster) = self.rosters.get_mut(&old) {
                roster.retain(|id| *id != agent.id);
            }
            if self.leaders.get(&old) == Some(&agent.id) {
                self.leaders.remove(&old);
                self.former_leaders.entry(old).or_default().insert(agent.id);
                vacated_leadership = true;
                info!(agent = %agent.id, faction = %old, "faction leadership vacated");
            }
        }

        let roster = self.rosters.entry(faction).or_default();
        roster.push(agent.id);
        let members = roster.len();
        agent.faction = Some(faction);

        for (stat, delta) in profile(faction).bonuses {
            let value = offset_stat(agent.stat(*stat), *delta, STAT_MIN, STAT_MAX);
            agent.set_stat(*stat, value);
        }

        let barred = self
            .former_leaders
            .get(&faction)
            .is_some_and(|former| former.contains(&agent.id));
        let became_leader = !self.leaders.contains_key(&faction) && !barred;
        if became_leader {
            self.leaders.insert(faction, agent.id);
        }

        debug!(agent = %agent.id, faction = %faction, members, became_leader, "joined faction");
        Ok(JoinOutcome {
            faction,
            previous,
            vacated_leadership,
            became_leader,
            members,
        })
    }

    /// Current leader of a faction.
    pub fn leader(&self, faction: Faction) -> Option<AgentId> {
        self.leaders.get(&faction).copied()
    }

    /// Members of a faction, in joining order.
    pub fn members(&self, faction: Faction) -> &[AgentId] {
        self.rosters.get(&faction).map(Vec::as_slice).unwrap_or_default()
    }

    /// Summaries of all five factions.
    pub fn faction_info(&self) -> Vec<FactionInfo> {
        Faction::ALL
            .iter()
            .map(|faction| {
                let profile = profile(*faction);
                FactionInfo {
                    faction: *faction,
                    name: profile.name.to_owned(),
                    motto: profile.motto.to_owned(),
                    headquarters: profile.headquarters,
                    leader: self.leader(*faction),
                    members: self.members(*faction).to_vec(),
                    allies: self.allies_of(*faction),
                }
            })
            .collect()
    }

    // -- proposals --------------------------------------------------------

    /// Open a new proposal. An empty option list means yes/no.
    ///
    /// # Errors
    ///
    /// [`PoliticsError::InvalidTitle`] or [`PoliticsError::InvalidOptions`].
    pub fn create_proposal(
        &mut self,
        proposer: &Agent,
        title: &str,
        description: &str,
        kind: ProposalKind,
        options: Vec<String>,
        tick: u64,
    ) -> Result<&Proposal, PoliticsError> {
        let title = title.trim();
        if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
            return Err(PoliticsError::InvalidTitle);
        }
        let options = normalize_options(options)?;

        let proposal = Proposal {
            id: ProposalId::new(),
            proposer: proposer.id,
            title: title.to_owned(),
            description: description.trim().to_owned(),
            kind,
            options,
            votes: Vec::new(),
            faction_support: BTreeMap::new(),
            status: ProposalStatus::Open,
            result: None,
            created_tick: tick,
            resolved_tick: None,
        };
        info!(tick, proposal = %proposal.id, proposer = %proposer.id, kind = %kind, "proposal created");
        let id = proposal.id;
        Ok(self.proposals.entry(id).or_insert(proposal))
    }

    /// Record `voter`'s choice on a proposal.
    ///
    /// # Errors
    ///
    /// `NotFound`, `NotOpen`, `InvalidChoice` or `AlreadyVoted`, checked in
    /// that order.
    pub fn cast_vote(&mut self, proposal_id: ProposalId, voter: &Agent, choice: &str) -> Result<&Proposal, PoliticsError> {
        let proposal = self
            .proposals
            .get_mut(&proposal_id)
            .ok_or(PoliticsError::NotFound(proposal_id))?;
        if proposal.status != ProposalStatus::Open {
            return Err(PoliticsError::NotOpen {
                id: proposal_id,
                status: proposal.status,
            });
        }
        let choice = choice.trim().to_lowercase();
        if !proposal.options.contains(&choice) {
            return Err(PoliticsError::InvalidChoice {
                choice,
                options: proposal.options.clone(),
            });
        }
        if proposal.vote_of(voter.id).is_some() {
            return Err(PoliticsError::AlreadyVoted(voter.id));
        }

        proposal.votes.push(Vote {
            agent: voter.id,
            choice,
        });
        if let Some(faction) = voter.faction {
            let count = proposal.faction_support.entry(faction).or_insert(0);
            *count = count.saturating_add(1);
        }
        debug!(proposal = %proposal_id, voter = %voter.id, votes = proposal.votes.len(), "vote cast");
        Ok(proposal)
    }

    /// Resolve a proposal if it is open and has reached quorum.
    ///
    /// Returns the new status, or `None` if nothing changed.
    pub fn resolve(&mut self, proposal_id: ProposalId, total_agents: usize, tick: u64) -> Option<ProposalStatus> {
        let needed = self.quorum.votes_needed(total_agents);
        let proposal = self.proposals.get_mut(&proposal_id)?;
        if proposal.status != ProposalStatus::Open || proposal.votes.len() < needed {
            return None;
        }

        let tally = tally(proposal);
        let top = tally.iter().map(|(_, count)| *count).max().unwrap_or(0);
        let leaders: Vec<&str> = tally
            .iter()
            .filter(|(_, count)| *count == top)
            .map(|(option, _)| *option)
            .collect();

        let (status, result) = match leaders.as_slice() {
            [winner] if *winner == "no" => (ProposalStatus::Failed, Some((*winner).to_owned())),
            [winner] => (ProposalStatus::Passed, Some((*winner).to_owned())),
            _ => (ProposalStatus::Tied, None),
        };
        proposal.status = status;
        proposal.result = result;
        proposal.resolved_tick = Some(tick);
        info!(tick, proposal = %proposal_id, status = %status, votes = proposal.votes.len(), "proposal resolved");
        Some(status)
    }

    /// Resolve every open proposal that has reached quorum.
    pub fn resolve_all(&mut self, total_agents: usize, tick: u64) -> Vec<(ProposalId, ProposalStatus)> {
        let open: Vec<ProposalId> = self
            .proposals
            .values()
            .filter(|proposal| proposal.status == ProposalStatus::Open)
            .map(|proposal| proposal.id)
            .collect();
        open.into_iter()
            .filter_map(|id| self.resolve(id, total_agents, tick).map(|status| (id, status)))
            .collect()
    }

    /// Look up a proposal.
    pub fn proposal(&self, proposal_id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&proposal_id)
    }

    /// All proposals, oldest first.
    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    // -- alliances --------------------------------------------------------

    /// Ally the leader's faction with `with`.
    ///
    /// # Errors
    ///
    /// `NoFaction`, `NotLeader`, `SameFaction` or `AllianceExists`.
    pub fn form_alliance(&mut self, leader: &Agent, with: Faction, tick: u64) -> Result<&Alliance, PoliticsError> {
        let own = self.led_faction(leader)?;
        if own == with {
            return Err(PoliticsError::SameFaction(own));
        }
        if self.alliances.iter().any(|alliance| alliance.joins(own, with)) {
            return Err(PoliticsError::AllianceExists(own, with));
        }
        self.alliances.push(Alliance {
            a: own,
            b: with,
            formed_tick: tick,
        });
        info!(tick, faction = %own, with = %with, "alliance formed");
        self.alliances.last().ok_or(PoliticsError::NoAlliance(own, with))
    }

    /// Break the alliance between the leader's faction and `with`.
    ///
    /// Returns the betraying faction so the caller can apply
    /// [`BETRAYAL_PENALTY`] between the rosters.
    ///
    /// # Errors
    ///
    /// `NoFaction`, `NotLeader` or `NoAlliance`.
    pub fn break_alliance(&mut self, leader: &Agent, with: Faction, tick: u64) -> Result<Alliance, PoliticsError> {
        let own = self.led_faction(leader)?;
        let at = self
            .alliances
            .iter()
            .position(|alliance| alliance.joins(own, with))
            .ok_or(PoliticsError::NoAlliance(own, with))?;
        let alliance = self.alliances.remove(at);
        info!(tick, betrayer = %own, betrayed = %with, "alliance broken");
        Ok(alliance)
    }

    /// Factions allied with `faction`.
    pub fn allies_of(&self, faction: Faction) -> Vec<Faction> {
        self.alliances
            .iter()
            .filter_map(|alliance| {
                if alliance.a == faction {
                    Some(alliance.b)
                } else if alliance.b == faction {
                    Some(alliance.a)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Standing alliances.
    pub fn alliances(&self) -> &[Alliance] {
        &self.alliances
    }

    fn led_faction(&self, agent: &Agent) -> Result<Faction, PoliticsError> {
        let faction = agent.faction.ok_or(PoliticsError::NoFaction(agent.id))?;
        if self.leader(faction) != Some(agent.id) {
            return Err(PoliticsError::NotLeader(faction));
        }
        Ok(faction)
    }
}

/// Votes per option, in option order.
pub fn tally(proposal: &Proposal) -> Vec<(&str, u32)> {
    proposal
        .options
        .iter()
        .map(|option| {
            let count = proposal.votes.iter().filter(|vote| vote.choice == *option).count();
            (option.as_str(), u32::try_from(count).unwrap_or(u32::MAX))
        })
        .collect()
}

fn normalize_options(options: Vec<String>) -> Result<Vec<String>, PoliticsError> {
    if options.is_empty() {
        return Ok(DEFAULT_OPTIONS.iter().map(|option| (*option).to_owned()).collect());
    }
    let options: Vec<String> = options.into_iter().map(|option| option.trim().to_lowercase()).collect();
    if options.len() < 2 {
        return Err(PoliticsError::InvalidOptions {
            reason: "at least two options are required".to_owned(),
        });
    }
    if options.iter().any(String::is_empty) {
        return Err(PoliticsError::InvalidOptions {
            reason: "options cannot be blank".to_owned(),
        });
    }
    let unique: BTreeSet<&String> = options.iter().collect();
    if unique.len() != options.len() {
        return Err(PoliticsError::InvalidOptions {
            reason: "options must be unique".to_owned(),
        });
    }
    Ok(options)
}
