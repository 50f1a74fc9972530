//! Core entity structs for The Monad.
//!
//! These are pure data with invariant-preserving mutators. Every entity is
//! owned by the world orchestrator; engines borrow them mutably for the
//! duration of one operation.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    Achievement, DecreeKind, Faction, LedgerEntryKind, Location, Mood, Personality, ProposalKind,
    ProposalStatus, QuestStatus, Rarity, Stat, TradeStatus, Vibe, WorldEventKind,
};
use crate::ids::{
    AgentId, ArtifactId, ChainId, DecreeId, DuelId, LedgerEntryId, PartyId, PostId, ProposalId,
    QuestId, TradeId, WorldEventId,
};

/// Lowest possible affinity between two agents.
pub const AFFINITY_MIN: i32 = -100;

/// Highest possible affinity between two agents.
pub const AFFINITY_MAX: i32 = 100;

/// Number of history notes kept per relationship.
pub const RELATIONSHIP_HISTORY_CAP: usize = 20;

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

/// One remembered interaction between two agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RelationshipNote {
    /// Tick of the interaction.
    pub tick: u64,
    /// Affinity change applied.
    pub delta: i32,
    /// Short machine-readable cause (e.g. `"talk"`, `"prank"`).
    pub note: String,
}

/// One agent's view of another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Relationship {
    /// Signed affinity, always within `[-100, 100]`.
    pub affinity: i32,
    /// Number of interactions recorded.
    pub interactions: u32,
    /// Most recent interactions, oldest first.
    #[ts(as = "Vec<RelationshipNote>")]
    pub history: VecDeque<RelationshipNote>,
}

impl Relationship {
    /// Apply an affinity change, clamped to `[-100, 100]`, and remember it.
    ///
    /// The history keeps the newest [`RELATIONSHIP_HISTORY_CAP`] notes.
    pub fn adjust(&mut self, delta: i32, note: &str, tick: u64) {
        self.affinity = self
            .affinity
            .saturating_add(delta)
            .clamp(AFFINITY_MIN, AFFINITY_MAX);
        self.interactions = self.interactions.saturating_add(1);
        self.history.push_back(RelationshipNote {
            tick,
            delta,
            note: note.to_owned(),
        });
        while self.history.len() > RELATIONSHIP_HISTORY_CAP {
            self.history.pop_front();
        }
    }

    /// Human-facing label for the current affinity band.
    pub const fn label(&self) -> &'static str {
        match self.affinity {
            75.. => "bestie",
            40..=74 => "friend",
            10..=39 => "acquaintance",
            -10..=9 => "neutral",
            -40..=-11 => "annoyed",
            -75..=-41 => "rival",
            _ => "nemesis",
        }
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Running duel statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DuelTally {
    /// Duels won.
    pub wins: u32,
    /// Duels lost.
    pub losses: u32,
    /// Current consecutive wins; reset by a loss.
    pub streak: u32,
}

/// A resident of the building.
///
/// Agents are created on registration and never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Agent {
    /// Unique identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Fixed personality classification.
    pub personality: Personality,
    /// Named stats.
    pub stats: BTreeMap<Stat, u32>,
    /// Current mood.
    pub mood: Mood,
    /// Current location.
    pub location: Location,
    /// Inflationary social score.
    pub clout: u64,
    /// Conserved spendable token balance.
    pub func: u64,
    /// MON credited through achievements. Never spendable.
    #[ts(as = "String")]
    pub mon_earned: Decimal,
    /// Held items, in acquisition order.
    pub inventory: Vec<String>,
    /// Relationship with every agent this one has interacted with.
    pub relationships: BTreeMap<AgentId, Relationship>,
    /// Rumor chains this agent has heard (or started).
    pub gossip_heard: BTreeSet<ChainId>,
    /// Rumor chains this agent started.
    pub gossip_started: BTreeSet<ChainId>,
    /// Current faction, if any.
    pub faction: Option<Faction>,
    /// Duel statistics.
    pub duel_record: DuelTally,
    /// Achievements unlocked, with how many times each was credited.
    pub achievements: BTreeMap<Achievement, u32>,
    /// Parties hosted.
    pub party_count: u32,
    /// Trades completed, as either side.
    pub trade_count: u32,
    /// Votes cast.
    pub votes_cast: u32,
    /// Exploration attempts.
    pub exploration_count: u32,
    /// Quests currently assigned.
    pub active_quests: Vec<QuestId>,
    /// Quests completed.
    pub completed_quests: Vec<QuestId>,
    /// Artifacts discovered.
    pub artifacts: Vec<ArtifactId>,
    /// Tick of registration.
    pub registered_tick: u64,
}

impl Agent {
    /// Build a fresh agent in the lobby with zero balances.
    ///
    /// Starting FUNC is minted through the ledger by the caller so that the
    /// conservation check sees it.
    pub fn new(
        name: &str,
        personality: Personality,
        stats: BTreeMap<Stat, u32>,
        mood: Mood,
        registered_tick: u64,
    ) -> Self {
        Self {
            id: AgentId::new(),
            name: name.to_owned(),
            personality,
            stats,
            mood,
            location: Location::Lobby,
            clout: 0,
            func: 0,
            mon_earned: Decimal::ZERO,
            inventory: Vec::new(),
            relationships: BTreeMap::new(),
            gossip_heard: BTreeSet::new(),
            gossip_started: BTreeSet::new(),
            faction: None,
            duel_record: DuelTally::default(),
            achievements: BTreeMap::new(),
            party_count: 0,
            trade_count: 0,
            votes_cast: 0,
            exploration_count: 0,
            active_quests: Vec::new(),
            completed_quests: Vec::new(),
            artifacts: Vec::new(),
            registered_tick,
        }
    }

    /// Current value of a stat (0 if unset).
    pub fn stat(&self, stat: Stat) -> u32 {
        self.stats.get(&stat).copied().unwrap_or(0)
    }

    /// Overwrite a stat.
    pub fn set_stat(&mut self, stat: Stat, value: u32) {
        self.stats.insert(stat, value);
    }

    /// Affinity toward another agent (0 if they never interacted).
    pub fn affinity_toward(&self, other: AgentId) -> i32 {
        self.relationships
            .get(&other)
            .map_or(0, |relationship| relationship.affinity)
    }

    /// Adjust this agent's relationship toward `other`.
    pub fn adjust_relationship(&mut self, other: AgentId, delta: i32, note: &str, tick: u64) {
        self.relationships
            .entry(other)
            .or_default()
            .adjust(delta, note, tick);
    }

    /// Whether the achievement has been credited at least once.
    pub fn has_achievement(&self, achievement: Achievement) -> bool {
        self.achievements.contains_key(&achievement)
    }

    /// Remove one copy of an item from the inventory.
    ///
    /// Returns `false` if the agent does not hold the item.
    pub fn take_item(&mut self, item: &str) -> bool {
        match self.inventory.iter().position(|held| held == item) {
            Some(pos) => {
                self.inventory.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Whether the agent holds at least one copy of the item.
    pub fn holds(&self, item: &str) -> bool {
        self.inventory.iter().any(|held| held == item)
    }
}

// ---------------------------------------------------------------------------
// Rumor chains
// ---------------------------------------------------------------------------

/// One hop of a rumor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChainLink {
    /// The agent who retold the rumor.
    pub agent_id: AgentId,
    /// Their display name at the time.
    pub agent_name: String,
    /// Their personality, which shaped the retelling.
    pub personality: Personality,
    /// The retold text.
    pub content: String,
    /// Tick of the retelling.
    pub tick: u64,
}

/// A rumor being passed from agent to agent.
///
/// Invariants: an agent appears in `links` at most once, and the
/// originator never appears in `links`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Chain {
    /// Unique identifier.
    pub id: ChainId,
    /// Agent who started the rumor.
    pub originator: AgentId,
    /// Originator's display name.
    pub originator_name: String,
    /// Text as first told. Never modified.
    pub original: String,
    /// How believable the rumor is, `0..=100`.
    pub credibility: u8,
    /// How juicy the rumor is, `0..=100`.
    pub spiciness: u8,
    /// Retellings, in order.
    pub links: Vec<ChainLink>,
    /// Number of retellings applied.
    pub mutations: u32,
    /// Whether the chain still accepts retellings.
    pub active: bool,
    /// Tick the rumor was started.
    pub started_tick: u64,
}

impl Chain {
    /// The latest version of the text: the last link's content, or the
    /// original if nobody has retold it yet.
    pub fn current_text(&self) -> &str {
        self.links
            .last()
            .map_or(self.original.as_str(), |link| link.content.as_str())
    }

    /// The agent holding the latest version.
    pub fn tail_agent(&self) -> AgentId {
        self.links
            .last()
            .map_or(self.originator, |link| link.agent_id)
    }

    /// Whether the agent is the originator or already retold the rumor.
    pub fn involves(&self, agent: AgentId) -> bool {
        self.originator == agent || self.links.iter().any(|link| link.agent_id == agent)
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether nobody has retold the rumor yet.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Parties
// ---------------------------------------------------------------------------

/// The four bounded axes a party moves through, plus its narrative log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PartyState {
    /// How much the room has left in it.
    pub energy: u8,
    /// How close things are to going off the rails.
    pub volatility: u8,
    /// How close the guests feel.
    pub bonding: u8,
    /// How much fun everyone is having.
    pub enjoyment: u8,
    /// One entry per effect that took hold, in order.
    pub log: Vec<String>,
}

impl Default for PartyState {
    fn default() -> Self {
        Self {
            energy: 50,
            volatility: 20,
            bonding: 30,
            enjoyment: 40,
            log: Vec::new(),
        }
    }
}

/// A finished party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PartyRecord {
    /// Unique identifier.
    pub id: PartyId,
    /// The host.
    pub host: AgentId,
    /// Where it happened.
    pub location: Location,
    /// Requested vibes, in order.
    pub vibes: Vec<Vibe>,
    /// How many of the requested vibes took hold before one failed.
    pub vibes_applied: usize,
    /// Guests (excluding the host).
    pub attendees: Vec<AgentId>,
    /// Final state snapshot.
    pub outcome: PartyState,
    /// Tick of the party.
    pub tick: u64,
}

// ---------------------------------------------------------------------------
// Duels
// ---------------------------------------------------------------------------

/// One round of a duel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DuelRound {
    /// Round number, starting at 1.
    pub round: u8,
    /// The stat both sides rolled against.
    pub stat: Stat,
    /// Challenger's final roll.
    pub challenger_roll: i32,
    /// Defender's final roll.
    pub defender_roll: i32,
    /// Challenger's special-ability bonus, if it triggered.
    pub challenger_ability: Option<i32>,
    /// Defender's special-ability bonus, if it triggered.
    pub defender_ability: Option<i32>,
    /// Whether the challenger took the round.
    pub challenger_won: bool,
}

/// Outcome of a best-of-three duel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DuelRecord {
    /// Unique identifier.
    pub id: DuelId,
    /// Who issued the challenge.
    pub challenger: AgentId,
    /// Who was challenged.
    pub defender: AgentId,
    /// Rounds played (two or three).
    pub rounds: Vec<DuelRound>,
    /// Rounds the challenger won.
    pub challenger_score: u8,
    /// Rounds the defender won.
    pub defender_score: u8,
    /// The winner.
    pub winner: AgentId,
    /// The loser.
    pub loser: AgentId,
    /// FUNC at stake.
    pub wager: u64,
    /// Tick of the duel.
    pub tick: u64,
}

// ---------------------------------------------------------------------------
// Landlord
// ---------------------------------------------------------------------------

/// A mechanical modifier attached to a decree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case", tag = "modifier", content = "value")]
#[ts(export, export_to = "bindings/")]
pub enum Modifier {
    /// Every agent loses this much chaos (never below 1).
    ChaosReduction(u32),
    /// Limit on concurrently active rumor chains.
    MaxGossipChains(u32),
    /// Percent chance that arriving on the third floor yields nothing.
    Floor3NothingChance(u8),
    /// Number of forks on the second floor.
    Floor2Paths(u32),
    /// The kitchen is closed.
    KitchenClosed,
    /// The basement is locked.
    BasementLocked,
    /// Limit on parties.
    PartyLimit(u32),
    /// Drama cooldown in effect.
    DramaCooldown,
    /// The elevator only stops on matching floors.
    ElevatorParity,
}

/// A Landlord decree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Decree {
    /// Unique identifier.
    pub id: DecreeId,
    /// What kind of decree.
    pub kind: DecreeKind,
    /// Proclamation text.
    pub content: String,
    /// Mechanical effect, if any.
    pub modifier: Option<Modifier>,
    /// How many ticks the modifier lasts; `None` for instant or permanent.
    pub duration: Option<u64>,
    /// Tick the decree was issued.
    pub issued_tick: u64,
}

/// A time-boxed modifier registered by a decree with a duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveModifier {
    /// The decree that registered it.
    pub decree: DecreeId,
    /// Kind of that decree.
    pub kind: DecreeKind,
    /// The modifier in force.
    pub modifier: Modifier,
    /// The modifier is removed once the tick reaches this value.
    pub expires_tick: u64,
}

/// One mechanical effect of a world event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case", tag = "effect", content = "value")]
#[ts(export, export_to = "bindings/")]
pub enum EventEffect {
    /// Everyone relocates.
    MoveAllTo(Location),
    /// Every agent's chaos changes by this much (clamped to 1..=10).
    ChaosMod(i32),
    /// An item appears for someone at the event location.
    ItemSpawn(String),
    /// Every agent's mood is set.
    MoodShift(Mood),
    /// The Landlord seeds a rumor.
    GossipTrigger,
    /// Spiciness bump for the seeded rumor.
    SpicinessMod(u8),
}

/// A Landlord-triggered world event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldEvent {
    /// Unique identifier.
    pub id: WorldEventId,
    /// What happened.
    pub kind: WorldEventKind,
    /// Where it happened, if localized.
    pub location: Option<Location>,
    /// Mechanical effects, applied in order.
    pub effects: Vec<EventEffect>,
    /// Tick of the event.
    pub tick: u64,
}

// ---------------------------------------------------------------------------
// Politics
// ---------------------------------------------------------------------------

/// A single cast vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vote {
    /// Who voted.
    pub agent: AgentId,
    /// The chosen option.
    pub choice: String,
}

/// A faction proposal put to a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Proposal {
    /// Unique identifier.
    pub id: ProposalId,
    /// Who proposed it.
    pub proposer: AgentId,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Category.
    pub kind: ProposalKind,
    /// Allowed choices.
    pub options: Vec<String>,
    /// Votes in the order they were cast. At most one per agent.
    pub votes: Vec<Vote>,
    /// Votes cast per faction.
    pub faction_support: BTreeMap<Faction, u32>,
    /// Lifecycle state.
    pub status: ProposalStatus,
    /// Winning option, once resolved with a winner.
    pub result: Option<String>,
    /// Tick of creation.
    pub created_tick: u64,
    /// Tick of resolution.
    pub resolved_tick: Option<u64>,
}

impl Proposal {
    /// The option an agent chose, if they voted.
    pub fn vote_of(&self, agent: AgentId) -> Option<&str> {
        self.votes
            .iter()
            .find(|vote| vote.agent == agent)
            .map(|vote| vote.choice.as_str())
    }
}

// ---------------------------------------------------------------------------
// Trading
// ---------------------------------------------------------------------------

/// One side of a trade offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
#[ts(export, export_to = "bindings/")]
pub enum TradeAsset {
    /// An amount of FUNC.
    Func(u64),
    /// One inventory item.
    Item(String),
}

/// A peer-to-peer trade offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TradeOffer {
    /// Unique identifier.
    pub id: TradeId,
    /// The agent making the offer.
    pub seller: AgentId,
    /// What the seller gives.
    pub offering: TradeAsset,
    /// What the seller wants in return.
    pub asking: TradeAsset,
    /// Lifecycle state.
    pub status: TradeStatus,
    /// The accepting agent, once accepted.
    pub buyer: Option<AgentId>,
    /// Tick of creation.
    pub created_tick: u64,
    /// Tick it was accepted or cancelled.
    pub resolved_tick: Option<u64>,
}

/// Price and stock of one catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MarketListing {
    /// Catalog price prices relax toward.
    pub base_price: u64,
    /// Current price.
    pub price: u64,
    /// Units in stock.
    pub supply: u32,
}

// ---------------------------------------------------------------------------
// Exploration
// ---------------------------------------------------------------------------

/// A discovered artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Artifact {
    /// Unique identifier.
    pub id: ArtifactId,
    /// Display name.
    pub name: String,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Stat bonuses applied to the discoverer.
    pub stat_bonus: BTreeMap<Stat, u32>,
    /// Special ability tag, if any.
    pub special: Option<String>,
    /// Who found it.
    pub discovered_by: AgentId,
    /// When it was found.
    pub discovered_tick: u64,
    /// Where it was found.
    pub location: Location,
}

/// One step of a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QuestStep {
    /// What to do.
    pub description: String,
    /// Action tag that completes the step.
    pub action: String,
    /// Whether the step is done.
    pub completed: bool,
}

/// What completing a quest pays out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QuestRewards {
    /// FUNC minted to the agent.
    pub func: u64,
    /// Clout awarded.
    pub clout: u64,
    /// MON credited.
    #[ts(as = "String")]
    pub mon: Decimal,
    /// Percent chance of a bonus artifact roll.
    pub artifact_chance: u8,
}

/// A quest instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Quest {
    /// Unique identifier.
    pub id: QuestId,
    /// Template key this instance was built from.
    pub template: String,
    /// Display name.
    pub name: String,
    /// Flavor description.
    pub description: String,
    /// Steps, in order.
    pub steps: Vec<QuestStep>,
    /// Index of the next step to complete.
    pub current_step: usize,
    /// The agent working the quest.
    pub assigned_to: Option<AgentId>,
    /// Lifecycle state.
    pub status: QuestStatus,
    /// Payout on completion.
    pub rewards: QuestRewards,
}

// ---------------------------------------------------------------------------
// Board and ledger
// ---------------------------------------------------------------------------

/// A message pinned to the community board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BoardPost {
    /// Unique identifier.
    pub id: PostId,
    /// Author.
    pub author: AgentId,
    /// Author's display name.
    pub author_name: String,
    /// The message.
    pub message: String,
    /// Tick of posting.
    pub tick: u64,
}

/// One FUNC movement recorded by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: LedgerEntryId,
    /// Tick of the movement.
    pub tick: u64,
    /// Mint, burn or transfer.
    pub kind: LedgerEntryKind,
    /// Debited agent (`None` for mints).
    pub from: Option<AgentId>,
    /// Credited agent (`None` for burns).
    pub to: Option<AgentId>,
    /// Amount moved.
    pub amount: u64,
    /// Machine-readable reason (e.g. `"throw_party"`).
    pub reason: String,
}
