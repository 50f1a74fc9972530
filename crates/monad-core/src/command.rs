//! The command surface of the world.
//!
//! Every mutation arrives as a [`Command`] and goes through
//! [`World::execute`](crate::World::execute), which returns a typed
//! [`CommandOutcome`] or a [`CommandError`]. Engine errors fold into the
//! four error categories through `From` impls so handlers can use `?`.

use core::fmt::Display;
use core::str::FromStr;

use monad_agents::{
    Alliance, Discovery, JoinOutcome, MarketError, PartyError, PoliticsError, Purchase,
    QuestError, RumorError, Sale, StepOutcome,
};
use monad_ledger::LedgerError;
use monad_types::{
    AgentId, ChainId, DuelRecord, Faction, Location, ParseEnumError, PartyRecord, Personality,
    PostId, ProposalId, ProposalKind, QuestId, TradeAsset, TradeId, TradeOffer, Vibe,
};

use crate::clock::ClockError;
use crate::tick::TickSummary;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Everything a resident (or the host) can ask the world to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A new resident moves in.
    RegisterAgent {
        /// Display name.
        name: String,
        /// Personality.
        personality: Personality,
    },
    /// Walk somewhere.
    Move {
        /// Who moves.
        agent: AgentId,
        /// Where to.
        to: Location,
    },
    /// Say something, to one person or to the room.
    Talk {
        /// Speaker.
        agent: AgentId,
        /// Listener; the whole room when absent.
        target: Option<AgentId>,
        /// What was said.
        message: String,
    },
    /// Start a rumor.
    StartRumor {
        /// Originator.
        agent: AgentId,
        /// The rumor.
        text: String,
    },
    /// Pass a rumor on.
    SpreadRumor {
        /// Who tells it.
        agent: AgentId,
        /// Which rumor.
        chain: ChainId,
        /// Who hears it (and retells it through their personality).
        target: AgentId,
    },
    /// Throw a party.
    ThrowParty {
        /// Host.
        agent: AgentId,
        /// Vibe sequence, applied left to right.
        vibes: Vec<Vibe>,
        /// Venue; the rooftop when absent.
        location: Option<Location>,
    },
    /// Cook something in the kitchen.
    Cook {
        /// Cook.
        agent: AgentId,
        /// What goes in the pan.
        ingredient: String,
    },
    /// Prank a neighbor.
    Prank {
        /// Prankster.
        agent: AgentId,
        /// Victim.
        target: AgentId,
    },
    /// Pin a note to the lobby board.
    PostToBoard {
        /// Author.
        agent: AgentId,
        /// Note text.
        message: String,
    },
    /// Challenge someone to a duel.
    ChallengeDuel {
        /// Challenger.
        agent: AgentId,
        /// Defender.
        target: AgentId,
        /// FUNC the loser pays the winner; 0 for honor only.
        wager: u64,
    },
    /// Join a faction (leaving any current one).
    JoinFaction {
        /// Joiner.
        agent: AgentId,
        /// Faction to join.
        faction: Faction,
    },
    /// Put a proposal to a vote.
    CreateProposal {
        /// Proposer.
        agent: AgentId,
        /// Title.
        title: String,
        /// Description.
        description: String,
        /// Kind.
        kind: ProposalKind,
        /// Choices; yes/no when empty.
        options: Vec<String>,
    },
    /// Vote on an open proposal.
    CastVote {
        /// Voter.
        agent: AgentId,
        /// Proposal.
        proposal: ProposalId,
        /// One of the proposal's options.
        choice: String,
    },
    /// Ally the agent's faction with another (leader only).
    FormAlliance {
        /// The leader acting.
        agent: AgentId,
        /// Other faction.
        with: Faction,
    },
    /// Betray an alliance (leader only).
    BreakAlliance {
        /// The leader acting.
        agent: AgentId,
        /// Other faction.
        with: Faction,
    },
    /// Post a trade offer.
    CreateTrade {
        /// Seller.
        agent: AgentId,
        /// What the seller gives.
        offering: TradeAsset,
        /// What the seller wants.
        asking: TradeAsset,
    },
    /// Accept someone's trade offer.
    AcceptTrade {
        /// Buyer.
        agent: AgentId,
        /// Offer.
        trade: TradeId,
    },
    /// Withdraw one's own trade offer.
    CancelTrade {
        /// Seller.
        agent: AgentId,
        /// Offer.
        trade: TradeId,
    },
    /// Buy from the market.
    Buy {
        /// Buyer.
        agent: AgentId,
        /// Item key.
        item: String,
    },
    /// Sell to the market.
    Sell {
        /// Seller.
        agent: AgentId,
        /// Item key.
        item: String,
    },
    /// Explore the current location.
    Explore {
        /// Explorer.
        agent: AgentId,
    },
    /// Take a quest from the board.
    AcceptQuest {
        /// Adventurer.
        agent: AgentId,
        /// Quest.
        quest: QuestId,
    },
    /// Report an action against a held quest.
    AdvanceQuest {
        /// Adventurer.
        agent: AgentId,
        /// Quest.
        quest: QuestId,
        /// Action tag.
        action: String,
    },
    /// Give up on a held quest.
    AbandonQuest {
        /// Adventurer.
        agent: AgentId,
        /// Quest.
        quest: QuestId,
    },
    /// Run one tick.
    AdvanceTick,
}

impl Command {
    /// Stable name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RegisterAgent { .. } => "register_agent",
            Self::Move { .. } => "move",
            Self::Talk { .. } => "talk",
            Self::StartRumor { .. } => "start_rumor",
            Self::SpreadRumor { .. } => "spread_rumor",
            Self::ThrowParty { .. } => "throw_party",
            Self::Cook { .. } => "cook",
            Self::Prank { .. } => "prank",
            Self::PostToBoard { .. } => "post_to_board",
            Self::ChallengeDuel { .. } => "challenge_duel",
            Self::JoinFaction { .. } => "join_faction",
            Self::CreateProposal { .. } => "create_proposal",
            Self::CastVote { .. } => "cast_vote",
            Self::FormAlliance { .. } => "form_alliance",
            Self::BreakAlliance { .. } => "break_alliance",
            Self::CreateTrade { .. } => "create_trade",
            Self::AcceptTrade { .. } => "accept_trade",
            Self::CancelTrade { .. } => "cancel_trade",
            Self::Buy { .. } => "buy",
            Self::Sell { .. } => "sell",
            Self::Explore { .. } => "explore",
            Self::AcceptQuest { .. } => "accept_quest",
            Self::AdvanceQuest { .. } => "advance_quest",
            Self::AbandonQuest { .. } => "abandon_quest",
            Self::AdvanceTick => "advance_tick",
        }
    }
}

/// Parse a raw transport string into a typed command field.
///
/// # Errors
///
/// Returns [`CommandError::InvalidInput`] naming the field and the input.
pub fn parse_input<T>(field: &str, raw: &str) -> Result<T, CommandError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|err: T::Err| CommandError::InvalidInput {
        input: format!("{field}={raw}"),
        reason: err.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Where a move actually ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Arrived as asked.
    Arrived {
        /// Destination.
        to: Location,
    },
    /// Arrived after taking one branch of a fork.
    Forked {
        /// Destination.
        to: Location,
        /// The branch taken.
        path: String,
    },
    /// Arrived to find several conversations going at once.
    Branched {
        /// Destination.
        to: Location,
        /// How many.
        branches: u32,
    },
    /// The door was not there; the agent stayed put.
    Nothing {
        /// Where they tried to go.
        attempted: Location,
    },
    /// Went into the basement and came out somewhere else.
    Diverged {
        /// Where they came out.
        to: Location,
    },
}

impl MoveOutcome {
    /// Where the agent is now, if they moved.
    pub const fn destination(&self) -> Option<Location> {
        match self {
            Self::Arrived { to }
            | Self::Forked { to, .. }
            | Self::Branched { to, .. }
            | Self::Diverged { to } => Some(*to),
            Self::Nothing { .. } => None,
        }
    }

    /// Stable label for logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Arrived { .. } => "arrived",
            Self::Forked { .. } => "forked",
            Self::Branched { .. } => "branched",
            Self::Nothing { .. } => "nothing",
            Self::Diverged { .. } => "diverged",
        }
    }
}

/// How a dish turned out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookOutcome {
    /// The dish.
    pub dish: String,
    /// `perfect`, `wild` or `normal`.
    pub style: &'static str,
    /// Kitchen mishap, if any.
    pub side_effect: Option<&'static str>,
    /// Others in the kitchen who got fed.
    pub fed: usize,
}

/// How a prank went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrankOutcome {
    /// Whether it landed.
    pub success: bool,
    /// What was attempted.
    pub prank: &'static str,
    /// Clout the prankster earned.
    pub clout: u64,
}

/// What a rumor retelling produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadOutcome {
    /// The chain.
    pub chain: ChainId,
    /// Text as the listener retold it.
    pub text: String,
    /// Retellings so far.
    pub links: usize,
    /// Credibility now.
    pub credibility: u8,
    /// Spiciness now.
    pub spiciness: u8,
}

/// Successful result of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// A resident moved in.
    Registered {
        /// Their id.
        agent: AgentId,
    },
    /// A move resolved.
    Moved(MoveOutcome),
    /// Talk happened.
    Talked {
        /// How many heard it.
        listeners: usize,
    },
    /// A rumor began.
    RumorStarted {
        /// The chain.
        chain: ChainId,
    },
    /// A rumor was retold.
    RumorSpread(SpreadOutcome),
    /// A party happened.
    PartyThrown(Box<PartyRecord>),
    /// Something was cooked.
    Cooked(CookOutcome),
    /// A prank was attempted.
    Pranked(PrankOutcome),
    /// A note went up.
    Posted {
        /// The post.
        post: PostId,
    },
    /// A duel was fought.
    Dueled(Box<DuelRecord>),
    /// An agent changed faction.
    JoinedFaction(JoinOutcome),
    /// A proposal opened.
    ProposalCreated {
        /// The proposal.
        proposal: ProposalId,
    },
    /// A vote was recorded.
    VoteCast {
        /// The proposal.
        proposal: ProposalId,
        /// Votes now cast.
        votes: usize,
    },
    /// Two factions allied.
    AllianceFormed(Alliance),
    /// An alliance was betrayed.
    AllianceBroken(Alliance),
    /// A trade offer was posted.
    TradeCreated {
        /// The offer.
        trade: TradeId,
    },
    /// A trade went through.
    TradeAccepted {
        /// The offer, now accepted.
        offer: TradeOffer,
        /// The seller came out ahead of catalog value.
        seller_profit: bool,
    },
    /// A trade offer was withdrawn.
    TradeCancelled(TradeOffer),
    /// A market purchase.
    Bought(Purchase),
    /// A market sale.
    Sold(Sale),
    /// Exploration results.
    Explored {
        /// What turned up.
        discoveries: Vec<Discovery>,
    },
    /// A quest was taken.
    QuestAccepted {
        /// The quest.
        quest: QuestId,
    },
    /// A quest action was reported.
    QuestAdvanced {
        /// The quest.
        quest: QuestId,
        /// What happened.
        outcome: StepOutcome,
    },
    /// A quest was given up.
    QuestAbandoned {
        /// The quest.
        quest: QuestId,
    },
    /// A tick ran.
    Ticked(Box<TickSummary>),
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a command was refused.
///
/// A refused command leaves the world unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// A referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind (`agent`, `chain`, `proposal`, ...).
        kind: &'static str,
        /// The id or key that was looked up.
        id: String,
    },

    /// The entity exists but is in the wrong state.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// What is wrong.
        reason: String,
    },

    /// The actor does not meet a requirement (location, funds, role).
    #[error("precondition failed: {reason}")]
    PreconditionFailed {
        /// What is missing.
        reason: String,
    },

    /// An input could not be parsed or is out of range.
    #[error("invalid input {input}: {reason}")]
    InvalidInput {
        /// The offending input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl CommandError {
    /// Stable machine-checkable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidState { .. } => "invalid_state",
            Self::PreconditionFailed { .. } => "precondition_failed",
            Self::InvalidInput { .. } => "invalid_input",
        }
    }

    /// An unknown agent.
    pub fn agent(id: AgentId) -> Self {
        Self::NotFound {
            kind: "agent",
            id: id.to_string(),
        }
    }

    pub(crate) fn precondition(reason: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            reason: reason.into(),
        }
    }

    pub(crate) fn state(reason: impl Display) -> Self {
        Self::InvalidState {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn input(input: impl Into<String>, reason: impl Display) -> Self {
        Self::InvalidInput {
            input: input.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<ParseEnumError> for CommandError {
    fn from(err: ParseEnumError) -> Self {
        Self::input(format!("{}={}", err.kind, err.input), &err)
    }
}

impl From<LedgerError> for CommandError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds { .. } => Self::precondition(err.to_string()),
            LedgerError::NonPositiveAmount | LedgerError::SelfTransfer => Self::input("amount", &err),
            LedgerError::Overflow => Self::state(&err),
        }
    }
}

impl From<RumorError> for CommandError {
    fn from(err: RumorError) -> Self {
        match err {
            RumorError::NotFound(id) => Self::NotFound {
                kind: "chain",
                id: id.to_string(),
            },
            RumorError::Inactive(_) => Self::state(&err),
            RumorError::Originator { .. } | RumorError::AlreadyLinked { .. } => {
                Self::precondition(err.to_string())
            }
            RumorError::InvalidText => Self::input("text", &err),
        }
    }
}

impl From<PartyError> for CommandError {
    fn from(err: PartyError) -> Self {
        Self::input("vibes", &err)
    }
}

impl From<PoliticsError> for CommandError {
    fn from(err: PoliticsError) -> Self {
        match &err {
            PoliticsError::NotFound(id) => Self::NotFound {
                kind: "proposal",
                id: id.to_string(),
            },
            PoliticsError::AlreadyMember(_)
            | PoliticsError::NotOpen { .. }
            | PoliticsError::AlreadyVoted(_)
            | PoliticsError::AllianceExists(..)
            | PoliticsError::NoAlliance(..) => Self::state(&err),
            PoliticsError::NoFaction(_) | PoliticsError::NotLeader(_) => {
                Self::precondition(err.to_string())
            }
            PoliticsError::InvalidChoice { choice, .. } => Self::input(choice.clone(), &err),
            PoliticsError::InvalidOptions { .. } => Self::input("options", &err),
            PoliticsError::InvalidTitle => Self::input("title", &err),
            PoliticsError::SameFaction(faction) => Self::input(faction.to_string(), &err),
        }
    }
}

impl From<MarketError> for CommandError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::UnknownItem(item) => Self::NotFound { kind: "item", id: item },
            MarketError::TradeNotFound(id) => Self::NotFound {
                kind: "trade",
                id: id.to_string(),
            },
            MarketError::TradeClosed(_) => Self::state(&err),
            MarketError::OutOfStock(_)
            | MarketError::NotInInventory(_)
            | MarketError::NotSeller(_)
            | MarketError::SellerCannotDeliver(_)
            | MarketError::BuyerCannotPay(_) => Self::precondition(err.to_string()),
            MarketError::SelfTrade => Self::input("trade", &err),
            MarketError::InvalidAsset(ref asset) => Self::input(asset.clone(), &err),
            MarketError::Ledger(inner) => inner.into(),
        }
    }
}

impl From<QuestError> for CommandError {
    fn from(err: QuestError) -> Self {
        match err {
            QuestError::NotFound(id) => Self::NotFound {
                kind: "quest",
                id: id.to_string(),
            },
            QuestError::NotAvailable(_) | QuestError::NotActive { .. } => Self::state(&err),
            QuestError::TooManyActive | QuestError::DuplicateTemplate(_) | QuestError::NotAssigned(_) => {
                Self::precondition(err.to_string())
            }
        }
    }
}

impl From<ClockError> for CommandError {
    fn from(err: ClockError) -> Self {
        Self::state(&err)
    }
}
