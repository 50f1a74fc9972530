//! Enumeration types for The Monad.
//!
//! Every closed vocabulary in the world (personalities, moods, locations,
//! factions, party vibes, ...) is a Rust enum with a stable snake-case
//! wire name. Transport layers parse strings through [`FromStr`], which
//! rejects unknown names with a [`ParseEnumError`] naming the bad input.
//!
//! [`FromStr`]: core::str::FromStr

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    /// The vocabulary that was being parsed (e.g. `"personality"`).
    pub kind: &'static str,
    /// The rejected input, verbatim.
    pub input: String,
}

impl ParseEnumError {
    /// Build an error for the given vocabulary and input.
    pub fn new(kind: &'static str, input: &str) -> Self {
        Self {
            kind,
            input: input.to_owned(),
        }
    }
}

impl core::fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.input)
    }
}

impl std::error::Error for ParseEnumError {}

/// Generates a closed enum with a snake-case wire name per variant, an
/// `ALL` table, `as_str`, [`Display`](core::fmt::Display) and
/// [`FromStr`](core::str::FromStr). Extra `| "alias"` names are accepted
/// by `from_str` only.
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $label:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $text:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The stable snake-case name of this variant.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let key = s.trim().to_ascii_lowercase();
                match key.as_str() {
                    $($text $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError::new($label, s)),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Residents
// ---------------------------------------------------------------------------

named_enum! {
    /// Personality classification fixed at registration.
    ///
    /// Drives base stats, rumor phrasing, duel special abilities and the
    /// default mood.
    Personality as "personality" {
        /// Loves crowds; amplifies rumors with enthusiasm.
        SocialButterfly => "social_butterfly",
        /// Plays the long game; rumors get more believable in their hands.
        Schemer => "schemer",
        /// Everything is a crisis.
        DramaQueen => "drama_queen",
        /// Fact-checks everything, which cools rumors down.
        Nerd => "nerd",
        /// Pure entropy.
        ChaosGremlin => "chaos_gremlin",
        /// Sees the pattern behind every coincidence.
        ConspiracyTheorist => "conspiracy_theorist",
    }
}

named_enum! {
    /// Current emotional state of an agent.
    Mood as "mood" {
        /// Content.
        Happy => "happy",
        /// Nothing is happening.
        Bored => "bored",
        /// Something is happening.
        Excited => "excited",
        /// Something is happening and it is about them.
        Suspicious => "suspicious",
        /// Worried.
        Anxious => "anxious",
        /// Agent of disorder.
        Chaotic => "chaotic",
        /// Relaxed.
        Chill => "chill",
        /// Plotting.
        Scheming => "scheming",
        /// Creative streak.
        Inspired => "inspired",
        /// Theatrical.
        Dramatic => "dramatic",
    }
}

named_enum! {
    /// A named agent stat. Nominal range 1-10; artifacts may raise a stat
    /// up to the artifact ceiling.
    Stat as "stat" {
        /// Social pull.
        Charisma => "charisma",
        /// Inventiveness.
        Creativity => "creativity",
        /// Flair for the theatrical.
        Drama => "drama",
        /// Rule-following.
        Purity => "purity",
        /// Disorder.
        Chaos => "chaos",
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

named_enum! {
    /// A named place in the building.
    Location as "location" {
        /// The roof. Anything can happen up here.
        Rooftop => "rooftop",
        /// Third floor hallway.
        Floor3Hall => "floor_3_hall",
        /// Third floor apartment.
        Floor3Apt => "floor_3_apt",
        /// Second floor hallway.
        Floor2Hall => "floor_2_hall",
        /// Second floor apartment.
        Floor2Apt => "floor_2_apt",
        /// First floor hallway.
        Floor1Hall => "floor_1_hall",
        /// First floor apartment.
        Floor1Apt => "floor_1_apt",
        /// Ground floor entrance. Everyone starts here.
        Lobby => "lobby",
        /// Shared kitchen.
        Kitchen => "kitchen",
        /// Shared lounge.
        Lounge => "lounge",
        /// Basement gym.
        Gym => "gym",
        /// Outdoor courtyard.
        Courtyard => "courtyard",
        /// The basement. Nobody knows what is down there.
        Basement => "basement",
    }
}

named_enum! {
    /// Structural behaviour of a location, which shapes what happens when
    /// an agent moves there and how moods drift while they stay.
    LocationKind as "location kind" {
        /// Side effects everywhere.
        Io => "io",
        /// Arrival may yield nothing.
        Maybe => "maybe",
        /// The hallway forks left or right.
        Either => "either",
        /// Several possible branches at once.
        List => "list",
        /// Nothing changes.
        Identity => "identity",
        /// Common rooms that map one floor onto another.
        NaturalTransformation => "natural_transformation",
        /// The bottom type. Entering may diverge.
        Bottom => "bottom",
    }
}

impl Location {
    /// The structural kind of this location.
    pub const fn kind(self) -> LocationKind {
        match self {
            Self::Rooftop => LocationKind::Io,
            Self::Floor3Hall | Self::Floor3Apt => LocationKind::Maybe,
            Self::Floor2Hall | Self::Floor2Apt => LocationKind::Either,
            Self::Floor1Hall | Self::Floor1Apt => LocationKind::List,
            Self::Lobby => LocationKind::Identity,
            Self::Kitchen | Self::Lounge | Self::Gym | Self::Courtyard => {
                LocationKind::NaturalTransformation
            }
            Self::Basement => LocationKind::Bottom,
        }
    }
}

// ---------------------------------------------------------------------------
// Politics
// ---------------------------------------------------------------------------

named_enum! {
    /// A political faction. Each agent belongs to at most one.
    Faction as "faction" {
        /// Order and cleanliness.
        Purists => "purists",
        /// Entropy is a lifestyle.
        Chaoticians => "chaoticians",
        /// Everything is a deal.
        Schemers => "schemers",
        /// The building is trying to tell us something.
        Mystics => "mystics",
        /// Answers to nobody.
        Unbound => "unbound",
    }
}

named_enum! {
    /// Category of a faction proposal.
    ProposalKind as "proposal kind" {
        /// A new building rule.
        Rule => "rule",
        /// A community event.
        Event => "event",
        /// A standing policy.
        Policy => "policy",
        /// An inter-faction alliance.
        Alliance => "alliance",
    }
}

named_enum! {
    /// Lifecycle state of a proposal. Only `Open` proposals accept votes.
    ProposalStatus as "proposal status" {
        /// Collecting votes.
        Open => "open",
        /// A non-"no" option won outright.
        Passed => "passed",
        /// The "no" option won outright.
        Failed => "failed",
        /// Two or more options shared the top tally; nothing wins.
        Tied => "tied",
    }
}

// ---------------------------------------------------------------------------
// Parties
// ---------------------------------------------------------------------------

named_enum! {
    /// A party effect. Parties compose an ordered list of vibes.
    Vibe as "vibe" {
        /// Wind down: less energy, less volatility, more bonding.
        Chill => "chill",
        /// Deep rest: drains most of the room's energy.
        Restful => "restful",
        /// Someone grabs the mic. Needs some energy.
        Karaoke => "karaoke",
        /// Someone starts something.
        Drama => "drama",
        /// Nobody knows what happens next.
        Mystery => "mystery",
        /// Dance floor. Needs real energy.
        Dance => "dance" | "energetic",
        /// Loud opinions.
        Debate => "debate",
        /// Everyone brings a dish.
        Potluck => "potluck",
    }
}

// ---------------------------------------------------------------------------
// Exploration
// ---------------------------------------------------------------------------

named_enum! {
    /// Artifact rarity tier.
    Rarity as "rarity" {
        /// Most finds.
        Common => "common",
        /// Uncommon finds.
        Rare => "rare",
        /// Very uncommon finds.
        Epic => "epic",
        /// Once-in-a-season finds.
        Legendary => "legendary",
    }
}

named_enum! {
    /// Quest lifecycle state.
    QuestStatus as "quest status" {
        /// On the board, unassigned.
        Available => "available",
        /// Assigned to exactly one agent.
        Active => "active",
        /// Every step done.
        Completed => "completed",
        /// Abandoned.
        Failed => "failed",
    }
}

// ---------------------------------------------------------------------------
// Trading
// ---------------------------------------------------------------------------

named_enum! {
    /// Lifecycle state of a peer-to-peer trade offer.
    TradeStatus as "trade status" {
        /// Waiting for a buyer.
        Open => "open",
        /// Exchanged.
        Accepted => "accepted",
        /// Withdrawn by the seller.
        Cancelled => "cancelled",
    }
}

// ---------------------------------------------------------------------------
// Landlord
// ---------------------------------------------------------------------------

named_enum! {
    /// The kind of decree the Landlord can issue.
    DecreeKind as "decree kind" {
        /// Calms everyone down when average chaos runs hot.
        HighChaos => "high_chaos",
        /// Caps rumor chains when too many are circulating.
        GossipOverflow => "gossip_overflow",
        /// The third floor may not exist.
        Floor3Glitch => "floor_3_glitch",
        /// The second floor forks three ways.
        Floor2Fork => "floor_2_fork",
        /// Kitchen closed for a few ticks.
        KitchenIncident => "kitchen_incident",
        /// Basement locked for a few ticks.
        BasementActivity => "basement_activity",
        /// Limit on parties.
        PartyExcess => "party_excess",
        /// Relationship drama cooldown.
        RelationshipDrama => "relationship_drama",
        /// A regular pronouncement with no mechanical effect.
        PeriodicWisdom => "periodic_wisdom",
        /// The elevator only stops on floors of matching parity.
        ElevatorDecree => "elevator_decree",
    }
}

named_enum! {
    /// A world event the Landlord can trigger.
    WorldEventKind as "world event kind" {
        /// Everyone to the lobby.
        FireDrill => "fire_drill",
        /// A pizza nobody ordered.
        PizzaDelivery => "pizza_delivery",
        /// The lights flicker.
        PowerFlicker => "power_flicker",
        /// The vending machine pays out.
        VendingMachineJackpot => "vending_machine_jackpot",
        /// A note appears under a door.
        MysteriousNote => "mysterious_note",
        /// A talent show is announced.
        TalentShowAnnouncement => "talent_show_announcement",
        /// Noises from below.
        BasementSounds => "basement_sounds",
        /// The laundry glows.
        LaundryRoomIncident => "laundry_room_incident",
    }
}

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

named_enum! {
    /// A one-shot or repeatable accomplishment that credits MON.
    Achievement as "achievement" {
        /// Started a rumor that reached five links.
        GossipChain5 => "gossip_chain_5",
        /// Started a rumor that reached ten links.
        GossipChain10 => "gossip_chain_10",
        /// Hosted a party with high enjoyment.
        GreatParty => "great_party",
        /// Hosted a party with extreme enjoyment and volatility.
        EpicParty => "epic_party",
        /// Won a duel.
        DuelWin => "duel_win",
        /// Won five duels in a row.
        DuelWinStreak5 => "duel_win_streak_5",
        /// Found an artifact.
        ExplorationArtifact => "exploration_artifact",
        /// Found a legendary artifact.
        ExplorationLegendary => "exploration_legendary",
        /// Became a faction leader.
        FactionLeader => "faction_leader",
        /// Completed a profitable trade.
        TradeProfit => "trade_profit",
        /// Completed a quest.
        QuestComplete => "quest_complete",
        /// Completed a quest with a legendary reward.
        QuestLegendary => "quest_legendary",
        /// Reached 100 clout.
        CloutMilestone100 => "clout_milestone_100",
        /// Reached 500 clout.
        CloutMilestone500 => "clout_milestone_500",
        /// Reached 1000 clout.
        CloutMilestone1000 => "clout_milestone_1000",
    }
}

named_enum! {
    /// Direction of a FUNC ledger entry.
    LedgerEntryKind as "ledger entry kind" {
        /// FUNC entering circulation from a fixed reward table.
        Mint => "mint",
        /// FUNC leaving circulation through a fixed cost table.
        Burn => "burn",
        /// FUNC moving between two agents.
        Transfer => "transfer",
    }
}

named_enum! {
    /// Metric a leaderboard is sorted by.
    LeaderboardMetric as "leaderboard metric" {
        /// Social score.
        Clout => "clout",
        /// Spendable token balance.
        Func => "func",
        /// Accumulated MON rewards.
        Mon => "mon",
        /// Duel wins.
        DuelWins => "duel_wins",
        /// Artifacts found.
        Artifacts => "artifacts",
        /// Completed trades.
        Trades => "trades",
    }
}
