//! Fixed reward and cost tables.
//!
//! FUNC only enters or leaves circulation through these tables, which is
//! what makes the conservation check meaningful.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use monad_types::Achievement;

/// Reasons an agent earns clout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloutReward {
    /// Hosted a party.
    ThrowParty,
    /// Hosted a party people loved.
    GreatParty,
    /// Started a rumor that reached five links.
    GossipChain5,
    /// Started a rumor that reached three links.
    GossipChain3,
    /// Started a rumor.
    StartGossip,
    /// Won the talent show.
    TalentShowWin,
    /// Performed at the talent show.
    TalentShowPerform,
    /// Caused a building-wide event.
    CauseBuildingEvent,
    /// Made a friend.
    MakeFriend,
    /// Made a rival.
    MakeRival,
    /// Went into the basement.
    ExploreBasement,
    /// Cooked for other residents.
    CookForOthers,
    /// Pulled off a prank.
    PrankSuccess,
    /// A prank went wrong (still memorable).
    PrankBackfire,
    /// Was talked about.
    BeGossipSubject,
    /// Showed up to a party.
    PartyAttendance,
}

impl CloutReward {
    /// Clout granted for this reason.
    pub const fn amount(self) -> u64 {
        match self {
            Self::ThrowParty => 15,
            Self::GreatParty => 30,
            Self::GossipChain5 => 25,
            Self::GossipChain3 | Self::TalentShowPerform | Self::CookForOthers | Self::BeGossipSubject => 10,
            Self::StartGossip | Self::PartyAttendance => 5,
            Self::TalentShowWin => 40,
            Self::CauseBuildingEvent => 20,
            Self::MakeFriend | Self::PrankBackfire => 8,
            Self::MakeRival => 12,
            Self::ExploreBasement => 15,
            Self::PrankSuccess => 18,
        }
    }

    /// Stable reason code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ThrowParty => "throw_party",
            Self::GreatParty => "great_party",
            Self::GossipChain5 => "gossip_chain_5",
            Self::GossipChain3 => "gossip_chain_3",
            Self::StartGossip => "start_gossip",
            Self::TalentShowWin => "talent_show_win",
            Self::TalentShowPerform => "talent_show_perform",
            Self::CauseBuildingEvent => "cause_building_event",
            Self::MakeFriend => "make_friend",
            Self::MakeRival => "make_rival",
            Self::ExploreBasement => "explore_basement",
            Self::CookForOthers => "cook_for_others",
            Self::PrankSuccess => "prank_success",
            Self::PrankBackfire => "prank_backfire",
            Self::BeGossipSubject => "be_gossip_subject",
            Self::PartyAttendance => "party_attendance",
        }
    }
}

/// Fixed FUNC sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuncCost {
    /// Hosting a party.
    ThrowParty,
    /// Buying from the market (price set by the market, not this table).
    BuyItem,
    /// Bribing the Landlord.
    BribeLandlord,
    /// Betting on the talent show.
    TalentShowBet,
    /// Basement expedition fee.
    ExploreBasement,
}

impl FuncCost {
    /// Table amount. Market purchases use the live price instead.
    pub const fn amount(self) -> u64 {
        match self {
            Self::ThrowParty => 20,
            Self::BuyItem => 10,
            Self::BribeLandlord => 50,
            Self::TalentShowBet => 15,
            Self::ExploreBasement => 5,
        }
    }

    /// Stable reason code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ThrowParty => "throw_party",
            Self::BuyItem => "buy_item",
            Self::BribeLandlord => "bribe_landlord",
            Self::TalentShowBet => "talent_show_bet",
            Self::ExploreBasement => "explore_basement",
        }
    }
}

/// Fixed FUNC sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuncReward {
    /// Starting balance minted at registration.
    Registration,
    /// Cooked for other residents.
    CookForOthers,
    /// Helped a neighbor.
    HelpNeighbor,
    /// Won a bet.
    WinBet,
    /// Sold to the market (price set by the market, not this table).
    SellItem,
    /// Tip from a party guest.
    PartyTip,
    /// Quest payout (amount set by the quest, not this table).
    QuestReward,
}

impl FuncReward {
    /// Table amount. Registration, market sales and quests supply their own.
    pub const fn amount(self) -> u64 {
        match self {
            Self::Registration => 100,
            Self::CookForOthers => 8,
            Self::HelpNeighbor => 10,
            Self::WinBet => 30,
            Self::SellItem => 12,
            Self::PartyTip => 5,
            Self::QuestReward => 0,
        }
    }

    /// Stable reason code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::CookForOthers => "cook_for_others",
            Self::HelpNeighbor => "help_neighbor",
            Self::WinBet => "win_bet",
            Self::SellItem => "sell_item",
            Self::PartyTip => "party_tip",
            Self::QuestReward => "quest_reward",
        }
    }
}

/// MON credited each time an achievement is granted.
pub const fn achievement_mon(achievement: Achievement) -> Decimal {
    match achievement {
        Achievement::GossipChain5 | Achievement::QuestComplete => Decimal::from_parts(5, 0, 0, false, 4),
        Achievement::GossipChain10 | Achievement::FactionLeader => Decimal::from_parts(2, 0, 0, false, 3),
        Achievement::GreatParty
        | Achievement::ExplorationArtifact
        | Achievement::CloutMilestone100 => Decimal::from_parts(1, 0, 0, false, 3),
        Achievement::EpicParty | Achievement::QuestLegendary | Achievement::CloutMilestone500 => {
            Decimal::from_parts(5, 0, 0, false, 3)
        }
        Achievement::DuelWin => Decimal::from_parts(3, 0, 0, false, 4),
        Achievement::DuelWinStreak5 => Decimal::from_parts(3, 0, 0, false, 3),
        Achievement::ExplorationLegendary | Achievement::CloutMilestone1000 => {
            Decimal::from_parts(1, 0, 0, false, 2)
        }
        Achievement::TradeProfit => Decimal::from_parts(1, 0, 0, false, 4),
    }
}

/// Whether an achievement credits MON every time it is earned, rather than
/// only the first time.
pub const fn is_repeatable(achievement: Achievement) -> bool {
    matches!(
        achievement,
        Achievement::DuelWin
            | Achievement::TradeProfit
            | Achievement::QuestComplete
            | Achievement::ExplorationArtifact
            | Achievement::GreatParty
    )
}

/// Clout thresholds and the achievement each one unlocks.
pub const CLOUT_MILESTONES: [(u64, Achievement); 3] = [
    (100, Achievement::CloutMilestone100),
    (500, Achievement::CloutMilestone500),
    (1000, Achievement::CloutMilestone1000),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clout_table_matches_design_values() {
        assert_eq!(CloutReward::ThrowParty.amount(), 15);
        assert_eq!(CloutReward::GreatParty.amount(), 30);
        assert_eq!(CloutReward::PrankSuccess.amount(), 18);
        assert_eq!(CloutReward::PartyAttendance.amount(), 5);
        assert_eq!(CloutReward::ExploreBasement.as_str(), "explore_basement");
    }

    #[test]
    fn achievement_values_are_exact_decimals() {
        assert_eq!(achievement_mon(Achievement::DuelWin).to_string(), "0.0003");
        assert_eq!(achievement_mon(Achievement::CloutMilestone1000).to_string(), "0.01");
        assert_eq!(achievement_mon(Achievement::GossipChain5).to_string(), "0.0005");
    }

    #[test]
    fn milestones_are_ascending() {
        assert!(CLOUT_MILESTONES.windows(2).all(|w| match w {
            [a, b] => a.0 < b.0,
            _ => false,
        }));
    }
}
