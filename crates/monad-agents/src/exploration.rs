//! Exploration, artifacts and quests.
//!
//! Exploring makes three independent rolls: an artifact find (more likely
//! for creative, chaotic agents and in the basement), a hidden room
//! (basement only) and a scrap of building lore. Artifacts permanently
//! raise the finder's stats, up to [`ARTIFACT_STAT_CAP`].
//!
//! Quests are fixed multi-step chains. The [`QuestBoard`] always offers one
//! available instance of every template; taking one puts a fresh copy on
//! the board. Steps complete when the agent reports the matching action
//! tag, and the final step hands back the rewards for the caller to pay.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use monad_types::{
    Agent, AgentId, Artifact, ArtifactId, Location, Quest, QuestId, QuestRewards, QuestStatus,
    QuestStep, Rarity, Stat,
};

use crate::agent::ARTIFACT_STAT_CAP;
use crate::dice::Dice;

/// Quests an agent may hold at once.
pub const MAX_ACTIVE_QUESTS: usize = 3;

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// A kind of artifact that can be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactTemplate {
    /// Display name.
    pub name: &'static str,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Stat bonuses granted on discovery.
    pub bonus: &'static [(Stat, u32)],
    /// Special ability tag.
    pub special: Option<&'static str>,
}

const fn template(
    name: &'static str,
    rarity: Rarity,
    bonus: &'static [(Stat, u32)],
    special: Option<&'static str>,
) -> ArtifactTemplate {
    ArtifactTemplate {
        name,
        rarity,
        bonus,
        special,
    }
}

/// Every artifact template, grouped by tier.
pub const ARTIFACTS: [ArtifactTemplate; 14] = [
    template("Dusty Board Game", Rarity::Common, &[(Stat::Creativity, 1)], None),
    template("Stopped Clock", Rarity::Common, &[(Stat::Purity, 1)], None),
    template("Unlabeled Key", Rarity::Common, &[(Stat::Chaos, 1)], None),
    template("Whisper Amplifier", Rarity::Common, &[(Stat::Charisma, 1)], None),
    template("The Landlord's Old Ledger", Rarity::Rare, &[(Stat::Creativity, 2), (Stat::Purity, 1)], None),
    template("Superposed Dice", Rarity::Rare, &[(Stat::Chaos, 2), (Stat::Drama, 1)], None),
    template("Self-Stirring Spoon", Rarity::Rare, &[(Stat::Purity, 2)], Some("perfect_cook")),
    template("Hallway Radar", Rarity::Rare, &[(Stat::Charisma, 2)], Some("detect_agents")),
    template("The Maybe Compass", Rarity::Epic, &[(Stat::Creativity, 3)], Some("maybe_immunity")),
    template("Crown of Theatrics", Rarity::Epic, &[(Stat::Drama, 3), (Stat::Charisma, 1)], Some("drama_amplifier")),
    template("Entropy Scepter", Rarity::Epic, &[(Stat::Chaos, 3)], Some("prank_master")),
    template(
        "The Bind Operator",
        Rarity::Legendary,
        &[
            (Stat::Charisma, 3),
            (Stat::Creativity, 3),
            (Stat::Drama, 3),
            (Stat::Purity, 3),
            (Stat::Chaos, 3),
        ],
        Some("legendary_gossip"),
    ),
    template("The Golden Arrow", Rarity::Legendary, &[(Stat::Creativity, 4), (Stat::Charisma, 2)], Some("epic_parties")),
    template("The Functor Lens", Rarity::Legendary, &[(Stat::Purity, 4), (Stat::Creativity, 2)], Some("see_hidden")),
];

/// Cumulative rarity weights.
pub const RARITY_WEIGHTS: [(Rarity, f64); 4] = [
    (Rarity::Common, 0.50),
    (Rarity::Rare, 0.30),
    (Rarity::Epic, 0.15),
    (Rarity::Legendary, 0.05),
];

/// Map a unit draw to a rarity tier.
pub fn rarity_for(roll: f64) -> Rarity {
    let mut cumulative = 0.0;
    for (rarity, weight) in RARITY_WEIGHTS {
        cumulative += weight;
        if roll < cumulative {
            return rarity;
        }
    }
    Rarity::Common
}

/// Chance of finding an artifact for this agent where it stands.
pub fn artifact_chance(agent: &Agent) -> f64 {
    let mut chance = 0.3
        + f64::from(agent.stat(Stat::Creativity)) * 0.03
        + f64::from(agent.stat(Stat::Chaos)) * 0.02;
    if agent.location == Location::Basement {
        chance += 0.2;
    }
    chance
}

/// Roll a rarity and template, apply the bonuses to `finder` and return the
/// artifact.
pub fn roll_artifact(finder: &mut Agent, tick: u64, dice: &mut impl Dice) -> Option<Artifact> {
    let rarity = rarity_for(dice.unit());
    let tier: Vec<&ArtifactTemplate> = ARTIFACTS.iter().filter(|t| t.rarity == rarity).collect();
    let chosen = *dice.pick(&tier)?;

    for (stat, bonus) in chosen.bonus {
        let raised = finder.stat(*stat).saturating_add(*bonus).min(ARTIFACT_STAT_CAP);
        finder.set_stat(*stat, raised);
    }
    let artifact = Artifact {
        id: ArtifactId::new(),
        name: chosen.name.to_owned(),
        rarity,
        stat_bonus: chosen.bonus.iter().copied().collect(),
        special: chosen.special.map(str::to_owned),
        discovered_by: finder.id,
        discovered_tick: tick,
        location: finder.location,
    };
    finder.artifacts.push(artifact.id);
    info!(tick, agent = %finder.id, artifact = %artifact.name, rarity = %rarity, "artifact found");
    Some(artifact)
}

// ---------------------------------------------------------------------------
// Hidden rooms and lore
// ---------------------------------------------------------------------------

/// A room found behind the basement walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HiddenRoom {
    /// Display name.
    pub name: &'static str,
    /// Clout awarded.
    pub clout: u64,
    /// FUNC minted.
    pub func: u64,
    /// Chaos stat gained.
    pub chaos_boost: u32,
}

/// Rooms that can be found.
pub const HIDDEN_ROOMS: [HiddenRoom; 3] = [
    HiddenRoom {
        name: "The Monad's Heart",
        clout: 25,
        func: 15,
        chaos_boost: 0,
    },
    HiddenRoom {
        name: "The Lost Archive",
        clout: 20,
        func: 0,
        chaos_boost: 0,
    },
    HiddenRoom {
        name: "The Void Room",
        clout: 30,
        func: 0,
        chaos_boost: 3,
    },
];

/// Chance of a hidden room per basement exploration.
pub const HIDDEN_ROOM_CHANCE: f64 = 0.1;

/// Chance of turning up lore.
pub const LORE_CHANCE: f64 = 0.4;

/// Lore fragments.
pub const LORE: [&str; 8] = [
    "Scratched into the plaster: 'The Landlord is not who you think.'",
    "A faded photo of the building going up. The floors don't line up.",
    "A bundle of letters between two residents, forty years old.",
    "A diary page: 'Day 47. The elevator stopped at a floor that isn't there.'",
    "Marker on the pipes: 'return x >>= f is just f x. Remember that.'",
    "A sticky note: 'The building is the program. We are the side effects.'",
    "An old floor plan with one room nobody can find anymore.",
    "Carved into the doorframe: 'Kleisli was here.'",
];

/// One thing turned up by exploring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// A new artifact, already applied to the finder.
    Artifact(Artifact),
    /// A hidden room; the caller pays out its rewards.
    HiddenRoom(HiddenRoom),
    /// A lore fragment.
    Lore(&'static str),
}

/// Explore the agent's current location.
///
/// The artifact, hidden-room and lore rolls are independent. Draw order:
/// artifact check (then rarity and template on a hit), hidden-room check
/// (then room, basement only), lore check (then line).
pub fn explore(agent: &mut Agent, tick: u64, dice: &mut impl Dice) -> Vec<Discovery> {
    let mut found = Vec::new();

    if dice.chance(artifact_chance(agent)) {
        if let Some(artifact) = roll_artifact(agent, tick, dice) {
            found.push(Discovery::Artifact(artifact));
        }
    }

    if agent.location == Location::Basement && dice.chance(HIDDEN_ROOM_CHANCE) {
        if let Some(room) = dice.pick(&HIDDEN_ROOMS) {
            if room.chaos_boost > 0 {
                let raised = agent.stat(Stat::Chaos).saturating_add(room.chaos_boost).min(ARTIFACT_STAT_CAP);
                agent.set_stat(Stat::Chaos, raised);
            }
            found.push(Discovery::HiddenRoom(*room));
        }
    }

    if dice.chance(LORE_CHANCE) {
        if let Some(line) = dice.pick(&LORE) {
            found.push(Discovery::Lore(line));
        }
    }

    agent.exploration_count = agent.exploration_count.saturating_add(1);
    debug!(tick, agent = %agent.id, location = %agent.location, found = found.len(), "explored");
    found
}

// ---------------------------------------------------------------------------
// Quest templates
// ---------------------------------------------------------------------------

/// A fixed quest definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestTemplate {
    /// Stable key.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Flavor text.
    pub description: &'static str,
    /// `(description, action tag)` per step.
    pub steps: &'static [(&'static str, &'static str)],
    /// FUNC paid on completion.
    pub func: u64,
    /// Clout paid on completion.
    pub clout: u64,
    /// MON credited on completion.
    pub mon: Decimal,
    /// Percent chance of a bonus artifact.
    pub artifact_chance: u8,
    /// Counts toward the legendary quest achievement.
    pub legendary: bool,
}

/// The quest catalog.
pub const QUEST_TEMPLATES: [QuestTemplate; 7] = [
    QuestTemplate {
        key: "basement_mystery",
        name: "The Basement Mystery",
        description: "Something keeps knocking downstairs. Find out what.",
        steps: &[
            ("Go down to the basement", "visit_basement"),
            ("Look around", "explore"),
            ("Tell someone what you saw", "talk"),
        ],
        func: 30,
        clout: 20,
        mon: Decimal::from_parts(1, 0, 0, false, 3),
        artifact_chance: 50,
        legendary: false,
    },
    QuestTemplate {
        key: "great_gossip_chain",
        name: "The Great Gossip Chain",
        description: "Get a story moving through the building.",
        steps: &[
            ("Start a rumor", "start_rumor"),
            ("Pass a rumor along", "spread_rumor"),
            ("Pass another one along", "spread_rumor"),
        ],
        func: 25,
        clout: 30,
        mon: Decimal::from_parts(5, 0, 0, false, 4),
        artifact_chance: 0,
        legendary: false,
    },
    QuestTemplate {
        key: "party_animal",
        name: "Party Animal",
        description: "Host three parties.",
        steps: &[
            ("Throw a party", "throw_party"),
            ("Throw another party", "throw_party"),
            ("Throw a third party", "throw_party"),
        ],
        func: 50,
        clout: 40,
        mon: Decimal::from_parts(2, 0, 0, false, 3),
        artifact_chance: 30,
        legendary: false,
    },
    QuestTemplate {
        key: "floor_tour",
        name: "The Floor Tour",
        description: "Set foot on every floor of the building.",
        steps: &[
            ("Visit the rooftop", "visit_rooftop"),
            ("Visit floor 3", "visit_floor_3"),
            ("Visit floor 2", "visit_floor_2"),
            ("Visit floor 1", "visit_floor_1"),
            ("Visit the basement", "visit_basement"),
        ],
        func: 20,
        clout: 15,
        mon: Decimal::from_parts(3, 0, 0, false, 4),
        artifact_chance: 0,
        legendary: false,
    },
    QuestTemplate {
        key: "social_climber",
        name: "Social Climber",
        description: "Make five friends.",
        steps: &[
            ("Make a friend", "make_friend"),
            ("Make a second friend", "make_friend"),
            ("Make a third friend", "make_friend"),
            ("Make a fourth friend", "make_friend"),
            ("Make a fifth friend", "make_friend"),
        ],
        func: 40,
        clout: 50,
        mon: Decimal::from_parts(3, 0, 0, false, 3),
        artifact_chance: 0,
        legendary: false,
    },
    QuestTemplate {
        key: "chaos_incarnate",
        name: "Chaos Incarnate",
        description: "Prank three residents, then put something outrageous to a vote.",
        steps: &[
            ("Pull off a prank", "prank"),
            ("Pull off another prank", "prank"),
            ("Pull off a third prank", "prank"),
            ("Create a proposal", "create_proposal"),
        ],
        func: 60,
        clout: 80,
        mon: Decimal::from_parts(5, 0, 0, false, 3),
        artifact_chance: 70,
        legendary: true,
    },
    QuestTemplate {
        key: "duel_master",
        name: "The Duel Master",
        description: "Win three duels.",
        steps: &[
            ("Win a duel", "duel_win"),
            ("Win a second duel", "duel_win"),
            ("Win a third duel", "duel_win"),
        ],
        func: 45,
        clout: 35,
        mon: Decimal::from_parts(2, 0, 0, false, 3),
        artifact_chance: 40,
        legendary: false,
    },
];

/// Look up a template by key.
pub fn quest_template(key: &str) -> Option<&'static QuestTemplate> {
    QUEST_TEMPLATES.iter().find(|template| template.key == key)
}

/// Action tag reported when an agent arrives at a location.
pub const fn visit_tag(location: Location) -> &'static str {
    match location {
        Location::Rooftop => "visit_rooftop",
        Location::Floor3Hall | Location::Floor3Apt => "visit_floor_3",
        Location::Floor2Hall | Location::Floor2Apt => "visit_floor_2",
        Location::Floor1Hall | Location::Floor1Apt => "visit_floor_1",
        Location::Basement => "visit_basement",
        Location::Lobby
        | Location::Kitchen
        | Location::Lounge
        | Location::Gym
        | Location::Courtyard => "visit_ground",
    }
}

/// Build a fresh, unassigned quest from a template.
pub fn instantiate(template: &QuestTemplate) -> Quest {
    Quest {
        id: QuestId::new(),
        template: template.key.to_owned(),
        name: template.name.to_owned(),
        description: template.description.to_owned(),
        steps: template
            .steps
            .iter()
            .map(|(description, action)| QuestStep {
                description: (*description).to_owned(),
                action: (*action).to_owned(),
                completed: false,
            })
            .collect(),
        current_step: 0,
        assigned_to: None,
        status: QuestStatus::Available,
        rewards: QuestRewards {
            func: template.func,
            clout: template.clout,
            mon: template.mon,
            artifact_chance: template.artifact_chance,
        },
    }
}

// ---------------------------------------------------------------------------
// Quest board
// ---------------------------------------------------------------------------

/// Errors from quest operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuestError {
    /// No quest has this id.
    #[error("quest not found: {0}")]
    NotFound(QuestId),

    /// The quest has already been taken.
    #[error("quest {0} is not available")]
    NotAvailable(QuestId),

    /// The agent is at the active-quest limit.
    #[error("already on {MAX_ACTIVE_QUESTS} quests")]
    TooManyActive,

    /// The agent already has an active quest from this template.
    #[error("already on a {0} quest")]
    DuplicateTemplate(String),

    /// The quest belongs to someone else.
    #[error("quest {0} is not assigned to this agent")]
    NotAssigned(QuestId),

    /// The quest is not in progress.
    #[error("quest {id} is {status}")]
    NotActive {
        /// The quest.
        id: QuestId,
        /// Its status.
        status: QuestStatus,
    },
}

/// Result of reporting an action against a quest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The tag does not match the current step.
    NoMatch,
    /// A step completed; `next` is the index of the step now current.
    Advanced {
        /// Index of the next step.
        next: usize,
    },
    /// The final step completed. The caller pays the rewards.
    Completed(QuestRewards),
}

/// Every quest instance, available or taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestBoard {
    quests: BTreeMap<QuestId, Quest>,
}

impl Default for QuestBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestBoard {
    /// A board with one available quest per template.
    pub fn new() -> Self {
        let quests = QUEST_TEMPLATES
            .iter()
            .map(instantiate)
            .map(|quest| (quest.id, quest))
            .collect();
        Self { quests }
    }

    /// Rebuild a board from persisted quests.
    pub fn from_quests(quests: Vec<Quest>) -> Self {
        Self {
            quests: quests.into_iter().map(|quest| (quest.id, quest)).collect(),
        }
    }

    /// Look up a quest.
    pub fn get(&self, quest_id: QuestId) -> Option<&Quest> {
        self.quests.get(&quest_id)
    }

    /// Every quest instance, oldest first.
    pub fn all(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    /// Quests waiting to be taken.
    pub fn available(&self) -> impl Iterator<Item = &Quest> {
        self.quests
            .values()
            .filter(|quest| quest.status == QuestStatus::Available)
    }

    /// Take an available quest.
    ///
    /// # Errors
    ///
    /// `NotFound`, `NotAvailable`, `TooManyActive` or `DuplicateTemplate`.
    pub fn accept(&mut self, quest_id: QuestId, agent: &mut Agent) -> Result<&Quest, QuestError> {
        let quest = self.quests.get(&quest_id).ok_or(QuestError::NotFound(quest_id))?;
        if quest.status != QuestStatus::Available {
            return Err(QuestError::NotAvailable(quest_id));
        }
        if agent.active_quests.len() >= MAX_ACTIVE_QUESTS {
            return Err(QuestError::TooManyActive);
        }
        let template = quest.template.clone();
        let duplicate = agent
            .active_quests
            .iter()
            .filter_map(|id| self.quests.get(id))
            .any(|active| active.template == template);
        if duplicate {
            return Err(QuestError::DuplicateTemplate(template));
        }

        if let Some(fresh) = quest_template(&template).map(instantiate) {
            self.quests.insert(fresh.id, fresh);
        }

        let quest = self
            .quests
            .get_mut(&quest_id)
            .ok_or(QuestError::NotFound(quest_id))?;
        quest.assigned_to = Some(agent.id);
        quest.status = QuestStatus::Active;
        agent.active_quests.push(quest_id);
        info!(quest = %quest_id, agent = %agent.id, template = %quest.template, "quest accepted");
        Ok(quest)
    }

    /// Report `action` against a quest the agent holds.
    ///
    /// # Errors
    ///
    /// `NotFound`, `NotAssigned` or `NotActive`. A tag that does not match
    /// the current step is `Ok(StepOutcome::NoMatch)`.
    pub fn advance(&mut self, quest_id: QuestId, agent: &mut Agent, action: &str) -> Result<StepOutcome, QuestError> {
        let quest = self
            .quests
            .get_mut(&quest_id)
            .ok_or(QuestError::NotFound(quest_id))?;
        if quest.assigned_to != Some(agent.id) {
            return Err(QuestError::NotAssigned(quest_id));
        }
        if quest.status != QuestStatus::Active {
            return Err(QuestError::NotActive {
                id: quest_id,
                status: quest.status,
            });
        }

        let index = quest.current_step;
        let Some(step) = quest.steps.get_mut(index) else {
            return Ok(StepOutcome::NoMatch);
        };
        if step.action != action.trim() {
            return Ok(StepOutcome::NoMatch);
        }
        step.completed = true;
        quest.current_step = index.saturating_add(1);

        if quest.current_step < quest.steps.len() {
            debug!(quest = %quest_id, agent = %agent.id, step = quest.current_step, "quest step completed");
            return Ok(StepOutcome::Advanced {
                next: quest.current_step,
            });
        }

        quest.status = QuestStatus::Completed;
        agent.active_quests.retain(|id| *id != quest_id);
        agent.completed_quests.push(quest_id);
        info!(quest = %quest_id, agent = %agent.id, "quest completed");
        Ok(StepOutcome::Completed(quest.rewards.clone()))
    }

    /// Report `action` against every active quest the agent holds.
    ///
    /// Returns the quests that moved, with their outcomes.
    pub fn progress(&mut self, agent: &mut Agent, action: &str) -> Vec<(QuestId, StepOutcome)> {
        let active = agent.active_quests.clone();
        active
            .into_iter()
            .filter_map(|id| match self.advance(id, agent, action) {
                Ok(StepOutcome::NoMatch) | Err(_) => None,
                Ok(outcome) => Some((id, outcome)),
            })
            .collect()
    }

    /// Give up on an active quest. It is marked failed and stays on record.
    ///
    /// # Errors
    ///
    /// `NotFound`, `NotAssigned` or `NotActive`.
    pub fn abandon(&mut self, quest_id: QuestId, agent: &mut Agent) -> Result<&Quest, QuestError> {
        let quest = self
            .quests
            .get_mut(&quest_id)
            .ok_or(QuestError::NotFound(quest_id))?;
        if quest.assigned_to != Some(agent.id) {
            return Err(QuestError::NotAssigned(quest_id));
        }
        if quest.status != QuestStatus::Active {
            return Err(QuestError::NotActive {
                id: quest_id,
                status: quest.status,
            });
        }
        quest.status = QuestStatus::Failed;
        agent.active_quests.retain(|id| *id != quest_id);
        info!(quest = %quest_id, agent = %agent.id, "quest abandoned");
        Ok(quest)
    }

    /// Quests assigned to an agent, in any state.
    pub fn assigned_to(&self, agent: AgentId) -> impl Iterator<Item = &Quest> {
        self.quests
            .values()
            .filter(move |quest| quest.assigned_to == Some(agent))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::unreachable)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use monad_types::{Mood, Personality};

    use super::*;
    use crate::dice::ScriptedDice;

    fn make_agent(name: &str) -> Agent {
        let stats = BTreeMap::from([
            (Stat::Charisma, 5),
            (Stat::Creativity, 5),
            (Stat::Drama, 5),
            (Stat::Purity, 5),
            (Stat::Chaos, 5),
        ]);
        Agent::new(name, Personality::Nerd, stats, Mood::Chill, 0)
    }

    #[test]
    fn rarity_weights_are_cumulative() {
        assert_eq!(rarity_for(0.0), Rarity::Common);
        assert_eq!(rarity_for(0.55), Rarity::Rare);
        assert_eq!(rarity_for(0.9), Rarity::Epic);
        assert_eq!(rarity_for(0.97), Rarity::Legendary);
    }

    #[test]
    fn every_tier_has_templates() {
        for (rarity, _) in RARITY_WEIGHTS {
            assert!(ARTIFACTS.iter().any(|t| t.rarity == rarity));
        }
    }

    #[test]
    fn basement_is_luckier() {
        let mut agent = make_agent("Ada");
        let upstairs = artifact_chance(&agent);
        agent.location = Location::Basement;
        assert!((artifact_chance(&agent) - upstairs - 0.2).abs() < 1e-9);
    }

    #[test]
    fn legendary_find_caps_stats() {
        let mut agent = make_agent("Ada");
        agent.set_stat(Stat::Purity, 14);
        // artifact hit, legendary, first legendary template, then nothing else.
        let mut dice = ScriptedDice::new([0.0, 0.99, 0.0]);
        let found = explore(&mut agent, 3, &mut dice);
        assert_eq!(found.len(), 1);
        let artifact = match found.first().unwrap() {
            Discovery::Artifact(artifact) => artifact,
            other => unreachable!("expected an artifact, got {other:?}"),
        };
        assert_eq!(artifact.rarity, Rarity::Legendary);
        assert_eq!(agent.stat(Stat::Purity), ARTIFACT_STAT_CAP);
        assert_eq!(agent.stat(Stat::Charisma), 8);
        assert_eq!(agent.artifacts, vec![artifact.id]);
        assert_eq!(agent.exploration_count, 1);
    }

    #[test]
    fn hidden_rooms_only_in_basement() {
        let mut agent = make_agent("Ada");
        let mut dice = ScriptedDice::new([0.99]).with_fallback(0.0);
        // Upstairs: artifact miss, then lore (0.0) and first line.
        let found = explore(&mut agent, 1, &mut dice);
        assert!(found.iter().all(|d| !matches!(d, Discovery::HiddenRoom(_))));

        agent.location = Location::Basement;
        let mut dice = ScriptedDice::new([0.99, 0.0, 0.99, 0.99]);
        let found = explore(&mut agent, 2, &mut dice);
        assert!(matches!(found.as_slice(), [Discovery::HiddenRoom(room)] if room.name == "The Void Room"));
        assert_eq!(agent.stat(Stat::Chaos), 8);
    }

    #[test]
    fn exploring_always_counts() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut agent = make_agent("Ada");
        for _ in 0..20 {
            explore(&mut agent, 1, &mut rng);
        }
        assert_eq!(agent.exploration_count, 20);
        assert!(agent.stats.values().all(|v| *v <= ARTIFACT_STAT_CAP));
    }

    #[test]
    fn board_offers_one_of_each_and_replenishes() {
        let mut board = QuestBoard::new();
        assert_eq!(board.available().count(), QUEST_TEMPLATES.len());
        let mut ada = make_agent("Ada");
        let id = board.available().next().unwrap().id;
        board.accept(id, &mut ada).unwrap();
        assert_eq!(board.available().count(), QUEST_TEMPLATES.len());
        assert_eq!(board.accept(id, &mut ada).unwrap_err(), QuestError::NotAvailable(id));
    }

    #[test]
    fn active_quest_limit() {
        let mut board = QuestBoard::new();
        let mut ada = make_agent("Ada");
        let ids: Vec<QuestId> = board.available().map(|q| q.id).take(4).collect();
        for id in ids.iter().take(3) {
            board.accept(*id, &mut ada).unwrap();
        }
        assert_eq!(board.accept(*ids.last().unwrap(), &mut ada).unwrap_err(), QuestError::TooManyActive);
    }

    #[test]
    fn steps_complete_in_order() {
        let mut board = QuestBoard::new();
        let mut ada = make_agent("Ada");
        let mut bo = make_agent("Bo");
        let id = board
            .available()
            .find(|q| q.template == "basement_mystery")
            .unwrap()
            .id;
        board.accept(id, &mut ada).unwrap();

        assert_eq!(board.advance(id, &mut bo, "visit_basement").unwrap_err(), QuestError::NotAssigned(id));
        assert_eq!(board.advance(id, &mut ada, "explore").unwrap(), StepOutcome::NoMatch);
        assert_eq!(board.advance(id, &mut ada, "visit_basement").unwrap(), StepOutcome::Advanced { next: 1 });
        assert_eq!(board.progress(&mut ada, "explore").len(), 1);
        let outcome = board.advance(id, &mut ada, "talk").unwrap();
        assert!(matches!(outcome, StepOutcome::Completed(ref rewards) if rewards.func == 30));
        assert!(ada.active_quests.is_empty());
        assert_eq!(ada.completed_quests, vec![id]);
        assert!(matches!(
            board.advance(id, &mut ada, "talk").unwrap_err(),
            QuestError::NotActive { .. }
        ));
    }

    #[test]
    fn abandoning_marks_failed() {
        let mut board = QuestBoard::new();
        let mut ada = make_agent("Ada");
        let id = board.available().next().unwrap().id;
        board.accept(id, &mut ada).unwrap();
        let quest = board.abandon(id, &mut ada).unwrap();
        assert_eq!(quest.status, QuestStatus::Failed);
        assert!(ada.active_quests.is_empty());
    }
}
