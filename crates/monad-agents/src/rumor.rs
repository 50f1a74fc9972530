//! Rumor propagation.
//!
//! A rumor is a [`Chain`]: an original text plus an append-only list of
//! retellings. Each retelling takes the *latest* version of the text and
//! runs it through the teller's personality, so a chain drifts further from
//! its origin with every hop. Propagation is irreversible and
//! order-sensitive: an agent can retell a given rumor at most once, and the
//! originator never retells their own.
//!
//! ## Retelling
//!
//! 1. Pick the teller's [`RumorProfile`] (credibility/spiciness deltas plus
//!    four phrasing templates).
//! 2. Render the lowercased tail text through one template.
//! 3. Clamp credibility and spiciness to `0..=100`.
//! 4. Above the spicy threshold, maybe splice in an embellishment.
//! 5. Append the link and bump the mutation counter.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use monad_types::{Agent, AgentId, Chain, ChainId, ChainLink, Personality};

use crate::dice::Dice;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Credibility of a freshly started rumor.
pub const INITIAL_CREDIBILITY: u8 = 50;

/// Spiciness of a freshly started rumor.
pub const INITIAL_SPICINESS: u8 = 30;

/// Retired chains kept for queries.
pub const COMPLETED_CAPACITY: usize = 200;

/// Longest rumor text accepted from an agent.
pub const MAX_RUMOR_LEN: usize = 280;

/// Embellishments spliced into very spicy rumors.
pub const SPICY_MUTATIONS: [&str; 7] = [
    "secretly",
    "allegedly",
    "according to several reliable sources",
    "under extremely suspicious circumstances",
    "when everyone else was asleep",
    "and the lobby camera caught all of it",
    "in a scene nobody can fully explain",
];

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// How a personality retells a rumor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RumorProfile {
    /// Change to credibility per retelling.
    pub credibility_delta: i32,
    /// Change to spiciness per retelling.
    pub spiciness_delta: i32,
    /// Phrasing templates; `{content}` is replaced by the tail text.
    pub templates: [&'static str; 4],
}

/// The retelling profile for a personality.
pub const fn profile(personality: Personality) -> RumorProfile {
    match personality {
        Personality::SocialButterfly => RumorProfile {
            credibility_delta: -5,
            spiciness_delta: 15,
            templates: [
                "Oh my GOD, {content}! And literally EVERYONE knows!",
                "Okay so apparently {content}. Can you BELIEVE it?!",
                "{content}, and it has been going on for MONTHS!",
                "You did not hear this from me, but {content}. Crazy, right?",
            ],
        },
        Personality::Schemer => RumorProfile {
            credibility_delta: 5,
            spiciness_delta: 10,
            templates: [
                "Curious. So {content}. Now ask yourself who benefits.",
                "{content}. Which is awfully convenient for someone.",
                "I looked into it. {content}. And that is only the beginning.",
                "{content}. Think about what that means for the rest of us.",
            ],
        },
        Personality::DramaQueen => RumorProfile {
            credibility_delta: -15,
            spiciness_delta: 30,
            templates: [
                "I am LITERALLY shaking. {content}!! Biggest scandal this building has EVER seen!!",
                "Everybody STOP. {content}. I cannot even process this.",
                "{content}!!! And NOBODY is doing anything about it!!!",
                "I TOLD you all. {content}. I KNEW it!",
            ],
        },
        Personality::Nerd => RumorProfile {
            credibility_delta: 20,
            spiciness_delta: -15,
            templates: [
                "Technically speaking, {content}. Pending verification.",
                "Based on available data, {content}. Sample size is small, though.",
                "{content}. The numbers are consistent with that.",
                "I cross-referenced it and {content}. Interpret as you like.",
            ],
        },
        Personality::ChaosGremlin => RumorProfile {
            credibility_delta: -20,
            spiciness_delta: 25,
            templates: [
                "lol so {content} and also I set off the smoke alarm",
                "{content}. Anyway I put hot sauce in the coffee machine.",
                "hehe {content}. I might have made it slightly worse.",
                "{content}. Unrelated but who owns the plunger?",
            ],
        },
        Personality::ConspiracyTheorist => RumorProfile {
            credibility_delta: -10,
            spiciness_delta: 20,
            templates: [
                "Wake up. {content}. Now explain why the elevator skips floor 2.",
                "{content}. The Landlord is hoping you never find out.",
                "I have notes on this. {content}. It all leads to the basement.",
                "{content}. Coincidence? There are no coincidences in this building.",
            ],
        },
    }
}

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

/// Thresholds that shape propagation and retirement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RumorTuning {
    /// Spiciness above which embellishments may be spliced in.
    pub spicy_threshold: u8,
    /// Probability of an embellishment once above the threshold.
    pub spicy_mutation_chance: f64,
    /// Retire a chain once it has this many retellings.
    pub max_mutations: u32,
    /// Retire a chain once it is older than this many ticks.
    pub max_age: u64,
}

impl Default for RumorTuning {
    fn default() -> Self {
        Self {
            spicy_threshold: 70,
            spicy_mutation_chance: 0.4,
            max_mutations: 8,
            max_age: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the rumor engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RumorError {
    /// No active or retired chain has this id.
    #[error("rumor chain not found: {0}")]
    NotFound(ChainId),

    /// The chain has been retired.
    #[error("rumor chain {0} is no longer active")]
    Inactive(ChainId),

    /// The originator tried to retell their own rumor.
    #[error("agent {agent} started rumor {chain} and cannot retell it")]
    Originator {
        /// The chain.
        chain: ChainId,
        /// The originator.
        agent: AgentId,
    },

    /// The agent already retold this rumor.
    #[error("agent {agent} already retold rumor {chain}")]
    AlreadyLinked {
        /// The chain.
        chain: ChainId,
        /// The repeat teller.
        agent: AgentId,
    },

    /// The rumor text is empty or too long.
    #[error("rumor text must be 1-{MAX_RUMOR_LEN} characters")]
    InvalidText,
}

// ---------------------------------------------------------------------------
// Pure retelling
// ---------------------------------------------------------------------------

/// Clamp `value + delta` into `0..=100`.
fn shift_score(value: u8, delta: i32) -> u8 {
    let shifted = i32::from(value).saturating_add(delta).clamp(0, 100);
    u8::try_from(shifted).unwrap_or(100)
}

/// Render `text` through a template.
pub fn render(template: &str, text: &str) -> String {
    template.replacen("{content}", &text.to_lowercase(), 1)
}

/// Splice an embellishment in front of the first sentence break.
///
/// Text without a period is returned unchanged.
pub fn embellish(text: &str, mutation: &str) -> String {
    text.replacen('.', &format!(", {mutation}."), 1)
}

/// Retell a chain through an agent, mutating the chain in place.
///
/// # Errors
///
/// Returns [`RumorError::Inactive`], [`RumorError::Originator`] or
/// [`RumorError::AlreadyLinked`]; the chain is untouched on error.
pub fn bind(
    chain: &mut Chain,
    teller: &mut Agent,
    tick: u64,
    tuning: &RumorTuning,
    dice: &mut impl Dice,
) -> Result<(), RumorError> {
    if !chain.active {
        return Err(RumorError::Inactive(chain.id));
    }
    if chain.originator == teller.id {
        return Err(RumorError::Originator {
            chain: chain.id,
            agent: teller.id,
        });
    }
    if chain.links.iter().any(|link| link.agent_id == teller.id) {
        return Err(RumorError::AlreadyLinked {
            chain: chain.id,
            agent: teller.id,
        });
    }

    let profile = profile(teller.personality);
    let template = dice
        .pick(&profile.templates)
        .copied()
        .unwrap_or("{content}");
    let mut content = render(template, chain.current_text());

    let credibility = shift_score(chain.credibility, profile.credibility_delta);
    let spiciness = shift_score(chain.spiciness, profile.spiciness_delta);

    if spiciness > tuning.spicy_threshold && dice.chance(tuning.spicy_mutation_chance) {
        if let Some(mutation) = dice.pick(&SPICY_MUTATIONS) {
            content = embellish(&content, mutation);
        }
    }

    chain.links.push(ChainLink {
        agent_id: teller.id,
        agent_name: teller.name.clone(),
        personality: teller.personality,
        content,
        tick,
    });
    chain.credibility = credibility;
    chain.spiciness = spiciness;
    chain.mutations = chain.mutations.saturating_add(1);
    teller.gossip_heard.insert(chain.id);
    Ok(())
}

/// Whether a chain has run its course.
pub const fn should_retire(chain: &Chain, tick: u64, tuning: &RumorTuning) -> bool {
    chain.mutations >= tuning.max_mutations
        || tick.saturating_sub(chain.started_tick) > tuning.max_age
}

// ---------------------------------------------------------------------------
// RumorMill
// ---------------------------------------------------------------------------

/// Every rumor in the building, active and retired.
#[derive(Debug, Clone, Default)]
pub struct RumorMill {
    /// Chains still accepting retellings.
    active: BTreeMap<ChainId, Chain>,
    /// Retired chains, oldest first.
    completed: VecDeque<Chain>,
}

impl RumorMill {
    /// An empty mill.
    pub const fn new() -> Self {
        Self {
            active: BTreeMap::new(),
            completed: VecDeque::new(),
        }
    }

    /// Rebuild a mill from persisted chains.
    pub fn from_parts(active: Vec<Chain>, completed: Vec<Chain>) -> Self {
        Self {
            active: active.into_iter().map(|chain| (chain.id, chain)).collect(),
            completed: completed.into(),
        }
    }

    /// Start a new rumor.
    ///
    /// # Errors
    ///
    /// Returns [`RumorError::InvalidText`] for empty or oversized text.
    pub fn start(&mut self, originator: &mut Agent, text: &str, tick: u64) -> Result<&Chain, RumorError> {
        let text = text.trim();
        if text.is_empty() || text.chars().count() > MAX_RUMOR_LEN {
            return Err(RumorError::InvalidText);
        }
        let chain = Chain {
            id: ChainId::new(),
            originator: originator.id,
            originator_name: originator.name.clone(),
            original: text.to_owned(),
            credibility: INITIAL_CREDIBILITY,
            spiciness: INITIAL_SPICINESS,
            links: Vec::new(),
            mutations: 0,
            active: true,
            started_tick: tick,
        };
        originator.gossip_started.insert(chain.id);
        originator.gossip_heard.insert(chain.id);
        debug!(tick, chain = %chain.id, originator = %originator.id, "rumor started");

        let id = chain.id;
        Ok(self.active.entry(id).or_insert(chain))
    }

    /// Retell an active rumor through `teller`.
    ///
    /// # Errors
    ///
    /// [`RumorError::NotFound`] for unknown ids, [`RumorError::Inactive`]
    /// for retired chains, plus every error of [`bind`].
    pub fn propagate(
        &mut self,
        chain_id: ChainId,
        teller: &mut Agent,
        tick: u64,
        tuning: &RumorTuning,
        dice: &mut impl Dice,
    ) -> Result<&Chain, RumorError> {
        let Some(chain) = self.active.get_mut(&chain_id) else {
            if self.completed.iter().any(|chain| chain.id == chain_id) {
                return Err(RumorError::Inactive(chain_id));
            }
            return Err(RumorError::NotFound(chain_id));
        };
        bind(chain, teller, tick, tuning, dice)?;
        debug!(tick, chain = %chain_id, teller = %teller.id, links = chain.links.len(), "rumor spread");
        Ok(chain)
    }

    /// Deactivate a chain and move it to the retired collection.
    pub fn retire(&mut self, chain_id: ChainId) -> Option<&Chain> {
        let mut chain = self.active.remove(&chain_id)?;
        chain.active = false;
        self.completed.push_back(chain);
        while self.completed.len() > COMPLETED_CAPACITY {
            self.completed.pop_front();
        }
        self.completed.back()
    }

    /// Ids of active chains that should be retired at `tick`.
    pub fn due_for_retirement(&self, tick: u64, tuning: &RumorTuning) -> Vec<ChainId> {
        self.active
            .values()
            .filter(|chain| should_retire(chain, tick, tuning))
            .map(|chain| chain.id)
            .collect()
    }

    /// Look up a chain, active or retired.
    pub fn get(&self, chain_id: ChainId) -> Option<&Chain> {
        self.active
            .get(&chain_id)
            .or_else(|| self.completed.iter().find(|chain| chain.id == chain_id))
    }

    /// Active chains, in id (creation) order.
    pub fn active(&self) -> impl Iterator<Item = &Chain> {
        self.active.values()
    }

    /// Retired chains, oldest first.
    pub fn completed(&self) -> impl Iterator<Item = &Chain> {
        self.completed.iter()
    }

    /// Number of active chains.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// The active chain with the highest spiciness, if any.
    pub fn spiciest(&self) -> Option<&Chain> {
        self.active.values().max_by_key(|chain| chain.spiciness)
    }

    /// Raise an active chain's spiciness, capped at 100.
    pub fn heat(&mut self, chain_id: ChainId, delta: u8) -> Option<&Chain> {
        let chain = self.active.get_mut(&chain_id)?;
        chain.spiciness = shift_score(chain.spiciness, i32::from(delta));
        Some(chain)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::agent::create_agent;
    use crate::dice::ScriptedDice;

    fn make_agent(name: &str, personality: Personality) -> Agent {
        let mut dice = ScriptedDice::new([0.5; 5]);
        create_agent(name, personality, 0, &mut dice)
    }

    #[test]
    fn start_creates_active_empty_chain() {
        let mut mill = RumorMill::new();
        let mut ada = make_agent("Ada", Personality::Schemer);
        let chain = mill.start(&mut ada, "the plant is plastic", 3).unwrap();
        assert!(chain.active);
        assert!(chain.is_empty());
        assert_eq!(chain.credibility, INITIAL_CREDIBILITY);
        assert_eq!(chain.spiciness, INITIAL_SPICINESS);
        assert!(ada.gossip_started.contains(&chain.id));
    }

    #[test]
    fn start_rejects_blank_text() {
        let mut mill = RumorMill::new();
        let mut ada = make_agent("Ada", Personality::Schemer);
        assert_eq!(mill.start(&mut ada, "   ", 0).unwrap_err(), RumorError::InvalidText);
    }

    #[test]
    fn single_dramatic_retelling_changes_text() {
        let mut mill = RumorMill::new();
        let mut ada = make_agent("Ada", Personality::Nerd);
        let mut bea = make_agent("Bea", Personality::DramaQueen);
        let id = mill.start(&mut ada, "X", 0).unwrap().id;

        let mut dice = ScriptedDice::new([0.0]);
        let chain = mill
            .propagate(id, &mut bea, 1, &RumorTuning::default(), &mut dice)
            .unwrap();
        assert_eq!(chain.len(), 1);
        assert_ne!(chain.current_text(), "X");
        assert!(chain.current_text().contains('x'));
        assert!(chain.current_text().contains("!!"));
        assert_eq!(chain.spiciness, 60);
        assert_eq!(chain.credibility, 35);
    }

    #[test]
    fn originator_cannot_retell() {
        let mut mill = RumorMill::new();
        let mut ada = make_agent("Ada", Personality::Nerd);
        let id = mill.start(&mut ada, "X", 0).unwrap().id;
        let err = mill
            .propagate(id, &mut ada, 1, &RumorTuning::default(), &mut ScriptedDice::default())
            .unwrap_err();
        assert!(matches!(err, RumorError::Originator { .. }));
    }

    #[test]
    fn repeat_teller_is_rejected() {
        let mut mill = RumorMill::new();
        let mut ada = make_agent("Ada", Personality::Nerd);
        let mut bo = make_agent("Bo", Personality::Schemer);
        let id = mill.start(&mut ada, "X", 0).unwrap().id;
        let tuning = RumorTuning::default();
        let mut dice = ScriptedDice::default();
        mill.propagate(id, &mut bo, 1, &tuning, &mut dice).unwrap();
        let err = mill.propagate(id, &mut bo, 2, &tuning, &mut dice).unwrap_err();
        assert!(matches!(err, RumorError::AlreadyLinked { .. }));
        assert_eq!(mill.get(id).unwrap().len(), 1);
    }

    #[test]
    fn retelling_uses_latest_tail() {
        let mut mill = RumorMill::new();
        let mut ada = make_agent("Ada", Personality::Nerd);
        let mut bo = make_agent("Bo", Personality::Schemer);
        let mut cy = make_agent("Cy", Personality::Nerd);
        let id = mill.start(&mut ada, "Pasta night", 0).unwrap().id;
        let tuning = RumorTuning::default();
        let mut dice = ScriptedDice::default();
        let first = mill
            .propagate(id, &mut bo, 1, &tuning, &mut dice)
            .unwrap()
            .current_text()
            .to_owned();
        let second = mill.propagate(id, &mut cy, 2, &tuning, &mut dice).unwrap();
        assert!(second.current_text().contains(&first.to_lowercase()));
    }

    #[test]
    fn spicy_rumors_get_embellished() {
        let mut mill = RumorMill::new();
        let mut ada = make_agent("Ada", Personality::Nerd);
        let mut bea = make_agent("Bea", Personality::DramaQueen);
        let mut cy = make_agent("Cy", Personality::DramaQueen);
        let id = mill.start(&mut ada, "X", 0).unwrap().id;
        let tuning = RumorTuning::default();
        // Template 1 ("Everybody STOP. ..."), then spiciness 60: no roll.
        let mut dice = ScriptedDice::new([0.3]);
        mill.propagate(id, &mut bea, 1, &tuning, &mut dice).unwrap();
        // Template 1 again, spiciness 90: embellishment fires, picks "secretly".
        let mut dice = ScriptedDice::new([0.3, 0.1, 0.0]);
        let chain = mill.propagate(id, &mut cy, 2, &tuning, &mut dice).unwrap();
        assert_eq!(chain.spiciness, 90);
        assert!(chain.current_text().contains(", secretly."));
    }

    #[test]
    fn scores_stay_bounded() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut mill = RumorMill::new();
        let mut origin = make_agent("Origin", Personality::Nerd);
        let id = mill.start(&mut origin, "the boiler hums", 0).unwrap().id;
        let tuning = RumorTuning {
            max_mutations: 100,
            ..RumorTuning::default()
        };
        for round in 0..30_u64 {
            let personality = Personality::ALL[usize::try_from(round).unwrap() % Personality::ALL.len()];
            let mut teller = make_agent("t", personality);
            let chain = mill.propagate(id, &mut teller, round, &tuning, &mut rng).unwrap();
            assert!(chain.credibility <= 100);
            assert!(chain.spiciness <= 100);
        }
        let chain = mill.get(id).unwrap();
        let tellers: BTreeSet<AgentId> = chain.links.iter().map(|l| l.agent_id).collect();
        assert_eq!(tellers.len(), chain.links.len());
        assert!(!tellers.contains(&origin.id));
    }

    #[test]
    fn retire_moves_chain_to_completed() {
        let mut mill = RumorMill::new();
        let mut ada = make_agent("Ada", Personality::Nerd);
        let mut bo = make_agent("Bo", Personality::Schemer);
        let id = mill.start(&mut ada, "X", 0).unwrap().id;
        let tuning = RumorTuning::default();
        assert!(mill.due_for_retirement(30, &tuning).is_empty());
        assert_eq!(mill.due_for_retirement(31, &tuning), vec![id]);

        let retired = mill.retire(id).unwrap();
        assert!(!retired.active);
        assert_eq!(mill.active_count(), 0);
        let err = mill
            .propagate(id, &mut bo, 32, &tuning, &mut ScriptedDice::default())
            .unwrap_err();
        assert_eq!(err, RumorError::Inactive(id));
    }

    #[test]
    fn unknown_chain_is_not_found() {
        let mut mill = RumorMill::new();
        let mut bo = make_agent("Bo", Personality::Schemer);
        let missing = ChainId::new();
        let err = mill
            .propagate(missing, &mut bo, 0, &RumorTuning::default(), &mut ScriptedDice::default())
            .unwrap_err();
        assert_eq!(err, RumorError::NotFound(missing));
    }

    #[test]
    fn heat_caps_at_one_hundred() {
        let mut mill = RumorMill::new();
        let mut ada = make_agent("Ada", Personality::Schemer);
        let id = mill.start(&mut ada, "The boiler hums in Morse.", 0).unwrap().id;

        assert_eq!(mill.heat(id, 20).unwrap().spiciness, 50);
        assert_eq!(mill.heat(id, 200).unwrap().spiciness, 100);

        mill.retire(id);
        assert!(mill.heat(id, 5).is_none());
    }

    #[test]
    fn embellish_requires_a_period() {
        assert_eq!(embellish("no stop here", "allegedly"), "no stop here");
        assert_eq!(embellish("a. b.", "allegedly"), "a, allegedly. b.");
    }
}
