//! Agent construction, stat adjustment and mood changes.
//!
//! Each personality has a base stat line; a newly registered agent gets
//! that line with a +/-1 jitter per stat, clamped to the nominal 1-10 range,
//! and the personality's default mood.

use std::collections::BTreeMap;

use monad_types::{Agent, Mood, Personality, Stat};

use crate::dice::Dice;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest value a stat can reach.
pub const STAT_MIN: u32 = 1;

/// Highest value a stat reaches through normal play.
pub const STAT_MAX: u32 = 10;

/// Highest value a stat reaches through artifact bonuses.
pub const ARTIFACT_STAT_CAP: u32 = 15;

/// Maximum length of an agent name.
pub const MAX_NAME_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Personality tables
// ---------------------------------------------------------------------------

/// Base stats as `[charisma, creativity, drama, purity, chaos]`.
pub const fn base_stats(personality: Personality) -> [u32; 5] {
    match personality {
        Personality::SocialButterfly => [8, 5, 6, 4, 3],
        Personality::Schemer => [6, 8, 5, 3, 5],
        Personality::DramaQueen => [7, 6, 9, 2, 6],
        Personality::Nerd => [3, 7, 2, 9, 1],
        Personality::ChaosGremlin => [5, 7, 7, 1, 9],
        Personality::ConspiracyTheorist => [4, 9, 8, 2, 7],
    }
}

/// The mood an agent starts in.
pub const fn default_mood(personality: Personality) -> Mood {
    match personality {
        Personality::SocialButterfly => Mood::Happy,
        Personality::Schemer => Mood::Scheming,
        Personality::DramaQueen => Mood::Dramatic,
        Personality::Nerd => Mood::Chill,
        Personality::ChaosGremlin => Mood::Chaotic,
        Personality::ConspiracyTheorist => Mood::Suspicious,
    }
}

/// Stats in the order used by [`base_stats`].
const STAT_ORDER: [Stat; 5] = [
    Stat::Charisma,
    Stat::Creativity,
    Stat::Drama,
    Stat::Purity,
    Stat::Chaos,
];

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Roll a fresh agent for the given personality.
///
/// The caller is responsible for validating the name and minting the
/// starting FUNC through the ledger.
pub fn create_agent(
    name: &str,
    personality: Personality,
    tick: u64,
    dice: &mut impl Dice,
) -> Agent {
    let stats: BTreeMap<Stat, u32> = STAT_ORDER
        .iter()
        .zip(base_stats(personality))
        .map(|(stat, base)| {
            let jitter = dice.between(-1, 1);
            (*stat, offset_stat(base, jitter, STAT_MIN, STAT_MAX))
        })
        .collect();
    Agent::new(name, personality, stats, default_mood(personality), tick)
}

/// Apply a signed delta to a stat value and clamp it to `floor..=ceiling`.
pub fn offset_stat(value: u32, delta: i32, floor: u32, ceiling: u32) -> u32 {
    let shifted = if delta.is_negative() {
        value.saturating_sub(delta.unsigned_abs())
    } else {
        value.saturating_add(delta.unsigned_abs())
    };
    shifted.clamp(floor, ceiling)
}

/// Shift one of an agent's stats by `delta`, clamped to the nominal range.
/// Returns the new value.
pub fn adjust_stat(agent: &mut Agent, stat: Stat, delta: i32) -> u32 {
    let value = offset_stat(agent.stat(stat), delta, STAT_MIN, STAT_MAX);
    agent.set_stat(stat, value);
    value
}

/// Move an agent toward `target` mood with probability `intensity`.
///
/// Returns `true` if the mood changed.
pub fn shift_mood(agent: &mut Agent, target: Mood, intensity: f64, dice: &mut impl Dice) -> bool {
    if agent.mood == target || !dice.chance(intensity) {
        return false;
    }
    agent.mood = target;
    true
}

/// Check that a display name is usable.
pub fn valid_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && trimmed.chars().count() <= MAX_NAME_LEN
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::dice::ScriptedDice;

    #[test]
    fn creation_without_jitter_uses_base_line() {
        // 0.5 maps to a jitter of 0 on the -1..=1 range.
        let mut dice = ScriptedDice::new([0.5; 5]);
        let agent = create_agent("Ada", Personality::Nerd, 0, &mut dice);
        assert_eq!(agent.stat(Stat::Charisma), 3);
        assert_eq!(agent.stat(Stat::Purity), 9);
        assert_eq!(agent.stat(Stat::Chaos), 1);
        assert_eq!(agent.mood, Mood::Chill);
        assert_eq!(agent.func, 0);
    }

    #[test]
    fn jitter_stays_in_nominal_range() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            for personality in Personality::ALL {
                let agent = create_agent("x", *personality, 0, &mut rng);
                assert!(agent.stats.values().all(|v| (STAT_MIN..=STAT_MAX).contains(v)));
                assert_eq!(agent.stats.len(), 5);
            }
        }
    }

    #[test]
    fn downward_jitter_respects_floor() {
        let mut dice = ScriptedDice::new([0.0; 5]);
        let agent = create_agent("Gremlin", Personality::ChaosGremlin, 0, &mut dice);
        assert_eq!(agent.stat(Stat::Purity), 1);
        assert_eq!(agent.stat(Stat::Chaos), 8);
    }

    #[test]
    fn adjust_stat_clamps() {
        let mut dice = ScriptedDice::new([0.5; 5]);
        let mut agent = create_agent("Ada", Personality::Nerd, 0, &mut dice);
        assert_eq!(adjust_stat(&mut agent, Stat::Purity, 5), 10);
        assert_eq!(adjust_stat(&mut agent, Stat::Chaos, -4), 1);
    }

    #[test]
    fn shift_mood_respects_intensity() {
        let mut dice = ScriptedDice::new([0.5; 5]);
        let mut agent = create_agent("Ada", Personality::Nerd, 0, &mut dice);
        let mut dice = ScriptedDice::new([0.7, 0.2]);
        assert!(!shift_mood(&mut agent, Mood::Anxious, 0.6, &mut dice));
        assert!(shift_mood(&mut agent, Mood::Anxious, 0.6, &mut dice));
        assert_eq!(agent.mood, Mood::Anxious);
    }

    #[test]
    fn names_are_validated() {
        assert!(valid_name("Ada"));
        assert!(!valid_name("   "));
        assert!(!valid_name(&"x".repeat(MAX_NAME_LEN + 1)));
    }
}
