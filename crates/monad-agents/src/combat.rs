//! Duel resolution.
//!
//! A duel is best of three. Each round draws one of the four combat stats,
//! adds a +/-3 jitter to each side, and lets each side's personality ability
//! fire. Ties go to the challenger. The first side to two round wins takes
//! the duel, so a duel lasts two or three rounds and always has a strict
//! winner.
//!
//! [`resolve`] is pure. The caller moves the wager, updates records and
//! applies relationship and clout changes.

use monad_types::{Agent, DuelId, DuelRecord, DuelRound, Personality, Stat};

use crate::dice::Dice;

/// Stats a round can be fought on.
pub const COMBAT_STATS: [Stat; 4] = [Stat::Charisma, Stat::Creativity, Stat::Drama, Stat::Chaos];

/// Round wins needed to take a duel.
pub const ROUNDS_TO_WIN: u8 = 2;

/// Clout the winner gains.
pub const WINNER_CLOUT: u64 = 15;

/// Clout the loser forfeits.
pub const LOSER_CLOUT: u64 = 5;

/// Nearby onlookers needed before a social butterfly feeds off the crowd.
pub const CROWD_THRESHOLD: usize = 2;

/// How a personality's duel ability behaves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuelAbility {
    /// Display name.
    pub name: &'static str,
    /// Probability the ability fires in a round.
    pub trigger: f64,
    /// Fixed roll bonus; ignored by wild abilities.
    pub bonus: i32,
    /// Fires only while this side trails in rounds.
    pub only_when_behind: bool,
    /// Bonus is drawn uniformly from `-5..=5` instead.
    pub wild: bool,
}

/// Duel ability for a personality.
pub const fn ability(personality: Personality) -> DuelAbility {
    let (name, trigger, bonus, only_when_behind, wild) = match personality {
        Personality::SocialButterfly => ("Crowd Support", 0.4, 2, false, false),
        Personality::Schemer => ("Calculated Strike", 0.5, 3, false, false),
        Personality::DramaQueen => ("Dramatic Comeback", 0.3, 4, true, false),
        Personality::Nerd => ("Statistical Advantage", 0.25, 8, false, false),
        Personality::ChaosGremlin => ("Wild Card", 0.6, 0, false, true),
        Personality::ConspiracyTheorist => ("Psychological Warfare", 0.35, 2, false, false),
    };
    DuelAbility {
        name,
        trigger,
        bonus,
        only_when_behind,
        wild,
    }
}

/// Roll a side's ability for one round. Returns the bonus if it fired.
fn roll_ability(agent: &Agent, behind: bool, dice: &mut impl Dice) -> Option<i32> {
    let ability = ability(agent.personality);
    if !dice.chance(ability.trigger) {
        return None;
    }
    if ability.only_when_behind && !behind {
        return None;
    }
    if ability.wild {
        return Some(dice.between(-5, 5));
    }
    Some(ability.bonus)
}

/// One side's full roll for a round.
fn side_roll(
    agent: &Agent,
    stat: Stat,
    behind: bool,
    nearby: usize,
    dice: &mut impl Dice,
) -> (i32, Option<i32>) {
    let base = i32::try_from(agent.stat(stat)).unwrap_or(i32::MAX);
    let mut roll = base.saturating_add(dice.between(-3, 3));
    let bonus = roll_ability(agent, behind, dice);
    roll = roll.saturating_add(bonus.unwrap_or(0));
    if agent.personality == Personality::SocialButterfly && nearby > CROWD_THRESHOLD {
        roll = roll.saturating_add(1);
    }
    (roll, bonus)
}

/// Fight a duel.
///
/// `nearby` is the number of other agents at the duel location. Draw order
/// per round: stat, challenger jitter, challenger ability (and wild bonus),
/// defender jitter, defender ability.
pub fn resolve(
    challenger: &Agent,
    defender: &Agent,
    tick: u64,
    wager: u64,
    nearby: usize,
    dice: &mut impl Dice,
) -> DuelRecord {
    let mut rounds = Vec::with_capacity(3);
    let mut challenger_score = 0_u8;
    let mut defender_score = 0_u8;

    for round in 1..=3_u8 {
        let stat = dice.pick(&COMBAT_STATS).copied().unwrap_or(Stat::Charisma);
        let (challenger_roll, challenger_ability) =
            side_roll(challenger, stat, challenger_score < defender_score, nearby, dice);
        let (defender_roll, defender_ability) =
            side_roll(defender, stat, defender_score < challenger_score, nearby, dice);

        let challenger_won = challenger_roll >= defender_roll;
        if challenger_won {
            challenger_score = challenger_score.saturating_add(1);
        } else {
            defender_score = defender_score.saturating_add(1);
        }
        rounds.push(DuelRound {
            round,
            stat,
            challenger_roll,
            defender_roll,
            challenger_ability,
            defender_ability,
            challenger_won,
        });

        if challenger_score >= ROUNDS_TO_WIN || defender_score >= ROUNDS_TO_WIN {
            break;
        }
    }

    let (winner, loser) = if challenger_score > defender_score {
        (challenger.id, defender.id)
    } else {
        (defender.id, challenger.id)
    };

    DuelRecord {
        id: DuelId::new(),
        challenger: challenger.id,
        defender: defender.id,
        rounds,
        challenger_score,
        defender_score,
        winner,
        loser,
        wager,
        tick,
    }
}
