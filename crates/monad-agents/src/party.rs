//! Party composition.
//!
//! A party is an ordered list of [`Vibe`]s. Each vibe is a partial effect
//! on [`PartyState`]: it either produces a new state or refuses to happen.
//! Composition runs the vibes left to right and stops at the first refusal,
//! keeping the state left by the last vibe that took hold. Because effects
//! read the state they are given, reordering the same vibes can end in a
//! different place.

use monad_types::{Agent, PartyState, Stat, Vibe};

use crate::dice::Dice;

/// Most vibes a single party may request.
pub const MAX_VIBES: usize = 6;

/// Errors raised before any vibe runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartyError {
    /// No vibes were requested.
    #[error("a party needs at least one vibe")]
    NoVibes,

    /// More vibes than a party allows.
    #[error("too many vibes: {count} (max {max})")]
    TooManyVibes {
        /// Requested count.
        count: usize,
        /// Allowed maximum.
        max: usize,
    },
}

/// Result of composing a vibe sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    /// The final state.
    pub state: PartyState,
    /// How many vibes took hold before one refused (or all of them).
    pub applied: usize,
}

/// Check a requested vibe list before composing it.
pub const fn validate(vibes: &[Vibe]) -> Result<(), PartyError> {
    if vibes.is_empty() {
        return Err(PartyError::NoVibes);
    }
    if vibes.len() > MAX_VIBES {
        return Err(PartyError::TooManyVibes {
            count: vibes.len(),
            max: MAX_VIBES,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Working state
// ---------------------------------------------------------------------------

/// Unclamped axes an effect works on. Effects may overshoot; the composer
/// clamps between steps.
#[derive(Debug, Clone, Copy)]
struct Axes {
    energy: i32,
    volatility: i32,
    bonding: i32,
    enjoyment: i32,
}

impl Axes {
    fn of(state: &PartyState) -> Self {
        Self {
            energy: i32::from(state.energy),
            volatility: i32::from(state.volatility),
            bonding: i32::from(state.bonding),
            enjoyment: i32::from(state.enjoyment),
        }
    }

    fn store(self, state: &mut PartyState) {
        state.energy = clamp_axis(self.energy);
        state.volatility = clamp_axis(self.volatility);
        state.bonding = clamp_axis(self.bonding);
        state.enjoyment = clamp_axis(self.enjoyment);
    }
}

fn clamp_axis(value: i32) -> u8 {
    u8::try_from(value.clamp(0, 100)).unwrap_or(100)
}

/// A successful effect: new axes plus one log line.
type Step = Option<(Axes, String)>;

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

fn chill(mut axes: Axes) -> Step {
    axes.energy = axes.energy.saturating_sub(15).max(10);
    axes.volatility = axes.volatility.saturating_sub(20).max(0);
    axes.bonding = axes.bonding.saturating_add(15);
    axes.enjoyment = axes.enjoyment.saturating_add(5);
    Some((axes, "Everyone settled in and the room went soft.".to_owned()))
}

fn restful(mut axes: Axes) -> Step {
    axes.energy = axes.energy.saturating_sub(25).max(0);
    axes.volatility = axes.volatility.saturating_sub(10);
    axes.bonding = axes.bonding.saturating_add(10);
    axes.enjoyment = axes.enjoyment.saturating_add(5);
    Some((axes, "Half the guests dozed off on the couch.".to_owned()))
}

fn karaoke(mut axes: Axes, attendees: &[&Agent], dice: &mut impl Dice) -> Step {
    if axes.energy < 20 {
        return None;
    }
    let talent = dice.between(10, 100);
    let line = if talent > 70 {
        axes.enjoyment = axes.enjoyment.saturating_add(30);
        axes.bonding = axes.bonding.saturating_add(20);
        axes.energy = axes.energy.saturating_add(10);
        let star = attendees
            .iter()
            .max_by_key(|agent| agent.stat(Stat::Charisma))
            .map_or("Someone", |agent| agent.name.as_str());
        format!("{star} owned the karaoke mic. Standing ovation.")
    } else if talent > 40 {
        axes.enjoyment = axes.enjoyment.saturating_add(15);
        axes.energy = axes.energy.saturating_add(5);
        "Karaoke was fine. Some hits, some misses.".to_owned()
    } else {
        axes.volatility = axes.volatility.saturating_add(20);
        axes.enjoyment = axes.enjoyment.saturating_add(10);
        "The karaoke was painful, and somehow legendary.".to_owned()
    };
    Some((axes, line))
}

fn drama(mut axes: Axes, attendees: &[&Agent], dice: &mut impl Dice) -> Step {
    if axes.volatility < 10 && axes.energy < 25 {
        return None;
    }
    let instigators: Vec<&&Agent> = attendees
        .iter()
        .filter(|agent| agent.stat(Stat::Drama) > 5)
        .collect();
    let line = if let Some(instigator) = dice.pick(&instigators) {
        axes.volatility = axes.volatility.saturating_add(30);
        axes.energy = axes.energy.saturating_add(20);
        axes.enjoyment = axes.enjoyment.saturating_add(15);
        axes.bonding = axes.bonding.saturating_sub(10);
        format!("{} started something. Words were said that cannot be unsaid.", instigator.name)
    } else {
        axes.volatility = axes.volatility.saturating_add(15);
        axes.energy = axes.energy.saturating_add(10);
        "A pointed remark about the dishes. Mild drama.".to_owned()
    };
    Some((axes, line))
}

fn mystery(mut axes: Axes, dice: &mut impl Dice) -> Step {
    let roll = dice.unit();
    let line = if roll < 0.3 {
        axes.volatility = axes.volatility.saturating_add(25);
        axes.enjoyment = axes.enjoyment.saturating_add(20);
        "The lights flickered and an unsigned note slid under the door."
    } else if roll < 0.6 {
        axes.bonding = axes.bonding.saturating_add(25);
        axes.enjoyment = axes.enjoyment.saturating_add(15);
        "Someone found an old board game behind a loose panel. Everyone played."
    } else {
        axes.volatility = axes.volatility.saturating_add(15);
        axes.energy = axes.energy.saturating_sub(10);
        "A thud from the basement. Everyone pretended not to hear it."
    };
    Some((axes, line.to_owned()))
}

fn dance(mut axes: Axes) -> Step {
    if axes.energy < 30 {
        return None;
    }
    axes.energy = axes.energy.saturating_sub(20);
    axes.enjoyment = axes.enjoyment.saturating_add(25);
    axes.bonding = axes.bonding.saturating_add(15);
    axes.volatility = axes.volatility.saturating_add(10);
    Some((axes, "The floor filled up and nobody sat down for an hour.".to_owned()))
}

fn debate(mut axes: Axes, attendees: &[&Agent], dice: &mut impl Dice) -> Step {
    axes.energy = axes.energy.saturating_add(10);
    axes.volatility = axes.volatility.saturating_add(15);
    let thinkers: Vec<&&Agent> = attendees
        .iter()
        .filter(|agent| agent.stat(Stat::Purity) > 6)
        .collect();
    let line = if let Some(thinker) = dice.pick(&thinkers) {
        axes.enjoyment = axes.enjoyment.saturating_add(10);
        axes.bonding = axes.bonding.saturating_add(5);
        format!("{} opened a debate on whether cereal is soup. It got heated.", thinker.name)
    } else {
        axes.enjoyment = axes.enjoyment.saturating_add(5);
        "A debate was attempted. Nobody took the bait.".to_owned()
    };
    Some((axes, line))
}

fn potluck(mut axes: Axes, attendees: &[&Agent]) -> Step {
    axes.bonding = axes.bonding.saturating_add(20);
    axes.enjoyment = axes.enjoyment.saturating_add(15);
    let total: u32 = attendees.iter().map(|agent| agent.stat(Stat::Chaos)).sum();
    let count = u32::try_from(attendees.len().max(1)).unwrap_or(u32::MAX);
    // Average strictly above 6, without floats.
    let line = if total > count.saturating_mul(6) {
        axes.volatility = axes.volatility.saturating_add(20);
        "The potluck was bold. Someone brought a casserole nobody could identify."
    } else {
        axes.volatility = axes.volatility.saturating_add(5);
        "A lovely potluck. The pasta salad went first."
    };
    Some((axes, line.to_owned()))
}

/// Run one vibe against the current state.
fn apply(vibe: Vibe, axes: Axes, attendees: &[&Agent], dice: &mut impl Dice) -> Step {
    match vibe {
        Vibe::Chill => chill(axes),
        Vibe::Restful => restful(axes),
        Vibe::Karaoke => karaoke(axes, attendees, dice),
        Vibe::Drama => drama(axes, attendees, dice),
        Vibe::Mystery => mystery(axes, dice),
        Vibe::Dance => dance(axes),
        Vibe::Debate => debate(axes, attendees, dice),
        Vibe::Potluck => potluck(axes, attendees),
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Compose `vibes` in order, starting from the default state.
///
/// A vibe whose precondition fails ends the party; it leaves no log line
/// and later vibes do not run. All four axes are in `0..=100` after every
/// step.
pub fn compose(vibes: &[Vibe], attendees: &[&Agent], dice: &mut impl Dice) -> Composition {
    let mut state = PartyState::default();
    let mut applied = 0_usize;
    for vibe in vibes {
        let Some((axes, line)) = apply(*vibe, Axes::of(&state), attendees, dice) else {
            break;
        };
        axes.store(&mut state);
        state.log.push(line);
        applied = applied.saturating_add(1);
    }
    Composition { state, applied }
}

/// A party good enough to earn the host a bonus.
pub const fn is_great(state: &PartyState) -> bool {
    state.enjoyment > 70
}

/// A party that went down in building history.
pub const fn is_epic(state: &PartyState) -> bool {
    state.enjoyment >= 90 && state.volatility >= 60
}
