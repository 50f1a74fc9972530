//! Injectable randomness.
//!
//! Every probabilistic branch in the engines draws from a [`Dice`]. Any
//! [`rand::Rng`] is a `Dice` (the world owns a seeded `SmallRng`), and
//! [`ScriptedDice`] replays a fixed queue of unit draws so tests can force
//! a specific branch: a special ability firing, a rarity tier, a Landlord
//! decree.

use std::collections::VecDeque;

use rand::Rng;

/// A source of random draws.
pub trait Dice {
    /// A uniform draw in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// A uniform integer in `lo..=hi`. Returns `lo` if `hi <= lo`.
    fn between(&mut self, lo: i32, hi: i32) -> i32;

    /// A uniform index in `0..len`. Returns 0 for an empty range.
    fn index(&mut self, len: usize) -> usize;

    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// A uniformly chosen element, or `None` for an empty slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let at = self.index(items.len());
        items.get(at)
    }
}

impl<R: Rng + ?Sized> Dice for R {
    fn unit(&mut self) -> f64 {
        self.random::<f64>()
    }

    fn between(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.random_range(lo..=hi)
    }

    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.random_range(0..len)
    }
}

// ---------------------------------------------------------------------------
// ScriptedDice
// ---------------------------------------------------------------------------

/// Unit draw returned once a [`ScriptedDice`] queue runs dry. High enough
/// that no probability check in the engines fires.
pub const EXHAUSTED_DRAW: f64 = 0.999;

/// Deterministic dice that replay queued unit draws.
///
/// Integer draws are derived from the next unit draw, so `between(1, 4)`
/// with a queued `0.5` yields `3`. Once the queue is empty every draw
/// returns [`EXHAUSTED_DRAW`] (or the configured fallback).
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    /// Remaining draws, next first.
    queue: VecDeque<f64>,
    /// Draw returned once the queue is empty.
    fallback: Option<f64>,
}

impl ScriptedDice {
    /// Dice that will replay `draws` in order.
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            queue: draws.into_iter().map(|v| v.clamp(0.0, EXHAUSTED_DRAW)).collect(),
            fallback: None,
        }
    }

    /// Use `draw` once the queue is empty instead of [`EXHAUSTED_DRAW`].
    #[must_use]
    pub fn with_fallback(mut self, draw: f64) -> Self {
        self.fallback = Some(draw);
        self
    }

    /// Queue more draws.
    pub fn push(&mut self, draw: f64) {
        self.queue.push_back(draw.clamp(0.0, EXHAUSTED_DRAW));
    }

    /// Number of queued draws left.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    fn next(&mut self) -> f64 {
        self.queue
            .pop_front()
            .or(self.fallback)
            .unwrap_or(EXHAUSTED_DRAW)
    }
}

impl Dice for ScriptedDice {
    fn unit(&mut self) -> f64 {
        self.next()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn between(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = f64::from(hi) - f64::from(lo) + 1.0;
        let offset = (self.next() * span).floor();
        let value = f64::from(lo) + offset;
        (value as i32).clamp(lo, hi)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let at = (self.next() * len as f64).floor() as usize;
        at.min(len.saturating_sub(1))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn scripted_dice_replays_in_order() {
        let mut dice = ScriptedDice::new([0.1, 0.9]);
        assert!(dice.chance(0.2));
        assert!(!dice.chance(0.2));
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn scripted_integers_map_from_unit() {
        let mut dice = ScriptedDice::new([0.0, 0.5, 0.999, 0.5]);
        assert_eq!(dice.between(-3, 3), -3);
        assert_eq!(dice.between(1, 4), 3);
        assert_eq!(dice.between(-3, 3), 3);
        assert_eq!(dice.index(4), 2);
    }

    #[test]
    fn exhausted_dice_never_fire() {
        let mut dice = ScriptedDice::default();
        assert!(!dice.chance(0.9));
        let mut dice = ScriptedDice::default().with_fallback(0.0);
        assert!(dice.chance(0.01));
    }

    #[test]
    fn pick_handles_empty() {
        let mut dice = ScriptedDice::default();
        let empty: [u8; 0] = [];
        assert!(dice.pick(&empty).is_none());
        assert_eq!(dice.pick(&[7, 8]), Some(&8));
    }

    #[test]
    fn rng_dice_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..200 {
            let v = rng.between(-3, 3);
            assert!((-3..=3).contains(&v));
            assert!(rng.index(5) < 5);
            let u = rng.unit();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
