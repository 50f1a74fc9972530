//! World clock: ticks, episodes and seasons.
//!
//! The tick counter is the source of truth. Episodes and seasons roll over
//! as ticks advance: every `ticks_per_episode` ticks a new episode begins,
//! and after `episodes_per_season` episodes the episode counter returns to
//! 1 and a new season begins. All arithmetic is checked.

use serde::{Deserialize, Serialize};

use crate::config::ClockConfig;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// A counter would overflow.
    #[error("clock overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid clock configuration (e.g. zero ticks per episode).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Persisted position of the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    /// Current tick.
    pub tick: u64,
    /// Current episode, starting at 1.
    pub episode: u64,
    /// Current season, starting at 1.
    pub season: u64,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            tick: 0,
            episode: 1,
            season: 1,
        }
    }
}

/// What changed when the clock advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    /// The new tick.
    pub tick: u64,
    /// A new episode began on this tick.
    pub new_episode: bool,
    /// A new season began on this tick.
    pub new_season: bool,
}

/// World clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldClock {
    /// Tick, episode and season.
    state: ClockState,
    /// Ticks in one episode.
    ticks_per_episode: u64,
    /// Episodes in one season.
    episodes_per_season: u64,
}

impl WorldClock {
    /// Create a clock at tick 0, episode 1, season 1.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if either length is zero.
    pub fn new(config: &ClockConfig) -> Result<Self, ClockError> {
        Self::from_parts(ClockState::default(), config)
    }

    /// Restore a clock from a persisted position.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if either length is zero or
    /// the episode or season counter is zero.
    pub fn from_parts(state: ClockState, config: &ClockConfig) -> Result<Self, ClockError> {
        if config.ticks_per_episode == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "ticks_per_episode must be at least 1".to_owned(),
            });
        }
        if config.episodes_per_season == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "episodes_per_season must be at least 1".to_owned(),
            });
        }
        if state.episode == 0 || state.season == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "episode and season count from 1".to_owned(),
            });
        }
        Ok(Self {
            state,
            ticks_per_episode: config.ticks_per_episode,
            episodes_per_season: config.episodes_per_season,
        })
    }

    /// Advance the clock by one tick.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if a counter would exceed
    /// `u64::MAX`. The clock is unchanged on error.
    pub fn advance(&mut self) -> Result<Advance, ClockError> {
        let mut next = self.state;
        next.tick = next.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;

        let new_episode = next.tick.checked_rem(self.ticks_per_episode) == Some(0);
        let mut new_season = false;
        if new_episode {
            next.episode = next.episode.checked_add(1).ok_or(ClockError::TickOverflow)?;
            if next.episode > self.episodes_per_season {
                next.episode = 1;
                next.season = next.season.checked_add(1).ok_or(ClockError::TickOverflow)?;
                new_season = true;
            }
        }

        self.state = next;
        Ok(Advance {
            tick: next.tick,
            new_episode,
            new_season,
        })
    }

    /// Current tick.
    pub const fn tick(&self) -> u64 {
        self.state.tick
    }

    /// Current episode.
    pub const fn episode(&self) -> u64 {
        self.state.episode
    }

    /// Current season.
    pub const fn season(&self) -> u64 {
        self.state.season
    }

    /// Position for persistence.
    pub const fn state(&self) -> ClockState {
        self.state
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn short_config() -> ClockConfig {
        ClockConfig {
            ticks_per_episode: 3,
            episodes_per_season: 2,
        }
    }

    #[test]
    fn clock_starts_at_tick_zero() {
        let clock = WorldClock::new(&ClockConfig::default()).unwrap();
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.episode(), 1);
        assert_eq!(clock.season(), 1);
    }

    #[test]
    fn episodes_and_seasons_roll_over() {
        let mut clock = WorldClock::new(&short_config()).unwrap();

        let first = clock.advance().unwrap();
        assert_eq!(first.tick, 1);
        assert!(!first.new_episode);

        clock.advance().unwrap();
        let third = clock.advance().unwrap();
        assert!(third.new_episode);
        assert!(!third.new_season);
        assert_eq!(clock.episode(), 2);

        for _ in 0..3 {
            clock.advance().unwrap();
        }
        assert_eq!(clock.tick(), 6);
        assert_eq!(clock.episode(), 1);
        assert_eq!(clock.season(), 2);
    }

    #[test]
    fn default_lengths_match_the_building_calendar() {
        let mut clock = WorldClock::new(&ClockConfig::default()).unwrap();
        for _ in 0..50 {
            clock.advance().unwrap();
        }
        assert_eq!(clock.episode(), 2);
        for _ in 0..450 {
            clock.advance().unwrap();
        }
        assert_eq!(clock.episode(), 1);
        assert_eq!(clock.season(), 2);
    }

    #[test]
    fn zero_lengths_are_rejected() {
        let config = ClockConfig {
            ticks_per_episode: 0,
            episodes_per_season: 10,
        };
        assert!(matches!(
            WorldClock::new(&config),
            Err(ClockError::InvalidConfig { .. })
        ));

        let config = ClockConfig {
            ticks_per_episode: 50,
            episodes_per_season: 0,
        };
        assert!(WorldClock::new(&config).is_err());
    }

    #[test]
    fn overflow_leaves_clock_unchanged() {
        let state = ClockState {
            tick: u64::MAX,
            episode: 4,
            season: 9,
        };
        let mut clock = WorldClock::from_parts(state, &ClockConfig::default()).unwrap();
        assert_eq!(clock.advance(), Err(ClockError::TickOverflow));
        assert_eq!(clock.state(), state);
    }

    #[test]
    fn restored_clock_continues() {
        let state = ClockState {
            tick: 2,
            episode: 1,
            season: 3,
        };
        let mut clock = WorldClock::from_parts(state, &short_config()).unwrap();
        let next = clock.advance().unwrap();
        assert!(next.new_episode);
        assert_eq!(clock.season(), 3);
        assert!(WorldClock::from_parts(ClockState { episode: 0, ..state }, &short_config()).is_err());
    }
}
