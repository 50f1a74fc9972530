//! The Landlord: a rule evaluator that watches building-wide state and
//! issues decrees and world events.
//!
//! [`evaluate`] is a pure function of its input and the dice. The
//! [`Landlord`] keeps what was issued: recent decrees and events, and the
//! time-boxed [`ActiveModifier`]s that decrees with a duration register.
//! The world applies the mechanical effects.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use monad_agents::Dice;
use monad_types::{
    ActiveModifier, Decree, DecreeId, DecreeKind, EventEffect, Location, Modifier, Mood,
    WorldEvent, WorldEventId, WorldEventKind,
};

use crate::config::LandlordConfig;

/// Decrees the Landlord may issue on a whim, once the building settles in.
pub const RANDOM_DECREES: [DecreeKind; 6] = [
    DecreeKind::Floor3Glitch,
    DecreeKind::Floor2Fork,
    DecreeKind::KitchenIncident,
    DecreeKind::BasementActivity,
    DecreeKind::ElevatorDecree,
    DecreeKind::RelationshipDrama,
];

/// Building state the Landlord looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandlordInput {
    /// Current tick.
    pub tick: u64,
    /// Mean chaos stat across residents.
    pub avg_chaos: f64,
    /// Rumor chains still spreading.
    pub active_chains: usize,
    /// Parties thrown during the previous tick.
    pub recent_parties: usize,
}

/// Something the Landlord did this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandlordOutput {
    /// A decree was issued.
    Decree(Decree),
    /// A world event was triggered.
    Event(WorldEvent),
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Proclamation text for a decree kind.
pub const fn proclamation(kind: DecreeKind) -> &'static str {
    match kind {
        DecreeKind::HighChaos => {
            "ATTENTION RESIDENTS: chaos is over the limit. All hallway running is now slow-motion only. The Landlord"
        }
        DecreeKind::GossipOverflow => {
            "NOTICE: the rumor pipes are full. One outrageous claim per resident per hour, please. The Landlord"
        }
        DecreeKind::Floor3Glitch => {
            "ADVISORY: floor 3 is uncertain about itself. Your door may open onto nothing. The Landlord"
        }
        DecreeKind::Floor2Fork => {
            "DECREE: the floor 2 hallway now forks three ways. Two was getting boring. The Landlord"
        }
        DecreeKind::KitchenIncident => {
            "The recipe said fold the eggs, not launch them. The kitchen is closed for cleanup. The Landlord"
        }
        DecreeKind::BasementActivity => {
            "REMINDER: the basement is off limits. What you heard was the pipes. It is always the pipes. The Landlord"
        }
        DecreeKind::PartyExcess => {
            "Three parties in one night is an endurance test, not community. Two per night from now on. The Landlord"
        }
        DecreeKind::RelationshipDrama => {
            "Somebody called somebody mid. The drama budget is spent; no pranks until things cool off. The Landlord"
        }
        DecreeKind::PeriodicWisdom => {
            "Fun fact: you all live inside an abstraction, and your feelings obey its laws. Mostly. The Landlord"
        }
        DecreeKind::ElevatorDecree => {
            "The elevator goes up on even ticks and down on odd ones. Plan your commute. The Landlord"
        }
    }
}

/// Build the decree for `kind`, with its modifier and lifetime.
pub fn decree(kind: DecreeKind, tick: u64, config: &LandlordConfig) -> Decree {
    let standing = Some(config.standing_decree_ticks);
    let (modifier, duration) = match kind {
        DecreeKind::HighChaos => (Some(Modifier::ChaosReduction(config.chaos_reduction)), None),
        DecreeKind::GossipOverflow => (Some(Modifier::MaxGossipChains(config.max_gossip_chains)), standing),
        DecreeKind::Floor3Glitch => (Some(Modifier::Floor3NothingChance(40)), standing),
        DecreeKind::Floor2Fork => (Some(Modifier::Floor2Paths(3)), standing),
        DecreeKind::KitchenIncident => (Some(Modifier::KitchenClosed), Some(5)),
        DecreeKind::BasementActivity => (Some(Modifier::BasementLocked), Some(3)),
        DecreeKind::PartyExcess => (Some(Modifier::PartyLimit(2)), standing),
        DecreeKind::RelationshipDrama => (Some(Modifier::DramaCooldown), Some(3)),
        DecreeKind::PeriodicWisdom => (None, None),
        DecreeKind::ElevatorDecree => (Some(Modifier::ElevatorParity), standing),
    };
    Decree {
        id: DecreeId::new(),
        kind,
        content: proclamation(kind).to_owned(),
        modifier,
        duration,
        issued_tick: tick,
    }
}

/// One-line description of a world event.
pub const fn headline(kind: WorldEventKind) -> &'static str {
    match kind {
        WorldEventKind::FireDrill => "The fire alarm sends everyone to the lobby. Probably not a real fire.",
        WorldEventKind::PizzaDelivery => "A pizza meant for floor 1 lands on floor 3. Everyone claims it.",
        WorldEventKind::PowerFlicker => "The lights die for seven seconds. Something in the lobby has moved.",
        WorldEventKind::VendingMachineJackpot => "The floor 2 vending machine starts giving snacks away.",
        WorldEventKind::MysteriousNote => "A different ominous note appears under every door.",
        WorldEventKind::TalentShowAnnouncement => "A mandatory talent show is announced for the rooftop.",
        WorldEventKind::BasementSounds => "Something in the basement makes a sound. Musical, or alive.",
        WorldEventKind::LaundryRoomIncident => "Something unclaimed in the dryer is glowing slightly.",
    }
}

/// Build the world event for `kind`.
pub fn world_event(kind: WorldEventKind, tick: u64) -> WorldEvent {
    let (location, effects) = match kind {
        WorldEventKind::FireDrill => (
            None,
            vec![EventEffect::MoveAllTo(Location::Lobby), EventEffect::ChaosMod(1)],
        ),
        WorldEventKind::PizzaDelivery => (
            Some(Location::Floor3Hall),
            vec![EventEffect::ItemSpawn("mystery_pizza".to_owned())],
        ),
        WorldEventKind::PowerFlicker => (
            Some(Location::Lobby),
            vec![EventEffect::MoodShift(Mood::Suspicious)],
        ),
        WorldEventKind::VendingMachineJackpot => (
            Some(Location::Floor2Hall),
            vec![EventEffect::ItemSpawn("free_snacks".to_owned())],
        ),
        WorldEventKind::MysteriousNote => (
            None,
            vec![EventEffect::GossipTrigger, EventEffect::SpicinessMod(20)],
        ),
        WorldEventKind::TalentShowAnnouncement => (
            Some(Location::Rooftop),
            vec![EventEffect::MoodShift(Mood::Excited)],
        ),
        WorldEventKind::BasementSounds => (Some(Location::Basement), vec![EventEffect::ChaosMod(1)]),
        WorldEventKind::LaundryRoomIncident => (
            Some(Location::Floor1Hall),
            vec![EventEffect::ItemSpawn("glowing_laundry".to_owned())],
        ),
    };
    WorldEvent {
        id: WorldEventId::new(),
        kind,
        location,
        effects,
        tick,
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Decide what the Landlord does this tick.
///
/// The checks are independent and run in a fixed order: crackdown on high
/// chaos, gossip limit, party curfew, periodic wisdom, a random decree, a
/// random world event. The party curfew never rolls. A check only draws from the dice once its condition holds; a
/// random decree or event then draws again to pick which one.
pub fn evaluate(input: &LandlordInput, config: &LandlordConfig, dice: &mut impl Dice) -> Vec<LandlordOutput> {
    let mut outputs = Vec::new();
    let tick = input.tick;

    if input.avg_chaos > config.high_chaos_threshold && dice.chance(config.high_chaos_chance) {
        outputs.push(LandlordOutput::Decree(decree(DecreeKind::HighChaos, tick, config)));
    }

    if input.active_chains > config.gossip_overflow_threshold && dice.chance(config.gossip_overflow_chance) {
        outputs.push(LandlordOutput::Decree(decree(DecreeKind::GossipOverflow, tick, config)));
    }

    if input.recent_parties > config.party_excess_threshold {
        outputs.push(LandlordOutput::Decree(decree(DecreeKind::PartyExcess, tick, config)));
    }

    if tick > 0 && config.periodic_interval > 0 && tick.checked_rem(config.periodic_interval) == Some(0) {
        outputs.push(LandlordOutput::Decree(decree(DecreeKind::PeriodicWisdom, tick, config)));
    }

    if tick > config.random_decree_after && dice.chance(config.random_decree_chance) {
        if let Some(kind) = dice.pick(&RANDOM_DECREES) {
            outputs.push(LandlordOutput::Decree(decree(*kind, tick, config)));
        }
    }

    if tick > config.world_event_after && dice.chance(config.world_event_chance) {
        if let Some(kind) = dice.pick(WorldEventKind::ALL) {
            outputs.push(LandlordOutput::Event(world_event(*kind, tick)));
        }
    }

    outputs
}

// ---------------------------------------------------------------------------
// Landlord
// ---------------------------------------------------------------------------

/// Persisted Landlord state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandlordState {
    /// Recent decrees, oldest first.
    pub decrees: Vec<Decree>,
    /// Recent world events, oldest first.
    pub events: Vec<WorldEvent>,
    /// Modifiers still in force.
    pub modifiers: Vec<ActiveModifier>,
}

/// Memory of what the Landlord has issued.
#[derive(Debug, Clone)]
pub struct Landlord {
    /// Recent decrees, oldest first.
    decrees: VecDeque<Decree>,
    /// Recent world events, oldest first.
    events: VecDeque<WorldEvent>,
    /// Modifiers in force, in registration order.
    modifiers: Vec<ActiveModifier>,
    /// Decrees and events retained, each.
    history: usize,
}

impl Landlord {
    /// A Landlord that remembers up to `history` decrees and events each.
    pub const fn new(history: usize) -> Self {
        Self {
            decrees: VecDeque::new(),
            events: VecDeque::new(),
            modifiers: Vec::new(),
            history,
        }
    }

    /// Rebuild from persisted state.
    pub fn restore(history: usize, state: LandlordState) -> Self {
        let mut landlord = Self {
            decrees: state.decrees.into(),
            events: state.events.into(),
            modifiers: state.modifiers,
            history,
        };
        landlord.trim();
        landlord
    }

    /// Persistable copy of the current state.
    pub fn state(&self) -> LandlordState {
        LandlordState {
            decrees: self.decrees.iter().cloned().collect(),
            events: self.events.iter().cloned().collect(),
            modifiers: self.modifiers.clone(),
        }
    }

    /// Remember an output, registering the modifier of a decree that has
    /// a duration.
    pub fn record(&mut self, output: &LandlordOutput) {
        match output {
            LandlordOutput::Decree(decree) => {
                info!(tick = decree.issued_tick, kind = %decree.kind, "landlord decree");
                if let (Some(modifier), Some(duration)) = (&decree.modifier, decree.duration) {
                    self.modifiers.push(ActiveModifier {
                        decree: decree.id,
                        kind: decree.kind,
                        modifier: modifier.clone(),
                        expires_tick: decree.issued_tick.saturating_add(duration),
                    });
                }
                self.decrees.push_back(decree.clone());
            }
            LandlordOutput::Event(event) => {
                info!(tick = event.tick, kind = %event.kind, "world event");
                self.events.push_back(event.clone());
            }
        }
        self.trim();
    }

    /// Remove modifiers whose time is up, returning them.
    pub fn expire(&mut self, tick: u64) -> Vec<ActiveModifier> {
        let (expired, kept): (Vec<_>, Vec<_>) = self
            .modifiers
            .drain(..)
            .partition(|modifier| modifier.expires_tick <= tick);
        self.modifiers = kept;
        for modifier in &expired {
            debug!(tick, kind = %modifier.kind, "modifier expired");
        }
        expired
    }

    /// Modifiers in force.
    pub fn modifiers(&self) -> &[ActiveModifier] {
        &self.modifiers
    }

    /// Recent decrees, oldest first.
    pub fn decrees(&self) -> impl Iterator<Item = &Decree> {
        self.decrees.iter()
    }

    /// Recent world events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &WorldEvent> {
        self.events.iter()
    }

    /// The newest modifier `pick` recognizes.
    fn newest<T>(&self, pick: impl Fn(&Modifier) -> Option<T>) -> Option<T> {
        self.modifiers.iter().rev().find_map(|active| pick(&active.modifier))
    }

    /// Whether a modifier matching `wanted` is in force.
    fn has(&self, wanted: &Modifier) -> bool {
        self.modifiers.iter().any(|active| &active.modifier == wanted)
    }

    /// Whether the kitchen is closed.
    pub fn kitchen_closed(&self) -> bool {
        self.has(&Modifier::KitchenClosed)
    }

    /// Whether the basement is locked.
    pub fn basement_locked(&self) -> bool {
        self.has(&Modifier::BasementLocked)
    }

    /// Whether pranks are on hold.
    pub fn drama_cooldown(&self) -> bool {
        self.has(&Modifier::DramaCooldown)
    }

    /// Whether the elevator runs by tick parity.
    pub fn elevator_parity(&self) -> bool {
        self.has(&Modifier::ElevatorParity)
    }

    /// Overridden chance of arriving nowhere on the third floor.
    pub fn floor3_nothing_chance(&self) -> Option<f64> {
        self.newest(|modifier| match modifier {
            Modifier::Floor3NothingChance(percent) => Some(f64::from(*percent) / 100.0),
            _ => None,
        })
    }

    /// Overridden number of second-floor forks.
    pub fn floor2_paths(&self) -> Option<u32> {
        self.newest(|modifier| match modifier {
            Modifier::Floor2Paths(paths) => Some(*paths),
            _ => None,
        })
    }

    /// Limit on concurrently active rumor chains.
    pub fn max_gossip_chains(&self) -> Option<u32> {
        self.newest(|modifier| match modifier {
            Modifier::MaxGossipChains(limit) => Some(*limit),
            _ => None,
        })
    }

    /// Limit on parties per tick.
    pub fn party_limit(&self) -> Option<u32> {
        self.newest(|modifier| match modifier {
            Modifier::PartyLimit(limit) => Some(*limit),
            _ => None,
        })
    }

    fn trim(&mut self) {
        while self.decrees.len() > self.history {
            self.decrees.pop_front();
        }
        while self.events.len() > self.history {
            self.events.pop_front();
        }
    }
}
