//! The world event log.
//!
//! Every state change appends a [`LogEvent`]: a typed [`EventKind`] plus a
//! flat key/value payload of scalars. Narration layers match on the kind
//! and read the payload without reaching into engine internals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::ids::{AgentId, EventId};

/// Category of a logged event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventKind {
    /// A new resident moved in.
    AgentRegistered,
    /// An agent changed location (or tried to).
    Moved,
    /// An agent talked to someone or to the room.
    Talked,
    /// A rumor chain was started.
    RumorStarted,
    /// A rumor was retold.
    RumorSpread,
    /// A rumor chain ran its course.
    RumorRetired,
    /// A party was thrown.
    PartyThrown,
    /// Someone cooked.
    Cooked,
    /// Someone pranked someone.
    Pranked,
    /// A board post went up.
    BoardPost,
    /// A duel was resolved.
    DuelResolved,
    /// An agent joined a faction.
    FactionJoined,
    /// A proposal was created.
    ProposalCreated,
    /// A vote was cast.
    VoteCast,
    /// A proposal was resolved.
    ProposalResolved,
    /// Two factions allied.
    AllianceFormed,
    /// An alliance was betrayed.
    AllianceBroken,
    /// A trade offer was posted.
    TradeCreated,
    /// A trade offer was accepted.
    TradeAccepted,
    /// A trade offer was withdrawn.
    TradeCancelled,
    /// An agent bought from the market.
    ItemBought,
    /// An agent sold to the market.
    ItemSold,
    /// An agent explored.
    Explored,
    /// A quest was taken.
    QuestAccepted,
    /// A quest step was completed.
    QuestAdvanced,
    /// A quest was finished.
    QuestCompleted,
    /// The Landlord issued a decree.
    Decree,
    /// The Landlord triggered a world event.
    WorldEvent,
    /// A decree's time-boxed modifier lapsed.
    ModifierExpired,
    /// An agent's mood drifted on its own.
    MoodDrift,
    /// An achievement was credited.
    AchievementUnlocked,
    /// A new episode (or season) began.
    EpisodeAdvanced,
    /// The world advanced one tick.
    TickAdvanced,
}

/// One entry in the world event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogEvent {
    /// Unique identifier.
    pub id: EventId,
    /// Tick the event happened on.
    pub tick: u64,
    /// What happened.
    pub kind: EventKind,
    /// Flat scalar payload.
    pub payload: BTreeMap<String, Value>,
}

impl LogEvent {
    /// Start an event with an empty payload.
    pub fn new(tick: u64, kind: EventKind) -> Self {
        Self {
            id: EventId::new(),
            tick,
            kind,
            payload: BTreeMap::new(),
        }
    }

    /// Attach a scalar payload field.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_owned(), value.into());
        self
    }

    /// Attach an agent id payload field.
    #[must_use]
    pub fn with_agent(self, key: &str, agent: AgentId) -> Self {
        self.with(key, agent.to_string())
    }

    /// Read a string payload field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// Read an unsigned payload field.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.payload.get(key).and_then(Value::as_u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_builder_collects_scalars() {
        let agent = AgentId::new();
        let event = LogEvent::new(4, EventKind::Moved)
            .with_agent("agent", agent)
            .with("to", "kitchen")
            .with("arrived", true)
            .with("clout", 15_u64);
        assert_eq!(event.tick, 4);
        assert_eq!(event.get_str("to"), Some("kitchen"));
        assert_eq!(event.get_u64("clout"), Some(15));
        assert_eq!(event.get_str("agent"), Some(agent.to_string().as_str()));
        assert_eq!(event.payload.get("arrived"), Some(&Value::Bool(true)));
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&EventKind::RumorSpread).ok();
        assert_eq!(json.as_deref(), Some("\"rumor_spread\""));
    }
}
