//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity owned by the world has a strongly-typed ID so a chain id can
//! never be passed where a proposal id is expected. All IDs use UUID v7
//! (time-ordered), which keeps snapshot output sorted by creation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a resident agent.
    AgentId
}

define_id! {
    /// Unique identifier for a rumor chain.
    ChainId
}

define_id! {
    /// Unique identifier for a party (effect-sequence) record.
    PartyId
}

define_id! {
    /// Unique identifier for a Landlord decree.
    DecreeId
}

define_id! {
    /// Unique identifier for a Landlord-triggered world event.
    WorldEventId
}

define_id! {
    /// Unique identifier for a faction proposal.
    ProposalId
}

define_id! {
    /// Unique identifier for a peer-to-peer trade offer.
    TradeId
}

define_id! {
    /// Unique identifier for a quest instance.
    QuestId
}

define_id! {
    /// Unique identifier for a discovered artifact.
    ArtifactId
}

define_id! {
    /// Unique identifier for a resolved duel.
    DuelId
}

define_id! {
    /// Unique identifier for a community board post.
    PostId
}

define_id! {
    /// Unique identifier for an entry in the world event log.
    EventId
}

define_id! {
    /// Unique identifier for a ledger entry.
    LedgerEntryId
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = AgentId::new();
        let b = AgentId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn id_parses_from_display() {
        let id = ChainId::new();
        let parsed: ChainId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = TradeId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.into_inner()));
    }
}
