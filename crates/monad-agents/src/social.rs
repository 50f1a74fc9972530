//! Relationship helpers that touch more than one agent.
//!
//! Single-agent mutations live on [`Agent`] itself. This module covers the
//! two-sided cases (mutual affinity changes) and the borrow plumbing needed
//! to hold two agents mutably at once.

use std::collections::BTreeMap;

use monad_types::{Agent, AgentId, Location};

// ---------------------------------------------------------------------------
// Affinity deltas
// ---------------------------------------------------------------------------

/// Affinity each side gains from a one-on-one conversation.
pub const TALK_TARGETED: i32 = 3;

/// Affinity gained with everyone in the room from a room-wide remark.
pub const TALK_ROOM: i32 = 1;

/// Affinity the teller gains toward the listener when spreading a rumor.
pub const GOSSIP_TELLER: i32 = 5;

/// Affinity the listener gains toward the teller when hearing a rumor.
pub const GOSSIP_LISTENER: i32 = 3;

/// Affinity both traders gain on a completed trade.
pub const TRADE_BOND: i32 = 5;

/// Affinity both duelists lose, whoever wins.
pub const DUEL_PENALTY: i32 = -10;

/// Host's affinity gain toward each guest.
pub const PARTY_HOST_TO_GUEST: i32 = 5;

/// Each guest's affinity gain toward the host.
pub const PARTY_GUEST_TO_HOST: i32 = 8;

/// Affinity at or above which a relationship counts as a friendship.
pub const FRIEND_THRESHOLD: i32 = 40;

/// Affinity at or below which a relationship counts as a rivalry.
pub const RIVAL_THRESHOLD: i32 = -41;

// ---------------------------------------------------------------------------
// Two-sided updates
// ---------------------------------------------------------------------------

/// How a two-sided affinity change moved the relationship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BondChange {
    /// `a`'s view of `b` crossed into friendship.
    pub became_friends: bool,
    /// `a`'s view of `b` crossed into rivalry.
    pub became_rivals: bool,
}

/// Apply `a_to_b` to `a`'s view of `b` and `b_to_a` to `b`'s view of `a`.
///
/// Reports whether `a`'s view crossed the friend or rival threshold.
pub fn bond(a: &mut Agent, b: &mut Agent, a_to_b: i32, b_to_a: i32, note: &str, tick: u64) -> BondChange {
    let before = a.affinity_toward(b.id);
    a.adjust_relationship(b.id, a_to_b, note, tick);
    b.adjust_relationship(a.id, b_to_a, note, tick);
    let after = a.affinity_toward(b.id);
    BondChange {
        became_friends: before < FRIEND_THRESHOLD && after >= FRIEND_THRESHOLD,
        became_rivals: before > RIVAL_THRESHOLD && after <= RIVAL_THRESHOLD,
    }
}

// ---------------------------------------------------------------------------
// Borrow helpers
// ---------------------------------------------------------------------------

/// Borrow two distinct agents mutably.
///
/// Returns `None` if either id is missing or both ids are the same.
pub fn pair_mut(
    agents: &mut BTreeMap<AgentId, Agent>,
    a: AgentId,
    b: AgentId,
) -> Option<(&mut Agent, &mut Agent)> {
    if a == b {
        return None;
    }
    let mut first = None;
    let mut second = None;
    for (id, agent) in agents.iter_mut() {
        if *id == a {
            first = Some(agent);
        } else if *id == b {
            second = Some(agent);
        }
    }
    first.zip(second)
}

/// Ids of every agent at `location`, optionally excluding one.
pub fn occupants(
    agents: &BTreeMap<AgentId, Agent>,
    location: Location,
    except: Option<AgentId>,
) -> Vec<AgentId> {
    agents
        .values()
        .filter(|agent| agent.location == location && Some(agent.id) != except)
        .map(|agent| agent.id)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use monad_types::{Mood, Personality};

    use super::*;

    fn make_agent(name: &str) -> Agent {
        Agent::new(name, Personality::Schemer, BTreeMap::new(), Mood::Scheming, 0)
    }

    fn roster(names: &[&str]) -> (BTreeMap<AgentId, Agent>, Vec<AgentId>) {
        let mut map = BTreeMap::new();
        let mut ids = Vec::new();
        for name in names {
            let agent = make_agent(name);
            ids.push(agent.id);
            map.insert(agent.id, agent);
        }
        (map, ids)
    }

    #[test]
    fn bond_is_asymmetric() {
        let mut a = make_agent("a");
        let mut b = make_agent("b");
        bond(&mut a, &mut b, PARTY_HOST_TO_GUEST, PARTY_GUEST_TO_HOST, "party", 1);
        assert_eq!(a.affinity_toward(b.id), 5);
        assert_eq!(b.affinity_toward(a.id), 8);
    }

    #[test]
    fn bond_reports_threshold_crossings() {
        let mut a = make_agent("a");
        let mut b = make_agent("b");
        let change = bond(&mut a, &mut b, 45, 0, "gift", 1);
        assert!(change.became_friends);
        let change = bond(&mut a, &mut b, -90, 0, "betrayal", 2);
        assert!(change.became_rivals);
        assert!(!change.became_friends);
    }

    #[test]
    fn pair_mut_borrows_both() {
        let (mut map, ids) = roster(&["a", "b", "c"]);
        let (x, y) = pair_mut(&mut map, ids[2], ids[0]).unwrap();
        assert_eq!(x.name, "c");
        assert_eq!(y.name, "a");
        x.clout = 7;
        assert_eq!(map.get(&ids[2]).unwrap().clout, 7);
    }

    #[test]
    fn pair_mut_rejects_same_or_missing() {
        let (mut map, ids) = roster(&["a", "b"]);
        assert!(pair_mut(&mut map, ids[0], ids[0]).is_none());
        assert!(pair_mut(&mut map, ids[0], AgentId::new()).is_none());
    }

    #[test]
    fn occupants_filters_by_location() {
        let (mut map, ids) = roster(&["a", "b", "c"]);
        map.get_mut(&ids[1]).unwrap().location = Location::Kitchen;
        let lobby = occupants(&map, Location::Lobby, Some(ids[0]));
        assert_eq!(lobby, vec![ids[2]]);
    }
}
