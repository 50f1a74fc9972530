//! The ledger: FUNC movements, clout awards and achievement credits.
//!
//! Balances live on the [`Agent`] itself; the [`Ledger`] is the only code
//! path allowed to change them. Every FUNC movement is validated before any
//! balance is touched, then recorded as a [`LedgerEntry`] in a bounded log.
//!
//! # Design
//!
//! - **Validate then mutate**: a failing spend or transfer leaves every
//!   balance exactly as it was.
//! - **Running totals**: `minted` and `burned` are never trimmed, so the
//!   conservation check stays exact even after old entries are evicted.
//! - **No floating point**: FUNC and clout are `u64`, MON is [`Decimal`].

use std::collections::VecDeque;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use monad_types::{Achievement, Agent, AgentId, LedgerEntry, LedgerEntryId, LedgerEntryKind};

use crate::LedgerError;
use crate::conservation::{ConservationResult, verify_conservation};
use crate::rewards::{self, CloutReward};

/// Entries kept before the oldest are evicted.
pub const DEFAULT_ENTRY_CAPACITY: usize = 2000;

/// Lifetime FUNC totals, carried across snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// FUNC ever minted.
    pub minted: u64,
    /// FUNC ever burned.
    pub burned: u64,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Bookkeeper for every currency movement in the world.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Recent entries, oldest first.
    entries: VecDeque<LedgerEntry>,
    /// Maximum number of entries retained.
    capacity: usize,
    /// Lifetime mint/burn totals.
    totals: LedgerTotals,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRY_CAPACITY)
    }
}

impl Ledger {
    /// Create an empty ledger that retains at most `capacity` entries.
    pub const fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            totals: LedgerTotals {
                minted: 0,
                burned: 0,
            },
        }
    }

    /// Rebuild a ledger from persisted totals. The entry log starts empty.
    pub const fn from_totals(capacity: usize, totals: LedgerTotals) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            totals,
        }
    }

    /// Lifetime totals.
    pub const fn totals(&self) -> LedgerTotals {
        self.totals
    }

    /// FUNC that should currently be held across all agents.
    pub const fn circulating(&self) -> u64 {
        self.totals.minted.saturating_sub(self.totals.burned)
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter()
    }

    // -----------------------------------------------------------------------
    // FUNC
    // -----------------------------------------------------------------------

    /// Mint FUNC into an agent's balance from a fixed reward table.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NonPositiveAmount`] for a zero amount, or
    /// [`LedgerError::Overflow`] if the balance or total would overflow.
    pub fn mint(
        &mut self,
        agent: &mut Agent,
        amount: u64,
        reason: &str,
        tick: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::NonPositiveAmount);
        }
        let balance = agent.func.checked_add(amount).ok_or(LedgerError::Overflow)?;
        let minted = self
            .totals
            .minted
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        agent.func = balance;
        self.totals.minted = minted;
        self.record(tick, LedgerEntryKind::Mint, None, Some(agent.id), amount, reason);
        debug!(tick, agent = %agent.id, amount, reason, "FUNC minted");
        Ok(())
    }

    /// Burn FUNC from an agent's balance for a fixed cost.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientFunds`] if the agent cannot pay,
    /// leaving the balance unchanged.
    pub fn spend(
        &mut self,
        agent: &mut Agent,
        amount: u64,
        reason: &str,
        tick: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::NonPositiveAmount);
        }
        let balance = agent
            .func
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds {
                needed: amount,
                available: agent.func,
            })?;
        let burned = self
            .totals
            .burned
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        agent.func = balance;
        self.totals.burned = burned;
        self.record(tick, LedgerEntryKind::Burn, Some(agent.id), None, amount, reason);
        debug!(tick, agent = %agent.id, amount, reason, "FUNC burned");
        Ok(())
    }

    /// Move FUNC between two agents. Neither balance changes on failure.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NonPositiveAmount`] for zero,
    /// [`LedgerError::SelfTransfer`] if both sides are the same agent, or
    /// [`LedgerError::InsufficientFunds`] if the sender cannot cover it.
    pub fn transfer(
        &mut self,
        from: &mut Agent,
        to: &mut Agent,
        amount: u64,
        reason: &str,
        tick: u64,
    ) -> Result<(), LedgerError> {
        Self::check_transfer(from, to.id, amount)?;
        let credited = to.func.checked_add(amount).ok_or(LedgerError::Overflow)?;
        let debited = from
            .func
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds {
                needed: amount,
                available: from.func,
            })?;

        from.func = debited;
        to.func = credited;
        self.record(
            tick,
            LedgerEntryKind::Transfer,
            Some(from.id),
            Some(to.id),
            amount,
            reason,
        );
        debug!(tick, from = %from.id, to = %to.id, amount, reason, "FUNC transferred");
        Ok(())
    }

    /// Validate a transfer without performing it.
    ///
    /// Multi-leg operations (trades) check every leg with this before
    /// executing any of them.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Ledger::transfer`].
    pub fn check_transfer(from: &Agent, to: AgentId, amount: u64) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::NonPositiveAmount);
        }
        if from.id == to {
            return Err(LedgerError::SelfTransfer);
        }
        if from.func < amount {
            return Err(LedgerError::InsufficientFunds {
                needed: amount,
                available: from.func,
            });
        }
        Ok(())
    }

    /// Check that all agent balances add up to what has been minted.
    pub fn verify_conservation<'a>(
        &self,
        tick: u64,
        agents: impl IntoIterator<Item = &'a Agent>,
    ) -> ConservationResult {
        verify_conservation(tick, self.circulating(), agents)
    }

    fn record(
        &mut self,
        tick: u64,
        kind: LedgerEntryKind,
        from: Option<AgentId>,
        to: Option<AgentId>,
        amount: u64,
        reason: &str,
    ) {
        self.entries.push_back(LedgerEntry {
            id: LedgerEntryId::new(),
            tick,
            kind,
            from,
            to,
            amount,
            reason: reason.to_owned(),
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    // -----------------------------------------------------------------------
    // Clout
    // -----------------------------------------------------------------------

    /// Award clout from the reward table. Returns the amount granted.
    pub fn award_clout(agent: &mut Agent, reward: CloutReward) -> u64 {
        let amount = reward.amount();
        agent.clout = agent.clout.saturating_add(amount);
        debug!(agent = %agent.id, amount, reason = reward.as_str(), "clout awarded");
        amount
    }

    /// Add an arbitrary amount of clout (quest payouts, duel wins).
    pub const fn add_clout(agent: &mut Agent, amount: u64) {
        agent.clout = agent.clout.saturating_add(amount);
    }

    /// Remove clout, never going below zero.
    pub const fn penalize_clout(agent: &mut Agent, amount: u64) {
        agent.clout = agent.clout.saturating_sub(amount);
    }

    // -----------------------------------------------------------------------
    // Achievements
    // -----------------------------------------------------------------------

    /// Credit an achievement and its MON value.
    ///
    /// One-shot achievements are credited at most once; repeatable ones
    /// every time. Returns the MON credited, or `None` if nothing changed.
    pub fn grant_achievement(agent: &mut Agent, achievement: Achievement) -> Option<Decimal> {
        if !rewards::is_repeatable(achievement) && agent.has_achievement(achievement) {
            return None;
        }
        let mon = rewards::achievement_mon(achievement);
        let earned = agent.mon_earned.checked_add(mon)?;
        agent.mon_earned = earned;
        let count = agent.achievements.entry(achievement).or_insert(0);
        *count = count.saturating_add(1);
        debug!(agent = %agent.id, achievement = %achievement, %mon, "achievement credited");
        Some(mon)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use monad_types::{Mood, Personality};

    use super::*;

    fn make_agent(func: u64) -> Agent {
        let mut agent = Agent::new("test", Personality::Nerd, BTreeMap::new(), Mood::Chill, 0);
        agent.func = func;
        agent
    }

    fn funded_pair(ledger: &mut Ledger, a: u64, b: u64) -> (Agent, Agent) {
        let mut first = make_agent(0);
        let mut second = make_agent(0);
        ledger.mint(&mut first, a, "registration", 0).unwrap();
        ledger.mint(&mut second, b, "registration", 0).unwrap();
        (first, second)
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = Ledger::default();
        assert!(ledger.is_empty());
        assert_eq!(ledger.circulating(), 0);
    }

    #[test]
    fn mint_credits_and_records() {
        let mut ledger = Ledger::default();
        let mut agent = make_agent(0);
        ledger.mint(&mut agent, 100, "registration", 0).unwrap();
        assert_eq!(agent.func, 100);
        assert_eq!(ledger.totals().minted, 100);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn spend_fails_without_funds_and_changes_nothing() {
        let mut ledger = Ledger::default();
        let mut agent = make_agent(0);
        ledger.mint(&mut agent, 10, "registration", 0).unwrap();
        let err = ledger.spend(&mut agent, 20, "throw_party", 1).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                needed: 20,
                available: 10
            }
        );
        assert_eq!(agent.func, 10);
        assert_eq!(ledger.totals().burned, 0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn transfer_preserves_pair_sum() {
        let mut ledger = Ledger::default();
        let (mut a, mut b) = funded_pair(&mut ledger, 100, 40);
        let before = a.func + b.func;
        ledger.transfer(&mut a, &mut b, 30, "duel_wager", 2).unwrap();
        assert_eq!(a.func, 70);
        assert_eq!(b.func, 70);
        assert_eq!(a.func + b.func, before);
    }

    #[test]
    fn overdrawn_transfer_changes_nothing() {
        let mut ledger = Ledger::default();
        let (mut a, mut b) = funded_pair(&mut ledger, 5, 40);
        let err = ledger.transfer(&mut a, &mut b, 6, "trade", 2).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!((a.func, b.func), (5, 40));
    }

    #[test]
    fn zero_transfer_is_rejected() {
        let mut ledger = Ledger::default();
        let (mut a, mut b) = funded_pair(&mut ledger, 5, 5);
        assert_eq!(
            ledger.transfer(&mut a, &mut b, 0, "trade", 1),
            Err(LedgerError::NonPositiveAmount)
        );
    }

    #[test]
    fn entry_log_is_bounded_but_totals_are_not() {
        let mut ledger = Ledger::new(3);
        let mut agent = make_agent(0);
        for tick in 0..10 {
            ledger.mint(&mut agent, 1, "party_tip", tick).unwrap();
        }
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.totals().minted, 10);
        assert_eq!(ledger.entries().next().unwrap().tick, 7);
    }

    #[test]
    fn clout_penalty_saturates() {
        let mut agent = make_agent(0);
        Ledger::award_clout(&mut agent, CloutReward::StartGossip);
        Ledger::penalize_clout(&mut agent, 50);
        assert_eq!(agent.clout, 0);
    }

    #[test]
    fn one_shot_achievement_credits_once() {
        let mut agent = make_agent(0);
        assert!(Ledger::grant_achievement(&mut agent, Achievement::CloutMilestone100).is_some());
        assert!(Ledger::grant_achievement(&mut agent, Achievement::CloutMilestone100).is_none());
        assert_eq!(agent.mon_earned.to_string(), "0.001");
    }

    #[test]
    fn repeatable_achievement_accumulates() {
        let mut agent = make_agent(0);
        Ledger::grant_achievement(&mut agent, Achievement::DuelWin);
        Ledger::grant_achievement(&mut agent, Achievement::DuelWin);
        assert_eq!(agent.achievements.get(&Achievement::DuelWin), Some(&2));
        assert_eq!(agent.mon_earned.to_string(), "0.0006");
    }

    #[test]
    fn conservation_holds_after_mixed_flows() {
        let mut ledger = Ledger::default();
        let (mut a, mut b) = funded_pair(&mut ledger, 100, 100);
        ledger.spend(&mut a, 20, "throw_party", 1).unwrap();
        ledger.transfer(&mut b, &mut a, 15, "trade", 1).unwrap();
        ledger.mint(&mut b, 8, "cook_for_others", 1).unwrap();
        assert_eq!(
            ledger.verify_conservation(1, [&a, &b]),
            ConservationResult::Balanced
        );
    }
}
