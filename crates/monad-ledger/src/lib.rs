//! Currency bookkeeping for The Monad.
//!
//! The world runs on three currencies:
//!
//! - **Clout** -- an inflationary social score. Awards simply add to it;
//!   penalties saturate at zero. No conservation requirement.
//! - **FUNC** -- a conserved token. It enters circulation only through
//!   fixed reward tables (mint), leaves only through fixed cost tables
//!   (burn), and otherwise moves atomically between agents (transfer).
//! - **MON** -- a reward-only [`Decimal`] credited by achievements. It is
//!   never spent.
//!
//! # Modules
//!
//! - [`ledger`] -- The [`Ledger`]: FUNC movements, clout awards, achievements.
//! - [`rewards`] -- Fixed reward and cost tables.
//! - [`conservation`] -- FUNC conservation check and anomaly detection.
//! - [`leaderboard`] -- Ranked views over agent balances.
//!
//! # Conservation Law
//!
//! At every tick:
//!
//! ```text
//! sum(agent.func) == minted - burned
//! ```
//!
//! A violation produces a [`LedgerAnomaly`]. The ledger never panics; it
//! returns errors and leaves balances untouched on failure.

pub mod conservation;
pub mod leaderboard;
pub mod ledger;
pub mod rewards;

// Re-export primary types at crate root.
pub use conservation::ConservationResult;
pub use leaderboard::{LeaderboardEntry, leaderboard};
pub use ledger::{DEFAULT_ENTRY_CAPACITY, Ledger, LedgerTotals};
pub use rewards::{CloutReward, FuncCost, FuncReward};

use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when moving FUNC.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The debited agent does not hold enough FUNC.
    #[error("insufficient FUNC: needed {needed}, available {available}")]
    InsufficientFunds {
        /// Amount the operation required.
        needed: u64,
        /// Balance the agent actually holds.
        available: u64,
    },

    /// Amount must be strictly positive.
    #[error("FUNC amount must be positive")]
    NonPositiveAmount,

    /// An agent tried to transfer FUNC to itself.
    #[error("cannot transfer FUNC to the same agent")]
    SelfTransfer,

    /// A balance or running total would overflow `u64`.
    #[error("FUNC arithmetic overflow")]
    Overflow,
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A FUNC conservation violation.
///
/// Raised when the sum of all agent balances no longer matches the net
/// amount the ledger has minted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// The tick where the anomaly was detected.
    pub tick: u64,
    /// What the ledger says should be circulating.
    pub expected: Decimal,
    /// What the agents actually hold.
    pub actual: Decimal,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
