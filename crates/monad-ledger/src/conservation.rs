//! FUNC conservation verification.
//!
//! FUNC enters circulation only through mints and leaves only through
//! burns; transfers move it without changing the total. So at any moment:
//!
//! ```text
//! sum(agent.func) == minted - burned
//! ```
//!
//! Every well-formed ledger operation preserves this by construction. The
//! check runs once per tick and catches any code path that touched a
//! balance without going through the ledger.

use rust_decimal::Decimal;

use monad_types::Agent;

use crate::LedgerAnomaly;

/// The result of a conservation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// Balances match the ledger.
    Balanced,
    /// Balances have drifted from the ledger.
    Anomaly(LedgerAnomaly),
}

/// Compare what the ledger says is circulating with what agents hold.
///
/// Sums in [`Decimal`] so that no combination of `u64` balances can
/// overflow the accumulator.
pub fn verify_conservation<'a>(
    tick: u64,
    circulating: u64,
    agents: impl IntoIterator<Item = &'a Agent>,
) -> ConservationResult {
    let actual = agents
        .into_iter()
        .fold(Decimal::ZERO, |sum, agent| {
            sum.saturating_add(Decimal::from(agent.func))
        });
    let expected = Decimal::from(circulating);

    if actual == expected {
        ConservationResult::Balanced
    } else {
        ConservationResult::Anomaly(LedgerAnomaly {
            tick,
            expected,
            actual,
            message: format!(
                "LEDGER_ANOMALY at tick {tick}: agents hold {actual} FUNC but {expected} is circulating",
            ),
        })
    }
}
