//! Ranked views over agent balances.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use monad_types::{Agent, AgentId, LeaderboardMetric};

/// One row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    /// The ranked agent.
    pub agent: AgentId,
    /// Their display name.
    pub name: String,
    /// The metric value, widened to [`Decimal`] so MON and integer
    /// metrics share one shape.
    pub score: Decimal,
}

/// Read one metric off an agent.
pub fn score(agent: &Agent, metric: LeaderboardMetric) -> Decimal {
    match metric {
        LeaderboardMetric::Clout => Decimal::from(agent.clout),
        LeaderboardMetric::Func => Decimal::from(agent.func),
        LeaderboardMetric::Mon => agent.mon_earned,
        LeaderboardMetric::DuelWins => Decimal::from(agent.duel_record.wins),
        LeaderboardMetric::Artifacts => Decimal::from(agent.artifacts.len()),
        LeaderboardMetric::Trades => Decimal::from(agent.trade_count),
    }
}

/// Rank agents by a metric, highest first.
///
/// The sort is stable: agents with equal scores keep the order they were
/// supplied in (registration order, when called by the world). Ranks are
/// assigned 1..n by position.
pub fn leaderboard<'a>(
    agents: impl IntoIterator<Item = &'a Agent>,
    metric: LeaderboardMetric,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut scored: Vec<(&Agent, Decimal)> = agents
        .into_iter()
        .map(|agent| (agent, score(agent, metric)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    scored
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, (agent, score))| LeaderboardEntry {
            rank: index.saturating_add(1),
            agent: agent.id,
            name: agent.name.clone(),
            score,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use monad_types::{Mood, Personality};

    use super::*;

    fn agent(name: &str, clout: u64) -> Agent {
        let mut agent = Agent::new(name, Personality::SocialButterfly, BTreeMap::new(), Mood::Happy, 0);
        agent.clout = clout;
        agent
    }

    #[test]
    fn sorted_descending_with_ranks() {
        let agents = [agent("a", 10), agent("b", 30), agent("c", 20)];
        let board = leaderboard(&agents, LeaderboardMetric::Clout, 10);
        let names: Vec<&str> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b", "c", "a"]);
        assert_eq!(board.iter().map(|e| e.rank).collect::<Vec<_>>(), [1, 2, 3]);
    }

    #[test]
    fn ties_keep_input_order() {
        let agents = [agent("first", 5), agent("second", 5), agent("third", 9)];
        let board = leaderboard(&agents, LeaderboardMetric::Clout, 10);
        assert_eq!(board.get(1).unwrap().name, "first");
        assert_eq!(board.get(2).unwrap().name, "second");
    }

    #[test]
    fn limit_truncates() {
        let agents = [agent("a", 1), agent("b", 2), agent("c", 3)];
        assert_eq!(leaderboard(&agents, LeaderboardMetric::Clout, 2).len(), 2);
    }
}
