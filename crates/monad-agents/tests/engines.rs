//! Cross-engine scenarios for `monad-agents`.
//!
//! Each engine has unit tests next to its code; these drive several
//! engines against shared agents and a shared ledger the way the world
//! orchestrator does, checking the invariants that span engines.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::too_many_lines)]

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use monad_agents::exploration::{self, QUEST_TEMPLATES};
use monad_agents::rumor::RumorTuning;
use monad_agents::{
    Discovery, MarketTuning, Marketplace, Politics, QuestBoard, QuorumRule, RumorMill,
    StepOutcome, combat, compose, create_agent, pair_mut,
};
use monad_ledger::conservation::ConservationResult;
use monad_ledger::{FuncReward, Ledger};
use monad_types::{
    Agent, AgentId, Faction, Personality, ProposalKind, ProposalStatus, TradeAsset, Vibe,
};

fn residents(rng: &mut SmallRng, ledger: &mut Ledger) -> Vec<Agent> {
    Personality::ALL
        .iter()
        .enumerate()
        .map(|(i, personality)| {
            let mut agent = create_agent(&format!("resident-{i}"), *personality, 0, rng);
            ledger
                .mint(&mut agent, FuncReward::Registration.amount(), FuncReward::Registration.as_str(), 0)
                .unwrap();
            agent
        })
        .collect()
}

fn roster(agents: Vec<Agent>) -> BTreeMap<AgentId, Agent> {
    agents.into_iter().map(|agent| (agent.id, agent)).collect()
}

#[test]
fn rumor_reaches_everyone_once() {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut ledger = Ledger::default();
    let mut agents = residents(&mut rng, &mut ledger);
    let tuning = RumorTuning::default();
    let mut mill = RumorMill::new();

    let chain_id = mill.start(&mut agents[0], "The elevator talks at night.", 1).unwrap().id;

    // Everyone tries twice; only the first attempt per agent may land.
    for round in 0..2_u64 {
        for agent in &mut agents {
            let _ = mill.propagate(chain_id, agent, 2 + round, &tuning, &mut rng);
        }
    }

    let chain = mill.get(chain_id).unwrap();
    assert_eq!(chain.links.len(), agents.len() - 1);
    assert!(chain.links.iter().all(|link| link.agent_id != chain.originator));
    let mut seen: Vec<AgentId> = chain.links.iter().map(|link| link.agent_id).collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), chain.links.len());
    assert!(agents.iter().all(|agent| agent.gossip_heard.contains(&chain_id)));
    assert!(chain.credibility <= 100 && chain.spiciness <= 100);
}

#[test]
fn market_and_trades_conserve_func() {
    let mut rng = SmallRng::seed_from_u64(7);
    let mut ledger = Ledger::default();
    let mut agents = residents(&mut rng, &mut ledger);
    let mut market = Marketplace::new(MarketTuning::default(), &mut rng);

    market.buy("disco_ball", &mut agents[0], &mut ledger, 1).unwrap();
    market.buy("fortune_cookie", &mut agents[1], &mut ledger, 1).unwrap();
    market.sell("fortune_cookie", &mut agents[1], &mut ledger, 2).unwrap();

    let seller = agents[0].id;
    let buyer = agents[2].id;
    let offer_id = market
        .create_offer(
            &agents[0],
            TradeAsset::Item("disco_ball".to_owned()),
            TradeAsset::Func(35),
            3,
        )
        .unwrap()
        .id;
    let mut agents = roster(agents);
    let (seller_agent, buyer_agent) = pair_mut(&mut agents, seller, buyer).unwrap();
    let receipt = market
        .accept_offer(offer_id, seller_agent, buyer_agent, &mut ledger, 4)
        .unwrap();
    assert!(receipt.seller_profit);

    assert!(agents[&buyer].holds("disco_ball"));
    assert!(!agents[&seller].holds("disco_ball"));
    assert_eq!(agents[&seller].trade_count, 1);
    assert_eq!(
        ledger.verify_conservation(4, agents.values()),
        ConservationResult::Balanced
    );
}

#[test]
fn duel_wager_moves_exactly_once() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut ledger = Ledger::default();
    let agents = residents(&mut rng, &mut ledger);
    let before: u64 = agents.iter().map(|agent| agent.func).sum();

    let duel = combat::resolve(&agents[0], &agents[1], 5, 10, 0, &mut rng);
    let mut agents = roster(agents);
    let (winner, loser) = pair_mut(&mut agents, duel.winner, duel.loser).unwrap();
    let (winner_before, loser_before) = (winner.func, loser.func);
    ledger.transfer(loser, winner, duel.wager, "duel_wager", 5).unwrap();

    assert_eq!(winner.func, winner_before + 10);
    assert_eq!(loser.func, loser_before - 10);
    assert_eq!(agents.values().map(|agent| agent.func).sum::<u64>(), before);
}

#[test]
fn faction_vote_needs_quorum() {
    let mut rng = SmallRng::seed_from_u64(11);
    let mut ledger = Ledger::default();
    let mut agents = residents(&mut rng, &mut ledger);
    let mut politics = Politics::new(QuorumRule::default());

    for agent in &mut agents {
        politics.join_faction(agent, Faction::Mystics).unwrap();
    }
    assert_eq!(politics.leader(Faction::Mystics), Some(agents[0].id));
    assert_eq!(politics.members(Faction::Mystics).len(), agents.len());

    let id = politics
        .create_proposal(&agents[0], "Quiet hours", "After ten.", ProposalKind::Rule, Vec::new(), 1)
        .unwrap()
        .id;
    politics.cast_vote(id, &agents[0], "yes").unwrap();
    politics.cast_vote(id, &agents[1], "YES").unwrap();
    assert_eq!(politics.resolve(id, agents.len(), 2), None);

    politics.cast_vote(id, &agents[2], "no").unwrap();
    assert_eq!(politics.resolve(id, agents.len(), 3), Some(ProposalStatus::Passed));
    assert_eq!(politics.resolve(id, agents.len(), 4), None);
    let proposal = politics.proposal(id).unwrap();
    assert_eq!(proposal.result.as_deref(), Some("yes"));
    assert_eq!(proposal.faction_support.get(&Faction::Mystics), Some(&3));
}

#[test]
fn party_axes_stay_bounded_for_every_lineup() {
    let mut rng = SmallRng::seed_from_u64(5);
    let mut ledger = Ledger::default();
    let agents = residents(&mut rng, &mut ledger);
    let guests: Vec<&Agent> = agents.iter().collect();

    for first in Vibe::ALL {
        for second in Vibe::ALL {
            let lineup = [*first, *second, Vibe::Mystery, Vibe::Potluck];
            let outcome = compose(&lineup, &guests, &mut rng);
            let state = &outcome.state;
            for axis in [state.energy, state.volatility, state.bonding, state.enjoyment] {
                assert!(axis <= 100);
            }
            assert!(state.log.len() <= lineup.len());
        }
    }
}

#[test]
fn explorer_finishes_the_basement_mystery() {
    let mut rng = SmallRng::seed_from_u64(9);
    let mut ledger = Ledger::default();
    let mut agents = residents(&mut rng, &mut ledger);
    let mut board = QuestBoard::new();
    let explorer = &mut agents[0];

    let quest_id = board
        .available()
        .find(|quest| quest.template == "basement_mystery")
        .unwrap()
        .id;
    board.accept(quest_id, explorer).unwrap();
    assert_eq!(board.available().count(), QUEST_TEMPLATES.len());

    explorer.location = monad_types::Location::Basement;
    let arrived = exploration::visit_tag(explorer.location);
    board.progress(explorer, arrived);
    let found = exploration::explore(explorer, 2, &mut rng);
    assert!(found.len() <= 3);
    for discovery in &found {
        if let Discovery::Artifact(artifact) = discovery {
            assert!(explorer.artifacts.contains(&artifact.id));
        }
    }
    board.progress(explorer, "explore");
    let outcomes = board.progress(explorer, "talk");
    assert!(matches!(outcomes.as_slice(), [(id, StepOutcome::Completed(_))] if *id == quest_id));
    assert_eq!(explorer.completed_quests, vec![quest_id]);
}
