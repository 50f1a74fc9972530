//! End-to-end scenarios driven through `World::execute`.
//!
//! Every test builds a world with the Landlord silenced so that decrees
//! and events cannot interfere, then checks what residents observe and
//! that FUNC stays conserved.

#![allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing, clippy::too_many_lines)]

use monad_core::{Command, CommandError, CommandOutcome, MonadConfig, World, WorldSnapshot};
use monad_ledger::ConservationResult;
use monad_types::{
    AgentId, ChainId, EventKind, Location, Personality, ProposalId, ProposalKind, ProposalStatus,
    QuestStatus, TradeAsset, Vibe,
};

fn quiet_config() -> MonadConfig {
    let mut config = MonadConfig::default();
    config.landlord.high_chaos_chance = 0.0;
    config.landlord.gossip_overflow_chance = 0.0;
    config.landlord.random_decree_chance = 0.0;
    config.landlord.world_event_chance = 0.0;
    config.landlord.periodic_interval = 0;
    config.rumor.auto_spread_chance = 0.0;
    config
}

fn register(world: &mut World, name: &str, personality: Personality) -> AgentId {
    match world
        .execute(Command::RegisterAgent {
            name: name.to_owned(),
            personality,
        })
        .unwrap()
    {
        CommandOutcome::Registered { agent } => agent,
        other => panic!("unexpected outcome: {other:?}"),
    }
}

fn start_rumor(world: &mut World, agent: AgentId, text: &str) -> ChainId {
    match world
        .execute(Command::StartRumor {
            agent,
            text: text.to_owned(),
        })
        .unwrap()
    {
        CommandOutcome::RumorStarted { chain } => chain,
        other => panic!("unexpected outcome: {other:?}"),
    }
}

fn propose(world: &mut World, agent: AgentId, title: &str) -> ProposalId {
    match world
        .execute(Command::CreateProposal {
            agent,
            title: title.to_owned(),
            description: String::new(),
            kind: ProposalKind::Rule,
            options: Vec::new(),
        })
        .unwrap()
    {
        CommandOutcome::ProposalCreated { proposal } => proposal,
        other => panic!("unexpected outcome: {other:?}"),
    }
}

fn vote(world: &mut World, agent: AgentId, proposal: ProposalId, choice: &str) -> Result<CommandOutcome, CommandError> {
    world.execute(Command::CastVote {
        agent,
        proposal,
        choice: choice.to_owned(),
    })
}

fn assert_balanced(world: &World) {
    let result = world.ledger().verify_conservation(world.tick(), world.agents());
    assert_eq!(result, ConservationResult::Balanced);
}

// ---------------------------------------------------------------------------
// Registration and refusals
// ---------------------------------------------------------------------------

#[test]
fn registration_mints_starting_func() {
    let mut world = World::new(quiet_config()).unwrap();
    let amy = register(&mut world, "Amy", Personality::Nerd);

    let agent = world.agent(amy).unwrap();
    assert_eq!(agent.func, 100);
    assert_eq!(agent.location, Location::Lobby);
    assert_eq!(world.ledger().circulating(), 100);
    assert!(world.events().iter().any(|event| event.kind == EventKind::AgentRegistered));
    assert_balanced(&world);
}

#[test]
fn refused_commands_report_their_category() {
    let mut world = World::new(quiet_config()).unwrap();
    let amy = register(&mut world, "Amy", Personality::Nerd);

    let blank = world
        .execute(Command::RegisterAgent {
            name: "   ".to_owned(),
            personality: Personality::Schemer,
        })
        .unwrap_err();
    assert_eq!(blank.code(), "invalid_input");

    let ghost = AgentId::new();
    let missing = world
        .execute(Command::Talk {
            agent: ghost,
            target: None,
            message: "hello?".to_owned(),
        })
        .unwrap_err();
    assert_eq!(missing, CommandError::agent(ghost));

    let nowhere = world
        .execute(Command::Move {
            agent: amy,
            to: Location::Lobby,
        })
        .unwrap_err();
    assert_eq!(nowhere.code(), "invalid_state");
    assert_eq!(world.agents().count(), 1);
}

// ---------------------------------------------------------------------------
// Rumors
// ---------------------------------------------------------------------------

#[test]
fn rumor_travels_through_residents() {
    let mut world = World::new(quiet_config()).unwrap();
    let amy = register(&mut world, "Amy", Personality::DramaQueen);
    let bo = register(&mut world, "Bo", Personality::Schemer);
    let cy = register(&mut world, "Cy", Personality::Nerd);
    let dee = register(&mut world, "Dee", Personality::ChaosGremlin);

    let chain = start_rumor(&mut world, amy, "the super is moving out");
    assert!(world.agent(amy).unwrap().gossip_started.contains(&chain));

    world
        .execute(Command::SpreadRumor {
            agent: amy,
            chain,
            target: bo,
        })
        .unwrap();
    let outcome = world
        .execute(Command::SpreadRumor {
            agent: bo,
            chain,
            target: cy,
        })
        .unwrap();
    let CommandOutcome::RumorSpread(spread) = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(spread.links, 2);
    assert!(world.agent(cy).unwrap().gossip_heard.contains(&chain));
    assert_eq!(world.chain(chain).unwrap().tail_agent(), cy);

    // Dee never heard it, so Dee cannot pass it on.
    let unheard = world
        .execute(Command::SpreadRumor {
            agent: dee,
            chain,
            target: amy,
        })
        .unwrap_err();
    assert_eq!(unheard.code(), "precondition_failed");

    // The originator cannot retell their own rumor.
    let back = world
        .execute(Command::SpreadRumor {
            agent: cy,
            chain,
            target: amy,
        })
        .unwrap_err();
    assert_eq!(back.code(), "precondition_failed");

    // A teller already in the chain cannot bind twice.
    let again = world
        .execute(Command::SpreadRumor {
            agent: cy,
            chain,
            target: bo,
        })
        .unwrap_err();
    assert_eq!(again.code(), "precondition_failed");
    assert_eq!(world.chain(chain).unwrap().links.len(), 2);

    let bonded = world.agent(bo).unwrap().relationships.get(&cy).unwrap().affinity;
    assert!(bonded > 0);
}

#[test]
fn rumors_retire_with_age() {
    let mut config = quiet_config();
    config.rumor.max_age = 2;
    let mut world = World::new(config).unwrap();
    let amy = register(&mut world, "Amy", Personality::Schemer);
    let chain = start_rumor(&mut world, amy, "someone keeps a goat on the roof");

    for _ in 0..3 {
        world.execute(Command::AdvanceTick).unwrap();
    }
    assert_eq!(world.active_chains().count(), 0);
    assert_eq!(world.retired_chains().count(), 1);
    assert!(!world.chain(chain).unwrap().active);
}

// ---------------------------------------------------------------------------
// Duels
// ---------------------------------------------------------------------------

#[test]
fn duel_moves_exactly_the_wager() {
    let mut world = World::new(quiet_config()).unwrap();
    let amy = register(&mut world, "Amy", Personality::ChaosGremlin);
    let bo = register(&mut world, "Bo", Personality::Nerd);

    let outcome = world
        .execute(Command::ChallengeDuel {
            agent: amy,
            target: bo,
            wager: 10,
        })
        .unwrap();
    let CommandOutcome::Dueled(record) = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };

    let winner = world.agent(record.winner).unwrap();
    let loser = world.agent(record.loser).unwrap();
    assert_eq!(winner.func, 110);
    assert_eq!(loser.func, 90);
    assert_eq!(winner.duel_record.wins, 1);
    assert_eq!(loser.duel_record.losses, 1);
    assert_eq!(winner.clout, 15);
    assert_eq!(loser.clout, 0);
    assert_eq!(world.duel_history().count(), 1);
    assert_eq!(world.ledger().circulating(), 200);
    assert_balanced(&world);
}

#[test]
fn duel_needs_both_sides_to_cover_the_wager() {
    let mut world = World::new(quiet_config()).unwrap();
    let amy = register(&mut world, "Amy", Personality::ChaosGremlin);
    let bo = register(&mut world, "Bo", Personality::Nerd);

    let err = world
        .execute(Command::ChallengeDuel {
            agent: amy,
            target: bo,
            wager: 500,
        })
        .unwrap_err();
    assert_eq!(err.code(), "precondition_failed");
    assert_eq!(world.agent(amy).unwrap().func, 100);
    assert_eq!(world.duel_history().count(), 0);
}

// ---------------------------------------------------------------------------
// Parties and the kitchen
// ---------------------------------------------------------------------------

#[test]
fn party_burns_the_fee_and_rewards_guests() {
    let mut world = World::new(quiet_config()).unwrap();
    let host = register(&mut world, "Host", Personality::SocialButterfly);
    let guest = register(&mut world, "Guest", Personality::Nerd);
    world
        .execute(Command::Move {
            agent: guest,
            to: Location::Rooftop,
        })
        .unwrap();

    let outcome = world
        .execute(Command::ThrowParty {
            agent: host,
            vibes: vec![Vibe::Chill, Vibe::Dance],
            location: None,
        })
        .unwrap();
    let CommandOutcome::PartyThrown(record) = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(record.location, Location::Rooftop);
    assert_eq!(record.attendees, vec![guest]);
    assert_eq!(world.agent(host).unwrap().func, 80);
    assert_eq!(world.agent(host).unwrap().party_count, 1);
    assert!(world.agent(guest).unwrap().clout > 0);
    assert_eq!(world.ledger().totals().burned, 20);
    assert_balanced(&world);
}

#[test]
fn cooking_happens_in_the_kitchen() {
    let mut world = World::new(quiet_config()).unwrap();
    let chef = register(&mut world, "Chef", Personality::Nerd);

    let err = world
        .execute(Command::Cook {
            agent: chef,
            ingredient: "hot dog".to_owned(),
        })
        .unwrap_err();
    assert_eq!(err.code(), "precondition_failed");

    world
        .execute(Command::Move {
            agent: chef,
            to: Location::Kitchen,
        })
        .unwrap();
    let outcome = world
        .execute(Command::Cook {
            agent: chef,
            ingredient: "Hot Dog".to_owned(),
        })
        .unwrap();
    let CommandOutcome::Cooked(cooked) = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert!(cooked.dish.contains("hot_dog") || cooked.dish == "mystery_substance");
    assert_eq!(cooked.fed, 0);
    assert!(world.agent(chef).unwrap().inventory.contains(&cooked.dish));
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

#[test]
fn selling_out_doubles_the_price() {
    let mut world = World::new(quiet_config()).unwrap();
    let amy = register(&mut world, "Amy", Personality::Schemer);

    let mut last = None;
    while world.market().listing("fortune_cookie").unwrap().supply > 0 {
        let outcome = world
            .execute(Command::Buy {
                agent: amy,
                item: "fortune_cookie".to_owned(),
            })
            .unwrap();
        let CommandOutcome::Bought(purchase) = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        last = Some(purchase);
    }

    let last = last.unwrap();
    assert_eq!(last.supply, 0);
    assert_eq!(last.new_price, last.paid.saturating_mul(2));
    let sold_out = world
        .execute(Command::Buy {
            agent: amy,
            item: "fortune_cookie".to_owned(),
        })
        .unwrap_err();
    assert_eq!(sold_out.code(), "precondition_failed");

    let unknown = world
        .execute(Command::Buy {
            agent: amy,
            item: "jetpack".to_owned(),
        })
        .unwrap_err();
    assert_eq!(unknown.code(), "not_found");
    assert_balanced(&world);
}

#[test]
fn trade_swaps_assets() {
    let mut world = World::new(quiet_config()).unwrap();
    let seller = register(&mut world, "Seller", Personality::Schemer);
    let buyer = register(&mut world, "Buyer", Personality::Nerd);
    world
        .execute(Command::Buy {
            agent: seller,
            item: "tinfoil_hat".to_owned(),
        })
        .unwrap();
    let seller_func = world.agent(seller).unwrap().func;

    let outcome = world
        .execute(Command::CreateTrade {
            agent: seller,
            offering: TradeAsset::Item("tinfoil_hat".to_owned()),
            asking: TradeAsset::Func(12),
        })
        .unwrap();
    let CommandOutcome::TradeCreated { trade } = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(world.open_trades().count(), 1);

    let own = world
        .execute(Command::AcceptTrade {
            agent: seller,
            trade,
        })
        .unwrap_err();
    assert_eq!(own.code(), "invalid_input");

    world
        .execute(Command::AcceptTrade {
            agent: buyer,
            trade,
        })
        .unwrap();
    assert_eq!(world.open_trades().count(), 0);
    assert_eq!(world.agent(seller).unwrap().func, seller_func.saturating_add(12));
    assert_eq!(world.agent(buyer).unwrap().func, 88);
    assert!(world.agent(buyer).unwrap().inventory.contains(&"tinfoil_hat".to_owned()));
    assert_eq!(world.agent(seller).unwrap().trade_count, 1);
    assert_balanced(&world);
}

// ---------------------------------------------------------------------------
// Politics
// ---------------------------------------------------------------------------

#[test]
fn proposal_resolves_once_quorum_is_met() {
    let mut world = World::new(quiet_config()).unwrap();
    let amy = register(&mut world, "Amy", Personality::Nerd);
    let bo = register(&mut world, "Bo", Personality::Schemer);
    let cy = register(&mut world, "Cy", Personality::DramaQueen);

    let proposal = propose(&mut world, amy, "Quiet hours after ten");
    vote(&mut world, amy, proposal, "yes").unwrap();
    vote(&mut world, bo, proposal, "YES").unwrap();
    let twice = vote(&mut world, bo, proposal, "no").unwrap_err();
    assert_eq!(twice.code(), "invalid_state");

    world.execute(Command::AdvanceTick).unwrap();
    assert_eq!(world.proposal(proposal).unwrap().status, ProposalStatus::Open);

    vote(&mut world, cy, proposal, "no").unwrap();
    let outcome = world.execute(Command::AdvanceTick).unwrap();
    let CommandOutcome::Ticked(summary) = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(summary.resolved, vec![(proposal, ProposalStatus::Passed)]);

    let resolved = world.proposal(proposal).unwrap();
    assert_eq!(resolved.result.as_deref(), Some("yes"));
    assert_eq!(world.agent(bo).unwrap().votes_cast, 1);

    let late = vote(&mut world, cy, proposal, "yes").unwrap_err();
    assert_eq!(late.code(), "invalid_state");
}

// ---------------------------------------------------------------------------
// Quests
// ---------------------------------------------------------------------------

#[test]
fn quest_pays_out_on_its_last_step() {
    let mut world = World::new(quiet_config()).unwrap();
    let amy = register(&mut world, "Amy", Personality::ConspiracyTheorist);
    let quest = world
        .quests()
        .find(|quest| quest.template == "basement_mystery")
        .map(|quest| quest.id)
        .unwrap();

    world.execute(Command::AcceptQuest { agent: amy, quest }).unwrap();
    assert_eq!(world.agent(amy).unwrap().active_quests, vec![quest]);

    let skipped = world
        .execute(Command::AdvanceQuest {
            agent: amy,
            quest,
            action: "talk".to_owned(),
        })
        .unwrap();
    assert!(matches!(
        skipped,
        CommandOutcome::QuestAdvanced {
            outcome: monad_agents::StepOutcome::NoMatch,
            ..
        }
    ));

    for action in ["visit_basement", "explore", "talk"] {
        world
            .execute(Command::AdvanceQuest {
                agent: amy,
                quest,
                action: action.to_owned(),
            })
            .unwrap();
    }

    let done = world.quest(quest).unwrap();
    assert_eq!(done.status, QuestStatus::Completed);
    let agent = world.agent(amy).unwrap();
    assert_eq!(agent.func, 130);
    assert!(agent.completed_quests.contains(&quest));
    assert!(agent.active_quests.is_empty());
    assert!(world.events().iter().any(|event| event.kind == EventKind::QuestCompleted));
    assert_balanced(&world);
}

#[test]
fn abandoned_quest_is_marked_failed() {
    let mut world = World::new(quiet_config()).unwrap();
    let amy = register(&mut world, "Amy", Personality::Nerd);
    let quest = world.quests().next().map(|quest| quest.id).unwrap();

    world.execute(Command::AcceptQuest { agent: amy, quest }).unwrap();
    world.execute(Command::AbandonQuest { agent: amy, quest }).unwrap();
    assert!(world.agent(amy).unwrap().active_quests.is_empty());
    assert_eq!(world.quest(quest).unwrap().status, QuestStatus::Failed);

    let again = world.execute(Command::AbandonQuest { agent: amy, quest }).unwrap_err();
    assert_eq!(again.code(), "invalid_state");
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[test]
fn snapshot_round_trips_through_json() {
    let mut world = World::new(quiet_config()).unwrap();
    let amy = register(&mut world, "Amy", Personality::DramaQueen);
    let bo = register(&mut world, "Bo", Personality::Schemer);
    let chain = start_rumor(&mut world, amy, "the elevator is haunted");
    world
        .execute(Command::SpreadRumor {
            agent: amy,
            chain,
            target: bo,
        })
        .unwrap();
    let proposal = propose(&mut world, bo, "Paint the lobby purple");
    vote(&mut world, amy, proposal, "yes").unwrap();
    world
        .execute(Command::PostToBoard {
            agent: bo,
            message: "who keeps stealing my yogurt".to_owned(),
        })
        .unwrap();
    world.execute(Command::AdvanceTick).unwrap();

    let snapshot = world.export_snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: WorldSnapshot = serde_json::from_str(&json).unwrap();
    let restored = World::from_snapshot(quiet_config(), parsed, 7).unwrap();

    assert_eq!(restored.tick(), world.tick());
    assert_eq!(
        restored.agents().cloned().collect::<Vec<_>>(),
        world.agents().cloned().collect::<Vec<_>>()
    );
    assert_eq!(restored.chain(chain), world.chain(chain));
    assert_eq!(restored.ledger().totals(), world.ledger().totals());
    assert_eq!(restored.proposal(proposal).unwrap().votes.len(), 1);
    assert_eq!(restored.board().count(), 1);
    assert_eq!(restored.quests().count(), world.quests().count());
    assert!(restored.events().is_empty());
    assert_balanced(&restored);
}

#[test]
fn restored_world_keeps_running() {
    let mut world = World::new(quiet_config()).unwrap();
    let amy = register(&mut world, "Amy", Personality::Nerd);
    world.execute(Command::AdvanceTick).unwrap();

    let mut restored = World::from_snapshot(quiet_config(), world.export_snapshot(), 1).unwrap();
    restored.execute(Command::AdvanceTick).unwrap();
    assert_eq!(restored.tick(), 2);

    let bo = register(&mut restored, "Bo", Personality::Schemer);
    restored
        .execute(Command::Talk {
            agent: bo,
            target: Some(amy),
            message: "welcome back".to_owned(),
        })
        .unwrap();
    assert_balanced(&restored);
}
