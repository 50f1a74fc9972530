//! Command handlers.
//!
//! Each handler checks everything that can refuse the command before it
//! changes anything. Rewards paid after the checks never fail the command;
//! a payout the ledger cannot make is logged and skipped.

use tracing::{debug, info, warn};

use monad_agents::agent::MAX_NAME_LEN;
use monad_agents::combat::{self, LOSER_CLOUT, WINNER_CLOUT};
use monad_agents::party::{is_epic, is_great, validate};
use monad_agents::politics::BETRAYAL_PENALTY;
use monad_agents::rumor::MAX_RUMOR_LEN;
use monad_agents::social::{
    DUEL_PENALTY, GOSSIP_LISTENER, GOSSIP_TELLER, PARTY_GUEST_TO_HOST, PARTY_HOST_TO_GUEST,
    TALK_ROOM, TALK_TARGETED,
};
use monad_agents::{Dice, Discovery, StepOutcome, bond, compose, create_agent, explore, shift_mood, valid_name, visit_tag};
use monad_ledger::{CloutReward, FuncCost, FuncReward, Ledger};
use monad_types::{
    Achievement, Agent, AgentId, BoardPost, ChainId, EventKind, Faction, Location, LocationKind,
    LogEvent, Mood, PartyId, PartyRecord, Personality, PostId, ProposalId, ProposalKind, QuestId,
    Stat, TradeAsset, TradeId, Vibe,
};

use crate::command::{
    Command, CommandError, CommandOutcome, CookOutcome, MoveOutcome, PrankOutcome, SpreadOutcome,
};
use crate::world::{World, agent_mut, agent_ref, found_artifact, others_at, pair, unlock};

/// Longest talk message or board post kept; longer text is cut.
pub const MAX_MESSAGE_LEN: usize = MAX_RUMOR_LEN;

/// Where a party goes when no venue is named.
pub const DEFAULT_PARTY_VENUE: Location = Location::Rooftop;

/// Branch labels on the second floor.
const FORK_PATHS: [&str; 3] = ["left", "right", "middle"];

/// Chance that a trip into the basement comes out somewhere else.
const BASEMENT_DIVERGENCE: f64 = 0.15;

/// Where a diverging basement trip can come out.
const BASEMENT_EXITS: [Location; 3] = [Location::Lobby, Location::Floor1Hall, Location::Courtyard];

/// Dishes a chaotic cook turns out. `{}` is the ingredient.
const WILD_DISHES: [&str; 7] = [
    "flaming_{}",
    "sentient_{}",
    "inverse_{}",
    "quantum_{}",
    "{}_that_screams",
    "mystery_substance",
    "weaponized_{}",
];

/// Dishes an ordinary cook turns out.
const PLAIN_DISHES: [&str; 4] = ["grilled_{}", "{}_stew", "{}_on_toast", "lukewarm_{}"];

/// What can go wrong in the kitchen when purity is low.
const KITCHEN_MISHAPS: [&str; 5] = [
    "set off the smoke alarm",
    "the pan achieved sentience",
    "something is growing in the sink",
    "the microwave is making a new sound",
    "the fridge door will not close anymore",
];

/// Pranks on offer.
const PRANKS: [&str; 6] = [
    "filled their mailbox with confetti",
    "replaced their doormat with a whoopee cushion",
    "taped a fake eviction notice to their door",
    "rearranged their furniture by one inch",
    "set every clock in their flat five minutes fast",
    "hid a ringing phone in their ceiling tile",
];

/// Affinity changes from a prank that lands.
const PRANK_PRANKSTER_DELTA: i32 = -8;
const PRANK_VICTIM_DELTA: i32 = -12;

/// The prankster's view of a victim who saw it coming.
const PRANK_BACKFIRE_DELTA: i32 = -3;

/// Consecutive duel wins for the streak achievement.
const DUEL_STREAK: u32 = 5;

/// Elevator level of a location: basement lowest, rooftop highest.
pub const fn floor_level(location: Location) -> u8 {
    match location {
        Location::Basement => 0,
        Location::Lobby
        | Location::Kitchen
        | Location::Lounge
        | Location::Gym
        | Location::Courtyard => 1,
        Location::Floor1Hall | Location::Floor1Apt => 2,
        Location::Floor2Hall | Location::Floor2Apt => 3,
        Location::Floor3Hall | Location::Floor3Apt => 4,
        Location::Rooftop => 5,
    }
}

/// Lowercase an ingredient and join its words with underscores.
fn normalize_ingredient(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Trim and cut a message, refusing empty ones.
fn clean_message(field: &str, raw: &str) -> Result<String, CommandError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CommandError::input(field, "cannot be empty"));
    }
    Ok(trimmed.chars().take(MAX_MESSAGE_LEN).collect())
}

impl World {
    /// Apply one command.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] when the command is refused; the world is
    /// left as it was.
    pub fn execute(&mut self, command: Command) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let name = command.name();
        let result = self.dispatch(command);
        match &result {
            Ok(_) => debug!(tick, command = name, "command applied"),
            Err(err) => debug!(tick, command = name, code = err.code(), error = %err, "command refused"),
        }
        self.trim_events();
        result
    }

    fn dispatch(&mut self, command: Command) -> Result<CommandOutcome, CommandError> {
        match command {
            Command::RegisterAgent { name, personality } => self.register_agent(&name, personality),
            Command::Move { agent, to } => self.move_agent(agent, to).map(CommandOutcome::Moved),
            Command::Talk { agent, target, message } => self.talk(agent, target, &message),
            Command::StartRumor { agent, text } => self.start_rumor(agent, &text),
            Command::SpreadRumor { agent, chain, target } => self
                .spread_rumor(agent, chain, target)
                .map(CommandOutcome::RumorSpread),
            Command::ThrowParty { agent, vibes, location } => self.throw_party(agent, vibes, location),
            Command::Cook { agent, ingredient } => self.cook(agent, &ingredient).map(CommandOutcome::Cooked),
            Command::Prank { agent, target } => self.prank(agent, target).map(CommandOutcome::Pranked),
            Command::PostToBoard { agent, message } => self.post_to_board(agent, &message),
            Command::ChallengeDuel { agent, target, wager } => self.challenge_duel(agent, target, wager),
            Command::JoinFaction { agent, faction } => self.join_faction(agent, faction),
            Command::CreateProposal {
                agent,
                title,
                description,
                kind,
                options,
            } => self.create_proposal(agent, &title, &description, kind, options),
            Command::CastVote { agent, proposal, choice } => self.cast_vote(agent, proposal, &choice),
            Command::FormAlliance { agent, with } => self.form_alliance(agent, with),
            Command::BreakAlliance { agent, with } => self.break_alliance(agent, with),
            Command::CreateTrade { agent, offering, asking } => self.create_trade(agent, offering, asking),
            Command::AcceptTrade { agent, trade } => self.accept_trade(agent, trade),
            Command::CancelTrade { agent, trade } => self.cancel_trade(agent, trade),
            Command::Buy { agent, item } => self.buy(agent, &item),
            Command::Sell { agent, item } => self.sell(agent, &item),
            Command::Explore { agent } => self.explore_here(agent),
            Command::AcceptQuest { agent, quest } => self.accept_quest(agent, quest),
            Command::AdvanceQuest { agent, quest, action } => self.advance_quest(agent, quest, &action),
            Command::AbandonQuest { agent, quest } => self.abandon_quest(agent, quest),
            Command::AdvanceTick => Ok(CommandOutcome::Ticked(Box::new(self.advance_tick()?))),
        }
    }

    // -----------------------------------------------------------------------
    // Residents and movement
    // -----------------------------------------------------------------------

    fn register_agent(&mut self, name: &str, personality: Personality) -> Result<CommandOutcome, CommandError> {
        let name = name.trim();
        if !valid_name(name) {
            return Err(CommandError::input(
                format!("name={name}"),
                format!("names are 1-{MAX_NAME_LEN} characters"),
            ));
        }
        let tick = self.clock.tick();
        let mut agent = create_agent(name, personality, tick, &mut self.rng);
        let starting = self.config.world.starting_func;
        if starting > 0 {
            self.ledger
                .mint(&mut agent, starting, FuncReward::Registration.as_str(), tick)?;
        }

        let id = agent.id;
        info!(tick, agent = %id, name, personality = %personality, "agent registered");
        self.record(
            LogEvent::new(tick, EventKind::AgentRegistered)
                .with_agent("agent", id)
                .with("name", name)
                .with("personality", personality.as_str()),
        );
        self.roster.push(id);
        self.agents.insert(id, agent);
        Ok(CommandOutcome::Registered { agent: id })
    }

    /// Check a move against the standing decrees.
    fn check_route(&self, from: Location, to: Location) -> Result<(), CommandError> {
        if from == to {
            return Err(CommandError::state(format!("already at {to}")));
        }
        if to == Location::Kitchen && self.landlord.kitchen_closed() {
            return Err(CommandError::precondition("the kitchen is closed by decree"));
        }
        if to == Location::Basement && self.landlord.basement_locked() {
            return Err(CommandError::precondition("the basement is locked by decree"));
        }
        if self.landlord.elevator_parity() {
            let even = self.clock.tick().checked_rem(2) == Some(0);
            let up = floor_level(to) > floor_level(from);
            let down = floor_level(to) < floor_level(from);
            if (up && !even) || (down && even) {
                let way = if up { "up" } else { "down" };
                return Err(CommandError::precondition(format!(
                    "the elevator does not go {way} on this tick"
                )));
            }
        }
        Ok(())
    }

    /// Roll where a move really ends up.
    fn resolve_move(&mut self, to: Location) -> MoveOutcome {
        match to.kind() {
            LocationKind::Maybe => {
                let chance = self
                    .landlord
                    .floor3_nothing_chance()
                    .unwrap_or(self.config.landlord.floor3_nothing_chance);
                if self.rng.chance(chance) {
                    MoveOutcome::Nothing { attempted: to }
                } else {
                    MoveOutcome::Arrived { to }
                }
            }
            LocationKind::Either => {
                let open = self
                    .landlord
                    .floor2_paths()
                    .and_then(|paths| usize::try_from(paths).ok())
                    .unwrap_or(2)
                    .clamp(1, FORK_PATHS.len());
                let path = FORK_PATHS
                    .get(..open)
                    .and_then(|paths| self.rng.pick(paths))
                    .copied()
                    .unwrap_or("left");
                MoveOutcome::Forked {
                    to,
                    path: path.to_owned(),
                }
            }
            LocationKind::List => {
                let branches = u32::try_from(self.rng.between(2, 4)).unwrap_or(2);
                MoveOutcome::Branched { to, branches }
            }
            LocationKind::Bottom if self.rng.chance(BASEMENT_DIVERGENCE) => {
                let exit = self.rng.pick(&BASEMENT_EXITS).copied().unwrap_or(Location::Lobby);
                MoveOutcome::Diverged { to: exit }
            }
            _ => MoveOutcome::Arrived { to },
        }
    }

    fn move_agent(&mut self, agent_id: AgentId, to: Location) -> Result<MoveOutcome, CommandError> {
        let tick = self.clock.tick();
        let from = agent_ref(&self.agents, agent_id)?.location;
        self.check_route(from, to)?;

        let outcome = self.resolve_move(to);
        let agent = agent_mut(&mut self.agents, agent_id)?;
        if to == Location::Basement {
            Ledger::award_clout(agent, CloutReward::ExploreBasement);
        }
        let arrived = outcome.destination();
        if let Some(destination) = arrived {
            agent.location = destination;
        }

        debug!(tick, agent = %agent_id, %from, %to, "moved");
        self.record(
            LogEvent::new(tick, EventKind::Moved)
                .with_agent("agent", agent_id)
                .with("from", from.as_str())
                .with("to", to.as_str())
                .with("arrived", arrived.map_or("", Location::as_str))
                .with("outcome", outcome.label()),
        );
        if let Some(destination) = arrived {
            self.report(agent_id, visit_tag(destination));
        }
        Ok(outcome)
    }

    fn talk(&mut self, agent_id: AgentId, target: Option<AgentId>, message: &str) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let message = clean_message("message", message)?;

        let mut made_friend = false;
        let listeners = if let Some(target_id) = target {
            let (speaker, listener) = pair(&mut self.agents, agent_id, target_id)?;
            if speaker.location != listener.location {
                return Err(CommandError::precondition(format!("{} is not here", listener.name)));
            }
            let change = bond(speaker, listener, TALK_TARGETED, TALK_TARGETED, "talked", tick);
            if change.became_friends {
                Ledger::award_clout(speaker, CloutReward::MakeFriend);
                made_friend = true;
            }
            1
        } else {
            let location = agent_ref(&self.agents, agent_id)?.location;
            let room = others_at(&self.agents, location, agent_id);
            let speaker = agent_mut(&mut self.agents, agent_id)?;
            for other in &room {
                speaker.adjust_relationship(*other, TALK_ROOM, "talked to the room", tick);
            }
            room.len()
        };

        let mut event = LogEvent::new(tick, EventKind::Talked)
            .with_agent("agent", agent_id)
            .with("message", message)
            .with("listeners", listeners);
        if let Some(target_id) = target {
            event = event.with_agent("target", target_id);
        }
        self.record(event);
        self.report(agent_id, "talk");
        if made_friend {
            self.report(agent_id, "make_friend");
        }
        Ok(CommandOutcome::Talked { listeners })
    }

    // -----------------------------------------------------------------------
    // Rumors
    // -----------------------------------------------------------------------

    fn start_rumor(&mut self, agent_id: AgentId, text: &str) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        agent_ref(&self.agents, agent_id)?;
        if let Some(limit) = self.landlord.max_gossip_chains() {
            let cap = usize::try_from(limit).unwrap_or(usize::MAX);
            if self.rumors.active_count() >= cap {
                return Err(CommandError::precondition(format!(
                    "the Landlord allows only {limit} rumors at once"
                )));
            }
        }

        let agent = agent_mut(&mut self.agents, agent_id)?;
        let chain = self.rumors.start(agent, text, tick)?;
        let (chain_id, original) = (chain.id, chain.original.clone());
        Ledger::award_clout(agent, CloutReward::StartGossip);

        info!(tick, agent = %agent_id, chain = %chain_id, "rumor started");
        self.record(
            LogEvent::new(tick, EventKind::RumorStarted)
                .with_agent("agent", agent_id)
                .with("chain", chain_id.to_string())
                .with("text", original),
        );
        self.report(agent_id, "start_rumor");
        Ok(CommandOutcome::RumorStarted { chain: chain_id })
    }

    /// Pass `chain_id` from `agent_id` to `target_id`, who retells it.
    pub(crate) fn spread_rumor(
        &mut self,
        agent_id: AgentId,
        chain_id: ChainId,
        target_id: AgentId,
    ) -> Result<SpreadOutcome, CommandError> {
        let tick = self.clock.tick();
        let tuning = self.config.rumor.tuning();
        if self.rumors.get(chain_id).is_none() {
            return Err(CommandError::NotFound {
                kind: "chain",
                id: chain_id.to_string(),
            });
        }

        let (teller, listener) = pair(&mut self.agents, agent_id, target_id)?;
        if !teller.gossip_heard.contains(&chain_id) {
            return Err(CommandError::precondition(format!(
                "{} has not heard this rumor",
                teller.name
            )));
        }
        let chain = self.rumors.propagate(chain_id, listener, tick, &tuning, &mut self.rng)?;
        let outcome = SpreadOutcome {
            chain: chain_id,
            text: chain.current_text().to_owned(),
            links: chain.links.len(),
            credibility: chain.credibility,
            spiciness: chain.spiciness,
        };
        let originator = chain.originator;
        bond(teller, listener, GOSSIP_TELLER, GOSSIP_LISTENER, "shared gossip", tick);

        if let Some(origin) = self.agents.get_mut(&originator) {
            if outcome.links >= 5 {
                Ledger::award_clout(origin, CloutReward::GossipChain5);
                unlock(origin, Achievement::GossipChain5, tick, &mut self.events);
            } else if outcome.links >= 3 {
                Ledger::award_clout(origin, CloutReward::GossipChain3);
            }
            if outcome.links >= 10 {
                unlock(origin, Achievement::GossipChain10, tick, &mut self.events);
            }
        }

        self.record(
            LogEvent::new(tick, EventKind::RumorSpread)
                .with_agent("agent", agent_id)
                .with_agent("target", target_id)
                .with("chain", chain_id.to_string())
                .with("text", outcome.text.clone())
                .with("links", outcome.links)
                .with("credibility", outcome.credibility)
                .with("spiciness", outcome.spiciness),
        );
        self.report(agent_id, "spread_rumor");
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Parties, cooking, pranks, the board
    // -----------------------------------------------------------------------

    fn check_venue(&self, location: Location) -> Result<(), CommandError> {
        if location == Location::Kitchen && self.landlord.kitchen_closed() {
            return Err(CommandError::precondition("the kitchen is closed by decree"));
        }
        if location == Location::Basement && self.landlord.basement_locked() {
            return Err(CommandError::precondition("the basement is locked by decree"));
        }
        if let Some(limit) = self.landlord.party_limit() {
            let tonight = self.parties_at(self.clock.tick());
            if tonight >= usize::try_from(limit).unwrap_or(usize::MAX) {
                return Err(CommandError::precondition(format!(
                    "the Landlord allows only {limit} parties per tick"
                )));
            }
        }
        Ok(())
    }

    fn throw_party(
        &mut self,
        agent_id: AgentId,
        vibes: Vec<Vibe>,
        location: Option<Location>,
    ) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        validate(&vibes)?;
        let location = location.unwrap_or(DEFAULT_PARTY_VENUE);
        agent_ref(&self.agents, agent_id)?;
        self.check_venue(location)?;

        let host = agent_mut(&mut self.agents, agent_id)?;
        let cost = FuncCost::ThrowParty;
        self.ledger.spend(host, cost.amount(), cost.as_str(), tick)?;

        let guests = others_at(&self.agents, location, agent_id);
        let composition = {
            let attendees: Vec<&Agent> = guests.iter().filter_map(|id| self.agents.get(id)).collect();
            compose(&vibes, &attendees, &mut self.rng)
        };
        let state = composition.state;

        let host = agent_mut(&mut self.agents, agent_id)?;
        Ledger::award_clout(host, CloutReward::ThrowParty);
        host.party_count = host.party_count.saturating_add(1);
        if is_great(&state) {
            Ledger::award_clout(host, CloutReward::GreatParty);
            unlock(host, Achievement::GreatParty, tick, &mut self.events);
        }
        if is_epic(&state) {
            unlock(host, Achievement::EpicParty, tick, &mut self.events);
        }

        let mut new_friends = 0_usize;
        for guest in &guests {
            if let Some((host, attendee)) = monad_agents::pair_mut(&mut self.agents, agent_id, *guest) {
                Ledger::award_clout(attendee, CloutReward::PartyAttendance);
                let change = bond(host, attendee, PARTY_HOST_TO_GUEST, PARTY_GUEST_TO_HOST, "partied", tick);
                if change.became_friends {
                    Ledger::award_clout(host, CloutReward::MakeFriend);
                    new_friends = new_friends.saturating_add(1);
                }
            }
        }

        let record = PartyRecord {
            id: PartyId::new(),
            host: agent_id,
            location,
            vibes,
            vibes_applied: composition.applied,
            attendees: guests,
            outcome: state,
            tick,
        };
        let chain = record
            .vibes
            .iter()
            .copied()
            .map(Vibe::as_str)
            .collect::<Vec<_>>()
            .join(" >=> ");
        info!(tick, host = %agent_id, %location, vibes = %chain, "party thrown");
        self.record(
            LogEvent::new(tick, EventKind::PartyThrown)
                .with_agent("host", agent_id)
                .with("location", location.as_str())
                .with("vibes", chain)
                .with("applied", record.vibes_applied)
                .with("attendees", record.attendees.len())
                .with("energy", record.outcome.energy)
                .with("volatility", record.outcome.volatility)
                .with("bonding", record.outcome.bonding)
                .with("enjoyment", record.outcome.enjoyment),
        );
        self.parties.push_back(record.clone());
        while self.parties.len() > self.config.limits.party_history {
            self.parties.pop_front();
        }

        self.report(agent_id, "throw_party");
        for _ in 0..new_friends {
            self.report(agent_id, "make_friend");
        }
        Ok(CommandOutcome::PartyThrown(Box::new(record)))
    }

    /// Pick the dish a cook turns out.
    fn plate(&mut self, purity: u32, chaos: u32, ingredient: &str) -> (String, &'static str) {
        if purity >= 7 {
            return (format!("perfectly_cooked_{ingredient}"), "perfect");
        }
        let (menu, style): (&[&str], _) = if chaos >= 7 {
            (&WILD_DISHES, "wild")
        } else {
            (&PLAIN_DISHES, "normal")
        };
        let template = self.rng.pick(menu).copied().unwrap_or("{}");
        (template.replace("{}", ingredient), style)
    }

    fn cook(&mut self, agent_id: AgentId, ingredient: &str) -> Result<CookOutcome, CommandError> {
        let tick = self.clock.tick();
        let ingredient = normalize_ingredient(ingredient);
        if ingredient.is_empty() {
            return Err(CommandError::input("ingredient", "cannot be empty"));
        }
        let cook = agent_ref(&self.agents, agent_id)?;
        let (purity, chaos) = (cook.stat(Stat::Purity), cook.stat(Stat::Chaos));
        if cook.location != Location::Kitchen {
            return Err(CommandError::precondition("cooking happens in the kitchen"));
        }
        if self.landlord.kitchen_closed() {
            return Err(CommandError::precondition("the kitchen is closed by decree"));
        }

        let (dish, style) = self.plate(purity, chaos, &ingredient);
        let side_effect = if purity < 4 && self.rng.chance(0.5) {
            self.rng.pick(&KITCHEN_MISHAPS).copied()
        } else {
            None
        };
        let fed = others_at(&self.agents, Location::Kitchen, agent_id).len();

        let cook = agent_mut(&mut self.agents, agent_id)?;
        if fed > 0 {
            let reward = FuncReward::CookForOthers;
            if let Err(err) = self.ledger.mint(cook, reward.amount(), reward.as_str(), tick) {
                warn!(tick, agent = %agent_id, error = %err, "cooking FUNC not paid");
            }
            Ledger::award_clout(cook, CloutReward::CookForOthers);
        }
        cook.inventory.push(dish.clone());

        self.record(
            LogEvent::new(tick, EventKind::Cooked)
                .with_agent("agent", agent_id)
                .with("dish", dish.clone())
                .with("style", style)
                .with("side_effect", side_effect.unwrap_or(""))
                .with("fed", fed),
        );
        self.report(agent_id, "cook");
        Ok(CookOutcome {
            dish,
            style,
            side_effect,
            fed,
        })
    }

    fn prank(&mut self, agent_id: AgentId, target_id: AgentId) -> Result<PrankOutcome, CommandError> {
        let tick = self.clock.tick();
        if self.landlord.drama_cooldown() {
            agent_ref(&self.agents, agent_id)?;
            return Err(CommandError::precondition("pranks are off during the drama cooldown"));
        }
        let (prankster, victim) = pair(&mut self.agents, agent_id, target_id)?;

        let bonus = self.rng.between(0, 30);
        let odds = f64::from(prankster.stat(Stat::Creativity)).mul_add(10.0, f64::from(bonus)) / 100.0;
        let success = self.rng.chance(odds);
        let prank = self.rng.pick(&PRANKS).copied().unwrap_or("pulled a prank");

        let clout = if success {
            let change = bond(prankster, victim, PRANK_PRANKSTER_DELTA, PRANK_VICTIM_DELTA, prank, tick);
            if change.became_rivals {
                Ledger::award_clout(prankster, CloutReward::MakeRival);
            }
            shift_mood(victim, Mood::Dramatic, 0.6, &mut self.rng);
            Ledger::award_clout(prankster, CloutReward::PrankSuccess)
        } else {
            prankster.adjust_relationship(victim.id, PRANK_BACKFIRE_DELTA, "prank backfired", tick);
            shift_mood(prankster, Mood::Anxious, 0.4, &mut self.rng);
            Ledger::award_clout(prankster, CloutReward::PrankBackfire)
        };

        self.record(
            LogEvent::new(tick, EventKind::Pranked)
                .with_agent("agent", agent_id)
                .with_agent("target", target_id)
                .with("prank", prank)
                .with("success", success),
        );
        if success {
            self.report(agent_id, "prank");
        }
        Ok(PrankOutcome { success, prank, clout })
    }

    fn post_to_board(&mut self, agent_id: AgentId, message: &str) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let message = clean_message("message", message)?;
        let author = agent_ref(&self.agents, agent_id)?;
        let post = BoardPost {
            id: PostId::new(),
            author: agent_id,
            author_name: author.name.clone(),
            message,
            tick,
        };
        let id = post.id;
        self.record(
            LogEvent::new(tick, EventKind::BoardPost)
                .with_agent("agent", agent_id)
                .with("post", id.to_string())
                .with("message", post.message.clone()),
        );
        self.board.push_back(post);
        while self.board.len() > self.config.limits.board_posts {
            self.board.pop_front();
        }
        Ok(CommandOutcome::Posted { post: id })
    }

    // -----------------------------------------------------------------------
    // Duels
    // -----------------------------------------------------------------------

    fn challenge_duel(&mut self, agent_id: AgentId, target_id: AgentId, wager: u64) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        if agent_id == target_id {
            return Err(CommandError::input(target_id.to_string(), "an agent cannot duel themselves"));
        }
        let challenger = agent_ref(&self.agents, agent_id)?;
        let defender = agent_ref(&self.agents, target_id)?;
        if challenger.location != defender.location {
            return Err(CommandError::precondition(format!("{} is not here", defender.name)));
        }
        for side in [challenger, defender] {
            if side.func < wager {
                return Err(CommandError::precondition(format!(
                    "{} cannot cover a wager of {wager} FUNC",
                    side.name
                )));
            }
        }

        let location = challenger.location;
        let nearby = others_at(&self.agents, location, agent_id)
            .into_iter()
            .filter(|id| *id != target_id)
            .count();
        let record = combat::resolve(challenger, defender, tick, wager, nearby, &mut self.rng);

        let (winner, loser) = pair(&mut self.agents, record.winner, record.loser)?;
        if wager > 0 {
            self.ledger.transfer(loser, winner, wager, "duel_wager", tick)?;
        }
        Ledger::add_clout(winner, WINNER_CLOUT);
        Ledger::penalize_clout(loser, LOSER_CLOUT);
        winner.duel_record.wins = winner.duel_record.wins.saturating_add(1);
        winner.duel_record.streak = winner.duel_record.streak.saturating_add(1);
        loser.duel_record.losses = loser.duel_record.losses.saturating_add(1);
        loser.duel_record.streak = 0;
        unlock(winner, Achievement::DuelWin, tick, &mut self.events);
        if winner.duel_record.streak >= DUEL_STREAK {
            unlock(winner, Achievement::DuelWinStreak5, tick, &mut self.events);
        }
        if bond(winner, loser, DUEL_PENALTY, DUEL_PENALTY, "dueled", tick).became_rivals {
            Ledger::award_clout(winner, CloutReward::MakeRival);
        }

        info!(tick, winner = %record.winner, loser = %record.loser, wager, "duel resolved");
        self.record(
            LogEvent::new(tick, EventKind::DuelResolved)
                .with_agent("challenger", agent_id)
                .with_agent("defender", target_id)
                .with_agent("winner", record.winner)
                .with_agent("loser", record.loser)
                .with("wager", wager)
                .with("rounds", record.rounds.len())
                .with("challenger_score", record.challenger_score)
                .with("defender_score", record.defender_score),
        );
        self.duels.push_back(record.clone());
        while self.duels.len() > self.config.limits.duel_history {
            self.duels.pop_front();
        }
        self.report(record.winner, "duel_win");
        Ok(CommandOutcome::Dueled(Box::new(record)))
    }

    // -----------------------------------------------------------------------
    // Politics
    // -----------------------------------------------------------------------

    fn join_faction(&mut self, agent_id: AgentId, faction: Faction) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let agent = agent_mut(&mut self.agents, agent_id)?;
        let outcome = self.politics.join_faction(agent, faction)?;
        if outcome.became_leader {
            unlock(agent, Achievement::FactionLeader, tick, &mut self.events);
        }
        self.record(
            LogEvent::new(tick, EventKind::FactionJoined)
                .with_agent("agent", agent_id)
                .with("faction", faction.as_str())
                .with("previous", outcome.previous.map_or("", Faction::as_str))
                .with("leader", outcome.became_leader)
                .with("members", outcome.members),
        );
        Ok(CommandOutcome::JoinedFaction(outcome))
    }

    fn create_proposal(
        &mut self,
        agent_id: AgentId,
        title: &str,
        description: &str,
        kind: ProposalKind,
        options: Vec<String>,
    ) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let proposer = agent_ref(&self.agents, agent_id)?;
        let proposal = self
            .politics
            .create_proposal(proposer, title, description, kind, options, tick)?;
        let (id, title) = (proposal.id, proposal.title.clone());
        self.record(
            LogEvent::new(tick, EventKind::ProposalCreated)
                .with_agent("agent", agent_id)
                .with("proposal", id.to_string())
                .with("title", title)
                .with("kind", kind.as_str()),
        );
        self.report(agent_id, "create_proposal");
        Ok(CommandOutcome::ProposalCreated { proposal: id })
    }

    fn cast_vote(&mut self, agent_id: AgentId, proposal_id: ProposalId, choice: &str) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let voter = agent_ref(&self.agents, agent_id)?;
        let proposal = self.politics.cast_vote(proposal_id, voter, choice)?;
        let votes = proposal.votes.len();
        let recorded = proposal.vote_of(agent_id).unwrap_or(choice).to_owned();

        let voter = agent_mut(&mut self.agents, agent_id)?;
        voter.votes_cast = voter.votes_cast.saturating_add(1);
        self.record(
            LogEvent::new(tick, EventKind::VoteCast)
                .with_agent("agent", agent_id)
                .with("proposal", proposal_id.to_string())
                .with("choice", recorded)
                .with("votes", votes),
        );
        Ok(CommandOutcome::VoteCast {
            proposal: proposal_id,
            votes,
        })
    }

    fn form_alliance(&mut self, agent_id: AgentId, with: Faction) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let leader = agent_ref(&self.agents, agent_id)?;
        let alliance = self.politics.form_alliance(leader, with, tick)?.clone();
        self.record(
            LogEvent::new(tick, EventKind::AllianceFormed)
                .with_agent("agent", agent_id)
                .with("faction", alliance.a.as_str())
                .with("with", alliance.b.as_str()),
        );
        Ok(CommandOutcome::AllianceFormed(alliance))
    }

    fn break_alliance(&mut self, agent_id: AgentId, with: Faction) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let leader = agent_ref(&self.agents, agent_id)?;
        let own = leader.faction;
        let alliance = self.politics.break_alliance(leader, with, tick)?;

        let betrayers = own.map(|faction| self.politics.members(faction).to_vec()).unwrap_or_default();
        let betrayed = self.politics.members(with).to_vec();
        for id in &betrayers {
            if let Some(member) = self.agents.get_mut(id) {
                for other in &betrayed {
                    member.adjust_relationship(*other, BETRAYAL_PENALTY, "betrayed an alliance", tick);
                }
            }
        }

        self.record(
            LogEvent::new(tick, EventKind::AllianceBroken)
                .with_agent("agent", agent_id)
                .with("faction", own.map_or("", Faction::as_str))
                .with("with", with.as_str())
                .with("betrayers", betrayers.len()),
        );
        Ok(CommandOutcome::AllianceBroken(alliance))
    }

    // -----------------------------------------------------------------------
    // Market
    // -----------------------------------------------------------------------

    fn create_trade(&mut self, agent_id: AgentId, offering: TradeAsset, asking: TradeAsset) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let seller = agent_ref(&self.agents, agent_id)?;
        let trade = self.market.create_offer(seller, offering, asking, tick)?.id;
        self.record(
            LogEvent::new(tick, EventKind::TradeCreated)
                .with_agent("agent", agent_id)
                .with("trade", trade.to_string()),
        );
        Ok(CommandOutcome::TradeCreated { trade })
    }

    fn accept_trade(&mut self, agent_id: AgentId, trade_id: TradeId) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        agent_ref(&self.agents, agent_id)?;
        let seller_id = self
            .market
            .offer(trade_id)
            .map(|offer| offer.seller)
            .ok_or_else(|| CommandError::NotFound {
                kind: "trade",
                id: trade_id.to_string(),
            })?;
        let (seller, buyer) = pair(&mut self.agents, seller_id, agent_id)?;
        let receipt = self
            .market
            .accept_offer(trade_id, seller, buyer, &mut self.ledger, tick)?;
        if receipt.seller_profit {
            unlock(seller, Achievement::TradeProfit, tick, &mut self.events);
        }

        self.record(
            LogEvent::new(tick, EventKind::TradeAccepted)
                .with_agent("agent", agent_id)
                .with_agent("seller", seller_id)
                .with("trade", trade_id.to_string())
                .with("seller_profit", receipt.seller_profit),
        );
        Ok(CommandOutcome::TradeAccepted {
            offer: receipt.offer,
            seller_profit: receipt.seller_profit,
        })
    }

    fn cancel_trade(&mut self, agent_id: AgentId, trade_id: TradeId) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        agent_ref(&self.agents, agent_id)?;
        let offer = self.market.cancel_offer(trade_id, agent_id, tick)?;
        self.record(
            LogEvent::new(tick, EventKind::TradeCancelled)
                .with_agent("agent", agent_id)
                .with("trade", trade_id.to_string()),
        );
        Ok(CommandOutcome::TradeCancelled(offer))
    }

    fn buy(&mut self, agent_id: AgentId, item: &str) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let agent = agent_mut(&mut self.agents, agent_id)?;
        let purchase = self.market.buy(item, agent, &mut self.ledger, tick)?;
        self.record(
            LogEvent::new(tick, EventKind::ItemBought)
                .with_agent("agent", agent_id)
                .with("item", purchase.item.clone())
                .with("paid", purchase.paid)
                .with("new_price", purchase.new_price),
        );
        Ok(CommandOutcome::Bought(purchase))
    }

    fn sell(&mut self, agent_id: AgentId, item: &str) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let agent = agent_mut(&mut self.agents, agent_id)?;
        let sale = self.market.sell(item, agent, &mut self.ledger, tick)?;
        self.record(
            LogEvent::new(tick, EventKind::ItemSold)
                .with_agent("agent", agent_id)
                .with("item", sale.item.clone())
                .with("proceeds", sale.proceeds),
        );
        Ok(CommandOutcome::Sold(sale))
    }

    // -----------------------------------------------------------------------
    // Exploration and quests
    // -----------------------------------------------------------------------

    fn explore_here(&mut self, agent_id: AgentId) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let agent = agent_mut(&mut self.agents, agent_id)?;
        let location = agent.location;
        if location == Location::Basement {
            let cost = FuncCost::ExploreBasement;
            self.ledger.spend(agent, cost.amount(), cost.as_str(), tick)?;
        }

        let discoveries = explore(agent, tick, &mut self.rng);
        let mut hidden_room = "";
        for discovery in &discoveries {
            match discovery {
                Discovery::Artifact(artifact) => {
                    found_artifact(agent, artifact, tick, &mut self.events);
                    self.artifacts.push(artifact.clone());
                }
                Discovery::HiddenRoom(room) => {
                    hidden_room = room.name;
                    Ledger::add_clout(agent, room.clout);
                    if room.func > 0 {
                        if let Err(err) = self.ledger.mint(agent, room.func, "hidden_room", tick) {
                            warn!(tick, agent = %agent_id, error = %err, "hidden room FUNC not paid");
                        }
                    }
                }
                Discovery::Lore(_) => {}
            }
        }

        let artifacts = discoveries
            .iter()
            .filter(|discovery| matches!(discovery, Discovery::Artifact(_)))
            .count();
        self.record(
            LogEvent::new(tick, EventKind::Explored)
                .with_agent("agent", agent_id)
                .with("location", location.as_str())
                .with("found", discoveries.len())
                .with("artifacts", artifacts)
                .with("hidden_room", hidden_room),
        );
        self.report(agent_id, "explore");
        Ok(CommandOutcome::Explored { discoveries })
    }

    fn accept_quest(&mut self, agent_id: AgentId, quest_id: QuestId) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let agent = agent_mut(&mut self.agents, agent_id)?;
        let quest = self.quests.accept(quest_id, agent)?;
        let name = quest.name.clone();
        self.record(
            LogEvent::new(tick, EventKind::QuestAccepted)
                .with_agent("agent", agent_id)
                .with("quest", quest_id.to_string())
                .with("name", name),
        );
        Ok(CommandOutcome::QuestAccepted { quest: quest_id })
    }

    fn advance_quest(&mut self, agent_id: AgentId, quest_id: QuestId, action: &str) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let agent = agent_mut(&mut self.agents, agent_id)?;
        let outcome = self.quests.advance(quest_id, agent, action)?;
        match &outcome {
            StepOutcome::Advanced { next } => self.record(
                LogEvent::new(tick, EventKind::QuestAdvanced)
                    .with_agent("agent", agent_id)
                    .with("quest", quest_id.to_string())
                    .with("action", action.trim())
                    .with("step", *next),
            ),
            StepOutcome::Completed(rewards) => self.pay_quest(agent_id, quest_id, rewards),
            StepOutcome::NoMatch => {}
        }
        Ok(CommandOutcome::QuestAdvanced {
            quest: quest_id,
            outcome,
        })
    }

    fn abandon_quest(&mut self, agent_id: AgentId, quest_id: QuestId) -> Result<CommandOutcome, CommandError> {
        let tick = self.clock.tick();
        let agent = agent_mut(&mut self.agents, agent_id)?;
        self.quests.abandon(quest_id, agent)?;
        info!(tick, agent = %agent_id, quest = %quest_id, "quest abandoned");
        Ok(CommandOutcome::QuestAbandoned { quest: quest_id })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use monad_types::DecreeKind;

    use super::*;
    use crate::config::MonadConfig;
    use crate::landlord::{self, LandlordOutput};

    fn quiet_world() -> World {
        let mut config = MonadConfig::default();
        config.landlord.high_chaos_chance = 0.0;
        config.landlord.gossip_overflow_chance = 0.0;
        config.landlord.random_decree_chance = 0.0;
        config.landlord.world_event_chance = 0.0;
        config.landlord.periodic_interval = 0;
        config.rumor.auto_spread_chance = 0.0;
        World::new(config).unwrap()
    }

    fn register(world: &mut World, name: &str) -> AgentId {
        match world
            .execute(Command::RegisterAgent {
                name: name.to_owned(),
                personality: Personality::Nerd,
            })
            .unwrap()
        {
            CommandOutcome::Registered { agent } => agent,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    fn impose(world: &mut World, kind: DecreeKind) {
        let decree = landlord::decree(kind, world.tick(), &world.config.landlord);
        world.landlord.record(&LandlordOutput::Decree(decree));
    }

    fn move_to(world: &mut World, agent: AgentId, to: Location) -> Result<CommandOutcome, CommandError> {
        world.execute(Command::Move { agent, to })
    }

    fn party(world: &mut World, agent: AgentId, location: Location) -> Result<CommandOutcome, CommandError> {
        world.execute(Command::ThrowParty {
            agent,
            vibes: vec![Vibe::Chill],
            location: Some(location),
        })
    }

    fn refused(result: Result<CommandOutcome, CommandError>) -> bool {
        matches!(result, Err(CommandError::PreconditionFailed { .. }))
    }

    #[test]
    fn duel_loser_pays_clout() {
        let mut world = quiet_world();
        let amy = register(&mut world, "Amy");
        let bo = register(&mut world, "Bo");
        for id in [amy, bo] {
            world.agents.get_mut(&id).unwrap().clout = 50;
        }

        let outcome = world
            .execute(Command::ChallengeDuel {
                agent: amy,
                target: bo,
                wager: 0,
            })
            .unwrap();
        let CommandOutcome::Dueled(record) = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(world.agent(record.winner).unwrap().clout, 65);
        assert_eq!(world.agent(record.loser).unwrap().clout, 45);
    }

    #[test]
    fn closed_kitchen_refuses_cooks_visitors_and_parties() {
        let mut world = quiet_world();
        let chef = register(&mut world, "Chef");
        let guest = register(&mut world, "Guest");
        move_to(&mut world, chef, Location::Kitchen).unwrap();
        impose(&mut world, DecreeKind::KitchenIncident);

        assert!(refused(world.execute(Command::Cook {
            agent: chef,
            ingredient: "ramen".to_owned(),
        })));
        assert!(refused(move_to(&mut world, guest, Location::Kitchen)));
        assert!(refused(party(&mut world, guest, Location::Kitchen)));
        assert_eq!(world.agent(guest).unwrap().location, Location::Lobby);
        assert_eq!(world.agent(guest).unwrap().func, 100);
    }

    #[test]
    fn locked_basement_refuses_visitors_and_parties() {
        let mut world = quiet_world();
        let amy = register(&mut world, "Amy");
        impose(&mut world, DecreeKind::BasementActivity);

        assert!(refused(move_to(&mut world, amy, Location::Basement)));
        assert!(refused(party(&mut world, amy, Location::Basement)));
        assert_eq!(world.agent(amy).unwrap().location, Location::Lobby);
    }

    #[test]
    fn drama_cooldown_refuses_pranks() {
        let mut world = quiet_world();
        let amy = register(&mut world, "Amy");
        let bo = register(&mut world, "Bo");
        impose(&mut world, DecreeKind::RelationshipDrama);

        assert!(refused(world.execute(Command::Prank { agent: amy, target: bo })));
        assert!(!world.agent(bo).unwrap().relationships.contains_key(&amy));
    }

    #[test]
    fn elevator_parity_follows_the_tick() {
        let mut world = quiet_world();
        let amy = register(&mut world, "Amy");
        impose(&mut world, DecreeKind::ElevatorDecree);

        // Tick 0 is even: up only.
        assert!(refused(move_to(&mut world, amy, Location::Basement)));
        move_to(&mut world, amy, Location::Floor1Hall).unwrap();

        // Tick 1 is odd: down only.
        world.advance_tick().unwrap();
        assert!(refused(move_to(&mut world, amy, Location::Floor2Hall)));
        move_to(&mut world, amy, Location::Lobby).unwrap();
        assert_eq!(world.agent(amy).unwrap().location, Location::Lobby);
    }

    #[test]
    fn gossip_limit_refuses_new_rumors() {
        let mut world = quiet_world();
        world.config.landlord.max_gossip_chains = 1;
        let amy = register(&mut world, "Amy");
        let bo = register(&mut world, "Bo");
        impose(&mut world, DecreeKind::GossipOverflow);

        world
            .execute(Command::StartRumor {
                agent: amy,
                text: "The boiler is haunted.".to_owned(),
            })
            .unwrap();
        assert!(refused(world.execute(Command::StartRumor {
            agent: bo,
            text: "The Landlord is three raccoons.".to_owned(),
        })));
        assert_eq!(world.active_chains().count(), 1);
    }

    #[test]
    fn party_limit_counts_this_ticks_parties() {
        let mut world = quiet_world();
        let host = register(&mut world, "Host");
        impose(&mut world, DecreeKind::PartyExcess);

        party(&mut world, host, Location::Rooftop).unwrap();
        party(&mut world, host, Location::Lounge).unwrap();
        assert!(refused(party(&mut world, host, Location::Gym)));
        assert_eq!(world.agent(host).unwrap().func, 60);

        world.advance_tick().unwrap();
        party(&mut world, host, Location::Gym).unwrap();
    }

    #[test]
    fn busy_night_brings_a_party_limit() {
        let mut world = quiet_world();
        let host = register(&mut world, "Host");
        for location in [Location::Rooftop, Location::Lounge, Location::Gym] {
            party(&mut world, host, location).unwrap();
        }
        assert_eq!(world.landlord.party_limit(), None);

        let summary = world.advance_tick().unwrap();
        assert_eq!(summary.decrees, vec![DecreeKind::PartyExcess]);
        assert_eq!(world.landlord.party_limit(), Some(2));

        let quiet = world.advance_tick().unwrap();
        assert!(quiet.decrees.is_empty());
    }
}
