use battle_arena_agents::{AgentStats, ChaseAgent, WanderAgent};
use battle_arena_core::{AgentId, ArenaConfig, ArenaEvent, SpawnStrategy, TeamColor, TeamId};
use battle_arena_world::{query, Environment};
use glam::Vec2;

const TICKS: usize = 300;
const TIME_STEP: f32 = 0.016;

#[test]
fn seeded_battles_replay_identically() {
    let first = replay(0x5eed, SpawnStrategy::TeamsOpposite);
    let second = replay(0x5eed, SpawnStrategy::TeamsOpposite);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.frames.len(), TICKS);
    assert!(first.events.iter().any(|event| event.starts_with("AgentSpawned")));
}

#[test]
fn every_strategy_replays_identically() {
    for strategy in [
        SpawnStrategy::Random,
        SpawnStrategy::Corners,
        SpawnStrategy::Circle,
        SpawnStrategy::Predefined,
    ] {
        assert_eq!(
            replay(11, strategy),
            replay(11, strategy),
            "{strategy:?} diverged"
        );
    }
}

#[test]
fn different_seeds_spawn_differently() {
    let first = replay(1, SpawnStrategy::Random);
    let second = replay(2, SpawnStrategy::Random);

    assert_ne!(first.frames[0], second.frames[0]);
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    frames: Vec<Vec<(AgentId, Vec2)>>,
    events: Vec<String>,
}

fn replay(seed: u64, strategy: SpawnStrategy) -> ReplayOutcome {
    let mut env = Environment::new(ArenaConfig {
        rng_seed: Some(seed),
        spawn_strategy: strategy,
        ..ArenaConfig::default()
    })
    .expect("valid configuration");

    let teams = ["red", "blue", "green", "gold"];
    for team in teams {
        assert!(env.create_team(team, "", TeamColor::WHITE));
    }

    for id in 0..24_u64 {
        let team = TeamId::new(teams[id as usize % teams.len()]);
        let stats = AgentStats::default();
        let agent_seed = seed.wrapping_mul(31).wrapping_add(id);
        let added = if id % 3 == 0 {
            env.add_agent(
                Box::new(WanderAgent::new(AgentId::new(id), stats, agent_seed)),
                None,
                Some(team),
            )
        } else {
            env.add_agent(
                Box::new(ChaseAgent::new(AgentId::new(id), stats, agent_seed)),
                None,
                Some(team),
            )
        };
        assert!(added);
    }

    let mut log = Vec::new();
    let mut frames = Vec::with_capacity(TICKS);
    assert!(env.start_battle());
    for _ in 0..TICKS {
        env.update(TIME_STEP);
        frames.push(
            query::living_agents(&env)
                .map(|agent| (agent.id(), agent.position()))
                .collect(),
        );
        record_events(&mut env, &mut log);
    }
    assert!(env.end_battle());
    record_events(&mut env, &mut log);

    ReplayOutcome {
        frames,
        events: log,
    }
}

fn record_events(env: &mut Environment, log: &mut Vec<String>) {
    let mut events = Vec::new();
    env.drain_events(&mut events);
    log.extend(events.into_iter().map(|event| match event {
        ArenaEvent::BattleConcluded { scores, winner, .. } => {
            format!("BattleConcluded {scores:?} {winner:?}")
        }
        other => format!("{other:?}"),
    }));
}
