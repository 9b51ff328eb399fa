use std::io::Write;

use battle_arena_agents::IdleAgent;
use battle_arena_core::{
    AgentId, AgentRejection, ArenaConfig, ArenaEvent, BattlePhase, RunState, SpawnStrategy,
    TeamColor, TeamId, TeamRejection,
};
use battle_arena_world::{query, Environment};
use glam::Vec2;
use tracing::Level;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn environment(config: ArenaConfig) -> Environment {
    init_tracing();
    Environment::new(ArenaConfig {
        rng_seed: Some(0xba77_1e),
        ..config
    })
    .expect("valid configuration")
}

fn idle(id: u64) -> Box<IdleAgent> {
    Box::new(IdleAgent::new(AgentId::new(id)))
}

fn drain(env: &mut Environment) -> Vec<ArenaEvent> {
    let mut events = Vec::new();
    env.drain_events(&mut events);
    events
}

#[test]
fn duplicate_team_is_rejected() {
    let mut env = environment(ArenaConfig::default());

    assert!(env.create_team("red", "Red", TeamColor::from_rgb(0xff, 0, 0)));
    assert!(!env.create_team("red", "Red Again", TeamColor::WHITE));

    assert_eq!(query::teams(&env).count(), 1);
    let red = query::team(&env, &TeamId::new("red")).expect("team exists");
    assert_eq!(red.name(), "Red");
    assert_eq!(red.color(), TeamColor::from_rgb(0xff, 0, 0));

    let events = drain(&mut env);
    assert!(matches!(
        events.last(),
        Some(ArenaEvent::TeamRejected { reason: TeamRejection::Duplicate, .. })
    ));
}

#[test]
fn team_cap_is_enforced() {
    let mut env = environment(ArenaConfig {
        max_teams: 2,
        ..ArenaConfig::default()
    });

    assert!(env.create_team("a", "", TeamColor::WHITE));
    assert!(env.create_team("b", "", TeamColor::WHITE));
    assert!(!env.create_team("c", "", TeamColor::WHITE));
    assert_eq!(query::teams(&env).count(), 2);
    assert!(query::team(&env, &TeamId::new("c")).is_none());

    let events = drain(&mut env);
    assert!(matches!(
        events.last(),
        Some(ArenaEvent::TeamRejected { reason: TeamRejection::CapacityReached, .. })
    ));
}

#[test]
fn opposite_teams_spawn_on_opposite_bands() {
    let mut env = environment(ArenaConfig {
        width: 1000.0,
        height: 800.0,
        spawn_margin: 50.0,
        spawn_strategy: SpawnStrategy::TeamsOpposite,
        ..ArenaConfig::default()
    });
    assert!(env.create_team("left", "", TeamColor::WHITE));
    assert!(env.create_team("right", "", TeamColor::WHITE));

    let left = query::team(&env, &TeamId::new("left"))
        .and_then(|team| team.spawn_area())
        .expect("area assigned");
    let right = query::team(&env, &TeamId::new("right"))
        .and_then(|team| team.spawn_area())
        .expect("area assigned");
    assert_eq!((left.min().x, left.max().x), (50.0, 300.0));
    assert_eq!((right.min().x, right.max().x), (700.0, 950.0));

    for id in 0..30 {
        let team = if id % 2 == 0 { "left" } else { "right" };
        assert!(env.add_agent(idle(id), None, Some(TeamId::new(team))));
    }
    for id in 0..30 {
        let area = if id % 2 == 0 { left } else { right };
        let position = query::agent(&env, AgentId::new(id))
            .map(|agent| agent.position())
            .expect("agent placed");
        assert!(area.contains(position), "agent {id} at {position} outside {area:?}");
    }
}

#[test]
fn agent_admission_rejects_duplicates_and_overflow() {
    let mut env = environment(ArenaConfig {
        max_agents: 2,
        ..ArenaConfig::default()
    });

    assert!(env.add_agent(idle(1), Some(Vec2::new(10.0, 10.0)), None));
    assert!(!env.add_agent(idle(1), Some(Vec2::new(20.0, 20.0)), None));
    assert!(env.add_agent(idle(2), None, None));
    assert!(!env.add_agent(idle(3), None, None));

    assert_eq!(query::agent_count(&env), 2);
    assert_eq!(
        query::indexed_position(&env, AgentId::new(1)),
        Some(Vec2::new(10.0, 10.0))
    );

    let rejections: Vec<AgentRejection> = drain(&mut env)
        .into_iter()
        .filter_map(|event| match event {
            ArenaEvent::AgentRejected { reason, .. } => Some(reason),
            _ => None,
        })
        .collect();
    assert_eq!(
        rejections,
        vec![AgentRejection::Duplicate, AgentRejection::CapacityReached]
    );
}

#[test]
fn explicit_positions_are_clamped_onto_the_field() {
    let mut env = environment(ArenaConfig::default());
    assert!(env.add_agent(idle(1), Some(Vec2::new(-40.0, 9000.0)), None));

    let position = query::indexed_position(&env, AgentId::new(1)).expect("indexed");
    assert_eq!(position, Vec2::new(0.0, 800.0));
    assert_eq!(
        query::agent(&env, AgentId::new(1)).map(|agent| agent.position()),
        Some(position)
    );
}

#[test]
fn unknown_team_leaves_agent_teamless() {
    let mut env = environment(ArenaConfig::default());
    assert!(env.add_agent(idle(1), None, Some(TeamId::new("ghosts"))));

    assert_eq!(query::agent_team(&env, AgentId::new(1)), None);
    assert_eq!(
        query::agent(&env, AgentId::new(1)).and_then(|agent| agent.team().cloned()),
        None
    );
}

#[test]
fn removal_updates_roster_and_deaths() {
    let mut env = environment(ArenaConfig::default());
    assert!(env.create_team("red", "", TeamColor::WHITE));
    assert!(env.add_agent(idle(1), None, Some(TeamId::new("red"))));
    assert!(env.add_agent(idle(2), None, Some(TeamId::new("red"))));

    let removed = env.remove_agent(AgentId::new(1)).expect("agent present");
    assert_eq!(removed.id(), AgentId::new(1));
    assert!(env.remove_agent(AgentId::new(1)).is_none());

    let red = query::team(&env, &TeamId::new("red")).expect("team exists");
    assert_eq!(red.agent_count(), 1);
    assert_eq!(red.deaths(), 1);
    assert_eq!(query::agent_team(&env, AgentId::new(1)), None);
    assert!(query::nearby_agents(&env, Vec2::new(500.0, 400.0), 2000.0)
        .iter()
        .all(|id| *id != AgentId::new(1)));
}

#[test]
fn phases_progress_once_and_in_order() {
    let mut env = environment(ArenaConfig::default());
    assert!(!env.end_battle(), "ending before starting has no effect");
    assert_eq!(query::phase(&env), BattlePhase::Preparation);
    assert_eq!(query::run_state(&env), RunState::Initializing);

    assert!(env.start_battle());
    assert!(!env.start_battle(), "second start has no effect");
    assert_eq!(query::phase(&env), BattlePhase::ActiveCombat);
    assert_eq!(query::run_state(&env), RunState::Running);

    assert!(env.end_battle());
    assert!(!env.end_battle());
    assert!(!env.start_battle());
    assert_eq!(query::phase(&env), BattlePhase::Completed);
    assert_eq!(query::run_state(&env), RunState::Finished);

    let phases: Vec<(BattlePhase, BattlePhase)> = drain(&mut env)
        .into_iter()
        .filter_map(|event| match event {
            ArenaEvent::PhaseChanged { from, to } => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            (BattlePhase::Preparation, BattlePhase::ActiveCombat),
            (BattlePhase::ActiveCombat, BattlePhase::Cleanup),
            (BattlePhase::Cleanup, BattlePhase::Completed),
        ]
    );
}

#[test]
fn sole_surviving_team_ends_battle_on_next_update() {
    let mut env = environment(ArenaConfig::default());
    assert!(env.create_team("red", "", TeamColor::WHITE));
    assert!(env.create_team("blue", "", TeamColor::WHITE));
    for id in 0..3 {
        assert!(env.add_agent(idle(id), None, Some(TeamId::new("red"))));
    }
    assert!(env.record_kill(AgentId::new(0), AgentId::new(99)));
    assert!(env.record_kill(AgentId::new(1), AgentId::new(98)));

    assert!(env.start_battle());
    env.update(0.016);

    assert_eq!(query::phase(&env), BattlePhase::Completed);
    assert_eq!(query::run_state(&env), RunState::Finished);

    let red = query::team(&env, &TeamId::new("red")).expect("team exists");
    assert_eq!(red.kills(), 2);
    assert_eq!(red.score(), 3 * 100 + 2 * 10);
    assert_eq!(query::total_kills(&env), 2);

    let concluded = drain(&mut env).into_iter().find_map(|event| match event {
        ArenaEvent::BattleConcluded { scores, winner, .. } => Some((scores, winner)),
        _ => None,
    });
    assert_eq!(
        concluded,
        Some((
            vec![(TeamId::new("red"), 320), (TeamId::new("blue"), 0)],
            Some(TeamId::new("red"))
        ))
    );
}

#[test]
fn battle_without_team_members_ends_on_next_update() {
    let mut env = environment(ArenaConfig::default());
    assert!(env.create_team("red", "", TeamColor::WHITE));
    assert!(env.create_team("blue", "", TeamColor::WHITE));
    for id in 0..4 {
        assert!(env.add_agent(idle(id), None, None));
    }

    assert!(env.start_battle());
    env.update(0.016);

    assert_eq!(query::phase(&env), BattlePhase::Completed);
    assert_eq!(query::run_state(&env), RunState::Finished);
    assert_eq!(query::agent_count(&env), 4);
    let scores = drain(&mut env).into_iter().find_map(|event| match event {
        ArenaEvent::BattleConcluded { scores, .. } => Some(scores),
        _ => None,
    });
    assert_eq!(
        scores,
        Some(vec![(TeamId::new("red"), 0), (TeamId::new("blue"), 0)])
    );
}

#[test]
fn battle_without_teams_ends_without_a_winner() {
    let mut env = environment(ArenaConfig::default());
    assert!(env.add_agent(idle(1), None, None));
    assert!(env.add_agent(idle(2), None, None));

    assert!(env.start_battle());
    env.update(0.016);

    assert_eq!(query::phase(&env), BattlePhase::Completed);
    let winner = drain(&mut env).into_iter().find_map(|event| match event {
        ArenaEvent::BattleConcluded { winner, .. } => Some(winner),
        _ => None,
    });
    assert_eq!(winner, Some(None));
}

#[test]
fn battle_continues_while_two_teams_survive() {
    let mut env = environment(ArenaConfig::default());
    assert!(env.create_team("red", "", TeamColor::WHITE));
    assert!(env.create_team("blue", "", TeamColor::WHITE));
    assert!(env.add_agent(idle(1), None, Some(TeamId::new("red"))));
    assert!(env.add_agent(idle(2), None, Some(TeamId::new("blue"))));

    assert!(env.start_battle());
    for _ in 0..5 {
        env.update(0.016);
    }
    assert_eq!(query::phase(&env), BattlePhase::ActiveCombat);

    let _ = env.remove_agent(AgentId::new(2));
    env.update(0.016);
    assert_eq!(query::phase(&env), BattlePhase::Completed);
    assert_eq!(
        query::team(&env, &TeamId::new("blue")).map(|team| team.deaths()),
        Some(1)
    );
}

#[test]
fn kills_require_a_present_killer() {
    let mut env = environment(ArenaConfig::default());
    assert!(env.add_agent(idle(1), None, None));

    assert!(!env.record_kill(AgentId::new(5), AgentId::new(1)));
    assert!(!env.record_kill(AgentId::new(1), AgentId::new(1)));
    assert!(env.record_kill(AgentId::new(1), AgentId::new(5)));
    assert_eq!(query::total_kills(&env), 1);
}

#[test]
fn reset_keeps_team_definitions_only() {
    let mut env = environment(ArenaConfig::default());
    assert!(env.create_team("red", "Red", TeamColor::WHITE));
    assert!(env.create_team("blue", "Blue", TeamColor::WHITE));
    let red_area = query::team(&env, &TeamId::new("red")).and_then(|team| team.spawn_area());
    for id in 0..4 {
        let team = if id < 2 { "red" } else { "blue" };
        assert!(env.add_agent(idle(id), None, Some(TeamId::new(team))));
    }
    assert!(env.record_kill(AgentId::new(0), AgentId::new(2)));
    let _ = env.remove_agent(AgentId::new(2));
    assert!(env.start_battle());
    env.update(0.016);

    env.reset_battle();

    assert_eq!(query::phase(&env), BattlePhase::Preparation);
    assert_eq!(query::run_state(&env), RunState::Initializing);
    assert_eq!(query::agent_count(&env), 0);
    assert_eq!(query::total_kills(&env), 0);
    assert!(query::nearby_agents(&env, Vec2::new(500.0, 400.0), 5000.0).is_empty());
    assert!(query::collision_events(&env).is_empty());
    assert_eq!(query::agent_team(&env, AgentId::new(0)), None);

    let teams: Vec<_> = query::teams(&env).collect();
    assert_eq!(teams.len(), 2);
    for team in &teams {
        assert_eq!(
            (team.agent_count(), team.score(), team.kills(), team.deaths()),
            (0, 0, 0, 0)
        );
    }
    assert_eq!(teams[0].spawn_area(), red_area);

    let statistics = query::statistics(&env);
    assert_eq!(statistics.environment.frame_count, 0);
    assert_eq!(statistics.duration_secs, 0.0);

    assert!(env.start_battle(), "a new battle can start after a reset");
}

#[test]
fn statistics_serialise_to_json() {
    let mut env = environment(ArenaConfig::default());
    assert!(env.create_team("red", "Crimson", TeamColor::WHITE));
    assert!(env.add_agent(idle(1), None, Some(TeamId::new("red"))));
    assert!(env.add_agent(idle(2), None, None));
    assert!(env.start());
    env.update(0.5);

    let statistics = query::statistics(&env);
    assert_eq!(statistics.total_agents, 2);
    assert_eq!(statistics.living_agents, 2);
    assert_eq!(
        statistics.team(&TeamId::new("red")).map(|team| team.agent_count),
        Some(1)
    );

    let json = serde_json::to_value(&statistics).expect("statistics serialise");
    assert_eq!(json["phase"], "preparation");
    assert_eq!(json["teams"][0]["id"], "red");
    assert_eq!(json["teams"][0]["name"], "Crimson");
    assert_eq!(json["environment"]["frame_count"], 1);
    assert_eq!(json["environment"]["simulation_time"], 0.5);
    assert_eq!(json["environment"]["agents_spawned"], 2);
    assert!(json["environment"]["average_update_secs"].is_number());
}

#[test]
fn environment_loads_from_config_file() {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "width = 640.0\nheight = 480.0\nspawn_strategy = \"corners\"\nrng_seed = 3"
    )
    .expect("write config");

    let env = Environment::from_config_file(file.path()).expect("config loads");
    let config = query::config(&env);
    assert_eq!(config.spawn_strategy, SpawnStrategy::Corners);
    assert_eq!(query::bounds(&env).width(), 640.0);
    assert_eq!(config.collision_radius, 12.0);
}

#[test]
fn invalid_config_file_reports_context() {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "width = -5.0").expect("write config");

    let error = Environment::from_config_file(file.path()).expect_err("negative width");
    assert!(error.to_string().contains("invalid arena config"));

    let missing = Environment::from_config_file("/definitely/not/here.toml").expect_err("missing file");
    assert!(missing.to_string().contains("failed to read arena config"));
}
