use battle_arena_agents::{AgentStats, ChaseAgent, IdleAgent, ScriptedAgent, WanderAgent};
use battle_arena_core::{
    Agent, AgentError, AgentId, BattlePhase, Bounds, Observation, TeamId, VisibleAgent,
};
use glam::Vec2;

fn observation(position: Vec2, visible: Vec<VisibleAgent>) -> Observation {
    Observation {
        bounds: Bounds::new(1000.0, 800.0),
        position,
        team: Some(TeamId::new("red")),
        visible,
        phase: BattlePhase::ActiveCombat,
        simulation_time: 0.0,
        team_scores: Vec::new(),
        collision_radius: 12.0,
        vision_range: 200.0,
    }
}

fn seen(id: u64, from: Vec2, position: Vec2, is_enemy: bool) -> VisibleAgent {
    VisibleAgent {
        id: AgentId::new(id),
        position,
        health: 100.0,
        team: Some(TeamId::new(if is_enemy { "blue" } else { "red" })),
        is_enemy,
        distance: from.distance(position),
    }
}

#[test]
fn idle_agent_never_moves() {
    let mut agent = IdleAgent::new(AgentId::new(1));
    agent.set_position(Vec2::new(40.0, 40.0));

    for _ in 0..10 {
        agent
            .update(0.1, &observation(agent.position(), Vec::new()))
            .expect("idle turns succeed");
    }

    assert_eq!(agent.position(), Vec2::new(40.0, 40.0));
    assert_eq!(agent.turns(), 10);
    assert!((agent.idle_time() - 1.0).abs() < 1.0e-5);
}

#[test]
fn wanderer_moves_no_faster_than_its_speed() {
    let stats = AgentStats::default();
    let mut agent = WanderAgent::new(AgentId::new(2), stats, 99);
    agent.set_position(Vec2::new(500.0, 400.0));

    for _ in 0..40 {
        let before = agent.position();
        agent
            .update(0.1, &observation(before, Vec::new()))
            .expect("wander turns succeed");
        let travelled = before.distance(agent.position());
        assert!(travelled <= stats.speed * 0.1 + 1.0e-3, "travelled {travelled}");
    }

    assert_ne!(agent.position(), Vec2::new(500.0, 400.0));
    assert!((agent.heading().length() - 1.0).abs() < 1.0e-4);
}

#[test]
fn wanderers_with_equal_seeds_take_equal_paths() {
    let mut left = WanderAgent::new(AgentId::new(1), AgentStats::default(), 5);
    let mut right = WanderAgent::new(AgentId::new(1), AgentStats::default(), 5);
    left.set_position(Vec2::new(300.0, 300.0));
    right.set_position(Vec2::new(300.0, 300.0));

    for _ in 0..25 {
        let view = observation(left.position(), Vec::new());
        left.update(0.05, &view).expect("turn");
        right.update(0.05, &view).expect("turn");
        assert_eq!(left.position(), right.position());
    }
}

#[test]
fn chaser_closes_in_on_nearest_enemy() {
    let start = Vec2::new(100.0, 100.0);
    let mut agent = ChaseAgent::new(AgentId::new(1), AgentStats::default(), 3);
    agent.set_position(start);

    let view = observation(
        start,
        vec![
            seen(7, start, Vec2::new(110.0, 100.0), false),
            seen(9, start, Vec2::new(200.0, 100.0), true),
            seen(8, start, Vec2::new(100.0, 300.0), true),
        ],
    );
    agent.update(1.0, &view).expect("chase turn succeeds");

    assert_eq!(agent.target(), Some(AgentId::new(9)));
    assert_eq!(agent.position(), Vec2::new(150.0, 100.0));
}

#[test]
fn chaser_slows_near_its_target_and_stops_on_it() {
    let start = Vec2::new(100.0, 100.0);
    let mut agent = ChaseAgent::new(AgentId::new(1), AgentStats::default(), 3);
    agent.set_position(start);

    let near = Vec2::new(150.0, 100.0);
    agent
        .update(0.5, &observation(start, vec![seen(2, start, near, true)]))
        .expect("chase turn succeeds");
    assert_eq!(agent.position(), Vec2::new(120.0, 100.0));

    let close = Vec2::new(125.0, 100.0);
    let position = agent.position();
    agent
        .update(1.0, &observation(position, vec![seen(2, position, close, true)]))
        .expect("chase turn succeeds");
    assert_eq!(agent.position(), close);
}

#[test]
fn chaser_searches_when_nothing_is_visible() {
    let start = Vec2::new(400.0, 400.0);
    let mut agent = ChaseAgent::new(AgentId::new(1), AgentStats::default(), 11);
    agent.set_position(start);

    agent
        .update(1.0, &observation(start, Vec::new()))
        .expect("search turn succeeds");

    assert_eq!(agent.target(), None);
    assert!((agent.position().distance(start) - 15.0).abs() < 1.0e-3);
}

#[test]
fn scripted_agent_walks_its_route() {
    let route = vec![Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];
    let stats = AgentStats {
        speed: 10.0,
        ..AgentStats::default()
    };
    let mut agent = ScriptedAgent::new(AgentId::new(1), stats, route, false);

    let view = observation(Vec2::ZERO, Vec::new());
    agent.update(0.5, &view).expect("turn");
    assert_eq!(agent.position(), Vec2::new(5.0, 0.0));
    agent.update(0.5, &view).expect("turn");
    assert_eq!(agent.next_waypoint(), Some(Vec2::new(10.0, 10.0)));
    agent.update(2.0, &view).expect("turn");

    assert!(agent.is_finished());
    assert_eq!(agent.position(), Vec2::new(10.0, 10.0));
    agent.update(1.0, &view).expect("finished routes are idle");
    assert_eq!(agent.position(), Vec2::new(10.0, 10.0));
}

#[test]
fn looping_route_starts_over() {
    let route = vec![Vec2::new(5.0, 0.0), Vec2::ZERO];
    let stats = AgentStats {
        speed: 10.0,
        ..AgentStats::default()
    };
    let mut agent = ScriptedAgent::new(AgentId::new(1), stats, route, true);

    let view = observation(Vec2::ZERO, Vec::new());
    for _ in 0..3 {
        agent.update(1.0, &view).expect("turn");
    }

    assert!(!agent.is_finished());
    assert_eq!(agent.position(), Vec2::new(5.0, 0.0));
}

#[test]
fn non_finite_waypoint_fails_the_turn() {
    let route = vec![Vec2::new(f32::NAN, 0.0)];
    let mut agent = ScriptedAgent::new(AgentId::new(4), AgentStats::default(), route, false);

    let error = agent
        .update(0.1, &observation(Vec2::ZERO, Vec::new()))
        .unwrap_err();
    assert!(matches!(error, AgentError::InvalidState { agent, .. } if agent == AgentId::new(4)));
    assert_eq!(agent.position(), Vec2::ZERO);
}
