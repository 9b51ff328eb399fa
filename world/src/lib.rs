#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state and the per-tick update loop.
//!
//! [`Environment`] is the single owner of the agent table, the team
//! registry, the spatial index and the battle lifecycle. Everything else
//! reaches into it through identifiers: the read-only [`query`] module for
//! inspection, and the methods on [`Environment`] for mutation. Rejections
//! and lifecycle transitions are appended to an event log drained with
//! [`Environment::drain_events`].

mod metrics;
mod projectiles;
mod teams;

use std::{
    collections::{BTreeMap, BTreeSet},
    fs, mem,
    path::Path,
    time::Instant,
};

use anyhow::Context;
use battle_arena_core::{
    Agent, AgentError, AgentId, AgentRejection, ArenaConfig, ArenaEvent, BattlePhase, Bounds,
    CollisionEvent, ConfigError, RunState, TeamColor, TeamId, TeamRejection,
};
use battle_arena_system_collision::{self as collision, CollisionDetector};
use battle_arena_system_lifecycle::{self as lifecycle, LifecycleController, TeamTally};
use battle_arena_system_spatial::SpatialIndex;
use battle_arena_system_spawning::{self as spawning, SpawnPlanner};
use glam::Vec2;
use tracing::{debug, error, info, warn};

use metrics::Metrics;
use projectiles::Projectiles;
use teams::TeamRegistry;

pub use projectiles::Projectile;
pub use teams::Team;

/// Battlefield that owns agents and teams and drives the battle.
#[derive(Debug)]
pub struct Environment {
    config: ArenaConfig,
    bounds: Bounds,
    run_state: RunState,
    lifecycle: LifecycleController,
    teams: TeamRegistry,
    agents: BTreeMap<AgentId, Box<dyn Agent>>,
    index: SpatialIndex,
    detector: CollisionDetector,
    planner: SpawnPlanner,
    collisions: Vec<CollisionEvent>,
    living: Vec<AgentId>,
    turn_order: Vec<AgentId>,
    metrics: Metrics,
    projectiles: Projectiles,
    events: Vec<ArenaEvent>,
}

impl Environment {
    /// Creates an empty environment in the preparation phase.
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let bounds = config.bounds();
        let index = if config.spatial_partitioning {
            SpatialIndex::grid(config.grid_cell_size)
        } else {
            SpatialIndex::linear()
        };
        let detector = CollisionDetector::new(collision::Config::new(
            config.collision_radius,
            config.collision_detection,
        ));
        let planner = SpawnPlanner::new(spawning::Config::new(
            config.spawn_strategy,
            bounds,
            config.spawn_margin,
            config.rng_seed,
        ));

        info!(
            width = bounds.width(),
            height = bounds.height(),
            strategy = ?config.spawn_strategy,
            partitioning = config.spatial_partitioning,
            "battle environment initialised"
        );

        Ok(Self {
            bounds,
            run_state: RunState::Initializing,
            lifecycle: LifecycleController::new(),
            teams: TeamRegistry::default(),
            agents: BTreeMap::new(),
            index,
            detector,
            planner,
            collisions: Vec::new(),
            living: Vec::new(),
            turn_order: Vec::new(),
            metrics: Metrics::new(Instant::now()),
            projectiles: Projectiles::default(),
            events: Vec::new(),
            config,
        })
    }

    /// Loads a TOML configuration file and creates an environment from it.
    pub fn from_config_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read arena config {}", path.display()))?;
        let config = ArenaConfig::from_toml_str(&contents)
            .with_context(|| format!("invalid arena config {}", path.display()))?;
        Ok(Self::new(config)?)
    }

    /// Moves every pending event into `out_events`, oldest first.
    pub fn drain_events(&mut self, out_events: &mut Vec<ArenaEvent>) {
        out_events.append(&mut self.events);
    }

    /// Registers a team and assigns its spawn area.
    ///
    /// Returns `false` when the identifier is taken or the team cap is
    /// reached. An empty `name` falls back to the identifier.
    pub fn create_team(&mut self, id: impl Into<TeamId>, name: &str, color: TeamColor) -> bool {
        let id = id.into();

        if self.teams.contains(&id) {
            warn!(team = %id, "team already exists");
            self.events.push(ArenaEvent::TeamRejected {
                team: id,
                reason: TeamRejection::Duplicate,
            });
            return false;
        }

        if self.teams.len() >= self.config.max_teams {
            warn!(team = %id, max_teams = self.config.max_teams, "maximum number of teams reached");
            self.events.push(ArenaEvent::TeamRejected {
                team: id,
                reason: TeamRejection::CapacityReached,
            });
            return false;
        }

        let spawn_area = self.planner.assign_area(self.teams.len() + 1);
        let team = Team::new(id.clone(), name, color, spawn_area);
        info!(team = %id, name = team.name(), "team created");
        self.teams.insert(team);
        self.events.push(ArenaEvent::TeamCreated {
            team: id,
            spawn_area,
        });
        true
    }

    /// Places an agent on the battlefield.
    ///
    /// Without an explicit `position` the agent spawns inside its team's
    /// spawn area, or wherever the spawn strategy dictates for teamless
    /// agents. The spawn point is clamped onto the field. Unknown teams are
    /// ignored and the agent joins no team. Returns `false` when the agent
    /// cap is reached or the identifier is already present; agents, teams
    /// and the index are then left as they were.
    pub fn add_agent(
        &mut self,
        mut agent: Box<dyn Agent>,
        position: Option<Vec2>,
        team: Option<TeamId>,
    ) -> bool {
        let id = agent.id();

        if self.agents.len() >= self.config.max_agents {
            warn!(agent = %id, max_agents = self.config.max_agents, "maximum agent limit reached");
            self.events.push(ArenaEvent::AgentRejected {
                agent: id,
                reason: AgentRejection::CapacityReached,
            });
            return false;
        }

        if self.agents.contains_key(&id) {
            warn!(agent = %id, "agent already exists");
            self.events.push(ArenaEvent::AgentRejected {
                agent: id,
                reason: AgentRejection::Duplicate,
            });
            return false;
        }

        let team = team.filter(|team| {
            let known = self.teams.contains(team);
            if !known {
                warn!(agent = %id, team = %team, "unknown team, agent joins no team");
            }
            known
        });

        let requested = position.filter(|position| {
            if !position.is_finite() {
                warn!(agent = %id, %position, "non-finite spawn position ignored");
            }
            position.is_finite()
        });
        let spawn = match requested {
            Some(position) => position,
            None => {
                let area = team
                    .as_ref()
                    .and_then(|team| self.teams.get(team))
                    .and_then(Team::spawn_area);
                self.planner.resolve_position(area.as_ref())
            }
        };
        let position = self.bounds.clamp(spawn);

        agent.set_position(position);
        agent.set_team(team.clone());
        if let Some(team) = &team {
            let _ = self.teams.assign(id, team);
        }
        let _ = self.index.insert(id, position);
        let _ = self.agents.insert(id, agent);
        self.metrics.record_spawn();

        info!(agent = %id, x = position.x, y = position.y, team = ?team, "agent spawned");
        self.events.push(ArenaEvent::AgentSpawned {
            agent: id,
            position,
            team,
        });
        true
    }

    /// Takes an agent off the battlefield and hands it back.
    ///
    /// The agent's team loses the member and counts a death.
    pub fn remove_agent(&mut self, id: AgentId) -> Option<Box<dyn Agent>> {
        let agent = self.agents.remove(&id)?;
        let team = self.teams.release(id);
        let _ = self.index.remove(id);
        self.metrics.record_removal();

        info!(agent = %id, team = ?team, "agent removed from battle");
        self.events.push(ArenaEvent::AgentRemoved { agent: id, team });
        Some(agent)
    }

    /// Credits `killer` and its team with a kill of `victim`.
    ///
    /// Returns `false` when the killer is not on the battlefield or names
    /// itself as the victim.
    pub fn record_kill(&mut self, killer: AgentId, victim: AgentId) -> bool {
        if killer == victim || !self.agents.contains_key(&killer) {
            debug!(%killer, %victim, "kill ignored");
            return false;
        }

        if let Some(team) = self.teams.team_of(killer).cloned() {
            let _ = self.teams.credit_kill(&team);
        }
        self.lifecycle.record_kill();
        debug!(%killer, %victim, "kill recorded");
        self.events.push(ArenaEvent::KillRecorded { killer, victim });
        true
    }

    /// Detects collisions between living agents at their current positions.
    ///
    /// The events replace the ones from the previous call and stay
    /// available through [`query::collision_events`]. No separation is
    /// applied.
    pub fn check_collisions(&mut self) -> &[CollisionEvent] {
        self.living.clear();
        self.living.extend(
            self.agents
                .iter()
                .filter(|(_, agent)| agent.is_alive())
                .map(|(id, _)| *id),
        );
        self.detector
            .detect(&self.living, &self.index, &mut self.collisions);
        self.metrics.record_collisions(self.collisions.len());
        &self.collisions
    }

    /// Launches a projectile owned by a living agent.
    ///
    /// Returns `false` when the projectile system is disabled, the owner is
    /// unknown or dead, or the launch parameters are not finite.
    pub fn launch_projectile(
        &mut self,
        owner: AgentId,
        velocity: Vec2,
        lifetime: f32,
    ) -> bool {
        if !self.config.projectile_system {
            return false;
        }
        let Some(agent) = self.agents.get(&owner) else {
            return false;
        };
        if !agent.is_alive() || !velocity.is_finite() || !lifetime.is_finite() || lifetime <= 0.0 {
            return false;
        }

        self.projectiles.launch(Projectile {
            owner,
            position: agent.position(),
            velocity,
            remaining: lifetime,
        });
        true
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Does nothing unless the environment is running. Living agents take
    /// their turns in ascending identifier order; each observation is built
    /// at the moment of the turn, so later agents see earlier moves from
    /// the same tick. An agent whose turn returns an error is logged and
    /// skipped without aborting the tick; a panicking agent is not isolated
    /// and unwinds out of this call.
    pub fn update(&mut self, dt: f32) {
        if self.run_state != RunState::Running {
            return;
        }
        let tick_started = Instant::now();

        self.collisions.clear();

        let mut turn_order = mem::take(&mut self.turn_order);
        turn_order.clear();
        turn_order.extend(
            self.agents
                .iter()
                .filter(|(_, agent)| agent.is_alive())
                .map(|(id, _)| *id),
        );
        for &id in &turn_order {
            self.take_turn(id, dt);
        }
        self.turn_order = turn_order;

        let check_started = Instant::now();
        let _ = self.check_collisions();
        self.metrics.record_collision_check(check_started.elapsed());
        self.resolve_collisions();

        if self.config.projectile_system {
            let culled = self.projectiles.advance(dt, &self.bounds);
            if culled > 0 {
                debug!(culled, "projectiles culled");
            }
        }

        self.metrics
            .record_tick(dt, tick_started.elapsed(), Instant::now());
        self.check_battle_end();
    }

    fn take_turn(&mut self, id: AgentId, dt: f32) {
        let Some(observation) = query::observe(self, id) else {
            return;
        };
        let Some(agent) = self.agents.get_mut(&id) else {
            return;
        };
        let previous = self.index.position(id).unwrap_or(observation.position);

        let outcome = agent.update(dt, &observation);
        let reported = agent.position();
        let outcome = outcome.and_then(|()| {
            if reported.is_finite() {
                Ok(())
            } else {
                Err(AgentError::NonFinitePosition {
                    agent: id,
                    position: reported,
                })
            }
        });

        let next = if reported.is_finite() {
            self.bounds.clamp(reported)
        } else {
            previous
        };
        if next != reported {
            agent.set_position(next);
        }
        if next != previous {
            let _ = self.index.reposition(id, previous, next);
        }

        if let Err(failure) = outcome {
            error!(agent = %id, error = %failure, "agent turn failed");
            self.events.push(ArenaEvent::AgentTurnFailed {
                agent: id,
                reason: failure.to_string(),
            });
        }
    }

    fn resolve_collisions(&mut self) {
        let collisions = mem::take(&mut self.collisions);
        for event in &collisions {
            let (Some(first), Some(second)) = (
                self.index.position(event.first),
                self.index.position(event.second),
            ) else {
                continue;
            };
            let (first_next, second_next) = self.detector.separate(event, first, second);
            self.move_agent(event.first, first, first_next);
            self.move_agent(event.second, second, second_next);
        }
        self.collisions = collisions;
    }

    fn move_agent(&mut self, id: AgentId, from: Vec2, to: Vec2) {
        let to = self.bounds.clamp(to);
        if to == from {
            return;
        }
        if let Some(agent) = self.agents.get_mut(&id) {
            agent.set_position(to);
            let _ = self.index.reposition(id, from, to);
        }
    }

    fn check_battle_end(&mut self) {
        if self.lifecycle.phase() != BattlePhase::ActiveCombat {
            return;
        }

        let teams_with_living = self
            .agents
            .iter()
            .filter(|(_, agent)| agent.is_alive())
            .filter_map(|(id, _)| self.teams.team_of(*id))
            .collect::<BTreeSet<_>>()
            .len();

        if self.lifecycle.should_end(teams_with_living) {
            info!(teams_remaining = teams_with_living, "battle ending");
            let _ = self.end_battle();
        }
    }

    /// Starts the battle and the simulation.
    ///
    /// Only takes effect in the preparation phase; returns whether it did.
    pub fn start_battle(&mut self) -> bool {
        if !self.lifecycle.begin(Instant::now()) {
            debug!(phase = %self.lifecycle.phase(), "battle already started");
            return false;
        }

        self.events.push(ArenaEvent::PhaseChanged {
            from: BattlePhase::Preparation,
            to: BattlePhase::ActiveCombat,
        });
        let _ = self.start();
        info!(
            teams = self.teams.len(),
            agents = self.agents.len(),
            "battle started"
        );
        true
    }

    /// Ends the battle, scores every team and stops the simulation.
    ///
    /// Only takes effect during active combat; returns whether it did.
    pub fn end_battle(&mut self) -> bool {
        let Some(duration) = self.lifecycle.enter_cleanup(Instant::now()) else {
            debug!(phase = %self.lifecycle.phase(), "no battle in progress");
            return false;
        };
        self.events.push(ArenaEvent::PhaseChanged {
            from: BattlePhase::ActiveCombat,
            to: BattlePhase::Cleanup,
        });

        let agents = &self.agents;
        let outcome = lifecycle::conclude(self.teams.iter().map(|team| TeamTally {
            team: team.id(),
            living: team
                .members()
                .filter(|member| agents.get(member).map_or(false, |agent| agent.is_alive()))
                .count(),
            kills: team.kills(),
        }));
        self.teams.apply_scores(&outcome.scores);

        if let Some(winner) = &outcome.winner {
            let score = outcome
                .scores
                .iter()
                .find(|(team, _)| team == winner)
                .map_or(0, |(_, score)| *score);
            info!(team = %winner, score, "battle won");
        }
        self.events.push(ArenaEvent::BattleConcluded {
            duration,
            scores: outcome.scores,
            winner: outcome.winner,
        });

        let _ = self.lifecycle.complete();
        self.events.push(ArenaEvent::PhaseChanged {
            from: BattlePhase::Cleanup,
            to: BattlePhase::Completed,
        });
        let _ = self.stop();
        info!(duration_secs = duration.as_secs_f32(), "battle ended");
        true
    }

    /// Clears agents, rosters, counters and projectiles for a new battle.
    ///
    /// Team definitions, their spawn areas and the field dimensions stay.
    pub fn reset_battle(&mut self) {
        self.lifecycle.reset();
        self.agents.clear();
        self.index.clear();
        self.teams.reset_rosters();
        self.collisions.clear();
        self.projectiles.clear();
        self.metrics = Metrics::new(Instant::now());
        self.run_state = RunState::Initializing;

        info!("battle environment reset");
        self.events.push(ArenaEvent::BattleReset);
    }

    /// Moves from initializing to running. Returns whether it did.
    pub fn start(&mut self) -> bool {
        self.transition(RunState::Initializing, RunState::Running)
    }

    /// Suspends a running simulation. Returns whether it did.
    pub fn pause(&mut self) -> bool {
        self.transition(RunState::Running, RunState::Paused)
    }

    /// Resumes a paused simulation. Returns whether it did.
    pub fn resume(&mut self) -> bool {
        self.transition(RunState::Paused, RunState::Running)
    }

    /// Finishes a running or paused simulation. Returns whether it did.
    pub fn stop(&mut self) -> bool {
        if self.run_state == RunState::Paused {
            return self.transition(RunState::Paused, RunState::Finished);
        }
        self.transition(RunState::Running, RunState::Finished)
    }

    fn transition(&mut self, from: RunState, to: RunState) -> bool {
        if self.run_state != from {
            warn!(current = ?self.run_state, requested = ?to, "run state transition refused");
            return false;
        }
        self.run_state = to;
        debug!(?from, ?to, "run state changed");
        true
    }
}

/// Query functions that provide read-only access to the environment.
pub mod query {
    use std::time::Instant;

    use battle_arena_core::{
        Agent, AgentId, ArenaConfig, BattlePhase, BattleStatistics, Bounds, CollisionEvent,
        Observation, RunState, TeamId, VisibleAgent,
    };
    use glam::Vec2;

    use super::{Environment, Projectile, Team};

    /// Builds the observation an agent receives on its turn.
    ///
    /// Visible agents are the living agents within vision range, excluding
    /// the observer, nearest first. Equal distances keep ascending
    /// identifier order. Another agent counts as an enemy unless both
    /// agents belong to the same known team. Returns `None` for unknown
    /// agents.
    #[must_use]
    pub fn observe(env: &Environment, id: AgentId) -> Option<Observation> {
        let agent = env.agents.get(&id)?;
        let position = env.index.position(id).unwrap_or_else(|| agent.position());
        let team = env.teams.team_of(id).cloned();

        let mut visible: Vec<VisibleAgent> = env
            .index
            .query_radius(position, env.config.vision_range)
            .into_iter()
            .filter(|other| *other != id)
            .filter_map(|other| {
                let seen = env.agents.get(&other)?;
                if !seen.is_alive() {
                    return None;
                }
                let seen_position = env.index.position(other)?;
                let seen_team = env.teams.team_of(other).cloned();
                let is_enemy = match (&team, &seen_team) {
                    (Some(mine), Some(theirs)) => mine != theirs,
                    _ => true,
                };
                Some(VisibleAgent {
                    id: other,
                    position: seen_position,
                    health: seen.health(),
                    team: seen_team,
                    is_enemy,
                    distance: position.distance(seen_position),
                })
            })
            .collect();
        visible.sort_by(|left, right| left.distance.total_cmp(&right.distance));

        Some(Observation {
            bounds: env.bounds,
            position,
            team,
            visible,
            phase: env.lifecycle.phase(),
            simulation_time: env.metrics.simulation_time(),
            team_scores: env.teams.scores(),
            collision_radius: env.config.collision_radius,
            vision_range: env.config.vision_range,
        })
    }

    /// Living agents within `radius` of `center`, in ascending identifier
    /// order. Grid and linear indexes return the same set.
    #[must_use]
    pub fn nearby_agents(env: &Environment, center: Vec2, radius: f32) -> Vec<AgentId> {
        let mut found = env.index.query_radius(center, radius);
        found.retain(|id| env.agents.get(id).map_or(false, |agent| agent.is_alive()));
        found
    }

    /// Team registered under `id`.
    #[must_use]
    pub fn team<'a>(env: &'a Environment, id: &TeamId) -> Option<&'a Team> {
        env.teams.get(id)
    }

    /// Team the agent belongs to.
    #[must_use]
    pub fn agent_team(env: &Environment, id: AgentId) -> Option<&TeamId> {
        env.teams.team_of(id)
    }

    /// Every team in creation order.
    pub fn teams(env: &Environment) -> impl Iterator<Item = &Team> {
        env.teams.iter()
    }

    /// Agent registered under `id`, dead or alive.
    #[must_use]
    pub fn agent(env: &Environment, id: AgentId) -> Option<&dyn Agent> {
        env.agents.get(&id).map(|agent| &**agent)
    }

    /// Living agents in ascending identifier order.
    pub fn living_agents(env: &Environment) -> impl Iterator<Item = &dyn Agent> {
        env.agents
            .values()
            .filter(|agent| agent.is_alive())
            .map(|agent| &**agent)
    }

    /// Number of agents on the battlefield, dead or alive.
    #[must_use]
    pub fn agent_count(env: &Environment) -> usize {
        env.agents.len()
    }

    /// Position of the agent as recorded by the spatial index.
    #[must_use]
    pub fn indexed_position(env: &Environment, id: AgentId) -> Option<Vec2> {
        env.index.position(id)
    }

    /// Current battle phase.
    #[must_use]
    pub fn phase(env: &Environment) -> BattlePhase {
        env.lifecycle.phase()
    }

    /// Current run state.
    #[must_use]
    pub fn run_state(env: &Environment) -> RunState {
        env.run_state
    }

    /// Field dimensions.
    #[must_use]
    pub fn bounds(env: &Environment) -> Bounds {
        env.bounds
    }

    /// Configuration the environment was created with.
    #[must_use]
    pub fn config(env: &Environment) -> &ArenaConfig {
        &env.config
    }

    /// Collisions detected by the latest tick or collision check.
    #[must_use]
    pub fn collision_events(env: &Environment) -> &[CollisionEvent] {
        &env.collisions
    }

    /// Projectiles still in flight.
    #[must_use]
    pub fn projectiles(env: &Environment) -> &[Projectile] {
        env.projectiles.as_slice()
    }

    /// Kills recorded since the last reset.
    #[must_use]
    pub fn total_kills(env: &Environment) -> u32 {
        env.lifecycle.total_kills()
    }

    /// Snapshot of battle, team and environment figures.
    #[must_use]
    pub fn statistics(env: &Environment) -> BattleStatistics {
        let living_agents = env.agents.values().filter(|agent| agent.is_alive()).count();
        let total_agents = env.agents.len();

        BattleStatistics {
            phase: env.lifecycle.phase(),
            duration_secs: env.lifecycle.duration(Instant::now()).as_secs_f32(),
            total_agents,
            living_agents,
            teams: env.teams.iter().map(Team::statistics).collect(),
            environment: env
                .metrics
                .report(living_agents, total_agents - living_agents),
        }
    }
}
