//! Agent that hunts the nearest visible enemy.

use std::f32::consts::TAU;

use battle_arena_core::{Agent, AgentError, AgentId, Observation};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{AgentBody, AgentStats};

/// Fraction of top speed used while no enemy is visible.
const SEARCH_SPEED_FACTOR: f32 = 0.3;
/// Seconds between search heading changes.
const SEARCH_TURN_INTERVAL: f32 = 1.0;

/// Reactive agent that closes in on the nearest enemy it can see.
///
/// It slows down inside twice its attack range and again inside the
/// attack range, and stops on the enemy's position rather than passing
/// it. Without a visible enemy it searches along a random heading.
#[derive(Clone, Debug)]
pub struct ChaseAgent {
    body: AgentBody,
    rng: ChaCha8Rng,
    target: Option<AgentId>,
    search_heading: Vec2,
    since_turn: f32,
}

impl ChaseAgent {
    /// Creates a chaser whose search headings are driven by `seed`.
    #[must_use]
    pub fn new(id: AgentId, stats: AgentStats, seed: u64) -> Self {
        Self {
            body: AgentBody::new(id, stats),
            rng: ChaCha8Rng::seed_from_u64(seed),
            target: None,
            search_heading: Vec2::ZERO,
            since_turn: SEARCH_TURN_INTERVAL,
        }
    }

    /// Enemy pursued during the latest turn.
    #[must_use]
    pub const fn target(&self) -> Option<AgentId> {
        self.target
    }

    fn speed_factor(&self, distance: f32) -> f32 {
        let range = self.body.stats().attack_range;
        if distance <= range {
            0.5
        } else if distance <= range * 2.0 {
            0.8
        } else {
            1.0
        }
    }
}

impl Agent for ChaseAgent {
    delegate_to_body!();

    fn update(&mut self, dt: f32, observation: &Observation) -> Result<(), AgentError> {
        let speed = self.body.stats().speed;

        let Some(enemy) = observation.nearest_enemy() else {
            if self.target.take().is_some() {
                debug!(agent = %self.body.id(), "target lost");
            }
            self.since_turn += dt;
            if self.since_turn >= SEARCH_TURN_INTERVAL {
                self.search_heading = Vec2::from_angle(self.rng.gen_range(0.0..TAU));
                self.since_turn = 0.0;
            }
            self.body
                .step_along(self.search_heading, speed * SEARCH_SPEED_FACTOR * dt);
            return Ok(());
        };

        if self.target != Some(enemy.id) {
            debug!(agent = %self.body.id(), target = %enemy.id, "target acquired");
            self.target = Some(enemy.id);
        }

        let step = speed * self.speed_factor(enemy.distance) * dt;
        let _ = self.body.step_towards(enemy.position, step);
        Ok(())
    }
}
