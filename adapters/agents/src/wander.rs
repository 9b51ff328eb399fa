//! Agent that roams in random directions.

use std::f32::consts::TAU;

use battle_arena_core::{Agent, AgentError, AgentId, Observation};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{AgentBody, AgentStats};

/// Seconds between direction changes.
const DIRECTION_CHANGE_INTERVAL: f32 = 0.5;
/// Slowest fraction of top speed a wanderer may pick.
const MIN_SPEED_FACTOR: f32 = 0.5;

/// Agent that picks a new random heading and pace every half second.
///
/// Headings that would carry the agent off the field are mirrored back
/// towards its centre.
#[derive(Clone, Debug)]
pub struct WanderAgent {
    body: AgentBody,
    rng: ChaCha8Rng,
    heading: Vec2,
    pace: f32,
    since_change: f32,
}

impl WanderAgent {
    /// Creates a wanderer whose choices are driven by `seed`.
    #[must_use]
    pub fn new(id: AgentId, stats: AgentStats, seed: u64) -> Self {
        Self {
            body: AgentBody::new(id, stats),
            rng: ChaCha8Rng::seed_from_u64(seed),
            heading: Vec2::ZERO,
            pace: 0.0,
            since_change: DIRECTION_CHANGE_INTERVAL,
        }
    }

    /// Current unit heading; zero before the first turn.
    #[must_use]
    pub const fn heading(&self) -> Vec2 {
        self.heading
    }

    fn pick_heading(&mut self) {
        self.heading = Vec2::from_angle(self.rng.gen_range(0.0..TAU));
        self.pace = self.rng.gen_range(MIN_SPEED_FACTOR..=1.0);
        self.since_change = 0.0;
    }
}

impl Agent for WanderAgent {
    delegate_to_body!();

    fn update(&mut self, dt: f32, observation: &Observation) -> Result<(), AgentError> {
        self.since_change += dt;
        if self.since_change >= DIRECTION_CHANGE_INTERVAL {
            self.pick_heading();
        }

        let distance = self.body.stats().speed * self.pace * dt;
        let next = self.body.position() + self.heading * distance;
        let bounds = observation.bounds;
        if !(0.0..=bounds.width()).contains(&next.x) {
            self.heading.x = -self.heading.x;
        }
        if !(0.0..=bounds.height()).contains(&next.y) {
            self.heading.y = -self.heading.y;
        }

        self.body.step_along(self.heading, distance);
        Ok(())
    }
}
