//! Agent that follows a fixed route.

use battle_arena_core::{Agent, AgentError, AgentId, Observation};
use glam::Vec2;

use crate::{AgentBody, AgentStats};

/// Agent that walks through a list of waypoints at top speed.
///
/// A looping route starts over after the last waypoint; otherwise the agent
/// stays on the final waypoint.
#[derive(Clone, Debug)]
pub struct ScriptedAgent {
    body: AgentBody,
    waypoints: Vec<Vec2>,
    next: usize,
    looping: bool,
}

impl ScriptedAgent {
    /// Creates an agent that walks `waypoints` in order.
    #[must_use]
    pub fn new(id: AgentId, stats: AgentStats, waypoints: Vec<Vec2>, looping: bool) -> Self {
        Self {
            body: AgentBody::new(id, stats),
            waypoints,
            next: 0,
            looping,
        }
    }

    /// Waypoint the agent is heading for, if the route is not finished.
    #[must_use]
    pub fn next_waypoint(&self) -> Option<Vec2> {
        self.waypoints.get(self.next).copied()
    }

    /// Reports whether a non-looping route has been completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.next >= self.waypoints.len()
    }
}

impl Agent for ScriptedAgent {
    delegate_to_body!();

    fn update(&mut self, dt: f32, _observation: &Observation) -> Result<(), AgentError> {
        let Some(waypoint) = self.next_waypoint() else {
            return Ok(());
        };
        if !waypoint.is_finite() {
            return Err(AgentError::InvalidState {
                agent: self.body.id(),
                reason: format!("waypoint {} is not finite", self.next),
            });
        }

        let step = self.body.stats().speed * dt;
        if self.body.step_towards(waypoint, step) {
            self.next += 1;
            if self.looping && self.next == self.waypoints.len() {
                self.next = 0;
            }
        }
        Ok(())
    }
}
