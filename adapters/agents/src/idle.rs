//! Agent that stays where it spawned.

use battle_arena_core::{Agent, AgentError, AgentId, Observation};

use crate::{AgentBody, AgentStats};

/// Agent that never moves. Useful as a target dummy and as a baseline.
#[derive(Clone, Debug)]
pub struct IdleAgent {
    body: AgentBody,
    idle_time: f32,
    turns: u64,
}

impl IdleAgent {
    /// Creates an idle agent with default stats.
    #[must_use]
    pub fn new(id: AgentId) -> Self {
        Self::with_stats(id, AgentStats::default())
    }

    /// Creates an idle agent with the given stats.
    #[must_use]
    pub fn with_stats(id: AgentId, stats: AgentStats) -> Self {
        Self {
            body: AgentBody::new(id, stats),
            idle_time: 0.0,
            turns: 0,
        }
    }

    /// Mutable access to the body, for harnesses that apply damage.
    pub fn body_mut(&mut self) -> &mut AgentBody {
        &mut self.body
    }

    /// Seconds spent idling.
    #[must_use]
    pub const fn idle_time(&self) -> f32 {
        self.idle_time
    }

    /// Turns taken.
    #[must_use]
    pub const fn turns(&self) -> u64 {
        self.turns
    }
}

impl Agent for IdleAgent {
    delegate_to_body!();

    fn update(&mut self, dt: f32, _observation: &Observation) -> Result<(), AgentError> {
        self.idle_time += dt;
        self.turns = self.turns.saturating_add(1);
        Ok(())
    }
}
