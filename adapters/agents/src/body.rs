//! State shared by every agent variant.

use battle_arena_core::{AgentId, TeamId};
use glam::Vec2;

/// Fixed characteristics of an agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentStats {
    /// Health of a fresh agent.
    pub max_health: f32,
    /// Top speed in world units per second.
    pub speed: f32,
    /// Distance at which the agent can strike an enemy.
    pub attack_range: f32,
}

impl Default for AgentStats {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            speed: 50.0,
            attack_range: 30.0,
        }
    }
}

/// Position, health and team tag of an agent.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentBody {
    id: AgentId,
    position: Vec2,
    health: f32,
    stats: AgentStats,
    team: Option<TeamId>,
}

impl AgentBody {
    /// Creates a body at full health at the origin. The environment moves it
    /// onto its spawn point when the agent is added.
    #[must_use]
    pub fn new(id: AgentId, stats: AgentStats) -> Self {
        Self {
            id,
            position: Vec2::ZERO,
            health: stats.max_health,
            stats,
            team: None,
        }
    }

    /// Identifier of the agent.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Overwrites the position.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Reports whether health remains.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Fixed characteristics.
    #[must_use]
    pub const fn stats(&self) -> &AgentStats {
        &self.stats
    }

    /// Team tag.
    #[must_use]
    pub fn team(&self) -> Option<&TeamId> {
        self.team.as_ref()
    }

    /// Replaces the team tag.
    pub fn set_team(&mut self, team: Option<TeamId>) {
        self.team = team;
    }

    /// Subtracts `amount` from health, never dropping below zero.
    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount.max(0.0)).max(0.0);
    }

    /// Restores up to `amount` health, capped at the maximum. Dead agents
    /// stay dead.
    pub fn heal(&mut self, amount: f32) {
        if self.is_alive() {
            self.health = (self.health + amount.max(0.0)).min(self.stats.max_health);
        }
    }

    /// Moves towards `target` by at most `distance`, stopping on it.
    /// Returns `true` once the target is reached.
    pub fn step_towards(&mut self, target: Vec2, distance: f32) -> bool {
        let offset = target - self.position;
        let remaining = offset.length();
        if remaining <= distance {
            self.position = target;
            return true;
        }
        self.position += offset / remaining * distance;
        false
    }

    /// Moves by `distance` along `direction`. Zero directions are ignored.
    pub fn step_along(&mut self, direction: Vec2, distance: f32) {
        if let Some(unit) = direction.try_normalize() {
            self.position += unit * distance;
        }
    }
}
