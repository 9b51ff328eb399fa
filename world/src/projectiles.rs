//! Ballistic projectiles tracked by the environment.
//!
//! Projectiles fly in a straight line until they leave the field or run out
//! of lifetime. Nothing resolves hits against agents.

use battle_arena_core::{AgentId, Bounds};
use glam::Vec2;

/// Projectile travelling across the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    /// Agent that launched the projectile.
    pub owner: AgentId,
    /// Current position.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Seconds the projectile may still fly.
    pub remaining: f32,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Projectiles {
    active: Vec<Projectile>,
}

impl Projectiles {
    pub(crate) fn as_slice(&self) -> &[Projectile] {
        &self.active
    }

    pub(crate) fn launch(&mut self, projectile: Projectile) {
        self.active.push(projectile);
    }

    /// Moves every projectile and drops the ones that expired or left the
    /// field. Returns how many were dropped.
    pub(crate) fn advance(&mut self, dt: f32, bounds: &Bounds) -> usize {
        let before = self.active.len();
        self.active.retain_mut(|projectile| {
            projectile.position += projectile.velocity * dt;
            projectile.remaining -= dt;
            projectile.remaining > 0.0 && bounds.contains(projectile.position)
        });
        before - self.active.len()
    }

    pub(crate) fn clear(&mut self) {
        self.active.clear();
    }
}
