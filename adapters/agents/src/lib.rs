#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ready-made agents that plug into the battle arena.
//!
//! Every agent wraps an [`AgentBody`] holding the state the environment
//! reads back after each turn and adds its own decision making on top:
//! [`IdleAgent`] never moves, [`WanderAgent`] roams in random directions,
//! [`ChaseAgent`] hunts the nearest visible enemy and [`ScriptedAgent`]
//! walks a fixed list of waypoints.

/// Implements the state accessors of [`battle_arena_core::Agent`] by
/// delegating to a `body` field.
macro_rules! delegate_to_body {
    () => {
        fn id(&self) -> battle_arena_core::AgentId {
            self.body.id()
        }

        fn position(&self) -> glam::Vec2 {
            self.body.position()
        }

        fn set_position(&mut self, position: glam::Vec2) {
            self.body.set_position(position);
        }

        fn health(&self) -> f32 {
            self.body.health()
        }

        fn is_alive(&self) -> bool {
            self.body.is_alive()
        }

        fn team(&self) -> Option<&battle_arena_core::TeamId> {
            self.body.team()
        }

        fn set_team(&mut self, team: Option<battle_arena_core::TeamId>) {
            self.body.set_team(team);
        }
    };
}

mod body;
mod chase;
mod idle;
mod scripted;
mod wander;

pub use body::{AgentBody, AgentStats};
pub use chase::ChaseAgent;
pub use idle::IdleAgent;
pub use scripted::ScriptedAgent;
pub use wander::WanderAgent;
