//! Capability contract implemented by every agent placed on the battlefield.

use std::fmt;

use glam::Vec2;

use crate::{AgentId, Observation, TeamId};

/// Behaviour the environment requires from an agent.
///
/// The environment owns agents exclusively and only ever talks to them
/// through this trait. An agent is the single source of truth for its own
/// position; the environment reads it back after every turn, clamps it onto
/// the field and keeps its spatial index in sync. Agents are `Send` so a
/// whole environment can be moved to another thread.
pub trait Agent: fmt::Debug + Send {
    /// Identifier that stays stable for the agent's lifetime.
    fn id(&self) -> AgentId;

    /// Current position in field coordinates.
    fn position(&self) -> Vec2;

    /// Overwrites the agent's position.
    fn set_position(&mut self, position: Vec2);

    /// Remaining health.
    fn health(&self) -> f32;

    /// Reports whether the agent still takes part in the battle.
    fn is_alive(&self) -> bool;

    /// Team tag carried by the agent.
    fn team(&self) -> Option<&TeamId>;

    /// Replaces the agent's team tag.
    fn set_team(&mut self, team: Option<TeamId>);

    /// Runs one turn. The agent may move itself and change its own health.
    ///
    /// Returning an [`AgentError`] skips the rest of the agent's turn: the
    /// environment logs it and carries on with the next agent. Panics are
    /// not caught. A panic unwinds through the environment's tick, so
    /// agents must report failures as errors.
    fn update(&mut self, dt: f32, observation: &Observation) -> Result<(), AgentError>;
}

/// Failures an agent may report from its turn.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AgentError {
    /// The agent detected an internal inconsistency and gave up its turn.
    #[error("agent {agent} reached an invalid state: {reason}")]
    InvalidState {
        /// Failing agent.
        agent: AgentId,
        /// Human readable description.
        reason: String,
    },
    /// The agent reported a position with a NaN or infinite component.
    #[error("agent {agent} reported a non-finite position {position}")]
    NonFinitePosition {
        /// Failing agent.
        agent: AgentId,
        /// Offending position.
        position: Vec2,
    },
}
