//! Per-agent view of the battlefield handed to agents on their turn.

use glam::Vec2;

use crate::{AgentId, BattlePhase, Bounds, TeamId};

/// Snapshot of everything an agent may know when it takes its turn.
///
/// Built fresh for every turn; it reflects positions of agents that already
/// moved earlier in the same tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    /// Dimensions of the battlefield.
    pub bounds: Bounds,
    /// Position of the observing agent.
    pub position: Vec2,
    /// Team of the observing agent, if any.
    pub team: Option<TeamId>,
    /// Living agents within vision range, nearest first.
    pub visible: Vec<VisibleAgent>,
    /// Current battle phase.
    pub phase: BattlePhase,
    /// Simulated seconds elapsed since the environment started.
    pub simulation_time: f32,
    /// Current score of every team in creation order.
    pub team_scores: Vec<(TeamId, u32)>,
    /// Radius below which two agents collide.
    pub collision_radius: f32,
    /// Maximum distance at which agents are visible.
    pub vision_range: f32,
}

impl Observation {
    /// Visible agents classified as enemies, nearest first.
    pub fn enemies(&self) -> impl Iterator<Item = &VisibleAgent> {
        self.visible.iter().filter(|other| other.is_enemy)
    }

    /// Visible agents classified as allies, nearest first.
    pub fn allies(&self) -> impl Iterator<Item = &VisibleAgent> {
        self.visible.iter().filter(|other| !other.is_enemy)
    }

    /// Closest visible enemy.
    #[must_use]
    pub fn nearest_enemy(&self) -> Option<&VisibleAgent> {
        self.enemies().next()
    }

    /// Score reported for the given team.
    #[must_use]
    pub fn score_of(&self, team: &TeamId) -> Option<u32> {
        self.team_scores
            .iter()
            .find(|(id, _)| id == team)
            .map(|(_, score)| *score)
    }
}

/// Another agent seen by the observer.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleAgent {
    /// Identifier of the seen agent.
    pub id: AgentId,
    /// Position of the seen agent.
    pub position: Vec2,
    /// Remaining health of the seen agent.
    pub health: f32,
    /// Team of the seen agent, if any.
    pub team: Option<TeamId>,
    /// True unless both agents belong to the same known team.
    pub is_enemy: bool,
    /// Distance from the observer.
    pub distance: f32,
}
