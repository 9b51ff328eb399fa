//! Aggregate statistics reported by the environment.

use serde::Serialize;

use crate::{BattlePhase, TeamId};

/// Summary of the battle and the environment that runs it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BattleStatistics {
    /// Current battle phase.
    pub phase: BattlePhase,
    /// Wall-clock seconds spent in active combat: elapsed so far while the
    /// battle runs, the final duration once it ended.
    pub duration_secs: f32,
    /// Number of agents in the environment, dead or alive.
    pub total_agents: usize,
    /// Number of living agents.
    pub living_agents: usize,
    /// Per-team figures in creation order.
    pub teams: Vec<TeamStatistics>,
    /// Environment counters.
    pub environment: EnvironmentMetricsReport,
}

impl BattleStatistics {
    /// Figures for a single team.
    #[must_use]
    pub fn team(&self, id: &TeamId) -> Option<&TeamStatistics> {
        self.teams.iter().find(|team| &team.id == id)
    }
}

/// Figures describing a single team.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TeamStatistics {
    /// Team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Current number of members.
    pub agent_count: usize,
    /// Score computed when the battle last ended.
    pub score: u32,
    /// Kills credited to the team.
    pub kills: u32,
    /// Members removed from the battle.
    pub deaths: u32,
}

/// Environment level counters.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnvironmentMetricsReport {
    /// Ticks processed since the last reset.
    pub frame_count: u64,
    /// Simulated seconds processed since the last reset.
    pub simulation_time: f32,
    /// Wall-clock seconds since the environment was created or last reset.
    pub real_time_elapsed_secs: f32,
    /// Ticks per wall-clock second since the last reset.
    pub average_fps: f32,
    /// Collisions detected since the last reset.
    pub total_collisions: u64,
    /// Agents admitted since the last reset.
    pub agents_spawned: u64,
    /// Agents removed since the last reset.
    pub agents_removed: u64,
    /// Agents in the environment whose alive flag is set.
    pub agents_alive: usize,
    /// Agents still in the environment whose alive flag is cleared.
    pub agents_dead: usize,
    /// Mean wall-clock seconds per tick over the recent window.
    pub average_update_secs: Option<f32>,
    /// Mean wall-clock seconds per collision pass over the recent window.
    pub average_collision_check_secs: Option<f32>,
}
