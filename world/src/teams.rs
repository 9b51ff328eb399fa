//! Team records and the agent to team mapping.

use std::collections::{BTreeSet, HashMap};

use battle_arena_core::{AgentId, SpawnArea, TeamColor, TeamId, TeamStatistics};

/// Named, colored group of agents sharing a spawn area and a score.
#[derive(Clone, Debug, PartialEq)]
pub struct Team {
    id: TeamId,
    name: String,
    color: TeamColor,
    spawn_area: Option<SpawnArea>,
    members: BTreeSet<AgentId>,
    score: u32,
    kills: u32,
    deaths: u32,
}

impl Team {
    pub(crate) fn new(id: TeamId, name: &str, color: TeamColor, spawn_area: SpawnArea) -> Self {
        let name = if name.is_empty() {
            id.as_str().to_owned()
        } else {
            name.to_owned()
        };

        Self {
            id,
            name,
            color,
            spawn_area: Some(spawn_area),
            members: BTreeSet::new(),
            score: 0,
            kills: 0,
            deaths: 0,
        }
    }

    /// Unique identifier of the team.
    #[must_use]
    pub fn id(&self) -> &TeamId {
        &self.id
    }

    /// Display name; the identifier when created without one.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display color.
    #[must_use]
    pub const fn color(&self) -> TeamColor {
        self.color
    }

    /// Rectangle assigned by the spawn strategy when the team was created.
    #[must_use]
    pub const fn spawn_area(&self) -> Option<SpawnArea> {
        self.spawn_area
    }

    /// Members in ascending identifier order.
    pub fn members(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.members.iter().copied()
    }

    /// Reports whether the agent belongs to the team.
    #[must_use]
    pub fn contains(&self, agent: AgentId) -> bool {
        self.members.contains(&agent)
    }

    /// Number of current members, dead or alive.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.members.len()
    }

    /// Score computed when the battle last ended.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Kills credited to the team.
    #[must_use]
    pub const fn kills(&self) -> u32 {
        self.kills
    }

    /// Members removed from the battle.
    #[must_use]
    pub const fn deaths(&self) -> u32 {
        self.deaths
    }

    pub(crate) fn statistics(&self) -> TeamStatistics {
        TeamStatistics {
            id: self.id.clone(),
            name: self.name.clone(),
            agent_count: self.agent_count(),
            score: self.score,
            kills: self.kills,
            deaths: self.deaths,
        }
    }
}

/// Owns every team in creation order together with the agent to team map.
///
/// Membership and the map are only ever changed together, so an agent is
/// listed by at most one team and the map always agrees with the rosters.
#[derive(Debug, Default)]
pub(crate) struct TeamRegistry {
    teams: Vec<Team>,
    agent_teams: HashMap<AgentId, TeamId>,
}

impl TeamRegistry {
    pub(crate) fn len(&self) -> usize {
        self.teams.len()
    }

    pub(crate) fn contains(&self, id: &TeamId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn get(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|team| &team.id == id)
    }

    fn get_mut(&mut self, id: &TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|team| &team.id == id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter()
    }

    pub(crate) fn insert(&mut self, team: Team) {
        debug_assert!(!self.contains(&team.id), "team {} registered twice", team.id);
        self.teams.push(team);
    }

    pub(crate) fn team_of(&self, agent: AgentId) -> Option<&TeamId> {
        self.agent_teams.get(&agent)
    }

    /// Adds the agent to the team's roster. Returns `false` for unknown teams.
    pub(crate) fn assign(&mut self, agent: AgentId, team: &TeamId) -> bool {
        if let Some(previous) = self.agent_teams.get(&agent).cloned() {
            if let Some(record) = self.get_mut(&previous) {
                let _ = record.members.remove(&agent);
            }
        }

        let Some(record) = self.get_mut(team) else {
            let _ = self.agent_teams.remove(&agent);
            return false;
        };
        let _ = record.members.insert(agent);
        let _ = self.agent_teams.insert(agent, team.clone());
        true
    }

    /// Drops the agent from its team, counting a death. Returns the team the
    /// agent belonged to.
    pub(crate) fn release(&mut self, agent: AgentId) -> Option<TeamId> {
        let team = self.agent_teams.remove(&agent)?;
        if let Some(record) = self.get_mut(&team) {
            let _ = record.members.remove(&agent);
            record.deaths = record.deaths.saturating_add(1);
        }
        Some(team)
    }

    /// Credits a kill to the team. Returns `false` for unknown teams.
    pub(crate) fn credit_kill(&mut self, team: &TeamId) -> bool {
        match self.get_mut(team) {
            Some(record) => {
                record.kills = record.kills.saturating_add(1);
                true
            }
            None => false,
        }
    }

    pub(crate) fn apply_scores(&mut self, scores: &[(TeamId, u32)]) {
        for (team, score) in scores {
            if let Some(record) = self.get_mut(team) {
                record.score = *score;
            }
        }
    }

    /// Current score of every team in creation order.
    pub(crate) fn scores(&self) -> Vec<(TeamId, u32)> {
        self.teams
            .iter()
            .map(|team| (team.id.clone(), team.score))
            .collect()
    }

    /// Empties every roster and zeroes every counter. Team definitions stay.
    pub(crate) fn reset_rosters(&mut self) {
        for team in &mut self.teams {
            team.members.clear();
            team.score = 0;
            team.kills = 0;
            team.deaths = 0;
        }
        self.agent_teams.clear();
    }

    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let listed: usize = self.teams.iter().map(Team::agent_count).sum();
        listed == self.agent_teams.len()
            && self.agent_teams.iter().all(|(agent, team)| {
                self.teams
                    .iter()
                    .all(|record| record.contains(*agent) == (&record.id == team))
            })
    }
}
