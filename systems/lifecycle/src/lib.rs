#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Battle phase state machine together with end detection and scoring.
//!
//! The controller never looks at agents or teams directly. Callers report
//! how many distinct teams still field a living member and hand the per-team
//! tallies to [`conclude`] once the battle ends.

use std::time::{Duration, Instant};

use battle_arena_core::{BattlePhase, TeamId};

/// Points awarded for every living team member at the end of a battle.
pub const POINTS_PER_SURVIVOR: u32 = 100;
/// Points awarded for every kill credited to a team.
pub const POINTS_PER_KILL: u32 = 10;

/// Forward-only battle phase machine.
#[derive(Clone, Debug)]
pub struct LifecycleController {
    phase: BattlePhase,
    started_at: Option<Instant>,
    duration: Duration,
    total_kills: u32,
}

impl Default for LifecycleController {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleController {
    /// Creates a controller in the preparation phase.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: BattlePhase::Preparation,
            started_at: None,
            duration: Duration::ZERO,
            total_kills: 0,
        }
    }

    /// Current battle phase.
    #[must_use]
    pub const fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Kills credited since the last reset.
    #[must_use]
    pub const fn total_kills(&self) -> u32 {
        self.total_kills
    }

    /// Duration of the battle: elapsed so far while combat is active, the
    /// final duration afterwards and zero before the start.
    #[must_use]
    pub fn duration(&self, now: Instant) -> Duration {
        match (self.phase, self.started_at) {
            (BattlePhase::ActiveCombat, Some(started_at)) => now.saturating_duration_since(started_at),
            _ => self.duration,
        }
    }

    /// Enters active combat. Returns `false` outside the preparation phase.
    pub fn begin(&mut self, now: Instant) -> bool {
        if self.phase != BattlePhase::Preparation {
            return false;
        }
        self.phase = BattlePhase::ActiveCombat;
        self.started_at = Some(now);
        self.duration = Duration::ZERO;
        true
    }

    /// Leaves active combat for cleanup and freezes the battle duration.
    ///
    /// Returns `None` outside the active combat phase.
    pub fn enter_cleanup(&mut self, now: Instant) -> Option<Duration> {
        if self.phase != BattlePhase::ActiveCombat {
            return None;
        }
        self.duration = self.duration(now);
        self.phase = BattlePhase::Cleanup;
        Some(self.duration)
    }

    /// Marks the results final. Returns `false` outside the cleanup phase.
    pub fn complete(&mut self) -> bool {
        if self.phase != BattlePhase::Cleanup {
            return false;
        }
        self.phase = BattlePhase::Completed;
        true
    }

    /// Reports whether an active battle has run out of opponents.
    #[must_use]
    pub fn should_end(&self, teams_with_living: usize) -> bool {
        self.phase == BattlePhase::ActiveCombat && teams_with_living <= 1
    }

    /// Counts a kill towards the battle total.
    pub fn record_kill(&mut self) {
        self.total_kills = self.total_kills.saturating_add(1);
    }

    /// Returns to the preparation phase and forgets timers and kills.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Final tally of a single team handed to [`conclude`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TeamTally<'a> {
    /// Team identifier.
    pub team: &'a TeamId,
    /// Members still alive at the end of the battle.
    pub living: usize,
    /// Kills credited to the team.
    pub kills: u32,
}

/// Scores of every team in the order they were supplied, plus the winner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Score per team.
    pub scores: Vec<(TeamId, u32)>,
    /// Highest scoring team; the earliest supplied team wins ties.
    pub winner: Option<TeamId>,
}

/// Score earned by a team with `living` surviving members and `kills` kills.
#[must_use]
pub fn score(living: usize, kills: u32) -> u32 {
    let living = u32::try_from(living).unwrap_or(u32::MAX);
    living
        .saturating_mul(POINTS_PER_SURVIVOR)
        .saturating_add(kills.saturating_mul(POINTS_PER_KILL))
}

/// Scores every team and picks the winner.
///
/// Tallies must be supplied in team creation order so ties resolve to the
/// first created team.
#[must_use]
pub fn conclude<'a>(tallies: impl IntoIterator<Item = TeamTally<'a>>) -> Outcome {
    let scores: Vec<(TeamId, u32)> = tallies
        .into_iter()
        .map(|tally| (tally.team.clone(), score(tally.living, tally.kills)))
        .collect();

    let mut winner: Option<&(TeamId, u32)> = None;
    for entry in &scores {
        if winner.map_or(true, |best| entry.1 > best.1) {
            winner = Some(entry);
        }
    }

    Outcome {
        winner: winner.map(|(team, _)| team.clone()),
        scores,
    }
}
