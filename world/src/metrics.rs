//! Frame counters and rolling timing windows for the environment.

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use battle_arena_core::EnvironmentMetricsReport;

/// Number of timing samples kept per window.
pub(crate) const TIMING_WINDOW: usize = 100;

#[derive(Clone, Debug)]
pub(crate) struct Metrics {
    started_at: Instant,
    real_time_elapsed: Duration,
    frame_count: u64,
    simulation_time: f32,
    total_collisions: u64,
    agents_spawned: u64,
    agents_removed: u64,
    update_times: VecDeque<Duration>,
    collision_check_times: VecDeque<Duration>,
}

impl Metrics {
    pub(crate) fn new(now: Instant) -> Self {
        Self {
            started_at: now,
            real_time_elapsed: Duration::ZERO,
            frame_count: 0,
            simulation_time: 0.0,
            total_collisions: 0,
            agents_spawned: 0,
            agents_removed: 0,
            update_times: VecDeque::with_capacity(TIMING_WINDOW),
            collision_check_times: VecDeque::with_capacity(TIMING_WINDOW),
        }
    }

    pub(crate) const fn simulation_time(&self) -> f32 {
        self.simulation_time
    }

    pub(crate) fn record_spawn(&mut self) {
        self.agents_spawned = self.agents_spawned.saturating_add(1);
    }

    pub(crate) fn record_removal(&mut self) {
        self.agents_removed = self.agents_removed.saturating_add(1);
    }

    pub(crate) fn record_collisions(&mut self, detected: usize) {
        self.total_collisions = self.total_collisions.saturating_add(detected as u64);
    }

    pub(crate) fn record_collision_check(&mut self, elapsed: Duration) {
        push_sample(&mut self.collision_check_times, elapsed);
    }

    /// Closes a tick that simulated `dt` seconds and took `elapsed` of wall
    /// clock time.
    pub(crate) fn record_tick(&mut self, dt: f32, elapsed: Duration, now: Instant) {
        push_sample(&mut self.update_times, elapsed);
        self.frame_count = self.frame_count.saturating_add(1);
        self.simulation_time += dt;
        self.real_time_elapsed = now.saturating_duration_since(self.started_at);
    }

    pub(crate) fn average_fps(&self) -> f32 {
        let elapsed = self.real_time_elapsed.as_secs_f32();
        if elapsed > 0.0 {
            self.frame_count as f32 / elapsed
        } else {
            0.0
        }
    }

    pub(crate) fn report(&self, agents_alive: usize, agents_dead: usize) -> EnvironmentMetricsReport {
        EnvironmentMetricsReport {
            frame_count: self.frame_count,
            simulation_time: self.simulation_time,
            real_time_elapsed_secs: self.real_time_elapsed.as_secs_f32(),
            average_fps: self.average_fps(),
            total_collisions: self.total_collisions,
            agents_spawned: self.agents_spawned,
            agents_removed: self.agents_removed,
            agents_alive,
            agents_dead,
            average_update_secs: mean_secs(&self.update_times),
            average_collision_check_secs: mean_secs(&self.collision_check_times),
        }
    }
}

fn push_sample(window: &mut VecDeque<Duration>, sample: Duration) {
    if window.len() == TIMING_WINDOW {
        let _ = window.pop_front();
    }
    window.push_back(sample);
}

fn mean_secs(window: &VecDeque<Duration>) -> Option<f32> {
    if window.is_empty() {
        return None;
    }
    let total: Duration = window.iter().sum();
    Some(total.as_secs_f32() / window.len() as f32)
}
