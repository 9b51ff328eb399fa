#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system that shapes team spawn areas and samples spawn points.

use std::f32::consts::TAU;

use battle_arena_core::{Bounds, SpawnArea, SpawnStrategy};
use glam::Vec2;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

/// Number of candidate spawn points along each axis for predefined spawning.
pub const PREDEFINED_GRID: usize = 8;
/// Half the edge length of the square claimed around a predefined point.
pub const PREDEFINED_HALF_SIZE: f32 = 100.0;

const OPPOSITE_LEFT_EDGE: f32 = 0.3;
const OPPOSITE_RIGHT_EDGE: f32 = 0.7;
const CORNER_NEAR_EDGE: f32 = 0.4;
const CORNER_FAR_EDGE: f32 = 0.6;
const CIRCLE_RING_RADIUS: f32 = 0.35;
const CIRCLE_HALF_SIZE: f32 = 0.15;
const CIRCLE_SAMPLE_MIN_RADIUS: f32 = 50.0;
const CIRCLE_SAMPLE_MAX_RADIUS: f32 = 0.3;

/// Configuration parameters required to construct the spawn planner.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    strategy: SpawnStrategy,
    bounds: Bounds,
    margin: f32,
    rng_seed: Option<u64>,
}

impl Config {
    /// Creates a configuration for the given field. Without a seed the
    /// planner draws its seed from the operating system.
    #[must_use]
    pub const fn new(
        strategy: SpawnStrategy,
        bounds: Bounds,
        margin: f32,
        rng_seed: Option<u64>,
    ) -> Self {
        Self {
            strategy,
            bounds,
            margin,
            rng_seed,
        }
    }
}

/// Computes spawn areas for teams and concrete spawn points for agents.
#[derive(Debug)]
pub struct SpawnPlanner {
    strategy: SpawnStrategy,
    bounds: Bounds,
    margin: f32,
    spawn_points: Vec<Vec2>,
    rng: ChaCha8Rng,
}

impl SpawnPlanner {
    /// Creates a new planner using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = config
            .rng_seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);

        Self {
            strategy: config.strategy,
            bounds: config.bounds,
            margin: config.margin,
            spawn_points: predefined_points(config.bounds, config.margin),
            rng,
        }
    }

    /// Active spawn strategy.
    #[must_use]
    pub const fn strategy(&self) -> SpawnStrategy {
        self.strategy
    }

    /// Candidate points used by predefined spawning, column by column.
    #[must_use]
    pub fn spawn_points(&self) -> &[Vec2] {
        &self.spawn_points
    }

    /// Rectangle that keeps the spawn margin away from every edge.
    #[must_use]
    pub fn playable_area(&self) -> SpawnArea {
        self.bounds.playable_area(self.margin)
    }

    /// Spawn area for a newly created team.
    ///
    /// `team_count` is the number of registered teams including the new one,
    /// so the first team passes `1`. The result is clamped to the playable
    /// area; it may be malformed when the strategy's rectangle lies entirely
    /// inside the margin, which [`SpawnPlanner::resolve_position`] tolerates.
    #[must_use]
    pub fn assign_area(&self, team_count: usize) -> SpawnArea {
        let ordinal = team_count.max(1);
        let playable = self.playable_area();
        let width = self.bounds.width();
        let height = self.bounds.height();
        let margin = self.margin;

        let area = match self.strategy {
            SpawnStrategy::TeamsOpposite => match ordinal {
                1 => SpawnArea::new(
                    Vec2::new(margin, margin),
                    Vec2::new(width * OPPOSITE_LEFT_EDGE, height - margin),
                ),
                2 => SpawnArea::new(
                    Vec2::new(width * OPPOSITE_RIGHT_EDGE, margin),
                    Vec2::new(width - margin, height - margin),
                ),
                _ => playable,
            },
            SpawnStrategy::Corners => {
                let corners = [
                    SpawnArea::new(
                        Vec2::new(margin, margin),
                        Vec2::new(width * CORNER_NEAR_EDGE, height * CORNER_NEAR_EDGE),
                    ),
                    SpawnArea::new(
                        Vec2::new(width * CORNER_FAR_EDGE, margin),
                        Vec2::new(width - margin, height * CORNER_NEAR_EDGE),
                    ),
                    SpawnArea::new(
                        Vec2::new(margin, height * CORNER_FAR_EDGE),
                        Vec2::new(width * CORNER_NEAR_EDGE, height - margin),
                    ),
                    SpawnArea::new(
                        Vec2::new(width * CORNER_FAR_EDGE, height * CORNER_FAR_EDGE),
                        Vec2::new(width - margin, height - margin),
                    ),
                ];
                corners.get(ordinal - 1).copied().unwrap_or(playable)
            }
            SpawnStrategy::Circle => {
                let shortest = self.bounds.min_dimension();
                let step = TAU / ordinal as f32;
                let angle = (ordinal - 1) as f32 * step;
                let anchor = self.bounds.center()
                    + Vec2::from_angle(angle) * (shortest * CIRCLE_RING_RADIUS);
                let half = Vec2::splat(shortest * CIRCLE_HALF_SIZE);
                SpawnArea::new(anchor - half, anchor + half)
            }
            SpawnStrategy::Random => playable,
            SpawnStrategy::Predefined => match self.spawn_points.get(ordinal - 1) {
                Some(point) => {
                    let half = Vec2::splat(PREDEFINED_HALF_SIZE);
                    SpawnArea::new(*point - half, *point + half)
                }
                None => playable,
            },
        };

        area.clamped_to(&playable)
    }

    /// Picks a spawn point for an agent joining a team with `team_area`, or
    /// joining no team at all.
    pub fn resolve_position(&mut self, team_area: Option<&SpawnArea>) -> Vec2 {
        match team_area {
            Some(area) if area.is_well_formed() => self.sample_area(area),
            Some(area) => {
                warn!(
                    min = %area.min(),
                    max = %area.max(),
                    "malformed spawn area, sampling the playable area instead"
                );
                self.sample_playable()
            }
            None => match self.strategy {
                SpawnStrategy::Circle => self.sample_ring(),
                SpawnStrategy::Predefined => match self.spawn_points.choose(&mut self.rng) {
                    Some(point) => *point,
                    None => self.sample_playable(),
                },
                SpawnStrategy::Random | SpawnStrategy::TeamsOpposite | SpawnStrategy::Corners => {
                    self.sample_playable()
                }
            },
        }
    }

    /// Uniform sample over the playable area.
    pub fn sample_playable(&mut self) -> Vec2 {
        let playable = self.playable_area();
        self.sample_area(&playable)
    }

    fn sample_area(&mut self, area: &SpawnArea) -> Vec2 {
        Vec2::new(
            sample_between(&mut self.rng, area.min().x, area.max().x),
            sample_between(&mut self.rng, area.min().y, area.max().y),
        )
    }

    fn sample_ring(&mut self) -> Vec2 {
        let angle = sample_between(&mut self.rng, 0.0, TAU);
        let outer = self.bounds.min_dimension() * CIRCLE_SAMPLE_MAX_RADIUS;
        let radius = sample_between(&mut self.rng, CIRCLE_SAMPLE_MIN_RADIUS, outer);
        self.bounds.center() + Vec2::from_angle(angle) * radius
    }
}

fn sample_between(rng: &mut ChaCha8Rng, low: f32, high: f32) -> f32 {
    if high > low {
        rng.gen_range(low..=high)
    } else {
        low
    }
}

fn predefined_points(bounds: Bounds, margin: f32) -> Vec<Vec2> {
    let step = Vec2::new(
        (bounds.width() - 2.0 * margin) / PREDEFINED_GRID as f32,
        (bounds.height() - 2.0 * margin) / PREDEFINED_GRID as f32,
    );

    let mut points = Vec::with_capacity(PREDEFINED_GRID * PREDEFINED_GRID);
    for column in 0..PREDEFINED_GRID {
        for row in 0..PREDEFINED_GRID {
            points.push(Vec2::new(
                margin + column as f32 * step.x + step.x / 2.0,
                margin + row as f32 * step.y + step.y / 2.0,
            ));
        }
    }
    points
}
