#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that detects overlapping agents and computes how to push them
//! apart.

use std::collections::HashSet;

use battle_arena_core::{AgentId, CollisionEvent, CollisionKind};
use battle_arena_system_spatial::SpatialIndex;
use glam::Vec2;

/// Normal used when two agents occupy exactly the same point.
pub const COINCIDENT_NORMAL: Vec2 = Vec2::X;

/// Configuration parameters required to construct the collision detector.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    collision_radius: f32,
    enabled: bool,
}

impl Config {
    /// Creates a configuration with the given collision radius.
    #[must_use]
    pub const fn new(collision_radius: f32, enabled: bool) -> Self {
        Self {
            collision_radius,
            enabled,
        }
    }
}

/// Collision detector that reuses scratch buffers between ticks.
#[derive(Debug)]
pub struct CollisionDetector {
    collision_radius: f32,
    enabled: bool,
    neighbours: Vec<AgentId>,
    checked: HashSet<PairKey>,
}

impl CollisionDetector {
    /// Creates a new detector using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            collision_radius: config.collision_radius,
            enabled: config.enabled,
            neighbours: Vec::new(),
            checked: HashSet::new(),
        }
    }

    /// Distance below which two agents collide.
    #[must_use]
    pub const fn collision_radius(&self) -> f32 {
        self.collision_radius
    }

    /// Reports whether detection runs at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Detects every pair of living agents closer than the collision radius.
    ///
    /// `living` must list the living agents in ascending identifier order;
    /// their positions are read from `index`. Each unordered pair appears at
    /// most once in `out`, with the lower identifier first. The output buffer
    /// is cleared before populating it.
    pub fn detect(&mut self, living: &[AgentId], index: &SpatialIndex, out: &mut Vec<CollisionEvent>) {
        out.clear();
        if !self.enabled {
            return;
        }

        debug_assert!(
            living.windows(2).all(|pair| pair[0] < pair[1]),
            "living agents must be sorted and unique"
        );

        self.checked.clear();
        let search_radius = self.collision_radius * 2.0;

        for &id in living {
            let Some(position) = index.position(id) else {
                continue;
            };
            index.query_radius_into(position, search_radius, &mut self.neighbours);

            for &other in &self.neighbours {
                if other == id || living.binary_search(&other).is_err() {
                    continue;
                }
                if !self.checked.insert(PairKey::new(id, other)) {
                    continue;
                }
                let Some(other_position) = index.position(other) else {
                    continue;
                };

                let distance = position.distance(other_position);
                if distance < self.collision_radius {
                    out.push(CollisionEvent {
                        kind: CollisionKind::AgentAgent,
                        first: id,
                        second: other,
                        point: position.lerp(other_position, 0.5),
                        normal: (other_position - position)
                            .try_normalize()
                            .unwrap_or(COINCIDENT_NORMAL),
                        distance,
                    });
                }
            }
        }
    }

    /// Pushes both participants apart along the event normal.
    ///
    /// Each side moves by half of the remaining overlap, measured from the
    /// positions passed in. Participants that no longer overlap stay put.
    /// Callers clamp the results onto the field.
    #[must_use]
    pub fn separate(&self, event: &CollisionEvent, first: Vec2, second: Vec2) -> (Vec2, Vec2) {
        let overlap = (self.collision_radius - first.distance(second)).max(0.0);
        let push = event.normal * (overlap / 2.0);
        (first - push, second + push)
    }
}

/// Unordered pair of agents, stored lowest identifier first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PairKey {
    low: AgentId,
    high: AgentId,
}

impl PairKey {
    fn new(a: AgentId, b: AgentId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}
