#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the battle arena engine.
//!
//! This crate defines the vocabulary that connects the authoritative
//! environment, the pure systems it drives, and the agents plugged into it.
//! Agents implement the [`Agent`] capability trait and receive an
//! [`Observation`] on their turn. The environment records what happened as
//! [`ArenaEvent`] values and reports aggregate results through
//! [`BattleStatistics`]. Everything that references an agent or a team does
//! so through [`AgentId`] and [`TeamId`], never through the objects
//! themselves.

mod agent;
mod config;
mod observation;
mod report;

use std::{fmt, str::FromStr, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use agent::{Agent, AgentError};
pub use config::{ArenaConfig, ConfigError};
pub use observation::{Observation, VisibleAgent};
pub use report::{BattleStatistics, EnvironmentMetricsReport, TeamStatistics};

/// Unique identifier carried by every agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u64);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier chosen by the caller when a team is created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(String);

impl TeamId {
    /// Creates a new team identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TeamId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TeamId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display color assigned to a team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl TeamColor {
    /// Color used when a team is created without an explicit color.
    pub const WHITE: Self = Self::from_rgb(0xff, 0xff, 0xff);

    /// Creates a new team color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Formats the color as an upper-case `#RRGGBB` string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl Default for TeamColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for TeamColor {
    type Err = ColorParseError;

    /// Parses a `#RRGGBB` string. Digits are case-insensitive.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(value.to_owned()))?;
        if digits.len() != 6 {
            return Err(ColorParseError::InvalidLength(value.to_owned()));
        }
        if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(value.to_owned()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ColorParseError::InvalidDigit(value.to_owned()))
        };
        Ok(Self::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Reasons a team color string may fail to parse.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    /// The string does not begin with `#`.
    #[error("color `{0}` must start with `#`")]
    MissingHash(String),
    /// The string does not contain exactly six digits after `#`.
    #[error("color `{0}` must contain exactly six hexadecimal digits")]
    InvalidLength(String),
    /// One of the digits is not hexadecimal.
    #[error("color `{0}` contains a non-hexadecimal digit")]
    InvalidDigit(String),
}

/// Dimensions of the battlefield. The playable field spans
/// `[0, width] × [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    width: f32,
    height: f32,
}

impl Bounds {
    /// Creates a new bounds description.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width of the field in world units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the field in world units.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Center point of the field.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Length of the shorter field edge.
    #[must_use]
    pub fn min_dimension(&self) -> f32 {
        self.width.min(self.height)
    }

    /// Clamps a position onto the field.
    ///
    /// Bounds must be non-negative, which [`ArenaConfig::validate`] enforces.
    #[must_use]
    pub fn clamp(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            position.x.clamp(0.0, self.width),
            position.y.clamp(0.0, self.height),
        )
    }

    /// Reports whether the position lies on the field, edges included.
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        (0.0..=self.width).contains(&position.x) && (0.0..=self.height).contains(&position.y)
    }

    /// Rectangle that keeps `margin` units away from every edge.
    #[must_use]
    pub fn playable_area(&self, margin: f32) -> SpawnArea {
        SpawnArea::new(
            Vec2::new(margin, margin),
            Vec2::new(self.width - margin, self.height - margin),
        )
    }
}

/// Axis-aligned rectangle, expressed by its minimum and maximum corners, in
/// which a team's agents appear.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnArea {
    min: Vec2,
    max: Vec2,
}

impl SpawnArea {
    /// Creates a rectangle from its minimum and maximum corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Minimum corner.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Maximum corner.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Reports whether both corners are finite and ordered on each axis.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
    }

    /// Reports whether the position lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        (self.min.x..=self.max.x).contains(&position.x)
            && (self.min.y..=self.max.y).contains(&position.y)
    }

    /// Intersects the rectangle with `outer`.
    ///
    /// The result is not well formed when the two rectangles are disjoint.
    #[must_use]
    pub fn clamped_to(&self, outer: &SpawnArea) -> Self {
        Self {
            min: self.min.max(outer.min),
            max: self.max.min(outer.max),
        }
    }
}

/// Lifecycle stage of a battle. Phases only ever advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    /// Teams and agents are being set up.
    Preparation,
    /// The battle is running.
    ActiveCombat,
    /// The battle ended and results are being computed.
    Cleanup,
    /// Results are final.
    Completed,
}

impl BattlePhase {
    /// Single legal successor of the phase, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Preparation => Some(Self::ActiveCombat),
            Self::ActiveCombat => Some(Self::Cleanup),
            Self::Cleanup => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Stable snake_case name of the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preparation => "preparation",
            Self::ActiveCombat => "active_combat",
            Self::Cleanup => "cleanup",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for BattlePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the environment currently advances on `update`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Created or reset, not yet started.
    Initializing,
    /// Ticks are processed.
    Running,
    /// Ticks are ignored until resumed.
    Paused,
    /// Stopped after a battle concluded.
    Finished,
}

/// Algorithm that shapes team spawn areas and samples spawn points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnStrategy {
    /// Every team may spawn anywhere on the playable area.
    Random,
    /// The first two teams spawn on opposite vertical bands.
    #[default]
    TeamsOpposite,
    /// The first four teams spawn in the field's quadrants.
    Corners,
    /// Teams spawn around a circle centred on the field.
    Circle,
    /// Teams claim points from a fixed grid of candidate spawn points.
    Predefined,
}

/// Kinds of contact reported by the collision detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    /// Two agents overlap.
    AgentAgent,
}

/// Contact detected between two agents during a single tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionEvent {
    /// Kind of contact.
    pub kind: CollisionKind,
    /// Participant with the lower identifier.
    pub first: AgentId,
    /// Participant with the higher identifier.
    pub second: AgentId,
    /// Midpoint between the two participants at detection time.
    pub point: Vec2,
    /// Unit vector pointing from `first` towards `second`.
    pub normal: Vec2,
    /// Distance between the participants at detection time.
    pub distance: f32,
}

/// Reasons a team creation request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamRejection {
    /// A team with the same identifier already exists.
    Duplicate,
    /// The configured maximum number of teams has been reached.
    CapacityReached,
}

/// Reasons an agent admission request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRejection {
    /// An agent with the same identifier is already present.
    Duplicate,
    /// The configured maximum number of agents has been reached.
    CapacityReached,
}

/// Records emitted by the environment as it processes requests and ticks.
#[derive(Clone, Debug, PartialEq)]
pub enum ArenaEvent {
    /// A team was registered.
    TeamCreated {
        /// Identifier of the new team.
        team: TeamId,
        /// Spawn area assigned by the active strategy.
        spawn_area: SpawnArea,
    },
    /// A team creation request was refused.
    TeamRejected {
        /// Identifier requested by the caller.
        team: TeamId,
        /// Specific reason the request failed.
        reason: TeamRejection,
    },
    /// An agent entered the battlefield.
    AgentSpawned {
        /// Identifier of the agent.
        agent: AgentId,
        /// Clamped spawn position.
        position: Vec2,
        /// Team the agent joined, if any.
        team: Option<TeamId>,
    },
    /// An agent admission request was refused.
    AgentRejected {
        /// Identifier of the refused agent.
        agent: AgentId,
        /// Specific reason the request failed.
        reason: AgentRejection,
    },
    /// An agent left the battlefield.
    AgentRemoved {
        /// Identifier of the removed agent.
        agent: AgentId,
        /// Team the agent belonged to, if any.
        team: Option<TeamId>,
    },
    /// A kill was credited.
    KillRecorded {
        /// Agent credited with the kill.
        killer: AgentId,
        /// Agent that was killed.
        victim: AgentId,
    },
    /// An agent's turn failed and was skipped.
    AgentTurnFailed {
        /// Identifier of the failing agent.
        agent: AgentId,
        /// Rendered failure.
        reason: String,
    },
    /// The battle moved to a new phase.
    PhaseChanged {
        /// Phase before the transition.
        from: BattlePhase,
        /// Phase after the transition.
        to: BattlePhase,
    },
    /// Final scores were computed.
    BattleConcluded {
        /// Wall-clock duration of the active combat phase.
        duration: Duration,
        /// Final score per team in creation order.
        scores: Vec<(TeamId, u32)>,
        /// Highest scoring team, earliest created on ties.
        winner: Option<TeamId>,
    },
    /// Agents, rosters and counters were cleared for a new battle.
    BattleReset,
}
