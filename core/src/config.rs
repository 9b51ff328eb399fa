//! Tunable parameters for a battle environment.

use serde::{Deserialize, Serialize};

use crate::{Bounds, SpawnStrategy};

/// Configuration recognised by the environment.
///
/// Missing keys fall back to [`ArenaConfig::default`], so a TOML document
/// only needs to list the values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Battlefield width in world units.
    pub width: f32,
    /// Battlefield height in world units.
    pub height: f32,
    /// Nominal simulation step in seconds, for hosts that drive fixed ticks.
    pub time_step: f32,
    /// Maximum number of agents admitted at once.
    pub max_agents: usize,
    /// Distance below which two agents collide.
    pub collision_radius: f32,
    /// Enables the uniform grid index; disabled means linear scans.
    pub spatial_partitioning: bool,
    /// Edge length of a grid cell.
    pub grid_cell_size: f32,
    /// Maximum number of teams.
    pub max_teams: usize,
    /// Spawn area and spawn point strategy.
    pub spawn_strategy: SpawnStrategy,
    /// Minimum distance between spawn areas and the field edges.
    pub spawn_margin: f32,
    /// Reserved; accepted but not consulted by collision or scoring.
    pub friendly_fire: bool,
    /// Maximum distance at which agents see each other.
    pub vision_range: f32,
    /// Enables the projectile extension point.
    pub projectile_system: bool,
    /// Enables agent-agent collision detection and response.
    pub collision_detection: bool,
    /// Seed for spawn sampling; entropy is used when absent.
    pub rng_seed: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 800.0,
            time_step: 0.016,
            max_agents: 100,
            collision_radius: 12.0,
            spatial_partitioning: true,
            grid_cell_size: 64.0,
            max_teams: 8,
            spawn_strategy: SpawnStrategy::TeamsOpposite,
            spawn_margin: 50.0,
            friendly_fire: false,
            vision_range: 200.0,
            projectile_system: true,
            collision_detection: true,
            rng_seed: None,
        }
    }
}

impl ArenaConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Field bounds described by the configuration.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    /// Checks that every value can be used without producing degenerate
    /// geometry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        if !self.grid_cell_size.is_finite() || self.grid_cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(self.grid_cell_size));
        }

        if !self.spawn_margin.is_finite()
            || self.spawn_margin < 0.0
            || self.spawn_margin * 2.0 > self.width.min(self.height)
        {
            return Err(ConfigError::InvalidSpawnMargin(self.spawn_margin));
        }

        for (name, value) in [
            ("collision_radius", self.collision_radius),
            ("vision_range", self.vision_range),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidRadius { name, value });
            }
        }

        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(ConfigError::InvalidTimeStep(self.time_step));
        }

        if self.max_agents == 0 {
            return Err(ConfigError::ZeroCapacity("max_agents"));
        }
        if self.max_teams == 0 {
            return Err(ConfigError::ZeroCapacity("max_teams"));
        }

        Ok(())
    }
}

/// Reasons a configuration may be unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse arena configuration")]
    Parse(#[from] toml::de::Error),
    /// Width or height is not a positive finite number.
    #[error("battlefield dimensions must be positive, got {width}x{height}")]
    InvalidDimensions {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
    },
    /// The grid cell size is not a positive finite number.
    #[error("grid cell size must be positive, got {0}")]
    InvalidCellSize(f32),
    /// The spawn margin is negative or leaves no playable area.
    #[error("spawn margin {0} leaves no playable area")]
    InvalidSpawnMargin(f32),
    /// A radius is negative or not finite.
    #[error("{name} must be a non-negative finite number, got {value}")]
    InvalidRadius {
        /// Configuration key.
        name: &'static str,
        /// Configured value.
        value: f32,
    },
    /// The time step is not a positive finite number.
    #[error("time step must be positive, got {0}")]
    InvalidTimeStep(f32),
    /// A capacity limit is zero.
    #[error("{0} must be at least one")]
    ZeroCapacity(&'static str),
}
