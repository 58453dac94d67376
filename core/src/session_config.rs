//! Session construction configuration.

use serde::{Deserialize, Serialize};

use crate::cover::Cover;
use crate::error::ConfigError;
use crate::ground::Ground;
use crate::{MAX_GRID_DIMENSION, MAX_TILE_TYPES, MIN_GRID_DIMENSION, MIN_TILE_TYPES};

/// The objective a session tracks progress against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveKind {
    /// Reach a target score before moves run out.
    ScoreTarget,
    /// Clear every ground cell before moves run out.
    ClearGround,
    /// Collect a target number of a specific base color.
    CollectColor,
}

/// An objective's kind and numeric target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveSpec {
    /// What progress is measured against.
    pub kind: ObjectiveKind,
    /// The target value; meaning depends on `kind`.
    pub target: u32,
}

impl ObjectiveSpec {
    /// Creates a score-target objective.
    #[must_use]
    pub const fn score_target(target: u32) -> Self {
        Self {
            kind: ObjectiveKind::ScoreTarget,
            target,
        }
    }
}

/// Per-cell ground and cover layout, matching a grid's `width * height` cells
/// in row-major order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Ground layer per cell.
    pub ground: Vec<Ground>,
    /// Cover layer per cell.
    pub cover: Vec<Cover>,
}

impl LevelConfig {
    /// Builds a level with no ground or cover over `width * height` cells.
    #[must_use]
    pub fn empty(width: u32, height: u32) -> Self {
        let count = (width as usize) * (height as usize);
        Self {
            ground: vec![Ground::NONE; count],
            cover: vec![Cover::NONE; count],
        }
    }

    /// Validates that both layers have exactly `width * height` entries.
    pub fn validate(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        let expected = (width as usize) * (height as usize);
        if self.ground.len() != expected {
            return Err(ConfigError::LevelConfigDimensionMismatch {
                expected,
                actual: self.ground.len(),
            });
        }
        if self.cover.len() != expected {
            return Err(ConfigError::LevelConfigDimensionMismatch {
                expected,
                actual: self.cover.len(),
            });
        }
        Ok(())
    }
}

/// Tunable physical constants governing tile motion and wave timing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Fixed tick duration, in seconds.
    pub tick_seconds: f64,
    /// Gravity acceleration applied to falling tiles, in cells/second^2.
    pub gravity: f64,
    /// Maximum fall speed a tile may reach, in cells/second.
    pub max_fall_speed: f64,
    /// Minimum speed a tile is given the instant it starts falling.
    pub min_fall_speed: f64,
    /// Position/velocity threshold under which a tile is considered settled.
    pub stability_epsilon: f64,
    /// Swap accept/revert animation duration, in seconds.
    pub swap_animation_seconds: f64,
    /// Duration of one explosion wave radius step, in seconds.
    pub explosion_wave_seconds: f64,
    /// Horizontal speed a tile slides at while diverting around a suspended
    /// obstacle, in cells/second.
    pub diagonal_slide_speed: f64,
    /// Factor applied to vertical fall speed while a tile is mid-diagonal-slide.
    pub slide_fall_reduction: f64,
    /// Duration of a UFO projectile's vertical takeoff arc, in seconds.
    pub ufo_takeoff_seconds: f64,
    /// Peak height a UFO projectile rises to during takeoff, in cells.
    pub ufo_max_height: f64,
    /// Cruise speed of a UFO projectile during its flight phase, in cells/second.
    pub ufo_flight_speed: f64,
    /// Distance from its target at which a UFO projectile is considered arrived.
    pub ufo_impact_threshold: f64,
    /// Hard ceiling on ticks `run_until_stable` will advance before giving up.
    pub max_stabilization_ticks: u32,
}

impl SimulationConfig {
    /// Default physical constants, chosen to match the six seed-12345 reference scenarios.
    #[must_use]
    pub const fn default_constants() -> Self {
        Self {
            tick_seconds: 1.0 / 60.0,
            gravity: 20.0,
            max_fall_speed: 18.0,
            min_fall_speed: 2.0,
            stability_epsilon: 1e-3,
            swap_animation_seconds: 0.15,
            explosion_wave_seconds: 0.1,
            diagonal_slide_speed: 6.0,
            slide_fall_reduction: 0.5,
            ufo_takeoff_seconds: 0.3,
            ufo_max_height: 1.5,
            ufo_flight_speed: 12.0,
            ufo_impact_threshold: 0.2,
            max_stabilization_ticks: 6000,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::default_constants()
    }
}

/// Full configuration required to construct a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Board width in cells.
    pub width: u32,
    /// Board height in cells.
    pub height: u32,
    /// Number of distinct base tile colors in play.
    pub tile_type_count: u32,
    /// Master seed all RNG domains are derived from.
    pub seed: u64,
    /// Number of player moves available before the session ends.
    pub move_limit: u32,
    /// Objective the session tracks.
    pub objective: ObjectiveSpec,
    /// Scalar in `[0, 1]` describing how hard this session is meant to play;
    /// feeds the spawn model's Help/Challenge/Balance/Neutral selection.
    pub target_difficulty: f32,
    /// Per-cell ground/cover layout.
    pub level: LevelConfig,
    /// Physical constants.
    pub simulation: SimulationConfig,
}

impl SessionConfig {
    /// Validates range and dimension constraints, returning the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_GRID_DIMENSION..=MAX_GRID_DIMENSION).contains(&self.width)
            || !(MIN_GRID_DIMENSION..=MAX_GRID_DIMENSION).contains(&self.height)
        {
            return Err(ConfigError::GridDimensionsOutOfRange {
                width: self.width,
                height: self.height,
                min: MIN_GRID_DIMENSION,
                max: MAX_GRID_DIMENSION,
            });
        }
        if !(MIN_TILE_TYPES..=MAX_TILE_TYPES).contains(&self.tile_type_count) {
            return Err(ConfigError::TileTypeCountOutOfRange {
                count: self.tile_type_count,
                min: MIN_TILE_TYPES,
                max: MAX_TILE_TYPES,
            });
        }
        if !(0.0..=1.0).contains(&self.target_difficulty) {
            return Err(ConfigError::TargetDifficultyOutOfRange {
                value: self.target_difficulty,
            });
        }
        self.level.validate(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> SessionConfig {
        SessionConfig {
            width: 4,
            height: 4,
            tile_type_count: 4,
            seed: 12345,
            move_limit: 20,
            objective: ObjectiveSpec::score_target(1000),
            target_difficulty: 0.5,
            level: LevelConfig::empty(4, 4),
            simulation: SimulationConfig::default_constants(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn undersized_grid_is_rejected() {
        let mut config = base_config();
        config.width = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridDimensionsOutOfRange { .. })
        ));
    }

    #[test]
    fn mismatched_level_layout_is_rejected() {
        let mut config = base_config();
        config.level = LevelConfig::empty(3, 3);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LevelConfigDimensionMismatch { .. })
        ));
    }
}
