//! In-flight UFO projectile state.

use serde::{Deserialize, Serialize};

use crate::geometry::{ContinuousPosition, Position};
use crate::ids::TileId;

/// What a projectile is currently pursuing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TargetMode {
    /// Locked to one grid cell; retargets to a random other non-empty cell
    /// if that cell empties before impact.
    FixedCell(Position),
    /// Re-evaluated every tick against the board's current state.
    Dynamic,
    /// Follows whichever cell currently holds a specific tile id.
    TrackTile(TileId),
}

/// Flight phase of an in-progress UFO projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileFlightPhase {
    /// Rising vertically off its launch cell.
    Takeoff,
    /// Cruising toward its target at constant speed.
    Flight,
    /// Within its arrival threshold; detonates next step.
    Impact,
}

/// A UFO bomb in flight from `origin` toward its current target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Identifier of the bomb tile that launched this projectile.
    pub id: TileId,
    /// The cell the projectile launched from.
    pub origin: Position,
    /// Continuous position during flight.
    pub position: ContinuousPosition,
    /// Height above the board plane, used only during takeoff's arc.
    pub height: f64,
    /// What the projectile is currently pursuing.
    pub target_mode: TargetMode,
    /// Current flight phase.
    pub phase: ProjectileFlightPhase,
    /// Seconds elapsed within the current phase.
    pub phase_elapsed: f64,
}

impl Projectile {
    /// Launches a new projectile from `origin`, starting in takeoff.
    #[must_use]
    pub fn new(id: TileId, origin: Position, target_mode: TargetMode) -> Self {
        Self {
            id,
            origin,
            position: ContinuousPosition::from_cell(origin),
            height: 0.0,
            target_mode,
            phase: ProjectileFlightPhase::Takeoff,
            phase_elapsed: 0.0,
        }
    }

    /// The cell the projectile currently targets, if fixed or tracked targeting
    /// has already resolved one.
    #[must_use]
    pub fn fixed_target(&self) -> Option<Position> {
        match self.target_mode {
            TargetMode::FixedCell(cell) => Some(cell),
            TargetMode::Dynamic | TargetMode::TrackTile(_) => None,
        }
    }
}
