//! Grid geometry and continuous-motion primitives.

use serde::{Deserialize, Serialize};

/// Discrete cell coordinate within the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column, `0..width`.
    pub x: u32,
    /// Row, `0..height`.
    pub y: u32,
}

impl Position {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Reports whether `other` is orthogonally adjacent (4-connected) to `self`.
    #[must_use]
    pub fn is_orthogonally_adjacent(self, other: Self) -> bool {
        let dx = (self.x as i64 - other.x as i64).abs();
        let dy = (self.y as i64 - other.y as i64).abs();
        (dx == 1 && dy == 0) || (dx == 0 && dy == 1)
    }
}

/// Flattens a `(x, y)` cell coordinate into a row-major index over a board of the given width.
#[must_use]
pub const fn index(width: u32, x: u32, y: u32) -> usize {
    (y as usize) * (width as usize) + (x as usize)
}

/// Sub-cell continuous position used for tile motion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContinuousPosition {
    /// Continuous column coordinate.
    pub x: f64,
    /// Continuous row coordinate.
    pub y: f64,
}

impl ContinuousPosition {
    /// Creates a continuous position from discrete cell coordinates.
    #[must_use]
    pub fn from_cell(cell: Position) -> Self {
        Self {
            x: f64::from(cell.x),
            y: f64::from(cell.y),
        }
    }

    /// Creates a continuous position at explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns how far `self` is from the nearest integer cell on each axis.
    #[must_use]
    pub fn cell_offset(self) -> (f64, f64) {
        (self.x - self.x.round(), self.y - self.y.round())
    }

    /// Rounds to the nearest discrete cell, clamping negative coordinates to zero.
    #[must_use]
    pub fn to_cell(self) -> Position {
        Position::new(
            self.x.round().max(0.0) as u32,
            self.y.round().max(0.0) as u32,
        )
    }
}

/// Continuous per-axis velocity, expressed in cells per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    /// Horizontal component.
    pub dx: f64,
    /// Vertical component.
    pub dy: f64,
}

impl Velocity {
    /// The zero vector.
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    /// Creates a velocity from explicit components.
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Returns the Euclidean magnitude of the velocity.
    #[must_use]
    pub fn magnitude(self) -> f64 {
        self.dx.hypot(self.dy)
    }
}
