//! Tile state: color, bomb payload and continuous motion.

use serde::{Deserialize, Serialize};

use crate::geometry::{ContinuousPosition, Velocity};
use crate::ids::TileId;

/// The color (or special kind) a tile displays.
///
/// `BombCarrier` is the color assigned to a [`BombKind::ColorBomb`] tile: a
/// color bomb's effect targets whichever base color is currently most common
/// on the board, so the tile itself is not tied to one of the six base hues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileColor {
    /// Red base color.
    Red,
    /// Green base color.
    Green,
    /// Blue base color.
    Blue,
    /// Yellow base color.
    Yellow,
    /// Purple base color.
    Purple,
    /// Orange base color.
    Orange,
    /// Rainbow tile, matched as a wildcard against any adjacent base color.
    Rainbow,
    /// Color-bomb carrier tile; not tied to a fixed base color.
    BombCarrier,
    /// No tile occupies the cell.
    Empty,
}

impl TileColor {
    /// The six base colors tile spawning may draw from.
    pub const BASE_COLORS: [TileColor; 6] = [
        TileColor::Red,
        TileColor::Green,
        TileColor::Blue,
        TileColor::Yellow,
        TileColor::Purple,
        TileColor::Orange,
    ];

    /// Returns the base color at `index`, wrapping into `0..count`.
    ///
    /// `count` must be within [`crate::MIN_TILE_TYPES`]..=[`crate::MAX_TILE_TYPES`].
    #[must_use]
    pub fn base_color_at(index: u32, count: u32) -> Self {
        debug_assert!(count > 0, "tile color count must be non-zero");
        Self::BASE_COLORS[(index % count.max(1)) as usize]
    }

    /// Returns whether two colors are considered the same match group, treating
    /// [`TileColor::Rainbow`] as a wildcard that matches any base color.
    #[must_use]
    pub fn matches(self, other: Self) -> bool {
        if self == Self::Rainbow || other == Self::Rainbow {
            return self != Self::Empty && other != Self::Empty;
        }
        self == other
    }
}

/// The bomb payload a tile may carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BombKind {
    /// No bomb.
    #[default]
    None,
    /// Clears the entire row.
    Horizontal,
    /// Clears the entire column.
    Vertical,
    /// Clears a 3x3 region centered on the bomb.
    Square,
    /// Clears every tile of the board's most common color.
    ColorBomb,
    /// Launches a homing projectile at a random other cell.
    Ufo,
}

impl BombKind {
    /// Returns whether this is a single, non-`None` bomb kind.
    #[must_use]
    pub const fn is_bomb(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// A single grid cell's tile state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Identifier, zero iff the cell is empty.
    pub id: TileId,
    /// Displayed color or special kind.
    pub color: TileColor,
    /// Bomb payload, `None` for ordinary tiles.
    pub bomb: BombKind,
    /// Continuous sub-cell position used while falling or swapping.
    pub position: ContinuousPosition,
    /// Continuous velocity.
    pub velocity: Velocity,
    /// Whether the tile is currently integrating gravity.
    pub is_falling: bool,
    /// Whether the tile is held in place (e.g. marked by an active explosion footprint).
    pub is_suspended: bool,
}

impl Tile {
    /// Creates an empty tile occupying `cell`.
    #[must_use]
    pub fn empty(cell: ContinuousPosition) -> Self {
        Self {
            id: TileId::EMPTY,
            color: TileColor::Empty,
            bomb: BombKind::None,
            position: cell,
            velocity: Velocity::ZERO,
            is_falling: false,
            is_suspended: false,
        }
    }

    /// Creates a new occupied tile, enforcing the color/id/bomb invariant.
    #[must_use]
    pub fn new(id: TileId, color: TileColor, bomb: BombKind, position: ContinuousPosition) -> Self {
        let tile = Self {
            id,
            color,
            bomb,
            position,
            velocity: Velocity::ZERO,
            is_falling: false,
            is_suspended: false,
        };
        debug_assert!(tile.satisfies_invariant(), "tile violates color/id/bomb invariant");
        tile
    }

    /// Reports whether the cell is unoccupied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.color, TileColor::Empty)
    }

    /// Reports whether the tile's fields satisfy the empty/id/bomb invariant:
    /// `color == Empty` iff `id == 0 && bomb == None`.
    #[must_use]
    pub fn satisfies_invariant(&self) -> bool {
        let is_empty = matches!(self.color, TileColor::Empty);
        is_empty == (self.id.is_empty() && self.bomb == BombKind::None)
    }

    /// Reports whether the tile is stable: velocity and cell offset both within `epsilon`.
    #[must_use]
    pub fn is_stable(&self, epsilon: f64) -> bool {
        if self.velocity.magnitude() > epsilon {
            return false;
        }
        let (ox, oy) = self.position.cell_offset();
        ox.abs() <= epsilon && oy.abs() <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tile_satisfies_invariant() {
        let tile = Tile::empty(ContinuousPosition::new(0.0, 0.0));
        assert!(tile.satisfies_invariant());
        assert!(tile.is_empty());
    }

    #[test]
    fn occupied_tile_satisfies_invariant() {
        let tile = Tile::new(
            TileId::new(7),
            TileColor::Red,
            BombKind::None,
            ContinuousPosition::new(1.0, 1.0),
        );
        assert!(tile.satisfies_invariant());
        assert!(!tile.is_empty());
    }

    #[test]
    fn rainbow_matches_any_base_color() {
        assert!(TileColor::Rainbow.matches(TileColor::Blue));
        assert!(TileColor::Blue.matches(TileColor::Rainbow));
        assert!(!TileColor::Rainbow.matches(TileColor::Empty));
    }

    #[test]
    fn stability_requires_low_velocity_and_cell_offset() {
        let mut tile = Tile::new(
            TileId::new(1),
            TileColor::Green,
            BombKind::None,
            ContinuousPosition::new(2.0, 2.0),
        );
        assert!(tile.is_stable(1e-3));
        tile.velocity = Velocity::new(0.0, 5.0);
        assert!(!tile.is_stable(1e-3));
    }
}
