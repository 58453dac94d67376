//! Connected match groups staged between the match-finder and match-processor.

use serde::{Deserialize, Serialize};

use crate::geometry::Position;
use crate::tile::{BombKind, TileColor};

/// A connected group of same-colored tiles found by a match finder, staged
/// for a match processor to score, clear, and possibly convert into a bomb.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchGroup {
    /// The color shared by every tile in the group (never [`TileColor::Empty`]).
    pub color: TileColor,
    /// Every cell the group occupies, in the order the finder discovered them.
    pub positions: Vec<Position>,
    /// The cell a bomb created from this group (if any) should occupy.
    pub origin: Position,
    /// The bomb kind this group's shape earned, `None` for a plain match.
    pub bomb: BombKind,
}

impl MatchGroup {
    /// Number of tiles in the group.
    #[must_use]
    pub fn size(&self) -> usize {
        self.positions.len()
    }
}
