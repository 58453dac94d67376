//! Active bomb detonations, staged between a power-up handler and an explosion system.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Position;
use crate::ids::TileId;
use crate::tile::BombKind;

/// An in-progress bomb detonation, expanding outward from `origin` one
/// Chebyshev-radius wave at a time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    /// Identifier of the bomb tile that triggered this detonation.
    pub id: TileId,
    /// The cell the wave expands outward from.
    pub origin: Position,
    /// The bomb kind that produced this footprint.
    pub source: BombKind,
    /// Footprint cells grouped by ascending Chebyshev distance from `origin`.
    pub waves: Vec<Vec<Position>>,
    /// Index of the next wave to process.
    pub next_wave: usize,
    /// Seconds accumulated since the last wave was processed.
    pub timer: f64,
}

impl Explosion {
    /// Groups `footprint` into Chebyshev-radius waves centered on `origin`.
    #[must_use]
    pub fn new(id: TileId, origin: Position, source: BombKind, footprint: &[Position]) -> Self {
        let mut by_radius: BTreeMap<u32, Vec<Position>> = BTreeMap::new();
        for &cell in footprint {
            by_radius
                .entry(chebyshev_distance(origin, cell))
                .or_default()
                .push(cell);
        }
        for cells in by_radius.values_mut() {
            cells.sort_by_key(|c| (c.y, c.x));
        }
        Self {
            id,
            origin,
            source,
            waves: by_radius.into_values().collect(),
            next_wave: 0,
            timer: 0.0,
        }
    }

    /// Reports whether every wave has already been processed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.next_wave >= self.waves.len()
    }

    /// Iterates every footprint cell across all waves, processed or not.
    pub fn all_footprint_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.waves.iter().flatten().copied()
    }
}

/// Chebyshev (chessboard) distance between two cells.
#[must_use]
pub fn chebyshev_distance(a: Position, b: Position) -> u32 {
    let dx = (i64::from(a.x) - i64::from(b.x)).unsigned_abs() as u32;
    let dy = (i64::from(a.y) - i64::from(b.y)).unsigned_abs() as u32;
    dx.max(dy)
}
