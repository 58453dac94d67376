//! Read-only accessors over a [`GameState`], used by system crates and by
//! callers inspecting the board without mutating it.

use std::collections::HashMap;

use match3_core::{Position, Tile, TileColor};

use crate::GameState;

/// Returns the tile occupying `position`, or `None` if it lies outside the grid.
#[must_use]
pub fn tile_at(state: &GameState, position: Position) -> Option<&Tile> {
    state.tile(position)
}

/// Reports whether every tile on the board is stable (see [`Tile::is_stable`]).
#[must_use]
pub fn is_board_stable(state: &GameState) -> bool {
    let epsilon = state.simulation.stability_epsilon;
    state.tiles.iter().all(|tile| tile.is_stable(epsilon))
}

/// Counts how many tiles of each base color are currently on the board.
#[must_use]
pub fn color_counts(state: &GameState) -> HashMap<TileColor, u32> {
    let mut counts = HashMap::new();
    for tile in &state.tiles {
        if tile.is_empty() {
            continue;
        }
        *counts.entry(tile.color).or_insert(0) += 1;
    }
    counts
}

/// Returns the base color with the most tiles currently on the board, preferring
/// the lexicographically-first color among ties (matching [`TileColor::BASE_COLORS`] order).
#[must_use]
pub fn most_common_color(state: &GameState) -> Option<TileColor> {
    let counts = color_counts(state);
    TileColor::BASE_COLORS
        .iter()
        .copied()
        .filter_map(|color| counts.get(&color).map(|count| (color, *count)))
        .filter(|(_, count)| *count > 0)
        .max_by_key(|(_, count)| *count)
        .map(|(color, _)| color)
}

/// Returns every cell currently occupied by a non-empty tile.
#[must_use]
pub fn non_empty_positions(state: &GameState) -> Vec<Position> {
    state
        .positions()
        .filter(|&position| state.tile(position).map(|t| !t.is_empty()).unwrap_or(false))
        .collect()
}

/// Returns every cell currently occupied by a tile of exactly `color`.
#[must_use]
pub fn cells_of_color(state: &GameState, color: TileColor) -> Vec<Position> {
    state
        .positions()
        .filter(|&position| state.tile(position).map(|t| t.color == color).unwrap_or(false))
        .collect()
}

/// Returns how many empty cells remain in column `x`.
#[must_use]
pub fn empty_cells_in_column(state: &GameState, x: u32) -> u32 {
    (0..state.height)
        .filter(|&y| {
            state
                .tile(Position::new(x, y))
                .map(Tile::is_empty)
                .unwrap_or(false)
        })
        .count() as u32
}
