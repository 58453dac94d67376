#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Connected-component match detection.
//!
//! Finds every 4-connected same-color region of three or more tiles, then
//! hands each region to [`match3_bomb_generator::carve`] to split it into
//! the shapes (and bomb kinds) it actually earns, staging one [`MatchGroup`]
//! per carved shape.
//!
//! The flood fill's visited mask and frontier queue are scratch, not state:
//! both are checked out of the board's pool for the duration of one
//! [`find_matches`](MatchFinderTrait::find_matches) call and returned to it
//! when the checkout guards drop at the end of that call.

use std::collections::VecDeque;

use match3_bomb_generator::carve;
use match3_core::{
    Event, EventCollector, EventKind, MatchFinder as MatchFinderTrait, MatchGroup, Position,
    TileColor,
};
use match3_world::{neighbors4, GameState};

/// Scans the board for 4-connected same-color groups of three or more tiles
/// and stages the shapes they carve into for a match processor.
#[derive(Clone, Copy, Debug, Default)]
pub struct GroupMatchFinder;

impl GroupMatchFinder {
    /// Creates a finder. It carries no state of its own; every scratch
    /// buffer it needs comes from the board's pool for the call.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn flood_fill(
    state: &GameState,
    visited: &mut Vec<bool>,
    frontier: &mut VecDeque<Position>,
    start: Position,
    base_color: TileColor,
) -> Vec<Position> {
    let width = state.width();
    let height = state.height();
    let mut component = Vec::new();
    frontier.clear();
    frontier.push_back(start);
    mark_visited(visited, width, start);

    while let Some(cell) = frontier.pop_front() {
        component.push(cell);
        for neighbor in neighbors4(cell, width, height) {
            if is_visited(visited, width, neighbor) {
                continue;
            }
            let Some(tile) = state.tile(neighbor) else {
                continue;
            };
            if tile.is_empty() || !tile.color.matches(base_color) {
                continue;
            }
            mark_visited(visited, width, neighbor);
            frontier.push_back(neighbor);
        }
    }
    component
}

fn mark_visited(visited: &mut Vec<bool>, width: u32, cell: Position) {
    let index = match3_core::index(width, cell.x, cell.y);
    if index >= visited.len() {
        visited.resize(index + 1, false);
    }
    visited[index] = true;
}

fn is_visited(visited: &[bool], width: u32, cell: Position) -> bool {
    let index = match3_core::index(width, cell.x, cell.y);
    visited.get(index).copied().unwrap_or(false)
}

impl MatchFinderTrait<GameState> for GroupMatchFinder {
    fn find_matches(&mut self, state: &mut GameState, collector: &mut dyn EventCollector) -> bool {
        let pool = state.pool();
        let mut visited = pool.checkout::<Vec<bool>>();
        let mut frontier = pool.checkout::<VecDeque<Position>>();
        let width = state.width();
        let mut found = false;

        let foci: Vec<Position> = state
            .pending_swap()
            .map(|swap| vec![swap.a, swap.b])
            .unwrap_or_default();

        let positions: Vec<Position> = state.positions().collect();
        for start in positions {
            if is_visited(&visited, width, start) {
                continue;
            }
            let Some(tile) = state.tile(start) else {
                continue;
            };
            if tile.is_empty() {
                mark_visited(&mut visited, width, start);
                continue;
            }
            let base_color = tile.color;
            let component = flood_fill(state, &mut visited, &mut frontier, start, base_color);
            if component.len() < 3 {
                continue;
            }

            let group_color = component
                .iter()
                .filter_map(|&p| state.tile(p).map(|t| t.color))
                .find(|&c| c != TileColor::Rainbow)
                .unwrap_or(TileColor::Rainbow);

            for shape in carve(&component, &foci) {
                let size = shape.cells.len() as u32;
                collector.collect(Event::new(
                    state.tick(),
                    state.simulation_time(),
                    EventKind::MatchDetected {
                        color: group_color,
                        size,
                        origin: shape.origin,
                    },
                ));

                state.stage_match(MatchGroup {
                    color: group_color,
                    positions: shape.cells,
                    origin: shape.origin,
                    bomb: shape.bomb,
                });
            }
            found = true;
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use match3_core::{
        BombKind, ContinuousPosition, LevelConfig, NullCollector, ObjectiveSpec, SessionConfig,
        SimulationConfig, Tile, TileId,
    };

    fn state_with(width: u32, height: u32) -> GameState {
        GameState::new(SessionConfig {
            width,
            height,
            tile_type_count: 4,
            seed: 1,
            move_limit: 10,
            objective: ObjectiveSpec::score_target(100),
            target_difficulty: 0.5,
            level: LevelConfig::empty(width, height),
            simulation: SimulationConfig::default_constants(),
        })
        .expect("valid config")
    }

    fn place(state: &mut GameState, x: u32, y: u32, color: TileColor, id: u64) {
        let position = Position::new(x, y);
        let tile = Tile::new(
            TileId::new(id),
            color,
            BombKind::None,
            ContinuousPosition::from_cell(position),
        );
        assert!(state.set_tile(position, tile));
    }

    #[test]
    fn horizontal_three_is_detected_with_no_bomb() {
        let mut state = state_with(4, 4);
        for (i, x) in (0..3).enumerate() {
            place(&mut state, x, 0, TileColor::Red, i as u64 + 1);
        }
        let mut finder = GroupMatchFinder::new();
        let mut collector = NullCollector;
        assert!(finder.find_matches(&mut state, &mut collector));
        let staged = state.take_staged_matches();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].size(), 3);
        assert_eq!(staged[0].bomb, BombKind::None);
    }

    #[test]
    fn horizontal_four_earns_a_line_bomb() {
        let mut state = state_with(4, 4);
        for (i, x) in (0..4).enumerate() {
            place(&mut state, x, 0, TileColor::Blue, i as u64 + 1);
        }
        let mut finder = GroupMatchFinder::new();
        let mut collector = NullCollector;
        assert!(finder.find_matches(&mut state, &mut collector));
        let staged = state.take_staged_matches();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].bomb, BombKind::Horizontal);
    }

    #[test]
    fn five_in_a_line_earns_a_color_bomb() {
        let mut state = state_with(5, 5);
        for (i, x) in (0..5).enumerate() {
            place(&mut state, x, 2, TileColor::Green, i as u64 + 1);
        }
        let mut finder = GroupMatchFinder::new();
        let mut collector = NullCollector;
        assert!(finder.find_matches(&mut state, &mut collector));
        let staged = state.take_staged_matches();
        assert_eq!(staged[0].bomb, BombKind::ColorBomb);
    }

    #[test]
    fn t_shape_earns_a_square_bomb() {
        let mut state = state_with(5, 5);
        place(&mut state, 1, 1, TileColor::Yellow, 1);
        place(&mut state, 2, 1, TileColor::Yellow, 2);
        place(&mut state, 3, 1, TileColor::Yellow, 3);
        place(&mut state, 2, 0, TileColor::Yellow, 4);
        place(&mut state, 2, 2, TileColor::Yellow, 5);
        let mut finder = GroupMatchFinder::new();
        let mut collector = NullCollector;
        assert!(finder.find_matches(&mut state, &mut collector));
        let staged = state.take_staged_matches();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].bomb, BombKind::Square);
        assert_eq!(staged[0].origin, Position::new(2, 1));
    }

    #[test]
    fn a_swap_focus_biases_the_bomb_origin_to_the_swapped_cell() {
        let mut state = state_with(5, 4);
        for (i, x) in (0..4).enumerate() {
            place(&mut state, x, 0, TileColor::Purple, i as u64 + 1);
        }
        state.begin_pending_swap(Position::new(2, 0), Position::new(2, 1));
        let mut finder = GroupMatchFinder::new();
        let mut collector = NullCollector;
        assert!(finder.find_matches(&mut state, &mut collector));
        let staged = state.take_staged_matches();
        assert_eq!(staged[0].origin, Position::new(2, 0));
    }

    #[test]
    fn no_match_among_isolated_tiles() {
        let mut state = state_with(4, 4);
        place(&mut state, 0, 0, TileColor::Red, 1);
        place(&mut state, 3, 3, TileColor::Blue, 2);
        let mut finder = GroupMatchFinder::new();
        let mut collector = NullCollector;
        assert!(!finder.find_matches(&mut state, &mut collector));
        assert!(!state.has_staged_matches());
    }
}
