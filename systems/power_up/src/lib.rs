#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bomb activation: single-bomb footprints and bomb-combo effects.
//!
//! A single bomb tapped alone clears a shape determined by its own kind. Two
//! bomb tiles swapped into each other instead combine into one of ten combo
//! effects, looked up by the pair of kinds involved. Either way the resulting
//! footprint is handed to [`match3_world::GameState::begin_explosion`] for
//! wave-stepped clearing, except a lone UFO, which launches a homing
//! projectile instead of detonating in place.

use std::collections::HashSet;

use match3_core::{
    BombKind, ContinuousPosition, DestroyReason, Event, EventCollector, EventKind,
    PowerUpHandler as PowerUpHandlerTrait, Position, RngDomain, TargetMode, Tile,
};
use match3_world::{query, GameState};

/// Resolves single-bomb activations and two-bomb combo effects.
#[derive(Clone, Debug, Default)]
pub struct BombEffects;

impl BombEffects {
    /// Creates a new bomb-effect resolver. Holds no state of its own.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolves the combo produced by swapping the bombs at `a` and `b` into
    /// each other. Destroys both tiles and detonates the resulting footprint;
    /// a UFO on either side still launches its own projectile in addition to
    /// whatever footprint the combo produces.
    pub fn activate_combo(
        &mut self,
        state: &mut GameState,
        a: Position,
        b: Position,
        collector: &mut dyn EventCollector,
    ) {
        let kind_a = state.tile(a).map(|t| t.bomb).unwrap_or_default();
        let kind_b = state.tile(b).map(|t| t.bomb).unwrap_or_default();
        let color_b = state.tile(b).map(|t| t.color);

        collector.collect(Event::new(
            state.tick(),
            state.simulation_time(),
            EventKind::BombComboTriggered {
                first: kind_a,
                second: kind_b,
                position: b,
            },
        ));

        let mut footprint: HashSet<Position> = HashSet::new();
        footprint.insert(a);
        footprint.insert(b);

        let (high, low, high_is_a) = if rank(kind_a) >= rank(kind_b) {
            (kind_a, kind_b, true)
        } else {
            (kind_b, kind_a, false)
        };
        let origin = if high_is_a { a } else { b };

        match (high, low) {
            (BombKind::ColorBomb, BombKind::ColorBomb) => {
                footprint.extend(query::non_empty_positions(state));
            }
            (BombKind::ColorBomb, BombKind::Horizontal | BombKind::Vertical) => {
                if let Some(color) = query::most_common_color(state) {
                    for cell in query::cells_of_color(state, color) {
                        if low == BombKind::Vertical {
                            footprint.extend(column_footprint(state, cell.x));
                        } else {
                            footprint.extend(row_footprint(state, cell.y));
                        }
                    }
                }
            }
            (BombKind::ColorBomb, BombKind::Square) => {
                if let Some(color) = query::most_common_color(state) {
                    for cell in query::cells_of_color(state, color) {
                        footprint.extend(square_footprint(state, cell, 1));
                    }
                }
            }
            (BombKind::ColorBomb, BombKind::Ufo) => {
                if let Some(color) = query::most_common_color(state) {
                    for cell in query::cells_of_color(state, color) {
                        footprint.extend(cross_footprint(state, cell));
                    }
                }
            }
            (BombKind::ColorBomb, BombKind::None) => {
                if let Some(color) = color_b {
                    footprint.extend(query::cells_of_color(state, color));
                }
            }
            (BombKind::Ufo, BombKind::Ufo) => {
                footprint.extend(cross_footprint(state, a));
                footprint.extend(cross_footprint(state, b));
                for _ in 0..3 {
                    if let Some(cell) = random_non_empty_cell(state) {
                        footprint.insert(cell);
                    }
                }
            }
            (BombKind::Ufo, BombKind::Square) => {
                footprint.extend(cross_footprint(state, origin));
                if let Some(cell) = random_non_empty_cell(state) {
                    footprint.extend(square_footprint(state, cell, 2));
                }
            }
            (BombKind::Ufo, BombKind::Horizontal | BombKind::Vertical) => {
                footprint.extend(cross_footprint(state, origin));
                if random_bool(state) {
                    footprint.extend(row_footprint(state, origin.y));
                } else {
                    footprint.extend(column_footprint(state, origin.x));
                }
            }
            (BombKind::Square, BombKind::Square) => {
                footprint.extend(square_footprint(state, origin, 4));
            }
            (BombKind::Square, BombKind::Horizontal | BombKind::Vertical) => {
                footprint.extend(thick_plus_footprint(state, origin, 1));
            }
            (BombKind::Horizontal | BombKind::Vertical, BombKind::Horizontal | BombKind::Vertical) => {
                footprint.extend(row_footprint(state, origin.y));
                footprint.extend(column_footprint(state, origin.x));
            }
            _ => {
                footprint.extend(square_footprint(state, origin, 1));
            }
        }

        destroy_origin(state, a, collector);
        destroy_origin(state, b, collector);
        detonate(state, origin, BombKind::None, footprint, collector);
    }
}

impl PowerUpHandlerTrait<GameState> for BombEffects {
    fn activate(&mut self, state: &mut GameState, position: Position, collector: &mut dyn EventCollector) {
        let Some(tile) = state.tile(position) else {
            return;
        };
        let kind = tile.bomb;
        if !kind.is_bomb() {
            return;
        }

        if kind == BombKind::Ufo {
            let Some(id) = state.tile(position).map(|t| t.id) else {
                return;
            };
            let _ = state.set_tile(position, Tile::empty(ContinuousPosition::from_cell(position)));
            collector.collect(Event::new(
                state.tick(),
                state.simulation_time(),
                EventKind::TileDestroyed {
                    id,
                    position,
                    reason: DestroyReason::Bomb,
                },
            ));
            let Some(target) = random_non_empty_cell_excluding(state, position) else {
                return;
            };
            let projectile_id = state.begin_projectile(position, TargetMode::FixedCell(target));
            collector.collect(Event::new(
                state.tick(),
                state.simulation_time(),
                EventKind::ProjectileLaunched {
                    id: projectile_id,
                    origin: position,
                    target,
                },
            ));
            return;
        }

        let mut footprint: HashSet<Position> = HashSet::new();
        match kind {
            BombKind::Horizontal => footprint.extend(row_footprint(state, position.y)),
            BombKind::Vertical => footprint.extend(column_footprint(state, position.x)),
            BombKind::Square => footprint.extend(square_footprint(state, position, 1)),
            BombKind::ColorBomb => {
                footprint.insert(position);
                if let Some(color) = query::most_common_color(state) {
                    footprint.extend(query::cells_of_color(state, color));
                }
            }
            BombKind::None | BombKind::Ufo => unreachable!("handled above"),
        }

        destroy_origin(state, position, collector);
        detonate(state, position, kind, footprint, collector);
    }
}

/// Clears a bomb tile the moment it activates, before its footprint is
/// detonated, so a wave reaching its own origin cell finds it empty instead
/// of re-staging it as a chain bomb.
fn destroy_origin(state: &mut GameState, position: Position, collector: &mut dyn EventCollector) {
    let Some(tile) = state.tile(position) else {
        return;
    };
    if tile.is_empty() {
        return;
    }
    let id = tile.id;
    let _ = state.set_tile(position, Tile::empty(ContinuousPosition::from_cell(position)));
    collector.collect(Event::new(
        state.tick(),
        state.simulation_time(),
        EventKind::TileDestroyed {
            id,
            position,
            reason: DestroyReason::Bomb,
        },
    ));
    if let Some(ground) = state.ground_mut(position) {
        let kind_before = ground.kind;
        if ground.is_present() && ground.apply_hit() {
            collector.collect(Event::new(
                state.tick(),
                state.simulation_time(),
                EventKind::GroundDestroyed {
                    position,
                    kind: kind_before,
                },
            ));
        }
    }
}

fn detonate(
    state: &mut GameState,
    origin: Position,
    source: BombKind,
    footprint: HashSet<Position>,
    collector: &mut dyn EventCollector,
) {
    let mut cells: Vec<Position> = footprint.into_iter().collect();
    cells.sort_by_key(|c| (c.y, c.x));
    let id = state.begin_explosion(origin, &cells, source);
    collector.collect(Event::new(
        state.tick(),
        state.simulation_time(),
        EventKind::ExplosionTriggered {
            id,
            kind: source,
            position: origin,
        },
    ));
}

fn rank(kind: BombKind) -> u8 {
    match kind {
        BombKind::ColorBomb => 4,
        BombKind::Ufo => 3,
        BombKind::Square => 2,
        BombKind::Horizontal | BombKind::Vertical => 1,
        BombKind::None => 0,
    }
}

fn row_footprint(state: &GameState, y: u32) -> Vec<Position> {
    (0..state.width()).map(|x| Position::new(x, y)).collect()
}

fn column_footprint(state: &GameState, x: u32) -> Vec<Position> {
    (0..state.height()).map(|y| Position::new(x, y)).collect()
}

fn square_footprint(state: &GameState, origin: Position, radius: u32) -> Vec<Position> {
    let min_x = origin.x.saturating_sub(radius);
    let max_x = (origin.x + radius).min(state.width().saturating_sub(1));
    let min_y = origin.y.saturating_sub(radius);
    let max_y = (origin.y + radius).min(state.height().saturating_sub(1));
    (min_y..=max_y)
        .flat_map(|y| (min_x..=max_x).map(move |x| Position::new(x, y)))
        .collect()
}

fn cross_footprint(state: &GameState, origin: Position) -> Vec<Position> {
    let mut cells = vec![origin];
    if origin.x > 0 {
        cells.push(Position::new(origin.x - 1, origin.y));
    }
    if origin.x + 1 < state.width() {
        cells.push(Position::new(origin.x + 1, origin.y));
    }
    if origin.y > 0 {
        cells.push(Position::new(origin.x, origin.y - 1));
    }
    if origin.y + 1 < state.height() {
        cells.push(Position::new(origin.x, origin.y + 1));
    }
    cells
}

fn thick_plus_footprint(state: &GameState, origin: Position, half_width: u32) -> Vec<Position> {
    let min_y = origin.y.saturating_sub(half_width);
    let max_y = (origin.y + half_width).min(state.height().saturating_sub(1));
    let min_x = origin.x.saturating_sub(half_width);
    let max_x = (origin.x + half_width).min(state.width().saturating_sub(1));
    let mut cells = Vec::new();
    for y in min_y..=max_y {
        cells.extend(row_footprint(state, y));
    }
    for x in min_x..=max_x {
        cells.extend(column_footprint(state, x));
    }
    cells
}

fn random_non_empty_cell(state: &mut GameState) -> Option<Position> {
    let candidates: Vec<Position> = query::non_empty_positions(state);
    if candidates.is_empty() {
        return None;
    }
    let index = state.rng_mut().next_index(RngDomain::PowerUp, candidates.len() as u32);
    Some(candidates[index as usize])
}

fn random_non_empty_cell_excluding(state: &mut GameState, exclude: Position) -> Option<Position> {
    let candidates: Vec<Position> = query::non_empty_positions(state)
        .into_iter()
        .filter(|&cell| cell != exclude)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let index = state.rng_mut().next_index(RngDomain::PowerUp, candidates.len() as u32);
    Some(candidates[index as usize])
}

fn random_bool(state: &mut GameState) -> bool {
    state.rng_mut().next_bool(RngDomain::PowerUp, 0.5)
}
