#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Continuous per-column gravity and top-row refill.
//!
//! Every non-empty, non-suspended tile has a continuous position, velocity
//! and falling flag. Each tick, a tile either descends into a free cell
//! below it, follows a tile already falling ahead of it in the same column,
//! slides diagonally around a suspended obstacle, or stays put. Columns are
//! visited in an order reshuffled every tick from the physics RNG domain so
//! diagonal-slide contention between adjacent columns never favors one side
//! by iteration order alone.

use match3_core::{
    index, BombKind, ContinuousPosition, Event, EventCollector, EventKind, PhysicsSimulation,
    Position, RefillSystem, RngDomain, SpawnModel as SpawnModelTrait, Tile, Velocity,
};
use match3_world::GameState;

/// Integrates tile motion for one fixed timestep using constants carried on
/// the board's [`match3_core::SimulationConfig`].
#[derive(Clone, Debug, Default)]
pub struct ColumnGravity;

impl ColumnGravity {
    /// Creates a new gravity system. Stateless: all tunables live on the
    /// board's simulation config so replaying a session never depends on
    /// this struct's own fields.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn cell_index(state: &GameState, position: Position) -> usize {
    index(state.width(), position.x, position.y)
}

fn is_free(state: &GameState, position: Position, claimed: &[bool]) -> bool {
    let Some(tile) = state.tile(position) else {
        return false;
    };
    tile.is_empty() && !claimed[cell_index(state, position)]
}

fn claim(state: &GameState, claimed: &mut [bool], position: Position) {
    let index = cell_index(state, position);
    claimed[index] = true;
}

/// What a falling tile should do this tick.
enum Action {
    /// Descend toward `target`, which is directly below.
    Descend(Position),
    /// Match velocity with the currently-falling tile directly below without
    /// overtaking it; re-evaluated as a normal descend once it vacates.
    Follow,
    /// Slide diagonally toward `target` to get around a suspended obstacle.
    Slide(Position),
    /// Nothing to do this tick; settle in place.
    Stay,
}

/// Tries sliding into `(from.x + dx, from.y + 1)`, provided it is free and
/// the cell directly above it is empty (so a vertical faller one column over
/// is never robbed of the cell it is about to descend into).
fn slide_candidate(
    state: &GameState,
    from: Position,
    dx: i32,
    claimed: &[bool],
) -> Option<Position> {
    let x = if dx < 0 {
        from.x.checked_sub(1)?
    } else {
        let x = from.x + 1;
        if x >= state.width() {
            return None;
        }
        x
    };
    let target = Position::new(x, from.y + 1);
    let shield = Position::new(x, from.y);
    let shielded = state.tile(shield).map(|t| !t.is_empty()).unwrap_or(true);
    if shielded || !is_free(state, target, claimed) {
        None
    } else {
        Some(target)
    }
}

fn choose_action(state: &mut GameState, from: Position, claimed: &[bool]) -> Action {
    if from.y + 1 >= state.height() {
        return Action::Stay;
    }
    let below = Position::new(from.x, from.y + 1);
    if is_free(state, below, claimed) {
        return Action::Descend(below);
    }
    let below_tile = *state.tile(below).expect("below is within bounds");
    if below_tile.is_falling {
        return Action::Follow;
    }
    if !below_tile.is_suspended {
        return Action::Stay;
    }

    let left = slide_candidate(state, from, -1, claimed);
    let right = slide_candidate(state, from, 1, claimed);
    match (left, right) {
        (Some(l), Some(r)) => {
            let take_left = state.rng_mut().next_bool(RngDomain::Physics, 0.5);
            Action::Slide(if take_left { l } else { r })
        }
        (Some(l), None) => Action::Slide(l),
        (None, Some(r)) => Action::Slide(r),
        (None, None) => Action::Stay,
    }
}

fn settle_in_place(tile: &mut Tile, cell: Position) {
    tile.velocity = Velocity::ZERO;
    tile.is_falling = false;
    tile.position = ContinuousPosition::from_cell(cell);
}

/// Moves `moving`'s continuous position toward `target` and, once it
/// crosses into `target`'s integer cell, re-indexes it there.
fn integrate_and_reindex(
    state: &mut GameState,
    source: Position,
    target: Position,
    mut moving: Tile,
    vertical_speed: f64,
    horizontal_speed: f64,
    dt: f64,
    claimed: &mut [bool],
    collector: &mut dyn EventCollector,
) {
    moving.velocity = Velocity::new(horizontal_speed, vertical_speed);
    moving.is_falling = true;

    let target_x = f64::from(target.x);
    let target_y = f64::from(target.y);
    moving.position.y += vertical_speed * dt;
    if moving.position.x < target_x {
        moving.position.x = (moving.position.x + horizontal_speed * dt).min(target_x);
    } else if moving.position.x > target_x {
        moving.position.x = (moving.position.x - horizontal_speed * dt).max(target_x);
    }

    if moving.position.to_cell() == target {
        moving.position = ContinuousPosition::from_cell(target);
        let id = moving.id;
        let _ = state.set_tile(target, moving);
        let _ = state.set_tile(source, Tile::empty(ContinuousPosition::from_cell(source)));
        collector.collect(Event::new(
            state.tick(),
            state.simulation_time(),
            EventKind::TileSettled { id, position: target },
        ));
        claim(state, claimed, target);
    } else {
        let _ = state.set_tile(source, moving);
        claim(state, claimed, source);
    }
}

impl PhysicsSimulation<GameState> for ColumnGravity {
    fn step(&mut self, state: &mut GameState, dt: f64, collector: &mut dyn EventCollector) -> bool {
        let width = state.width();
        let height = state.height();
        let config = state.simulation_config();
        let mut claimed = vec![false; (width as usize) * (height as usize)];
        let mut all_stable = true;

        let mut columns: Vec<u32> = (0..width).collect();
        for i in (1..columns.len()).rev() {
            let j = state.rng_mut().next_index(RngDomain::Physics, (i + 1) as u32) as usize;
            columns.swap(i, j);
        }

        for &x in &columns {
            for y in (0..height).rev() {
                let cell = Position::new(x, y);
                let Some(tile) = state.tile(cell) else { continue };
                if tile.is_empty() || tile.is_suspended {
                    continue;
                }

                match choose_action(state, cell, &claimed) {
                    Action::Stay => {
                        let tile = state.tile_mut(cell).expect("cell checked above");
                        let already_stable = tile.is_stable(config.stability_epsilon);
                        settle_in_place(tile, cell);
                        claim(state, &mut claimed, cell);
                        all_stable = all_stable && already_stable;
                    }
                    Action::Follow => {
                        all_stable = false;
                        let below = state
                            .tile(Position::new(cell.x, cell.y + 1))
                            .expect("below checked above");
                        let speed = below
                            .velocity
                            .dy
                            .clamp(config.min_fall_speed, config.max_fall_speed);
                        let tile = state.tile_mut(cell).expect("cell checked above");
                        tile.velocity = Velocity::new(0.0, speed);
                        tile.is_falling = true;
                        claim(state, &mut claimed, cell);
                    }
                    Action::Descend(target) => {
                        all_stable = false;
                        let moving = *state.tile(cell).expect("cell checked above");
                        let speed = (moving.velocity.dy + config.gravity * dt)
                            .max(config.min_fall_speed)
                            .min(config.max_fall_speed);
                        integrate_and_reindex(
                            state, cell, target, moving, speed, 0.0, dt, &mut claimed, collector,
                        );
                    }
                    Action::Slide(target) => {
                        all_stable = false;
                        let moving = *state.tile(cell).expect("cell checked above");
                        let vertical_speed = (moving.velocity.dy
                            + config.gravity * dt * config.slide_fall_reduction)
                            .max(config.min_fall_speed * config.slide_fall_reduction)
                            .min(config.max_fall_speed);
                        integrate_and_reindex(
                            state,
                            cell,
                            target,
                            moving,
                            vertical_speed,
                            config.diagonal_slide_speed,
                            dt,
                            &mut claimed,
                            collector,
                        );
                    }
                }
            }
        }

        all_stable
    }
}

/// Spawns replacement tiles into empty top-row cells.
///
/// Only the literal top row is filled per call: a deeper gap left by a clear
/// is first closed by [`ColumnGravity`] shifting existing tiles down, which
/// vacates the top row again on a later tick for this system to refill. This
/// keeps refill column-local and avoids ever needing to know how tall a gap
/// is before filling it. A spawned tile starts at its cell already carrying
/// an initial downward velocity and `is_falling = true`, so the next gravity
/// step immediately continues its descent; there is no above-board visual
/// lead-in since rendering is out of scope here.
#[derive(Clone, Debug)]
pub struct TopRowRefill<S> {
    spawn_model: S,
}

impl<S> TopRowRefill<S> {
    /// Creates a refill system drawing new tile colors from `spawn_model`.
    #[must_use]
    pub const fn new(spawn_model: S) -> Self {
        Self { spawn_model }
    }
}

impl<S> RefillSystem<GameState> for TopRowRefill<S>
where
    S: SpawnModelTrait<GameState>,
{
    fn refill(&mut self, state: &mut GameState, collector: &mut dyn EventCollector) {
        let min_fall_speed = state.simulation_config().min_fall_speed;
        for x in 0..state.width() {
            let cell = Position::new(x, 0);
            let Some(tile) = state.tile(cell) else { continue };
            if !tile.is_empty() {
                continue;
            }

            let color = self.spawn_model.select_color(state, cell);
            let id = state.next_tile_id();
            let mut spawned = Tile::new(id, color, BombKind::None, ContinuousPosition::from_cell(cell));
            spawned.is_falling = true;
            spawned.velocity = Velocity::new(0.0, min_fall_speed);
            let _ = state.set_tile(cell, spawned);
            collector.collect(Event::new(
                state.tick(),
                state.simulation_time(),
                EventKind::TileSpawned { id, color, position: cell },
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use match3_core::{
        LevelConfig, NullCollector, ObjectiveSpec, SessionConfig, SimulationConfig, TileColor,
        TileId,
    };
    use match3_spawn_model::{SpawnStrategy, WeightedSpawnModel};

    fn state(width: u32, height: u32) -> GameState {
        GameState::new(SessionConfig {
            width,
            height,
            tile_type_count: 4,
            seed: 99,
            move_limit: 10,
            objective: ObjectiveSpec::score_target(100),
            target_difficulty: 0.5,
            level: LevelConfig::empty(width, height),
            simulation: SimulationConfig::default_constants(),
        })
        .expect("valid config")
    }

    fn place(state: &mut GameState, position: Position, color: TileColor) {
        let id = state.next_tile_id();
        let tile = Tile::new(id, color, BombKind::None, ContinuousPosition::from_cell(position));
        assert!(state.set_tile(position, tile));
    }

    fn run_to_stable(gravity: &mut ColumnGravity, state: &mut GameState, max_ticks: u32) -> bool {
        let mut collector = NullCollector;
        for _ in 0..max_ticks {
            if gravity.step(state, 1.0 / 60.0, &mut collector) {
                return true;
            }
        }
        false
    }

    #[test]
    fn a_floating_tile_falls_to_the_bottom_of_an_empty_column() {
        let mut state = state(3, 3);
        place(&mut state, Position::new(1, 0), TileColor::Red);
        let mut gravity = ColumnGravity::new();
        assert!(run_to_stable(&mut gravity, &mut state, 200));
        assert!(!state.tile(Position::new(1, 2)).unwrap().is_empty());
        assert!(state.tile(Position::new(1, 0)).unwrap().is_empty());
    }

    #[test]
    fn a_stack_of_tiles_settles_without_gaps() {
        let mut state = state(2, 3);
        place(&mut state, Position::new(0, 0), TileColor::Red);
        place(&mut state, Position::new(0, 1), TileColor::Blue);
        let mut gravity = ColumnGravity::new();
        assert!(run_to_stable(&mut gravity, &mut state, 200));
        assert!(!state.tile(Position::new(0, 1)).unwrap().is_empty());
        assert!(!state.tile(Position::new(0, 2)).unwrap().is_empty());
        assert!(state.tile(Position::new(0, 0)).unwrap().is_empty());
    }

    #[test]
    fn a_suspended_tile_redirects_a_falling_tile_diagonally() {
        let mut state = state(3, 3);
        place(&mut state, Position::new(1, 2), TileColor::Blue);
        state.tile_mut(Position::new(1, 2)).unwrap().is_suspended = true;
        place(&mut state, Position::new(1, 0), TileColor::Green);
        let mut gravity = ColumnGravity::new();
        assert!(run_to_stable(&mut gravity, &mut state, 300));
        let left = !state.tile(Position::new(0, 2)).unwrap().is_empty();
        let right = !state.tile(Position::new(2, 2)).unwrap().is_empty();
        assert_ne!(left, right);
    }

    #[test]
    fn a_trailing_tile_follows_rather_than_overtakes() {
        let mut state = state(1, 4);
        place(&mut state, Position::new(0, 0), TileColor::Red);
        place(&mut state, Position::new(0, 1), TileColor::Blue);
        let mut gravity = ColumnGravity::new();
        assert!(run_to_stable(&mut gravity, &mut state, 300));
        let bottom = state.tile(Position::new(0, 3)).unwrap().color;
        let above = state.tile(Position::new(0, 2)).unwrap().color;
        assert_eq!(bottom, TileColor::Blue);
        assert_eq!(above, TileColor::Red);
    }

    #[test]
    fn refill_fills_empty_top_row_cells_and_leaves_occupied_ones_alone() {
        let mut state = state(2, 2);
        place(&mut state, Position::new(0, 0), TileColor::Purple);
        let mut refill = TopRowRefill::new(WeightedSpawnModel::pinned(SpawnStrategy::Balance));
        let mut collector = NullCollector;
        refill.refill(&mut state, &mut collector);
        assert_eq!(state.tile(Position::new(0, 0)).unwrap().color, TileColor::Purple);
        assert!(!state.tile(Position::new(1, 0)).unwrap().is_empty());
        let id = state.tile(Position::new(1, 0)).unwrap().id;
        assert_ne!(id, TileId::EMPTY);
    }
}
