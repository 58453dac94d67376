//! Capability traits implemented by each system crate.
//!
//! Every trait is generic over the authoritative state type rather than
//! naming it concretely, since that type is owned by the world crate, which
//! in turn depends on this one. A system crate implements the trait against
//! whatever concrete state type the orchestrator assembles it with; within a
//! call it may only borrow that state exclusively for the duration of the
//! call, never retain a reference past it.

use crate::event::Event;
use crate::geometry::Position;
use crate::tile::TileColor;

/// Sink for events produced while the state is borrowed.
///
/// A null collector that discards everything is used while replaying moves
/// under `run_until_stable` in AI-evaluation mode; a buffering collector is
/// used for the public per-tick API.
pub trait EventCollector {
    /// Records `event`.
    fn collect(&mut self, event: Event);

    /// Reports whether this collector retains what it is given. A null
    /// collector returns `false` so callers can skip building event payloads
    /// they know will be discarded.
    fn is_buffering(&self) -> bool {
        true
    }
}

/// Discards every event it is given.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullCollector;

impl EventCollector for NullCollector {
    fn collect(&mut self, _event: Event) {}

    fn is_buffering(&self) -> bool {
        false
    }
}

/// Scans the board for connected same-color groups and stages bomb creation
/// for groups large enough to earn one.
pub trait MatchFinder<State> {
    /// Finds matches in `state`, returning whether at least one was found.
    fn find_matches(&mut self, state: &mut State, collector: &mut dyn EventCollector) -> bool;
}

/// Scores and clears the groups a [`MatchFinder`] staged, spawning bomb tiles
/// at their chosen origins.
pub trait MatchProcessor<State> {
    /// Resolves all currently staged matches against `state`.
    fn process_matches(&mut self, state: &mut State, collector: &mut dyn EventCollector);
}

/// Integrates tile motion for one fixed timestep.
pub trait PhysicsSimulation<State> {
    /// Advances `state` by `dt` seconds, returning whether every tile is now stable.
    fn step(&mut self, state: &mut State, dt: f64, collector: &mut dyn EventCollector) -> bool;
}

/// Spawns replacement tiles into empty cells vacated by a clear.
pub trait RefillSystem<State> {
    /// Fills empty top-row cells in `state` with newly spawned tiles.
    fn refill(&mut self, state: &mut State, collector: &mut dyn EventCollector);
}

/// Resolves a player- or system-triggered bomb activation at a specific cell.
pub trait PowerUpHandler<State> {
    /// Activates whatever bomb (or bomb combo) occupies `position` in `state`.
    fn activate(&mut self, state: &mut State, position: Position, collector: &mut dyn EventCollector);
}

/// Advances in-flight UFO projectiles.
pub trait ProjectileSystem<State> {
    /// Advances all in-flight projectiles in `state` by `dt` seconds.
    fn step(&mut self, state: &mut State, dt: f64, collector: &mut dyn EventCollector);
}

/// Advances active bomb explosions through their wave radii.
pub trait ExplosionSystem<State> {
    /// Advances all active explosions in `state` by `dt` seconds, returning
    /// whether any explosion is still in progress afterward.
    fn step(&mut self, state: &mut State, dt: f64, collector: &mut dyn EventCollector) -> bool;
}

/// Chooses the color assigned to a newly spawned tile.
pub trait SpawnModel<State> {
    /// Selects the color for a new tile about to be spawned at `position`,
    /// drawing from the state's own RNG domain stream.
    fn select_color(&mut self, state: &mut State, position: Position) -> TileColor;
}
