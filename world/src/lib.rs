#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for the match-3 simulation kernel.

mod collector;
mod grid;
mod pool;
pub mod query;

pub use collector::BufferedCollector;
pub use grid::neighbors4;
pub use pool::{Pool, PooledBuf, Poolable, StructuralKind};

use match3_core::{
    index, BombKind, ConfigError, Cover, Explosion, Ground, InvalidInput, MatchGroup,
    ObjectiveKind, ObjectiveSpec, Position, Projectile, SessionConfig, SimulationConfig,
    TargetMode, Tile, TileId,
};
use match3_rng::SeedManager;

/// A swap awaiting resolution: the two cells have already been exchanged on
/// the board; if no match is found before the animation window elapses the
/// session swaps them back and emits a revert event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingSwap {
    /// First cell named by the player's swap.
    pub a: Position,
    /// Second cell named by the player's swap.
    pub b: Position,
    /// Seconds elapsed since the swap was applied.
    pub elapsed: f64,
    /// Whether resolving this swap found an organic match at either endpoint.
    pub had_match: bool,
    /// Whether either endpoint carries a bomb (or either side is a color bomb),
    /// so the swap should resolve into bomb activation rather than a plain
    /// match or a revert.
    pub is_bomb_swap: bool,
}

/// The authoritative, mutable board the simulation kernel operates on.
///
/// System crates receive `&mut GameState` for the duration of a single call
/// and must not retain any reference into it past that call; the
/// [`match3_core`] capability traits this crate's consumers implement are
/// generic specifically to keep this crate the only place the type is named
/// concretely.
#[derive(Clone, Debug)]
pub struct GameState {
    width: u32,
    height: u32,
    tile_type_count: u32,
    tiles: Vec<Tile>,
    ground: Vec<Ground>,
    cover: Vec<Cover>,
    next_tile_id: TileId,
    score: u32,
    moves_used: u32,
    move_limit: u32,
    objective: ObjectiveSpec,
    objective_progress: u32,
    target_difficulty: f32,
    failed_attempts: u32,
    selected: Option<Position>,
    pending_swap: Option<PendingSwap>,
    staged_matches: Vec<MatchGroup>,
    active_explosions: Vec<Explosion>,
    active_projectiles: Vec<Projectile>,
    chain_triggered_bombs: Vec<Position>,
    projectile_impacts: Vec<Position>,
    paused: bool,
    tick: u64,
    simulation_time: f64,
    simulation: SimulationConfig,
    rng: SeedManager,
    pool: Pool,
}

impl GameState {
    /// Builds a new board from `config`, validating it first.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let cell_count = (config.width as usize) * (config.height as usize);
        let tiles = (0..cell_count)
            .map(|offset| {
                let x = (offset % config.width as usize) as u32;
                let y = (offset / config.width as usize) as u32;
                Tile::empty(match3_core::ContinuousPosition::from_cell(Position::new(x, y)))
            })
            .collect();
        Ok(Self {
            width: config.width,
            height: config.height,
            tile_type_count: config.tile_type_count,
            tiles,
            ground: config.level.ground,
            cover: config.level.cover,
            next_tile_id: TileId::EMPTY,
            score: 0,
            moves_used: 0,
            move_limit: config.move_limit,
            objective: config.objective,
            objective_progress: 0,
            target_difficulty: config.target_difficulty,
            failed_attempts: 0,
            selected: None,
            pending_swap: None,
            staged_matches: Vec::new(),
            active_explosions: Vec::new(),
            active_projectiles: Vec::new(),
            chain_triggered_bombs: Vec::new(),
            projectile_impacts: Vec::new(),
            paused: false,
            tick: 0,
            simulation_time: 0.0,
            simulation: config.simulation,
            rng: SeedManager::new(config.seed),
            pool: Pool::new(),
        })
    }

    /// Board width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Board height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of distinct base tile colors in play.
    #[must_use]
    pub const fn tile_type_count(&self) -> u32 {
        self.tile_type_count
    }

    /// Reports whether `position` lies within the board.
    #[must_use]
    pub fn is_valid(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    fn index_of(&self, position: Position) -> Option<usize> {
        if self.is_valid(position) {
            Some(index(self.width, position.x, position.y))
        } else {
            None
        }
    }

    /// Returns the tile at `position`, or `None` if out of bounds.
    #[must_use]
    pub fn tile(&self, position: Position) -> Option<&Tile> {
        self.index_of(position).map(|i| &self.tiles[i])
    }

    /// Returns a mutable reference to the tile at `position`, or `None` if out of bounds.
    pub fn tile_mut(&mut self, position: Position) -> Option<&mut Tile> {
        let index = self.index_of(position)?;
        Some(&mut self.tiles[index])
    }

    /// Places `tile` at `position`, discarding whatever previously occupied it.
    ///
    /// Returns `false` without modifying anything if `position` is out of bounds.
    pub fn set_tile(&mut self, position: Position, tile: Tile) -> bool {
        match self.index_of(position) {
            Some(index) => {
                self.tiles[index] = tile;
                true
            }
            None => false,
        }
    }

    /// Returns the ground layer at `position`, or `None` if out of bounds.
    #[must_use]
    pub fn ground(&self, position: Position) -> Option<&Ground> {
        self.index_of(position).map(|i| &self.ground[i])
    }

    /// Returns a mutable reference to the ground layer at `position`, or `None` if out of bounds.
    pub fn ground_mut(&mut self, position: Position) -> Option<&mut Ground> {
        let index = self.index_of(position)?;
        Some(&mut self.ground[index])
    }

    /// Returns the cover layer at `position`, or `None` if out of bounds.
    #[must_use]
    pub fn cover(&self, position: Position) -> Option<&Cover> {
        self.index_of(position).map(|i| &self.cover[i])
    }

    /// Returns a mutable reference to the cover layer at `position`, or `None` if out of bounds.
    pub fn cover_mut(&mut self, position: Position) -> Option<&mut Cover> {
        let index = self.index_of(position)?;
        Some(&mut self.cover[index])
    }

    /// Iterates every cell's position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// Allocates the next tile identifier.
    pub fn next_tile_id(&mut self) -> TileId {
        self.next_tile_id = self.next_tile_id.next();
        self.next_tile_id
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Adds `amount` to the score and updates objective progress if the
    /// objective is score-based. Returns the new total.
    pub fn add_score(&mut self, amount: u32) -> u32 {
        self.score = self.score.saturating_add(amount);
        if self.objective.kind == ObjectiveKind::ScoreTarget {
            self.objective_progress = self.score.min(self.objective.target);
        }
        self.score
    }

    /// The objective this board is being played toward.
    #[must_use]
    pub const fn objective(&self) -> ObjectiveSpec {
        self.objective
    }

    /// Current progress toward the objective's target.
    #[must_use]
    pub const fn objective_progress(&self) -> u32 {
        self.objective_progress
    }

    /// Directly sets objective progress, clamped to the objective's target.
    /// Used by ground-clear and color-collection objectives, which are not
    /// driven by score.
    pub fn set_objective_progress(&mut self, progress: u32) {
        self.objective_progress = progress.min(self.objective.target);
    }

    /// Reports whether the objective's target has been reached.
    #[must_use]
    pub const fn objective_complete(&self) -> bool {
        self.objective_progress >= self.objective.target
    }

    /// Moves consumed so far.
    #[must_use]
    pub const fn moves_used(&self) -> u32 {
        self.moves_used
    }

    /// Total moves available for this session.
    #[must_use]
    pub const fn move_limit(&self) -> u32 {
        self.move_limit
    }

    /// Reports whether the move budget has been exhausted.
    #[must_use]
    pub const fn moves_exhausted(&self) -> bool {
        self.moves_used >= self.move_limit
    }

    /// Consumes one move from the budget.
    pub fn consume_move(&mut self) {
        self.moves_used = self.moves_used.saturating_add(1);
    }

    /// The session's configured target-difficulty scalar, in `[0, 1]`.
    #[must_use]
    pub const fn target_difficulty(&self) -> f32 {
        self.target_difficulty
    }

    /// Consecutive swaps that reverted without producing a match or bomb
    /// activation since the last one that did.
    #[must_use]
    pub const fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// Records one more reverted swap against the failed-attempt streak.
    pub fn record_failed_attempt(&mut self) {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
    }

    /// Resets the failed-attempt streak, called once a swap actually resolves
    /// into a match or bomb activation.
    pub fn reset_failed_attempts(&mut self) {
        self.failed_attempts = 0;
    }

    /// The cell the player currently has selected, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<Position> {
        self.selected
    }

    /// Sets the player's current selection.
    pub fn set_selected(&mut self, position: Option<Position>) {
        self.selected = position;
    }

    /// The swap currently awaiting resolution, if any.
    #[must_use]
    pub const fn pending_swap(&self) -> Option<PendingSwap> {
        self.pending_swap
    }

    /// Exchanges the tiles at `a` and `b` in place, validating bounds and
    /// orthogonal adjacency first.
    pub fn swap_tiles(&mut self, a: Position, b: Position) -> Result<(), InvalidInput> {
        let index_a = self
            .index_of(a)
            .ok_or(InvalidInput::PositionOutOfBounds { x: a.x, y: a.y })?;
        let index_b = self
            .index_of(b)
            .ok_or(InvalidInput::PositionOutOfBounds { x: b.x, y: b.y })?;
        if !a.is_orthogonally_adjacent(b) {
            return Err(InvalidInput::NonAdjacentSwap);
        }
        self.tiles.swap(index_a, index_b);
        let mut tile_a = self.tiles[index_a];
        let mut tile_b = self.tiles[index_b];
        tile_a.position = match3_core::ContinuousPosition::from_cell(a);
        tile_b.position = match3_core::ContinuousPosition::from_cell(b);
        self.tiles[index_a] = tile_a;
        self.tiles[index_b] = tile_b;
        Ok(())
    }

    /// Begins tracking a swap awaiting resolution.
    pub fn begin_pending_swap(&mut self, a: Position, b: Position) {
        self.pending_swap = Some(PendingSwap {
            a,
            b,
            elapsed: 0.0,
            had_match: false,
            is_bomb_swap: false,
        });
    }

    /// Records whether the pending swap found a match or involves a bomb,
    /// once the caller has inspected the post-swap board. No-op if no swap is
    /// pending.
    pub fn set_pending_swap_resolution(&mut self, had_match: bool, is_bomb_swap: bool) {
        if let Some(pending) = self.pending_swap.as_mut() {
            pending.had_match = had_match;
            pending.is_bomb_swap = is_bomb_swap;
        }
    }

    /// Advances the pending swap's elapsed timer by `dt` seconds, returning the
    /// updated record if one is still pending.
    pub fn advance_pending_swap(&mut self, dt: f64) -> Option<PendingSwap> {
        if let Some(pending) = self.pending_swap.as_mut() {
            pending.elapsed += dt;
            Some(*pending)
        } else {
            None
        }
    }

    /// Clears the pending swap record.
    pub fn clear_pending_swap(&mut self) {
        self.pending_swap = None;
    }

    /// Whether the session is currently paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Sets the paused flag.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// The current tick counter.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Total elapsed simulation time, in seconds.
    #[must_use]
    pub const fn simulation_time(&self) -> f64 {
        self.simulation_time
    }

    /// Advances the tick counter and simulation clock by one fixed tick.
    pub fn advance_clock(&mut self) {
        self.tick += 1;
        self.simulation_time += self.simulation.tick_seconds;
    }

    /// The physical constants this board was configured with.
    #[must_use]
    pub const fn simulation_config(&self) -> SimulationConfig {
        self.simulation
    }

    /// Mutable access to the RNG domain manager.
    pub fn rng_mut(&mut self) -> &mut SeedManager {
        &mut self.rng
    }

    /// Returns a handle to this board's scratch-buffer registry. Cheap to
    /// clone: a checkout made through the returned handle is an owned value,
    /// independent of any borrow on the board itself.
    #[must_use]
    pub fn pool(&self) -> Pool {
        self.pool.clone()
    }

    /// Replaces the RNG with a freshly seeded one, discarding every derived
    /// domain stream. Used when branching a cloned board onto a new seed.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SeedManager::new(seed);
    }

    /// Adds a group found by a match finder to the staged list awaiting processing.
    pub fn stage_match(&mut self, group: MatchGroup) {
        self.staged_matches.push(group);
    }

    /// Reports whether any match groups are currently staged.
    #[must_use]
    pub fn has_staged_matches(&self) -> bool {
        !self.staged_matches.is_empty()
    }

    /// Removes and returns every staged match group, leaving none staged.
    pub fn take_staged_matches(&mut self) -> Vec<MatchGroup> {
        std::mem::take(&mut self.staged_matches)
    }

    /// Begins a new wave-stepped detonation over `footprint`, marking every
    /// footprint cell's tile as suspended so physics leaves it alone until its
    /// wave is processed. Returns the allocated explosion's id.
    pub fn begin_explosion(&mut self, origin: Position, footprint: &[Position], source: BombKind) -> TileId {
        let id = self.next_tile_id();
        for &cell in footprint {
            if let Some(tile) = self.tile_mut(cell) {
                if !tile.is_empty() {
                    tile.is_suspended = true;
                }
            }
        }
        self.active_explosions
            .push(Explosion::new(id, origin, source, footprint));
        id
    }

    /// Mutable access to every currently detonating explosion.
    pub fn explosions_mut(&mut self) -> &mut Vec<Explosion> {
        &mut self.active_explosions
    }

    /// Reports whether any explosion is currently in progress.
    #[must_use]
    pub fn has_active_explosions(&self) -> bool {
        !self.active_explosions.is_empty()
    }

    /// Queues a bomb tile an explosion wave reached for immediate activation
    /// on the next tick, rather than destroying it outright.
    pub fn stage_chain_bomb(&mut self, position: Position) {
        self.chain_triggered_bombs.push(position);
    }

    /// Removes and returns every chain-triggered bomb position queued since
    /// the last call.
    pub fn take_chain_triggered_bombs(&mut self) -> Vec<Position> {
        std::mem::take(&mut self.chain_triggered_bombs)
    }

    /// Launches a new UFO projectile from `origin`. Returns the allocated
    /// projectile's id.
    pub fn begin_projectile(&mut self, origin: Position, target_mode: TargetMode) -> TileId {
        let id = self.next_tile_id();
        self.active_projectiles.push(Projectile::new(id, origin, target_mode));
        id
    }

    /// Mutable access to every currently in-flight projectile.
    pub fn projectiles_mut(&mut self) -> &mut Vec<Projectile> {
        &mut self.active_projectiles
    }

    /// Reports whether any projectile is currently in flight.
    #[must_use]
    pub fn has_active_projectiles(&self) -> bool {
        !self.active_projectiles.is_empty()
    }

    /// Queues a cell a projectile impacted on for the orchestrator to clear
    /// through the ordinary match-destroy path.
    pub fn stage_projectile_impact(&mut self, position: Position) {
        self.projectile_impacts.push(position);
    }

    /// Removes and returns every projectile impact position queued since the
    /// last call.
    pub fn take_projectile_impacts(&mut self) -> Vec<Position> {
        std::mem::take(&mut self.projectile_impacts)
    }
}
