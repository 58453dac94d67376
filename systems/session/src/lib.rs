#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Orchestrates one playable match-3 board: owns the authoritative
//! [`GameState`] plus one instance of every capability system, and drives
//! them through the swap-accept/revert protocol and the per-tick phase
//! sequence that turns a player's move into a settled board.

mod replay;
mod tick;

pub use replay::{RecordedInput, ReplayBlob};
pub use tick::{SimulationResult, TickResult};

use match3_core::{
    ConfigError, ContinuousPosition, DestroyReason, Event, EventCollector, EventKind,
    ExplosionSystem, MatchFinder, MatchProcessor, NullCollector, PhysicsSimulation, Position,
    PowerUpHandler, ProjectileSystem, RefillSystem, SessionConfig, Tile, TileColor,
};
use match3_explosion::WaveExplosion;
use match3_match_finder::GroupMatchFinder;
use match3_match_processor::{GroupMatchProcessor, POINTS_PER_TILE};
use match3_physics::{ColumnGravity, TopRowRefill};
use match3_power_up::BombEffects;
use match3_projectile::UfoFlight;
use match3_spawn_model::{SpawnStrategy, WeightedSpawnModel};
use match3_world::{BufferedCollector, GameState};

/// Failure produced while decoding or replaying a [`ReplayBlob`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The blob's embedded configuration failed validation, or the blob
    /// itself could not be decoded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A log entry named a tick earlier than one already replayed, which
    /// cannot happen for a blob produced by [`Session::to_replay_blob`] and
    /// indicates a corrupted or hand-edited log.
    #[error("replay log entry at tick {logged} precedes the already-replayed tick {current}")]
    ReplayOutOfOrder {
        /// The session's tick at the moment the out-of-order entry was reached.
        current: u64,
        /// The tick the log entry claimed to have been applied on.
        logged: u64,
    },
}

/// Assembles a [`Session`] from a [`SessionConfig`] plus the optional
/// construction choices the plain constructor defaults: which spawn bias to
/// use and which color, if any, a `CollectColor` objective tracks.
pub struct SessionBuilder {
    config: SessionConfig,
    spawn_strategy: Option<SpawnStrategy>,
    tracked_color: Option<TileColor>,
}

impl SessionBuilder {
    /// Starts a builder for `config`, defaulting to the rule-based spawn
    /// model (strategy recomputed from live signals every spawn) and no
    /// color tracking.
    #[must_use]
    pub const fn new(config: SessionConfig) -> Self {
        Self {
            config,
            spawn_strategy: None,
            tracked_color: None,
        }
    }

    /// Pins the spawn model to `strategy`, overriding the rule-based
    /// per-spawn selection. Intended for replay and scripted-scenario setups
    /// that need a fixed, reproducible bias.
    #[must_use]
    pub const fn spawn_strategy(mut self, strategy: SpawnStrategy) -> Self {
        self.spawn_strategy = Some(strategy);
        self
    }

    /// Tracks clears of `color` toward a `CollectColor` objective.
    #[must_use]
    pub const fn tracked_color(mut self, color: TileColor) -> Self {
        self.tracked_color = Some(color);
        self
    }

    /// Builds the session, validating the configuration first.
    pub fn build(self) -> Result<Session, ConfigError> {
        let state = GameState::new(self.config.clone())?;
        let match_processor = match self.tracked_color {
            Some(color) => GroupMatchProcessor::with_tracked_color(color),
            None => GroupMatchProcessor::new(),
        };
        let spawn_model = match self.spawn_strategy {
            Some(strategy) => WeightedSpawnModel::pinned(strategy),
            None => WeightedSpawnModel::new(),
        };
        Ok(Session {
            config: self.config,
            spawn_strategy: self.spawn_strategy,
            tracked_color: self.tracked_color,
            state,
            match_finder: GroupMatchFinder::new(),
            match_processor,
            physics: ColumnGravity::new(),
            refill: TopRowRefill::new(spawn_model),
            explosion: WaveExplosion::new(),
            projectile: UfoFlight::new(),
            power_up: BombEffects::new(),
            events: BufferedCollector::new(),
            log: Vec::new(),
        })
    }
}

/// A single playable match-3 board: the authoritative state plus one
/// instance of every capability system that acts on it.
#[derive(Clone)]
pub struct Session {
    config: SessionConfig,
    spawn_strategy: Option<SpawnStrategy>,
    tracked_color: Option<TileColor>,
    state: GameState,
    match_finder: GroupMatchFinder,
    match_processor: GroupMatchProcessor,
    physics: ColumnGravity,
    refill: TopRowRefill<WeightedSpawnModel>,
    explosion: WaveExplosion,
    projectile: UfoFlight,
    power_up: BombEffects,
    events: BufferedCollector,
    log: Vec<RecordedInput>,
}

impl Session {
    /// Builds a session from `config` with default construction choices. Use
    /// [`SessionBuilder`] to pick a spawn bias or track a collection color.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        SessionBuilder::new(config).build()
    }

    /// Read-only access to the authoritative board state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access to the authoritative board state, for presetting a
    /// board (placing specific tiles, bombs or ground) ahead of a scripted
    /// scenario. Ordinary play only needs [`Self::apply_move`]/
    /// [`Self::handle_tap`]/[`Self::tick`]; this exists for tests and
    /// deterministic scenario setup that can't otherwise reach inside the
    /// board before the first tick.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Every event collected since the last [`Self::drain_events`] call.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    /// Removes and returns every event collected since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    /// Attempts to swap the tiles at `from` and `to`. Both cells must lie on
    /// the board and be orthogonally adjacent; swapping two empty cells is
    /// rejected. Once accepted the swap always resolves on a later tick, via
    /// bomb activation, a processed match, or (if neither applies) a revert.
    ///
    /// Returns whether the swap was accepted into the pending-swap slot, not
    /// whether it will ultimately stick.
    pub fn apply_move(&mut self, from: Position, to: Position) -> bool {
        if !self.state.is_valid(from) || !self.state.is_valid(to) {
            return false;
        }
        if !from.is_orthogonally_adjacent(to) {
            return false;
        }
        let both_empty = self
            .state
            .tile(from)
            .map(|t| t.is_empty())
            .unwrap_or(true)
            && self.state.tile(to).map(|t| t.is_empty()).unwrap_or(true);
        if both_empty {
            return false;
        }
        if self.state.swap_tiles(from, to).is_err() {
            return false;
        }

        self.log.push(RecordedInput::Move {
            tick: self.state.tick(),
            from,
            to,
        });
        self.state.begin_pending_swap(from, to);

        let is_bomb_swap = self.is_bomb_swap(from, to);
        let had_match = self
            .match_finder
            .find_matches(&mut self.state, &mut self.events);
        self.state.set_pending_swap_resolution(had_match, is_bomb_swap);

        self.events.collect(Event::new(
            self.state.tick(),
            self.state.simulation_time(),
            EventKind::SwapAccepted { a: from, b: to },
        ));
        true
    }

    fn is_bomb_swap(&self, a: Position, b: Position) -> bool {
        let kind_a = self.state.tile(a).map(|t| t.bomb).unwrap_or_default();
        let kind_b = self.state.tile(b).map(|t| t.bomb).unwrap_or_default();
        kind_a.is_bomb() || kind_b.is_bomb()
    }

    /// Taps a single cell: toggles selection, attempts a swap against the
    /// currently-selected adjacent cell, or activates a bomb tapped directly.
    /// Returns whether the tap was acted on at all (a tap on an empty cell,
    /// or on an out-of-bounds position, is ignored).
    pub fn handle_tap(&mut self, position: Position) -> bool {
        if !self.state.is_valid(position) {
            return false;
        }
        let Some(tile) = self.state.tile(position) else {
            return false;
        };
        if tile.is_empty() {
            return false;
        }
        if tile.bomb.is_bomb() {
            self.log.push(RecordedInput::Tap {
                tick: self.state.tick(),
                position,
            });
            return self.activate_bomb(position);
        }

        match self.state.selected() {
            Some(selected) if selected == position => {
                self.state.set_selected(None);
                self.log.push(RecordedInput::Tap {
                    tick: self.state.tick(),
                    position,
                });
                true
            }
            Some(selected) if selected.is_orthogonally_adjacent(position) => {
                self.state.set_selected(None);
                self.apply_move(selected, position)
            }
            _ => {
                self.state.set_selected(Some(position));
                self.log.push(RecordedInput::Tap {
                    tick: self.state.tick(),
                    position,
                });
                true
            }
        }
    }

    /// Activates the bomb at `position` directly, outside the tap-to-select
    /// flow. Returns `false` if the cell holds no bomb.
    pub fn activate_bomb(&mut self, position: Position) -> bool {
        let is_bomb = self
            .state
            .tile(position)
            .map(|t| t.bomb.is_bomb())
            .unwrap_or(false);
        if !is_bomb {
            return false;
        }
        self.power_up
            .activate(&mut self.state, position, &mut self.events);
        true
    }

    /// Whether the session is currently paused; a paused session still
    /// accepts moves but [`Self::tick`] becomes a no-op.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    /// Pauses or resumes the simulation clock.
    pub fn set_paused(&mut self, paused: bool) {
        self.state.set_paused(paused);
    }

    /// Advances the simulation by one fixed tick, running every phase in
    /// order: resolve any pending swap, refill, step projectiles and clear
    /// their impacts, step explosions and activate any chain-triggered bombs,
    /// step physics, then (unless a swap animation is still in flight)
    /// process stable matches. Returns a no-op result immediately if paused.
    pub fn tick(&mut self, dt: f64) -> TickResult {
        if self.state.is_paused() {
            return TickResult {
                tick: self.state.tick(),
                elapsed_time: self.state.simulation_time(),
                is_stable: true,
                has_active_projectiles: self.state.has_active_projectiles(),
                has_falling_tiles: false,
                has_pending_matches: self.state.has_staged_matches(),
                delta_time: 0.0,
            };
        }
        let span = tracing::debug_span!("tick", tick = self.state.tick());
        let _enter = span.enter();
        let mut events = std::mem::take(&mut self.events);
        let result = self.advance(dt, &mut events);
        self.events = events;
        result
    }

    /// Runs `tick` with the player event stream suppressed (a
    /// [`NullCollector`] stands in) until the board settles or
    /// [`match3_core::SimulationConfig::max_stabilization_ticks`] is reached,
    /// whichever comes first. Intended for AI move evaluation, where the
    /// caller wants the resulting board, not a blow-by-blow event log.
    pub fn run_until_stable(&mut self) -> SimulationResult {
        let max_ticks = self.state.simulation_config().max_stabilization_ticks;
        let dt = self.state.simulation_config().tick_seconds;
        let score_before = self.state.score();

        let mut tally = Tally::default();
        let mut current_cascade = 0u32;
        let mut reached_stability = false;

        for _ in 0..max_ticks {
            let mut sink = StatsCollector::new(NullCollector, &mut tally);
            let result = self.advance(dt, &mut sink);

            if tally.matches_this_tick {
                current_cascade += 1;
            } else {
                current_cascade = 0;
            }
            tally.max_cascade_depth = tally.max_cascade_depth.max(current_cascade);
            tally.matches_this_tick = false;

            if result.is_stable {
                reached_stability = true;
                break;
            }
        }

        if !reached_stability {
            tracing::warn!(max_ticks, "run_until_stable exceeded its tick ceiling without reaching stability");
        }

        SimulationResult {
            tiles_cleared: tally.tiles_cleared,
            matches_processed: tally.matches_processed,
            bombs_activated: tally.bombs_activated,
            max_cascade_depth: tally.max_cascade_depth,
            score_gained: self.state.score().saturating_sub(score_before),
            reached_stability,
        }
    }

    fn advance(&mut self, dt: f64, collector: &mut dyn EventCollector) -> TickResult {
        self.resolve_pending_swap(dt, collector);
        self.refill.refill(&mut self.state, collector);

        self.projectile.step(&mut self.state, dt, collector);
        for position in self.state.take_projectile_impacts() {
            self.destroy_for_reason(position, DestroyReason::Projectile, collector);
        }

        let explosions_active = self.explosion.step(&mut self.state, dt, collector);
        for position in self.state.take_chain_triggered_bombs() {
            self.power_up.activate(&mut self.state, position, collector);
        }

        let physics_stable = self.physics.step(&mut self.state, dt, collector);

        if self.state.pending_swap().is_none() {
            let _ = self.match_finder.find_matches(&mut self.state, collector);
            self.match_processor.process_matches(&mut self.state, collector);
        }

        self.state.advance_clock();

        let has_active_projectiles = self.state.has_active_projectiles();
        let has_pending_matches = self.state.has_staged_matches();
        let needs_refill = (0..self.state.width())
            .any(|x| self.state.tile(Position::new(x, 0)).map_or(false, Tile::is_empty));
        let is_stable = physics_stable
            && !needs_refill
            && !has_active_projectiles
            && !explosions_active
            && !has_pending_matches
            && self.state.pending_swap().is_none();

        TickResult {
            tick: self.state.tick(),
            elapsed_time: self.state.simulation_time(),
            is_stable,
            has_active_projectiles,
            has_falling_tiles: !physics_stable,
            has_pending_matches,
            delta_time: dt,
        }
    }

    /// Advances a pending swap's animation timer and, once it completes,
    /// resolves it: reverts a swap that found neither a match nor a bomb,
    /// activates bomb(s) for a swap that did involve one (discarding any
    /// organic match the non-bomb side might also have landed on, matching
    /// how a bomb swap always takes priority over the tile it trades with),
    /// or simply clears the record so the next phase processes the staged
    /// match against the settled board.
    fn resolve_pending_swap(&mut self, dt: f64, collector: &mut dyn EventCollector) {
        let Some(pending) = self.state.advance_pending_swap(dt) else {
            return;
        };
        let swap_duration = self.state.simulation_config().swap_animation_seconds;
        if pending.elapsed < swap_duration {
            return;
        }

        if !pending.had_match && !pending.is_bomb_swap {
            let _ = self.state.take_staged_matches();
            let _ = self.state.swap_tiles(pending.a, pending.b);
            self.state.clear_pending_swap();
            self.state.record_failed_attempt();
            collector.collect(Event::new(
                self.state.tick(),
                self.state.simulation_time(),
                EventKind::SwapReverted {
                    a: pending.a,
                    b: pending.b,
                },
            ));
            return;
        }

        if pending.is_bomb_swap {
            let _ = self.state.take_staged_matches();
            let kind_a = self.state.tile(pending.a).map(|t| t.bomb).unwrap_or_default();
            let kind_b = self.state.tile(pending.b).map(|t| t.bomb).unwrap_or_default();
            self.state.clear_pending_swap();
            self.state.reset_failed_attempts();
            if kind_a.is_bomb() && kind_b.is_bomb() {
                self.power_up
                    .activate_combo(&mut self.state, pending.a, pending.b, collector);
            } else if kind_a.is_bomb() {
                self.power_up.activate(&mut self.state, pending.a, collector);
            } else {
                self.power_up.activate(&mut self.state, pending.b, collector);
            }
            return;
        }

        // The match staged by `apply_move`'s own probing `find_matches` call
        // only ever served to decide `had_match`; discard it here so the
        // unconditional `find_matches` run later this tick (now that the
        // pending swap is clearing) is the sole source of the staged group
        // that actually gets processed, instead of doubling it.
        let _ = self.state.take_staged_matches();
        self.state.reset_failed_attempts();
        self.state.clear_pending_swap();
    }

    /// Clears a single cell outside the ordinary match-group path (currently
    /// only a projectile impact), mirroring the scoring and ground-hit rules
    /// [`GroupMatchProcessor`] applies to a matched cell but tagging the
    /// destruction with `reason` instead of [`DestroyReason::Match`].
    fn destroy_for_reason(&mut self, position: Position, reason: DestroyReason, collector: &mut dyn EventCollector) {
        let Some(tile) = self.state.tile(position) else {
            return;
        };
        if tile.is_empty() {
            return;
        }
        let id = tile.id;
        let color = tile.color;
        let _ = self
            .state
            .set_tile(position, Tile::empty(ContinuousPosition::from_cell(position)));
        collector.collect(Event::new(
            self.state.tick(),
            self.state.simulation_time(),
            EventKind::TileDestroyed { id, position, reason },
        ));

        if let Some(ground) = self.state.ground_mut(position) {
            let kind_before = ground.kind;
            if ground.is_present() && ground.apply_hit() {
                self.match_processor.note_ground_hit();
                collector.collect(Event::new(
                    self.state.tick(),
                    self.state.simulation_time(),
                    EventKind::GroundDestroyed {
                        position,
                        kind: kind_before,
                    },
                ));
            }
        }
        self.match_processor.note_tile_cleared(color);

        let total = self.state.add_score(POINTS_PER_TILE);
        collector.collect(Event::new(
            self.state.tick(),
            self.state.simulation_time(),
            EventKind::ScoreAdded {
                amount: POINTS_PER_TILE,
                total,
            },
        ));

        if self.state.objective().kind != match3_core::ObjectiveKind::ScoreTarget {
            let (ground_cleared, colors_collected) = self.match_processor.tallies();
            let progress = match self.state.objective().kind {
                match3_core::ObjectiveKind::ClearGround => ground_cleared,
                match3_core::ObjectiveKind::CollectColor => colors_collected,
                match3_core::ObjectiveKind::ScoreTarget => unreachable!("excluded above"),
            };
            self.state.set_objective_progress(progress);
        }
        if self.state.objective_complete() {
            collector.collect(Event::new(
                self.state.tick(),
                self.state.simulation_time(),
                EventKind::ObjectiveCompleted,
            ));
        }
    }

    /// Deep-clones this session, optionally reseeding its RNG so a branched
    /// copy explores independent randomness from the point of the clone
    /// rather than replaying the same draws as its parent.
    #[must_use]
    pub fn clone_with_rng(&self, seed: Option<u64>) -> Self {
        let mut cloned = self.clone();
        if let Some(seed) = seed {
            cloned.state.reseed(seed);
        }
        cloned
    }

    /// Serializes this session's original configuration and input log into a
    /// replayable blob.
    #[must_use]
    pub fn to_replay_blob(&self) -> Vec<u8> {
        let blob = ReplayBlob {
            config: self.config.clone(),
            tracked_color: self.tracked_color,
            spawn_strategy: self.spawn_strategy,
            log: self.log.clone(),
        };
        bincode::serialize(&blob).expect("a session's own fields are always serializable")
    }

    /// Reconstructs a session from a blob produced by [`Self::to_replay_blob`],
    /// ticking it forward and re-applying each recorded input at the tick it
    /// was originally applied on.
    pub fn from_replay_blob(bytes: &[u8]) -> Result<Self, SessionError> {
        let blob: ReplayBlob = bincode::deserialize(bytes).map_err(|err| {
            SessionError::Config(ConfigError::ReplayBlobMalformed {
                reason: err.to_string(),
            })
        })?;

        let mut builder = SessionBuilder::new(blob.config);
        if let Some(strategy) = blob.spawn_strategy {
            builder = builder.spawn_strategy(strategy);
        }
        if let Some(color) = blob.tracked_color {
            builder = builder.tracked_color(color);
        }
        let mut session = builder.build()?;
        let dt = session.state.simulation_config().tick_seconds;

        for input in blob.log {
            if input.tick() < session.state.tick() {
                return Err(SessionError::ReplayOutOfOrder {
                    current: session.state.tick(),
                    logged: input.tick(),
                });
            }
            while session.state.tick() < input.tick() {
                let _ = session.tick(dt);
            }
            match input {
                RecordedInput::Move { from, to, .. } => {
                    let _ = session.apply_move(from, to);
                }
                RecordedInput::Tap { position, .. } => {
                    let _ = session.handle_tap(position);
                }
                RecordedInput::ActivateBomb { position, .. } => {
                    let _ = session.activate_bomb(position);
                }
            }
        }

        Ok(session)
    }
}

/// Running totals [`Session::run_until_stable`] accumulates directly,
/// independent of whatever the active event collector does with the events
/// themselves; a [`NullCollector`] silences the event stream, not this
/// bookkeeping.
#[derive(Default)]
struct Tally {
    tiles_cleared: u32,
    matches_processed: u32,
    bombs_activated: u32,
    max_cascade_depth: u32,
    matches_this_tick: bool,
}

/// Decorating collector that tallies into a [`Tally`] as it forwards (or, in
/// [`Session::run_until_stable`]'s case, discards) every event.
struct StatsCollector<'a, C> {
    inner: C,
    tally: &'a mut Tally,
}

impl<'a, C> StatsCollector<'a, C> {
    fn new(inner: C, tally: &'a mut Tally) -> Self {
        Self { inner, tally }
    }
}

impl<C: EventCollector> EventCollector for StatsCollector<'_, C> {
    fn collect(&mut self, event: Event) {
        match event.kind {
            EventKind::TileDestroyed { .. } => self.tally.tiles_cleared += 1,
            EventKind::MatchDetected { .. } => {
                self.tally.matches_processed += 1;
                self.tally.matches_this_tick = true;
            }
            EventKind::ExplosionTriggered { .. } | EventKind::BombComboTriggered { .. } => {
                self.tally.bombs_activated += 1;
            }
            _ => {}
        }
        self.inner.collect(event);
    }

    fn is_buffering(&self) -> bool {
        self.inner.is_buffering()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use match3_core::{LevelConfig, ObjectiveSpec, SimulationConfig};

    fn config(seed: u64) -> SessionConfig {
        SessionConfig {
            width: 6,
            height: 6,
            tile_type_count: 4,
            seed,
            move_limit: 20,
            objective: ObjectiveSpec::score_target(1_000_000),
            target_difficulty: 0.5,
            level: LevelConfig::empty(6, 6),
            simulation: SimulationConfig::default_constants(),
        }
    }

    #[test]
    fn a_fresh_session_can_be_built_and_ticked_without_panicking() {
        let mut session = Session::new(config(12345)).expect("valid config");
        for _ in 0..10 {
            let _ = session.tick(1.0 / 60.0);
        }
    }

    #[test]
    fn run_until_stable_eventually_settles_an_empty_board() {
        let mut session = Session::new(config(12345)).expect("valid config");
        let result = session.run_until_stable();
        assert!(result.reached_stability);
    }

    #[test]
    fn an_out_of_bounds_move_is_rejected() {
        let mut session = Session::new(config(12345)).expect("valid config");
        assert!(!session.apply_move(Position::new(0, 0), Position::new(99, 99)));
    }

    #[test]
    fn a_non_adjacent_move_is_rejected() {
        let mut session = Session::new(config(12345)).expect("valid config");
        assert!(!session.apply_move(Position::new(0, 0), Position::new(2, 2)));
    }

    #[test]
    fn cloning_a_session_preserves_its_board() {
        let mut session = Session::new(config(12345)).expect("valid config");
        session.run_until_stable();
        let clone = session.clone_with_rng(None);
        for position in session.state().positions() {
            assert_eq!(
                session.state().tile(position).unwrap().color,
                clone.state().tile(position).unwrap().color
            );
        }
    }

    #[test]
    fn a_replay_blob_round_trips_through_serialization() {
        let mut session = Session::new(config(12345)).expect("valid config");
        session.run_until_stable();
        let _ = session.apply_move(Position::new(0, 0), Position::new(1, 0));
        for _ in 0..20 {
            let _ = session.tick(1.0 / 60.0);
        }
        let blob = session.to_replay_blob();
        let replayed = Session::from_replay_blob(&blob).expect("blob round-trips");
        assert_eq!(replayed.state().tick(), session.state().tick());
    }
}
