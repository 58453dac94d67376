//! Per-tick and per-run outcome reporting.

/// Outcome of a single [`crate::Session::tick`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickResult {
    /// Tick counter after this step.
    pub tick: u64,
    /// Total simulation time elapsed, in seconds.
    pub elapsed_time: f64,
    /// Whether the board is fully settled: no falling tiles, no empty top-row
    /// cell still awaiting refill, no in-flight projectiles or explosions, no
    /// staged matches, and no pending swap.
    pub is_stable: bool,
    /// Whether any UFO projectile is currently in flight.
    pub has_active_projectiles: bool,
    /// Whether any tile is still integrating gravity.
    pub has_falling_tiles: bool,
    /// Whether a match is staged and waiting on a pending-swap animation to
    /// clear before it can be processed.
    pub has_pending_matches: bool,
    /// The timestep this tick advanced by.
    pub delta_time: f64,
}

/// Aggregate counters accumulated while [`crate::Session::run_until_stable`]
/// drives the board to rest with events suppressed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimulationResult {
    /// Total tiles destroyed across every tick of the run.
    pub tiles_cleared: u32,
    /// Total match groups processed across every tick of the run.
    pub matches_processed: u32,
    /// Total bomb and bomb-combo activations across every tick of the run.
    pub bombs_activated: u32,
    /// The longest unbroken run of consecutive ticks that each processed at
    /// least one match, i.e. the deepest cascade the run produced.
    pub max_cascade_depth: u32,
    /// Score gained over the course of the run.
    pub score_gained: u32,
    /// Whether the board reached stability before the tick ceiling
    /// ([`match3_core::SimulationConfig::max_stabilization_ticks`]).
    pub reached_stability: bool,
}
