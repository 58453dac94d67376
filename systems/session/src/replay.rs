//! Deterministic replay: a session's config plus the input log needed to
//! reconstruct its exact trajectory.

use serde::{Deserialize, Serialize};

use match3_core::{Position, SessionConfig, TileColor};
use match3_spawn_model::SpawnStrategy;

/// A single player (or AI) input, stamped with the tick it was applied on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RecordedInput {
    /// A swap attempt between two adjacent cells.
    Move {
        /// Tick the input was applied on.
        tick: u64,
        /// First cell named by the swap.
        from: Position,
        /// Second cell named by the swap.
        to: Position,
    },
    /// A tap on a single cell (selection toggle or bomb activation).
    Tap {
        /// Tick the input was applied on.
        tick: u64,
        /// Cell tapped.
        position: Position,
    },
    /// A direct bomb activation, bypassing tap-to-select.
    ActivateBomb {
        /// Tick the input was applied on.
        tick: u64,
        /// Cell the bomb occupies.
        position: Position,
    },
}

impl RecordedInput {
    /// The tick this input was recorded against.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        match self {
            Self::Move { tick, .. } | Self::Tap { tick, .. } | Self::ActivateBomb { tick, .. } => *tick,
        }
    }
}

/// Everything needed to reconstruct a session's exact trajectory: its
/// original configuration and construction choices, plus the ordered log of
/// inputs applied to it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayBlob {
    /// Configuration the session was originally built from.
    pub config: SessionConfig,
    /// Color-collection tracking, if the session was built with one.
    pub tracked_color: Option<TileColor>,
    /// Spawn bias the session was built with, if the live-signal table was
    /// overridden with a pinned strategy.
    pub spawn_strategy: Option<SpawnStrategy>,
    /// Ordered input log.
    pub log: Vec<RecordedInput>,
}
