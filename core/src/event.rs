//! Simulation events, the record of everything a tick caused to happen.

use serde::{Deserialize, Serialize};

use crate::cover::CoverKind;
use crate::geometry::Position;
use crate::ground::GroundKind;
use crate::ids::TileId;
use crate::tile::{BombKind, TileColor};

/// A single notable occurrence within a tick, timestamped against both the
/// discrete tick counter and the continuous simulation clock.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The tick during which this event occurred.
    pub tick: u64,
    /// Simulation time, in seconds, at the moment of the event.
    pub simulation_time: f64,
    /// What happened.
    pub kind: EventKind,
}

impl Event {
    /// Wraps `kind` with the current tick and simulation time.
    #[must_use]
    pub const fn new(tick: u64, simulation_time: f64, kind: EventKind) -> Self {
        Self {
            tick,
            simulation_time,
            kind,
        }
    }
}

/// Why a tile was removed from the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyReason {
    /// Cleared as part of a connected match.
    Match,
    /// Cleared by an explosion wave.
    Bomb,
    /// Cleared by a projectile impact.
    Projectile,
}

/// The concrete kinds of event the kernel emits.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// A swap was accepted as producing at least one match.
    SwapAccepted { a: Position, b: Position },
    /// A swap produced no match and was reverted after the animation window.
    SwapReverted { a: Position, b: Position },
    /// A connected match group of `size` same-colored tiles was found.
    MatchDetected {
        color: TileColor,
        size: u32,
        origin: Position,
    },
    /// A tile was removed from the board.
    TileDestroyed {
        id: TileId,
        position: Position,
        reason: DestroyReason,
    },
    /// A bomb tile was created at `position`, replacing the match's origin tile.
    BombCreated {
        id: TileId,
        kind: BombKind,
        position: Position,
    },
    /// A ground layer was destroyed at `position`.
    GroundDestroyed { position: Position, kind: GroundKind },
    /// A cover layer absorbed a hit and was destroyed at `position`.
    CoverDestroyed { position: Position, kind: CoverKind },
    /// Score was added, either from a match or a bomb detonation.
    ScoreAdded { amount: u32, total: u32 },
    /// A new tile was spawned at the top of a column during refill.
    TileSpawned {
        id: TileId,
        color: TileColor,
        position: Position,
    },
    /// A previously falling or swapping tile came to rest.
    TileSettled { id: TileId, position: Position },
    /// A bomb at `position` began detonating.
    ExplosionTriggered {
        id: TileId,
        kind: BombKind,
        position: Position,
    },
    /// An explosion's wave front reached `radius` cells from its origin.
    ExplosionWave { origin: Position, radius: u32 },
    /// A UFO projectile was launched from `origin` toward `target`.
    ProjectileLaunched { id: TileId, origin: Position, target: Position },
    /// An in-flight projectile's position was updated.
    ProjectileMoved { id: TileId, position: Position },
    /// An in-flight projectile's target changed mid-flight.
    ProjectileRetargeted { id: TileId, target: Position },
    /// A projectile reached its target and detonated.
    ProjectileImpact { id: TileId, position: Position },
    /// Two bomb tiles combined into a combo effect.
    BombComboTriggered {
        first: BombKind,
        second: BombKind,
        position: Position,
    },
    /// Progress toward the session's objective changed.
    ObjectiveProgress { current: u32, target: u32 },
    /// The session's objective was satisfied.
    ObjectiveCompleted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_carries_its_tick_and_time() {
        let event = Event::new(7, 0.3, EventKind::ObjectiveCompleted);
        assert_eq!(event.tick, 7);
        assert!((event.simulation_time - 0.3).abs() < 1e-12);
        assert_eq!(event.kind, EventKind::ObjectiveCompleted);
    }
}
