#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared value types and contracts for the match-3 simulation kernel.
//!
//! This crate defines the data the rest of the workspace operates on — tiles,
//! grid geometry, events, the error taxonomy, RNG domain tags, and the
//! capability traits that the orchestrator assembles into a running session —
//! without owning any mutable simulation state itself.

mod cover;
mod error;
mod event;
mod explosion;
mod geometry;
mod ground;
mod ids;
mod match_group;
mod projectile;
mod rng_domain;
mod session_config;
mod tile;
mod traits;

pub use cover::{Cover, CoverKind};
pub use error::{ConfigError, InvalidInput};
pub use event::{DestroyReason, Event, EventKind};
pub use explosion::{chebyshev_distance, Explosion};
pub use geometry::{index, ContinuousPosition, Position, Velocity};
pub use ground::{Ground, GroundKind};
pub use ids::TileId;
pub use match_group::MatchGroup;
pub use projectile::{Projectile, ProjectileFlightPhase, TargetMode};
pub use rng_domain::{fnv1a_hash, RngDomain, FNV_OFFSET_BASIS, FNV_PRIME};
pub use session_config::{
    LevelConfig, ObjectiveKind, ObjectiveSpec, SessionConfig, SimulationConfig,
};
pub use tile::{BombKind, Tile, TileColor};
pub use traits::{
    EventCollector, ExplosionSystem, MatchFinder, MatchProcessor, NullCollector,
    PhysicsSimulation, PowerUpHandler, ProjectileSystem, RefillSystem, SpawnModel,
};

/// Minimum board dimension accepted by session construction.
pub const MIN_GRID_DIMENSION: u32 = 3;
/// Maximum board dimension accepted by session construction.
pub const MAX_GRID_DIMENSION: u32 = 12;
/// Minimum number of distinct tile colors a session may be configured with.
pub const MIN_TILE_TYPES: u32 = 2;
/// Maximum number of distinct tile colors a session may be configured with.
pub const MAX_TILE_TYPES: u32 = 6;
