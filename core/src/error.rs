//! Error taxonomy for the simulation kernel.
//!
//! Only [`ConfigError`] ever aborts a call outright — it surfaces from
//! session construction when the caller supplied an unsatisfiable
//! configuration. [`InvalidInput`] is returned by the specific runtime call
//! that received it (for example a swap naming an out-of-bounds cell) and
//! never unwinds past that call. The remaining two taxonomy entries named in
//! the design — a mid-tick stall and an internal invariant violation — never
//! propagate at all: a stall is resolved by the detecting phase skipping its
//! work for that tick, and an invariant violation is caught by a
//! `debug_assert!` at the point of detection rather than modeled as a value.

use crate::rng_domain::RngDomain;

/// Failure returned when a session cannot be constructed from the supplied configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Grid width or height fell outside the supported range.
    #[error("grid dimensions {width}x{height} are outside the supported {min}..={max} range")]
    GridDimensionsOutOfRange {
        /// Width requested by the caller.
        width: u32,
        /// Height requested by the caller.
        height: u32,
        /// Minimum supported dimension.
        min: u32,
        /// Maximum supported dimension.
        max: u32,
    },
    /// The configured tile color count fell outside the supported range.
    #[error("tile type count {count} is outside the supported {min}..={max} range")]
    TileTypeCountOutOfRange {
        /// Count requested by the caller.
        count: u32,
        /// Minimum supported count.
        min: u32,
        /// Maximum supported count.
        max: u32,
    },
    /// An RNG domain was requested whose stream could not be derived.
    #[error("rng domain {domain:?} could not be derived from the session seed")]
    RngDomainMisuse {
        /// Domain that failed to derive.
        domain: RngDomain,
    },
    /// A supplied level configuration did not match the session's grid dimensions.
    #[error("level config arrays have length {actual} but the grid expects {expected}")]
    LevelConfigDimensionMismatch {
        /// Length the grid requires (`width * height`).
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// A serialized replay blob could not be decoded into a session and its input log.
    #[error("replay blob could not be decoded: {reason}")]
    ReplayBlobMalformed {
        /// Description of the decoding failure.
        reason: String,
    },
    /// The configured target difficulty fell outside `[0, 1]`.
    #[error("target difficulty {value} is outside the 0.0..=1.0 range")]
    TargetDifficultyOutOfRange {
        /// Value requested by the caller.
        value: f32,
    },
}

/// Failure returned by a specific runtime call given input it cannot act on.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInput {
    /// The named cell lies outside the grid.
    #[error("position ({x}, {y}) is outside the grid bounds")]
    PositionOutOfBounds {
        /// Column that was out of bounds.
        x: u32,
        /// Row that was out of bounds.
        y: u32,
    },
    /// The two cells named by a swap are not orthogonally adjacent.
    #[error("cells are not orthogonally adjacent")]
    NonAdjacentSwap,
}
