//! Named RNG domains and the FNV-1a hash used to derive a per-domain seed.

use serde::{Deserialize, Serialize};

/// 64-bit FNV-1a offset basis.
pub const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
/// 64-bit FNV-1a prime.
pub const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A named, independently-seeded random stream.
///
/// Splitting the session seed into domains keeps, for example, physics'
/// diagonal-slide tie-breaking from perturbing the spawn color sequence:
/// each domain advances only when the subsystem that owns it draws from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RngDomain {
    /// The session's own top-level stream (swap resolution tie-breaks, etc).
    Main,
    /// Physics' diagonal-slide direction tie-breaks.
    Physics,
    /// Refill's new-tile color selection.
    Refill,
    /// Spawn-model strategy selection and parameter sampling.
    Spawn,
    /// UFO target selection and mid-flight retargeting.
    PowerUp,
}

impl RngDomain {
    /// A short, stable tag mixed into the FNV hash; stable across releases since
    /// it is part of the derived seed's contract.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Physics => "physics",
            Self::Refill => "refill",
            Self::Spawn => "spawn",
            Self::PowerUp => "power_up",
        }
    }
}

/// Hashes `tag`'s bytes, mixed with `seed`, using FNV-1a.
///
/// `seed` is folded in as the initial accumulator rather than appended to the
/// byte stream so that two different master seeds produce unrelated streams
/// even for the same domain tag. A result of zero is remapped to one, since
/// downstream RNGs may treat an all-zero seed as a degenerate case.
#[must_use]
pub fn fnv1a_hash(tag: &str, seed: u64) -> u64 {
    let mut hash = FNV_OFFSET_BASIS ^ seed;
    for byte in tag.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    if hash == 0 {
        1
    } else {
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(fnv1a_hash("physics", 12345), fnv1a_hash("physics", 12345));
    }

    #[test]
    fn distinct_domains_hash_differently() {
        assert_ne!(fnv1a_hash("physics", 12345), fnv1a_hash("refill", 12345));
    }

    #[test]
    fn distinct_seeds_hash_differently() {
        assert_ne!(fnv1a_hash("spawn", 1), fnv1a_hash("spawn", 2));
    }

    #[test]
    fn zero_seed_does_not_produce_zero_hash() {
        assert_ne!(fnv1a_hash("main", 0), 0);
    }
}
