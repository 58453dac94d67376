//! Ground layer: the destructible surface a tile sits on.

use serde::{Deserialize, Serialize};

/// The kind of ground occupying a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroundKind {
    /// No ground layer; the cell is bare.
    #[default]
    None,
    /// Ground that is destroyed the first time a match clears the cell.
    Dirt,
    /// Ground that requires two clears to destroy.
    DoubleDirt,
    /// Ground that never clears.
    Indestructible,
}

/// Ground layer state for a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ground {
    /// The kind of ground present.
    pub kind: GroundKind,
    /// Remaining hits before the ground is destroyed, meaningless for `None`/`Indestructible`.
    pub health: u8,
}

impl Ground {
    /// No ground.
    pub const NONE: Self = Self {
        kind: GroundKind::None,
        health: 0,
    };

    /// Creates single-hit dirt.
    #[must_use]
    pub const fn dirt() -> Self {
        Self {
            kind: GroundKind::Dirt,
            health: 1,
        }
    }

    /// Creates two-hit dirt.
    #[must_use]
    pub const fn double_dirt() -> Self {
        Self {
            kind: GroundKind::DoubleDirt,
            health: 2,
        }
    }

    /// Creates indestructible ground.
    #[must_use]
    pub const fn indestructible() -> Self {
        Self {
            kind: GroundKind::Indestructible,
            health: u8::MAX,
        }
    }

    /// Reports whether the cell has any ground layer at all.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !matches!(self.kind, GroundKind::None)
    }

    /// Applies one hit, returning whether the ground was destroyed by it.
    ///
    /// Indestructible ground never reports destroyed.
    pub fn apply_hit(&mut self) -> bool {
        match self.kind {
            GroundKind::None => false,
            GroundKind::Indestructible => false,
            GroundKind::Dirt | GroundKind::DoubleDirt => {
                self.health = self.health.saturating_sub(1);
                if self.health == 0 {
                    *self = Self::NONE;
                    true
                } else {
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirt_is_destroyed_by_a_single_hit() {
        let mut ground = Ground::dirt();
        assert!(ground.apply_hit());
        assert!(!ground.is_present());
    }

    #[test]
    fn double_dirt_requires_two_hits() {
        let mut ground = Ground::double_dirt();
        assert!(!ground.apply_hit());
        assert!(ground.is_present());
        assert!(ground.apply_hit());
        assert!(!ground.is_present());
    }

    #[test]
    fn indestructible_never_clears() {
        let mut ground = Ground::indestructible();
        assert!(!ground.apply_hit());
        assert!(ground.is_present());
    }
}
