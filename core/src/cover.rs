//! Cover layer: destructible material sitting above a tile.

use serde::{Deserialize, Serialize};

/// The kind of cover occupying a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverKind {
    /// No cover layer.
    #[default]
    None,
    /// Cover that blocks one hit from an explosion wave, then is destroyed.
    Ice,
    /// Cover that shifts to an adjacent cell instead of being destroyed, per
    /// [`Cover::dynamic`].
    Crate,
}

/// Cover layer state for a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cover {
    /// The kind of cover present.
    pub kind: CoverKind,
    /// Remaining hits before the cover is destroyed.
    pub health: u8,
    /// Whether the cover repositions under gravity rather than being fixed in place.
    pub dynamic: bool,
}

impl Cover {
    /// No cover.
    pub const NONE: Self = Self {
        kind: CoverKind::None,
        health: 0,
        dynamic: false,
    };

    /// Creates single-hit ice, fixed in place.
    #[must_use]
    pub const fn ice() -> Self {
        Self {
            kind: CoverKind::Ice,
            health: 1,
            dynamic: false,
        }
    }

    /// Creates a crate that falls under gravity like a tile.
    #[must_use]
    pub const fn dynamic_crate() -> Self {
        Self {
            kind: CoverKind::Crate,
            health: 1,
            dynamic: true,
        }
    }

    /// Reports whether the cell has any cover layer at all.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !matches!(self.kind, CoverKind::None)
    }

    /// Absorbs one explosion hit, returning whether the cover was destroyed by it.
    ///
    /// A cover absorbing a hit blocks the explosion from reaching the tile or
    /// ground beneath it that tick; the caller is responsible for not also
    /// damaging the tile underneath.
    pub fn absorb_hit(&mut self) -> bool {
        if !self.is_present() {
            return false;
        }
        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            *self = Self::NONE;
            true
        } else {
            false
        }
    }
}
