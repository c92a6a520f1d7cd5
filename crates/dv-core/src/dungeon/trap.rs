//! Traps
//!
//! Traps live in a per-square list. Only their kind, visibility and the
//! minimum depth they appear at matter to the core.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::rng::GameRng;

/// Trap kinds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum TrapKind {
    #[default]
    TrapDoor,
    Pit,
    SpikedPit,
    DartSlow,
    DartStrength,
    TeleportRune,
    SummonRune,
    FireRune,
    AcidRune,
    Alarm,
    /// Placed by the player; never generated
    GlyphOfWarding,
}

impl TrapKind {
    /// Shallowest depth this trap appears at
    pub const fn min_depth(self) -> i32 {
        match self {
            TrapKind::TrapDoor | TrapKind::Pit | TrapKind::Alarm => 1,
            TrapKind::DartSlow | TrapKind::TeleportRune => 2,
            TrapKind::SpikedPit | TrapKind::DartStrength => 5,
            TrapKind::FireRune | TrapKind::AcidRune => 8,
            TrapKind::SummonRune => 15,
            TrapKind::GlyphOfWarding => i32::MAX,
        }
    }

    /// Whether this is a trap that affects the player
    pub const fn is_player_trap(self) -> bool {
        !matches!(self, TrapKind::GlyphOfWarding)
    }

    /// Pick a trap kind suitable for a depth
    ///
    /// Trap doors never appear on the deepest level.
    pub fn pick(rng: &mut GameRng, depth: i32, max_depth: i32) -> TrapKind {
        let eligible: Vec<TrapKind> = TrapKind::iter()
            .filter(|k| k.min_depth() <= depth.max(1))
            .filter(|k| !(*k == TrapKind::TrapDoor && depth >= max_depth - 1))
            .collect();
        rng.choose(&eligible).copied().unwrap_or(TrapKind::Pit)
    }
}

/// A trap in a square's trap list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub kind: TrapKind,
    pub visible: bool,
}

impl Trap {
    pub const fn new(kind: TrapKind) -> Self {
        Self {
            kind,
            visible: false,
        }
    }
}
