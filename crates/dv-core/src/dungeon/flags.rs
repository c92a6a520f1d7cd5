//! Per-square flag bits

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Square information flags
    ///
    /// Perceptual flags (VIEW, SEEN, WASSEEN) are rebuilt by every view pass.
    /// The WALL_* roles only exist while a level is being generated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SquareFlags: u32 {
        /// Memorized terrain
        const MARK = 1 << 0;
        /// Permanently lit
        const GLOW = 1 << 1;
        /// Part of a vault
        const VAULT = 1 << 2;
        /// Part of a room
        const ROOM = 1 << 3;
        /// Seen this turn
        const SEEN = 1 << 4;
        /// In line of sight this turn
        const VIEW = 1 << 5;
        /// Seen last turn (scratch)
        const WASSEEN = 1 << 6;
        /// Hidden level-feeling trigger
        const FEEL = 1 << 7;
        /// Holds a trap
        const TRAP = 1 << 8;
        /// Holds an invisible trap
        const INVIS = 1 << 9;
        /// Inner room wall (generation only)
        const WALL_INNER = 1 << 10;
        /// Outer room wall (generation only)
        const WALL_OUTER = 1 << 11;
        /// Solid wall that tunnels must avoid (generation only)
        const WALL_SOLID = 1 << 12;
        /// No random monsters
        const MON_RESTRICT = 1 << 13;
        /// Not a teleport destination
        const NO_TELEPORT = 1 << 14;
        /// Not revealed by magic mapping
        const NO_MAP = 1 << 15;
        /// Blocks telepathy
        const NO_ESP = 1 << 16;
        /// Scratch flag for projection processing
        const PROJECT = 1 << 17;
        /// Traps detected here
        const DTRAP = 1 << 18;
        /// Edge of a trap-detected area
        const DEDGE = 1 << 19;
    }
}

impl SquareFlags {
    /// Flags that only have meaning while a level is being generated
    pub const GENERATION: SquareFlags = SquareFlags::WALL_INNER
        .union(SquareFlags::WALL_OUTER)
        .union(SquareFlags::WALL_SOLID);

    /// Flags rebuilt on every view pass
    pub const PERCEPTION: SquareFlags = SquareFlags::VIEW
        .union(SquareFlags::SEEN)
        .union(SquareFlags::WASSEEN);
}

// Manual serde impl for SquareFlags
impl Serialize for SquareFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SquareFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(SquareFlags::from_bits_truncate(bits))
    }
}
