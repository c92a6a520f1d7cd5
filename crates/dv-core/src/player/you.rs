//! The player as seen by the level core
//!
//! Only what generation and visibility need: where the player stands, how
//! much light they carry, and how they arrived on the level.

use serde::{Deserialize, Serialize};

use crate::dungeon::{distance, Loc};

/// How the player arrived on the current level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arrival {
    /// New game, teleport level, trap door
    #[default]
    Anywhere,
    /// Came down a staircase (connected stairs put an up staircase here)
    Descended,
    /// Came up a staircase
    Ascended,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Current location, once placed on a level
    pub grid: Option<Loc>,
    /// Light radius of carried light (negative for darkness)
    pub cur_light: i32,
    /// Sees in the dark at short range
    pub unlight: bool,
    /// Character level
    pub level: i32,
    pub blind: bool,

    pub depth: i32,
    pub max_depth: i32,

    /// Generate connected stairs under the player
    pub connect_stairs: bool,
    pub arrival: Arrival,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            grid: None,
            cur_light: 1,
            unlight: false,
            level: 1,
            blind: false,
            depth: 0,
            max_depth: 0,
            connect_stairs: true,
            arrival: Arrival::Anywhere,
        }
    }
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance from the player; unplaced players are infinitely far away
    pub fn distance_to(&self, grid: Loc) -> i32 {
        self.grid.map_or(i32::MAX, |p| distance(p, grid))
    }

    /// Radius within which an unlit player still sees adjacent detail
    pub fn unlight_radius(&self) -> i32 {
        2 + self.level / 6
    }

    /// Change depth, keeping the record depth current
    pub fn set_depth(&mut self, depth: i32) {
        self.depth = depth.max(0);
        self.max_depth = self.max_depth.max(self.depth);
    }
}
