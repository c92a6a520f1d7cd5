//! Square records

use serde::{Deserialize, Serialize};

use super::{FeatureId, SquareFlags, Trap};
use crate::monster::MonsterHandle;
use crate::object::ObjectHandle;

/// Who stands on a square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Occupant {
    #[default]
    None,
    Player,
    Monster(MonsterHandle),
}

impl Occupant {
    pub const fn is_none(&self) -> bool {
        matches!(self, Occupant::None)
    }

    pub const fn monster(&self) -> Option<MonsterHandle> {
        match self {
            Occupant::Monster(m) => Some(*m),
            _ => None,
        }
    }
}

/// Which end of a pile a new object goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PileEnd {
    /// Newest first (the usual case for floor drops)
    Front,
    /// Oldest first (objects placed during generation in reading order)
    Back,
}

/// One grid cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Square {
    pub(crate) feat: FeatureId,
    pub(crate) info: SquareFlags,
    pub(crate) light: i32,
    pub(crate) occupant: Occupant,
    pub(crate) objects: Vec<ObjectHandle>,
    pub(crate) traps: Vec<Trap>,
}

impl Square {
    pub fn feat(&self) -> FeatureId {
        self.feat
    }

    pub fn info(&self) -> SquareFlags {
        self.info
    }

    pub fn light(&self) -> i32 {
        self.light
    }

    pub fn occupant(&self) -> Occupant {
        self.occupant
    }

    /// Floor objects, top of the pile first
    pub fn objects(&self) -> &[ObjectHandle] {
        &self.objects
    }

    pub fn traps(&self) -> &[Trap] {
        &self.traps
    }
}

/// Per-grid integer map used for monster flow (noise and scent)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Heatmap {
    width: i32,
    grids: Vec<u16>,
}

impl Heatmap {
    pub fn new(height: i32, width: i32) -> Self {
        Self {
            width,
            grids: vec![0; (height.max(0) * width.max(0)) as usize],
        }
    }

    fn index(&self, y: i32, x: i32) -> Option<usize> {
        if y < 0 || x < 0 || x >= self.width {
            return None;
        }
        let i = (y * self.width + x) as usize;
        (i < self.grids.len()).then_some(i)
    }

    pub fn get(&self, y: i32, x: i32) -> u16 {
        self.index(y, x).map(|i| self.grids[i]).unwrap_or(0)
    }

    pub fn set(&mut self, y: i32, x: i32, value: u16) {
        if let Some(i) = self.index(y, x) {
            self.grids[i] = value;
        }
    }

    pub fn clear(&mut self) {
        self.grids.iter_mut().for_each(|g| *g = 0);
    }
}
