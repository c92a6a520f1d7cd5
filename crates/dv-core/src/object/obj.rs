//! Object instances

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::{KindId, Tval};
use crate::dungeon::{Handle, Loc};
use crate::monster::MonsterHandle;

/// Handle to an object in a chunk
pub type ObjectHandle = Handle<Object>;

/// What the player knows about an object's existence
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
    Display, EnumIter,
)]
pub enum ObjectKnowledge {
    #[default]
    Unaware,
    /// Detected but not seen
    Aware,
    Seen,
}

/// How an object came to be
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Origin {
    #[default]
    Floor,
    Vault,
    Special,
    Pit,
    Nest,
    Labyrinth,
    Cavern,
    Rubble,
    Drop,
}

/// An object on a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub kind: KindId,
    pub tval: Tval,
    pub number: u8,
    /// Gold amount or base value
    pub value: i32,
    /// Floor location, if lying on the floor
    pub grid: Option<Loc>,
    /// Carrying monster, if held
    pub held_by: Option<MonsterHandle>,
    pub known: ObjectKnowledge,
    pub origin: Origin,
    pub origin_depth: i32,
}

impl Object {
    pub fn new(kind: KindId, tval: Tval, value: i32) -> Self {
        Self {
            kind,
            tval,
            number: 1,
            value,
            grid: None,
            held_by: None,
            known: ObjectKnowledge::Unaware,
            origin: Origin::Floor,
            origin_depth: 0,
        }
    }

    /// Upgrade knowledge; never downgrades
    pub fn notice(&mut self, level: ObjectKnowledge) {
        if level > self.known {
            self.known = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_only_upgrades() {
        let mut obj = Object::new(KindId(0), Tval::Food, 3);
        obj.notice(ObjectKnowledge::Seen);
        obj.notice(ObjectKnowledge::Aware);
        assert_eq!(obj.known, ObjectKnowledge::Seen);
    }
}
