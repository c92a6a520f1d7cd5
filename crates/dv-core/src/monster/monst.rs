//! Monster instances

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::RaceId;
use crate::dungeon::{Handle, Loc};
use crate::object::{ObjectHandle, Origin};

/// Handle to a monster in a chunk
pub type MonsterHandle = Handle<Monster>;

/// Role of a monster within a generated group
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum GroupRole {
    #[default]
    Member,
    Leader,
    Servant,
}

/// Group membership recorded at generation time for later AI coordination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub index: u32,
    pub role: GroupRole,
}

/// A monster on a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub race: RaceId,
    pub grid: Loc,
    /// Light radius carried (negative for darkness)
    pub light: i32,
    /// Sleep counter (0 = awake)
    pub sleep: i32,
    /// Objects carried, oldest first
    pub held: Vec<ObjectHandle>,
    pub group: Option<GroupInfo>,
    /// Where the generator put it
    pub origin: Origin,
}

impl Monster {
    pub fn new(race: RaceId, grid: Loc) -> Self {
        Self {
            race,
            grid,
            light: 0,
            sleep: 0,
            held: Vec::new(),
            group: None,
            origin: Origin::Floor,
        }
    }

    pub fn is_asleep(&self) -> bool {
        self.sleep > 0
    }

    pub fn wake(&mut self) {
        self.sleep = 0;
    }
}
