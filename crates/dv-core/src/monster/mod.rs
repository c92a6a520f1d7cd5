//! Monster system
//!
//! Contains monster races (templates) and instances. Behaviour lives
//! elsewhere; the level only stores and places monsters.

mod monst;
mod permonst;

pub use monst::{GroupInfo, GroupRole, Monster, MonsterHandle};
pub use permonst::{MonsterRace, RaceFlags, RaceId, RaceTable, SpellFlags};
