//! Core dungeon constants
//!
//! Dimensions and generation limits shared by the generator and the
//! visibility engine. Tunable values live in [`crate::world::GenConfig`].

/// Dungeon level dimensions
pub const DUNGEON_HGT: i32 = 66;
pub const DUNGEON_WID: i32 = 198;

/// Town level dimensions
pub const TOWN_HGT: i32 = 22;
pub const TOWN_WID: i32 = 66;

/// Length of a day in game turns is ten times `TOWN_DAWN`; the first
/// ten times `TOWN_DUSK` turns of it are daylight
pub const TOWN_DAWN: u64 = 10000;
pub const TOWN_DUSK: u64 = 5000;

/// Town residents by day and by night
pub const MIN_M_ALLOC_TD: i32 = 4;
pub const MIN_M_ALLOC_TN: i32 = 8;

/// Maximum dungeon depth
pub const MAX_DEPTH: i32 = 128;

/// Size of a room-placement block
pub const BLOCK_HGT: i32 = 11;
pub const BLOCK_WID: i32 = 11;

/// Generation scratch list limits
pub const CENT_MAX: usize = 100;
pub const DOOR_MAX: usize = 200;
pub const WALL_MAX: usize = 500;
pub const TUNN_MAX: usize = 900;

/// Maximum pits or nests per level
pub const MAX_PIT: i32 = 2;

/// Population amounts (average per level)
pub const AMT_ROOM: i32 = 9;
pub const AMT_ITEM: i32 = 3;
pub const AMT_GOLD: i32 = 3;

/// Number of shops in town
pub const MAX_STORES: usize = 8;

/// Maximum sight radius
pub const MAX_SIGHT: i32 = 20;

/// Level feeling needs this many FEEL squares walked before the object
/// feeling is revealed
pub const FEELING_NEED: i32 = 10;

/// Number of hidden level-feeling squares placed on a new level
pub const FEELING_TOTAL: i32 = 100;

/// Starburst rooms recurse at most this deep before falling back to a
/// plain rectangle
pub const STARBURST_MAX_DEPTH: u32 = 8;
