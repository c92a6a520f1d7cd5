//! Dungeon system
//!
//! Contains the level structure, squares, terrain, and chunk transfer.

mod arena;
mod chunk;
mod feature;
mod flags;
mod loc;
mod predicate;
mod square;
pub mod transfer;
mod trap;

pub use arena::{Arena, Handle};
pub use chunk::Chunk;
pub use feature::{FeatureId, FeatureTable, Feats, Feature, TerrainFlags};
pub use flags::SquareFlags;
pub use loc::{distance, Loc, Rect, DDD, DDX, DDX_DDD, DDY, DDY_DDD};
pub use square::{Heatmap, Occupant, PileEnd, Square};
pub use transfer::{ChunkList, SymmetryFlags, Transform};
pub use trap::{Trap, TrapKind};
