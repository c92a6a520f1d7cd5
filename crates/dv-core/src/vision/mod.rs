//! Line of sight, lighting, field of view and the player's memory

pub mod knowledge;
mod light;
mod los;
mod point_set;
mod view;

pub use light::{calc_lighting, light_room, room_grids};
pub use los::{is_knight_move, los};
pub use point_set::PointSet;
pub use view::{forget_view, update_view};
