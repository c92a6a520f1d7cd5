//! dv-core: dungeon levels for a roguelike
//!
//! The grid store for one level, line of sight and lighting over it, the
//! player's remembered copy of it, and the generator that builds new levels.
//! There is no I/O here beyond loading the built-in data tables; a front end
//! drives everything through [`world::WorldState`] and [`generate`].

pub mod dungeon;
pub mod events;
pub mod generate;
pub mod monster;
pub mod object;
pub mod player;
pub mod vision;
pub mod world;

mod consts;
mod rng;

pub use consts::*;
pub use rng::GameRng;
