//! World state
//!
//! Contains configuration, errors, and the live level with the player's
//! memory of it.

pub mod errors;
pub mod options;
mod state;

pub use errors::{DungeonError, Result};
pub use options::{GenConfig, Quest};
pub use state::WorldState;
