//! Player system
//!
//! Contains the Player struct used by level generation and visibility.

mod you;

pub use you::{Arrival, Player};
