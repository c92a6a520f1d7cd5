//! Object system
//!
//! Contains object kinds (templates) and instances.

mod obj;
mod objclass;

pub use obj::{Object, ObjectHandle, ObjectKnowledge, Origin};
pub use objclass::{KindId, KindTable, ObjectKind, Tval};
