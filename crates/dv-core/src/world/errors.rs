//! Error types for the dungeon core
//!
//! Recoverable builder failures are plain `bool` returns. Everything that
//! must stop the caller (bad data, exhausted retries, contract violations at
//! the grid boundary) is a [`DungeonError`].

use thiserror::Error;

/// Errors that can occur while loading data, generating or mutating a level
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DungeonError {
    #[error("Grid ({y}, {x}) is outside the {height}x{width} chunk")]
    OutOfBounds {
        y: i32,
        x: i32,
        height: i32,
        width: i32,
    },

    #[error("Stale {kind} handle")]
    StaleHandle { kind: &'static str },

    #[error("Square ({y}, {x}) is already occupied")]
    Occupied { y: i32, x: i32 },

    #[error("Required terrain feature '{0}' is missing from the terrain table")]
    UnknownFeature(String),

    #[error("Blueprint '{name}' line {line}: {message}")]
    Blueprint {
        name: String,
        line: usize,
        message: String,
    },

    #[error("Bad data: {0}")]
    Data(String),

    #[error("Could not read '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Level generation failed after {attempts} attempts: {reason}")]
    GenerationFailed { attempts: u32, reason: String },

    #[error("Invalid symmetry transform (rotate {rotate}, reflect {reflect})")]
    InvalidTransform { rotate: i32, reflect: bool },

    #[error("Chunk '{name}' does not fit at ({y}, {x})")]
    ChunkDoesNotFit { name: String, y: i32, x: i32 },
}

impl From<serde_json::Error> for DungeonError {
    fn from(err: serde_json::Error) -> Self {
        DungeonError::Data(err.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T> = core::result::Result<T, DungeonError>;

/// Read a text file, mapping failures to [`DungeonError::Io`]
pub fn read_data_file(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| DungeonError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
