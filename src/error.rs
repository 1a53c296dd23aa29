//! Error types
//!
//! Config errors are user-facing (a session refuses to leave the menu).
//! Storage errors never reach the game loop; they are logged at the
//! high score / settings boundary and dropped.

use thiserror::Error;

use crate::GameId;
use crate::sim::GamePhase;

/// Invalid tuning detected when a session starts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{game}: tick interval must be positive")]
    ZeroInterval { game: GameId },
    #[error("{game}: {field} must be greater than zero")]
    NonPositive { game: GameId, field: &'static str },
    #[error("{game}: {field} ({value}) does not fit inside the playfield")]
    OutOfBounds {
        game: GameId,
        field: &'static str,
        value: f32,
    },
    #[error("{game}: {reason}")]
    Invalid { game: GameId, reason: String },
    #[error("tuning JSON is malformed: {0}")]
    Parse(String),
}

/// Persistence failure (quota, unavailable backend, bad JSON)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("storage backend unavailable")]
    Unavailable,
    #[error("write to `{key}` failed: {reason}")]
    Write { key: String, reason: String },
    #[error("value under `{key}` is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

/// A state machine transition that is not allowed from the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} while {from:?}")]
pub struct TransitionError {
    pub action: &'static str,
    pub from: GamePhase,
}

/// Why a session could not leave the menu
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}
