//! Arcade Core - a deterministic engine for a handful of small arcade games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clock, input, collision, scoring, games)
//! - `session`: Ties one game to the state machine, ticker and high scores
//! - `highscores`: Best score + bounded history per game
//! - `platform`: Storage/time/logging collaborators (browser or native)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod audio;
pub mod error;
pub mod highscores;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, SessionError, StorageError, TransitionError};
pub use highscores::{HighScoreStore, HistoryEntry, SaveOutcome};
pub use session::{GameSession, SessionResult};
pub use settings::Settings;
pub use tuning::Tuning;

use serde::{Deserialize, Serialize};

/// Engine-wide constants
pub mod consts {
    /// Default loop interval (~60 Hz)
    pub const DEFAULT_TICK_MS: u64 = 16;
    /// Maximum ticks replayed by a single pump to prevent spiral of death
    pub const MAX_CATCH_UP_TICKS: u32 = 8;

    /// Storage key layout: `<prefix><gameId><suffix>`
    pub const STORAGE_PREFIX: &str = "arcade_";
    pub const HIGH_SCORE_SUFFIX: &str = "HighScore";
    pub const HISTORY_SUFFIX: &str = "_history";
    pub const SETTINGS_KEY: &str = "arcade_settings";

    /// Score history entries kept per game
    pub const MAX_HISTORY: usize = 10;
}

/// Identifies one of the arcade games
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameId {
    Snake,
    Tetris,
    Pong,
    SpaceShooter,
    BubblePop,
    RhythmTap,
    ColorMatch,
}

impl GameId {
    pub const ALL: [GameId; 7] = [
        GameId::Snake,
        GameId::Tetris,
        GameId::Pong,
        GameId::SpaceShooter,
        GameId::BubblePop,
        GameId::RhythmTap,
        GameId::ColorMatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Snake => "snake",
            GameId::Tetris => "tetris",
            GameId::Pong => "pong",
            GameId::SpaceShooter => "space-shooter",
            GameId::BubblePop => "bubble-pop",
            GameId::RhythmTap => "rhythm-tap",
            GameId::ColorMatch => "color-match",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        GameId::ALL.into_iter().find(|id| id.as_str() == s.trim())
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp a coordinate into `[0, upper]`
#[inline]
pub fn clamp_axis(value: f32, upper: f32) -> f32 {
    0.0_f32.max(upper.min(value))
}
