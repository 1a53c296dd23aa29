//! The arcade games
//!
//! Each game owns its entities, its scoreboard and its terminal condition.

pub mod bubble;
pub mod color_match;
pub mod pong;
pub mod rhythm;
pub mod shooter;
pub mod snake;
pub mod tetris;

pub use bubble::BubblePop;
pub use color_match::ColorMatch;
pub use pong::Pong;
pub use rhythm::RhythmTap;
pub use shooter::Shooter;
pub use snake::Snake;
pub use tetris::Tetris;
