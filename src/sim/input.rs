//! Input mapping
//!
//! Raw keys, swipes and taps become [`InputIntent`]s. Delivery of the raw
//! events is the host's business; the translation lives here so it can be
//! tested without a browser.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::GameId;

/// Movement shorter than this (px) can be a tap
pub const TAP_MAX_DISTANCE: f32 = 30.0;
/// Touches longer than this (ms) are never taps
pub const TAP_MAX_DURATION_MS: u64 = 200;
/// Movement longer than this (px) is a swipe
pub const SWIPE_MIN_DISTANCE: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Unit grid step (y grows downward)
    pub fn vector(self) -> IVec2 {
        match self {
            Dir::Up => IVec2::new(0, -1),
            Dir::Down => IVec2::new(0, 1),
            Dir::Left => IVec2::new(-1, 0),
            Dir::Right => IVec2::new(1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    pub fn is_reverse_of(self, other: Dir) -> bool {
        self.opposite() == other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Fire,
    Rotate,
    HardDrop,
    /// Rhythm lane 0..=3
    Zone(u8),
    /// Tap/click at a playfield position
    Point(Vec2),
    /// Colour slider moved
    Mix { channel: Channel, value: u8 },
}

/// One request from the player, consumed by a single tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputIntent {
    Direction(Dir),
    Action(Action),
    Pause,
    Menu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Tap,
    Swipe(Dir),
    None,
}

/// Translate a `KeyboardEvent.key` value
pub fn map_key(game: GameId, key: &str) -> Option<InputIntent> {
    let intent = match key {
        "ArrowUp" if game == GameId::Tetris => InputIntent::Action(Action::Rotate),
        "ArrowUp" | "w" | "W" => InputIntent::Direction(Dir::Up),
        "ArrowDown" | "s" | "S" => InputIntent::Direction(Dir::Down),
        "ArrowLeft" | "a" | "A" => InputIntent::Direction(Dir::Left),
        "ArrowRight" | "d" | "D" => InputIntent::Direction(Dir::Right),
        " " => match game {
            GameId::SpaceShooter => InputIntent::Action(Action::Fire),
            GameId::Tetris => InputIntent::Action(Action::HardDrop),
            _ => InputIntent::Pause,
        },
        "p" | "P" => InputIntent::Pause,
        "Escape" => InputIntent::Menu,
        "1" | "2" | "3" | "4" if game == GameId::RhythmTap => {
            let zone = key.as_bytes()[0] - b'1';
            InputIntent::Action(map_tap(zone))
        }
        _ => return None,
    };
    Some(intent)
}

/// Bucket a swipe angle (degrees, screen space, y down) into a direction
pub fn map_swipe(angle_deg: f32) -> Dir {
    if (-45.0..45.0).contains(&angle_deg) {
        Dir::Right
    } else if (45.0..135.0).contains(&angle_deg) {
        Dir::Down
    } else if (-135.0..-45.0).contains(&angle_deg) {
        Dir::Up
    } else {
        Dir::Left
    }
}

pub fn map_tap(zone: u8) -> Action {
    Action::Zone(zone)
}

/// Decide whether a touch was a tap, a swipe or noise
pub fn classify_gesture(dx: f32, dy: f32, duration_ms: u64) -> Gesture {
    let distance = (dx * dx + dy * dy).sqrt();
    if distance < TAP_MAX_DISTANCE && duration_ms < TAP_MAX_DURATION_MS {
        Gesture::Tap
    } else if distance > SWIPE_MIN_DISTANCE {
        Gesture::Swipe(map_swipe(dy.atan2(dx).to_degrees()))
    } else {
        Gesture::None
    }
}

/// What a plain tap means in games without tap zones
pub fn tap_action(game: GameId) -> Option<Action> {
    match game {
        GameId::SpaceShooter => Some(Action::Fire),
        GameId::Tetris => Some(Action::Rotate),
        _ => None,
    }
}
