//! Sound cues
//!
//! The core never synthesises audio. It decides *which* cue a game event
//! deserves and hands it to an [`AudioSink`] owned by the host. Playback is
//! fire-and-forget: sinks must not block and swallow their own failures.

use serde::{Deserialize, Serialize};

use crate::sim::{GameEvent, HitGrade, Outcome};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SoundKind {
    /// Player fires
    Shoot,
    /// Something was hit or popped
    Hit,
    /// Ship destroyed / enemy rams the player
    Explosion,
    /// Ball hits paddle
    Paddle,
    /// Ball hits wall
    Wall,
    /// A point was scored
    Score,
    /// Snake eats food, colour matched
    Eat,
    /// Piece locks
    Drop,
    /// Lines cleared
    Line,
    /// Run ended
    GameOver,
}

/// Oscillator sweep a host can use to synthesise a cue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    pub end_frequency: f32,
    /// Seconds
    pub duration: f32,
    pub volume: f32,
}

impl SoundKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundKind::Shoot => "shoot",
            SoundKind::Hit => "hit",
            SoundKind::Explosion => "explosion",
            SoundKind::Paddle => "paddle",
            SoundKind::Wall => "wall",
            SoundKind::Score => "score",
            SoundKind::Eat => "eat",
            SoundKind::Drop => "drop",
            SoundKind::Line => "line",
            SoundKind::GameOver => "gameOver",
        }
    }

    pub fn tone(&self) -> Tone {
        let (frequency, end_frequency, duration, volume) = match self {
            SoundKind::Shoot => (800.0, 400.0, 0.1, 0.1),
            SoundKind::Hit => (200.0, 100.0, 0.2, 0.2),
            SoundKind::Explosion => (150.0, 50.0, 0.3, 0.3),
            SoundKind::Paddle => (800.0, 800.0, 0.1, 0.1),
            SoundKind::Wall => (400.0, 400.0, 0.1, 0.1),
            SoundKind::Score => (600.0, 300.0, 0.3, 0.2),
            SoundKind::Eat => (800.0, 1200.0, 0.1, 0.1),
            SoundKind::Drop => (200.0, 200.0, 0.1, 0.1),
            SoundKind::Line => (800.0, 1200.0, 0.3, 0.2),
            SoundKind::GameOver => (400.0, 200.0, 0.5, 0.2),
        };
        Tone {
            frequency,
            end_frequency,
            duration,
            volume,
        }
    }
}

/// Host-side audio output
pub trait AudioSink {
    /// Play a cue at the given volume (0.0 - 1.0). Must not block.
    fn play(&mut self, sound: SoundKind, volume: f32);
}

/// Discards every cue
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _sound: SoundKind, _volume: f32) {}
}

/// Remembers cues instead of playing them (headless runs, tests)
#[derive(Debug, Clone, Default)]
pub struct SoundLog {
    pub played: Vec<SoundKind>,
}

impl AudioSink for SoundLog {
    fn play(&mut self, sound: SoundKind, _volume: f32) {
        self.played.push(sound);
    }
}

/// Pick the cue for a game event, if it has one
pub fn sound_for(event: &GameEvent) -> Option<SoundKind> {
    match event {
        GameEvent::FoodEaten { .. } | GameEvent::ColorMatched { .. } => Some(SoundKind::Eat),
        GameEvent::WallHit => Some(SoundKind::Wall),
        GameEvent::PaddleHit { .. } => Some(SoundKind::Paddle),
        GameEvent::PointScored { .. } => Some(SoundKind::Score),
        GameEvent::ShotFired { .. } => Some(SoundKind::Shoot),
        GameEvent::EnemyKilled { .. } | GameEvent::BubblePopped { .. } => Some(SoundKind::Hit),
        GameEvent::BeatJudged { grade, .. } if *grade != HitGrade::Miss => Some(SoundKind::Hit),
        GameEvent::PlayerHit { .. } => Some(SoundKind::Explosion),
        GameEvent::PieceLocked => Some(SoundKind::Drop),
        GameEvent::LinesClear { .. } => Some(SoundKind::Line),
        GameEvent::Finished(Outcome::Lose) => Some(SoundKind::GameOver),
        GameEvent::Finished(Outcome::Win) => Some(SoundKind::Score),
        _ => None,
    }
}
