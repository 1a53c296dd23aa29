//! Shared simulation types
//!
//! Phases, events and entity identity used by every game.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to start
    #[default]
    Menu,
    /// Ticks are running
    Playing,
    /// Ticks suspended, session state kept
    Paused,
    /// Run lost (or ran out of time)
    GameOver,
    /// Run won
    Victory,
    /// Host is preparing assets
    Loading,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Lose,
}

/// Which side of a two-player board something belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

/// Timing grade for a rhythm tap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitGrade {
    Perfect,
    Good,
    Miss,
}

/// Identity of a short-lived entity: the tick that spawned it plus a
/// per-session sequence number. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId {
    pub generation: u64,
    pub seq: u32,
}

impl EntityId {
    pub const fn new(generation: u64, seq: u32) -> Self {
        Self { generation, seq }
    }
}

/// Hands out [`EntityId`]s
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next_seq: u32,
}

impl IdAllocator {
    pub fn next(&mut self, generation: u64) -> EntityId {
        let id = EntityId::new(generation, self.next_seq);
        self.next_seq = self.next_seq.wrapping_add(1);
        id
    }
}

/// Discrete things that happened during one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Snake head reached the food
    FoodEaten { points: u32 },
    /// Something touched a playfield boundary (fatal for the snake)
    WallHit,
    /// Snake ran into its own body
    SelfHit,
    /// Tick interval shortened by a speed ramp
    SpeedUp { interval_ms: u64 },
    /// Ball bounced off a paddle
    PaddleHit { side: Side },
    /// `side` won the rally; `points` is what the player earns from it
    PointScored { side: Side, points: u32 },
    /// Player fired a bullet
    ShotFired { id: EntityId },
    /// Bullet destroyed an enemy
    EnemyKilled { id: EntityId, points: u32 },
    /// Enemy rammed the player ship
    PlayerHit { lives_left: u8 },
    /// Entity left the playfield and was discarded
    OutOfBounds { id: EntityId },
    /// Difficulty wave advanced
    WaveAdvanced { wave: u32 },
    /// Falling piece became part of the stack
    PieceLocked,
    /// Rows cleared by a lock
    LinesClear { lines: u32, points: u32 },
    /// Level counter increased
    LevelUp { level: u32 },
    /// Player popped a bubble
    BubblePopped { id: EntityId, points: u32 },
    /// Tap (or an unplayed beat) was graded
    BeatJudged { grade: HitGrade, points: u32 },
    /// Mixed colour is within tolerance of the target
    ColorMatched { points: u32 },
    /// Mixed colour changed but still misses the target
    ColorMissed,
    /// Countdown reached zero
    TimeUp,
    /// Terminal condition reached
    Finished(Outcome),
}

impl GameEvent {
    /// Points this event is worth before combo/multiplier, if it scores
    pub fn base_points(&self) -> Option<u32> {
        match *self {
            GameEvent::FoodEaten { points }
            | GameEvent::EnemyKilled { points, .. }
            | GameEvent::LinesClear { points, .. }
            | GameEvent::BubblePopped { points, .. }
            | GameEvent::ColorMatched { points } => Some(points),
            GameEvent::PointScored {
                side: Side::Player,
                points,
            } => Some(points),
            GameEvent::BeatJudged { grade, points } if grade != HitGrade::Miss => Some(points),
            _ => None,
        }
    }

    /// Whether this event breaks a combo/streak
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            GameEvent::BeatJudged {
                grade: HitGrade::Miss,
                ..
            } | GameEvent::ColorMissed
        )
    }
}

/// What an entity looks like to a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    SnakeHead,
    SnakeBody,
    Food,
    Ball,
    Paddle,
    Ship,
    Bullet,
    Enemy,
    FallingBlock,
    StackBlock,
    Bubble,
    Beat,
    Swatch,
}

/// Read-only view of one entity for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub kind: EntityKind,
    /// Top-left corner in playfield units
    pub pos: Vec2,
    pub size: Vec2,
    /// Free-form per-kind detail (colour index, zone, packed RGB)
    pub tag: u32,
}

impl EntityView {
    pub fn new(kind: EntityKind, pos: Vec2, size: Vec2) -> Self {
        Self {
            kind,
            pos,
            size,
            tag: 0,
        }
    }

    pub fn with_tag(mut self, tag: u32) -> Self {
        self.tag = tag;
        self
    }
}
