//! Data-driven game balance
//!
//! Every number a game uses lives here with its stock value as the default.
//! Hosts can override any subset from JSON; missing fields keep the
//! defaults. `validate` runs before a session leaves the menu.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::GameId;
use crate::error::ConfigError;
use crate::sim::input::Dir;
use crate::sim::scoring::ComboRules;

fn positive(game: GameId, field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { game, field })
    }
}

fn interval(game: GameId, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::ZeroInterval { game })
    } else {
        Ok(())
    }
}

fn fits(game: GameId, field: &'static str, value: f32, upper: f32) -> Result<(), ConfigError> {
    if (0.0..=upper).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfBounds { game, field, value })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeTuning {
    /// Cells per side
    pub board_size: i32,
    pub start: IVec2,
    pub start_dir: Dir,
    pub first_food: IVec2,
    pub initial_interval_ms: u64,
    pub interval_step_ms: u64,
    pub min_interval_ms: u64,
    pub points_per_food: u32,
}

impl Default for SnakeTuning {
    fn default() -> Self {
        Self {
            board_size: 20,
            start: IVec2::new(10, 10),
            start_dir: Dir::Down,
            first_food: IVec2::new(15, 15),
            initial_interval_ms: 150,
            interval_step_ms: 2,
            min_interval_ms: 80,
            points_per_food: 10,
        }
    }
}

impl SnakeTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = GameId::Snake;
        if self.board_size <= 0 {
            return Err(ConfigError::NonPositive {
                game,
                field: "board_size",
            });
        }
        interval(game, self.initial_interval_ms)?;
        interval(game, self.min_interval_ms)?;
        if self.initial_interval_ms < self.min_interval_ms {
            return Err(ConfigError::Invalid {
                game,
                reason: format!(
                    "initial interval {} ms is faster than the {} ms floor",
                    self.initial_interval_ms, self.min_interval_ms
                ),
            });
        }
        let upper = (self.board_size - 1) as f32;
        fits(game, "start.x", self.start.x as f32, upper)?;
        fits(game, "start.y", self.start.y as f32, upper)?;
        fits(game, "first_food.x", self.first_food.x as f32, upper)?;
        fits(game, "first_food.y", self.first_food.y as f32, upper)?;
        if self.start == self.first_food {
            return Err(ConfigError::Invalid {
                game,
                reason: "food cannot start under the snake".to_owned(),
            });
        }
        Ok(())
    }
}

/// AI strength for Pong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// AI paddle speed (px per tick)
    pub fn ai_speed(&self) -> f32 {
        match self {
            Difficulty::Easy => 3.0,
            Difficulty::Medium => 4.0,
            Difficulty::Hard => 5.5,
        }
    }

    pub fn ball_speed_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongTuning {
    pub field: Vec2,
    pub paddle_size: Vec2,
    pub ball_size: f32,
    pub paddle_speed: f32,
    pub winning_score: u32,
    pub serve_velocity: Vec2,
    pub points_per_point: u32,
    /// AI holds still while the ball centre is within this many px
    pub ai_dead_zone: f32,
    pub tick_ms: u64,
}

impl Default for PongTuning {
    fn default() -> Self {
        Self {
            field: Vec2::new(800.0, 400.0),
            paddle_size: Vec2::new(10.0, 80.0),
            ball_size: 10.0,
            paddle_speed: 6.0,
            winning_score: 5,
            serve_velocity: Vec2::new(5.0, 3.0),
            points_per_point: 100,
            ai_dead_zone: 10.0,
            tick_ms: crate::consts::DEFAULT_TICK_MS,
        }
    }
}

impl PongTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = GameId::Pong;
        interval(game, self.tick_ms)?;
        positive(game, "field.x", self.field.x)?;
        positive(game, "field.y", self.field.y)?;
        positive(game, "paddle_size.x", self.paddle_size.x)?;
        positive(game, "paddle_size.y", self.paddle_size.y)?;
        positive(game, "ball_size", self.ball_size)?;
        fits(game, "paddle_size.y", self.paddle_size.y, self.field.y)?;
        fits(game, "ball_size", self.ball_size, self.field.y)?;
        if self.winning_score == 0 {
            return Err(ConfigError::NonPositive {
                game,
                field: "winning_score",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterTuning {
    pub field: Vec2,
    pub player_size: f32,
    pub bullet_size: f32,
    pub enemy_size: f32,
    pub player_speed: f32,
    pub bullet_speed: f32,
    pub enemy_speed: f32,
    pub enemy_speed_per_wave: f32,
    pub lives: u8,
    pub points_per_enemy: u32,
    pub spawn_chance: f32,
    pub spawn_chance_per_wave: f32,
    pub kills_per_wave: u32,
    pub tick_ms: u64,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            field: Vec2::new(800.0, 600.0),
            player_size: 40.0,
            bullet_size: 4.0,
            enemy_size: 30.0,
            player_speed: 8.0,
            bullet_speed: 10.0,
            enemy_speed: 2.0,
            enemy_speed_per_wave: 0.5,
            lives: 3,
            points_per_enemy: 100,
            spawn_chance: 0.02,
            spawn_chance_per_wave: 0.005,
            kills_per_wave: 10,
            tick_ms: crate::consts::DEFAULT_TICK_MS,
        }
    }
}

impl ShooterTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = GameId::SpaceShooter;
        interval(game, self.tick_ms)?;
        positive(game, "field.x", self.field.x)?;
        positive(game, "field.y", self.field.y)?;
        positive(game, "player_size", self.player_size)?;
        positive(game, "bullet_size", self.bullet_size)?;
        positive(game, "enemy_size", self.enemy_size)?;
        fits(game, "player_size", self.player_size, self.field.x)?;
        // The ship spawns half a ship above the bottom edge
        fits(game, "player_size", self.player_size * 1.5, self.field.y)?;
        fits(game, "enemy_size", self.enemy_size, self.field.x)?;
        if self.lives == 0 {
            return Err(ConfigError::NonPositive { game, field: "lives" });
        }
        if self.kills_per_wave == 0 {
            return Err(ConfigError::NonPositive {
                game,
                field: "kills_per_wave",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TetrisTuning {
    pub width: i32,
    pub height: i32,
    pub initial_drop_ms: u64,
    pub drop_step_ms: u64,
    pub min_drop_ms: u64,
    pub points_per_line: u32,
    pub lines_per_level: u32,
    pub tick_ms: u64,
}

impl Default for TetrisTuning {
    fn default() -> Self {
        Self {
            width: 10,
            height: 20,
            initial_drop_ms: 1000,
            drop_step_ms: 50,
            min_drop_ms: 50,
            points_per_line: 100,
            lines_per_level: 10,
            tick_ms: crate::consts::DEFAULT_TICK_MS,
        }
    }
}

impl TetrisTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = GameId::Tetris;
        interval(game, self.tick_ms)?;
        interval(game, self.initial_drop_ms)?;
        interval(game, self.min_drop_ms)?;
        // Pieces spawn one column left of centre, so a flat I needs five
        if self.width < 5 || self.height < 4 {
            return Err(ConfigError::Invalid {
                game,
                reason: format!("board {}x{} is too small", self.width, self.height),
            });
        }
        if self.lines_per_level == 0 {
            return Err(ConfigError::NonPositive {
                game,
                field: "lines_per_level",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleTuning {
    pub field: Vec2,
    pub tick_ms: u64,
    pub duration_ms: u64,
    pub min_size: f32,
    pub max_size: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Ticks a bubble lives for
    pub life: u32,
    pub spawn_chance: f32,
    pub initial_bubbles: usize,
    pub combo: ComboRules,
}

impl Default for BubbleTuning {
    fn default() -> Self {
        Self {
            field: Vec2::new(600.0, 400.0),
            tick_ms: 100,
            duration_ms: 60_000,
            min_size: 30.0,
            max_size: 70.0,
            min_speed: 1.0,
            max_speed: 3.0,
            life: 100,
            spawn_chance: 0.3,
            initial_bubbles: 5,
            combo: ComboRules {
                window_ms: Some(1_000),
                bonus_every: Some(5),
                multiplier_every: Some(10),
                multiplier_step: 0.5,
                multiplier_cap: 5.0,
            },
        }
    }
}

impl BubbleTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = GameId::BubblePop;
        interval(game, self.tick_ms)?;
        interval(game, self.duration_ms)?;
        positive(game, "min_size", self.min_size)?;
        positive(game, "min_speed", self.min_speed)?;
        if self.max_size < self.min_size || self.max_speed < self.min_speed {
            return Err(ConfigError::Invalid {
                game,
                reason: "size and speed ranges must not be inverted".to_owned(),
            });
        }
        fits(game, "max_size", self.max_size, self.field.x.min(self.field.y))?;
        Ok(())
    }
}

/// Beat pattern for Rhythm Tap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    #[default]
    Calm,
    Moderate,
    Energetic,
}

impl PatternKind {
    pub fn bpm(&self) -> u32 {
        match self {
            PatternKind::Calm => 80,
            PatternKind::Moderate => 120,
            PatternKind::Energetic => 160,
        }
    }

    /// Which of the eight steps spawn a beat
    pub fn steps(&self) -> [bool; 8] {
        let bits: [u8; 8] = match self {
            PatternKind::Calm => [1, 0, 1, 0, 1, 0, 1, 0],
            PatternKind::Moderate => [1, 0, 1, 1, 0, 1, 0, 1],
            PatternKind::Energetic => [1, 1, 0, 1, 1, 0, 1, 0],
        };
        bits.map(|b| b == 1)
    }

    pub fn beat_interval_ms(&self) -> u64 {
        60_000 / self.bpm() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmTuning {
    pub zones: u8,
    pub width: f32,
    pub tick_ms: u64,
    pub duration_ms: u64,
    pub spawn_y: f32,
    pub beat_speed: f32,
    /// Open interval of y positions where a tap counts
    pub hit_window: (f32, f32),
    pub hit_center: f32,
    pub perfect_within: f32,
    pub good_within: f32,
    pub perfect_points: u32,
    pub good_points: u32,
    /// Beats below this y are gone
    pub despawn_y: f32,
    pub combo: ComboRules,
}

impl Default for RhythmTuning {
    fn default() -> Self {
        Self {
            zones: 4,
            width: 400.0,
            tick_ms: crate::consts::DEFAULT_TICK_MS,
            duration_ms: 60_000,
            spawn_y: -50.0,
            beat_speed: 3.0,
            hit_window: (200.0, 400.0),
            hit_center: 300.0,
            perfect_within: 20.0,
            good_within: 50.0,
            perfect_points: 100,
            good_points: 50,
            despawn_y: 500.0,
            combo: ComboRules {
                window_ms: None,
                bonus_every: None,
                multiplier_every: Some(10),
                multiplier_step: 0.5,
                multiplier_cap: 3.0,
            },
        }
    }
}

impl RhythmTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = GameId::RhythmTap;
        interval(game, self.tick_ms)?;
        interval(game, self.duration_ms)?;
        if self.zones == 0 {
            return Err(ConfigError::NonPositive { game, field: "zones" });
        }
        positive(game, "width", self.width)?;
        positive(game, "beat_speed", self.beat_speed)?;
        if self.hit_window.0 >= self.hit_window.1 {
            return Err(ConfigError::Invalid {
                game,
                reason: "hit window is empty".to_owned(),
            });
        }
        Ok(())
    }
}

/// Colour set the Color Match targets are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteKind {
    #[default]
    Calm,
    Energetic,
    Peaceful,
}

impl PaletteKind {
    pub fn colors(&self) -> [[u8; 3]; 5] {
        match self {
            PaletteKind::Calm => [
                [135, 206, 235],
                [144, 238, 144],
                [221, 160, 221],
                [255, 182, 193],
                [176, 196, 222],
            ],
            PaletteKind::Energetic => [
                [255, 69, 0],
                [255, 215, 0],
                [50, 205, 50],
                [255, 20, 147],
                [138, 43, 226],
            ],
            PaletteKind::Peaceful => [
                [230, 230, 250],
                [240, 248, 255],
                [245, 245, 220],
                [255, 240, 245],
                [248, 248, 255],
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorMatchTuning {
    pub tick_ms: u64,
    pub duration_ms: u64,
    pub start_color: [u8; 3],
    pub tolerance: f32,
    pub tolerance_step: f32,
    pub min_tolerance: f32,
    pub matches_per_level: u32,
    /// Full width of the random offset around a palette colour
    pub variation: f32,
}

impl Default for ColorMatchTuning {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            duration_ms: 30_000,
            start_color: [128, 128, 128],
            tolerance: 30.0,
            tolerance_step: 2.0,
            min_tolerance: 10.0,
            matches_per_level: 5,
            variation: 50.0,
        }
    }
}

impl ColorMatchTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = GameId::ColorMatch;
        interval(game, self.tick_ms)?;
        interval(game, self.duration_ms)?;
        positive(game, "tolerance", self.tolerance)?;
        positive(game, "min_tolerance", self.min_tolerance)?;
        if self.matches_per_level == 0 {
            return Err(ConfigError::NonPositive {
                game,
                field: "matches_per_level",
            });
        }
        Ok(())
    }
}

/// Balance for every game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub snake: SnakeTuning,
    pub pong: PongTuning,
    pub shooter: ShooterTuning,
    pub tetris: TetrisTuning,
    pub bubble: BubbleTuning,
    pub rhythm: RhythmTuning,
    pub color_match: ColorMatchTuning,
}

impl Tuning {
    /// Parse overrides; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self, game: GameId) -> Result<(), ConfigError> {
        match game {
            GameId::Snake => self.snake.validate(),
            GameId::Pong => self.pong.validate(),
            GameId::SpaceShooter => self.shooter.validate(),
            GameId::Tetris => self.tetris.validate(),
            GameId::BubblePop => self.bubble.validate(),
            GameId::RhythmTap => self.rhythm.validate(),
            GameId::ColorMatch => self.color_match.validate(),
        }
    }
}
