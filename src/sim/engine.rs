//! Game trait and tagged dispatch
//!
//! Every game is a plain value. A tick reads the current value and returns
//! the next one plus the events it produced, so nothing can observe a
//! half-updated state.

use rand_pcg::Pcg32;

use super::games::{BubblePop, ColorMatch, Pong, RhythmTap, Shooter, Snake, Tetris};
use super::input::InputIntent;
use super::state::{EntityView, GameEvent, Outcome};
use crate::GameId;
use crate::error::ConfigError;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Everything a tick may read besides the game state itself
pub struct TickContext<'a> {
    /// Milliseconds since the previous tick
    pub dt_ms: u64,
    /// Simulation time since the session started
    pub now_ms: u64,
    /// Tick counter, also the generation stamp for new entities
    pub tick: u64,
    pub rng: &'a mut Pcg32,
}

/// Output of one tick
#[derive(Debug, Clone)]
pub struct Step<G> {
    pub state: G,
    pub events: Vec<GameEvent>,
}

impl<G> Step<G> {
    pub fn new(state: G, events: Vec<GameEvent>) -> Self {
        Self { state, events }
    }

    pub fn map<H>(self, f: impl FnOnce(G) -> H) -> Step<H> {
        Step {
            state: f(self.state),
            events: self.events,
        }
    }
}

/// One arcade game's rules
pub trait Game: Clone {
    fn id(&self) -> GameId;

    /// Advance one tick. `intent` is at most one queued player request.
    fn advance(&self, intent: Option<&InputIntent>, ctx: &mut TickContext<'_>) -> Step<Self>;

    /// `Some` once a terminal condition was reached
    fn outcome(&self) -> Option<Outcome>;

    fn score(&self) -> u64;

    /// Cadence this game wants right now (speed ramps change it)
    fn tick_interval_ms(&self) -> u64;

    /// Renderer-facing view of every live entity
    fn snapshot(&self) -> Vec<EntityView>;
}

/// Any of the arcade games
#[derive(Debug, Clone)]
pub enum AnyGame {
    Snake(Snake),
    Tetris(Tetris),
    Pong(Pong),
    Shooter(Shooter),
    Bubble(BubblePop),
    Rhythm(RhythmTap),
    ColorMatch(ColorMatch),
}

macro_rules! each_game {
    ($value:expr, $game:ident => $body:expr) => {
        match $value {
            AnyGame::Snake($game) => $body,
            AnyGame::Tetris($game) => $body,
            AnyGame::Pong($game) => $body,
            AnyGame::Shooter($game) => $body,
            AnyGame::Bubble($game) => $body,
            AnyGame::Rhythm($game) => $body,
            AnyGame::ColorMatch($game) => $body,
        }
    };
}

impl AnyGame {
    /// Validate the tuning for `id` and build a fresh game
    pub fn new(
        id: GameId,
        tuning: &Tuning,
        settings: &Settings,
        rng: &mut Pcg32,
    ) -> Result<Self, ConfigError> {
        tuning.validate(id)?;
        let game = match id {
            GameId::Snake => AnyGame::Snake(Snake::new(tuning.snake.clone())),
            GameId::Tetris => AnyGame::Tetris(Tetris::new(tuning.tetris.clone(), rng)),
            GameId::Pong => {
                AnyGame::Pong(Pong::new(tuning.pong.clone(), settings.pong_difficulty))
            }
            GameId::SpaceShooter => AnyGame::Shooter(Shooter::new(tuning.shooter.clone())),
            GameId::BubblePop => AnyGame::Bubble(BubblePop::new(tuning.bubble.clone(), rng)),
            GameId::RhythmTap => {
                AnyGame::Rhythm(RhythmTap::new(tuning.rhythm.clone(), settings.rhythm_pattern))
            }
            GameId::ColorMatch => AnyGame::ColorMatch(ColorMatch::new(
                tuning.color_match.clone(),
                settings.color_palette,
                rng,
            )),
        };
        Ok(game)
    }
}

impl Game for AnyGame {
    fn id(&self) -> GameId {
        each_game!(self, g => g.id())
    }

    /// A finished game stays as it is
    fn advance(&self, intent: Option<&InputIntent>, ctx: &mut TickContext<'_>) -> Step<Self> {
        if self.outcome().is_some() {
            return Step::new(self.clone(), Vec::new());
        }
        match self {
            AnyGame::Snake(g) => g.advance(intent, ctx).map(AnyGame::Snake),
            AnyGame::Tetris(g) => g.advance(intent, ctx).map(AnyGame::Tetris),
            AnyGame::Pong(g) => g.advance(intent, ctx).map(AnyGame::Pong),
            AnyGame::Shooter(g) => g.advance(intent, ctx).map(AnyGame::Shooter),
            AnyGame::Bubble(g) => g.advance(intent, ctx).map(AnyGame::Bubble),
            AnyGame::Rhythm(g) => g.advance(intent, ctx).map(AnyGame::Rhythm),
            AnyGame::ColorMatch(g) => g.advance(intent, ctx).map(AnyGame::ColorMatch),
        }
    }

    fn outcome(&self) -> Option<Outcome> {
        each_game!(self, g => g.outcome())
    }

    fn score(&self) -> u64 {
        each_game!(self, g => g.score())
    }

    fn tick_interval_ms(&self) -> u64 {
        each_game!(self, g => g.tick_interval_ms())
    }

    fn snapshot(&self) -> Vec<EntityView> {
        each_game!(self, g => g.snapshot())
    }
}
