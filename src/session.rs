//! Game session
//!
//! Ties one running game to the phase machine, the ticker, the high score
//! store and the audio sink. The host only feeds it time and input:
//!
//! ```text
//! host timer ──> pump(now) ──> step(dt) ──> AnyGame::advance
//!                                  │
//!                                  ├─> audio cues
//!                                  ├─> ticker retime (speed ramps)
//!                                  └─> terminal: machine.end + high score save
//! ```

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::GameId;
use crate::audio::{AudioSink, sound_for};
use crate::error::{SessionError, TransitionError};
use crate::highscores::HighScoreStore;
use crate::platform::{KeyValueStore, TimeSource};
use crate::settings::Settings;
use crate::sim::input::{Action, Gesture, InputIntent, classify_gesture, map_key, tap_action};
use crate::sim::scoring::is_new_high_score;
use crate::sim::{
    AnyGame, EntityView, Game, GameEvent, GamePhase, Outcome, StateMachine, TickContext, TickFlow,
    Ticker,
};
use crate::tuning::Tuning;

/// Pending intents kept between ticks; older ones are dropped first
pub const MAX_QUEUED_INTENTS: usize = 8;

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub game: GameId,
    pub score: u64,
    pub outcome: Outcome,
    pub is_new_high: bool,
    pub ticks: u64,
}

pub struct GameSession<S, C, A> {
    tuning: Tuning,
    settings: Settings,
    machine: StateMachine,
    ticker: Ticker,
    game: Option<AnyGame>,
    rng: Pcg32,
    intents: VecDeque<InputIntent>,
    /// Simulated milliseconds since start
    sim_ms: u64,
    ticks: u64,
    high_scores: HighScoreStore<S, C>,
    audio: A,
    /// Events since the host last drained them
    events: Vec<GameEvent>,
    last_result: Option<SessionResult>,
}

impl<S: KeyValueStore, C: TimeSource, A: AudioSink> GameSession<S, C, A> {
    /// New session in the menu. Settings are read from `storage`.
    pub fn new(storage: S, clock: C, audio: A) -> Self {
        let settings = Settings::load(&storage);
        Self {
            tuning: Tuning::default(),
            settings,
            machine: StateMachine::new(),
            ticker: Ticker::new(),
            game: None,
            rng: Pcg32::seed_from_u64(0),
            intents: VecDeque::new(),
            sim_ms: 0,
            ticks: 0,
            high_scores: HighScoreStore::new(storage, clock),
            audio,
            events: Vec::new(),
            last_result: None,
        }
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Takes effect at the next `start`
    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.tuning = tuning;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace and persist the settings
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.settings.save(self.high_scores.storage_mut());
    }

    pub fn phase(&self) -> GamePhase {
        self.machine.phase()
    }

    pub fn game(&self) -> Option<&AnyGame> {
        self.game.as_ref()
    }

    pub fn game_id(&self) -> Option<GameId> {
        self.game.as_ref().map(Game::id)
    }

    pub fn score(&self) -> u64 {
        self.game.as_ref().map_or(0, Game::score)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The live score already beats the stored best for this game
    pub fn is_new_high_so_far(&self) -> bool {
        self.game_id()
            .is_some_and(|id| is_new_high_score(self.score(), self.high_scores.load(id)))
    }

    pub fn sim_ms(&self) -> u64 {
        self.sim_ms
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.ticker.interval_ms()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn snapshot(&self) -> Vec<EntityView> {
        self.game.as_ref().map(Game::snapshot).unwrap_or_default()
    }

    pub fn last_result(&self) -> Option<SessionResult> {
        self.last_result
    }

    pub fn high_scores(&self) -> &HighScoreStore<S, C> {
        &self.high_scores
    }

    pub fn high_scores_mut(&mut self) -> &mut HighScoreStore<S, C> {
        &mut self.high_scores
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Build a fresh game and start ticking. Invalid tuning keeps the
    /// session in the menu.
    pub fn start(&mut self, id: GameId, seed: u64, now_ms: u64) -> Result<(), SessionError> {
        if !self.machine.can_play() {
            return Err(TransitionError {
                action: "start",
                from: self.machine.phase(),
            }
            .into());
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let game = AnyGame::new(id, &self.tuning, &self.settings, &mut rng)
            .inspect_err(|e| log::warn!("Refusing to start {id}: {e}"))?;
        self.machine.start(now_ms)?;
        self.ticker.start(now_ms, game.tick_interval_ms());

        self.game = Some(game);
        self.rng = rng;
        self.intents.clear();
        self.events.clear();
        self.sim_ms = 0;
        self.ticks = 0;
        self.last_result = None;
        log::info!("Started {id} (seed {seed})");
        Ok(())
    }

    /// Run every tick that is due at `now_ms`. Returns how many ran.
    pub fn pump(&mut self, now_ms: u64) -> u32 {
        let mut ticker = std::mem::take(&mut self.ticker);
        let fired = ticker.pump(now_ms, |dt_ms| self.step(dt_ms));
        self.ticker = ticker;
        fired
    }

    /// One simulation tick
    fn step(&mut self, dt_ms: u64) -> TickFlow {
        if !self.machine.is_playing() {
            return TickFlow::Stop;
        }
        let Some(game) = self.game.as_ref() else {
            panic!("tick scheduled without an active game");
        };

        self.ticks += 1;
        self.sim_ms += dt_ms;
        let intent = self.intents.pop_front();
        let interval_before = game.tick_interval_ms();
        let mut ctx = TickContext {
            dt_ms,
            now_ms: self.sim_ms,
            tick: self.ticks,
            rng: &mut self.rng,
        };
        let step = game.advance(intent.as_ref(), &mut ctx);

        if self.settings.sound_enabled {
            let volume = self.settings.effective_volume();
            for sound in step.events.iter().filter_map(sound_for) {
                self.audio.play(sound, volume);
            }
        }
        self.events.extend(step.events);

        let next = step.state;
        let outcome = next.outcome();
        let interval = next.tick_interval_ms();
        self.game = Some(next);

        if let Some(outcome) = outcome {
            self.finish(outcome);
            TickFlow::Stop
        } else if interval != interval_before {
            TickFlow::Retime(interval)
        } else {
            TickFlow::Continue
        }
    }

    /// Terminal tick: leave Playing and record the run
    fn finish(&mut self, outcome: Outcome) {
        if let Err(e) = self.machine.end(outcome) {
            log::warn!("Run ended outside play: {e}");
        }
        let Some(game) = self.game.as_ref() else {
            return;
        };
        let (id, score) = (game.id(), game.score());
        let saved = self.high_scores.save(id, score);
        let result = SessionResult {
            game: id,
            score,
            outcome,
            is_new_high: saved.is_new_high,
            ticks: self.ticks,
        };
        log::info!(
            "{id} finished: {outcome:?} with {score} points after {} ticks",
            self.ticks
        );
        if saved.is_new_high {
            log::info!("New high score for {id}: {score}");
        }
        self.last_result = Some(result);
    }

    /// Queue an intent for the next tick. Ignored unless playing.
    pub fn push_intent(&mut self, intent: InputIntent) -> bool {
        if !self.machine.is_playing() {
            return false;
        }
        if self.intents.len() >= MAX_QUEUED_INTENTS {
            self.intents.pop_front();
        }
        self.intents.push_back(intent);
        true
    }

    /// Route a `KeyboardEvent.key`. Pause and menu keys act immediately.
    pub fn handle_key(&mut self, key: &str, now_ms: u64) -> bool {
        let Some(id) = self.game_id() else {
            return false;
        };
        match map_key(id, key) {
            Some(InputIntent::Pause) => self.toggle_pause(now_ms).is_ok(),
            Some(InputIntent::Menu) => self.escape(),
            Some(intent) => self.push_intent(intent),
            None => false,
        }
    }

    /// Route a touch from `start` to `end` (playfield coordinates)
    pub fn handle_gesture(&mut self, start: Vec2, end: Vec2, duration_ms: u64) -> bool {
        let Some(id) = self.game_id() else {
            return false;
        };
        let delta = end - start;
        let intent = match classify_gesture(delta.x, delta.y, duration_ms) {
            Gesture::Swipe(dir) => Some(InputIntent::Direction(dir)),
            Gesture::Tap => self.tap_intent(id, end),
            Gesture::None => None,
        };
        intent.is_some_and(|intent| self.push_intent(intent))
    }

    fn tap_intent(&self, id: GameId, at: Vec2) -> Option<InputIntent> {
        let action = match id {
            GameId::BubblePop => Action::Point(at),
            GameId::RhythmTap => {
                let rhythm = &self.tuning.rhythm;
                let zone_width = rhythm.width / rhythm.zones as f32;
                let zone = (at.x / zone_width).floor();
                if zone < 0.0 || zone >= rhythm.zones as f32 {
                    return None;
                }
                Action::Zone(zone as u8)
            }
            _ => tap_action(id)?,
        };
        Some(InputIntent::Action(action))
    }

    /// Suspend ticking. `Ok(false)` if already paused.
    pub fn pause(&mut self) -> Result<bool, TransitionError> {
        let paused = self.machine.pause()?;
        if paused {
            self.ticker.stop();
            log::info!("Paused");
        }
        Ok(paused)
    }

    /// Continue ticking from `now_ms`. `Ok(false)` if already playing.
    pub fn resume(&mut self, now_ms: u64) -> Result<bool, TransitionError> {
        let resumed = self.machine.resume(now_ms)?;
        if resumed && let Some(game) = &self.game {
            self.ticker.start(now_ms, game.tick_interval_ms());
            log::info!("Resumed");
        }
        Ok(resumed)
    }

    pub fn toggle_pause(&mut self, now_ms: u64) -> Result<GamePhase, TransitionError> {
        if self.machine.is_playing() {
            self.pause()?;
        } else {
            self.resume(now_ms)?;
        }
        Ok(self.machine.phase())
    }

    /// Host lost focus or visibility
    pub fn focus_lost(&mut self) -> bool {
        if !self.settings.auto_pause_on_blur {
            return false;
        }
        let paused = self.machine.focus_lost();
        if paused {
            self.ticker.stop();
            log::info!("Auto-paused (focus lost)");
        }
        paused
    }

    /// Abandon a live run without saving it
    pub fn escape(&mut self) -> bool {
        if !self.machine.escape() {
            return false;
        }
        self.ticker.stop();
        self.game = None;
        self.intents.clear();
        log::info!("Run abandoned");
        true
    }

    /// Back to the menu after a finished run
    pub fn reset(&mut self) -> Result<bool, TransitionError> {
        let reset = self.machine.reset()?;
        if reset {
            self.game = None;
            self.intents.clear();
        }
        Ok(reset)
    }

    pub fn set_loading(&mut self, loading: bool) -> bool {
        self.machine.set_loading(loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{SoundKind, SoundLog};
    use crate::error::ConfigError;
    use crate::platform::{ManualTime, MemoryStore};
    use crate::sim::input::Dir;
    use glam::IVec2;

    type TestSession = GameSession<MemoryStore, ManualTime, SoundLog>;

    fn new_session() -> TestSession {
        GameSession::new(MemoryStore::new(), ManualTime::default(), SoundLog::default())
    }

    /// Snake that eats once, then runs into the bottom wall on the third tick
    fn short_snake() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.snake.start = IVec2::new(10, 17);
        tuning.snake.first_food = IVec2::new(10, 18);
        tuning
    }

    #[test]
    fn test_invalid_tuning_stays_in_menu() {
        let mut tuning = Tuning::default();
        tuning.snake.initial_interval_ms = 0;
        let mut session = new_session().with_tuning(tuning);
        let err = session.start(GameId::Snake, 1, 0).unwrap_err();
        assert_eq!(
            err,
            SessionError::Config(ConfigError::ZeroInterval {
                game: GameId::Snake
            })
        );
        assert_eq!(session.phase(), GamePhase::Menu);
        assert!(!session.is_ticking());
        assert!(session.game().is_none());
    }

    #[test]
    fn test_ticks_follow_game_interval() {
        let mut session = new_session();
        session.start(GameId::Snake, 1, 1_000).unwrap();
        assert_eq!(session.tick_interval_ms(), 150);
        assert_eq!(session.pump(1_149), 0);
        assert_eq!(session.pump(1_150), 1);
        assert_eq!(session.pump(1_450), 2);
        assert_eq!(session.sim_ms(), 450);
    }

    #[test]
    fn test_speed_ramp_retimes_ticker() {
        let mut tuning = Tuning::default();
        tuning.snake.first_food = IVec2::new(10, 11);
        let mut session = new_session().with_tuning(tuning);
        session.start(GameId::Snake, 1, 0).unwrap();
        session.pump(150);
        assert_eq!(session.score(), 10);
        assert_eq!(session.tick_interval_ms(), 148);
        // Next tick is due 148 ms after the last one
        assert_eq!(session.pump(297), 0);
        assert_eq!(session.pump(298), 1);
    }

    #[test]
    fn test_game_over_saves_high_score() {
        let mut session = new_session().with_tuning(short_snake());
        session.start(GameId::Snake, 1, 0).unwrap();
        let fired = session.pump(2_000);
        assert_eq!(fired, 3);
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert!(!session.is_ticking());
        assert_eq!(
            session.last_result(),
            Some(SessionResult {
                game: GameId::Snake,
                score: 10,
                outcome: Outcome::Lose,
                is_new_high: true,
                ticks: 3,
            })
        );
        assert_eq!(session.high_scores().load(GameId::Snake), 10);
        assert_eq!(session.high_scores().history(GameId::Snake).len(), 1);

        // Nothing fires after the terminal tick
        assert_eq!(session.pump(10_000), 0);

        // Same score again is not a new high
        session.reset().unwrap();
        session.start(GameId::Snake, 2, 20_000).unwrap();
        session.pump(22_000);
        assert_eq!(session.last_result().map(|r| r.is_new_high), Some(false));
        assert_eq!(session.high_scores().history(GameId::Snake).len(), 2);
    }

    #[test]
    fn test_beating_stored_best_during_play() {
        let mut tuning = Tuning::default();
        tuning.snake.first_food = IVec2::new(10, 11);
        let mut session = new_session().with_tuning(tuning);
        assert!(!session.is_new_high_so_far());
        session.high_scores_mut().save(GameId::Snake, 5);
        session.start(GameId::Snake, 1, 0).unwrap();
        assert!(!session.is_new_high_so_far());
        session.pump(150);
        assert_eq!(session.score(), 10);
        assert!(session.is_new_high_so_far());

        session.high_scores_mut().save(GameId::Snake, 50);
        assert!(!session.is_new_high_so_far());
    }

    #[test]
    fn test_pause_and_resume() {
        let mut session = new_session();
        session.start(GameId::Snake, 1, 0).unwrap();
        assert_eq!(session.pause(), Ok(true));
        assert_eq!(session.pause(), Ok(false));
        assert_eq!(session.pump(5_000), 0);
        assert!(!session.push_intent(InputIntent::Direction(Dir::Left)));

        assert_eq!(session.resume(5_000), Ok(true));
        assert_eq!(session.pump(5_149), 0);
        assert_eq!(session.pump(5_150), 1);
    }

    #[test]
    fn test_resume_from_menu_is_rejected() {
        let mut session = new_session();
        assert_eq!(
            session.resume(0),
            Err(TransitionError {
                action: "resume",
                from: GamePhase::Menu
            })
        );
    }

    #[test]
    fn test_start_while_playing_is_rejected() {
        let mut session = new_session();
        session.start(GameId::Snake, 1, 0).unwrap();
        assert!(matches!(
            session.start(GameId::Pong, 1, 0),
            Err(SessionError::Transition(_))
        ));
        assert_eq!(session.game_id(), Some(GameId::Snake));
    }

    #[test]
    fn test_escape_discards_run() {
        let mut tuning = Tuning::default();
        tuning.snake.first_food = IVec2::new(10, 11);
        let mut session = new_session().with_tuning(tuning);
        session.start(GameId::Snake, 1, 0).unwrap();
        session.pump(150);
        assert!(session.handle_key("Escape", 200));
        assert_eq!(session.phase(), GamePhase::Menu);
        assert!(session.game().is_none());
        assert!(!session.is_ticking());
        assert!(session.high_scores().history(GameId::Snake).is_empty());
    }

    #[test]
    fn test_focus_lost_respects_setting() {
        let mut session = new_session();
        session.start(GameId::Pong, 1, 0).unwrap();
        assert!(session.focus_lost());
        assert_eq!(session.phase(), GamePhase::Paused);

        let mut session = new_session();
        session.update_settings(Settings {
            auto_pause_on_blur: false,
            ..Settings::default()
        });
        session.start(GameId::Pong, 1, 0).unwrap();
        assert!(!session.focus_lost());
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_settings_persist_through_storage() {
        let mut session = new_session();
        session.update_settings(Settings {
            volume: 0.5,
            ..Settings::default()
        });
        let stored = Settings::load(session.high_scores().storage());
        assert_eq!(stored.volume, 0.5);
    }

    #[test]
    fn test_one_intent_per_tick() {
        let mut session = new_session();
        session.start(GameId::Snake, 1, 0).unwrap();
        assert!(session.handle_key("ArrowLeft", 10));
        assert!(session.handle_key("ArrowUp", 20));
        session.pump(150);
        let Some(AnyGame::Snake(snake)) = session.game() else {
            panic!("snake expected");
        };
        assert_eq!(snake.head(), IVec2::new(9, 10));
        session.pump(300);
        let Some(AnyGame::Snake(snake)) = session.game() else {
            panic!("snake expected");
        };
        assert_eq!(snake.head(), IVec2::new(9, 9));
    }

    #[test]
    fn test_pause_key_toggles() {
        let mut session = new_session();
        session.start(GameId::Tetris, 1, 0).unwrap();
        assert!(session.handle_key("p", 100));
        assert_eq!(session.phase(), GamePhase::Paused);
        assert!(session.handle_key("P", 200));
        assert_eq!(session.phase(), GamePhase::Playing);
        // Space hard-drops in tetris instead of pausing
        assert!(session.handle_key(" ", 300));
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_gestures_become_intents() {
        let mut session = new_session();
        session.start(GameId::RhythmTap, 1, 0).unwrap();
        assert!(session.handle_gesture(Vec2::new(250.0, 300.0), Vec2::new(252.0, 301.0), 80));
        assert_eq!(
            session.intents.back(),
            Some(&InputIntent::Action(Action::Zone(2)))
        );
        // Long press is neither tap nor swipe
        assert!(!session.handle_gesture(Vec2::ZERO, Vec2::new(10.0, 0.0), 500));
        assert!(session.handle_gesture(Vec2::ZERO, Vec2::new(0.0, -80.0), 150));
        assert_eq!(
            session.intents.back(),
            Some(&InputIntent::Direction(Dir::Up))
        );
    }

    #[test]
    fn test_sounds_follow_setting() {
        let mut session = new_session().with_tuning(short_snake());
        session.start(GameId::Snake, 1, 0).unwrap();
        session.pump(2_000);
        assert_eq!(
            session.audio().played,
            vec![SoundKind::Eat, SoundKind::Wall, SoundKind::GameOver]
        );

        let mut session = new_session().with_tuning(short_snake());
        session.update_settings(Settings {
            sound_enabled: false,
            ..Settings::default()
        });
        session.start(GameId::Snake, 1, 0).unwrap();
        session.pump(2_000);
        assert!(session.audio().played.is_empty());
    }

    #[test]
    fn test_drain_events() {
        let mut session = new_session().with_tuning(short_snake());
        session.start(GameId::Snake, 1, 0).unwrap();
        session.pump(2_000);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::FoodEaten { points: 10 }));
        assert_eq!(events.last(), Some(&GameEvent::Finished(Outcome::Lose)));
        assert!(session.drain_events().is_empty());
    }
}
