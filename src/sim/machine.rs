//! Game state machine
//!
//! Menu -> Playing <-> Paused -> GameOver / Victory -> Menu.
//! The machine only tracks the phase; the session decides what each
//! transition means for the ticker and the game state.

use super::state::{GamePhase, Outcome};
use crate::error::TransitionError;

#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    phase: GamePhase,
    /// Reference point for delta-time, refreshed on every entry into Playing
    last_update_ms: u64,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn last_update_ms(&self) -> u64 {
        self.last_update_ms
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn can_play(&self) -> bool {
        matches!(
            self.phase,
            GamePhase::Menu | GamePhase::GameOver | GamePhase::Victory | GamePhase::Loading
        )
    }

    pub fn can_pause(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn can_resume(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    fn enter_playing(&mut self, now_ms: u64) {
        self.phase = GamePhase::Playing;
        self.last_update_ms = now_ms;
    }

    pub fn start(&mut self, now_ms: u64) -> Result<(), TransitionError> {
        if !self.can_play() {
            return Err(TransitionError {
                action: "start",
                from: self.phase,
            });
        }
        self.enter_playing(now_ms);
        Ok(())
    }

    /// Returns `Ok(false)` if already paused
    pub fn pause(&mut self) -> Result<bool, TransitionError> {
        match self.phase {
            GamePhase::Playing => {
                self.phase = GamePhase::Paused;
                Ok(true)
            }
            GamePhase::Paused => Ok(false),
            from => Err(TransitionError {
                action: "pause",
                from,
            }),
        }
    }

    /// Returns `Ok(false)` if already playing
    pub fn resume(&mut self, now_ms: u64) -> Result<bool, TransitionError> {
        match self.phase {
            GamePhase::Paused => {
                self.enter_playing(now_ms);
                Ok(true)
            }
            GamePhase::Playing => Ok(false),
            from => Err(TransitionError {
                action: "resume",
                from,
            }),
        }
    }

    pub fn toggle_pause(&mut self, now_ms: u64) -> Result<GamePhase, TransitionError> {
        match self.phase {
            GamePhase::Playing => self.pause()?,
            _ => self.resume(now_ms)?,
        };
        Ok(self.phase)
    }

    /// Terminal transition out of Playing
    pub fn end(&mut self, outcome: Outcome) -> Result<GamePhase, TransitionError> {
        if self.phase != GamePhase::Playing {
            return Err(TransitionError {
                action: "end",
                from: self.phase,
            });
        }
        self.phase = match outcome {
            Outcome::Win => GamePhase::Victory,
            Outcome::Lose => GamePhase::GameOver,
        };
        Ok(self.phase)
    }

    /// Back to the menu after a finished run. `Ok(false)` if already there.
    pub fn reset(&mut self) -> Result<bool, TransitionError> {
        match self.phase {
            GamePhase::GameOver | GamePhase::Victory => {
                self.phase = GamePhase::Menu;
                Ok(true)
            }
            GamePhase::Menu => Ok(false),
            from => Err(TransitionError {
                action: "reset",
                from,
            }),
        }
    }

    /// Escape key: abandon a live run
    pub fn escape(&mut self) -> bool {
        if matches!(self.phase, GamePhase::Playing | GamePhase::Paused) {
            self.phase = GamePhase::Menu;
            true
        } else {
            false
        }
    }

    /// Host window lost focus or visibility
    pub fn focus_lost(&mut self) -> bool {
        matches!(self.pause(), Ok(true))
    }

    /// Loading only ever wraps the menu
    pub fn set_loading(&mut self, loading: bool) -> bool {
        match (loading, self.phase) {
            (true, GamePhase::Menu) => {
                self.phase = GamePhase::Loading;
                true
            }
            (false, GamePhase::Loading) => {
                self.phase = GamePhase::Menu;
                true
            }
            _ => false,
        }
    }
}
