//! Scoring and progression
//!
//! A [`ScoreBoard`] turns scoring events into score deltas, tracking the
//! combo/streak and a multiplier that only ever grows during a session.

use serde::{Deserialize, Serialize};

use super::state::GameEvent;

/// How combos and multipliers behave for one game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboRules {
    /// Combo resets if no scoring event lands within this window
    pub window_ms: Option<u64>,
    /// Extra `combo / n` bonus factor on top of 1
    pub bonus_every: Option<u32>,
    /// Streak length that bumps the multiplier
    pub multiplier_every: Option<u32>,
    pub multiplier_step: f32,
    pub multiplier_cap: f32,
}

impl ComboRules {
    /// Points as given, no combo effects
    pub const FLAT: ComboRules = ComboRules {
        window_ms: None,
        bonus_every: None,
        multiplier_every: None,
        multiplier_step: 0.0,
        multiplier_cap: 1.0,
    };
}

impl Default for ComboRules {
    fn default() -> Self {
        Self::FLAT
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBoard {
    rules: ComboRules,
    score: u64,
    combo: u32,
    best_combo: u32,
    multiplier: f32,
    last_hit_ms: Option<u64>,
}

impl ScoreBoard {
    pub fn new(rules: ComboRules) -> Self {
        Self {
            rules,
            score: 0,
            combo: 0,
            best_combo: 0,
            multiplier: 1.0,
            last_hit_ms: None,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn best_combo(&self) -> u32 {
        self.best_combo
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Drop a combo whose window has expired
    pub fn decay(&mut self, now_ms: u64) {
        if let (Some(window), Some(last)) = (self.rules.window_ms, self.last_hit_ms)
            && now_ms.saturating_sub(last) >= window
        {
            self.combo = 0;
            self.last_hit_ms = None;
        }
    }

    /// Apply one event and return the score delta
    pub fn apply_event(&mut self, event: &GameEvent, now_ms: u64) -> u64 {
        self.decay(now_ms);

        if event.is_miss() {
            self.combo = 0;
            self.last_hit_ms = None;
            return 0;
        }
        let Some(base) = event.base_points() else {
            return 0;
        };

        let bonus = self
            .rules
            .bonus_every
            .map_or(1, |every| self.combo / every.max(1) + 1);
        let delta = (base as f32 * self.multiplier * bonus as f32).floor() as u64;

        self.combo += 1;
        self.best_combo = self.best_combo.max(self.combo);
        self.last_hit_ms = Some(now_ms);
        self.score += delta;

        // Applies from the next hit on
        if let Some(every) = self.rules.multiplier_every
            && self.combo % every.max(1) == 0
        {
            self.multiplier = (self.multiplier + self.rules.multiplier_step)
                .min(self.rules.multiplier_cap)
                .max(self.multiplier);
        }

        delta
    }

    /// Add points that bypass combo handling
    pub fn add_raw(&mut self, points: u64) {
        self.score += points;
    }
}

/// Ties are not a new high score
pub fn is_new_high_score(current: u64, best: u64) -> bool {
    current > best
}

/// Shorten an interval by `step`, never below `floor`
pub fn ramp_down(interval_ms: u64, step_ms: u64, floor_ms: u64) -> u64 {
    interval_ms.saturating_sub(step_ms).max(floor_ms)
}
