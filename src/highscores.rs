//! High score store
//!
//! Best score plus the last ten results per game. Persistence is
//! best-effort: a failed write is logged and the in-memory record stays
//! authoritative for the rest of the session.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::GameId;
use crate::consts::{HIGH_SCORE_SUFFIX, HISTORY_SUFFIX, MAX_HISTORY, STORAGE_PREFIX};
use crate::error::StorageError;
use crate::platform::{KeyValueStore, TimeSource};
use crate::sim::scoring::is_new_high_score;

/// One finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub score: u64,
    /// ISO-8601 on disk
    pub date: DateTime<Utc>,
    #[serde(rename = "gameId")]
    pub game_id: GameId,
}

/// Result of [`HighScoreStore::save`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub is_new_high: bool,
}

/// Aggregates over the stored history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScoreStats {
    pub total_games: usize,
    pub average: u64,
    pub best: u64,
    pub worst: u64,
    pub total: u64,
    /// Percent change of the three most recent runs over the three oldest
    pub improvement: i64,
}

#[derive(Debug, Clone, Default)]
struct Record {
    best: u64,
    /// Most recent first
    history: Vec<HistoryEntry>,
}

pub fn high_score_key(game: GameId) -> String {
    format!("{STORAGE_PREFIX}{}{HIGH_SCORE_SUFFIX}", game.as_str())
}

pub fn history_key(game: GameId) -> String {
    format!("{}{HISTORY_SUFFIX}", high_score_key(game))
}

/// "1.2K", "3.4M"
pub fn format_score(score: u64) -> String {
    if score >= 1_000_000 {
        format!("{:.1}M", score as f64 / 1_000_000.0)
    } else if score >= 1_000 {
        format!("{:.1}K", score as f64 / 1_000.0)
    } else {
        score.to_string()
    }
}

pub struct HighScoreStore<S, C> {
    storage: S,
    clock: C,
    records: BTreeMap<GameId, Record>,
}

impl<S: KeyValueStore, C: TimeSource> HighScoreStore<S, C> {
    pub fn new(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            records: BTreeMap::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn read_best(&self, game: GameId) -> Result<u64, StorageError> {
        let key = high_score_key(game);
        match self.storage.get(&key)? {
            None => Ok(0),
            Some(raw) => raw.trim().parse().map_err(|e| StorageError::Corrupt {
                key,
                reason: format!("{e}"),
            }),
        }
    }

    fn read_history(&self, game: GameId) -> Result<Vec<HistoryEntry>, StorageError> {
        let key = history_key(game);
        match self.storage.get(&key)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                key,
                reason: e.to_string(),
            }),
        }
    }

    fn read_record(&self, game: GameId) -> Record {
        let best = self.read_best(game).unwrap_or_else(|e| {
            log::warn!("Failed to load high score: {e}");
            0
        });
        let mut history = self.read_history(game).unwrap_or_else(|e| {
            log::warn!("Failed to load score history: {e}");
            Vec::new()
        });
        history.truncate(MAX_HISTORY);
        Record { best, history }
    }

    fn record(&mut self, game: GameId) -> &mut Record {
        if !self.records.contains_key(&game) {
            let record = self.read_record(game);
            self.records.insert(game, record);
        }
        self.records.entry(game).or_default()
    }

    /// Best score, 0 if none
    pub fn load(&self, game: GameId) -> u64 {
        match self.records.get(&game) {
            Some(record) => record.best,
            None => self.read_record(game).best,
        }
    }

    /// Most recent first, at most ten entries
    pub fn history(&self, game: GameId) -> Vec<HistoryEntry> {
        match self.records.get(&game) {
            Some(record) => record.history.clone(),
            None => self.read_record(game).history,
        }
    }

    /// Record a finished run. Every run lands in the history; the best
    /// score only moves when strictly beaten.
    pub fn save(&mut self, game: GameId, score: u64) -> SaveOutcome {
        let date = self.clock.now_utc();
        let record = self.record(game);

        let is_new_high = is_new_high_score(score, record.best);
        if is_new_high {
            record.best = score;
        }
        record.history.insert(
            0,
            HistoryEntry {
                score,
                date,
                game_id: game,
            },
        );
        record.history.truncate(MAX_HISTORY);

        let best = record.best;
        let history = record.history.clone();

        if is_new_high {
            self.write(&high_score_key(game), &best.to_string());
        }
        match serde_json::to_string(&history) {
            Ok(json) => self.write(&history_key(game), &json),
            Err(e) => log::warn!("Failed to serialize score history: {e}"),
        }

        if is_new_high {
            log::info!("New high score for {game}: {score}");
        }
        SaveOutcome { is_new_high }
    }

    /// Forget the best score and history
    pub fn clear(&mut self, game: GameId) {
        self.records.insert(game, Record::default());
        for key in [high_score_key(game), history_key(game)] {
            if let Err(e) = self.storage.remove(&key) {
                log::warn!("Failed to clear high score: {e}");
            }
        }
    }

    /// Best score of every game (0 when unplayed)
    pub fn all_high_scores(&self) -> BTreeMap<GameId, u64> {
        GameId::ALL
            .into_iter()
            .map(|game| (game, self.load(game)))
            .collect()
    }

    pub fn stats(&self, game: GameId) -> ScoreStats {
        let best = self.load(game);
        let history = self.history(game);
        if history.is_empty() {
            return ScoreStats {
                best,
                ..Default::default()
            };
        }

        let scores: Vec<u64> = history.iter().map(|e| e.score).collect();
        let total: u64 = scores.iter().sum();
        let average = (total as f64 / scores.len() as f64).round() as u64;
        let worst = scores.iter().copied().min().unwrap_or(0);

        let mut improvement = 0;
        if scores.len() >= 6 {
            let recent = scores[..3].iter().sum::<u64>() as f64 / 3.0;
            let early = scores[scores.len() - 3..].iter().sum::<u64>() as f64 / 3.0;
            if early > 0.0 {
                improvement = ((recent - early) / early * 100.0).round() as i64;
            }
        }

        ScoreStats {
            total_games: scores.len(),
            average,
            best,
            worst,
            total,
            improvement,
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            log::warn!("Failed to save high score: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::FailingStore;
    use crate::platform::{ManualTime, MemoryStore};
    use chrono::Duration;
    use proptest::prelude::*;
    use std::rc::Rc;

    fn store() -> HighScoreStore<MemoryStore, Rc<ManualTime>> {
        HighScoreStore::new(MemoryStore::new(), Rc::new(ManualTime::default()))
    }

    #[test]
    fn test_best_and_history() {
        let clock = Rc::new(ManualTime::default());
        let mut scores = HighScoreStore::new(MemoryStore::new(), clock.clone());

        assert_eq!(scores.save(GameId::Snake, 50), SaveOutcome { is_new_high: true });
        assert_eq!(scores.load(GameId::Snake), 50);

        clock.advance(Duration::seconds(5));
        assert_eq!(scores.save(GameId::Snake, 30), SaveOutcome { is_new_high: false });
        assert_eq!(scores.load(GameId::Snake), 50);

        let history = scores.history(GameId::Snake);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].score, 30);
        assert_eq!(history[1].score, 50);
        assert!(history[0].date > history[1].date);
    }

    #[test]
    fn test_tie_is_not_new_high() {
        let mut scores = store();
        scores.save(GameId::Pong, 500);
        assert!(!scores.save(GameId::Pong, 500).is_new_high);
    }

    #[test]
    fn test_storage_layout() {
        let mut scores = store();
        scores.save(GameId::SpaceShooter, 1200);
        let raw = scores.storage();
        assert_eq!(
            raw.get("arcade_space-shooterHighScore").unwrap().as_deref(),
            Some("1200")
        );
        let history = raw
            .get("arcade_space-shooterHighScore_history")
            .unwrap()
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&history).unwrap();
        assert_eq!(json[0]["score"], 1200);
        assert_eq!(json[0]["gameId"], "space-shooter");
        assert!(json[0]["date"].as_str().unwrap().starts_with("1970-01-01T"));
    }

    #[test]
    fn test_reads_existing_storage() {
        let mut raw = MemoryStore::new();
        raw.set("arcade_tetrisHighScore", "900").unwrap();
        let scores = HighScoreStore::new(raw, ManualTime::default());
        assert_eq!(scores.load(GameId::Tetris), 900);
        assert_eq!(scores.load(GameId::Snake), 0);
    }

    #[test]
    fn test_corrupt_values_read_as_empty() {
        let mut raw = MemoryStore::new();
        raw.set("arcade_snakeHighScore", "lots").unwrap();
        raw.set("arcade_snakeHighScore_history", "[{").unwrap();
        let mut scores = HighScoreStore::new(raw, ManualTime::default());
        assert_eq!(scores.load(GameId::Snake), 0);
        assert!(scores.history(GameId::Snake).is_empty());
        assert!(scores.save(GameId::Snake, 1).is_new_high);
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let mut scores = HighScoreStore::new(FailingStore::default(), ManualTime::default());
        assert!(scores.save(GameId::BubblePop, 42).is_new_high);
        // In-memory record survives the failed write
        assert_eq!(scores.load(GameId::BubblePop), 42);
        assert_eq!(scores.history(GameId::BubblePop).len(), 1);
        assert!(!scores.save(GameId::BubblePop, 10).is_new_high);
        scores.clear(GameId::BubblePop);
        assert_eq!(scores.load(GameId::BubblePop), 0);
    }

    #[test]
    fn test_clear() {
        let mut scores = store();
        scores.save(GameId::Snake, 10);
        scores.clear(GameId::Snake);
        assert_eq!(scores.load(GameId::Snake), 0);
        assert!(scores.history(GameId::Snake).is_empty());
        assert!(scores.storage().is_empty());
    }

    #[test]
    fn test_all_high_scores() {
        let mut scores = store();
        scores.save(GameId::Snake, 10);
        scores.save(GameId::Pong, 300);
        let all = scores.all_high_scores();
        assert_eq!(all.len(), GameId::ALL.len());
        assert_eq!(all[&GameId::Pong], 300);
        assert_eq!(all[&GameId::ColorMatch], 0);
    }

    #[test]
    fn test_stats() {
        let mut scores = store();
        assert_eq!(scores.stats(GameId::Snake), ScoreStats::default());

        // Oldest first: 10, 10, 10, 20, 20, 20
        for s in [10, 10, 10, 20, 20, 20] {
            scores.save(GameId::Snake, s);
        }
        let stats = scores.stats(GameId::Snake);
        assert_eq!(stats.total_games, 6);
        assert_eq!(stats.total, 90);
        assert_eq!(stats.average, 15);
        assert_eq!(stats.best, 20);
        assert_eq!(stats.worst, 10);
        assert_eq!(stats.improvement, 100);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(999), "999");
        assert_eq!(format_score(1_200), "1.2K");
        assert_eq!(format_score(3_400_000), "3.4M");
    }

    proptest! {
        #[test]
        fn prop_history_capped_and_best_monotonic(runs in proptest::collection::vec(0u64..10_000, 1..40)) {
            let mut scores = store();
            let mut best = 0;
            for score in runs {
                let outcome = scores.save(GameId::RhythmTap, score);
                prop_assert_eq!(outcome.is_new_high, score > best);
                best = best.max(score);
                prop_assert_eq!(scores.load(GameId::RhythmTap), best);
                prop_assert!(scores.history(GameId::RhythmTap).len() <= MAX_HISTORY);
                prop_assert_eq!(scores.history(GameId::RhythmTap)[0].score, score);
            }
        }
    }
}
