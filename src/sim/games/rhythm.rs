//! Rhythm Tap
//!
//! Beats fall down one of the tap zones on a fixed pattern. Tapping a zone
//! grades the first live beat inside the hit window by its distance from
//! the window centre; beats that fall through unplayed count as misses.

use glam::Vec2;
use rand::Rng;

use crate::GameId;
use crate::sim::engine::{Game, Step, TickContext};
use crate::sim::input::{Action, InputIntent};
use crate::sim::scoring::ScoreBoard;
use crate::sim::state::{EntityId, EntityKind, EntityView, GameEvent, HitGrade, IdAllocator, Outcome};
use crate::tuning::{PatternKind, RhythmTuning};

/// Rendered beat diameter
const BEAT_SIZE: f32 = 40.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Beat {
    pub id: EntityId,
    pub zone: u8,
    pub y: f32,
    /// Set once the beat was tapped
    pub hit: Option<HitGrade>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitCounts {
    pub perfect: u32,
    pub good: u32,
    pub missed: u32,
}

impl HitCounts {
    fn record(&mut self, grade: HitGrade) {
        match grade {
            HitGrade::Perfect => self.perfect += 1,
            HitGrade::Good => self.good += 1,
            HitGrade::Miss => self.missed += 1,
        }
    }

    /// Percentage of judged beats that were hit, 100 before any judgement
    pub fn accuracy(&self) -> u32 {
        let hits = self.perfect + self.good;
        let total = hits + self.missed;
        if total == 0 {
            return 100;
        }
        (hits as f32 / total as f32 * 100.0).round() as u32
    }
}

#[derive(Debug, Clone)]
pub struct RhythmTap {
    tuning: RhythmTuning,
    pattern: PatternKind,
    beats: Vec<Beat>,
    ids: IdAllocator,
    /// Pattern step counter
    step: u64,
    beat_timer_ms: u64,
    counts: HitCounts,
    remaining_ms: u64,
    board: ScoreBoard,
    outcome: Option<Outcome>,
}

impl RhythmTap {
    pub fn new(tuning: RhythmTuning, pattern: PatternKind) -> Self {
        Self {
            pattern,
            beats: Vec::new(),
            ids: IdAllocator::default(),
            step: 0,
            beat_timer_ms: 0,
            counts: HitCounts::default(),
            remaining_ms: tuning.duration_ms,
            board: ScoreBoard::new(tuning.combo),
            outcome: None,
            tuning,
        }
    }

    pub fn beats(&self) -> &[Beat] {
        &self.beats
    }

    pub fn counts(&self) -> HitCounts {
        self.counts
    }

    pub fn accuracy(&self) -> u32 {
        self.counts.accuracy()
    }

    pub fn streak(&self) -> u32 {
        self.board.combo()
    }

    pub fn multiplier(&self) -> f32 {
        self.board.multiplier()
    }

    pub fn pattern(&self) -> PatternKind {
        self.pattern
    }

    fn zone_width(&self) -> f32 {
        self.tuning.width / self.tuning.zones as f32
    }

    fn grade(&self, y: f32) -> (HitGrade, u32) {
        let t = &self.tuning;
        let distance = (y - t.hit_center).abs();
        if distance < t.perfect_within {
            (HitGrade::Perfect, t.perfect_points)
        } else if distance < t.good_within {
            (HitGrade::Good, t.good_points)
        } else {
            (HitGrade::Miss, 0)
        }
    }

    fn judge(&mut self, grade: HitGrade, points: u32, now_ms: u64, events: &mut Vec<GameEvent>) {
        self.counts.record(grade);
        let judged = GameEvent::BeatJudged { grade, points };
        let earned = self.board.apply_event(&judged, now_ms);
        events.push(GameEvent::BeatJudged {
            grade,
            points: earned as u32,
        });
    }

    fn tap(&mut self, zone: u8, now_ms: u64, events: &mut Vec<GameEvent>) {
        let (low, high) = self.tuning.hit_window;
        let Some(index) = self
            .beats
            .iter()
            .position(|b| b.zone == zone && b.hit.is_none() && b.y > low && b.y < high)
        else {
            return;
        };
        let (grade, points) = self.grade(self.beats[index].y);
        self.beats[index].hit = Some(grade);
        self.judge(grade, points, now_ms, events);
    }
}

impl Game for RhythmTap {
    fn id(&self) -> GameId {
        GameId::RhythmTap
    }

    fn advance(&self, intent: Option<&InputIntent>, ctx: &mut TickContext<'_>) -> Step<Self> {
        let mut next = self.clone();
        let mut events = Vec::new();

        if let Some(InputIntent::Action(Action::Zone(zone))) = intent
            && *zone < self.tuning.zones
        {
            next.tap(*zone, ctx.now_ms, &mut events);
        }

        let speed = self.tuning.beat_speed;
        let despawn_y = self.tuning.despawn_y;
        let mut fell_through = 0;
        next.beats.retain_mut(|beat| {
            beat.y += speed;
            if beat.y <= despawn_y {
                return true;
            }
            if beat.hit.is_none() {
                fell_through += 1;
            }
            false
        });
        for _ in 0..fell_through {
            next.judge(HitGrade::Miss, 0, ctx.now_ms, &mut events);
        }

        next.beat_timer_ms += ctx.dt_ms;
        let beat_interval = self.pattern.beat_interval_ms();
        while next.beat_timer_ms >= beat_interval {
            next.beat_timer_ms -= beat_interval;
            let steps = self.pattern.steps();
            if steps[(next.step % steps.len() as u64) as usize] {
                let zone = ctx.rng.random_range(0..self.tuning.zones);
                let beat = Beat {
                    id: next.ids.next(ctx.tick),
                    zone,
                    y: self.tuning.spawn_y,
                    hit: None,
                };
                next.beats.push(beat);
            }
            next.step += 1;
        }

        next.remaining_ms = self.remaining_ms.saturating_sub(ctx.dt_ms);
        if next.remaining_ms == 0 {
            log::debug!(
                "Rhythm run over, accuracy {}% best streak {}",
                next.accuracy(),
                next.board.best_combo()
            );
            events.push(GameEvent::TimeUp);
            next.outcome = Some(Outcome::Lose);
            events.push(GameEvent::Finished(Outcome::Lose));
        }

        Step::new(next, events)
    }

    fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    fn score(&self) -> u64 {
        self.board.score()
    }

    fn tick_interval_ms(&self) -> u64 {
        self.tuning.tick_ms
    }

    fn snapshot(&self) -> Vec<EntityView> {
        let zone_width = self.zone_width();
        self.beats
            .iter()
            .map(|b| {
                let center_x = b.zone as f32 * zone_width + zone_width / 2.0;
                EntityView::new(
                    EntityKind::Beat,
                    Vec2::new(center_x - BEAT_SIZE / 2.0, b.y),
                    Vec2::splat(BEAT_SIZE),
                )
                .with_tag(b.zone as u32)
            })
            .collect()
    }
}
