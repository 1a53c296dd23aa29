//! Bubble Pop
//!
//! Bubbles drift in straight lines until they expire or leave the field.
//! Popping in quick succession builds a combo; the run is timed.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::GameId;
use crate::sim::collision::Aabb;
use crate::sim::engine::{Game, Step, TickContext};
use crate::sim::input::{Action, InputIntent};
use crate::sim::scoring::ScoreBoard;
use crate::sim::state::{EntityId, EntityKind, EntityView, GameEvent, IdAllocator, Outcome};
use crate::tuning::BubbleTuning;

/// Colours a renderer can pick from (the view tag indexes these)
pub const BUBBLE_COLORS: u32 = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub id: EntityId,
    /// Top-left corner of the bounding square
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
    /// Heading in radians
    pub direction: f32,
    /// Ticks left
    pub life: u32,
    pub points: u32,
    pub color: u32,
}

impl Bubble {
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        Aabb::square(self.pos, self.size).contains_point(point)
            && point.distance(self.center()) <= self.size / 2.0
    }
}

#[derive(Debug, Clone)]
pub struct BubblePop {
    tuning: BubbleTuning,
    bubbles: Vec<Bubble>,
    ids: IdAllocator,
    popped: u32,
    remaining_ms: u64,
    board: ScoreBoard,
    outcome: Option<Outcome>,
}

impl BubblePop {
    pub fn new(tuning: BubbleTuning, rng: &mut impl Rng) -> Self {
        let mut game = Self {
            bubbles: Vec::new(),
            ids: IdAllocator::default(),
            popped: 0,
            remaining_ms: tuning.duration_ms,
            board: ScoreBoard::new(tuning.combo),
            outcome: None,
            tuning,
        };
        for _ in 0..game.tuning.initial_bubbles {
            let bubble = game.spawn(0, rng);
            game.bubbles.push(bubble);
        }
        game
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn popped(&self) -> u32 {
        self.popped
    }

    pub fn combo(&self) -> u32 {
        self.board.combo()
    }

    pub fn multiplier(&self) -> f32 {
        self.board.multiplier()
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    fn spawn(&mut self, generation: u64, rng: &mut impl Rng) -> Bubble {
        let t = &self.tuning;
        let size = rng.random_range(t.min_size..=t.max_size);
        let pos = Vec2::new(
            rng.random::<f32>() * (t.field.x - size),
            rng.random::<f32>() * (t.field.y - size),
        );
        Bubble {
            id: self.ids.next(generation),
            pos,
            size,
            speed: rng.random_range(t.min_speed..=t.max_speed),
            direction: rng.random::<f32>() * TAU,
            life: t.life,
            points: (size / 10.0).floor() as u32 + 1,
            color: rng.random_range(0..BUBBLE_COLORS),
        }
    }

    fn on_field(&self, bubble: &Bubble) -> bool {
        let field = self.tuning.field;
        bubble.pos.x > -bubble.size
            && bubble.pos.x < field.x
            && bubble.pos.y > -bubble.size
            && bubble.pos.y < field.y
    }
}

impl Game for BubblePop {
    fn id(&self) -> GameId {
        GameId::BubblePop
    }

    fn advance(&self, intent: Option<&InputIntent>, ctx: &mut TickContext<'_>) -> Step<Self> {
        let mut next = self.clone();
        let mut events = Vec::new();
        next.board.decay(ctx.now_ms);

        // Later bubbles are drawn on top
        if let Some(InputIntent::Action(Action::Point(at))) = intent
            && let Some(index) = next.bubbles.iter().rposition(|b| b.contains(*at))
        {
            let bubble = next.bubbles.remove(index);
            let base = GameEvent::BubblePopped {
                id: bubble.id,
                points: bubble.points,
            };
            let earned = next.board.apply_event(&base, ctx.now_ms);
            next.popped += 1;
            events.push(GameEvent::BubblePopped {
                id: bubble.id,
                points: earned as u32,
            });
        }

        for bubble in &mut next.bubbles {
            bubble.pos += Vec2::from_angle(bubble.direction) * bubble.speed;
            bubble.life = bubble.life.saturating_sub(1);
        }
        let kept: Vec<Bubble> = next
            .bubbles
            .iter()
            .filter(|b| b.life > 0 && next.on_field(b))
            .cloned()
            .collect();
        next.bubbles = kept;

        if ctx.rng.random::<f32>() < next.tuning.spawn_chance {
            let bubble = next.spawn(ctx.tick, &mut *ctx.rng);
            next.bubbles.push(bubble);
        }

        next.remaining_ms = self.remaining_ms.saturating_sub(ctx.dt_ms);
        if next.remaining_ms == 0 {
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
        self.bubbles
            .iter()
            .map(|b| {
                EntityView::new(EntityKind::Bubble, b.pos, Vec2::splat(b.size)).with_tag(b.color)
            })
            .collect()
    }
}
