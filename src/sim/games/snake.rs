//! Snake
//!
//! Grid game. The head moves one cell per tick; food grows the snake and
//! shortens the tick interval down to a floor.

use std::collections::VecDeque;

use glam::{IVec2, Vec2};
use rand::Rng;

use crate::GameId;
use crate::sim::engine::{Game, Step, TickContext};
use crate::sim::input::{Dir, InputIntent};
use crate::sim::scoring::{ComboRules, ScoreBoard, ramp_down};
use crate::sim::state::{EntityKind, EntityView, GameEvent, Outcome};
use crate::tuning::SnakeTuning;

/// Random probes before falling back to scanning free cells
const FOOD_PROBES: usize = 64;

#[derive(Debug, Clone)]
pub struct Snake {
    tuning: SnakeTuning,
    /// Head first
    body: VecDeque<IVec2>,
    dir: Dir,
    food: IVec2,
    interval_ms: u64,
    board: ScoreBoard,
    outcome: Option<Outcome>,
}

impl Snake {
    pub fn new(tuning: SnakeTuning) -> Self {
        Self {
            body: VecDeque::from([tuning.start]),
            dir: tuning.start_dir,
            food: tuning.first_food,
            interval_ms: tuning.initial_interval_ms,
            board: ScoreBoard::new(ComboRules::FLAT),
            outcome: None,
            tuning,
        }
    }

    pub fn head(&self) -> IVec2 {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn direction(&self) -> Dir {
        self.dir
    }

    pub fn food(&self) -> IVec2 {
        self.food
    }

    fn in_bounds(&self, cell: IVec2) -> bool {
        let n = self.tuning.board_size;
        (0..n).contains(&cell.x) && (0..n).contains(&cell.y)
    }

    /// Rejection sampling, then a scan once the board is crowded.
    /// `None` when no free cell is left.
    fn place_food(&self, rng: &mut impl Rng) -> Option<IVec2> {
        let n = self.tuning.board_size;
        for _ in 0..FOOD_PROBES {
            let cell = IVec2::new(rng.random_range(0..n), rng.random_range(0..n));
            if !self.body.contains(&cell) {
                return Some(cell);
            }
        }
        let free: Vec<IVec2> = (0..n)
            .flat_map(|y| (0..n).map(move |x| IVec2::new(x, y)))
            .filter(|cell| !self.body.contains(cell))
            .collect();
        if free.is_empty() {
            None
        } else {
            Some(free[rng.random_range(0..free.len())])
        }
    }

    fn finish(&mut self, outcome: Outcome, events: &mut Vec<GameEvent>) {
        self.outcome = Some(outcome);
        events.push(GameEvent::Finished(outcome));
    }
}

impl Game for Snake {
    fn id(&self) -> GameId {
        GameId::Snake
    }

    fn advance(&self, intent: Option<&InputIntent>, ctx: &mut TickContext<'_>) -> Step<Self> {
        let mut next = self.clone();
        let mut events = Vec::new();

        // 180-degree turns are ignored
        if let Some(InputIntent::Direction(dir)) = intent
            && !dir.is_reverse_of(self.dir)
        {
            next.dir = *dir;
        }

        let head = self.head() + next.dir.vector();
        if !self.in_bounds(head) {
            events.push(GameEvent::WallHit);
            next.finish(Outcome::Lose, &mut events);
            return Step::new(next, events);
        }
        if self.body.contains(&head) {
            events.push(GameEvent::SelfHit);
            next.finish(Outcome::Lose, &mut events);
            return Step::new(next, events);
        }

        next.body.push_front(head);
        if head != self.food {
            next.body.pop_back();
            return Step::new(next, events);
        }

        let eaten = GameEvent::FoodEaten {
            points: self.tuning.points_per_food,
        };
        next.board.apply_event(&eaten, ctx.now_ms);
        events.push(eaten);

        let interval = ramp_down(
            self.interval_ms,
            self.tuning.interval_step_ms,
            self.tuning.min_interval_ms,
        );
        if interval != self.interval_ms {
            next.interval_ms = interval;
            log::debug!("Snake speeds up to {interval} ms");
            events.push(GameEvent::SpeedUp {
                interval_ms: interval,
            });
        }

        match next.place_food(&mut *ctx.rng) {
            Some(food) => next.food = food,
            None => next.finish(Outcome::Win, &mut events),
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
        self.interval_ms
    }

    fn snapshot(&self) -> Vec<EntityView> {
        let cell = Vec2::ONE;
        let mut views: Vec<EntityView> = self
            .body
            .iter()
            .enumerate()
            .map(|(i, seg)| {
                let kind = if i == 0 {
                    EntityKind::SnakeHead
                } else {
                    EntityKind::SnakeBody
                };
                EntityView::new(kind, seg.as_vec2(), cell)
            })
            .collect();
        views.push(EntityView::new(EntityKind::Food, self.food.as_vec2(), cell));
        views
    }
}
