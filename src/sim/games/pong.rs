//! Pong
//!
//! Player paddle on the left, AI paddle on the right. First side to the
//! winning score ends the match.

use glam::Vec2;

use crate::GameId;
use crate::sim::engine::{Game, Step, TickContext};
use crate::sim::input::{Dir, InputIntent};
use crate::sim::scoring::{ComboRules, ScoreBoard};
use crate::sim::state::{EntityKind, EntityView, GameEvent, Outcome, Side};
use crate::tuning::{Difficulty, PongTuning};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
}

#[derive(Debug, Clone)]
pub struct Pong {
    tuning: PongTuning,
    ai_speed: f32,
    /// Serve velocity with the difficulty multiplier applied
    serve: Vec2,
    ball: Ball,
    player_y: f32,
    ai_y: f32,
    player_points: u32,
    ai_points: u32,
    board: ScoreBoard,
    outcome: Option<Outcome>,
}

impl Pong {
    pub fn new(tuning: PongTuning, difficulty: Difficulty) -> Self {
        let serve = tuning.serve_velocity * difficulty.ball_speed_multiplier();
        let paddle_y = tuning.field.y / 2.0 - tuning.paddle_size.y / 2.0;
        Self {
            ai_speed: difficulty.ai_speed(),
            serve,
            ball: Ball {
                pos: tuning.field / 2.0,
                vel: serve,
            },
            player_y: paddle_y,
            ai_y: paddle_y,
            player_points: 0,
            ai_points: 0,
            board: ScoreBoard::new(ComboRules::FLAT),
            outcome: None,
            tuning,
        }
    }

    pub fn ball(&self) -> Ball {
        self.ball
    }

    /// (player, ai)
    pub fn points(&self) -> (u32, u32) {
        (self.player_points, self.ai_points)
    }

    fn clamp_paddle(&self, y: f32) -> f32 {
        crate::clamp_axis(y, self.tuning.field.y - self.tuning.paddle_size.y)
    }

    /// Ball back to the centre, heading toward `toward`
    fn serve_toward(&self, toward: Side) -> Ball {
        let dx = match toward {
            Side::Player => -self.serve.x.abs(),
            Side::Opponent => self.serve.x.abs(),
        };
        Ball {
            pos: self.tuning.field / 2.0,
            vel: Vec2::new(dx, self.serve.y),
        }
    }

    fn on_paddle(&self, ball_y: f32, paddle_y: f32) -> bool {
        ball_y >= paddle_y && ball_y <= paddle_y + self.tuning.paddle_size.y
    }
}

impl Game for Pong {
    fn id(&self) -> GameId {
        GameId::Pong
    }

    fn advance(&self, intent: Option<&InputIntent>, ctx: &mut TickContext<'_>) -> Step<Self> {
        let t = &self.tuning;
        let mut next = self.clone();
        let mut events = Vec::new();

        match intent {
            Some(InputIntent::Direction(Dir::Up)) => {
                next.player_y = self.clamp_paddle(self.player_y - t.paddle_speed);
            }
            Some(InputIntent::Direction(Dir::Down)) => {
                next.player_y = self.clamp_paddle(self.player_y + t.paddle_speed);
            }
            _ => {}
        }

        let mut ball = Ball {
            pos: self.ball.pos + self.ball.vel,
            vel: self.ball.vel,
        };

        let bottom = t.field.y - t.ball_size;
        if ball.pos.y <= 0.0 || ball.pos.y >= bottom {
            ball.vel.y = -ball.vel.y;
            ball.pos.y = crate::clamp_axis(ball.pos.y, bottom);
            events.push(GameEvent::WallHit);
        }

        if ball.pos.x <= t.paddle_size.x && self.on_paddle(ball.pos.y, next.player_y) {
            ball.vel.x = -ball.vel.x;
            ball.pos.x = t.paddle_size.x;
            events.push(GameEvent::PaddleHit { side: Side::Player });
        }

        let ai_face = t.field.x - t.paddle_size.x - t.ball_size;
        if ball.pos.x >= ai_face && self.on_paddle(ball.pos.y, self.ai_y) {
            ball.vel.x = -ball.vel.x;
            ball.pos.x = ai_face;
            events.push(GameEvent::PaddleHit {
                side: Side::Opponent,
            });
        }

        if ball.pos.x < 0.0 {
            next.ai_points += 1;
            events.push(GameEvent::PointScored {
                side: Side::Opponent,
                points: 0,
            });
            ball = self.serve_toward(Side::Player);
        } else if ball.pos.x > t.field.x {
            next.player_points += 1;
            let scored = GameEvent::PointScored {
                side: Side::Player,
                points: t.points_per_point,
            };
            next.board.apply_event(&scored, ctx.now_ms);
            events.push(scored);
            ball = self.serve_toward(Side::Opponent);
        }
        next.ball = ball;

        // AI follows where the ball was at the start of the tick
        let ball_center = self.ball.pos.y + t.ball_size / 2.0;
        let paddle_center = self.ai_y + t.paddle_size.y / 2.0;
        if ball_center < paddle_center - t.ai_dead_zone {
            next.ai_y = self.clamp_paddle(self.ai_y - self.ai_speed);
        } else if ball_center > paddle_center + t.ai_dead_zone {
            next.ai_y = self.clamp_paddle(self.ai_y + self.ai_speed);
        }

        let outcome = if next.player_points >= t.winning_score {
            Some(Outcome::Win)
        } else if next.ai_points >= t.winning_score {
            Some(Outcome::Lose)
        } else {
            None
        };
        if let Some(outcome) = outcome {
            next.outcome = Some(outcome);
            events.push(GameEvent::Finished(outcome));
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
        let t = &self.tuning;
        vec![
            EntityView::new(EntityKind::Paddle, Vec2::new(0.0, self.player_y), t.paddle_size),
            EntityView::new(
                EntityKind::Paddle,
                Vec2::new(t.field.x - t.paddle_size.x, self.ai_y),
                t.paddle_size,
            )
            .with_tag(1),
            EntityView::new(EntityKind::Ball, self.ball.pos, Vec2::splat(t.ball_size)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn tick(game: &Pong, intent: Option<InputIntent>) -> Step<Pong> {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut ctx = TickContext {
            dt_ms: 16,
            now_ms: 16,
            tick: 1,
            rng: &mut rng,
        };
        game.advance(intent.as_ref(), &mut ctx)
    }

    fn medium() -> Pong {
        Pong::new(PongTuning::default(), Difficulty::Medium)
    }

    #[test]
    fn test_ball_integrates_velocity() {
        let game = medium();
        assert_eq!(game.ball().pos, Vec2::new(400.0, 200.0));
        let step = tick(&game, None);
        assert_eq!(
            step.state.ball(),
            Ball {
                pos: Vec2::new(405.0, 203.0),
                vel: Vec2::new(5.0, 3.0)
            }
        );
        assert!(step.events.is_empty());
    }

    #[test]
    fn test_wall_flips_dy_only() {
        let mut game = medium();
        game.ball = Ball {
            pos: Vec2::new(400.0, 388.0),
            vel: Vec2::new(5.0, 3.0),
        };
        let step = tick(&game, None);
        let ball = step.state.ball();
        assert_eq!(ball.vel, Vec2::new(5.0, -3.0));
        assert_eq!(ball.pos.y, 390.0);
        assert_eq!(step.events, vec![GameEvent::WallHit]);
    }

    #[test]
    fn test_paddle_flips_dx_and_clamps() {
        let mut game = medium();
        game.ball = Ball {
            pos: Vec2::new(13.0, 200.0),
            vel: Vec2::new(-5.0, 0.0),
        };
        let step = tick(&game, None);
        let ball = step.state.ball();
        assert_eq!(ball.vel.x, 5.0);
        assert_eq!(ball.pos.x, 10.0);
        assert_eq!(
            step.events,
            vec![GameEvent::PaddleHit { side: Side::Player }]
        );
    }

    #[test]
    fn test_point_resets_to_center() {
        let mut game = medium();
        game.ball = Ball {
            pos: Vec2::new(797.0, 20.0),
            vel: Vec2::new(5.0, 3.0),
        };
        let step = tick(&game, None);
        assert_eq!(step.state.ball().pos, Vec2::new(400.0, 200.0));
        assert_eq!(step.state.points(), (1, 0));
        assert_eq!(step.state.score(), 100);
        assert!(step.events.contains(&GameEvent::PointScored {
            side: Side::Player,
            points: 100
        }));

        let mut game = medium();
        game.ball = Ball {
            pos: Vec2::new(2.0, 20.0),
            vel: Vec2::new(-5.0, 3.0),
        };
        let step = tick(&game, None);
        assert_eq!(step.state.ball().pos, Vec2::new(400.0, 200.0));
        assert!(step.state.ball().vel.x < 0.0);
        assert_eq!(step.state.points(), (0, 1));
        assert_eq!(step.state.score(), 0);
    }

    #[test]
    fn test_match_ends_at_winning_score() {
        let mut game = medium();
        game.ai_points = 4;
        game.ball = Ball {
            pos: Vec2::new(2.0, 20.0),
            vel: Vec2::new(-5.0, 3.0),
        };
        let step = tick(&game, None);
        assert_eq!(step.state.outcome(), Some(Outcome::Lose));
        assert_eq!(step.events.last(), Some(&GameEvent::Finished(Outcome::Lose)));
    }

    #[test]
    fn test_paddles_stay_on_field() {
        let mut game = medium();
        for _ in 0..100 {
            game = tick(&game, Some(InputIntent::Direction(Dir::Up))).state;
            assert!(game.player_y >= 0.0);
            assert!(game.ai_y >= 0.0 && game.ai_y <= 320.0);
        }
        assert_eq!(game.player_y, 0.0);
    }

    #[test]
    fn test_ai_dead_zone() {
        let mut game = medium();
        // Ball centre 205 vs paddle centre 200: inside the dead zone
        let step = tick(&game, None);
        assert_eq!(step.state.ai_y, game.ai_y);

        game.ball.pos.y = 300.0;
        let step = tick(&game, None);
        assert_eq!(step.state.ai_y, game.ai_y + 4.0);
    }

    #[test]
    fn test_difficulty_scales_serve() {
        let hard = Pong::new(PongTuning::default(), Difficulty::Hard);
        assert!(hard.ball().vel.abs_diff_eq(Vec2::new(6.0, 3.6), 1e-4));
    }

    fn paddle_strategy() -> impl Strategy<Value = Option<InputIntent>> {
        prop_oneof![
            Just(None),
            Just(Some(InputIntent::Direction(Dir::Up))),
            Just(Some(InputIntent::Direction(Dir::Down))),
        ]
    }

    fn difficulty_strategy() -> impl Strategy<Value = Difficulty> {
        prop_oneof![
            Just(Difficulty::Easy),
            Just(Difficulty::Medium),
            Just(Difficulty::Hard),
        ]
    }

    proptest! {
        #[test]
        fn prop_flips_follow_contacts(
            difficulty in difficulty_strategy(),
            start_y in 0.0f32..=390.0,
            intents in proptest::collection::vec(paddle_strategy(), 1..400),
        ) {
            let mut game = Pong::new(PongTuning::default(), difficulty);
            game.ball.pos.y = start_y;
            for intent in intents {
                if game.outcome().is_some() {
                    break;
                }
                let before = game.ball().vel;
                let step = tick(&game, intent);
                game = step.state;

                let wall = step.events.contains(&GameEvent::WallHit);
                let paddle = step.events.iter().any(|e| matches!(e, GameEvent::PaddleHit { .. }));
                let scored = step.events.iter().any(|e| matches!(e, GameEvent::PointScored { .. }));
                if !scored {
                    let after = game.ball().vel;
                    prop_assert_eq!(after.y == -before.y, wall);
                    prop_assert_eq!(after.x == -before.x, paddle);
                }

                let t = &game.tuning;
                prop_assert!((0.0..=t.field.y - t.ball_size).contains(&game.ball().pos.y));
                prop_assert!((0.0..=t.field.y - t.paddle_size.y).contains(&game.player_y));
                prop_assert!((0.0..=t.field.y - t.paddle_size.y).contains(&game.ai_y));
            }
        }
    }
}
