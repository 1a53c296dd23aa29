//! Space Shooter
//!
//! Enemies fall from the top, the ship fires straight up. Each tick first
//! resolves bullet/enemy hits on the positions the player saw, then moves
//! everything, then maybe spawns an enemy.

use glam::Vec2;
use rand::Rng;

use crate::GameId;
use crate::sim::collision::{Aabb, clamp_to_field};
use crate::sim::engine::{Game, Step, TickContext};
use crate::sim::input::{Action, Dir, InputIntent};
use crate::sim::scoring::{ComboRules, ScoreBoard};
use crate::sim::state::{EntityId, EntityKind, EntityView, GameEvent, IdAllocator, Outcome};
use crate::tuning::ShooterTuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub id: EntityId,
    pub pos: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    pub id: EntityId,
    pub pos: Vec2,
    pub speed: f32,
}

#[derive(Debug, Clone)]
pub struct Shooter {
    tuning: ShooterTuning,
    ship: Vec2,
    bullets: Vec<Bullet>,
    enemies: Vec<Enemy>,
    lives: u8,
    kills: u32,
    wave: u32,
    ids: IdAllocator,
    board: ScoreBoard,
    outcome: Option<Outcome>,
}

impl Shooter {
    pub fn new(tuning: ShooterTuning) -> Self {
        let size = Vec2::splat(tuning.player_size);
        let spawn = Vec2::new(
            tuning.field.x / 2.0 - tuning.player_size / 2.0,
            tuning.field.y - tuning.player_size * 1.5,
        );
        Self {
            ship: clamp_to_field(spawn, size, tuning.field),
            bullets: Vec::new(),
            enemies: Vec::new(),
            lives: tuning.lives,
            kills: 0,
            wave: 1,
            ids: IdAllocator::default(),
            board: ScoreBoard::new(ComboRules::FLAT),
            outcome: None,
            tuning,
        }
    }

    pub fn ship(&self) -> Vec2 {
        self.ship
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    fn ship_box(&self) -> Aabb {
        Aabb::square(self.ship, self.tuning.player_size)
    }

    fn bullet_box(&self, bullet: &Bullet) -> Aabb {
        Aabb::square(bullet.pos, self.tuning.bullet_size)
    }

    fn enemy_box(&self, enemy: &Enemy) -> Aabb {
        Aabb::square(enemy.pos, self.tuning.enemy_size)
    }

    /// Each bullet takes the first enemy it overlaps; an enemy absorbs at
    /// most one bullet. Survivors keep their order.
    fn resolve_hits(&mut self, now_ms: u64, events: &mut Vec<GameEvent>) {
        let mut hit_enemies = vec![false; self.enemies.len()];
        let mut spent = vec![false; self.bullets.len()];

        for (b, bullet) in self.bullets.iter().enumerate() {
            let bullet_box = self.bullet_box(bullet);
            let target = self
                .enemies
                .iter()
                .enumerate()
                .find(|(e, enemy)| !hit_enemies[*e] && bullet_box.overlaps(&self.enemy_box(enemy)));
            if let Some((e, enemy)) = target {
                hit_enemies[e] = true;
                spent[b] = true;
                events.push(GameEvent::EnemyKilled {
                    id: enemy.id,
                    points: self.tuning.points_per_enemy,
                });
            }
        }

        let kills = hit_enemies.iter().filter(|h| **h).count() as u32;
        if kills == 0 {
            return;
        }
        for event in events.iter() {
            self.board.apply_event(event, now_ms);
        }

        let mut spent = spent.into_iter();
        self.bullets.retain(|_| !spent.next().unwrap_or(false));
        let mut hit = hit_enemies.into_iter();
        self.enemies.retain(|_| !hit.next().unwrap_or(false));

        self.kills += kills;
        let wave = 1 + self.kills / self.tuning.kills_per_wave;
        if wave > self.wave {
            self.wave = wave;
            log::debug!("Shooter wave {wave}");
            events.push(GameEvent::WaveAdvanced { wave });
        }
    }

    fn spawn_chance(&self) -> f32 {
        self.tuning.spawn_chance + self.tuning.spawn_chance_per_wave * self.wave as f32
    }
}

impl Game for Shooter {
    fn id(&self) -> GameId {
        GameId::SpaceShooter
    }

    fn advance(&self, intent: Option<&InputIntent>, ctx: &mut TickContext<'_>) -> Step<Self> {
        let t = &self.tuning;
        let mut next = self.clone();
        let mut events = Vec::new();

        match intent {
            Some(InputIntent::Direction(dir @ (Dir::Left | Dir::Right))) => {
                let dx = if *dir == Dir::Left {
                    -t.player_speed
                } else {
                    t.player_speed
                };
                next.ship = clamp_to_field(
                    self.ship + Vec2::new(dx, 0.0),
                    Vec2::splat(t.player_size),
                    t.field,
                );
            }
            Some(InputIntent::Action(Action::Fire)) => {
                let id = next.ids.next(ctx.tick);
                next.bullets.push(Bullet {
                    id,
                    pos: Vec2::new(self.ship.x + t.player_size / 2.0, self.ship.y),
                });
                events.push(GameEvent::ShotFired { id });
            }
            _ => {}
        }

        let mut hits = Vec::new();
        next.resolve_hits(ctx.now_ms, &mut hits);
        events.append(&mut hits);

        next.bullets.retain_mut(|bullet| {
            bullet.pos.y -= t.bullet_speed;
            if bullet.pos.y > 0.0 {
                true
            } else {
                events.push(GameEvent::OutOfBounds { id: bullet.id });
                false
            }
        });

        let ship_box = next.ship_box();
        let enemy_size = t.enemy_size;
        let mut lives = next.lives;
        next.enemies.retain_mut(|enemy| {
            enemy.pos.y += enemy.speed;
            if Aabb::square(enemy.pos, enemy_size).overlaps(&ship_box) {
                lives = lives.saturating_sub(1);
                events.push(GameEvent::PlayerHit { lives_left: lives });
                false
            } else if enemy.pos.y >= t.field.y {
                events.push(GameEvent::OutOfBounds { id: enemy.id });
                false
            } else {
                true
            }
        });
        next.lives = lives;

        if next.lives == 0 {
            next.outcome = Some(Outcome::Lose);
            events.push(GameEvent::Finished(Outcome::Lose));
            return Step::new(next, events);
        }

        if ctx.rng.random::<f32>() < next.spawn_chance() {
            let id = next.ids.next(ctx.tick);
            let x = ctx.rng.random::<f32>() * (t.field.x - t.enemy_size);
            next.enemies.push(Enemy {
                id,
                pos: Vec2::new(x, 0.0),
                speed: t.enemy_speed + t.enemy_speed_per_wave * next.wave as f32,
            });
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
        let mut views = Vec::with_capacity(1 + self.bullets.len() + self.enemies.len());
        views.push(EntityView::new(
            EntityKind::Ship,
            self.ship,
            Vec2::splat(t.player_size),
        ));
        views.extend(
            self.bullets
                .iter()
                .map(|b| EntityView::new(EntityKind::Bullet, b.pos, Vec2::splat(t.bullet_size))),
        );
        views.extend(
            self.enemies
                .iter()
                .map(|e| EntityView::new(EntityKind::Enemy, e.pos, Vec2::splat(t.enemy_size))),
        );
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn quiet() -> ShooterTuning {
        // No random spawns so tests only see the entities they place
        ShooterTuning {
            spawn_chance: 0.0,
            spawn_chance_per_wave: 0.0,
            ..Default::default()
        }
    }

    fn tick(game: &Shooter, intent: Option<InputIntent>, n: u64) -> Step<Shooter> {
        let mut rng = Pcg32::seed_from_u64(n);
        let mut ctx = TickContext {
            dt_ms: 16,
            now_ms: n * 16,
            tick: n,
            rng: &mut rng,
        };
        game.advance(intent.as_ref(), &mut ctx)
    }

    fn enemy(seq: u32, x: f32, y: f32) -> Enemy {
        Enemy {
            id: EntityId::new(0, seq),
            pos: Vec2::new(x, y),
            speed: 2.0,
        }
    }

    #[test]
    fn test_bullet_hits_enemy() {
        let mut game = Shooter::new(quiet());
        let bullet = Bullet {
            id: EntityId::new(0, 100),
            pos: Vec2::new(100.0, 100.0),
        };
        game.bullets.push(bullet);
        game.enemies.push(enemy(1, 98.0, 98.0));

        let step = tick(&game, None, 1);
        assert!(step.state.bullets().is_empty());
        assert!(step.state.enemies().is_empty());
        assert_eq!(step.state.score(), 100);
        assert_eq!(
            step.events,
            vec![GameEvent::EnemyKilled {
                id: EntityId::new(0, 1),
                points: 100
            }]
        );
    }

    #[test]
    fn test_enemy_absorbs_one_bullet() {
        let mut game = Shooter::new(quiet());
        for seq in 0..2 {
            game.bullets.push(Bullet {
                id: EntityId::new(0, 10 + seq),
                pos: Vec2::new(110.0, 110.0),
            });
        }
        game.enemies.push(enemy(1, 100.0, 100.0));
        game.enemies.push(enemy(2, 105.0, 105.0));
        game.enemies.push(enemy(3, 400.0, 100.0));

        let step = tick(&game, None, 1);
        // First bullet takes enemy 1, second takes enemy 2
        assert!(step.state.bullets().is_empty());
        assert_eq!(step.state.enemies().len(), 1);
        assert_eq!(step.state.enemies()[0].id, EntityId::new(0, 3));
        assert_eq!(step.state.score(), 200);
    }

    #[test]
    fn test_fire_and_move() {
        let game = Shooter::new(quiet());
        assert_eq!(game.ship(), Vec2::new(380.0, 540.0));

        let step = tick(&game, Some(InputIntent::Action(Action::Fire)), 1);
        let bullets = step.state.bullets();
        assert_eq!(bullets.len(), 1);
        // Spawned at the nose, then moved up one step
        assert_eq!(bullets[0].pos, Vec2::new(400.0, 530.0));
        assert!(matches!(step.events[0], GameEvent::ShotFired { .. }));

        let mut game = step.state;
        for n in 2..200 {
            game = tick(&game, Some(InputIntent::Direction(Dir::Left)), n).state;
        }
        assert_eq!(game.ship().x, 0.0);
        // Bullet flew off the top
        assert!(game.bullets().is_empty());
    }

    #[test]
    fn test_ramming_costs_lives() {
        let mut game = Shooter::new(quiet());
        game.lives = 2;
        game.enemies.push(enemy(1, 390.0, 515.0));
        let step = tick(&game, None, 1);
        assert_eq!(step.state.lives(), 1);
        assert!(step.state.enemies().is_empty());
        assert_eq!(step.events, vec![GameEvent::PlayerHit { lives_left: 1 }]);

        let mut game = step.state;
        game.enemies.push(enemy(2, 390.0, 515.0));
        let step = tick(&game, None, 2);
        assert_eq!(step.state.outcome(), Some(Outcome::Lose));
        assert_eq!(step.events.last(), Some(&GameEvent::Finished(Outcome::Lose)));
    }

    #[test]
    fn test_enemy_leaves_bottom() {
        let mut game = Shooter::new(quiet());
        game.enemies.push(enemy(1, 10.0, 599.0));
        let step = tick(&game, None, 1);
        assert!(step.state.enemies().is_empty());
        assert_eq!(
            step.events,
            vec![GameEvent::OutOfBounds {
                id: EntityId::new(0, 1)
            }]
        );
        assert_eq!(step.state.lives(), 3);
    }

    #[test]
    fn test_wave_advances_every_ten_kills() {
        let mut game = Shooter::new(quiet());
        game.kills = 9;
        game.bullets.push(Bullet {
            id: EntityId::new(0, 50),
            pos: Vec2::new(100.0, 100.0),
        });
        game.enemies.push(enemy(1, 98.0, 98.0));
        let step = tick(&game, None, 1);
        assert_eq!(step.state.wave(), 2);
        assert!(step.events.contains(&GameEvent::WaveAdvanced { wave: 2 }));
    }

    #[test]
    fn test_spawned_enemies_stay_inside_horizontally() {
        let mut game = Shooter::new(ShooterTuning {
            spawn_chance: 1.0,
            ..Default::default()
        });
        for n in 1..100 {
            game = tick(&game, None, n).state;
        }
        assert!(!game.enemies().is_empty());
        for enemy in game.enemies() {
            assert!(enemy.pos.x >= 0.0 && enemy.pos.x <= 770.0);
        }
        let ids: std::collections::BTreeSet<_> = game.enemies().iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), game.enemies().len());
    }

    fn control_strategy() -> impl Strategy<Value = Option<InputIntent>> {
        prop_oneof![
            Just(None),
            Just(Some(InputIntent::Direction(Dir::Left))),
            Just(Some(InputIntent::Direction(Dir::Right))),
            Just(Some(InputIntent::Action(Action::Fire))),
        ]
    }

    proptest! {
        #[test]
        fn prop_bodies_stay_on_field(
            seed in any::<u64>(),
            intents in proptest::collection::vec(control_strategy(), 1..400),
        ) {
            let tuning = ShooterTuning::default();
            let mut game = Shooter::new(tuning.clone());
            let mut rng = Pcg32::seed_from_u64(seed);
            for (i, intent) in intents.iter().enumerate() {
                if game.outcome().is_some() {
                    break;
                }
                let tick = i as u64 + 1;
                let mut ctx = TickContext {
                    dt_ms: 16,
                    now_ms: tick * 16,
                    tick,
                    rng: &mut rng,
                };
                game = game.advance(intent.as_ref(), &mut ctx).state;

                let ship = game.ship();
                prop_assert!((0.0..=tuning.field.x - tuning.player_size).contains(&ship.x));
                prop_assert!((0.0..=tuning.field.y - tuning.player_size).contains(&ship.y));
                for enemy in game.enemies() {
                    prop_assert!((0.0..=tuning.field.x - tuning.enemy_size).contains(&enemy.pos.x));
                    prop_assert!(enemy.pos.y < tuning.field.y);
                }
                for bullet in game.bullets() {
                    prop_assert!(bullet.pos.y > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_oversized_ship_spawns_on_field() {
        let tuning = ShooterTuning {
            player_size: 500.0,
            ..quiet()
        };
        let game = Shooter::new(tuning);
        assert_eq!(game.ship(), Vec2::new(150.0, 0.0));
    }
}
