//! Color Match
//!
//! The player mixes an RGB colour with three sliders. Whenever the mix lands
//! within tolerance of the target it scores, and a new target is drawn.

use glam::Vec2;
use rand::Rng;

use crate::GameId;
use crate::sim::engine::{Game, Step, TickContext};
use crate::sim::input::{Action, Channel, InputIntent};
use crate::sim::scoring::{ComboRules, ScoreBoard};
use crate::sim::state::{EntityKind, EntityView, GameEvent, Outcome};
use crate::tuning::{ColorMatchTuning, PaletteKind};

/// Swatch edge in playfield units
const SWATCH_SIZE: f32 = 100.0;

/// RGB with fractional channels (targets carry random offsets)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub fn from_u8(rgb: [u8; 3]) -> Self {
        Rgb(rgb.map(f32::from))
    }

    /// Euclidean distance in RGB space
    pub fn distance(&self, other: &Rgb) -> f32 {
        let [r, g, b] = [0, 1, 2].map(|i| self.0[i] - other.0[i]);
        (r * r + g * g + b * b).sqrt()
    }

    /// `0xRRGGBB`, channels rounded
    pub fn packed(&self) -> u32 {
        let [r, g, b] = self.0.map(|c| c.round().clamp(0.0, 255.0) as u32);
        (r << 16) | (g << 8) | b
    }

    fn set(&mut self, channel: Channel, value: u8) {
        let i = match channel {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        };
        self.0[i] = f32::from(value);
    }
}

#[derive(Debug, Clone)]
pub struct ColorMatch {
    tuning: ColorMatchTuning,
    palette: PaletteKind,
    target: Rgb,
    player: Rgb,
    tolerance: f32,
    level: u32,
    matches: u32,
    remaining_ms: u64,
    board: ScoreBoard,
    outcome: Option<Outcome>,
}

impl ColorMatch {
    pub fn new(tuning: ColorMatchTuning, palette: PaletteKind, rng: &mut impl Rng) -> Self {
        let target = random_target(palette, tuning.variation, rng);
        Self {
            palette,
            target,
            player: Rgb::from_u8(tuning.start_color),
            tolerance: tuning.tolerance,
            level: 1,
            matches: 0,
            remaining_ms: tuning.duration_ms,
            board: ScoreBoard::new(ComboRules::FLAT),
            outcome: None,
            tuning,
        }
    }

    pub fn target(&self) -> Rgb {
        self.target
    }

    pub fn player(&self) -> Rgb {
        self.player
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn matches(&self) -> u32 {
        self.matches
    }

    pub fn streak(&self) -> u32 {
        self.board.combo()
    }

    /// Score the current mix against the target
    fn check(&mut self, ctx: &mut TickContext<'_>, events: &mut Vec<GameEvent>) {
        let diff = self.player.distance(&self.target);
        if diff > self.tolerance {
            let missed = GameEvent::ColorMissed;
            self.board.apply_event(&missed, ctx.now_ms);
            events.push(missed);
            return;
        }

        let accuracy = (100.0 - diff / self.tolerance * 100.0).max(0.0);
        let matched = GameEvent::ColorMatched {
            points: (accuracy * self.level as f32).floor() as u32,
        };
        self.board.apply_event(&matched, ctx.now_ms);
        events.push(matched);

        self.matches += 1;
        self.target = random_target(self.palette, self.tuning.variation, &mut *ctx.rng);
        if self.matches % self.tuning.matches_per_level == 0 {
            self.level += 1;
            self.tolerance =
                (self.tolerance - self.tuning.tolerance_step).max(self.tuning.min_tolerance);
            log::debug!("Color match level {}, tolerance {}", self.level, self.tolerance);
            events.push(GameEvent::LevelUp { level: self.level });
        }
    }
}

/// A palette colour shifted by up to half the variation on each channel
fn random_target(palette: PaletteKind, variation: f32, rng: &mut impl Rng) -> Rgb {
    let colors = palette.colors();
    let base = colors[rng.random_range(0..colors.len())];
    Rgb(base.map(|c| (f32::from(c) + (rng.random::<f32>() - 0.5) * variation).clamp(0.0, 255.0)))
}

impl Game for ColorMatch {
    fn id(&self) -> GameId {
        GameId::ColorMatch
    }

    fn advance(&self, intent: Option<&InputIntent>, ctx: &mut TickContext<'_>) -> Step<Self> {
        let mut next = self.clone();
        let mut events = Vec::new();

        if let Some(InputIntent::Action(Action::Mix { channel, value })) = intent {
            next.player.set(*channel, *value);
            next.check(ctx, &mut events);
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
        let size = Vec2::splat(SWATCH_SIZE);
        vec![
            EntityView::new(EntityKind::Swatch, Vec2::ZERO, size).with_tag(self.target.packed()),
            EntityView::new(EntityKind::Swatch, Vec2::new(SWATCH_SIZE * 1.2, 0.0), size)
                .with_tag(self.player.packed()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn game_targeting(target: [u8; 3]) -> ColorMatch {
        let mut game = ColorMatch::new(
            ColorMatchTuning::default(),
            PaletteKind::Calm,
            &mut Pcg32::seed_from_u64(2),
        );
        game.target = Rgb::from_u8(target);
        game
    }

    fn mix(game: &ColorMatch, channel: Channel, value: u8) -> Step<ColorMatch> {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut ctx = TickContext {
            dt_ms: 100,
            now_ms: 100,
            tick: 1,
            rng: &mut rng,
        };
        game.advance(
            Some(&InputIntent::Action(Action::Mix { channel, value })),
            &mut ctx,
        )
    }

    #[test]
    fn test_target_stays_near_palette() {
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..50 {
            let target = random_target(PaletteKind::Energetic, 50.0, &mut rng);
            let near = PaletteKind::Energetic
                .colors()
                .iter()
                .any(|c| (0..3).all(|i| (target.0[i] - f32::from(c[i])).abs() <= 25.0));
            assert!(near, "{target:?}");
            assert!(target.0.iter().all(|c| (0.0..=255.0).contains(c)));
        }
    }

    #[test]
    fn test_exact_match_scores_full() {
        let game = game_targeting([200, 128, 128]);
        let step = mix(&game, Channel::Red, 200);
        assert_eq!(step.events, vec![GameEvent::ColorMatched { points: 100 }]);
        assert_eq!(step.state.score(), 100);
        assert_eq!(step.state.matches(), 1);
        assert_ne!(step.state.target(), game.target());
    }

    #[test]
    fn test_partial_match_scales_with_distance() {
        // 15 away with tolerance 30: half accuracy
        let game = game_targeting([143, 128, 128]);
        let step = mix(&game, Channel::Green, 128);
        assert_eq!(step.events, vec![GameEvent::ColorMatched { points: 50 }]);
    }

    #[test]
    fn test_outside_tolerance_misses() {
        let mut game = game_targeting([10, 10, 10]);
        game.board.apply_event(&GameEvent::ColorMatched { points: 1 }, 0);
        let step = mix(&game, Channel::Blue, 0);
        assert_eq!(step.events, vec![GameEvent::ColorMissed]);
        assert_eq!(step.state.streak(), 0);
        assert_eq!(step.state.score(), 1);
    }

    #[test]
    fn test_level_up_every_five_matches() {
        let mut game = game_targeting([128, 128, 128]);
        game.matches = 4;
        let step = mix(&game, Channel::Red, 128);
        assert_eq!(step.state.level(), 2);
        assert_eq!(step.state.tolerance(), 28.0);
        assert!(step.events.contains(&GameEvent::LevelUp { level: 2 }));

        let mut game = game_targeting([128, 128, 128]);
        game.matches = 4;
        game.tolerance = 11.0;
        let step = mix(&game, Channel::Red, 128);
        assert_eq!(step.state.tolerance(), 10.0);
    }

    #[test]
    fn test_points_scale_with_level() {
        let mut game = game_targeting([128, 128, 128]);
        game.level = 3;
        let step = mix(&game, Channel::Red, 128);
        assert_eq!(step.state.score(), 300);
    }

    #[test]
    fn test_packed_swatch_colour() {
        assert_eq!(Rgb::from_u8([255, 128, 0]).packed(), 0xFF8000);
    }
}
