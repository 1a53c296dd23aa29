//! Arcade Core entry point
//!
//! Native builds run one game headless with a simple autoplayer, which is
//! handy for smoke runs and balance checks. The web build only sets up
//! logging; the page drives `GameSession` itself.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::thread;
    use std::time::Duration;

    use anyhow::{Context, Result, bail};
    use clap::Parser;
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use arcade_core::audio::SoundLog;
    use arcade_core::consts::DEFAULT_TICK_MS;
    use arcade_core::highscores::format_score;
    use arcade_core::platform::{self, MemoryStore, SystemTime};
    use arcade_core::sim::input::{Action, Channel, Dir, InputIntent};
    use arcade_core::sim::{EntityKind, EntityView, GamePhase};
    use arcade_core::{GameId, GameSession, Tuning};

    fn parse_game(s: &str) -> Result<GameId, String> {
        GameId::from_str(s).ok_or_else(|| {
            let names: Vec<&str> = GameId::ALL.iter().map(GameId::as_str).collect();
            format!("unknown game `{s}` (expected one of: {})", names.join(", "))
        })
    }

    /// Headless arcade runner.
    #[derive(Debug, Parser)]
    #[command(
        name = "arcade-core",
        version,
        about = "Run one arcade game headless with an autoplayer and print the result."
    )]
    pub struct Args {
        /// Game to run: snake, tetris, pong, space-shooter, bubble-pop, rhythm-tap, color-match.
        #[arg(short, long, default_value = "snake", value_parser = parse_game)]
        pub game: GameId,

        /// Stop after this many ticks even if the run has not ended.
        #[arg(short, long, default_value = "5000", value_name = "N")]
        pub ticks: u64,

        /// RNG seed; equal seeds replay the same run.
        #[arg(short, long, default_value = "1")]
        pub seed: u64,

        /// JSON file with tuning overrides (missing fields keep defaults).
        #[arg(long, value_name = "FILE")]
        pub tuning: Option<PathBuf>,

        /// Pace ticks against the wall clock instead of running flat out.
        #[arg(long)]
        pub realtime: bool,

        /// Log level: error, warn, info, debug, trace.
        #[arg(long, default_value = "info")]
        pub log_level: log::Level,
    }

    pub fn run() -> Result<()> {
        let args = Args::parse();
        platform::logging::init(args.log_level);

        let tuning = match &args.tuning {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Tuning::from_json(&json)?
            }
            None => Tuning::default(),
        };

        let mut session =
            GameSession::new(MemoryStore::new(), SystemTime, SoundLog::default()).with_tuning(tuning);
        let mut now_ms = if args.realtime { platform::now_ms() } else { 0 };
        session.start(args.game, args.seed, now_ms)?;

        let mut bot = Pcg32::seed_from_u64(args.seed ^ 0x5eed);
        while session.phase() == GamePhase::Playing && session.ticks() < args.ticks {
            if let Some(intent) = autoplay(args.game, &session.snapshot(), &mut bot) {
                session.push_intent(intent);
            }
            if args.realtime {
                thread::sleep(Duration::from_millis(DEFAULT_TICK_MS));
                now_ms = platform::now_ms();
            } else {
                now_ms += DEFAULT_TICK_MS;
            }
            session.pump(now_ms);
        }

        let Some(result) = session.last_result() else {
            if session.phase() != GamePhase::Playing {
                bail!("run stopped in {:?} without a result", session.phase());
            }
            println!(
                "{}: still running after {} ticks, score {}",
                args.game,
                session.ticks(),
                format_score(session.score())
            );
            return Ok(());
        };

        println!(
            "{}: {:?} with {} points after {} ticks ({} sounds)",
            result.game,
            result.outcome,
            format_score(result.score),
            result.ticks,
            session.audio().played.len()
        );
        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }

    fn find(views: &[EntityView], kind: EntityKind) -> Option<&EntityView> {
        views.iter().find(|v| v.kind == kind)
    }

    fn center(view: &EntityView) -> Vec2 {
        view.pos + view.size / 2.0
    }

    /// Naive per-game player, good enough to exercise every rule
    fn autoplay(game: GameId, views: &[EntityView], rng: &mut Pcg32) -> Option<InputIntent> {
        match game {
            GameId::Snake => {
                let head = find(views, EntityKind::SnakeHead)?.pos;
                let food = find(views, EntityKind::Food)?.pos;
                let dir = if food.x < head.x {
                    Dir::Left
                } else if food.x > head.x {
                    Dir::Right
                } else if food.y < head.y {
                    Dir::Up
                } else {
                    Dir::Down
                };
                Some(InputIntent::Direction(dir))
            }
            GameId::Pong => {
                let ball = center(find(views, EntityKind::Ball)?);
                let paddle = views
                    .iter()
                    .find(|v| v.kind == EntityKind::Paddle && v.tag == 0)?;
                let target = center(paddle).y;
                if ball.y < target - 10.0 {
                    Some(InputIntent::Direction(Dir::Up))
                } else if ball.y > target + 10.0 {
                    Some(InputIntent::Direction(Dir::Down))
                } else {
                    None
                }
            }
            GameId::SpaceShooter => {
                if rng.random_bool(0.3) {
                    Some(InputIntent::Action(Action::Fire))
                } else {
                    let ship = find(views, EntityKind::Ship)?;
                    let enemy = find(views, EntityKind::Enemy)?;
                    let dir = if center(enemy).x < center(ship).x {
                        Dir::Left
                    } else {
                        Dir::Right
                    };
                    Some(InputIntent::Direction(dir))
                }
            }
            GameId::Tetris => {
                let intent = match rng.random_range(0..10) {
                    0..=2 => InputIntent::Direction(Dir::Left),
                    3..=5 => InputIntent::Direction(Dir::Right),
                    6 => InputIntent::Action(Action::Rotate),
                    7 => InputIntent::Action(Action::HardDrop),
                    _ => return None,
                };
                Some(intent)
            }
            GameId::BubblePop => {
                let bubble = find(views, EntityKind::Bubble)?;
                rng.random_bool(0.5)
                    .then(|| InputIntent::Action(Action::Point(center(bubble))))
            }
            GameId::RhythmTap => views
                .iter()
                .find(|v| v.kind == EntityKind::Beat && (285.0..315.0).contains(&v.pos.y))
                .map(|beat| InputIntent::Action(Action::Zone(beat.tag as u8))),
            GameId::ColorMatch => {
                let target = find(views, EntityKind::Swatch)?.tag;
                let channel = match rng.random_range(0..3) {
                    0 => Channel::Red,
                    1 => Channel::Green,
                    _ => Channel::Blue,
                };
                let shift = match channel {
                    Channel::Red => 16,
                    Channel::Green => 8,
                    Channel::Blue => 0,
                };
                let value = ((target >> shift) & 0xFF) as u8;
                Some(InputIntent::Action(Action::Mix { channel, value }))
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_main() {
    use arcade_core::highscores::HighScoreStore;
    use arcade_core::platform::{self, LocalStorage, SystemTime};

    platform::logging::init(log::Level::Info);
    match LocalStorage::open() {
        Ok(storage) => {
            let scores = HighScoreStore::new(storage, SystemTime);
            for (game, best) in scores.all_high_scores() {
                log::info!("{game}: best {best}");
            }
        }
        Err(e) => log::warn!("High scores unavailable: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
