//! Tetris
//!
//! The board is a flat row-major grid, `(x, y)` with y growing downward.
//! The game ticks at the default loop rate and keeps its own gravity timer,
//! so level speed-ups never have to retime the session.

use glam::{IVec2, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::GameId;
use crate::sim::engine::{Game, Step, TickContext};
use crate::sim::input::{Action, Dir, InputIntent};
use crate::sim::scoring::{ComboRules, ScoreBoard, ramp_down};
use crate::sim::state::{EntityKind, EntityView, GameEvent, Outcome};
use crate::tuning::TetrisTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Spawn orientation, one string per row
    fn rows(&self) -> &'static [&'static str] {
        match self {
            PieceKind::I => &["####"],
            PieceKind::O => &["##", "##"],
            PieceKind::T => &[".#.", "###"],
            PieceKind::S => &[".##", "##."],
            PieceKind::Z => &["##.", ".##"],
            PieceKind::J => &["#..", "###"],
            PieceKind::L => &["..#", "###"],
        }
    }

    pub fn index(&self) -> u32 {
        *self as u32
    }

    fn random(rng: &mut impl Rng) -> Self {
        PieceKind::ALL[rng.random_range(0..PieceKind::ALL.len())]
    }
}

/// Falling piece
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub kind: PieceKind,
    /// Offsets inside the bounding box
    pub blocks: Vec<IVec2>,
    /// Bounding box (width, height)
    pub size: IVec2,
    /// Board position of the box's top-left cell
    pub pos: IVec2,
}

impl Piece {
    fn spawn(kind: PieceKind, board_width: i32) -> Self {
        let rows = kind.rows();
        let blocks = rows
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.chars()
                    .enumerate()
                    .filter(|(_, c)| *c == '#')
                    .map(move |(x, _)| IVec2::new(x as i32, y as i32))
            })
            .collect();
        Self {
            kind,
            blocks,
            size: IVec2::new(rows[0].len() as i32, rows.len() as i32),
            pos: IVec2::new(board_width / 2 - 1, 0),
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.blocks.iter().map(move |b| self.pos + *b)
    }

    fn shifted(&self, by: IVec2) -> Self {
        Self {
            pos: self.pos + by,
            ..self.clone()
        }
    }

    /// Clockwise quarter turn inside the bounding box
    fn rotated(&self) -> Self {
        let h = self.size.y;
        Self {
            blocks: self
                .blocks
                .iter()
                .map(|b| IVec2::new(h - 1 - b.y, b.x))
                .collect(),
            size: IVec2::new(self.size.y, self.size.x),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tetris {
    tuning: TetrisTuning,
    /// Row-major, `y * width + x`
    cells: Vec<Option<PieceKind>>,
    piece: Piece,
    next: PieceKind,
    drop_timer_ms: u64,
    drop_interval_ms: u64,
    level: u32,
    lines: u32,
    board: ScoreBoard,
    outcome: Option<Outcome>,
}

impl Tetris {
    pub fn new(tuning: TetrisTuning, rng: &mut impl Rng) -> Self {
        let piece = Piece::spawn(PieceKind::random(rng), tuning.width);
        Self {
            cells: vec![None; (tuning.width * tuning.height) as usize],
            piece,
            next: PieceKind::random(rng),
            drop_timer_ms: 0,
            drop_interval_ms: tuning.initial_drop_ms,
            level: 1,
            lines: 0,
            board: ScoreBoard::new(ComboRules::FLAT),
            outcome: None,
            tuning,
        }
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    /// Preview of the piece after the current one
    pub fn next_kind(&self) -> PieceKind {
        self.next
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn drop_interval_ms(&self) -> u64 {
        self.drop_interval_ms
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<PieceKind> {
        self.index(IVec2::new(x, y)).and_then(|i| self.cells[i])
    }

    fn index(&self, at: IVec2) -> Option<usize> {
        let (w, h) = (self.tuning.width, self.tuning.height);
        if (0..w).contains(&at.x) && (0..h).contains(&at.y) {
            Some((at.y * w + at.x) as usize)
        } else {
            None
        }
    }

    /// Inside the walls and not overlapping the stack
    fn fits(&self, piece: &Piece) -> bool {
        piece
            .cells()
            .all(|c| self.index(c).is_some_and(|i| self.cells[i].is_none()))
    }

    fn try_replace(&mut self, candidate: Piece) -> bool {
        if self.fits(&candidate) {
            self.piece = candidate;
            true
        } else {
            false
        }
    }

    /// Remove full rows, shifting everything above down. Returns the count.
    fn clear_full_rows(&mut self) -> u32 {
        let w = self.tuning.width as usize;
        let h = self.tuning.height as usize;
        let mut write = h;
        let mut cleared = 0;
        for read in (0..h).rev() {
            let row = &self.cells[read * w..(read + 1) * w];
            if row.iter().all(Option::is_some) {
                cleared += 1;
                continue;
            }
            write -= 1;
            if write != read {
                self.cells.copy_within(read * w..(read + 1) * w, write * w);
            }
        }
        for cell in &mut self.cells[..write * w] {
            *cell = None;
        }
        cleared
    }

    /// Merge the piece into the stack, clear rows, spawn the next piece
    fn lock(&mut self, ctx: &mut TickContext<'_>, events: &mut Vec<GameEvent>) {
        let kind = self.piece.kind;
        let cells: Vec<IVec2> = self.piece.cells().collect();
        for c in cells {
            if let Some(i) = self.index(c) {
                self.cells[i] = Some(kind);
            }
        }
        events.push(GameEvent::PieceLocked);

        let cleared = self.clear_full_rows();
        if cleared > 0 {
            let event = GameEvent::LinesClear {
                lines: cleared,
                points: cleared * self.tuning.points_per_line * self.level,
            };
            self.board.apply_event(&event, ctx.now_ms);
            events.push(event);

            self.lines += cleared;
            let level = 1 + self.lines / self.tuning.lines_per_level;
            if level > self.level {
                self.level = level;
                self.drop_interval_ms = ramp_down(
                    self.tuning.initial_drop_ms,
                    (level as u64 - 1) * self.tuning.drop_step_ms,
                    self.tuning.min_drop_ms,
                );
                log::debug!("Tetris level {level}, drop every {} ms", self.drop_interval_ms);
                events.push(GameEvent::LevelUp { level });
            }
        }

        let spawned = Piece::spawn(self.next, self.tuning.width);
        self.next = PieceKind::random(&mut *ctx.rng);
        self.drop_timer_ms = 0;
        let blocked = !self.fits(&spawned);
        self.piece = spawned;
        if blocked {
            log::debug!("Tetris spawn blocked after {} lines", self.lines);
            self.outcome = Some(Outcome::Lose);
            events.push(GameEvent::Finished(Outcome::Lose));
        }
    }

    /// Move down one row, locking if blocked
    fn fall(&mut self, ctx: &mut TickContext<'_>, events: &mut Vec<GameEvent>) {
        let below = self.piece.shifted(IVec2::Y);
        if !self.try_replace(below) {
            self.lock(ctx, events);
        }
    }
}

impl Game for Tetris {
    fn id(&self) -> GameId {
        GameId::Tetris
    }

    fn advance(&self, intent: Option<&InputIntent>, ctx: &mut TickContext<'_>) -> Step<Self> {
        let mut next = self.clone();
        let mut events = Vec::new();

        match intent {
            Some(InputIntent::Direction(Dir::Left)) => {
                next.try_replace(self.piece.shifted(IVec2::NEG_X));
            }
            Some(InputIntent::Direction(Dir::Right)) => {
                next.try_replace(self.piece.shifted(IVec2::X));
            }
            Some(InputIntent::Direction(Dir::Down)) => {
                next.fall(ctx, &mut events);
                next.drop_timer_ms = 0;
            }
            Some(InputIntent::Direction(Dir::Up)) | Some(InputIntent::Action(Action::Rotate)) => {
                next.try_replace(self.piece.rotated());
            }
            Some(InputIntent::Action(Action::HardDrop)) => {
                while next.try_replace(next.piece.shifted(IVec2::Y)) {}
                next.lock(ctx, &mut events);
            }
            _ => {}
        }

        if next.outcome.is_none() {
            next.drop_timer_ms += ctx.dt_ms;
            if next.drop_timer_ms >= next.drop_interval_ms {
                next.drop_timer_ms = 0;
                next.fall(ctx, &mut events);
            }
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
        let w = self.tuning.width;
        let mut views: Vec<EntityView> = self
            .cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| {
                cell.map(|kind| {
                    let at = Vec2::new((i as i32 % w) as f32, (i as i32 / w) as f32);
                    EntityView::new(EntityKind::StackBlock, at, Vec2::ONE).with_tag(kind.index())
                })
            })
            .collect();
        views.extend(self.piece.cells().map(|c| {
            EntityView::new(EntityKind::FallingBlock, c.as_vec2(), Vec2::ONE)
                .with_tag(self.piece.kind.index())
        }));
        views
    }
}
