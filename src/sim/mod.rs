//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order, ids never reused)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod engine;
pub mod games;
pub mod input;
pub mod machine;
pub mod scoring;
pub mod state;

pub use clock::{TickFlow, Ticker};
pub use collision::{Aabb, clamp_to_field};
pub use engine::{AnyGame, Game, Step, TickContext};
pub use input::{Action, Channel, Dir, Gesture, InputIntent};
pub use machine::StateMachine;
pub use scoring::{ComboRules, ScoreBoard};
pub use state::{
    EntityId, EntityKind, EntityView, GameEvent, GamePhase, HitGrade, IdAllocator, Outcome, Side,
};
