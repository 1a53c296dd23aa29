//! Wall-clock collaborators
//!
//! Simulation time never comes from here; ticks carry their own deltas.
//! This is only for history timestamps and for hosts driving the ticker.

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// Source of "now" for score history entries
pub trait TimeSource {
    fn now_utc(&self) -> DateTime<Utc>;
}

impl<T: TimeSource + ?Sized> TimeSource for std::rc::Rc<T> {
    fn now_utc(&self) -> DateTime<Utc> {
        (**self).now_utc()
    }
}

/// Real clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for tests and replays
#[derive(Debug, Clone)]
pub struct ManualTime {
    now: Cell<DateTime<Utc>>,
}

impl ManualTime {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualTime {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::default())
    }
}

impl TimeSource for ManualTime {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Milliseconds since the Unix epoch, for feeding `Ticker::pump`
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Milliseconds since the Unix epoch, for feeding `Ticker::pump`
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
