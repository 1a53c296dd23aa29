//! Fixed-interval ticker
//!
//! The host owns the real timer (setInterval, requestAnimationFrame, a
//! native sleep loop) and calls [`Ticker::pump`] with the current time. The
//! ticker decides how many simulation ticks are due and runs them in order.
//! `pump` borrows the ticker mutably, so ticks of one session can never
//! overlap.

use crate::consts::MAX_CATCH_UP_TICKS;

/// What the tick callback wants the ticker to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    /// Keep running at a new cadence (speed ramps)
    Retime(u64),
    /// Cancel; nothing else fires until the next `start`
    Stop,
}

#[derive(Debug, Clone, Default)]
pub struct Ticker {
    interval_ms: u64,
    running: bool,
    /// Reference point for the next delta
    last_update_ms: u64,
    next_due_ms: u64,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Schedule ticks every `interval_ms` starting from `now_ms`.
    /// A running ticker is stopped first, so at most one schedule exists.
    pub fn start(&mut self, now_ms: u64, interval_ms: u64) {
        assert!(interval_ms > 0, "tick interval must be positive");
        if self.running {
            log::debug!("Ticker restarted while running");
            self.stop();
        }
        self.interval_ms = interval_ms;
        self.last_update_ms = now_ms;
        self.next_due_ms = now_ms + interval_ms;
        self.running = true;
    }

    /// Cancel all pending ticks
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Change cadence; the next tick is rescheduled from the last one
    pub fn set_interval(&mut self, interval_ms: u64) {
        assert!(interval_ms > 0, "tick interval must be positive");
        self.interval_ms = interval_ms;
        self.next_due_ms = self.last_update_ms + interval_ms;
    }

    /// Run every tick that is due at `now_ms`. The callback receives the
    /// milliseconds since the previous tick. Returns the number of ticks run.
    pub fn pump(&mut self, now_ms: u64, mut on_tick: impl FnMut(u64) -> TickFlow) -> u32 {
        let mut fired = 0;
        while self.running && now_ms >= self.next_due_ms {
            if fired >= MAX_CATCH_UP_TICKS {
                // Host stalled (tab in background, debugger); drop the backlog
                log::debug!(
                    "Dropping {} ms of tick backlog",
                    now_ms.saturating_sub(self.next_due_ms)
                );
                self.last_update_ms = now_ms;
                self.next_due_ms = now_ms + self.interval_ms;
                break;
            }

            let due = self.next_due_ms;
            let delta = due - self.last_update_ms;
            self.last_update_ms = due;
            self.next_due_ms = due + self.interval_ms;
            fired += 1;

            match on_tick(delta) {
                TickFlow::Continue => {}
                TickFlow::Retime(interval_ms) => self.set_interval(interval_ms),
                TickFlow::Stop => self.stop(),
            }
        }
        fired
    }
}
