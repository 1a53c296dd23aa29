//! Platform abstraction layer
//!
//! Everything the core needs from its host goes through here so the
//! simulation stays testable without a browser:
//! - Key-value storage (LocalStorage on web, in-memory elsewhere)
//! - Wall-clock time for timestamps and the host pump
//! - Logger setup

pub mod logging;
pub mod storage;
pub mod time;

pub use storage::{KeyValueStore, MemoryStore};
pub use time::{ManualTime, SystemTime, TimeSource, now_ms};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
