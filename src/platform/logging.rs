//! Logger initialisation for both targets

/// Install the global logger. Safe to call more than once.
#[cfg(target_arch = "wasm32")]
pub fn init(level: log::Level) {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(level).is_err() {
        log::debug!("Logger already initialised");
    }
}

/// Install the global logger. Safe to call more than once.
///
/// `RUST_LOG` still overrides the requested level.
#[cfg(not(target_arch = "wasm32"))]
pub fn init(level: log::Level) {
    let result = env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .try_init();
    if result.is_err() {
        log::debug!("Logger already initialised");
    }
}
