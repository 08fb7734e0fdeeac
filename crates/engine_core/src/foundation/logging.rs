//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system at `info` level
///
/// `RUST_LOG` takes precedence when set.
pub fn init() -> bool {
    init_with_level("info")
}

/// Initialize the logging system with a default filter
///
/// Returns `false` when a logger was already installed, which happens when
/// several engines or tests share one process.
pub fn init_with_level(level: &str) -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}
