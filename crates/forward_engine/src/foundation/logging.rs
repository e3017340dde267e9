//! Logging utilities
//!
//! The engine logs through the `log` facade; applications pick the sink.
//! These helpers install `env_logger` for binaries and tests that have no
//! logger of their own.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize logging with a default filter used when `RUST_LOG` is unset.
///
/// Returns an error if a logger is already installed.
pub fn init_with_level(default_filter: &str) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init()
}

/// Install a test logger; repeated calls are ignored
#[cfg(test)]
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
