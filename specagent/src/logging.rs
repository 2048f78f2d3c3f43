//! Global `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::LogLevel;

/// Installs a fmt subscriber filtered at `level`. `RUST_LOG`, when set, wins
/// over `level`.
///
/// Returns `false` when logging is silent or a global subscriber already
/// exists.
pub fn init_logging(level: LogLevel) -> bool {
    let Some(directive) = level.directive() else {
        return false;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
