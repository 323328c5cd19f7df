//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Environment variable enabling debug logging.
pub const CAGE_DEBUG_ENV: &str = "CAGE_DEBUG";

/// Whether debug logging was requested by flag or environment.
pub fn debug_requested(force_debug: bool) -> bool {
    force_debug || std::env::var_os(CAGE_DEBUG_ENV).is_some()
}

/// Initialize logging to stderr; stdout stays clean for dry-run output.
pub fn init_debug_logging(force_debug: bool) {
    let debug_enabled = debug_requested(force_debug);

    let filter = if debug_enabled {
        EnvFilter::new("cage=debug,warn")
    } else {
        EnvFilter::new("cage=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_level(true)
        .with_ansi(false)
        .try_init()
        .ok();
}
