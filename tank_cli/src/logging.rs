// ==========================================
// Logging setup
// ==========================================
// tracing-subscriber with RUST_LOG filtering;
// logs go to stderr so stdout stays pure JSON
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise logging.
///
/// # Environment
/// - RUST_LOG: filter directives (default: info),
///   e.g. `RUST_LOG=debug` or `RUST_LOG=tank_core=trace`
///
/// `verbose` raises the default to debug when RUST_LOG is unset.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}
