//! Structured logging setup for the `strongroom` binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is
//! left to the binary (or to tests that want to see the output).

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "STRONGROOM_LOG";

/// Filter used when `STRONGROOM_LOG` is unset or invalid.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "strongroom=debug"
    } else {
        "warn"
    }
}

/// Install the global fmt subscriber, writing to stderr.
///
/// `--verbose` takes precedence over `STRONGROOM_LOG`.  Calling this
/// twice is harmless; the second call is ignored.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(default_filter(true))
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter(false)))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
