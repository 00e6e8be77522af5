//! Tracing setup for diagnostic logging.
//!
//! Logs go to stderr so stdout carries only command output. `APPCTL_LOG`
//! takes an `EnvFilter` directive and overrides the `-v` count.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a filter directive, e.g. `appctl_cli=debug`.
pub const LOG_ENV: &str = "APPCTL_LOG";

/// Maps a `-v` count to a level name (0=error, 1=warn, 2=info, 3=debug, 4+=trace).
#[must_use]
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}

/// Initialize the global subscriber. Later calls are ignored.
pub fn init_logging(verbosity: u8) {
    let level = level_for(verbosity);
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("appctl={level},appctl_cli={level}")));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= 3)
                .with_file(verbosity >= 4)
                .with_line_number(verbosity >= 4),
        )
        .try_init();
}
