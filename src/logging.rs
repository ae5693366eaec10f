//! Tracing setup for launcher diagnostics.
//!
//! Verbosity resolves in this order: the `LOOKOUT_LOG` environment variable
//! (read once at startup) wins, otherwise the debug toggle selects `debug`
//! over the default `info`. A `--log-file` attaches a second, plain-text
//! sink; failing to attach it degrades to console-only logging instead of
//! aborting the run.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable overriding the default verbosity filter.
pub const LOG_FILTER_ENV: &str = "LOOKOUT_LOG";

/// Default filter directive for the given debug toggle.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "lookout=debug"
    } else {
        "lookout=info"
    }
}

/// Initialize the global tracing subscriber.
///
/// Returns a warning message when the log file could not be attached; the
/// subscriber still comes up with the stderr sink in that case. A second
/// call in the same process is a no-op (relevant mostly under tests).
pub fn init(debug: bool, log_file: Option<&Path>) -> Option<String> {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);

    let (file_layer, warning) = match log_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => (
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(Arc::new(file)),
                ),
                None,
            ),
            Err(e) => (
                None,
                Some(format!(
                    "failed to attach log file {}: {e}; continuing with console logging",
                    path.display()
                )),
            ),
        },
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    if result.is_err() {
        // A subscriber is already installed; keep it.
        tracing::debug!("tracing subscriber already initialized");
    }
    warning
}
