//! Tracing subscriber setup.
//!
//! Console output always goes to stderr. When a log directory is configured a
//! second, daily-rolling file layer is added; the returned [`LoggingGuard`]
//! must be kept alive for buffered file output to be flushed.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingSettings;

/// File name prefix for rolling log files.
pub const LOG_FILE_PREFIX: &str = "karl.log";

/// Keeps the file writer alive; drop it at shutdown.
#[derive(Debug)]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Builds the filter: `RUST_LOG` wins, then `default_level`.
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(default_level))
}

/// Parses `level`, falling back to the default level when it is invalid.
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_LEVEL))
}

/// Installs the global subscriber.
///
/// Returns `None` if a subscriber was already installed, which is harmless
/// for callers that initialise logging more than once.
pub fn init_logging(settings: &LoggingSettings) -> Option<LoggingGuard> {
    let filter = build_filter(&settings.level);
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match settings.directory.as_deref() {
        Some(directory) => {
            let (writer, guard) = file_writer(directory);
            let file = fmt::layer().with_writer(writer).with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(file)
                .try_init()
                .ok()
                .map(|_| LoggingGuard { _file: Some(guard) })
        }
        None => tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .try_init()
            .ok()
            .map(|_| LoggingGuard { _file: None }),
    }
}

fn file_writer(
    directory: &Path,
) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
    let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
    tracing_appender::non_blocking(appender)
}
