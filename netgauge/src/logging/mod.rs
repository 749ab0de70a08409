//! Tracing subscriber setup.
//!
//! Installs an env-filtered `tracing` subscriber, optionally tee-ing to a
//! daily-rolled log file. The `RUST_LOG` environment variable overrides the
//! configured default filter.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// File name stem for rolled log files.
const LOG_FILE_NAME: &str = "netgauge.log";

/// Logging configuration.
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub filter: String,

    /// Directory for rolled log files; `None` logs to stderr.
    pub directory: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "netgauge=info".to_string(),
            directory: None,
        }
    }
}

/// Installs the global subscriber.
///
/// Safe to call more than once; later calls are no-ops.
///
/// # Returns
///
/// The appender guard when file logging is active. Hold it for the life of
/// the process or buffered lines are lost on exit.
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter.clone()));
    let timer = LocalTime::rfc_3339();

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_timer(timer)
                .with_writer(writer)
                .with_ansi(false)
                .try_init();
            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_timer(timer)
                .with_writer(std::io::stderr)
                .try_init();
            None
        }
    }
}
