use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::settings::{LogFormat, LogSettings};

/// File name prefix for the rolling log files written under `logging.directory`.
pub const LOG_FILE_PREFIX: &str = "health-tracker.log";

/// Installs the global `tracing` subscriber.
///
/// Events go to stderr unless `directory` is configured, in which case they are
/// written to a daily rolling file through a non-blocking writer. The returned
/// guard flushes that writer on drop, so callers must hold it for the lifetime
/// of the process.
pub fn init_tracing(settings: &LogSettings) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.filter));

    let (writer, guard) = match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer);

    let result = match settings.format {
        LogFormat::Json => builder.json().with_target(false).try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    // A subscriber may already be installed (tests, embedding); that is not fatal.
    if let Err(e) = result {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }

    guard
}
