use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with optional JSON output.
///
/// Diagnostics go to stderr; stdout carries the event log. With `log_dir`
/// set, a daily rolling file receives a plain-text copy. Keep the returned
/// guard alive until exit so the file writer flushes.
pub fn init_tracing(json_output: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fixlog=debug,fixlog_core=debug"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "fixlog.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let base = tracing_subscriber::registry().with(filter).with(file_layer);

    if json_output {
        base.with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        base.with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }

    guard
}
