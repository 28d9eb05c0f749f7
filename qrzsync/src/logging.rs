use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Keeps the file writer alive; dropping it flushes pending log lines.
#[allow(dead_code)]
pub struct LoggerGuard(Option<WorkerGuard>);

/// Install the global subscriber: coloured console output plus, when
/// `log_file` is given, a plain-text copy appended to that file.
pub fn init_logging(log_file: Option<&Path>, level: &str) -> LoggerGuard {
    let level = match level.parse::<LevelFilter>() {
        Ok(level) => level,
        Err(_) => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", level);
            LevelFilter::INFO
        }
    };

    // HTTP internals stay quiet unless RUST_LOG asks for them
    let directives =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "hyper=warn,reqwest=warn".to_string());
    let builder = EnvFilter::builder().with_default_directive(level.into());
    let console_filter = builder.clone().parse_lossy(&directives);
    let file_filter = builder.parse_lossy(&directives);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_filter(console_filter);

    let (file_layer, guard, open_error) = match log_file.map(file_appender) {
        Some(Ok(appender)) => {
            let (non_blocking, guard) = NonBlocking::new(appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(file_filter);
            (Some(layer), Some(guard), None)
        }
        Some(Err(e)) => (None, None, Some(e)),
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .init();

    if let (Some(path), Some(e)) = (log_file, open_error) {
        tracing::warn!("Could not open log file {}: {}; logging to console only", path.display(), e);
    }

    LoggerGuard(guard)
}

fn file_appender(path: &Path) -> Result<RollingFileAppender, tracing_appender::rolling::InitError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "qrzsync.log".to_string());

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
}
