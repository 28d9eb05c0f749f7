use clap::Parser;
use qrzsync::config::{Cli, SyncConfig};
use qrzsync::logging::init_logging;
use qrzsync::runner;
use qrzsync_common::is_idle_log;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = start(cli).await;
    std::process::exit(code);
}

/// Run once and return the exit code. The logging guard is dropped here,
/// before the process exits, so the log file is flushed.
async fn start(cli: Cli) -> i32 {
    let config = match SyncConfig::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            let _logging_guard = init_logging(None, "info");
            tracing::error!("{}", e);
            return e.exit_code();
        }
    };

    let lines = match runner::read_input(&config.input_file).await {
        Ok(lines) => lines,
        Err(e) => {
            let _logging_guard = init_logging(None, &config.log_level);
            tracing::error!("{}", e);
            return e.exit_code();
        }
    };

    let idle = is_idle_log(lines.as_slice());
    let log_file = if idle && !config.write_idle_log {
        None
    } else {
        config.log_file.as_deref()
    };
    let _logging_guard = init_logging(log_file, &config.log_level);

    if idle {
        tracing::info!(
            "The source file {} is empty; doing nothing",
            config.input_file.display()
        );
        return 0;
    }

    tracing::debug!("qrzsync {} starting", env!("CARGO_PKG_VERSION"));

    match runner::execute(&config, &lines).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            e.exit_code()
        }
    }
}
