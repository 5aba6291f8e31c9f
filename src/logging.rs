//! Logging setup.
//!
//! Every invocation appends to `proctor.log` in the data directory. With the
//! `stdout` setting the same events are mirrored to stderr, keeping stdout
//! free for command output. The `debug` setting lowers the level from `info`
//! to `debug`; `RUST_LOG` overrides both.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// File name of the log inside the data directory.
pub const LOG_FILE: &str = "proctor.log";

/// What the logging layers should do.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// Verbose logging
    pub debug: bool,
    /// Mirror to the console
    pub console: bool,
}

/// Install the global subscriber.
///
/// The returned guard flushes the log file on drop and must be held until
/// the process exits. Logging problems never abort a command.
pub fn init(log_dir: &Path, options: LogOptions) -> Option<WorkerGuard> {
    let level = if options.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!(
                "Warning: Failed to create log directory {}: {}",
                log_dir.display(),
                e
            );
            (None, None)
        }
    };

    let console_layer = options.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    guard
}
