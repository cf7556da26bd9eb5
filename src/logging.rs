//! Tracing setup: a console layer on stderr plus a debug log file.

use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Written to the current directory on every run
pub const LOG_FILE: &str = "vscch.log";

/// Console shows `info` with `verbose`, `warn` otherwise; `RUST_LOG` wins over both.
///
/// The log file always records `debug`. If it cannot be created the run
/// continues with console output only.
pub fn init(verbose: bool) {
    let default = if verbose { "vscch=info" } else { "vscch=warn" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(console_filter);

    let file = File::create(LOG_FILE).ok().map(|f| {
        fmt::layer()
            .with_writer(Mutex::new(f))
            .with_ansi(false)
            .with_target(false)
            .with_filter(LevelFilter::DEBUG)
    });

    tracing_subscriber::registry().with(console).with(file).init();
}
