//! Tracing subscriber setup.
//!
//! Events go to `<log_dir>/agentcheck.log` at `info` (or whatever `RUST_LOG`
//! says) and to stderr at `warn`. `--verbose` lowers both to `debug`.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILE_NAME: &str = "agentcheck.log";

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
///
/// If the log file cannot be opened, logging continues on stderr only.
pub fn init_logging(log_dir: Option<&Path>, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(stderr_level);

    let file_layer = log_dir.and_then(|dir| {
        fs::create_dir_all(dir).ok()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(LOG_FILE_NAME))
            .ok()?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}
