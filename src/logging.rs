//! File logging.
//!
//! The terminal belongs to the editor, so log output goes to
//! `~/.local/state/charm/charm.log` (or the platform cache dir) instead.
//! The filter comes from `CHARM_LOG` and defaults to `warn`.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "charm.log";
const LOG_ENV: &str = "CHARM_LOG";

/// Directory the log file is written to
pub fn log_dir() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join("charm"))
}

/// Install the global subscriber.
///
/// The returned guard flushes the writer on drop and must be held for the
/// whole session. Any failure leaves logging disabled.
pub fn init() -> Option<WorkerGuard> {
    let dir = log_dir()?;
    std::fs::create_dir_all(&dir).ok()?;

    let appender = Builder::new()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(&dir)
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;

    tracing::info!(dir = %dir.display(), "logging started");
    Some(guard)
}
