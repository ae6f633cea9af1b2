//! File-backed tracing setup.
//!
//! The terminal belongs to the dashboard, so log lines never go to stdout or stderr.
//! They are written to a file, and only when one was requested (`--log-file`) or debug
//! mode is on.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::{CacheManager, LOG_FILE};

/// Where logs should go, if anywhere.
pub fn log_file_path(
    explicit: Option<&Path>,
    debug: bool,
    cache: Option<&CacheManager>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if debug {
        return cache.map(|c| c.cache_file(LOG_FILE));
    }
    None
}

/// Filter directive: RUST_LOG wins, then the configured level.
fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber writing to `path` (appending).
pub fn init_file_logging(path: &Path, default_level: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(build_filter(default_level))
        .with(fmt_layer)
        .try_init()
        .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

    tracing::info!(log_file = %path.display(), "logging initialized");
    Ok(())
}
