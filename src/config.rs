//! Configuration constants and utilities for rosshow
//!
//! Defaults live here; environment variables override them and command line
//! flags override both (see [`crate::cmd_args`]).

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

/// Default JSON-lines bus source
pub const DEFAULT_BUS_PATH: &str = "/tmp/rosshow.bus";

/// Environment variable name for overriding the bus source
pub const BUS_PATH_ENV_VAR: &str = "ROSSHOW_BUS_PATH";

/// Environment variable holding the tracing filter
pub const LOG_LEVEL_ENV_VAR: &str = "ROSSHOW_LOG_LEVEL";

/// Environment variable naming the log file. Without it nothing is logged,
/// since the terminal belongs to the renderer.
pub const LOG_FILE_ENV_VAR: &str = "ROSSHOW_LOG_FILE";

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Redraw rate in Hz
pub const DEFAULT_FRAME_RATE: u32 = 15;

/// How long to wait for publishers to show up before dispatching
pub const DEFAULT_DISCOVERY_WAIT: Duration = Duration::from_secs(1);

/// Get the bus source, checking environment variable first, then falling back to default
pub fn get_bus_path() -> String {
    std::env::var_os(BUS_PATH_ENV_VAR)
        .and_then(|val| val.into_string().ok())
        .unwrap_or_else(|| DEFAULT_BUS_PATH.to_string())
}

pub fn get_log_level() -> String {
    std::env::var(LOG_LEVEL_ENV_VAR)
        .ok()
        .filter(|val| !val.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

pub fn get_log_file() -> Option<PathBuf> {
    std::env::var_os(LOG_FILE_ENV_VAR)
        .filter(|val| !val.is_empty())
        .map(PathBuf::from)
}

/// Install the global subscriber writing to the log file.
///
/// Returns `Ok(false)` when no log file is configured.
pub fn init_logging() -> Result<bool> {
    let Some(path) = get_log_file() else {
        return Ok(false);
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    let filter = EnvFilter::try_new(get_log_level())
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_LEVEL))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(ChronoLocal::rfc_3339())
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install tracing subscriber: {e}"))?;

    Ok(true)
}
