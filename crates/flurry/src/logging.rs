//! File logging, enabled by setting `FLURRY_LOG` (e.g. `FLURRY_LOG=debug`).
//!
//! The terminal belongs to the UI, so logs only ever go to a file.

use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing_subscriber::filter::EnvFilter;

pub const LOG_ENV: &str = "FLURRY_LOG";

/// Install the file subscriber if `FLURRY_LOG` is set. Returns the log path.
pub fn init() -> Result<Option<PathBuf>> {
    if env::var_os(LOG_ENV).is_none() {
        return Ok(None);
    }

    let path = flurry_config::log_file_path()
        .ok_or_else(|| eyre!("could not determine a data directory for the log file"))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("failed to open {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_env_filter(EnvFilter::from_env(LOG_ENV))
        .with_writer(Mutex::new(file))
        .init();

    Ok(Some(path))
}
