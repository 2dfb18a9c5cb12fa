//! Logging setup
//!
//! Console output goes to stderr so stdout stays clean for `--json`.
//! Commands that inspect a dataset also get a per-run log file.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `xray_audit_<YYYYmmdd_HHMMSS>.log`
pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("xray_audit_{}.log", now.format("%Y%m%d_%H%M%S"))
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `level` when set. Returns the log file path when
/// `logs_dir` was given.
pub fn init(level: &str, logs_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, log_path) = match logs_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log folder {}", dir.display()))?;
            let path = dir.join(log_file_name(Local::now()));
            let file = File::create(&path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            let layer = fmt::layer().with_ansi(false).with_writer(Mutex::new(file));
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(log_path)
}
