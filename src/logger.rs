//! Logger initialization.
//!
//! Wires the `log` facade to fern. Logging is quiet by default; when
//! enabled in the configuration, records also go to a file under the XDG
//! data directory. Safe to call more than once, later calls are no-ops.

use anyhow::{Context, Result};
use log::LevelFilter;
use once_cell::sync::OnceCell;
use std::path::PathBuf;

use crate::config::{Config, LoggingConfig};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Install the global logger according to the logging configuration.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if INITIALIZED.get().is_some() {
        return Ok(());
    }

    let level = parse_level(&config.level);
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // sqlx logs every statement at info
        .level_for("sqlx", LevelFilter::Warn)
        .chain(std::io::stderr());

    if config.enabled {
        let path = log_file_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
        dispatch = dispatch.chain(fern::log_file(&path).context("Failed to open log file")?);
    }

    dispatch.apply().context("Failed to install logger")?;
    let _ = INITIALIZED.set(());
    Ok(())
}

/// Where file logging goes when enabled.
pub fn log_file_path() -> Result<PathBuf> {
    Ok(Config::get_xdg_data_dir()?.join("tasksync.log"))
}

fn parse_level(level: &str) -> LevelFilter {
    match level {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}
