//! File logging setup for the `log` facade.
//!
//! Library code only emits records through `log` macros; the embedding
//! application calls [`setup_logging`] once at startup to route them to a
//! log file under the user's cache directory.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;

/// Parse a configured level name (`"info"`, `"debug"`, ...)
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level).map_err(|_| anyhow::anyhow!("Invalid log level '{}'", level))
}

/// Install the global logger according to configuration.
///
/// Does nothing when logging is disabled. Fails if a global logger was
/// already installed or the log file cannot be opened.
pub fn setup_logging(config: &LoggingConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let level = parse_level(&config.level)?;
    let log_path = get_log_file_path()?;

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    let log_file = fern::log_file(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    fern::Dispatch::new()
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
        .level_for("hyper", LevelFilter::Warn)
        .level_for("hyper_util", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(log_file)
        .apply()
        .context("Failed to install logger")?;

    log::info!("📝 Logging to {}", log_path.display());
    Ok(())
}

/// Location of the log file: `<cache dir>/voltport/voltport.log`
pub fn get_log_file_path() -> Result<PathBuf> {
    dirs::cache_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))
        .map(|dir| dir.join("voltport").join("voltport.log"))
}
