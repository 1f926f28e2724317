//! Application initialization and configuration

use anyhow::{Context, Result};
use log::{debug, LevelFilter};
use std::str::FromStr;
use vnotify::config::ConfigManager;
use vnotify::logging::{self, LogConfig, LogDestination, LogFormat};
use vnotify::NotifyConfig;

use vnotify::cli::Args;

pub fn load_configuration(args: &Args) -> Result<ConfigManager> {
    let mut manager = if let Some(config_file) = &args.config_file {
        debug!("Loading configuration from explicit file: {}", config_file.display());
        ConfigManager::load_from_file(config_file.clone())?
    } else {
        ConfigManager::load()?
    };

    if let Some(section_name) = &args.config_name {
        manager.select_section(section_name.clone());
    }

    Ok(manager)
}

/// Command line flags take precedence over the config file
pub fn configure_logging(args: &Args, config: &ConfigManager) -> Result<LogConfig> {
    let console_level = if args.debug {
        LevelFilter::Trace
    } else if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Error
    } else {
        match config.get_log_level("base", "console-level") {
            Ok(Some(level)) => level,
            Ok(None) => LevelFilter::Info,
            Err(e) => {
                debug!("Invalid console-level in config, using default: {}", e);
                LevelFilter::Info
            }
        }
    };

    let format = if args.log_format != "text" {
        LogFormat::from_str(&args.log_format).map_err(|e| anyhow::anyhow!(e))?
    } else {
        config
            .get_value("base", "log-format")
            .and_then(|format_str| LogFormat::from_str(format_str).ok())
            .unwrap_or(LogFormat::Text)
    };

    let log_file_path = args.log_file.clone().or_else(|| config.get_path("base", "log-file"));

    let file_log_level = match &args.log_file_level {
        Some(level_str) => Some(logging::parse_log_level(level_str)?),
        None => config.get_log_level("base", "file-log-level").unwrap_or_else(|e| {
            debug!("Invalid file-log-level in config, ignoring: {}", e);
            None
        }),
    };

    let (destination, file_level) = match log_file_path {
        Some(path) => (
            LogDestination::Both(path),
            Some(file_log_level.unwrap_or(console_level)),
        ),
        None => (LogDestination::Console, None),
    };

    Ok(LogConfig {
        console_level,
        file_level,
        format,
        destination,
    })
}

/// Notifier settings from the config file, with `--base-dir` applied on top
pub fn notify_config(args: &Args, config: &ConfigManager) -> Result<NotifyConfig> {
    let mut notify = config.get_notify_config()?;
    if let Some(base_dir) = &args.base_dir {
        notify.base_dir = base_dir.clone();
    }
    notify.validate().context("Invalid notifier settings")?;
    debug!("Notifier settings: {:?}", notify);
    Ok(notify)
}
