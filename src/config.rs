use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context, Result};
use toml::Value;
use log::{debug, info};

use crate::cli::duration_parser::parse_duration;
use crate::error::{NotifyError, NotifyResult};

/// Default bound of the per-instance event queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Default poll interval for `wait_for_event` and the command line
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default pause between publish attempts while waiting for a subscriber
pub const DEFAULT_PUBLISH_RETRY_DELAY: Duration = Duration::from_millis(1);

/// Runtime settings for a notifier instance
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyConfig {
    /// Directory holding lock and marker files
    pub base_dir: PathBuf,
    pub queue_capacity: usize,
    pub poll_interval: Duration,
    /// Zero means spin without sleeping
    pub publish_retry_delay: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            base_dir: env::temp_dir(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            publish_retry_delay: DEFAULT_PUBLISH_RETRY_DELAY,
        }
    }
}

impl NotifyConfig {
    pub fn builder() -> NotifyConfigBuilder {
        NotifyConfigBuilder::default()
    }

    /// Default settings rooted at `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> NotifyResult<()> {
        if self.queue_capacity == 0 {
            return Err(NotifyError::invalid_config("queue capacity must be greater than 0"));
        }
        if self.poll_interval.is_zero() {
            return Err(NotifyError::invalid_config("poll interval must be greater than 0"));
        }
        if self.base_dir.as_os_str().is_empty() {
            return Err(NotifyError::invalid_config("base directory must not be empty"));
        }
        Ok(())
    }
}

/// Fluent construction of [`NotifyConfig`]
#[derive(Debug, Default)]
pub struct NotifyConfigBuilder {
    config: NotifyConfig,
}

impl NotifyConfigBuilder {
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = base_dir.into();
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn with_publish_retry_delay(mut self, delay: Duration) -> Self {
        self.config.publish_retry_delay = delay;
        self
    }

    pub fn build(self) -> NotifyResult<NotifyConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration storage - section_name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

/// Configuration manager
pub struct ConfigManager {
    config: Configuration,
    config_file_path: Option<PathBuf>,
    selected_section: Option<String>,
}

impl ConfigManager {
    /// Create a new ConfigManager from a Configuration (primarily for testing)
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            config_file_path: None,
            selected_section: None,
        }
    }

    /// Load configuration using discovery hierarchy
    pub fn load() -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        debug!("No configuration file found, using empty configuration");
        Ok(Self::from_config(Configuration::new()))
    }

    /// Load configuration from explicit file path
    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded configuration from: {}", path.display());
        Ok(Self {
            config,
            config_file_path: Some(path),
            selected_section: None,
        })
    }

    pub fn config_file_path(&self) -> Option<&PathBuf> {
        self.config_file_path.as_ref()
    }

    /// Get value from configuration with section fallback
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        // Priority: selected_section -> specified section -> base
        if let Some(selected) = &self.selected_section {
            if let Some(value) = self.config.get(selected).and_then(|s| s.get(key)) {
                return Some(value);
            }
        }

        if let Some(value) = self.config.get(section).and_then(|s| s.get(key)) {
            return Some(value);
        }

        self.config.get("base").and_then(|s| s.get(key))
    }

    /// Select configuration section for --config-name
    pub fn select_section(&mut self, section: String) {
        debug!("Selecting configuration section: {}", section);
        self.selected_section = Some(section);
    }

    /// Get log level value with type conversion
    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<log::LevelFilter>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(crate::logging::parse_log_level(value)?)),
            None => Ok(None),
        }
    }

    /// Get path value with type conversion
    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }

    /// Get duration value with type conversion
    pub fn get_duration(&self, section: &str, key: &str) -> Result<Option<Duration>> {
        match self.get_value(section, key) {
            Some(value) => {
                let duration = parse_duration(value)
                    .with_context(|| format!("Invalid {} value in config: {}", key, value))?;
                Ok(Some(duration))
            }
            None => Ok(None),
        }
    }

    /// Build notifier settings from the `[notify]` section
    pub fn get_notify_config(&self) -> Result<NotifyConfig> {
        let mut config = NotifyConfig::default();

        if let Some(base_dir) = self.get_path("notify", "base-dir") {
            config.base_dir = base_dir;
        }

        if let Some(capacity_str) = self.get_value("notify", "queue-capacity") {
            config.queue_capacity = capacity_str.parse::<usize>()
                .with_context(|| format!("Invalid queue-capacity value in config: {}", capacity_str))?;
        }

        if let Some(interval) = self.get_duration("notify", "poll-interval")? {
            config.poll_interval = interval;
        }

        if let Some(delay) = self.get_duration("notify", "publish-retry-delay")? {
            config.publish_retry_delay = delay;
        }

        config.validate()
            .context("Notifier configuration validation failed")?;

        Ok(config)
    }
}

/// Discover configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Environment variable $VNOTIFY_CONFIG
    if let Ok(env_path) = env::var("VNOTIFY_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    // 2. XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("vnotify").join("config.toml"));
    }

    // 3. Home directory
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".vnotify.toml"));
    }

    // 4. Project local
    paths.push(PathBuf::from("./.vnotify.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

/// Parse TOML content to string-based configuration
fn parse_toml_config(content: &str) -> Result<Configuration> {
    let toml_value: Value = content.parse()
        .context("Failed to parse TOML content")?;

    let mut config = Configuration::new();

    if let Value::Table(table) = toml_value {
        for (section, value) in table {
            match value {
                Value::Table(entries) => {
                    let section_map = entries.iter()
                        .map(|(key, value)| (key.clone(), toml_value_to_string(value)))
                        .collect();
                    config.insert(section, section_map);
                }
                other => {
                    // Top-level keys belong to [base]
                    config.entry("base".to_string())
                        .or_default()
                        .insert(section, toml_value_to_string(&other));
                }
            }
        }
    }

    debug!("Parsed configuration: {:?}", config);
    Ok(config)
}

/// Convert TOML Value to string representation
fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        _ => value.to_string(),
    }
}
