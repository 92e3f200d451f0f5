//! # Configuration Loader
//!
//! Loads and merges configuration from multiple sources:
//! 1. Default values (lowest priority)
//! 2. Configuration file (middle priority)
//! 3. Environment variables (highest priority)

use std::env;
use std::path::PathBuf;

use tracing::debug;

use crate::config::{FailurePolicy, MonitorConfig};
use crate::error::{CacheForgeError, Result};

/// Configuration loader with support for file and environment variable overrides
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Path to configuration file
    config_path: PathBuf,

    /// Environment variable prefix
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: "CACHEFORGE".to_string(),
        }
    }
}

impl ConfigLoader {
    /// Create a new config loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config loader with a specific config file path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            env_prefix: "CACHEFORGE".to_string(),
        }
    }

    /// Override the environment variable prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Get the default configuration file path
    fn default_config_path() -> PathBuf {
        if let Ok(config_path) = env::var("CACHEFORGE_CONFIG") {
            return PathBuf::from(config_path);
        }

        let local = PathBuf::from("cacheforge.toml");
        if local.exists() {
            return local;
        }

        dirs::config_dir()
            .map(|d| d.join("cacheforge").join("config.toml"))
            .unwrap_or(local)
    }

    /// Load configuration with full hierarchy
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(&self) -> Result<MonitorConfig> {
        let mut config = if self.config_path.exists() {
            self.load_from_file()?
        } else {
            debug!("No config file at {}, using defaults", self.config_path.display());
            MonitorConfig::default()
        };

        self.merge_env_config(&mut config)?;

        config.validate().map_err(|e| {
            CacheForgeError::configuration(format!("Configuration validation failed: {}", e))
        })?;

        Ok(config)
    }

    /// Load configuration from file. Sections and fields left out keep their defaults.
    fn load_from_file(&self) -> Result<MonitorConfig> {
        let content = std::fs::read_to_string(&self.config_path).map_err(|e| {
            CacheForgeError::configuration(format!(
                "Failed to read config file '{}': {}",
                self.config_path.display(),
                e
            ))
        })?;

        let config: MonitorConfig = toml::from_str(&content).map_err(|e| {
            CacheForgeError::configuration(format!(
                "Failed to parse config file '{}': {}",
                self.config_path.display(),
                e
            ))
        })?;

        debug!("Loaded config from {}", self.config_path.display());
        Ok(config)
    }

    fn merge_env_config(&self, config: &mut MonitorConfig) -> Result<()> {
        let prefix = &self.env_prefix;
        let var = |name: &str| env::var(format!("{}_{}", prefix, name)).ok();

        if let Some(val) = var("BASE_URL") {
            config.endpoint.base_url = val;
        }
        if let Some(val) = var("TIMEOUT_SECS") {
            config.endpoint.timeout_secs = parse_u64(&val, "TIMEOUT_SECS")?;
        }
        if let Some(val) = var("REFRESH_INTERVAL_SECS") {
            config.refresh.interval_secs = parse_u64(&val, "REFRESH_INTERVAL_SECS")?;
        }
        if let Some(val) = var("REFRESH_REPEAT") {
            config.refresh.repeat = parse_bool(&val, "REFRESH_REPEAT")?;
        }
        if let Some(val) = var("METRICS_INTERVAL_SECS") {
            config.metrics.interval_secs = parse_u64(&val, "METRICS_INTERVAL_SECS")?;
        }
        if let Some(val) = var("METRICS_FAILURE_POLICY") {
            config.metrics.failure_policy = val.parse::<FailurePolicy>().map_err(|e| {
                CacheForgeError::configuration(format!("Invalid METRICS_FAILURE_POLICY: {}", e))
            })?;
        }

        Ok(())
    }
}

/// Parse a u64 from string
fn parse_u64(s: &str, name: &str) -> Result<u64> {
    s.trim().parse::<u64>().map_err(|e| {
        CacheForgeError::configuration(format!(
            "Invalid {} '{}': must be a valid number. Error: {}",
            name, s, e
        ))
    })
}

/// Parse a boolean from string
fn parse_bool(s: &str, name: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(CacheForgeError::configuration(format!(
            "Invalid {} '{}': must be 'true' or 'false'",
            name, s
        ))),
    }
}
