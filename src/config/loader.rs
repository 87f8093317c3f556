// src/config/loader.rs
//! Layered configuration loader
//!
//! Defaults are overlaid by each existing TOML file in order, then by
//! `PHOTOMETRY_*` environment variables. `__` separates table levels, so
//! `PHOTOMETRY_TRIM__CUTOFF_S=10` sets `trim.cutoff_s`. An override takes the
//! type of the value it replaces.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{constants::paths, PhotometryConfig};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("configuration parse error: {0}")]
    Parse(String),

    #[error("configuration validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Configuration loader with file layering and environment overrides
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a loader over the default search paths
    pub fn new() -> Self {
        Self::with_paths(Self::discover_config_paths())
    }

    /// Create loader with custom paths, later paths take precedence
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: paths::ENV_PREFIX.to_string(),
        }
    }

    /// Use a different environment variable prefix
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Load, merge and validate configuration
    pub fn load(&self) -> Result<PhotometryConfig, ConfigError> {
        let mut merged = toml::Value::try_from(PhotometryConfig::default())
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        for path in &self.config_paths {
            if !path.exists() {
                continue;
            }
            debug!(path = %path.display(), "merging configuration file");
            let overlay = Self::load_config_file(path)?;
            Self::merge_toml_values(&mut merged, overlay);
        }

        self.apply_environment_overrides(&mut merged);

        let config: PhotometryConfig = merged.try_into()?;

        let errors = config.validation_errors();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        Ok(config)
    }

    /// Parse and validate a single file on top of the defaults
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<PhotometryConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: PhotometryConfig = toml::from_str(&content)?;

        let errors = config.validation_errors();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        Ok(config)
    }

    /// Export configuration to a TOML file
    pub fn export_config<P: AsRef<Path>>(config: &PhotometryConfig, path: P) -> Result<(), ConfigError> {
        let toml_content =
            toml::to_string_pretty(config).map_err(|e| ConfigError::Parse(e.to_string()))?;

        std::fs::write(path, toml_content)?;
        Ok(())
    }

    fn load_config_file(path: &Path) -> Result<toml::Value, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let value: toml::Value = toml::from_str(&content)?;
        Ok(value)
    }

    fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
        match (base, overlay) {
            (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
                for (key, value) in overlay_table {
                    if let Some(base_value) = base_table.get_mut(&key) {
                        Self::merge_toml_values(base_value, value);
                    } else {
                        base_table.insert(key, value);
                    }
                }
            }
            (base_value, overlay_value) => {
                *base_value = overlay_value;
            }
        }
    }

    fn apply_environment_overrides(&self, config: &mut toml::Value) {
        for (key, value) in std::env::vars() {
            let Some(stripped) = key.strip_prefix(&self.env_prefix) else {
                continue;
            };

            let path: Vec<String> = stripped
                .split(paths::ENV_SECTION_SEPARATOR)
                .map(str::to_lowercase)
                .collect();
            if path.iter().any(String::is_empty) {
                warn!(variable = %key, "ignoring malformed configuration override");
                continue;
            }

            debug!(variable = %key, "applying environment override");
            let parsed = Self::coerce_env_value(Self::get_nested_value(config, &path), &value);
            Self::set_nested_value(config, &path, parsed);
        }
    }

    /// Parse an override using the type of the value it replaces
    ///
    /// String fields keep the raw text, so a channel named `465` stays a
    /// string. Unknown keys fall back to inference.
    fn coerce_env_value(current: Option<&toml::Value>, value: &str) -> toml::Value {
        match (current, Self::parse_env_value(value)) {
            (Some(toml::Value::String(_)), _) => toml::Value::String(value.to_string()),
            (Some(toml::Value::Float(_)), toml::Value::Integer(int_val)) => {
                toml::Value::Float(int_val as f64)
            }
            (_, parsed) => parsed,
        }
    }

    fn parse_env_value(value: &str) -> toml::Value {
        if let Ok(int_val) = value.parse::<i64>() {
            toml::Value::Integer(int_val)
        } else if let Ok(float_val) = value.parse::<f64>() {
            toml::Value::Float(float_val)
        } else if let Ok(bool_val) = value.parse::<bool>() {
            toml::Value::Boolean(bool_val)
        } else {
            toml::Value::String(value.to_string())
        }
    }

    fn get_nested_value<'a>(config: &'a toml::Value, path: &[String]) -> Option<&'a toml::Value> {
        path.iter().try_fold(config, |current, part| current.get(part.as_str()))
    }

    fn set_nested_value(config: &mut toml::Value, path: &[String], value: toml::Value) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };

        let mut current = config;
        for part in parents {
            let toml::Value::Table(table) = current else {
                return;
            };
            current = table
                .entry(part.clone())
                .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
        }

        if let toml::Value::Table(table) = current {
            table.insert(last.clone(), value);
        }
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from(paths::DEFAULT_CONFIG_FILE),
            PathBuf::from(paths::LOCAL_CONFIG_FILE),
        ]
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
