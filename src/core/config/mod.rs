//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$CADASTRE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/cadastre/config.toml`
//! 3. `~/.cadastre/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use cadastre::core::config::Config;
//!
//! let result = Config::load().unwrap();
//! let config = result.config;
//!
//! println!("Requested by: {}", config.requested_by());
//! println!("Alert duration: {}ms", config.alert_duration_ms());
//! ```

pub mod schema;

pub use schema::{AlertDefaults, GlobalConfig, PolicyDefaults};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::selection::DraftPolicy;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CADASTRE_CONFIG";

/// Default alert duration when nothing is configured.
pub const DEFAULT_ALERT_DURATION_MS: u64 = 5000;

/// Default identity recorded on requests.
pub const DEFAULT_REQUESTED_BY: &str = "Admin";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// File contents (all fields optional)
    pub global: GlobalConfig,
    /// Path to the config file (if loaded)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// holds invalid values. Missing files are not an error.
    pub fn load() -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let Some(path) = Self::locate(&mut warnings) else {
            return Ok(ConfigLoadResult {
                config: Config::default(),
                warnings,
            });
        };

        let global = Self::read_config(&path)?;
        global.validate()?;

        Ok(ConfigLoadResult {
            config: Config {
                global,
                path: Some(path),
            },
            warnings,
        })
    }

    /// Wrap in-memory values that were not read from disk.
    pub fn from_global(global: GlobalConfig) -> Self {
        Self { global, path: None }
    }

    /// Load from an explicit file.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let global = Self::read_config(path)?;
        global.validate()?;
        Ok(Config {
            global,
            path: Some(path.to_path_buf()),
        })
    }

    /// Find the first config file that exists.
    fn locate(warnings: &mut Vec<ConfigWarning>) -> Option<PathBuf> {
        // 1. Check $CADASTRE_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            warnings.push(ConfigWarning {
                message: format!("{} points at a missing file, ignoring", CONFIG_ENV),
                path,
            });
        }

        // 2. Check $XDG_CONFIG_HOME/cadastre/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("cadastre/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.cadastre/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".cadastre/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<GlobalConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the path new settings are written to.
    ///
    /// `$CADASTRE_CONFIG` when set, otherwise `~/.cadastre/config.toml`.
    pub fn write_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".cadastre/config.toml"))
    }

    /// Validate and write config atomically to [`write_path`](Self::write_path).
    pub fn write_global(config: &GlobalConfig) -> Result<PathBuf, ConfigError> {
        config.validate()?;
        let path = Self::write_path()?;
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed. Writes to a temp file in the
    /// same directory, then renames over the destination.
    pub fn write_config_atomic(path: &Path, config: &GlobalConfig) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Identity recorded on submitted requests.
    ///
    /// Defaults to "Admin" if not configured.
    pub fn requested_by(&self) -> &str {
        self.global
            .requested_by
            .as_deref()
            .unwrap_or(DEFAULT_REQUESTED_BY)
    }

    /// Alert duration used when an emitter gives none.
    ///
    /// Defaults to 5000 ms if not configured.
    pub fn alert_duration_ms(&self) -> u64 {
        self.global
            .alerts
            .as_ref()
            .and_then(|a| a.default_duration_ms)
            .unwrap_or(DEFAULT_ALERT_DURATION_MS)
    }

    /// Whether drafts must cross a country boundary.
    ///
    /// Defaults to `true` if not configured.
    pub fn require_cross_country(&self) -> bool {
        self.global
            .policy
            .as_ref()
            .and_then(|p| p.require_cross_country)
            .unwrap_or(true)
    }

    /// Default for the "transfer resources" flag.
    ///
    /// Defaults to `false` if not configured.
    pub fn transfer_resources(&self) -> bool {
        self.global
            .policy
            .as_ref()
            .and_then(|p| p.transfer_resources)
            .unwrap_or(false)
    }

    /// Draft validation policy derived from config.
    pub fn draft_policy(&self) -> DraftPolicy {
        DraftPolicy {
            require_cross_country: self.require_cross_country(),
        }
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_file() {
        let config = Config::default();
        assert_eq!(config.requested_by(), "Admin");
        assert_eq!(config.alert_duration_ms(), 5000);
        assert!(config.require_cross_country());
        assert!(!config.transfer_resources());
        assert!(config.loaded_from().is_none());
    }

    #[test]
    fn load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            requested_by = "ops"

            [alerts]
            default_duration_ms = 3000

            [policy]
            require_cross_country = false
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.requested_by(), "ops");
        assert_eq!(config.alert_duration_ms(), 3000);
        assert!(!config.require_cross_country());
        assert!(!config.draft_policy().require_cross_country);
        assert_eq!(config.loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn invalid_value_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[alerts]\ndefault_duration_ms = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "requested_by = \"ops\"\nunknown_field = true\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn write_atomic_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/config.toml");
        let global = GlobalConfig {
            requested_by: Some("auditor".to_string()),
            ..Default::default()
        };

        Config::write_config_atomic(&path, &global).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.requested_by(), "auditor");
    }
}
