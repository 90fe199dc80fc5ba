//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order:
//! 1. `$CADASTRE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/cadastre/config.toml`
//! 3. `~/.cadastre/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected ranges (e.g., alert durations must be positive).

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Upper bound for alert durations, in milliseconds.
pub const MAX_ALERT_DURATION_MS: u64 = 60_000;

/// User configuration.
///
/// # Example
///
/// ```toml
/// requested_by = "Admin"
///
/// [alerts]
/// default_duration_ms = 5000
///
/// [policy]
/// require_cross_country = true
/// transfer_resources = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Identity recorded on submitted requests
    pub requested_by: Option<String>,

    /// Alert presentation defaults
    pub alerts: Option<AlertDefaults>,

    /// Transfer policy defaults
    pub policy: Option<PolicyDefaults>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(who) = &self.requested_by {
            if who.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "requested_by cannot be empty".to_string(),
                ));
            }
        }

        if let Some(alerts) = &self.alerts {
            alerts.validate()?;
        }

        Ok(())
    }
}

/// Alert defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AlertDefaults {
    /// How long an alert stays up when the emitter does not say
    pub default_duration_ms: Option<u64>,
}

impl AlertDefaults {
    /// Validate the alert configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ms) = self.default_duration_ms {
            if ms == 0 || ms > MAX_ALERT_DURATION_MS {
                return Err(ConfigError::InvalidValue(format!(
                    "alerts.default_duration_ms must be between 1 and {}, got {}",
                    MAX_ALERT_DURATION_MS, ms
                )));
            }
        }
        Ok(())
    }
}

/// Transfer policy defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyDefaults {
    /// Reject drafts whose two ends share a country
    pub require_cross_country: Option<bool>,

    /// Default for the "transfer resources" flag
    pub transfer_resources: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GlobalConfig::default();
        assert!(config.requested_by.is_none());
        assert!(config.alerts.is_none());
        assert!(config.policy.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_requested_by_rejected() {
        let config = GlobalConfig {
            requested_by: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_duration_rejected() {
        let config = GlobalConfig {
            alerts: Some(AlertDefaults {
                default_duration_ms: Some(0),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn excessive_duration_rejected() {
        let alerts = AlertDefaults {
            default_duration_ms: Some(MAX_ALERT_DURATION_MS + 1),
        };
        assert!(alerts.validate().is_err());
    }

    #[test]
    fn roundtrip() {
        let config = GlobalConfig {
            requested_by: Some("ops".to_string()),
            alerts: Some(AlertDefaults {
                default_duration_ms: Some(3000),
            }),
            policy: Some(PolicyDefaults {
                require_cross_country: Some(false),
                transfer_resources: Some(true),
            }),
        };

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: GlobalConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn reject_unknown_fields() {
        let toml = r#"
            requested_by = "ops"
            unknown_field = true
        "#;

        let result: Result<GlobalConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
