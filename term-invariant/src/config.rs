//! Configuration for guarded functions.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::{Result, TermError};
use crate::logging::LogConfig;

/// Behaviour of the guards produced by a [`Decorator`](crate::core::Decorator).
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Whether a rejected dataset is moved into the [`InvariantViolation`](crate::error::InvariantViolation)
    pub attach_input: bool,
    /// Logging behaviour of the guard
    pub log: LogConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            attach_input: true,
            log: LogConfig::default(),
        }
    }
}

impl GuardConfig {
    /// Drops rejected datasets and keeps logging to a minimum.
    pub fn lightweight() -> Self {
        Self {
            attach_input: false,
            log: LogConfig::production(),
        }
    }

    /// Logs every check a guard evaluates.
    pub fn verbose() -> Self {
        Self {
            attach_input: true,
            log: LogConfig::verbose(),
        }
    }

    /// Sets whether rejected datasets travel with the violation.
    pub fn with_attach_input(mut self, enabled: bool) -> Self {
        self.attach_input = enabled;
        self
    }

    /// Sets the logging configuration.
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Builds a configuration from serialized settings, starting from the defaults.
    pub fn from_settings(settings: &GuardSettings) -> Result<Self> {
        let mut config = Self::default();
        if let Some(attach_input) = settings.attach_input {
            config.attach_input = attach_input;
        }
        if let Some(ref level) = settings.log_level {
            config.log.base_level = Level::from_str(level).map_err(|_| {
                TermError::Configuration(format!("invalid log level '{level}'"))
            })?;
        }
        if let Some(details) = settings.log_check_details {
            config.log.log_check_details = details;
        }
        if let Some(violations) = settings.log_violations {
            config.log.log_violations = violations;
        }
        if let Some(max) = settings.max_field_length {
            config.log.max_field_length = max;
        }
        Ok(config)
    }

    /// Parses settings from JSON and builds a configuration from them.
    ///
    /// ```rust
    /// use term_invariant::config::GuardConfig;
    ///
    /// let config = GuardConfig::from_json(r#"{"attach_input": false, "log_level": "debug"}"#).unwrap();
    /// assert!(!config.attach_input);
    /// assert_eq!(config.log.base_level, tracing::Level::DEBUG);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: GuardSettings = serde_json::from_str(json)?;
        Self::from_settings(&settings)
    }
}

/// Serializable overrides for [`GuardConfig`]; absent fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuardSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attach_input: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_check_details: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_violations: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_field_length: Option<usize>,
}
