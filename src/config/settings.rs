//! Error reporting preferences.
//!
//! This module controls how [`crate::error::ErrorReporter`] logs error
//! chains: at which level, whether the full chain is attached, and how deep
//! the chain listing goes. Settings are plain in-memory values; loading them
//! from a file is left to the application.

use {
    serde::{Deserialize, Serialize},
    serde_json::{Error as SerdeJsonError, from_str},
    thiserror::Error,
};

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to serialize or deserialize settings.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
    /// Invalid settings value.
    #[error("Invalid settings value: {reason}")]
    InvalidValue { reason: String },
}

/// Severity used when reporting an error through `tracing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    /// Development diagnostics.
    Debug,
    /// User actions and system events.
    Info,
    /// Recoverable issues.
    #[default]
    Warn,
    /// Non-recoverable issues.
    Error,
}

/// Serializable reporting settings with default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Level at which `ErrorReporter::report` logs.
    pub level: ReportLevel,
    /// Whether every layer's message is attached to the log event.
    pub include_chain: bool,
    /// Maximum number of layers listed per error (must be non-zero).
    pub max_depth: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            level: ReportLevel::Warn,
            include_chain: true,
            max_depth: 16,
        }
    }
}

impl ReportSettings {
    /// Parses settings from a JSON document and validates them.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the JSON is malformed or a value is invalid.
    pub fn from_json(contents: &str) -> Result<Self, SettingsError> {
        let settings: Self = from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` if `max_depth` is zero.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_depth == 0 {
            return Err(SettingsError::InvalidValue {
                reason: "max_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
