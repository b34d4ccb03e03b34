//! Reporting preferences.
//!
//! This module provides the settings that shape how error chains are logged.
//! They are plain values, optionally parsed from JSON by the caller.

pub mod settings;

pub use settings::{ReportLevel, ReportSettings, SettingsError};
