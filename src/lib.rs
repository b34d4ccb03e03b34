//! Errstack - stack one error on top of another
//!
//! Attach a category or marker error onto an already detailed error without
//! losing either. The result renders as `"{front}: {back}"`, and identity,
//! value and type searches find the marker, the original error, and anything
//! either of them wraps.

pub mod config;
pub mod error;

// Re-export key types for convenience
pub use {
    config::{ReportLevel, ReportSettings, SettingsError},
    error::{
        Composite, Context, ErrorReporter, Marker, ResultExt, SharedError, chain, find, is,
        is_value, shared, with, wrap,
    },
};
