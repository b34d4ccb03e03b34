//! Operational helpers: attaching markers and context, and reporting chains.
//!
//! This module provides extension traits for stacking errors at the point
//! where they are produced, and centralized logging of a whole error chain.

use std::{error::Error as StdError, fmt::Display, sync::Arc};

use tracing::{debug, error, info, warn};

use crate::{
    config::{ReportLevel, ReportSettings},
    error::{
        chain::{ErrorRef, chain},
        composite::{Composite, SharedError},
        marker::{Context, shared},
    },
};

/// Extension trait for stacking onto the error of a `Result`.
///
/// Every method leaves the original error reachable through
/// [`crate::error::chain`].
pub trait ResultExt<T> {
    /// Stacks `marker` on top of the error.
    fn mark(self, marker: &SharedError) -> Result<T, SharedError>;

    /// Stacks a lazily built marker on top of the error.
    fn mark_with<F>(self, marker: F) -> Result<T, SharedError>
    where
        F: FnOnce() -> SharedError;

    /// Adds context to an error with a static string.
    fn add_context(self, context: &'static str) -> Result<T, SharedError>;

    /// Adds context to an error with a formatted string.
    fn add_contextf(self, format: impl Display) -> Result<T, SharedError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn mark(self, marker: &SharedError) -> Result<T, SharedError> {
        self.mark_with(|| marker.clone())
    }

    fn mark_with<F>(self, marker: F) -> Result<T, SharedError>
    where
        F: FnOnce() -> SharedError,
    {
        self.map_err(|error| Arc::new(Composite::new(shared(error), marker())) as SharedError)
    }

    fn add_context(self, context: &'static str) -> Result<T, SharedError> {
        self.map_err(|error| Arc::new(Context::new(context, shared(error))) as SharedError)
    }

    fn add_contextf(self, format: impl Display) -> Result<T, SharedError> {
        self.map_err(|error| {
            Arc::new(Context::new(format.to_string(), shared(error))) as SharedError
        })
    }
}

/// Centralized error reporting and logging.
///
/// The `ErrorReporter` logs an error together with the message of every
/// layer in its chain, at the level chosen in [`ReportSettings`].
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter {
    settings: ReportSettings,
}

impl ErrorReporter {
    /// Creates a reporter with the given settings.
    #[must_use]
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    /// The settings in use.
    #[must_use]
    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Logs `error` at the configured level.
    ///
    /// # Arguments
    ///
    /// * `error` - The error to report.
    /// * `context` - What was being done when the error occurred.
    pub fn report(&self, error: ErrorRef<'_>, context: &str) {
        match self.settings.level {
            ReportLevel::Debug => self.debug(error, context),
            ReportLevel::Info => self.info(error, context),
            ReportLevel::Warn => self.warn(error, context),
            ReportLevel::Error => self.error(error, context),
        }
    }

    /// Reports a debug-level error (development only).
    pub fn debug(&self, error: ErrorRef<'_>, context: &str) {
        let chain = self.chain_field(error);
        debug!(context = context, error = %error, chain = ?chain, "Debug error");
    }

    /// Reports an info-level error (user actions and system events).
    pub fn info(&self, error: ErrorRef<'_>, context: &str) {
        let chain = self.chain_field(error);
        info!(context = context, error = %error, chain = ?chain, "Info error");
    }

    /// Reports a warning-level error (recoverable issues).
    pub fn warn(&self, error: ErrorRef<'_>, context: &str) {
        let chain = self.chain_field(error);
        warn!(context = context, error = %error, chain = ?chain, "Warning error");
    }

    /// Reports an error-level error (non-recoverable issues).
    pub fn error(&self, error: ErrorRef<'_>, context: &str) {
        let chain = self.chain_field(error);
        error!(context = context, error = %error, chain = ?chain, "Error error");
    }

    /// Lists the head message of each layer, outermost first.
    ///
    /// The list stops after `max_depth` layers.
    #[must_use]
    pub fn chain_messages(&self, error: ErrorRef<'_>) -> Vec<String> {
        chain(error)
            .take(self.settings.max_depth)
            .map(|layer| layer.head().to_string())
            .collect()
    }

    /// Converts an error to a user-friendly message.
    ///
    /// For a composite this is the front's message alone, which is the
    /// marker or category that was attached for the caller.
    #[must_use]
    pub fn to_user_message(error: ErrorRef<'_>) -> String {
        chain(error)
            .next()
            .map_or_else(|| error.to_string(), |layer| layer.head().to_string())
    }

    fn chain_field(&self, error: ErrorRef<'_>) -> Option<Vec<String>> {
        self.settings
            .include_chain
            .then(|| self.chain_messages(error))
    }
}
