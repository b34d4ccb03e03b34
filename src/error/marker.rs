//! Small error values to stack and wrap with.

use std::{
    borrow::Cow,
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
    sync::Arc,
};

use thiserror::Error;

use crate::error::composite::SharedError;

/// Message-only error, typically used as a sentinel or category marker.
///
/// Two markers with the same message compare equal, so a `Marker` can be
/// searched for by value with [`crate::error::chain::is_value`] as well as
/// by identity with [`crate::error::chain::is`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
#[error("{message}")]
pub struct Marker {
    message: Cow<'static, str>,
}

impl Marker {
    /// Creates a marker from a static message.
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self {
            message: Cow::Borrowed(message),
        }
    }

    /// Creates a marker from an owned message.
    #[must_use]
    pub fn owned(message: impl Into<String>) -> Self {
        Self {
            message: Cow::Owned(message.into()),
        }
    }

    /// The marker's message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An error with a message placed in front of the error it wraps.
///
/// Renders as `"{message}: {inner}"` and reports `inner` as its source.
#[derive(Debug, Clone)]
pub struct Context {
    message: String,
    inner: SharedError,
}

impl Context {
    /// Creates a new context error.
    ///
    /// # Arguments
    ///
    /// * `message` - Text shown before the wrapped error.
    /// * `inner` - The wrapped error.
    ///
    /// # Returns
    ///
    /// A new `Context`.
    pub fn new(message: impl Into<String>, inner: SharedError) -> Self {
        Self {
            message: message.into(),
            inner,
        }
    }

    /// The context message without the wrapped error.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The wrapped error.
    #[must_use]
    pub fn inner(&self) -> &SharedError {
        &self.inner
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.message, self.inner)
    }
}

impl StdError for Context {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.inner)
    }
}

/// Moves an error into a [`SharedError`] handle.
pub fn shared<E>(error: E) -> SharedError
where
    E: StdError + Send + Sync + 'static,
{
    Arc::new(error)
}

/// Wraps `inner` in a [`Context`] with `message` in front.
pub fn wrap(message: impl Into<String>, inner: SharedError) -> SharedError {
    Arc::new(Context::new(message, inner))
}
