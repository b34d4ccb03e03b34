//! Composite error: one error stacked on top of another.
//!
//! A [`Composite`] keeps a `front` error (a marker, category or fresh
//! context) over a `back` error (the original cause). Both stay reachable
//! through the traversal in [`crate::error::chain`]: first the front and
//! every layer beneath it, then the back and every layer beneath it.

use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
    sync::Arc,
};

use crate::error::chain::{Layer, Stack};

/// Shared, thread-safe handle to any error value.
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// Stacks `front` over `back`.
///
/// Missing sides collapse instead of producing a node that carries no
/// extra information.
///
/// # Arguments
///
/// * `back` - The original, inner error.
/// * `front` - The error to attach on top.
///
/// # Returns
///
/// `None` when both are missing, the present side unchanged when only one
/// is given, and a new [`Composite`] otherwise.
#[must_use]
pub fn with(back: Option<SharedError>, front: Option<SharedError>) -> Option<SharedError> {
    match (back, front) {
        (None, None) => None,
        (Some(back), None) => Some(back),
        (None, Some(front)) => Some(front),
        (Some(back), Some(front)) => Some(Arc::new(Composite::new(back, front))),
    }
}

/// Two errors held as one: `front` over `back`.
///
/// The rendered message is `"{front}: {back}"`. The std [`StdError::source`]
/// of a composite is `back`; walking the front's own layers requires
/// [`crate::error::chain`].
#[derive(Debug, Clone)]
pub struct Composite {
    front: SharedError,
    back: SharedError,
}

impl Composite {
    /// Creates a composite with both sides present.
    ///
    /// # Arguments
    ///
    /// * `back` - The original, inner error.
    /// * `front` - The error to attach on top.
    ///
    /// # Returns
    ///
    /// A new `Composite`.
    #[must_use]
    pub fn new(back: SharedError, front: SharedError) -> Self {
        Self { front, back }
    }

    /// The outer error, visited first.
    #[must_use]
    pub fn front(&self) -> &SharedError {
        &self.front
    }

    /// The inner error, visited once the front is exhausted.
    #[must_use]
    pub fn back(&self) -> &SharedError {
        &self.back
    }

    /// Borrowed view of this composite used by the traversal.
    #[must_use]
    pub fn view(&self) -> Stack<'_> {
        Stack::new(Some(self), Layer::of(&*self.front), &*self.back)
    }

    /// Checks whether the front represents `target`.
    ///
    /// Matches when the front is the same object as `target`, or when the
    /// front is itself a composite whose own front chain reports a match.
    /// The back is never consulted here; [`crate::error::chain::is`] reaches
    /// it by stepping to the next layer.
    ///
    /// # Arguments
    ///
    /// * `target` - The instance to look for: a concrete reference or a
    ///   [`SharedError`] handle.
    ///
    /// # Returns
    ///
    /// `true` if the front represents `target`.
    #[must_use]
    pub fn matches<E>(&self, target: &E) -> bool
    where
        E: StdError + 'static,
    {
        self.view().matches(target)
    }

    /// Value-equality counterpart of [`Composite::matches`].
    ///
    /// Only types that implement `PartialEq` can be compared this way.
    #[must_use]
    pub fn matches_value<E>(&self, target: &E) -> bool
    where
        E: StdError + PartialEq + 'static,
    {
        self.view().matches_value(target)
    }

    /// Extracts the front as `T`, delegating to a nested composite front.
    ///
    /// # Returns
    ///
    /// The front's value when it is a `T`, otherwise whatever the front's
    /// own composite view yields, otherwise `None`.
    #[must_use]
    pub fn extract<T>(&self) -> Option<&T>
    where
        T: StdError + 'static,
    {
        self.view().extract()
    }

    /// Produces the next layer of the traversal.
    ///
    /// Peels one layer off the front while keeping the back in reserve.
    /// Once the front has nothing left, the back itself is returned.
    #[must_use]
    pub fn next_layer(&self) -> Layer<'_> {
        self.view().next_layer()
    }
}

impl Display for Composite {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.front, self.back)
    }
}

impl StdError for Composite {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.back)
    }
}
