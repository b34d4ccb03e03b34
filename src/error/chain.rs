//! Generic traversal over error chains that may contain composites.
//!
//! `std::error::Error::source` only hands out borrowed references, so it
//! cannot produce the "deeper front, same back" pairing a composite needs
//! while unwrapping. This module walks a borrowed cursor ([`Layer`]) instead
//! and provides the identity, value and type searches on top of it.
//!
//! Traversal order is outer to inner, depth first: the front of a composite
//! and everything beneath it, then the back and everything beneath it.

use std::{error::Error as StdError, iter::FusedIterator, ptr};

use crate::error::composite::{Composite, SharedError};

/// Borrowed reference to any error in a chain.
pub type ErrorRef<'a> = &'a (dyn StdError + 'static);

/// Follows shared handles down to the error they point at.
///
/// A wrapper whose `source()` returns its `Arc` field exposes the `Arc`
/// itself as the error; this sees through it.
fn resolve(error: ErrorRef<'_>) -> ErrorRef<'_> {
    let mut current = error;
    while let Some(shared) = current.downcast_ref::<SharedError>() {
        current = &**shared;
    }
    current
}

/// Object identity of `candidate` and `target`, type included.
///
/// A concrete target must downcast from the candidate and sit at the same
/// address. A [`SharedError`] target is the handle's own value: same address
/// and same vtable, as every clone of the handle carries.
fn same<E>(candidate: ErrorRef<'_>, target: &E) -> bool
where
    E: StdError + 'static,
{
    let candidate = resolve(candidate);
    match (target as ErrorRef<'_>).downcast_ref::<SharedError>() {
        Some(handle) => ptr::eq(
            candidate as *const dyn StdError,
            resolve(&**handle) as *const dyn StdError,
        ),
        None => candidate
            .downcast_ref::<E>()
            .is_some_and(|found| ptr::eq(found, target)),
    }
}

/// Whether `target` is `composite` itself, or a handle to it.
fn same_composite<E>(composite: &Composite, target: &E) -> bool
where
    E: StdError + 'static,
{
    resolve(target)
        .downcast_ref::<Composite>()
        .is_some_and(|found| ptr::eq(found, composite))
}

/// One position in a traversal.
#[derive(Debug, Clone)]
pub enum Layer<'a> {
    /// An ordinary error; its next layer is its `source()`.
    Single(ErrorRef<'a>),
    /// A composite, or a deeper front layer still paired with its back.
    Stacked(Stack<'a>),
}

/// Borrowed composite view: a front layer over a back error.
#[derive(Debug, Clone)]
pub struct Stack<'a> {
    /// The real composite, when this view is one rather than a derived pairing.
    node: Option<&'a Composite>,
    front: Box<Layer<'a>>,
    back: ErrorRef<'a>,
}

impl<'a> Layer<'a> {
    /// Lifts an error into a layer, opening composites into stacked views.
    #[must_use]
    pub fn of(error: ErrorRef<'a>) -> Self {
        let error = resolve(error);
        match error.downcast_ref::<Composite>() {
            Some(composite) => Layer::Stacked(composite.view()),
            None => Layer::Single(error),
        }
    }

    /// The outermost concrete error visible at this layer.
    #[must_use]
    pub fn head(&self) -> ErrorRef<'a> {
        match *self {
            Layer::Single(error) => error,
            Layer::Stacked(ref stack) => stack.front.head(),
        }
    }

    /// The composite this layer stands for, if it is a real one.
    #[must_use]
    pub fn composite(&self) -> Option<&'a Composite> {
        match self {
            Layer::Single(_) => None,
            Layer::Stacked(stack) => stack.node,
        }
    }

    /// Identity test for this layer alone, including a composite's front.
    #[must_use]
    pub fn matches<E>(&self, target: &E) -> bool
    where
        E: StdError + 'static,
    {
        match *self {
            Layer::Single(error) => same(error, target),
            Layer::Stacked(ref stack) => {
                stack
                    .node
                    .is_some_and(|composite| same_composite(composite, target))
                    || stack.matches(target)
            }
        }
    }

    /// Value-equality test for this layer alone.
    #[must_use]
    pub fn matches_value<E>(&self, target: &E) -> bool
    where
        E: StdError + PartialEq + 'static,
    {
        match *self {
            Layer::Single(error) => error.downcast_ref::<E>() == Some(target),
            Layer::Stacked(ref stack) => {
                stack.node.and_then(|composite| {
                    (composite as ErrorRef<'a>).downcast_ref::<E>()
                }) == Some(target)
                    || stack.matches_value(target)
            }
        }
    }

    /// Type extraction for this layer alone.
    #[must_use]
    pub fn extract<T>(&self) -> Option<&'a T>
    where
        T: StdError + 'static,
    {
        match *self {
            Layer::Single(error) => error.downcast_ref::<T>(),
            Layer::Stacked(ref stack) => stack
                .node
                .and_then(|composite| (composite as ErrorRef<'a>).downcast_ref::<T>())
                .or_else(|| stack.extract()),
        }
    }

    /// Single step down the chain.
    ///
    /// # Returns
    ///
    /// The next layer, or `None` when the chain ends here.
    #[must_use]
    pub fn next_layer(self) -> Option<Layer<'a>> {
        match self {
            Layer::Single(error) => error.source().map(Layer::of),
            Layer::Stacked(stack) => Some(stack.next_layer()),
        }
    }
}

impl<'a> Stack<'a> {
    pub(crate) fn new(node: Option<&'a Composite>, front: Layer<'a>, back: ErrorRef<'a>) -> Self {
        Self {
            node,
            front: Box::new(front),
            back: resolve(back),
        }
    }

    /// The front layer.
    #[must_use]
    pub fn front(&self) -> &Layer<'a> {
        &self.front
    }

    /// The back error, held in reserve until the front is exhausted.
    #[must_use]
    pub fn back(&self) -> ErrorRef<'a> {
        self.back
    }

    /// Whether the front represents `target`. Never looks at the back.
    #[must_use]
    pub fn matches<E>(&self, target: &E) -> bool
    where
        E: StdError + 'static,
    {
        self.front.matches(target)
    }

    /// Whether the front equals `target` by value. Never looks at the back.
    #[must_use]
    pub fn matches_value<E>(&self, target: &E) -> bool
    where
        E: StdError + PartialEq + 'static,
    {
        self.front.matches_value(target)
    }

    /// The front as `T`. Never looks at the back.
    #[must_use]
    pub fn extract<T>(&self) -> Option<&'a T>
    where
        T: StdError + 'static,
    {
        self.front.extract()
    }

    /// Peels the front one layer, or hands off to the back.
    #[must_use]
    pub fn next_layer(self) -> Layer<'a> {
        let Stack { front, back, .. } = self;
        match (*front).next_layer() {
            Some(deeper) => Layer::Stacked(Stack::new(None, deeper, back)),
            None => Layer::of(back),
        }
    }
}

/// Iterator over every layer of a chain, outermost first.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<Layer<'a>>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = Layer<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.clone().next_layer();
        Some(current)
    }
}

impl FusedIterator for Chain<'_> {}

/// Walks every layer reachable from `error`, starting with `error` itself.
#[must_use]
pub fn chain(error: ErrorRef<'_>) -> Chain<'_> {
    Chain {
        next: Some(Layer::of(error)),
    }
}

/// The layer directly beneath `error`, if any.
#[must_use]
pub fn next_layer(error: ErrorRef<'_>) -> Option<Layer<'_>> {
    Layer::of(error).next_layer()
}

/// Reports whether `target` itself appears anywhere in the chain of `error`.
///
/// Comparison is by object identity and type, so `target` must be the very
/// instance that was stacked or wrapped: either a reference to the concrete
/// value, or a clone of the same [`SharedError`] handle.
///
/// # Arguments
///
/// * `error` - The error whose chain is searched.
/// * `target` - The instance to look for.
///
/// # Returns
///
/// `true` if any layer represents `target`.
#[must_use]
pub fn is<E>(error: ErrorRef<'_>, target: &E) -> bool
where
    E: StdError + 'static,
{
    chain(error).any(|layer| layer.matches(target))
}

/// Reports whether an error equal to `target` appears in the chain.
///
/// Types without `PartialEq` cannot be searched this way; use [`is`].
#[must_use]
pub fn is_value<E>(error: ErrorRef<'_>, target: &E) -> bool
where
    E: StdError + PartialEq + 'static,
{
    chain(error).any(|layer| layer.matches_value(target))
}

/// Finds the first error of type `T` in the chain.
#[must_use]
pub fn find<T>(error: ErrorRef<'_>) -> Option<&T>
where
    T: StdError + 'static,
{
    chain(error).find_map(|layer| layer.extract::<T>())
}

#[cfg(test)]
mod tests {
    use std::{
        error::Error as StdError,
        fmt::{Display, Formatter, Result as FmtResult},
        io::{Error as IoError, ErrorKind},
        sync::Arc,
    };

    use thiserror::Error;

    use crate::error::{
        chain::{Layer, chain, find, is, is_value, next_layer},
        composite::{Composite, SharedError, with},
        marker::{Marker, shared, wrap},
    };

    /// Wrapper whose `source()` exposes the `Arc` handle rather than its target.
    #[derive(Error, Debug)]
    #[error("handle: {inner}")]
    struct HandleWrapper {
        #[source]
        inner: SharedError,
    }

    #[derive(Error, Debug)]
    #[error("inner: {0}")]
    struct Inner(String);

    /// Single-field wrapper, so `inner` sits at the wrapper's own address.
    #[derive(Error, Debug)]
    #[error("outer")]
    struct Outer {
        #[source]
        inner: Inner,
    }

    #[derive(Debug)]
    struct Leaf;

    impl Display for Leaf {
        fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
            write!(f, "leaf")
        }
    }

    impl StdError for Leaf {}

    fn combine(back: &SharedError, front: &SharedError) -> SharedError {
        with(Some(back.clone()), Some(front.clone())).unwrap()
    }

    fn heads(error: &SharedError) -> Vec<String> {
        chain(&**error)
            .map(|layer| layer.head().to_string())
            .collect()
    }

    #[test]
    fn test_chain_of_plain_error_follows_source() {
        let error = wrap("outer", wrap("middle", shared(Marker::new("root"))));
        assert_eq!(heads(&error), vec!["outer: middle: root", "middle: root", "root"]);
    }

    #[test]
    fn test_chain_visits_front_then_back() {
        let front = wrap("f0", wrap("f1", shared(Marker::new("f2"))));
        let back = wrap("b0", shared(Marker::new("b1")));
        let combined = combine(&back, &front);

        assert_eq!(
            heads(&combined),
            vec!["f0: f1: f2", "f1: f2", "f2", "b0: b1", "b1"]
        );
    }

    #[test]
    fn test_chain_flattens_nested_front_composite() {
        let inner = combine(&shared(Marker::new("h0")), &wrap("g0", shared(Marker::new("g1"))));
        let combined = combine(&shared(Marker::new("b0")), &inner);

        assert_eq!(heads(&combined), vec!["g0: g1", "g1", "h0", "b0"]);
    }

    #[test]
    fn test_chain_length_is_sum_of_sides() {
        let front = wrap("a", wrap("b", shared(Marker::new("c"))));
        let back = wrap("d", shared(Marker::new("e")));
        let combined = combine(&back, &front);

        let front_len = chain(&*front).count();
        let back_len = chain(&*back).count();
        assert_eq!(chain(&*combined).count(), front_len + back_len);
    }

    #[test]
    fn test_next_layer_single_step() {
        let root = shared(Marker::new("root"));
        assert!(next_layer(&*root).is_none());

        let wrapped = wrap("ctx", root.clone());
        let next = next_layer(&*wrapped).unwrap();
        assert!(next.matches(&root));
    }

    #[test]
    fn test_is_requires_same_type_at_shared_address() {
        let outer = Outer {
            inner: Inner("disk".to_string()),
        };

        assert!(!is(&outer.inner, &outer));
        assert!(is(&outer, &outer.inner));
        assert!(is(&outer, &outer));
    }

    #[test]
    fn test_is_with_concrete_reference() {
        let combined = combine(&shared(Leaf), &shared(Marker::new("front")));
        let outer = wrap("ctx", combined.clone());
        let composite = combined.downcast_ref::<Composite>().unwrap();
        let marker = composite.front().downcast_ref::<Marker>().unwrap();

        assert!(is(&*outer, marker));
        assert!(is(&*outer, composite));
        assert!(!is(&*outer, &Marker::new("front")));
    }

    #[test]
    fn test_is_finds_composite_node_itself() {
        let combined = combine(&shared(Marker::new("back")), &shared(Marker::new("front")));
        let outer = wrap("ctx", combined.clone());

        assert!(is(&*outer, &combined));
    }

    #[test]
    fn test_is_rejects_unrelated_instance() {
        let combined = combine(&shared(Marker::new("back")), &shared(Marker::new("front")));
        let stranger = shared(Marker::new("front"));

        assert!(!is(&*combined, &stranger));
        assert!(is_value(&*combined, &Marker::new("front")));
    }

    #[test]
    fn test_is_value_searches_back() {
        let back = wrap("loading", shared(Marker::new("cause")));
        let combined = combine(&back, &shared(IoError::new(ErrorKind::NotFound, "missing")));

        assert!(is_value(&*combined, &Marker::new("cause")));
        assert!(!is_value(&*combined, &Marker::new("absent")));
    }

    #[test]
    fn test_find_reaches_back_chain() {
        let back = wrap("reading config", shared(IoError::new(ErrorKind::NotFound, "gone")));
        let combined = combine(&back, &shared(Marker::new("front")));

        let io = find::<IoError>(&*combined).unwrap();
        assert_eq!(io.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_find_returns_first_match() {
        let combined = combine(&shared(Marker::new("back")), &shared(Marker::new("front")));
        let marker = find::<Marker>(&*combined).unwrap();
        assert_eq!(marker.to_string(), "front");
    }

    #[test]
    fn test_find_composite_type() {
        let combined = combine(&shared(Leaf), &shared(Marker::new("front")));
        let outer = wrap("ctx", combined);

        let composite = find::<Composite>(&*outer).unwrap();
        assert_eq!(composite.to_string(), "front: leaf");
        assert!(find::<Leaf>(&*outer).is_some());
    }

    #[test]
    fn test_arc_source_is_seen_through() {
        let marker = shared(Marker::new("flag"));
        let combined = combine(&shared(Leaf), &marker);
        let wrapper: SharedError = Arc::new(HandleWrapper { inner: combined });

        assert!(is(&*wrapper, &marker));
        assert!(find::<Leaf>(&*wrapper).is_some());
        assert_eq!(chain(&*wrapper).count(), 3);
    }

    #[test]
    fn test_layer_composite_only_for_real_nodes() {
        let combined = combine(&shared(Leaf), &wrap("ctx", shared(Marker::new("flag"))));
        let layers: Vec<Layer<'_>> = chain(&*combined).collect();

        assert!(layers[0].composite().is_some());
        assert!(layers[1].composite().is_none());
        assert!(layers[2].composite().is_none());
    }
}
