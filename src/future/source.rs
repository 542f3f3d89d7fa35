use std::fmt;

use crate::future::{Future, Promise, Reject, Resolve};

/// An input that can be turned into a [`Promise`].
///
/// [`normalize`] accepts any of these and produces a promise. The error and value cases are
/// separate variants, so a value is never inspected to decide whether it is an error.
///
/// [`Promise`]: struct.Promise.html
/// [`normalize`]: fn.normalize.html
pub enum Source<T, E> {
    /// A closure run once with the completion handles of a new promise.
    Initiator(Box<dyn FnOnce(Resolve<T, E>, Reject<T, E>) + Send + 'static>),

    /// An error the promise is rejected with.
    Error(E),

    /// A value the promise is fulfilled with.
    Value(T),

    /// A promise that is used as is.
    Promise(Promise<T, E>),
}

impl<T, E> Source<T, E> {
    /// Creates a source from an initiator closure.
    pub fn initiator<F>(initiator: F) -> Source<T, E>
    where
        F: FnOnce(Resolve<T, E>, Reject<T, E>) + Send + 'static,
    {
        Source::Initiator(Box::new(initiator))
    }

    /// Creates a source that fulfills with `value`.
    pub fn value(value: T) -> Source<T, E> {
        Source::Value(value)
    }

    /// Creates a source that rejects with `error`.
    pub fn error(error: E) -> Source<T, E> {
        Source::Error(error)
    }

    /// Creates a source from a fallible future.
    pub fn from_future<F>(future: F) -> Source<T, E>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: 'static,
        E: 'static,
    {
        Source::Promise(Promise::from_future(future))
    }
}

impl<T, E> From<Promise<T, E>> for Source<T, E> {
    fn from(promise: Promise<T, E>) -> Source<T, E> {
        Source::Promise(promise)
    }
}

impl<T, E> From<Result<T, E>> for Source<T, E> {
    fn from(outcome: Result<T, E>) -> Source<T, E> {
        match outcome {
            Ok(value) => Source::Value(value),
            Err(error) => Source::Error(error),
        }
    }
}

impl<T, E> fmt::Debug for Source<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Initiator(_) => f.write_str("Initiator(..)"),
            Source::Error(_) => f.write_str("Error(..)"),
            Source::Value(_) => f.write_str("Value(..)"),
            Source::Promise(promise) => f.debug_tuple("Promise").field(promise).finish(),
        }
    }
}

/// Converts a source into a promise.
///
/// An initiator runs immediately, before this function returns. A promise is returned
/// unchanged. Normalization never blocks.
///
/// # Examples
///
/// ```
/// # async_when::task::block_on(async {
/// #
/// use async_when::future::{self, Source};
///
/// assert_eq!(future::normalize(Source::<_, ()>::value(5)).await, Ok(5));
/// assert_eq!(future::normalize(Source::<(), _>::error("x")).await, Err("x"));
///
/// let p = future::normalize(Source::<_, ()>::initiator(|resolve, _| {
///     resolve.resolve(7);
/// }));
/// assert_eq!(p.await, Ok(7));
/// #
/// # })
/// ```
pub fn normalize<T, E>(source: Source<T, E>) -> Promise<T, E> {
    match source {
        Source::Initiator(initiator) => Promise::new(initiator),
        Source::Error(error) => Promise::rejected(error),
        Source::Value(value) => Promise::resolved(value),
        Source::Promise(promise) => promise,
    }
}

/// Creates a promise that is already settled with `outcome`.
///
/// # Examples
///
/// ```
/// # async_when::task::block_on(async {
/// #
/// use async_when::future;
///
/// assert_eq!(future::settled(Ok::<_, ()>(1)).await, Ok(1));
/// assert_eq!(future::settled(Err::<(), _>("nope")).await, Err("nope"));
/// #
/// # })
/// ```
pub fn settled<T, E>(outcome: Result<T, E>) -> Promise<T, E> {
    normalize(outcome.into())
}
