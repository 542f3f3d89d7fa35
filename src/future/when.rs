use std::mem;
use std::pin::Pin;

use futures_core::ready;
use kv_log_macro::trace;

use crate::future::{
    normalize, settle_all, ArgumentError, Future, Promise, SettleAll, Settled, Source,
};
use crate::task::{Context, Poll};

/// Waits for every source to settle, then fulfills with `()`.
///
/// Individual failures are ignored: the returned promise never rejects. Use [`when_with`] to
/// inspect the outcomes.
///
/// # Errors
///
/// Returns [`ArgumentError`] if `sources` is empty.
///
/// [`when_with`]: fn.when_with.html
/// [`ArgumentError`]: struct.ArgumentError.html
///
/// # Examples
///
/// ```
/// # async_when::task::block_on(async {
/// #
/// use async_when::future::{self, Source};
///
/// let done = future::when(vec![Source::value(5), Source::error("x")]).unwrap();
/// assert_eq!(done.await, Ok(()));
/// #
/// # })
/// ```
pub fn when<T, E, I>(sources: I) -> Result<Promise<(), E>, ArgumentError>
where
    I: IntoIterator<Item = Source<T, E>>,
    T: Send + 'static,
    E: Send + 'static,
{
    when_with(sources, |_, _| Ok::<_, E>(Source::Value(())))
}

/// Waits for every source to settle, then lets `finalize` decide the outcome.
///
/// `finalize` runs exactly once, after the last source has settled, with the fulfillment values
/// and rejection errors laid out by source position. What it returns decides the combined
/// promise:
///
/// * `Ok(Source::Value(v))` fulfills it with `v`,
/// * `Ok(Source::Promise(p))` or an initiator makes it adopt that promise's outcome,
/// * `Ok(Source::Error(e))` or `Err(e)` rejects it with `e`.
///
/// # Errors
///
/// Returns [`ArgumentError`] if `sources` is empty. Nothing is normalized in that case.
///
/// [`ArgumentError`]: struct.ArgumentError.html
///
/// # Examples
///
/// ```
/// # async_when::task::block_on(async {
/// #
/// use async_when::future::{self, Promise, Source};
///
/// let failed = future::when_with(
///     vec![Source::value(1), Source::Promise(Promise::rejected("boom"))],
///     |_results, errors| match errors.into_iter().flatten().next() {
///         Some(error) => Err(error),
///         None => Ok(Source::value("all good")),
///     },
/// )
/// .unwrap();
///
/// assert_eq!(failed.await, Err("boom"));
/// #
/// # })
/// ```
pub fn when_with<T, E, R, X, I, F>(sources: I, finalize: F) -> Result<Promise<R, X>, ArgumentError>
where
    I: IntoIterator<Item = Source<T, E>>,
    T: Send + 'static,
    E: Send + 'static,
    R: Send + 'static,
    X: Send + 'static,
    F: FnOnce(Vec<Option<T>>, Vec<Option<E>>) -> Result<Source<R, X>, X> + Send + 'static,
{
    let settle = settle_all(sources)?;
    Ok(Promise::from_future(Finalize::Settling { settle, finalize }))
}

/// Runs the finalization callback once the aggregation has settled, then adopts its outcome.
enum Finalize<T, E, F, R, X> {
    Settling { settle: SettleAll<T, E>, finalize: F },
    Adopting(Promise<R, X>),
    Done,
}

impl<T, E, F, R, X> Unpin for Finalize<T, E, F, R, X> {}

impl<T, E, F, R, X> Future for Finalize<T, E, F, R, X>
where
    F: FnOnce(Vec<Option<T>>, Vec<Option<E>>) -> Result<Source<R, X>, X>,
{
    type Output = Result<R, X>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        loop {
            match this {
                Finalize::Settling { settle, .. } => {
                    let settled = ready!(Pin::new(settle).poll(cx));
                    let finalize = match mem::replace(this, Finalize::Done) {
                        Finalize::Settling { finalize, .. } => finalize,
                        _ => unreachable!(),
                    };

                    trace!("when finalize", {
                        fulfilled: settled.fulfilled() as u64,
                        rejected: settled.rejected() as u64,
                    });

                    let Settled { results, errors } = settled;
                    match finalize(results, errors) {
                        Ok(source) => *this = Finalize::Adopting(normalize(source)),
                        Err(error) => return Poll::Ready(Err(error)),
                    }
                }
                Finalize::Adopting(promise) => {
                    let outcome = ready!(Pin::new(promise).poll(cx));
                    *this = Finalize::Done;
                    return Poll::Ready(outcome);
                }
                Finalize::Done => panic!("`Finalize` polled after completion"),
            }
        }
    }
}
