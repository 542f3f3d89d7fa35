use std::pin::Pin;
use std::time::Duration;

use futures_core::ready;
use futures_timer::Delay;
use kv_log_macro::trace;
use pin_project_lite::pin_project;

use crate::future::{Future, Promise};
use crate::task::{Context, Poll};

/// Creates a promise that settles with `outcome` after `delay` has elapsed.
///
/// The promise never settles earlier than `delay` after this call, but it may settle later.
///
/// # Examples
///
/// ```
/// # async_when::task::block_on(async {
/// #
/// use std::time::{Duration, Instant};
///
/// use async_when::future;
///
/// let start = Instant::now();
/// let done = future::wait(Duration::from_millis(10), Ok::<_, ()>("done"));
///
/// assert_eq!(done.await, Ok("done"));
/// assert!(start.elapsed() >= Duration::from_millis(10));
/// #
/// # })
/// ```
pub fn wait<T, E>(delay: Duration, outcome: Result<T, E>) -> Promise<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    trace!("wait", {
        delay_ms: delay.as_millis() as u64,
    });

    Promise::from_future(WaitFuture {
        delay: Delay::new(delay),
        outcome: Some(outcome),
    })
}

pin_project! {
    struct WaitFuture<T, E> {
        #[pin]
        delay: Delay,
        outcome: Option<Result<T, E>>,
    }
}

impl<T, E> Future for WaitFuture<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        ready!(this.delay.poll(cx));
        Poll::Ready(
            this.outcome
                .take()
                .expect("`WaitFuture` polled after completion"),
        )
    }
}
