use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use futures_channel::oneshot;

use crate::future::{normalize, Future, Source};
use crate::task::{Context, Poll};

type BoxFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>;

/// A one-shot container for an eventual outcome.
///
/// A promise starts out pending and settles at most once, either fulfilled with a value of
/// type `T` or rejected with an error of type `E`. Awaiting it yields that outcome as a
/// `Result<T, E>`.
///
/// Promises are created with [`Promise::new`] from an initiator, with [`resolved`] and
/// [`rejected`] from a known outcome, or with [`from_future`] from any fallible future.
///
/// [`Promise::new`]: #method.new
/// [`resolved`]: #method.resolved
/// [`rejected`]: #method.rejected
/// [`from_future`]: #method.from_future
///
/// # Examples
///
/// ```
/// # async_when::task::block_on(async {
/// #
/// use async_when::future::Promise;
///
/// let p = Promise::<_, ()>::new(|resolve, _reject| {
///     resolve.resolve("hello");
/// });
///
/// assert_eq!(p.await, Ok("hello"));
/// #
/// # })
/// ```
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Promise<T, E> {
    state: State<T, E>,
}

enum State<T, E> {
    /// Settled at construction.
    Ready(Option<Result<T, E>>),

    /// Waiting on an initiator's completion handles.
    Waiting(oneshot::Receiver<Result<T, E>>),

    /// Driven by an arbitrary future.
    Boxed(BoxFuture<T, E>),

    /// All completion handles were dropped without settling.
    Abandoned,
}

impl<T, E> Unpin for Promise<T, E> {}

impl<T, E> Promise<T, E> {
    /// Creates a promise whose body is `initiator`.
    ///
    /// The initiator runs right away, before this function returns, and receives the two
    /// completion handles. Whichever handle is called first settles the promise; later calls
    /// are ignored. If both handles are dropped without being called, the promise never
    /// settles.
    ///
    /// # Examples
    ///
    /// ```
    /// # async_when::task::block_on(async {
    /// #
    /// use async_when::future::Promise;
    ///
    /// let p = Promise::<(), _>::new(|resolve, reject| {
    ///     reject.reject("first");
    ///     resolve.resolve(());
    /// });
    ///
    /// assert_eq!(p.await, Err("first"));
    /// #
    /// # })
    /// ```
    pub fn new<F>(initiator: F) -> Promise<T, E>
    where
        F: FnOnce(Resolve<T, E>, Reject<T, E>),
    {
        let (sender, receiver) = oneshot::channel();
        let completion = Arc::new(Completion {
            sender: Mutex::new(Some(sender)),
        });

        initiator(
            Resolve {
                completion: completion.clone(),
            },
            Reject { completion },
        );

        Promise {
            state: State::Waiting(receiver),
        }
    }

    /// Creates a promise that is already fulfilled with `value`.
    pub fn resolved(value: T) -> Promise<T, E> {
        Promise {
            state: State::Ready(Some(Ok(value))),
        }
    }

    /// Creates a promise that is already rejected with `error`.
    pub fn rejected(error: E) -> Promise<T, E> {
        Promise {
            state: State::Ready(Some(Err(error))),
        }
    }

    /// Creates a promise that settles with the output of `future`.
    pub fn from_future<F>(future: F) -> Promise<T, E>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: 'static,
        E: 'static,
    {
        Promise {
            state: State::Boxed(Box::pin(future)),
        }
    }

    /// Chains a continuation onto this promise.
    ///
    /// Once this promise settles, `on_fulfilled` or `on_rejected` is called with its outcome.
    /// The returned [`Source`] is normalized and the resulting promise adopts its outcome.
    ///
    /// [`Source`]: enum.Source.html
    ///
    /// # Examples
    ///
    /// ```
    /// # async_when::task::block_on(async {
    /// #
    /// use async_when::future::{Promise, Source};
    ///
    /// let p = Promise::<i32, String>::resolved(2).then(
    ///     |n| Source::value(n * 10),
    ///     |e| Source::<i32, String>::error(e),
    /// );
    ///
    /// assert_eq!(p.await, Ok(20));
    /// #
    /// # })
    /// ```
    pub fn then<R, X, F, G>(self, on_fulfilled: F, on_rejected: G) -> Promise<R, X>
    where
        T: Send + 'static,
        E: Send + 'static,
        R: Send + 'static,
        X: Send + 'static,
        F: FnOnce(T) -> Source<R, X> + Send + 'static,
        G: FnOnce(E) -> Source<R, X> + Send + 'static,
    {
        Promise::from_future(async move {
            let next = match self.await {
                Ok(value) => on_fulfilled(value),
                Err(error) => on_rejected(error),
            };
            normalize(next).await
        })
    }

    /// Handles a rejection, leaving a fulfillment untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// # async_when::task::block_on(async {
    /// #
    /// use async_when::future::{Promise, Source};
    ///
    /// let p = Promise::<usize, &str>::rejected("oops").catch(|e| Source::<_, ()>::value(e.len()));
    ///
    /// assert_eq!(p.await, Ok(4));
    /// #
    /// # })
    /// ```
    pub fn catch<X, G>(self, on_rejected: G) -> Promise<T, X>
    where
        T: Send + 'static,
        E: Send + 'static,
        X: Send + 'static,
        G: FnOnce(E) -> Source<T, X> + Send + 'static,
    {
        self.then(Source::value, on_rejected)
    }

    /// Alias for [`catch`].
    ///
    /// [`catch`]: #method.catch
    pub fn fail<X, G>(self, on_rejected: G) -> Promise<T, X>
    where
        T: Send + 'static,
        E: Send + 'static,
        X: Send + 'static,
        G: FnOnce(E) -> Source<T, X> + Send + 'static,
    {
        self.catch(on_rejected)
    }

    #[cfg(test)]
    pub(crate) fn boxed_addr(&self) -> Option<*const ()> {
        match &self.state {
            State::Boxed(future) => Some(future.as_ref().get_ref() as *const _ as *const ()),
            _ => None,
        }
    }
}

impl<T, E> Future for Promise<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;

        match &mut this.state {
            State::Ready(outcome) => {
                Poll::Ready(outcome.take().expect("`Promise` polled after completion"))
            }
            State::Waiting(receiver) => match Pin::new(receiver).poll(cx) {
                Poll::Ready(Ok(outcome)) => {
                    this.state = State::Ready(None);
                    Poll::Ready(outcome)
                }
                Poll::Ready(Err(oneshot::Canceled)) => {
                    log::warn!("promise initiator dropped its completion handles without settling");
                    this.state = State::Abandoned;
                    Poll::Pending
                }
                Poll::Pending => Poll::Pending,
            },
            State::Boxed(future) => future.as_mut().poll(cx),
            State::Abandoned => Poll::Pending,
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Ready(Some(_)) => "settled",
            State::Ready(None) => "taken",
            State::Waiting(_) | State::Boxed(_) => "pending",
            State::Abandoned => "abandoned",
        };
        f.debug_struct("Promise").field("state", &state).finish()
    }
}

/// The completion slot shared by a `Resolve`/`Reject` pair.
struct Completion<T, E> {
    sender: Mutex<Option<oneshot::Sender<Result<T, E>>>>,
}

impl<T, E> Completion<T, E> {
    fn settle(&self, outcome: Result<T, E>) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(sender) => {
                // The promise may already be gone; settling still counts.
                let _ = sender.send(outcome);
                true
            }
            None => false,
        }
    }

    fn is_settled(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// The fulfilling half of a promise's completion handles.
///
/// Created by [`Promise::new`] and handed to the initiator.
///
/// [`Promise::new`]: struct.Promise.html#method.new
pub struct Resolve<T, E> {
    completion: Arc<Completion<T, E>>,
}

impl<T, E> Resolve<T, E> {
    /// Fulfills the promise with `value`.
    ///
    /// Returns `false` if the promise was already settled, in which case `value` is dropped.
    pub fn resolve(&self, value: T) -> bool {
        self.completion.settle(Ok(value))
    }

    /// Returns `true` if the promise has been settled through either handle.
    pub fn is_settled(&self) -> bool {
        self.completion.is_settled()
    }
}

impl<T, E> Clone for Resolve<T, E> {
    fn clone(&self) -> Self {
        Resolve {
            completion: self.completion.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Resolve<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolve")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// The rejecting half of a promise's completion handles.
///
/// Created by [`Promise::new`] and handed to the initiator.
///
/// [`Promise::new`]: struct.Promise.html#method.new
pub struct Reject<T, E> {
    completion: Arc<Completion<T, E>>,
}

impl<T, E> Reject<T, E> {
    /// Rejects the promise with `error`.
    ///
    /// Returns `false` if the promise was already settled, in which case `error` is dropped.
    pub fn reject(&self, error: E) -> bool {
        self.completion.settle(Err(error))
    }

    /// Returns `true` if the promise has been settled through either handle.
    pub fn is_settled(&self) -> bool {
        self.completion.is_settled()
    }
}

impl<T, E> Clone for Reject<T, E> {
    fn clone(&self) -> Self {
        Reject {
            completion: self.completion.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Reject<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reject")
            .field("settled", &self.is_settled())
            .finish()
    }
}
