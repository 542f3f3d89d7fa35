use std::error::Error;
use std::fmt;
use std::mem;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::Wake;

use kv_log_macro::trace;

use crate::future::{normalize, Future, Promise, Source};
use crate::task::{Context, Poll, Waker};

/// Waits for every source to settle.
///
/// Each source is normalized into a promise, in order. The returned future resolves to a
/// [`Settled`] once all of them have settled, whether they fulfilled or rejected. Slot `i` of
/// the result always belongs to source `i`, no matter in which order the sources settle.
///
/// # Errors
///
/// Returns [`ArgumentError`] if `sources` is empty. Nothing is normalized in that case.
///
/// [`Settled`]: struct.Settled.html
/// [`ArgumentError`]: struct.ArgumentError.html
///
/// # Examples
///
/// ```
/// # async_when::task::block_on(async {
/// #
/// use async_when::future::{self, Source};
///
/// let settled = future::settle_all(vec![Source::value(5), Source::error("x")])
///     .unwrap()
///     .await;
///
/// assert_eq!(settled.results, vec![Some(5), None]);
/// assert_eq!(settled.errors, vec![None, Some("x")]);
/// #
/// # })
/// ```
pub fn settle_all<T, E, I>(sources: I) -> Result<SettleAll<T, E>, ArgumentError>
where
    I: IntoIterator<Item = Source<T, E>>,
{
    let sources: Vec<_> = sources.into_iter().collect();
    if sources.is_empty() {
        return Err(ArgumentError { _private: () });
    }
    Ok(SettleAll::new(sources))
}

/// A future that waits for a set of promises to settle.
///
/// This future is constructed by the [`settle_all`] function.
///
/// [`settle_all`]: fn.settle_all.html
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct SettleAll<T, E> {
    slots: Vec<Slot<T, E>>,
    wakers: Vec<Waker>,
    readiness: Arc<Readiness>,
    results: Vec<Option<T>>,
    errors: Vec<Option<E>>,
    pending: usize,
    done: bool,
}

enum Slot<T, E> {
    Waiting(Promise<T, E>),
    Settled,
}

impl<T, E> Unpin for SettleAll<T, E> {}

impl<T, E> SettleAll<T, E> {
    /// Does not check for an empty source list.
    pub(crate) fn new(sources: Vec<Source<T, E>>) -> SettleAll<T, E> {
        let slots: Vec<_> = sources
            .into_iter()
            .map(|source| Slot::Waiting(normalize(source)))
            .collect();
        let len = slots.len();

        trace!("settle_all", {
            sources: len as u64,
        });

        // Every slot starts out queued so the first poll visits all of them.
        let readiness = Arc::new(Readiness {
            queue: Mutex::new(ReadyQueue {
                indices: (0..len).collect(),
                queued: vec![true; len],
                parent: None,
            }),
        });
        let wakers = (0..len)
            .map(|index| {
                Waker::from(Arc::new(SlotWaker {
                    index,
                    readiness: readiness.clone(),
                }))
            })
            .collect();

        SettleAll {
            slots,
            wakers,
            readiness,
            results: (0..len).map(|_| None).collect(),
            errors: (0..len).map(|_| None).collect(),
            pending: len,
            done: false,
        }
    }

    /// Returns the number of sources that have not settled yet.
    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl<T, E> Future for SettleAll<T, E> {
    type Output = Settled<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;

        if this.done {
            panic!("`SettleAll` polled after completion");
        }

        // Nothing to count down; finish with empty slots right away.
        if this.slots.is_empty() {
            this.done = true;
            return Poll::Ready(Settled::empty());
        }

        let ready = this.readiness.take_ready(cx.waker());

        for index in ready {
            let outcome = match &mut this.slots[index] {
                Slot::Waiting(promise) => {
                    let mut slot_cx = Context::from_waker(&this.wakers[index]);
                    match Pin::new(promise).poll(&mut slot_cx) {
                        Poll::Ready(outcome) => outcome,
                        Poll::Pending => continue,
                    }
                }
                Slot::Settled => continue,
            };

            this.slots[index] = Slot::Settled;
            this.pending -= 1;

            match outcome {
                Ok(value) => {
                    this.results[index] = Some(value);
                    trace!("settle_all slot fulfilled", {
                        index: index as u64,
                        pending: this.pending as u64,
                    });
                }
                Err(error) => {
                    this.errors[index] = Some(error);
                    trace!("settle_all slot rejected", {
                        index: index as u64,
                        pending: this.pending as u64,
                    });
                }
            }
        }

        if this.pending > 0 {
            return Poll::Pending;
        }

        trace!("settle_all completed", {
            sources: this.slots.len() as u64,
        });

        this.done = true;
        Poll::Ready(Settled {
            results: mem::take(&mut this.results),
            errors: mem::take(&mut this.errors),
        })
    }
}

/// Slots whose promise was woken since it was last polled.
struct Readiness {
    queue: Mutex<ReadyQueue>,
}

struct ReadyQueue {
    indices: Vec<usize>,
    queued: Vec<bool>,
    parent: Option<Waker>,
}

impl Readiness {
    fn lock(&self) -> MutexGuard<'_, ReadyQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers the task's waker and drains the queued slot indices.
    ///
    /// Indices are unqueued before their slot is polled, so a wakeup that arrives during the
    /// poll queues the slot again.
    fn take_ready(&self, waker: &Waker) -> Vec<usize> {
        let mut queue = self.lock();

        match &queue.parent {
            Some(parent) if parent.will_wake(waker) => {}
            _ => queue.parent = Some(waker.clone()),
        }

        let ready = mem::take(&mut queue.indices);
        for &index in &ready {
            queue.queued[index] = false;
        }
        ready
    }
}

/// Wakes the aggregation on behalf of a single slot.
struct SlotWaker {
    index: usize,
    readiness: Arc<Readiness>,
}

impl Wake for SlotWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        let parent = {
            let mut queue = self.readiness.lock();
            if !queue.queued[self.index] {
                queue.queued[self.index] = true;
                queue.indices.push(self.index);
            }
            queue.parent.clone()
        };

        if let Some(parent) = parent {
            parent.wake();
        }
    }
}

impl<T, E> fmt::Debug for SettleAll<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettleAll")
            .field("sources", &self.slots.len())
            .field("pending", &self.pending)
            .finish()
    }
}

/// The per-slot outcomes of a [`settle_all`] or [`when`] call.
///
/// For every index exactly one of `results[i]` and `errors[i]` is `Some`.
///
/// [`settle_all`]: fn.settle_all.html
/// [`when`]: fn.when.html
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settled<T, E> {
    /// Fulfillment values, indexed by source position.
    pub results: Vec<Option<T>>,

    /// Rejection errors, indexed by source position.
    pub errors: Vec<Option<E>>,
}

impl<T, E> Settled<T, E> {
    fn empty() -> Settled<T, E> {
        Settled {
            results: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns `true` if there are no slots.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns the number of fulfilled slots.
    pub fn fulfilled(&self) -> usize {
        self.results.iter().filter(|r| r.is_some()).count()
    }

    /// Returns the number of rejected slots.
    pub fn rejected(&self) -> usize {
        self.errors.iter().filter(|e| e.is_some()).count()
    }

    /// Returns the outcome of slot `index`, or `None` if it is out of bounds.
    pub fn get(&self, index: usize) -> Option<Result<&T, &E>> {
        match (self.results.get(index)?, self.errors.get(index)?) {
            (Some(value), _) => Some(Ok(value)),
            (None, Some(error)) => Some(Err(error)),
            (None, None) => None,
        }
    }

    /// Splits into the results and errors vectors.
    pub fn into_parts(self) -> (Vec<Option<T>>, Vec<Option<E>>) {
        (self.results, self.errors)
    }
}

/// The error returned when an aggregation is requested over zero sources.
///
/// This is a programming error and is reported synchronously, not through a rejected promise.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ArgumentError {
    _private: (),
}

impl Error for ArgumentError {}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("at least one source is required")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::future::poll_fn;
    use futures::task::noop_waker;

    use super::*;
    use crate::task;

    #[test]
    fn empty_slots_finish_immediately() {
        let settle = SettleAll::<i32, ()>::new(Vec::new());
        assert_eq!(settle.pending(), 0);

        let settled = task::block_on(settle);
        assert!(settled.is_empty());
        assert_eq!(settled.errors.len(), 0);
    }

    #[test]
    fn slots_are_absent_before_settling() {
        let settle = SettleAll::new(vec![
            Source::<i32, ()>::initiator(|_, _| {}),
            Source::value(1),
        ]);

        assert_eq!(settle.pending(), 2);
        assert!(settle.results.iter().all(Option::is_none));
        assert!(settle.errors.iter().all(Option::is_none));
    }

    #[test]
    fn settled_accessors() {
        let settled = Settled {
            results: vec![Some(1), None],
            errors: vec![None, Some("x")],
        };

        assert_eq!(settled.len(), 2);
        assert_eq!(settled.fulfilled(), 1);
        assert_eq!(settled.rejected(), 1);
        assert_eq!(settled.get(0), Some(Ok(&1)));
        assert_eq!(settled.get(1), Some(Err(&"x")));
        assert_eq!(settled.get(2), None);
    }

    #[test]
    #[should_panic = "`SettleAll` polled after completion"]
    fn polling_after_completion_panics() {
        let mut settle = settle_all(vec![Source::<i32, ()>::value(1)]).unwrap();
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        match Pin::new(&mut settle).poll(&mut cx) {
            Poll::Ready(settled) => assert_eq!(settled.results, vec![Some(1)]),
            Poll::Pending => panic!("ready sources should settle on the first poll"),
        }

        let _ = Pin::new(&mut settle).poll(&mut cx);
    }

    #[test]
    fn only_woken_slots_are_polled_again() {
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();
        let idle = Source::from_future(poll_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Poll::<Result<i32, ()>>::Pending
        }));

        let mut handle = None;
        let deferred = Source::Promise(Promise::new(|resolve, _| handle = Some(resolve)));

        let mut settle = SettleAll::new(vec![idle, deferred]);
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        assert!(Pin::new(&mut settle).poll(&mut cx).is_pending());
        assert_eq!(polls.load(Ordering::SeqCst), 1);

        assert!(handle.unwrap().resolve(2));
        assert!(Pin::new(&mut settle).poll(&mut cx).is_pending());

        // The idle slot was never woken, so it was not polled a second time.
        assert_eq!(polls.load(Ordering::SeqCst), 1);
        assert_eq!(settle.pending(), 1);
        assert_eq!(settle.results, vec![None, Some(2)]);
    }
}
