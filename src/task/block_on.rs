use std::cell::Cell;
use std::mem::{self, ManuallyDrop};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{RawWaker, RawWakerVTable};

use crossbeam_utils::sync::{Parker, Unparker};
use kv_log_macro::trace;

use crate::future::Future;
use crate::task::{Context, Poll, Waker};

/// Blocks the current thread on a future.
///
/// The future is polled on the calling thread, which is parked whenever the future is pending
/// and unparked when its waker is woken. Calls can be nested; each one parks on its own
/// parker. If the future panics, the panic propagates to the caller.
///
/// # Examples
///
/// ```
/// use async_when::future::Promise;
/// use async_when::task;
///
/// let value = task::block_on(Promise::<_, ()>::resolved(3));
/// assert_eq!(value, Ok(3));
/// ```
pub fn block_on<F, T>(future: F) -> T
where
    F: Future<Output = T>,
{
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    let block_id = NEXT_ID.fetch_add(1, Ordering::Relaxed);

    trace!("block_on", {
        block_id: block_id,
    });

    let out = block(future);

    trace!("block_on completed", {
        block_id: block_id,
    });

    out
}

fn block<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    thread_local! {
        // May hold a pre-allocated parker that can be reused for efficiency.
        //
        // Note that each invocation of `block` needs its own parker. In particular, if `block`
        // recursively calls itself, we must make sure that each recursive call uses a distinct
        // parker instance.
        static CACHE: Cell<Option<(Parker, Arc<Unparker>)>> = Cell::new(None);
    }

    pin_utils::pin_mut!(f);

    CACHE.with(|cache| {
        // Reuse a cached parker or create a new one for this invocation of `block`.
        let (parker, unparker) = cache.take().unwrap_or_else(|| {
            let parker = Parker::new();
            let unparker = Arc::new(parker.unparker().clone());
            (parker, unparker)
        });

        let ptr = Arc::as_ptr(&unparker) as *const ();
        let vt = vtable();

        let waker = unsafe { ManuallyDrop::new(Waker::from_raw(RawWaker::new(ptr, vt))) };
        let cx = &mut Context::from_waker(&waker);

        loop {
            if let Poll::Ready(t) = f.as_mut().poll(cx) {
                // Save the parker for the next invocation of `block`.
                cache.set(Some((parker, unparker)));
                return t;
            }
            parker.park();
        }
    })
}

fn vtable() -> &'static RawWakerVTable {
    unsafe fn clone_raw(ptr: *const ()) -> RawWaker {
        let arc = ManuallyDrop::new(Arc::from_raw(ptr as *const Unparker));
        mem::forget(arc.clone());
        RawWaker::new(ptr, vtable())
    }

    unsafe fn wake_raw(ptr: *const ()) {
        let arc = Arc::from_raw(ptr as *const Unparker);
        arc.unpark();
    }

    unsafe fn wake_by_ref_raw(ptr: *const ()) {
        let arc = ManuallyDrop::new(Arc::from_raw(ptr as *const Unparker));
        arc.unpark();
    }

    unsafe fn drop_raw(ptr: *const ()) {
        drop(Arc::from_raw(ptr as *const Unparker))
    }

    &RawWakerVTable::new(clone_raw, wake_raw, wake_by_ref_raw, drop_raw)
}
