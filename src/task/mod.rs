//! Types and functions for driving futures.
//!
//! Promises only make progress when something polls them. [`block_on`] is the simplest driver:
//! it runs a future to completion on the current thread, parking it between wakeups.
//!
//! [`block_on`]: fn.block_on.html

#[doc(inline)]
pub use std::task::{Context, Poll, Waker};

pub use block_on::block_on;

mod block_on;
