//! Promises and the settle-all aggregation.
//!
//! Every input handed to [`when`] is first turned into a [`Promise`] by [`normalize`]:
//!
//! * an initiator closure is run immediately with a [`Resolve`]/[`Reject`] pair,
//! * a plain value becomes an already fulfilled promise,
//! * an error becomes an already rejected promise,
//! * an existing promise is used as is.
//!
//! [`when`] then waits until every promise has settled. Failures never short-circuit: each
//! outcome is stored in its own slot, and only the finalization callback decides whether the
//! combined promise fulfills or rejects.
//!
//! [`when`]: fn.when.html
//! [`Promise`]: struct.Promise.html
//! [`normalize`]: fn.normalize.html
//! [`Resolve`]: struct.Resolve.html
//! [`Reject`]: struct.Reject.html

#[doc(inline)]
pub use std::future::Future;

pub use promise::{Promise, Reject, Resolve};
pub use settle_all::{settle_all, ArgumentError, SettleAll, Settled};
pub use source::{normalize, settled, Source};
pub use when::{when, when_with};

mod promise;
mod settle_all;
mod source;
mod when;

cfg_timer! {
    pub use timeout::{timeout, TimeoutError};
    pub use wait::wait;

    mod timeout;
    mod wait;
}
