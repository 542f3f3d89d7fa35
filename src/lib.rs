//! Wait for a set of promises to settle and fold their outcomes.
//!
//! This crate normalizes heterogeneous inputs (initiator closures, plain values, errors and
//! existing promises) into a single [`Promise`] type, and provides [`when`], an operator that
//! waits until every input has settled and hands the per-slot results and errors to a
//! finalization callback.
//!
//! Unlike [`join`]-style combinators, a failing input never short-circuits its siblings: its
//! error lands in its own slot and the aggregation keeps waiting for the rest.
//!
//! [`Promise`]: future/struct.Promise.html
//! [`when`]: future/fn.when.html
//! [`join`]: https://docs.rs/futures/0.3/futures/macro.join.html
//!
//! # Examples
//!
//! Sum two promises once both are fulfilled:
//!
//! ```
//! use async_when::future::{self, Promise, Source};
//! use async_when::task;
//!
//! task::block_on(async {
//!     let sources: Vec<Source<i32, ()>> = vec![Source::Promise(Promise::resolved(1)), Source::value(2)];
//!
//!     let sum = future::when_with(sources, |results, _errors| {
//!         let a = results[0].unwrap();
//!         let b = results[1].unwrap();
//!         Ok::<_, ()>(Source::value(a + b))
//!     })
//!     .unwrap();
//!
//!     assert_eq!(sum.await, Ok::<_, ()>(3));
//! })
//! ```
//!
//! # Features
//!
//! Timer-backed helpers ([`wait`] and [`timeout`]) are enabled by the default `timer` Cargo
//! feature:
//!
//! ```toml
//! [dependencies.async-when]
//! version = "0.1"
//! default-features = false
//! features = ["timer"]
//! ```
//!
//! [`wait`]: future/fn.wait.html
//! [`timeout`]: future/fn.timeout.html

#![cfg_attr(feature = "docs", feature(doc_cfg))]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![allow(clippy::module_inception)]
#![doc(test(attr(deny(rust_2018_idioms, warnings))))]
#![doc(test(attr(allow(unused_extern_crates, unused_variables))))]

#[macro_use]
mod utils;

pub mod future;
pub mod prelude;
pub mod task;

mod macros;
