//! The async-when prelude.
//!
//! The prelude re-exports the types most programs need to build and await promises.
//!
//! # Examples
//!
//! Import the prelude with:
//!
//! ```
//! # #[allow(unused_imports)]
//! use async_when::prelude::*;
//! ```

#[doc(no_inline)]
pub use crate::future::Future;
#[doc(no_inline)]
pub use crate::future::{Promise, Source};
#[doc(no_inline)]
pub use crate::when;
