//! Checks, decorators and guarded functions.
//!
//! ## Overview
//!
//! - **[`Check`]**: a validation function plus its display metadata. Callable
//!   directly, or convertible into a decorator.
//! - **[`CheckArgs`]**: the arguments a check receives after the dataset.
//! - **[`Decorator`]**: a check bound to arguments; applying it to a function
//!   produces a [`Guarded`] function.
//! - **[`Guarded`]**: calls its target and validates the result on every call.
//!
//! ## Flow of a guarded call
//!
//! ```text
//! Guarded::call(args)
//!     ├── target(args) ──── Err(e) ──────────────> GuardError::Target(e)
//!     └── Ok(dataset)
//!         ├── check_1(&dataset, &bound_args_1)
//!         ├── check_2(&dataset, &bound_args_2)
//!         │     ├── assertion failure ───────────> GuardError::Invariant
//!         │     └── any other error ─────────────> GuardError::Check
//!         └── all passed ────────────────────────> Ok(dataset)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use term_invariant::core::{Check, CheckArgs};
//! use term_invariant::error::TermError;
//!
//! let sorted = Check::new("sorted", |data: &Vec<i32>, _args: &CheckArgs| {
//!     if data.windows(2).all(|w| w[0] <= w[1]) {
//!         Ok(())
//!     } else {
//!         Err(TermError::assertion("values are not sorted"))
//!     }
//! });
//!
//! fn read_scores() -> Result<Vec<i32>, std::io::Error> {
//!     Ok(vec![3, 1, 2])
//! }
//!
//! let guarded = sorted.decorator().apply(|()| read_scores());
//! let err = guarded.call(()).unwrap_err();
//! assert!(err.is_invariant());
//! ```

pub mod args;
pub mod check;
pub mod decorator;

pub use args::CheckArgs;
pub use check::{Check, CheckFunction};
pub use decorator::{Decorator, Guarded};
