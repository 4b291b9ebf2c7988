//! # Term Invariant - Validation Decorators for Rust
//!
//! Term Invariant turns data validation checks into reusable guards. A check
//! is an ordinary function that inspects a dataset and returns an error when
//! the data is invalid. The same check can be called directly, or bound to
//! arguments and applied to any dataset-producing function so that every
//! result is validated before it reaches the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Int64Array, StringArray};
//! use serde_json::json;
//! use term_invariant::prelude::*;
//!
//! fn load_people(ages: Vec<Option<i64>>) -> std::result::Result<Frame, TermError> {
//!     let names: Vec<Option<&str>> = ages.iter().map(|_| Some("someone")).collect();
//!     Frame::try_from_columns(vec![
//!         ("name", Arc::new(StringArray::from(names)) as ArrayRef),
//!         ("age", Arc::new(Int64Array::from(ages)) as ArrayRef),
//!     ])
//! }
//!
//! let checks = term_invariant::registry::builtin();
//! let guarded = checks
//!     .as_decorator("none_missing", CheckArgs::new())?
//!     .apply(load_people)
//!     .with(checks.as_decorator("within_range", CheckArgs::new().arg(json!({"age": [0, 120]})))?);
//!
//! // Valid data is returned unchanged.
//! let frame = guarded.call(vec![Some(31), Some(57)]).unwrap();
//! assert_eq!(frame.num_rows(), 2);
//!
//! // Invalid data is rejected with the function name and the failing cells.
//! let err = guarded.call(vec![Some(31), None]).unwrap_err();
//! let violation = err.as_invariant().unwrap();
//! assert_eq!(violation.to_string(), "Function 'load_people' broke an invariant");
//! assert_eq!(violation.cause().to_string(), "Missing values at [(1, age)]");
//! assert_eq!(violation.input::<Frame>().unwrap().num_rows(), 2);
//! # Ok::<(), TermError>(())
//! ```
//!
//! ## Key Features
//!
//! - **Dual-use checks**: [`core::Check::call`] behaves exactly like the wrapped
//!   function, while [`core::Check::as_decorator`] binds arguments once and
//!   guards any number of functions.
//! - **Invariant violations**: assertion failures raised while checking a
//!   result become [`error::InvariantViolation`]s naming the guarded function,
//!   with the original failure kept as the error source.
//! - **Cell locations**: [`locate::bad_locations`] turns a boolean failure mask
//!   into `(row, column)` pairs for error messages.
//! - **Built-in checks**: [`checks`] covers missing values, shape, uniqueness,
//!   ordering, ranges, allowed sets, patterns and column types over Arrow data.
//! - **Lookup by name**: [`registry::CheckRegistry`] resolves checks from
//!   configuration.
//!
//! ## Architecture
//!
//! - **`core`**: `Check`, `CheckArgs`, `Decorator` and `Guarded`
//! - **`error`**: `TermError`, `InvariantViolation` and `GuardError`
//! - **`table`**: the `Tabular` abstraction, Arrow-backed `Frame` and `FailureMask`
//! - **`locate`**: failure-mask to cell-location conversion
//! - **`checks`**: built-in checks over `Frame`
//! - **`registry`**: name-based check lookup
//! - **`config`** and **`logging`**: guard behaviour and structured logging

pub mod checks;
pub mod config;
pub mod core;
pub mod error;
pub mod locate;
pub mod logging;
pub mod prelude;
pub mod registry;
pub mod table;
