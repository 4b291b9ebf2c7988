//! Prelude for commonly used types and traits in term-invariant.

pub use crate::config::GuardConfig;
pub use crate::core::{Check, CheckArgs, Decorator, Guarded};
pub use crate::error::{
    AssertionFailure, ErrorContext, GuardError, InvariantViolation, Result, TermError,
};
pub use crate::locate::{bad_locations, format_locations};
pub use crate::logging::LogConfig;
pub use crate::registry::CheckRegistry;
pub use crate::table::{FailureMask, Frame, IndexKey, Tabular};
