//! Built-in checks over [`Frame`] datasets.
//!
//! Every check here is an ordinary check function, usable three ways:
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Int64Array};
//! use term_invariant::checks;
//! use term_invariant::core::CheckArgs;
//! use term_invariant::registry;
//! use term_invariant::table::Frame;
//!
//! let frame = Frame::try_from_columns(vec![
//!     ("id", Arc::new(Int64Array::from(vec![Some(1), None])) as ArrayRef),
//! ])
//! .unwrap();
//!
//! // 1. as a plain function
//! assert!(checks::none_missing(&frame, &CheckArgs::new()).is_err());
//!
//! // 2. wrapped as a `Check`, called directly
//! let check = registry::builtin().get("none_missing").unwrap();
//! assert!(check.call(&frame, &CheckArgs::new()).is_err());
//!
//! // 3. as a decorator on a function producing frames
//! let load = |f: Frame| -> Result<Frame, std::io::Error> { Ok(f) };
//! let guarded = check.decorator().apply_named("load", load);
//! assert!(guarded.call(frame).is_err());
//! ```
//!
//! | check | parameters |
//! |---|---|
//! | [`none_missing`] | `columns=None` |
//! | [`is_shape`] | `shape` |
//! | [`unique_index`] | |
//! | [`unique`] | `columns=None` |
//! | [`is_monotonic`] | `columns=None, increasing=true, strict=false` |
//! | [`within_range`] | `items` |
//! | [`within_set`] | `items` |
//! | [`matches_pattern`] | `items` |
//! | [`has_dtypes`] | `items` |

use crate::check;
use crate::core::Check;
use crate::error::{AssertionFailure, Result};
use crate::locate::{bad_locations, format_locations, render_locations, DEFAULT_MAX_REPORTED_LOCATIONS};
use crate::table::{FailureMask, Frame};

mod structure;
mod values;
mod verify;

pub use structure::{is_monotonic, is_shape, none_missing, unique, unique_index};
pub use values::{has_dtypes, matches_pattern, within_range, within_set};
pub use verify::{verify_all, verify_any};

/// Every built-in check, wrapped with its metadata.
pub fn all() -> Vec<Check<Frame>> {
    vec![
        check!(none_missing, "(df, columns=None)")
            .with_doc("Asserts that there are no missing values (nulls) in the selected columns."),
        check!(is_shape, "(df, shape)")
            .with_doc("Asserts the frame has the given (rows, columns); null or -1 matches any size."),
        check!(unique_index, "(df)").with_doc("Asserts that the row index has no duplicate keys."),
        check!(unique, "(df, columns=None)")
            .with_doc("Asserts that no non-null value repeats within each selected column."),
        check!(is_monotonic, "(df, columns=None, increasing=True, strict=False)")
            .with_doc("Asserts that each selected column is ordered."),
        check!(within_range, "(df, items)")
            .with_doc("Asserts that numeric values lie within [low, high] per column."),
        check!(within_set, "(df, items)")
            .with_doc("Asserts that values belong to an allowed set per column."),
        check!(matches_pattern, "(df, items)")
            .with_doc("Asserts that non-null values match a regular expression per column."),
        check!(has_dtypes, "(df, items)")
            .with_doc("Asserts that columns have the given Arrow data types."),
    ]
}

/// Fails with the located cells when `mask` marks any of them.
fn fail_on_mask(frame: &Frame, mask: &FailureMask, what: &str) -> Result<()> {
    if !mask.any() {
        return Ok(());
    }
    let locations = bad_locations(frame, mask)?;
    Err(AssertionFailure::new(format!(
        "{what} at {}",
        format_locations(&locations, DEFAULT_MAX_REPORTED_LOCATIONS)
    ))
    .with_locations(render_locations(&locations))
    .into())
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_checks_have_unique_names_and_metadata() {
        let checks = all();
        let names: HashSet<&str> = checks.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), checks.len());
        for check in &checks {
            let module = check.module().unwrap();
            assert!(
                module == "term_invariant::checks::structure"
                    || module == "term_invariant::checks::values",
                "{} has module {module}",
                check.name()
            );
            assert!(check.signature().unwrap().starts_with("(df"));
            assert!(check.doc().is_some());
        }
    }

    #[test]
    fn test_display_matches_definition() {
        let checks = all();
        let none_missing = checks.iter().find(|c| c.name() == "none_missing").unwrap();
        assert_eq!(
            none_missing.to_string(),
            "<function term_invariant::checks::structure.none_missing(df, columns=None)>"
        );
    }
}
