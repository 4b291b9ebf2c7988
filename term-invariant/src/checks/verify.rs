//! Checks built from caller-supplied cell predicates.

use datafusion::scalar::ScalarValue;

use super::fail_on_mask;
use crate::core::{Check, CheckArgs};
use crate::error::TermError;
use crate::table::{Frame, Tabular};

/// Builds a check that fails on every cell where `predicate` is false.
///
/// The predicate receives the column name, the cell value and the arguments
/// the check was bound to.
///
/// ```rust
/// use std::sync::Arc;
/// use arrow::array::{ArrayRef, Int64Array};
/// use datafusion::scalar::ScalarValue;
/// use term_invariant::checks::verify_all;
/// use term_invariant::core::CheckArgs;
/// use term_invariant::table::Frame;
///
/// let above = verify_all("above", |_column, cell, args| {
///     let floor = args.raw(0, "floor").and_then(|v| v.as_i64()).unwrap_or(0);
///     matches!(cell, ScalarValue::Int64(Some(v)) if *v > floor)
/// });
/// let frame = Frame::try_from_columns(vec![
///     ("n", Arc::new(Int64Array::from(vec![1, 0])) as ArrayRef),
/// ])
/// .unwrap();
///
/// let err = above.call(&frame, &CheckArgs::new()).unwrap_err();
/// assert_eq!(err.to_string(), "Predicate 'above' is false at [(1, n)]");
///
/// let err = above.call(&frame, &CheckArgs::new().arg(1)).unwrap_err();
/// assert_eq!(err.to_string(), "Predicate 'above' is false at [(0, n), (1, n)]");
/// ```
pub fn verify_all<P>(name: &str, predicate: P) -> Check<Frame>
where
    P: Fn(&str, &ScalarValue, &CheckArgs) -> bool + Send + Sync + 'static,
{
    let label = format!("Predicate '{name}' is false");
    Check::new(name, move |frame: &Frame, args: &CheckArgs| {
        let mask = frame.mask(|column, cell| !predicate(column.as_str(), cell, args))?;
        fail_on_mask(frame, &mask, &label)
    })
    .with_module(module_path!())
    .with_signature("(df)")
}

/// Builds a check that fails unless `predicate` holds for at least one cell.
pub fn verify_any<P>(name: &str, predicate: P) -> Check<Frame>
where
    P: Fn(&str, &ScalarValue, &CheckArgs) -> bool + Send + Sync + 'static,
{
    let label = format!("Predicate '{name}' is false for every cell");
    Check::new(name, move |frame: &Frame, args: &CheckArgs| {
        let mask = frame.mask(|column, cell| predicate(column.as_str(), cell, args))?;
        if mask.any() {
            Ok(())
        } else {
            Err(TermError::assertion(label.clone()))
        }
    })
    .with_module(module_path!())
    .with_signature("(df)")
}
