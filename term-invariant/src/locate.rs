//! Turning failure masks into cell coordinates for error messages.

use std::fmt::Display;

use crate::error::{Result, TermError};
use crate::table::{FailureMask, Tabular};

/// Number of locations rendered by the built-in checks before eliding the rest.
pub const DEFAULT_MAX_REPORTED_LOCATIONS: usize = 10;

/// Lists the `(row key, column key)` of every failing cell.
///
/// Cells are visited in column-major order: every row of the first column,
/// then every row of the second, and so on. The result keeps that order so
/// messages built from it are reproducible.
///
/// The mask must have the dataset's shape; otherwise
/// [`TermError::ShapeMismatch`] is returned.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use arrow::array::{ArrayRef, Int64Array};
/// use term_invariant::locate::bad_locations;
/// use term_invariant::table::{FailureMask, Frame, IndexKey};
///
/// let frame = Frame::try_from_columns(vec![
///     ("x", Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef),
///     ("y", Arc::new(Int64Array::from(vec![3, 4])) as ArrayRef),
/// ])
/// .unwrap();
/// let mask = FailureMask::from_column_major(2, 2, vec![true, false, false, true]).unwrap();
///
/// assert_eq!(
///     bad_locations(&frame, &mask).unwrap(),
///     vec![(IndexKey::Int(0), "x".to_string()), (IndexKey::Int(1), "y".to_string())]
/// );
/// ```
pub fn bad_locations<T>(dataset: &T, mask: &FailureMask) -> Result<Vec<(T::RowKey, T::ColumnKey)>>
where
    T: Tabular + ?Sized,
{
    let rows = dataset.row_keys();
    let columns = dataset.column_keys();
    let (mask_rows, mask_columns) = mask.shape();
    if mask_rows != rows.len() || mask_columns != columns.len() {
        return Err(TermError::ShapeMismatch {
            expected_rows: rows.len(),
            expected_columns: columns.len(),
            found_rows: mask_rows,
            found_columns: mask_columns,
        });
    }

    let cells = columns
        .iter()
        .flat_map(|column| rows.iter().map(move |row| (row, column)));

    Ok(cells
        .zip(mask.iter())
        .filter(|(_, failed)| *failed)
        .map(|((row, column), _)| (row.clone(), column.clone()))
        .collect())
}

/// Renders locations as `[(row, column), ...]`, keeping at most `max` entries.
///
/// ```rust
/// use term_invariant::locate::format_locations;
///
/// let locations = vec![(0, "x"), (1, "y"), (2, "y")];
/// assert_eq!(format_locations(&locations, 2), "[(0, x), (1, y), ... and 1 more]");
/// ```
pub fn format_locations<R: Display, C: Display>(locations: &[(R, C)], max: usize) -> String {
    let mut parts: Vec<String> = locations
        .iter()
        .take(max)
        .map(|(row, column)| format!("({row}, {column})"))
        .collect();
    if locations.len() > max {
        parts.push(format!("... and {} more", locations.len() - max));
    }
    format!("[{}]", parts.join(", "))
}

/// Renders each location as `(row, column)`.
pub fn render_locations<R: Display, C: Display>(locations: &[(R, C)]) -> Vec<String> {
    locations
        .iter()
        .map(|(row, column)| format!("({row}, {column})"))
        .collect()
}
