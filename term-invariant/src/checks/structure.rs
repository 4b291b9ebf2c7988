//! Checks on missing values, shape, uniqueness and ordering.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use arrow::array::{Array, BooleanArray};
use datafusion::scalar::ScalarValue;

use super::fail_on_mask;
use crate::core::CheckArgs;
use crate::error::{AssertionFailure, Result, TermError};
use crate::table::{FailureMask, Frame, IndexKey, Tabular};

/// Asserts that there are no nulls in `columns` (every column by default).
pub fn none_missing(frame: &Frame, args: &CheckArgs) -> Result<()> {
    let columns: Option<Vec<String>> = args.get(0, "columns", "none_missing")?;
    let selected = frame.select(columns.as_deref())?;

    let schema = frame.schema();
    let mask = schema
        .fields()
        .iter()
        .zip(frame.batch().columns())
        .map(|(field, array)| -> Result<BooleanArray> {
            if selected.contains(field.name()) {
                Ok(arrow::compute::is_null(array.as_ref())?)
            } else {
                Ok(BooleanArray::from(vec![false; frame.num_rows()]))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    fail_on_mask(frame, &FailureMask::from_columns(mask)?, "Missing values")
}

/// Asserts the frame's `(rows, columns)`.
///
/// Either dimension may be `null` or `-1` to accept any size.
pub fn is_shape(frame: &Frame, args: &CheckArgs) -> Result<()> {
    let shape: Vec<Option<i64>> = args.require(0, "shape", "is_shape")?;
    let [rows, columns] = shape[..] else {
        return Err(TermError::invalid_argument(
            "is_shape",
            "shape",
            format!("expected [rows, columns], got {} values", shape.len()),
        ));
    };

    let (actual_rows, actual_columns) = frame.shape();
    let matches = |expected: Option<i64>, actual: usize| match expected {
        None | Some(-1) => true,
        Some(n) => usize::try_from(n).map_or(false, |n| n == actual),
    };
    if matches(rows, actual_rows) && matches(columns, actual_columns) {
        return Ok(());
    }

    let render = |d: Option<i64>| match d {
        None | Some(-1) => "*".to_string(),
        Some(n) => n.to_string(),
    };
    Err(TermError::assertion(format!(
        "Expected shape ({}, {}), found ({actual_rows}, {actual_columns})",
        render(rows),
        render(columns)
    )))
}

/// Asserts that no row key appears twice.
pub fn unique_index(frame: &Frame, _args: &CheckArgs) -> Result<()> {
    let mut seen: HashMap<&IndexKey, usize> = HashMap::new();
    for key in frame.index() {
        *seen.entry(key).or_default() += 1;
    }

    let mut reported: HashSet<&IndexKey> = HashSet::new();
    let duplicates: Vec<&IndexKey> = frame
        .index()
        .iter()
        .filter(|key| seen[key] > 1 && reported.insert(*key))
        .collect();
    if duplicates.is_empty() {
        return Ok(());
    }

    let rendered: Vec<String> = duplicates.iter().map(ToString::to_string).collect();
    Err(AssertionFailure::new(format!(
        "Index has duplicate keys: [{}]",
        rendered.join(", ")
    ))
    .into())
}

/// Asserts that no non-null value repeats within each selected column.
pub fn unique(frame: &Frame, args: &CheckArgs) -> Result<()> {
    let columns: Option<Vec<String>> = args.get(0, "columns", "unique")?;
    let selected = frame.select(columns.as_deref())?;

    let mut counts: HashMap<String, HashMap<ScalarValue, usize>> = HashMap::new();
    for name in &selected {
        let array = frame.column(name)?;
        let column_counts = counts.entry(name.clone()).or_default();
        for row in 0..array.len() {
            let cell = ScalarValue::try_from_array(array, row)?;
            if !cell.is_null() {
                *column_counts.entry(cell).or_default() += 1;
            }
        }
    }

    let mask = frame.mask(|column, cell| {
        counts
            .get(column)
            .and_then(|c| c.get(cell))
            .is_some_and(|n| *n > 1)
    })?;
    fail_on_mask(frame, &mask, "Duplicate values")
}

/// Asserts that each selected column is ordered.
///
/// `increasing` (default `true`) picks the direction, `strict` (default
/// `false`) forbids equal neighbours. A cell is reported when it is out of
/// order with the previous row; nulls cannot be ordered and are always
/// reported.
pub fn is_monotonic(frame: &Frame, args: &CheckArgs) -> Result<()> {
    let columns: Option<Vec<String>> = args.get(0, "columns", "is_monotonic")?;
    let increasing = args.get_or(1, "increasing", "is_monotonic", true)?;
    let strict = args.get_or(2, "strict", "is_monotonic", false)?;
    let selected = frame.select(columns.as_deref())?;

    let in_order = |previous: &ScalarValue, current: &ScalarValue| {
        let ordering = if increasing {
            previous.partial_cmp(current)
        } else {
            current.partial_cmp(previous)
        };
        match ordering {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => !strict,
            _ => false,
        }
    };

    let mut mask = Vec::with_capacity(frame.num_columns());
    for name in frame.column_keys() {
        let array = frame.column(&name)?;
        let mut flags = vec![false; array.len()];
        if selected.contains(&name) {
            let mut previous: Option<ScalarValue> = None;
            for (row, flag) in flags.iter_mut().enumerate() {
                let current = ScalarValue::try_from_array(array, row)?;
                *flag = current.is_null()
                    || previous
                        .as_ref()
                        .is_some_and(|p| !p.is_null() && !in_order(p, &current));
                previous = Some(current);
            }
        }
        mask.push(BooleanArray::from(flags));
    }

    let direction = match (increasing, strict) {
        (true, false) => "non-decreasing",
        (true, true) => "strictly increasing",
        (false, false) => "non-increasing",
        (false, true) => "strictly decreasing",
    };
    fail_on_mask(
        frame,
        &FailureMask::from_columns(mask)?,
        &format!("Values are not {direction}"),
    )
}
