//! The capabilities a dataset must offer to be checked and located.
//!
//! Checks and the locator never look inside a dataset directly. They go
//! through [`Tabular`], which exposes ordered column keys, ordered row keys,
//! and cell-wise masking. [`Frame`] is the Arrow-backed implementation used
//! by the built-in checks; a bare [`RecordBatch`] is also [`Tabular`], with
//! positional row keys.

use std::fmt;

use arrow::array::{Array, BooleanArray};
use arrow::record_batch::RecordBatch;
use datafusion::scalar::ScalarValue;

use crate::error::Result;

pub mod frame;
pub mod mask;

pub use frame::{Frame, IndexKey};
pub use mask::FailureMask;

/// A rectangular dataset with ordered row and column keys.
pub trait Tabular {
    /// Key identifying a row.
    type RowKey: Clone + fmt::Debug + fmt::Display;
    /// Key identifying a column.
    type ColumnKey: Clone + fmt::Debug + fmt::Display;
    /// Value held by a single cell.
    type Cell;

    /// Column keys in column order.
    fn column_keys(&self) -> Vec<Self::ColumnKey>;

    /// Row keys in row order.
    fn row_keys(&self) -> Vec<Self::RowKey>;

    /// `(rows, columns)`.
    fn shape(&self) -> (usize, usize) {
        (self.row_keys().len(), self.column_keys().len())
    }

    /// Evaluates `predicate` on every cell, producing a same-shaped mask.
    ///
    /// A cell is marked when the predicate returns true.
    fn mask<P>(&self, predicate: P) -> Result<FailureMask>
    where
        P: FnMut(&Self::ColumnKey, &Self::Cell) -> bool;
}

impl Tabular for RecordBatch {
    type RowKey = usize;
    type ColumnKey = String;
    type Cell = ScalarValue;

    fn column_keys(&self) -> Vec<String> {
        self.schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    fn row_keys(&self) -> Vec<usize> {
        (0..self.num_rows()).collect()
    }

    fn shape(&self) -> (usize, usize) {
        (self.num_rows(), self.num_columns())
    }

    fn mask<P>(&self, predicate: P) -> Result<FailureMask>
    where
        P: FnMut(&String, &ScalarValue) -> bool,
    {
        mask_batch(self, predicate)
    }
}

/// Evaluates `predicate` over every cell of `batch`, column by column.
pub(crate) fn mask_batch<P>(batch: &RecordBatch, mut predicate: P) -> Result<FailureMask>
where
    P: FnMut(&String, &ScalarValue) -> bool,
{
    let schema = batch.schema();
    let mut columns = Vec::with_capacity(batch.num_columns());
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        let mut flags = Vec::with_capacity(array.len());
        for row in 0..array.len() {
            let cell = ScalarValue::try_from_array(array, row)?;
            flags.push(predicate(field.name(), &cell));
        }
        columns.push(BooleanArray::from(flags));
    }
    FailureMask::from_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use std::sync::Arc;

    fn batch() -> RecordBatch {
        RecordBatch::try_from_iter(vec![
            ("x", Arc::new(Int64Array::from(vec![1, -2, 3])) as ArrayRef),
            ("y", Arc::new(StringArray::from(vec!["a", "b", "c"])) as ArrayRef),
        ])
        .unwrap()
    }

    #[test]
    fn test_record_batch_keys() {
        let batch = batch();
        assert_eq!(batch.column_keys(), vec!["x".to_string(), "y".to_string()]);
        assert_eq!(batch.row_keys(), vec![0, 1, 2]);
        assert_eq!(Tabular::shape(&batch), (3, 2));
    }

    #[test]
    fn test_record_batch_mask() {
        let mask = batch()
            .mask(|column, cell| {
                column == "x" && matches!(cell, ScalarValue::Int64(Some(v)) if *v < 0)
            })
            .unwrap();
        assert_eq!(
            mask.iter().collect::<Vec<_>>(),
            vec![false, true, false, false, false, false]
        );
    }
}
