//! Boolean failure masks aligned to a dataset's cells.

use arrow::array::{Array, BooleanArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::error::{Result, TermError};

/// One boolean per cell, marking the cells that violate a condition.
///
/// Stored column by column, so iteration is naturally column-major. Null
/// entries count as `false`.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureMask {
    columns: Vec<BooleanArray>,
    rows: usize,
}

impl FailureMask {
    /// Builds a mask from one boolean array per column.
    ///
    /// All arrays must have the same length.
    pub fn from_columns(columns: Vec<BooleanArray>) -> Result<Self> {
        let rows = columns.first().map_or(0, |c| c.len());
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(TermError::ShapeMismatch {
                expected_rows: rows,
                expected_columns: columns.len(),
                found_rows: bad.len(),
                found_columns: columns.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Builds a mask from a flat column-major sequence of `rows * columns` flags.
    pub fn from_column_major(rows: usize, columns: usize, values: Vec<bool>) -> Result<Self> {
        if values.len() != rows * columns {
            return Err(TermError::ShapeMismatch {
                expected_rows: rows,
                expected_columns: columns,
                found_rows: if columns == 0 { 0 } else { values.len() / columns },
                found_columns: columns,
            });
        }
        if rows == 0 {
            return Ok(Self {
                columns: vec![BooleanArray::from(Vec::<bool>::new()); columns],
                rows,
            });
        }
        let columns = values
            .chunks(rows)
            .map(|chunk| BooleanArray::from(chunk.to_vec()))
            .collect();
        Ok(Self { columns, rows })
    }

    /// Builds a mask from a batch whose columns are all boolean.
    pub fn from_batch(batch: &RecordBatch) -> Result<Self> {
        let columns = batch
            .schema()
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, column)| {
                column
                    .as_any()
                    .downcast_ref::<BooleanArray>()
                    .cloned()
                    .ok_or_else(|| TermError::TypeMismatch {
                        expected: DataType::Boolean.to_string(),
                        found: format!("{} for column '{}'", field.data_type(), field.name()),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            columns,
            rows: batch.num_rows(),
        })
    }

    /// A mask with no failing cell.
    pub fn all_false(rows: usize, columns: usize) -> Self {
        Self {
            columns: vec![BooleanArray::from(vec![false; rows]); columns],
            rows,
        }
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns.len())
    }

    /// The per-column boolean arrays.
    pub fn columns(&self) -> &[BooleanArray] {
        &self.columns
    }

    /// Flattens the mask in column-major order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.columns
            .iter()
            .flat_map(|column| column.iter().map(|flag| flag.unwrap_or(false)))
    }

    /// Number of failing cells.
    pub fn count(&self) -> usize {
        self.columns.iter().map(BooleanArray::true_count).sum()
    }

    /// Returns true if any cell fails.
    pub fn any(&self) -> bool {
        self.count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::ArrayRef;
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    #[test]
    fn test_column_major_flatten() {
        let mask = FailureMask::from_columns(vec![
            BooleanArray::from(vec![true, false]),
            BooleanArray::from(vec![false, true]),
        ])
        .unwrap();
        assert_eq!(mask.shape(), (2, 2));
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![true, false, false, true]);
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn test_nulls_count_as_false() {
        let mask =
            FailureMask::from_columns(vec![BooleanArray::from(vec![Some(true), None])]).unwrap();
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![true, false]);
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = FailureMask::from_columns(vec![
            BooleanArray::from(vec![true, false]),
            BooleanArray::from(vec![true]),
        ])
        .unwrap_err();
        assert!(matches!(err, TermError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_from_column_major() {
        let mask = FailureMask::from_column_major(2, 3, vec![true, false, false, false, true, true])
            .unwrap();
        assert_eq!(mask.shape(), (2, 3));
        assert_eq!(mask.columns()[2], BooleanArray::from(vec![true, true]));
        assert!(FailureMask::from_column_major(2, 3, vec![true]).is_err());

        let empty = FailureMask::from_column_major(0, 2, vec![]).unwrap();
        assert_eq!(empty.shape(), (0, 2));
        assert!(!empty.any());
    }

    #[test]
    fn test_from_batch() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("a", DataType::Boolean, true),
            Field::new("b", DataType::Boolean, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(BooleanArray::from(vec![false, true])) as ArrayRef,
                Arc::new(BooleanArray::from(vec![false, false])) as ArrayRef,
            ],
        )
        .unwrap();
        let mask = FailureMask::from_batch(&batch).unwrap();
        assert_eq!(mask.shape(), (2, 2));
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn test_from_batch_rejects_non_boolean() {
        let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int64, false)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(arrow::array::Int64Array::from(vec![1])) as ArrayRef],
        )
        .unwrap();
        let err = FailureMask::from_batch(&batch).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type mismatch: expected Boolean, found Int64 for column 'n'"
        );
    }

    #[test]
    fn test_all_false() {
        let mask = FailureMask::all_false(3, 2);
        assert_eq!(mask.shape(), (3, 2));
        assert!(!mask.any());
    }
}
