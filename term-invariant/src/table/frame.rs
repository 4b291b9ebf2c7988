//! An Arrow record batch with an explicit row index.

use std::collections::HashSet;
use std::fmt;

use arrow::array::ArrayRef;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use datafusion::scalar::ScalarValue;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TermError};
use crate::table::{mask_batch, FailureMask, Tabular};

/// Label of a row in a [`Frame`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Int(v) => write!(f, "{v}"),
            IndexKey::Str(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<i64> for IndexKey {
    fn from(value: i64) -> Self {
        IndexKey::Int(value)
    }
}

impl From<i32> for IndexKey {
    fn from(value: i32) -> Self {
        IndexKey::Int(value.into())
    }
}

impl From<&str> for IndexKey {
    fn from(value: &str) -> Self {
        IndexKey::Str(value.to_string())
    }
}

impl From<String> for IndexKey {
    fn from(value: String) -> Self {
        IndexKey::Str(value)
    }
}

/// A tabular dataset: an Arrow [`RecordBatch`] plus one label per row.
///
/// Columns are keyed by field name, rows by [`IndexKey`]. Without an explicit
/// index, rows are labelled `0..n`.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use arrow::array::{ArrayRef, Int64Array};
/// use term_invariant::table::{Frame, IndexKey, Tabular};
///
/// let frame = Frame::try_from_columns(vec![
///     ("age", Arc::new(Int64Array::from(vec![31, 45])) as ArrayRef),
/// ])
/// .unwrap()
/// .with_index(vec!["alice".into(), "bob".into()])
/// .unwrap();
///
/// assert_eq!(frame.column_keys(), vec!["age".to_string()]);
/// assert_eq!(frame.row_keys(), vec![IndexKey::from("alice"), IndexKey::from("bob")]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    batch: RecordBatch,
    index: Vec<IndexKey>,
}

impl Frame {
    /// Wraps a batch with a positional index.
    pub fn new(batch: RecordBatch) -> Self {
        let index = (0..batch.num_rows() as i64).map(IndexKey::Int).collect();
        Self { batch, index }
    }

    /// Builds a frame from named columns with a positional index.
    pub fn try_from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ArrayRef)>,
        S: AsRef<str>,
    {
        Ok(Self::new(RecordBatch::try_from_iter(columns)?))
    }

    /// Replaces the row index. The index must have one key per row.
    pub fn with_index(self, index: Vec<IndexKey>) -> Result<Self> {
        if index.len() != self.batch.num_rows() {
            return Err(TermError::ShapeMismatch {
                expected_rows: self.batch.num_rows(),
                expected_columns: self.batch.num_columns(),
                found_rows: index.len(),
                found_columns: self.batch.num_columns(),
            });
        }
        Ok(Self {
            batch: self.batch,
            index,
        })
    }

    /// The underlying batch.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// The row index.
    pub fn index(&self) -> &[IndexKey] {
        &self.index
    }

    /// The batch schema.
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| TermError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    /// Resolves an optional column selection, defaulting to every column.
    ///
    /// Unknown names are reported as [`TermError::ColumnNotFound`].
    pub fn select(&self, columns: Option<&[String]>) -> Result<HashSet<String>> {
        match columns {
            None => Ok(self.column_keys().into_iter().collect()),
            Some(names) => names
                .iter()
                .map(|name| self.column(name).map(|_| name.clone()))
                .collect(),
        }
    }

    /// Unwraps the frame into its batch and index.
    pub fn into_parts(self) -> (RecordBatch, Vec<IndexKey>) {
        (self.batch, self.index)
    }
}

impl From<RecordBatch> for Frame {
    fn from(batch: RecordBatch) -> Self {
        Self::new(batch)
    }
}

impl Tabular for Frame {
    type RowKey = IndexKey;
    type ColumnKey = String;
    type Cell = ScalarValue;

    fn column_keys(&self) -> Vec<String> {
        self.batch.column_keys()
    }

    fn row_keys(&self) -> Vec<IndexKey> {
        self.index.clone()
    }

    fn shape(&self) -> (usize, usize) {
        (self.batch.num_rows(), self.batch.num_columns())
    }

    fn mask<P>(&self, predicate: P) -> Result<FailureMask>
    where
        P: FnMut(&String, &ScalarValue) -> bool,
    {
        mask_batch(&self.batch, predicate)
    }
}
