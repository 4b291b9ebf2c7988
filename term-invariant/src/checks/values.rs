//! Checks on individual values and column types.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use arrow::array::{Array, BooleanArray, Float64Array};
use arrow::compute::kernels::cmp::{gt, lt};
use arrow::datatypes::DataType;
use datafusion::scalar::ScalarValue;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::fail_on_mask;
use crate::core::CheckArgs;
use crate::error::{Result, TermError};
use crate::table::{FailureMask, Frame, Tabular};

/// Cache for compiled regex patterns to avoid recompiling
static REGEX_CACHE: Lazy<RwLock<HashMap<String, Regex>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Asserts that numeric values lie within `[low, high]`.
///
/// `items` maps column names to `[low, high]`. Columns are cast to
/// `Float64` for the comparison; nulls pass.
pub fn within_range(frame: &Frame, args: &CheckArgs) -> Result<()> {
    let items: BTreeMap<String, (f64, f64)> = args.require(0, "items", "within_range")?;
    for name in items.keys() {
        frame.column(name)?;
    }

    let mask = frame
        .schema()
        .fields()
        .iter()
        .zip(frame.batch().columns())
        .map(|(field, array)| -> Result<BooleanArray> {
            let Some(&(low, high)) = items.get(field.name()) else {
                return Ok(BooleanArray::from(vec![false; array.len()]));
            };
            if !field.data_type().is_numeric() {
                return Err(TermError::TypeMismatch {
                    expected: "numeric".to_string(),
                    found: format!("{} for column '{}'", field.data_type(), field.name()),
                });
            }
            let values = arrow::compute::cast(array, &DataType::Float64)?;
            let below = lt(&values, &Float64Array::new_scalar(low))?;
            let above = gt(&values, &Float64Array::new_scalar(high))?;
            Ok(arrow::compute::or(&below, &above)?)
        })
        .collect::<Result<Vec<_>>>()?;

    fail_on_mask(frame, &FailureMask::from_columns(mask)?, "Values out of range")
}

/// Asserts that values belong to an allowed set.
///
/// `items` maps column names to lists of allowed values. Nulls pass only
/// when `null` is listed.
pub fn within_set(frame: &Frame, args: &CheckArgs) -> Result<()> {
    let items: BTreeMap<String, Vec<Value>> = args.require(0, "items", "within_set")?;

    let mut allowed: HashMap<String, Vec<ScalarValue>> = HashMap::new();
    for (name, values) in &items {
        let data_type = frame.column(name)?.data_type().clone();
        let scalars = values
            .iter()
            .map(|value| json_to_scalar(value, &data_type))
            .collect::<Result<Vec<_>>>()?;
        allowed.insert(name.clone(), scalars);
    }

    let mask = frame.mask(|column, cell| {
        allowed
            .get(column)
            .is_some_and(|values| !values.contains(cell))
    })?;
    fail_on_mask(frame, &mask, "Values outside the allowed set")
}

/// Asserts that non-null values match a regular expression.
///
/// `items` maps column names to patterns. The pattern must match somewhere
/// in the value; anchor it with `^...$` for a full match.
pub fn matches_pattern(frame: &Frame, args: &CheckArgs) -> Result<()> {
    let items: BTreeMap<String, String> = args.require(0, "items", "matches_pattern")?;

    let mut patterns: HashMap<String, Regex> = HashMap::new();
    for (name, pattern) in &items {
        frame.column(name)?;
        patterns.insert(name.clone(), cached_regex(pattern)?);
    }

    let mask = frame.mask(|column, cell| {
        let Some(regex) = patterns.get(column) else {
            return false;
        };
        match cell {
            ScalarValue::Utf8(Some(s))
            | ScalarValue::LargeUtf8(Some(s))
            | ScalarValue::Utf8View(Some(s)) => !regex.is_match(s),
            other if other.is_null() => false,
            other => !regex.is_match(&other.to_string()),
        }
    })?;
    fail_on_mask(frame, &mask, "Values not matching pattern")
}

/// Asserts that columns have the given Arrow data types.
///
/// `items` maps column names to the type's display name, e.g. `"Int64"` or
/// `"Utf8"`.
pub fn has_dtypes(frame: &Frame, args: &CheckArgs) -> Result<()> {
    let items: BTreeMap<String, String> = args.require(0, "items", "has_dtypes")?;

    let mut mismatches = Vec::new();
    for (name, expected) in &items {
        let found = frame.column(name)?.data_type().to_string();
        if &found != expected {
            mismatches.push(format!("'{name}' is {found}, expected {expected}"));
        }
    }
    if mismatches.is_empty() {
        return Ok(());
    }
    Err(TermError::assertion(format!(
        "Unexpected column types: {}",
        mismatches.join("; ")
    )))
}

fn cached_regex(pattern: &str) -> Result<Regex> {
    if let Some(regex) = REGEX_CACHE
        .read()
        .map_err(|_| TermError::Internal("regex cache poisoned".to_string()))?
        .get(pattern)
    {
        return Ok(regex.clone());
    }

    let regex = Regex::new(pattern)
        .map_err(|e| TermError::invalid_argument("matches_pattern", "items", e.to_string()))?;
    REGEX_CACHE
        .write()
        .map_err(|_| TermError::Internal("regex cache poisoned".to_string()))?
        .insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

/// Converts a JSON argument into a scalar of the column's type.
fn json_to_scalar(value: &Value, data_type: &DataType) -> Result<ScalarValue> {
    let scalar = match value {
        Value::Null => return Ok(ScalarValue::try_from(data_type)?),
        Value::Bool(b) => ScalarValue::Boolean(Some(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => ScalarValue::Int64(Some(i)),
            None => ScalarValue::Float64(n.as_f64()),
        },
        Value::String(s) => ScalarValue::Utf8(Some(s.clone())),
        other => {
            return Err(TermError::invalid_argument(
                "within_set",
                "items",
                format!("cannot compare {other} with {data_type} values"),
            ))
        }
    };
    Ok(scalar.cast_to(data_type)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures::people;
    use serde_json::json;

    #[test]
    fn test_within_range() {
        let frame = people();
        let args = CheckArgs::new().arg(json!({"age": [0, 120], "score": [0.0, 1.0]}));
        let err = within_range(&frame, &args).unwrap_err();
        assert_eq!(err.to_string(), "Values out of range at [(1, age)]");

        let args = CheckArgs::new().kwarg("items", json!({"age": [-10, 120]}));
        assert!(within_range(&frame, &args).is_ok());
    }

    #[test]
    fn test_within_range_unknown_column() {
        let args = CheckArgs::new().arg(json!({"height": [0, 3]}));
        let err = within_range(&people(), &args).unwrap_err();
        assert!(matches!(err, TermError::ColumnNotFound { .. }));
    }

    #[test]
    fn test_within_range_non_numeric_is_not_an_assertion() {
        let args = CheckArgs::new().arg(json!({"name": [0, 3]}));
        let err = within_range(&people(), &args).unwrap_err();
        assert!(!err.is_assertion());
    }

    #[test]
    fn test_within_set() {
        let frame = people();
        let args = CheckArgs::new().arg(json!({"name": ["ann", "bo", "cy"]}));
        let err = within_set(&frame, &args).unwrap_err();
        assert_eq!(err.to_string(), "Values outside the allowed set at [(1, name)]");

        let args = CheckArgs::new().arg(json!({"name": ["ann", null, "cy"], "age": [31, -4, 57]}));
        assert!(within_set(&frame, &args).is_ok());
    }

    #[test]
    fn test_matches_pattern() {
        let frame = people();
        let args = CheckArgs::new().arg(json!({"name": "^[a-c]"}));
        assert!(matches_pattern(&frame, &args).is_ok());

        let args = CheckArgs::new().arg(json!({"name": "^a"}));
        let err = matches_pattern(&frame, &args).unwrap_err();
        assert_eq!(err.to_string(), "Values not matching pattern at [(2, name)]");
    }

    #[test]
    fn test_matches_pattern_invalid_regex() {
        let args = CheckArgs::new().arg(json!({"name": "(unclosed"}));
        let err = matches_pattern(&people(), &args).unwrap_err();
        assert!(matches!(err, TermError::InvalidArgument { .. }));
    }

    #[test]
    fn test_has_dtypes() {
        let frame = people();
        let args = CheckArgs::new().arg(json!({"name": "Utf8", "age": "Int64"}));
        assert!(has_dtypes(&frame, &args).is_ok());

        let args = CheckArgs::new().arg(json!({"age": "Float64"}));
        let err = has_dtypes(&frame, &args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected column types: 'age' is Int64, expected Float64"
        );
    }
}
