//! Arguments bound to a check.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TermError};

/// Positional and keyword arguments handed to a check after the dataset.
///
/// Values are stored as JSON so that any check in a registry can be bound
/// with the same argument type. Checks read them back with [`CheckArgs::get`],
/// which resolves a parameter by keyword first and by position second.
///
/// # Examples
///
/// ```rust
/// use term_invariant::core::CheckArgs;
///
/// let args = CheckArgs::new()
///     .arg(vec!["age", "name"])
///     .kwarg("strict", true);
///
/// let columns: Option<Vec<String>> = args.get(0, "columns", "none_missing").unwrap();
/// assert_eq!(columns, Some(vec!["age".to_string(), "name".to_string()]));
/// assert_eq!(args.get_or(1, "strict", "is_monotonic", false).unwrap(), true);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckArgs {
    #[serde(default)]
    positional: Vec<Value>,
    #[serde(default)]
    keyword: BTreeMap<String, Value>,
}

impl CheckArgs {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a keyword argument, replacing any earlier value for `name`.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Positional arguments in binding order.
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Keyword arguments.
    pub fn keyword(&self) -> &BTreeMap<String, Value> {
        &self.keyword
    }

    /// Returns true if no argument is bound.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    /// Looks up the raw value of a parameter by keyword, then by position.
    pub fn raw(&self, position: usize, name: &str) -> Option<&Value> {
        self.keyword
            .get(name)
            .or_else(|| self.positional.get(position))
    }

    /// Reads a parameter and deserializes it.
    ///
    /// Returns `Ok(None)` when the parameter is absent or JSON `null`.
    /// `check` names the calling check in the error for ill-typed values.
    pub fn get<T: DeserializeOwned>(
        &self,
        position: usize,
        name: &str,
        check: &str,
    ) -> Result<Option<T>> {
        match self.raw(position, name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| TermError::invalid_argument(check, name, e.to_string())),
        }
    }

    /// Reads a parameter, falling back to `default` when absent.
    pub fn get_or<T: DeserializeOwned>(
        &self,
        position: usize,
        name: &str,
        check: &str,
        default: T,
    ) -> Result<T> {
        Ok(self.get(position, name, check)?.unwrap_or(default))
    }

    /// Reads a parameter that must be present.
    pub fn require<T: DeserializeOwned>(
        &self,
        position: usize,
        name: &str,
        check: &str,
    ) -> Result<T> {
        self.get(position, name, check)?
            .ok_or_else(|| TermError::invalid_argument(check, name, "missing required argument"))
    }
}

impl fmt::Display for CheckArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let positional = self.positional.iter().map(Value::to_string);
        let keyword = self.keyword.iter().map(|(k, v)| format!("{k}={v}"));
        let rendered: Vec<String> = positional.chain(keyword).collect();
        write!(f, "({})", rendered.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyword_wins_over_position() {
        let args = CheckArgs::new().arg(1).kwarg("limit", 5);
        assert_eq!(args.get::<i64>(0, "limit", "c").unwrap(), Some(5));
        assert_eq!(args.get::<i64>(0, "other", "c").unwrap(), Some(1));
    }

    #[test]
    fn test_absent_and_null() {
        let args = CheckArgs::new().arg(Value::Null);
        assert_eq!(args.get::<i64>(0, "x", "c").unwrap(), None);
        assert_eq!(args.get::<i64>(3, "x", "c").unwrap(), None);
        assert_eq!(args.get_or(3, "x", "c", 7_i64).unwrap(), 7);
    }

    #[test]
    fn test_ill_typed_argument() {
        let args = CheckArgs::new().kwarg("shape", "wide");
        let err = args.get::<Vec<i64>>(0, "shape", "is_shape").unwrap_err();
        assert!(matches!(err, TermError::InvalidArgument { ref check, ref name, .. }
            if check == "is_shape" && name == "shape"));
        assert!(!err.is_assertion());
    }

    #[test]
    fn test_require_missing() {
        let err = CheckArgs::new()
            .require::<String>(0, "items", "within_set")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument 'items' for check 'within_set': missing required argument"
        );
    }

    #[test]
    fn test_display() {
        let args = CheckArgs::new()
            .arg(json!([1, 2]))
            .kwarg("strict", true)
            .kwarg("a", "x");
        assert_eq!(args.to_string(), r#"([1,2], a="x", strict=true)"#);
        assert_eq!(CheckArgs::new().to_string(), "()");
    }

    #[test]
    fn test_deserialize_from_json() {
        let args: CheckArgs =
            serde_json::from_value(json!({"positional": [3], "keyword": {"k": "v"}})).unwrap();
        assert_eq!(args.positional(), &[json!(3)]);
        assert_eq!(args.keyword().get("k"), Some(&json!("v")));
        assert!(!args.is_empty());
    }
}
