//! Checks that can be called directly or turned into decorators.

use std::fmt;
use std::sync::Arc;

use crate::config::GuardConfig;
use crate::core::{CheckArgs, Decorator};
use crate::error::Result;

/// The function type wrapped by a [`Check`].
pub type CheckFunction<D> = dyn Fn(&D, &CheckArgs) -> Result<()> + Send + Sync;

/// A validation check over datasets of type `D`.
///
/// A `Check` wraps a plain validation function together with its display
/// metadata. It can be used two ways:
///
/// - called directly with [`Check::call`], behaving exactly like the wrapped function;
/// - bound to arguments with [`Check::as_decorator`], producing a [`Decorator`]
///   that enforces the check on the result of any dataset-producing function.
///
/// Cloning is cheap and every clone shares the same wrapped function.
///
/// # Examples
///
/// ```rust
/// use term_invariant::core::{Check, CheckArgs};
/// use term_invariant::error::{Result, TermError};
///
/// fn non_empty(data: &Vec<i64>, _args: &CheckArgs) -> Result<()> {
///     if data.is_empty() {
///         return Err(TermError::assertion("dataset is empty"));
///     }
///     Ok(())
/// }
///
/// let check = Check::new("non_empty", non_empty).with_signature("(data)");
/// assert!(check.call(&vec![1], &CheckArgs::new()).is_ok());
/// assert!(check.call(&vec![], &CheckArgs::new()).is_err());
/// assert_eq!(check.to_string(), "<function non_empty(data)>");
/// ```
pub struct Check<D: ?Sized> {
    name: Arc<str>,
    module: Option<Arc<str>>,
    doc: Option<Arc<str>>,
    signature: Option<Arc<str>>,
    function: Arc<CheckFunction<D>>,
}

impl<D: ?Sized> Check<D> {
    /// Wraps a check function under the given name.
    pub fn new<F>(name: impl Into<Arc<str>>, function: F) -> Self
    where
        F: Fn(&D, &CheckArgs) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            module: None,
            doc: None,
            signature: None,
            function: Arc::new(function),
        }
    }

    /// Records the module the check function is defined in.
    pub fn with_module(mut self, module: impl Into<Arc<str>>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Records the check's documentation.
    pub fn with_doc(mut self, doc: impl Into<Arc<str>>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Records the check's parameter list, e.g. `"(df, columns=None)"`.
    pub fn with_signature(mut self, signature: impl Into<Arc<str>>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// The check's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The module the check is defined in, if recorded.
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// The check's documentation, if recorded.
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// The check's parameter list, if recorded.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Runs the check directly.
    ///
    /// Errors from the wrapped function are returned unchanged. On success the
    /// dataset is handed back so direct calls can be chained.
    pub fn call<'a>(&self, dataset: &'a D, args: &CheckArgs) -> Result<&'a D> {
        (self.function)(dataset, args)?;
        Ok(dataset)
    }

    /// Binds `args` and returns a decorator enforcing this check.
    ///
    /// Each call produces an independent decorator; binding different
    /// arguments twice never lets one decorator see the other's arguments.
    pub fn as_decorator(&self, args: CheckArgs) -> Decorator<D> {
        Decorator::new(self.clone(), args, GuardConfig::default())
    }

    /// Like [`Check::as_decorator`] with an explicit guard configuration.
    pub fn as_decorator_with_config(&self, args: CheckArgs, config: GuardConfig) -> Decorator<D> {
        Decorator::new(self.clone(), args, config)
    }

    /// Returns a decorator that binds no arguments.
    pub fn decorator(&self) -> Decorator<D> {
        self.as_decorator(CheckArgs::new())
    }

    /// Returns true if both checks wrap the very same function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.function, &other.function)
    }
}

impl<D: ?Sized> Clone for Check<D> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            module: self.module.clone(),
            doc: self.doc.clone(),
            signature: self.signature.clone(),
            function: Arc::clone(&self.function),
        }
    }
}

impl<D: ?Sized> fmt::Debug for Check<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl<D: ?Sized> fmt::Display for Check<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function ")?;
        if let Some(module) = self.module() {
            write!(f, "{module}.")?;
        }
        write!(f, "{}{}>", self.name, self.signature().unwrap_or("(...)"))
    }
}

/// Wraps a check function in a [`Check`], recording its name and the module
/// it is defined in.
///
/// ```rust
/// use term_invariant::check;
///
/// mod rules {
///     use term_invariant::core::CheckArgs;
///     use term_invariant::error::Result;
///
///     pub fn always_ok(_data: &str, _args: &CheckArgs) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// let check = check!(rules::always_ok, "(data)");
/// assert_eq!(check.name(), "always_ok");
/// assert!(check.module().unwrap().ends_with("rules"));
/// ```
#[macro_export]
macro_rules! check {
    ($function:path) => {{
        let (module, name) = $crate::core::check::split_item_path(
            $crate::core::check::type_name_of(&$function),
        );
        let check = $crate::core::Check::new(name, $function);
        match module {
            Some(module) => check.with_module(module),
            None => check,
        }
    }};
    ($function:path, $signature:expr) => {
        $crate::check!($function).with_signature($signature)
    };
}

#[doc(hidden)]
pub fn type_name_of<T>(_: &T) -> &'static str {
    std::any::type_name::<T>()
}

/// Splits `a::b::name<T>` into `(Some("a::b"), "name")`.
#[doc(hidden)]
pub fn split_item_path(path: &str) -> (Option<&str>, &str) {
    let path = path.split('<').next().unwrap_or(path);
    match path.rsplit_once("::") {
        Some((module, name)) => (Some(module), name),
        None => (None, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TermError;

    fn positive(data: &[i64], _args: &CheckArgs) -> Result<()> {
        match data.iter().find(|v| **v <= 0) {
            Some(v) => Err(TermError::assertion(format!("{v} is not positive"))),
            None => Ok(()),
        }
    }

    #[test]
    fn test_direct_call_delegates() {
        let check = Check::new("positive", positive);
        let data = [1, 2, 3];
        let returned = check.call(&data[..], &CheckArgs::new()).unwrap();
        assert!(std::ptr::eq(returned, &data[..]));

        let err = check.call(&[1, -2][..], &CheckArgs::new()).unwrap_err();
        assert_eq!(err.to_string(), "-2 is not positive");
    }

    #[test]
    fn test_non_assertion_errors_pass_through_direct_call() {
        let check: Check<[i64]> = Check::new("broken", |_: &[i64], _: &CheckArgs| {
            Err(TermError::Internal("bug".to_string()))
        });
        let err = check.call(&[1][..], &CheckArgs::new()).unwrap_err();
        assert!(matches!(err, TermError::Internal(ref m) if m == "bug"));
    }

    #[test]
    fn test_metadata_preserved() {
        let check = Check::new("positive", positive)
            .with_module("my_checks")
            .with_doc("All values are positive.")
            .with_signature("(data)");
        assert_eq!(check.name(), "positive");
        assert_eq!(check.module(), Some("my_checks"));
        assert_eq!(check.doc(), Some("All values are positive."));
        assert_eq!(check.signature(), Some("(data)"));
        assert_eq!(check.to_string(), "<function my_checks.positive(data)>");

        let bare = Check::new("positive", positive);
        assert_eq!(bare.to_string(), "<function positive(...)>");
    }

    #[test]
    fn test_clone_shares_function() {
        let check = Check::new("positive", positive);
        let copy = check.clone();
        assert!(check.ptr_eq(&copy));
        assert!(!check.ptr_eq(&Check::new("positive", positive)));
    }

    #[test]
    fn test_check_macro() {
        let check = crate::check!(positive, "(data)");
        assert_eq!(check.name(), "positive");
        assert_eq!(check.module(), Some(module_path!()));
        assert_eq!(check.signature(), Some("(data)"));

        let qualified = crate::check!(self::positive);
        assert_eq!(qualified.name(), "positive");
    }

    mod library {
        use crate::core::CheckArgs;
        use crate::error::Result;

        pub fn non_empty(data: &[i64], _args: &CheckArgs) -> Result<()> {
            match data.is_empty() {
                true => Err(crate::error::TermError::assertion("empty")),
                false => Ok(()),
            }
        }
    }

    #[test]
    fn test_check_macro_records_defining_module() {
        let check = crate::check!(library::non_empty, "(data)");
        assert_eq!(check.name(), "non_empty");
        assert_eq!(
            check.module(),
            Some("term_invariant::core::check::tests::library")
        );
        assert_eq!(
            check.to_string(),
            "<function term_invariant::core::check::tests::library.non_empty(data)>"
        );
    }

    #[test]
    fn test_split_item_path() {
        assert_eq!(split_item_path("a::b::load"), (Some("a::b"), "load"));
        assert_eq!(split_item_path("a::parse<i64>"), (Some("a"), "parse"));
        assert_eq!(split_item_path("load"), (None, "load"));
    }

    #[test]
    fn test_decorators_share_check() {
        let check = Check::new("positive", positive);
        let a = check.as_decorator(CheckArgs::new().arg(1));
        let b = check.as_decorator(CheckArgs::new().arg(2));
        assert!(a.check().ptr_eq(b.check()));
        assert_ne!(a.args(), b.args());
    }
}
