//! Error types for the Term invariant library.
//!
//! All non-generic failures are represented by [`TermError`]. Check functions
//! return [`Result`], signalling a data violation with
//! [`TermError::Assertion`] and anything else (bad arguments, Arrow failures,
//! missing columns) with the remaining variants.
//!
//! Guarded functions return [`GuardError`], which keeps the target function's
//! own error type intact and adds [`InvariantViolation`] for results that
//! broke one of the bound checks.

use std::any::Any;
use std::fmt;

use thiserror::Error;

/// A failed assertion raised by a check function.
///
/// This is the "data is invalid" signal. Guarded functions translate it into
/// an [`InvariantViolation`]; every other error passes through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AssertionFailure {
    message: String,
    locations: Vec<String>,
}

impl AssertionFailure {
    /// Creates an assertion failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
        }
    }

    /// Attaches rendered `(row, column)` locations of the offending cells.
    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Rendered locations of the offending cells, if the check reported any.
    pub fn locations(&self) -> &[String] {
        &self.locations
    }
}

/// The main error type for the Term invariant library.
#[derive(Error, Debug)]
pub enum TermError {
    /// A check function found invalid data.
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),

    /// A guarded function called from inside a check broke its own invariant.
    ///
    /// Belongs to the assertion family, so an enclosing guard translates it
    /// again instead of passing it through.
    #[error(transparent)]
    Invariant(Box<InvariantViolation>),

    /// A check received an argument it cannot use.
    #[error("Invalid argument '{name}' for check '{check}': {message}")]
    InvalidArgument {
        /// Name of the check
        check: String,
        /// Name of the offending parameter
        name: String,
        /// Detailed error message
        message: String,
    },

    /// Error when a required column is not found in the dataset.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Error when data types don't match expected types.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A failure mask or row index does not line up with its dataset.
    #[error("Shape mismatch: expected {expected_rows}x{expected_columns}, found {found_rows}x{found_columns}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_columns: usize,
        found_rows: usize,
        found_columns: usize,
    },

    /// No check with this name is registered.
    #[error("Unknown check '{name}'")]
    UnknownCheck { name: String },

    /// A check with this name is already registered.
    #[error("Check '{name}' is already registered")]
    DuplicateCheck { name: String },

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, TermError>`.
pub type Result<T> = std::result::Result<T, TermError>;

impl TermError {
    /// Creates an assertion failure error.
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(AssertionFailure::new(message))
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(
        check: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            check: check.into(),
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors that signal invalid data rather than a bug.
    ///
    /// Only these are translated into an [`InvariantViolation`] by a guard.
    pub fn is_assertion(&self) -> bool {
        matches!(self, TermError::Assertion(_) | TermError::Invariant(_))
    }
}

impl From<serde_json::Error> for TermError {
    fn from(err: serde_json::Error) -> Self {
        TermError::Serialization(err.to_string())
    }
}

impl From<InvariantViolation> for TermError {
    fn from(err: InvariantViolation) -> Self {
        TermError::Invariant(Box::new(err))
    }
}

/// Raised when the result of a guarded function fails one of its checks.
///
/// The original failure is available through [`std::error::Error::source`]
/// and [`InvariantViolation::cause`]. When the guard was configured to attach
/// its input, the offending dataset travels with the error and can be
/// recovered with [`InvariantViolation::input`].
#[derive(Error)]
#[error("Function '{function}' broke an invariant")]
pub struct InvariantViolation {
    function: String,
    check: String,
    #[source]
    source: Box<TermError>,
    input: Option<Box<dyn Any + Send + Sync>>,
}

impl InvariantViolation {
    /// Creates a violation of `check` by the result of `function`.
    pub fn new(function: impl Into<String>, check: impl Into<String>, source: TermError) -> Self {
        Self {
            function: function.into(),
            check: check.into(),
            source: Box::new(source),
            input: None,
        }
    }

    /// Attaches the dataset that failed the check.
    pub fn with_input<D: Any + Send + Sync>(mut self, input: D) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    /// Name of the guarded function whose result was rejected.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Name of the check that rejected it.
    pub fn check(&self) -> &str {
        &self.check
    }

    /// The failure raised by the check.
    pub fn cause(&self) -> &TermError {
        &self.source
    }

    /// Follows nested violations down to the assertion that started the chain.
    pub fn root_cause(&self) -> Option<&AssertionFailure> {
        let mut current = self.source.as_ref();
        loop {
            match current {
                TermError::Assertion(failure) => return Some(failure),
                TermError::Invariant(inner) => current = inner.source.as_ref(),
                _ => return None,
            }
        }
    }

    /// The offending dataset, if one was attached and has type `D`.
    pub fn input<D: Any>(&self) -> Option<&D> {
        self.input.as_ref()?.downcast_ref::<D>()
    }

    /// Takes ownership of the offending dataset, if one was attached and has type `D`.
    pub fn into_input<D: Any>(self) -> Option<D> {
        self.input?.downcast::<D>().ok().map(|boxed| *boxed)
    }

    /// Returns true if a dataset was attached.
    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }
}

impl fmt::Debug for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvariantViolation")
            .field("function", &self.function)
            .field("check", &self.check)
            .field("source", &self.source)
            .field("has_input", &self.has_input())
            .finish()
    }
}

/// Error returned by a guarded function.
#[derive(Error, Debug)]
pub enum GuardError<E> {
    /// The target function itself failed; no check ran.
    #[error(transparent)]
    Target(E),

    /// The target's result broke an invariant.
    #[error(transparent)]
    Invariant(InvariantViolation),

    /// A check failed for a reason other than invalid data.
    #[error(transparent)]
    Check(TermError),
}

impl<E> GuardError<E> {
    /// Returns true for invariant violations.
    pub fn is_invariant(&self) -> bool {
        matches!(self, GuardError::Invariant(_))
    }

    /// Returns the violation, if this is one.
    pub fn as_invariant(&self) -> Option<&InvariantViolation> {
        match self {
            GuardError::Invariant(violation) => Some(violation),
            _ => None,
        }
    }

    /// Returns the target's own error, if this is one.
    pub fn into_target(self) -> Option<E> {
        match self {
            GuardError::Target(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GuardError<TermError>> for TermError {
    fn from(err: GuardError<TermError>) -> Self {
        match err {
            GuardError::Target(err) | GuardError::Check(err) => err,
            GuardError::Invariant(violation) => violation.into(),
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<TermError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.with_context(|| msg.to_string())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            // Keep the assertion family intact so guards still recognise it.
            assertion @ (TermError::Assertion(_) | TermError::Invariant(_)) => assertion,
            TermError::Internal(inner) => TermError::Internal(format!("{}: {}", f(), inner)),
            other => TermError::Internal(format!("{}: {}", f(), other)),
        })
    }
}
