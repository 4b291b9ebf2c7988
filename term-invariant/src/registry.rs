//! Name-based lookup of checks.
//!
//! A [`CheckRegistry`] maps check names to [`Check`]s so callers can obtain a
//! decorator by name, e.g. from configuration files. [`builtin`] holds every
//! check from [`crate::checks`].
//!
//! ```rust
//! use serde_json::json;
//! use term_invariant::core::CheckArgs;
//! use term_invariant::registry;
//!
//! let decorator = registry::builtin()
//!     .as_decorator("is_shape", CheckArgs::new().arg(json!([null, 2])))
//!     .unwrap();
//! assert_eq!(decorator.check().name(), "is_shape");
//!
//! let err = registry::builtin().get("no_such_check").unwrap_err();
//! assert_eq!(err.to_string(), "Unknown check 'no_such_check'");
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::checks;
use crate::core::{Check, CheckArgs, Decorator};
use crate::error::{Result, TermError};
use crate::table::Frame;

static BUILTIN: Lazy<CheckRegistry<Frame>> = Lazy::new(|| {
    let registry = CheckRegistry::from_checks(checks::all())
        .unwrap_or_else(|err| unreachable!("built-in checks have unique names: {err}"));
    debug!(checks = registry.len(), "Initialized built-in check registry");
    registry
});

/// The registry of built-in checks over [`Frame`]s, built on first use.
pub fn builtin() -> &'static CheckRegistry<Frame> {
    &BUILTIN
}

/// A table of checks addressable by name.
pub struct CheckRegistry<D: ?Sized> {
    checks: BTreeMap<String, Check<D>>,
}

impl<D: ?Sized> CheckRegistry<D> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            checks: BTreeMap::new(),
        }
    }

    /// Builds a registry from a list of checks.
    pub fn from_checks<I>(checks: I) -> Result<Self>
    where
        I: IntoIterator<Item = Check<D>>,
    {
        let mut registry = Self::new();
        for check in checks {
            registry.register(check)?;
        }
        Ok(registry)
    }

    /// Adds a check under its own name.
    ///
    /// Fails with [`TermError::DuplicateCheck`] if the name is taken.
    pub fn register(&mut self, check: Check<D>) -> Result<()> {
        if self.checks.contains_key(check.name()) {
            return Err(TermError::DuplicateCheck {
                name: check.name().to_string(),
            });
        }
        self.checks.insert(check.name().to_string(), check);
        Ok(())
    }

    /// Looks up a check by name.
    pub fn get(&self, name: &str) -> Result<&Check<D>> {
        self.checks
            .get(name)
            .ok_or_else(|| TermError::UnknownCheck {
                name: name.to_string(),
            })
    }

    /// Returns the check whose [`Check::as_decorator`] produces decorators for `name`.
    pub fn decorator_factory(&self, name: &str) -> Result<Check<D>> {
        self.get(name).cloned()
    }

    /// Looks up `name` and binds `args` in one step.
    pub fn as_decorator(&self, name: &str, args: CheckArgs) -> Result<Decorator<D>> {
        Ok(self.get(name)?.as_decorator(args))
    }

    /// Returns true if a check is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.checks.keys().map(String::as_str)
    }

    /// Number of registered checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns true if no check is registered.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl<D: ?Sized> Default for CheckRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ?Sized> Clone for CheckRegistry<D> {
    fn clone(&self) -> Self {
        Self {
            checks: self.checks.clone(),
        }
    }
}

impl<D: ?Sized> std::fmt::Debug for CheckRegistry<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("checks", &self.checks.keys().collect::<Vec<_>>())
            .finish()
    }
}
