//! Decorators that enforce a check on the result of a function.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::GuardConfig;
use crate::core::{Check, CheckArgs};
use crate::error::{GuardError, InvariantViolation, TermError};
use crate::logging::truncate_field;
use crate::{log_check, log_violation, perf_debug};

/// A check bound to a fixed set of arguments, ready to decorate functions.
///
/// Obtained from [`Check::as_decorator`]. A decorator is a plain reusable
/// value: it can be applied to any number of target functions, and every
/// resulting [`Guarded`] function runs the check with the same bound
/// arguments.
pub struct Decorator<D: ?Sized> {
    check: Check<D>,
    args: Arc<CheckArgs>,
    config: GuardConfig,
}

impl<D: ?Sized> Decorator<D> {
    pub(crate) fn new(check: Check<D>, args: CheckArgs, config: GuardConfig) -> Self {
        Self {
            check,
            args: Arc::new(args),
            config,
        }
    }

    /// The check this decorator enforces.
    pub fn check(&self) -> &Check<D> {
        &self.check
    }

    /// The arguments passed to the check after the dataset.
    pub fn args(&self) -> &CheckArgs {
        &self.args
    }

    /// The configuration of the guards this decorator produces.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Returns a copy of this decorator with a different guard configuration.
    pub fn with_config(&self, config: GuardConfig) -> Self {
        Self {
            check: self.check.clone(),
            args: Arc::clone(&self.args),
            config,
        }
    }

    /// Runs the bound check against `dataset`.
    fn enforce(&self, function: &str, dataset: &D) -> Result<(), TermError> {
        perf_debug!(
            self.config.log,
            function = %function,
            check = %self.check.name(),
            args = %truncate_field(&self.args.to_string(), self.config.log.max_field_length),
            "Running check"
        );
        let outcome = self.check.call(dataset, &self.args).map(|_| ());
        match &outcome {
            Ok(()) => log_check!(
                self.config.log,
                function = %function,
                check = %self.check.name(),
                "Invariant held"
            ),
            Err(err) => log_check!(
                self.config.log,
                function = %function,
                check = %self.check.name(),
                error = %truncate_field(&err.to_string(), self.config.log.max_field_length),
                "Check failed"
            ),
        }
        outcome
    }
}

impl<D> Decorator<D> {
    /// Decorates `target`, naming it after its Rust item name.
    ///
    /// Closures and function pointers have no usable name and are reported
    /// as `<anonymous>`; use [`Decorator::apply_named`] for them.
    pub fn apply<F>(&self, target: F) -> Guarded<D, F> {
        self.apply_named(function_name::<F>(), target)
    }

    /// Decorates `target` under an explicit name.
    pub fn apply_named<F>(&self, name: impl Into<String>, target: F) -> Guarded<D, F> {
        Guarded {
            name: name.into(),
            target,
            decorators: vec![self.clone()],
        }
    }
}

impl<D: ?Sized> Clone for Decorator<D> {
    fn clone(&self) -> Self {
        Self {
            check: self.check.clone(),
            args: Arc::clone(&self.args),
            config: self.config.clone(),
        }
    }
}

impl<D: ?Sized> fmt::Debug for Decorator<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorator")
            .field("check", &self.check.name())
            .field("args", &self.args)
            .field("config", &self.config)
            .finish()
    }
}

/// A function whose result is validated on every call.
///
/// Produced by [`Decorator::apply`]. Calling it runs the target, then every
/// decorator in the order they were applied. The result is returned unchanged
/// when all checks pass.
///
/// # Examples
///
/// ```rust
/// use term_invariant::core::{Check, CheckArgs};
/// use term_invariant::error::{GuardError, TermError};
///
/// let at_most = Check::new("at_most", |data: &Vec<i64>, args: &CheckArgs| {
///     let limit: i64 = args.require(0, "limit", "at_most")?;
///     match data.iter().find(|v| **v > limit) {
///         Some(v) => Err(TermError::assertion(format!("{v} exceeds {limit}"))),
///         None => Ok(()),
///     }
/// });
///
/// fn load(n: i64) -> Result<Vec<i64>, std::io::Error> {
///     Ok((0..n).collect())
/// }
///
/// let guarded = at_most.as_decorator(CheckArgs::new().arg(3)).apply(load);
/// assert_eq!(guarded.call(3).unwrap(), vec![0, 1, 2]);
///
/// let err = guarded.call(10).unwrap_err();
/// assert!(matches!(err, GuardError::Invariant(_)));
/// assert_eq!(err.to_string(), "Function 'load' broke an invariant");
/// ```
pub struct Guarded<D, F> {
    name: String,
    target: F,
    decorators: Vec<Decorator<D>>,
}

impl<D, F> Guarded<D, F> {
    /// Name used for the target in violation messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decorators in the order they run.
    pub fn decorators(&self) -> &[Decorator<D>] {
        &self.decorators
    }

    /// Adds another decorator, run after those already applied.
    pub fn with(mut self, decorator: Decorator<D>) -> Self {
        self.decorators.push(decorator);
        self
    }

    /// Calls the target and validates its result.
    ///
    /// - a target error is returned as [`GuardError::Target`] and no check runs;
    /// - an assertion-family check error becomes [`GuardError::Invariant`];
    /// - any other check error is returned as [`GuardError::Check`].
    #[instrument(level = "debug", skip_all, fields(
        function = %self.name,
        checks = self.decorators.len()
    ))]
    pub fn call<A, E>(&self, args: A) -> Result<D, GuardError<E>>
    where
        F: Fn(A) -> Result<D, E>,
        D: Any + Send + Sync,
    {
        let result = (self.target)(args).map_err(GuardError::Target)?;

        for decorator in &self.decorators {
            match decorator.enforce(&self.name, &result) {
                Ok(()) => {}
                Err(err) if err.is_assertion() => {
                    log_violation!(
                        decorator.config.log,
                        function = %self.name,
                        check = %decorator.check.name(),
                        "Function broke an invariant"
                    );
                    let violation =
                        InvariantViolation::new(self.name.clone(), decorator.check.name(), err);
                    let violation = if decorator.config.attach_input {
                        violation.with_input(result)
                    } else {
                        violation
                    };
                    return Err(GuardError::Invariant(violation));
                }
                Err(err) => {
                    debug!(
                        function = %self.name,
                        check = %decorator.check.name(),
                        "Check errored without asserting"
                    );
                    return Err(GuardError::Check(err));
                }
            }
        }

        Ok(result)
    }

    /// Turns the guarded function into a plain closure.
    pub fn into_fn<A, E>(self) -> impl Fn(A) -> Result<D, GuardError<E>>
    where
        F: Fn(A) -> Result<D, E>,
        D: Any + Send + Sync,
    {
        move |args| self.call(args)
    }
}

impl<D, F> fmt::Debug for Guarded<D, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guarded")
            .field("name", &self.name)
            .field("decorators", &self.decorators)
            .finish_non_exhaustive()
    }
}

/// Name used for targets whose type carries no item name.
pub(crate) const ANONYMOUS: &str = "<anonymous>";

/// Short name of a function type, e.g. `load_people` for `my_crate::io::load_people`.
///
/// Closures and function pointers yield [`ANONYMOUS`].
pub(crate) fn function_name<F>() -> String {
    let full = std::any::type_name::<F>();
    if full.starts_with("fn(") || full.starts_with("unsafe ") || full.contains("{{closure}}") {
        return ANONYMOUS.to_string();
    }
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AssertionFailure, Result};
    use std::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn non_negative(data: &Vec<i64>, _args: &CheckArgs) -> Result<()> {
        match data.iter().find(|v| **v < 0) {
            Some(v) => Err(TermError::assertion(format!("found negative value {v}"))),
            None => Ok(()),
        }
    }

    fn load_people(ages: Vec<i64>) -> std::result::Result<Vec<i64>, String> {
        Ok(ages)
    }

    #[test]
    fn test_pass_through_on_success() {
        let guarded = Check::new("non_negative", non_negative)
            .decorator()
            .apply(load_people);
        assert_eq!(guarded.call(vec![1, 2, 3]).unwrap(), load_people(vec![1, 2, 3]).unwrap());
    }

    #[test]
    fn test_violation_names_function_and_chains_cause() {
        let guarded = Check::new("non_negative", non_negative)
            .decorator()
            .apply(load_people);
        let err = guarded.call(vec![4, -1]).unwrap_err();
        assert_eq!(err.to_string(), "Function 'load_people' broke an invariant");

        let violation = err.as_invariant().unwrap();
        assert_eq!(violation.function(), "load_people");
        assert_eq!(violation.check(), "non_negative");
        assert_eq!(
            violation.source().map(ToString::to_string),
            Some("found negative value -1".to_string())
        );
        assert_eq!(
            violation.root_cause().map(AssertionFailure::message),
            Some("found negative value -1")
        );
        assert_eq!(violation.input::<Vec<i64>>(), Some(&vec![4, -1]));
    }

    #[test]
    fn test_attach_input_disabled() {
        let guarded = Check::new("non_negative", non_negative)
            .as_decorator_with_config(CheckArgs::new(), GuardConfig::lightweight())
            .apply(load_people);
        let err = guarded.call(vec![-1]).unwrap_err();
        assert!(!err.as_invariant().unwrap().has_input());
    }

    #[test]
    fn test_target_error_skips_check() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let check = Check::new("counting", move |_: &Vec<i64>, _: &CheckArgs| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let failing = |_: ()| -> std::result::Result<Vec<i64>, String> { Err("io".to_string()) };
        let guarded = check.decorator().apply_named("failing", failing);

        let err = guarded.call(()).unwrap_err();
        assert_eq!(err.into_target(), Some("io".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_non_assertion_check_error_is_not_wrapped() {
        let check = Check::new("broken", |_: &Vec<i64>, _: &CheckArgs| {
            Err(TermError::ColumnNotFound {
                column: "age".to_string(),
            })
        });
        let guarded = check.decorator().apply(load_people);
        let err = guarded.call(vec![1]).unwrap_err();
        assert!(matches!(err, GuardError::Check(TermError::ColumnNotFound { .. })));
        assert_eq!(err.to_string(), "Column 'age' not found in dataset");
    }

    #[test]
    fn test_arguments_forwarded_exactly() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let check = Check::new("recording", move |data: &Vec<i64>, args: &CheckArgs| {
            sink.lock().unwrap().push((data.clone(), args.clone()));
            Ok(())
        });
        let bound = CheckArgs::new().arg("a").arg("b").kwarg("k", "v");
        let guarded = check.as_decorator(bound.clone()).apply(load_people);
        guarded.call(vec![7]).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], (vec![7], bound));
    }

    #[test]
    fn test_independent_bindings() {
        let at_most = Check::new("at_most", |data: &Vec<i64>, args: &CheckArgs| {
            let limit: i64 = args.require(0, "limit", "at_most")?;
            if data.iter().any(|v| *v > limit) {
                return Err(TermError::assertion(format!("value above {limit}")));
            }
            Ok(())
        });
        let loose = at_most.as_decorator(CheckArgs::new().arg(100)).apply(load_people);
        let tight = at_most.as_decorator(CheckArgs::new().arg(5)).apply(load_people);

        assert!(loose.call(vec![50]).is_ok());
        assert!(tight.call(vec![50]).is_err());
        assert!(loose.call(vec![50]).is_ok());
    }

    #[test]
    fn test_stacked_decorators_run_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let first_log = Arc::clone(&order);
        let second_log = Arc::clone(&order);
        let first = Check::new("first", move |_: &Vec<i64>, _: &CheckArgs| {
            first_log.lock().unwrap().push("first");
            Ok(())
        });
        let second = Check::new("second", move |_: &Vec<i64>, _: &CheckArgs| {
            second_log.lock().unwrap().push("second");
            Err(TermError::assertion("second failed"))
        });

        let guarded = first
            .decorator()
            .apply(load_people)
            .with(second.decorator())
            .with(Check::new("non_negative", non_negative).decorator());
        let err = guarded.call(vec![-1]).unwrap_err();

        assert_eq!(err.as_invariant().unwrap().check(), "second");
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_nested_guard_is_translated_again() {
        let inner = Check::new("non_negative", non_negative)
            .decorator()
            .apply(load_people);
        let outer_check = Check::new("reloads", move |data: &Vec<i64>, _: &CheckArgs| {
            match inner.call(data.clone()) {
                Ok(_) => Ok(()),
                Err(GuardError::Invariant(violation)) => Err(violation.into()),
                Err(other) => Err(TermError::Internal(other.to_string())),
            }
        });

        let err = outer_check
            .decorator()
            .apply_named("pipeline", load_people)
            .call(vec![-5])
            .unwrap_err();
        let violation = err.as_invariant().unwrap();
        assert_eq!(violation.function(), "pipeline");
        assert!(matches!(violation.cause(), TermError::Invariant(_)));
        assert_eq!(
            violation.root_cause().map(AssertionFailure::message),
            Some("found negative value -5")
        );
    }

    #[test]
    fn test_into_fn() {
        let guarded = Check::new("non_negative", non_negative)
            .decorator()
            .apply(load_people)
            .into_fn();
        assert!(guarded(vec![0]).is_ok());
        assert!(guarded(vec![-1]).is_err());
    }

    #[test]
    fn test_function_name() {
        assert_eq!(function_name::<fn()>(), ANONYMOUS);
        assert_eq!(function_name::<fn(Vec<i64>) -> Option<i64>>(), ANONYMOUS);
        let name = {
            fn helper<F>(_: &F) -> String {
                function_name::<F>()
            }
            helper(&load_people)
        };
        assert_eq!(name, "load_people");
    }

    #[test]
    fn test_pointer_and_closure_targets_are_anonymous() {
        let pointer: fn(Vec<i64>) -> std::result::Result<Vec<i64>, String> = load_people;
        let check = Check::new("non_negative", non_negative);

        let err = check.decorator().apply(pointer).call(vec![-1]).unwrap_err();
        assert_eq!(err.to_string(), "Function '<anonymous>' broke an invariant");

        let closure = check.decorator().apply(|v: Vec<i64>| load_people(v));
        assert_eq!(closure.name(), ANONYMOUS);

        let named = check.decorator().apply_named("load_ages", pointer);
        assert_eq!(named.name(), "load_ages");
    }

    #[test]
    fn test_unsized_decorator_keeps_binding() {
        fn short(data: &str, args: &CheckArgs) -> Result<()> {
            let max: usize = args.require(0, "max", "short")?;
            if data.len() > max {
                return Err(TermError::assertion(format!("{data} is longer than {max}")));
            }
            Ok(())
        }

        let decorator = Check::<str>::new("short", short).as_decorator(CheckArgs::new().arg(3));
        assert_eq!(decorator.check().name(), "short");
        assert_eq!(decorator.args(), &CheckArgs::new().arg(3));
        assert!(decorator.enforce("inline", "abc").is_ok());
        assert!(decorator.enforce("inline", "abcd").unwrap_err().is_assertion());
    }
}
