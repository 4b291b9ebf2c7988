//! Log output of guarded functions.
//!
//! Guards report through `tracing` at `debug` level and nothing else: a
//! violation is logged (when enabled) and then returned, never swallowed.
//! [`LogConfig`] decides what a guard reports; [`setup`] installs a
//! subscriber for applications that do not bring their own.

use tracing::Level;

/// What a guard reports while validating results.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Least severe level at which guard internals are reported
    pub base_level: Level,
    /// Report every check a guard runs, passing ones included
    pub log_check_details: bool,
    /// Report invariant violations before returning them
    pub log_violations: bool,
    /// Longest rendering of arguments or error messages put into a field
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_check_details: false,
            log_violations: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Reports every check, its bound arguments and its outcome.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_check_details: true,
            log_violations: true,
            max_field_length: 1024,
        }
    }

    /// Reports nothing; violations still reach the caller as errors.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_check_details: false,
            log_violations: false,
            max_field_length: 128,
        }
    }

    /// Same as [`LogConfig::default`]: violations only.
    pub fn balanced() -> Self {
        Self::default()
    }
}

/// Emits a `debug` event only when the config's base level is `DEBUG` or
/// `TRACE`, so field expressions are not evaluated otherwise.
///
/// `tracing` orders levels by verbosity: `TRACE > DEBUG > INFO`.
#[macro_export]
macro_rules! perf_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.base_level >= tracing::Level::DEBUG {
            tracing::debug!($($arg)*);
        }
    };
}

/// Emits a `debug` event per evaluated check when `log_check_details` is set.
#[macro_export]
macro_rules! log_check {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_check_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Emits a `debug` event for an invariant violation when `log_violations` is set.
#[macro_export]
macro_rules! log_violation {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_violations {
            tracing::debug!($($arg)*);
        }
    };
}

/// Cuts `value` to at most `max_length` bytes on a character boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut cut = max_length;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...(truncated)", &value[..cut])
}

/// Installing a global subscriber.
pub mod setup {
    use tracing::Level;

    /// How the global subscriber filters and formats events.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Level for every target other than this crate
        pub level: Level,
        /// Level for `term_invariant` targets
        pub crate_level: Level,
        /// Emit one JSON object per event instead of human-readable lines
        pub json_format: bool,
        /// Complete filter directive string, replacing the two levels above
        pub filter_override: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                crate_level: Level::DEBUG,
                json_format: false,
                filter_override: None,
            }
        }
    }

    impl LoggingConfig {
        /// JSON lines, warnings from dependencies, info from guards.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: true,
                filter_override: None,
            }
        }

        /// Human-readable lines with everything at debug.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                crate_level: Level::DEBUG,
                json_format: false,
                filter_override: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        pub fn with_filter_override(mut self, directives: impl Into<String>) -> Self {
            self.filter_override = Some(directives.into());
            self
        }

        /// Filter directives in `EnvFilter` syntax, e.g. `info,term_invariant=debug`.
        pub fn directives(&self) -> String {
            match &self.filter_override {
                Some(directives) => directives.clone(),
                None => format!(
                    "{},{}={}",
                    self.level.as_str().to_lowercase(),
                    env!("CARGO_CRATE_NAME"),
                    self.crate_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs a global `tracing` subscriber built from `config`.
    ///
    /// A set `RUST_LOG` wins over the configured directives. Fails if a global
    /// subscriber is already installed.
    ///
    /// ```rust,no_run
    /// use term_invariant::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::production()).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.directives()));

        let output = match config.json_format {
            true => tracing_subscriber::fmt::layer().json().boxed(),
            false => tracing_subscriber::fmt::layer().boxed(),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(output)
            .try_init()?;
        Ok(())
    }
}
