//! Logging abstraction layer
//!
//! This module provides logging macros that work with both `log` and `tracing` crates,
//! plus the [`Warnings`] set used to report non-fatal problems exactly once per
//! matcher or history instance.
//!
//! # Features
//!
//! - `log` (default) - Uses the standard `log` crate
//! - `tracing` - Uses the `tracing` crate for structured logging
//!
//! Choose one feature at compile time. They are mutually exclusive.
//!
//! # Usage
//!
//! ```ignore
//! use nav_router::{trace_log, debug_log, info_log};
//!
//! trace_log!("Entering function");
//! debug_log!("Navigating to route: {}", path);
//! info_log!("Navigation complete");
//! ```

use std::collections::HashSet;
use std::fmt;

/// Trace-level logging
///
/// Logs detailed information for debugging purposes.
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($arg)*);
        #[cfg(feature = "log")]
        ::log::trace!($($arg)*);
    };
}

/// Debug-level logging
///
/// Logs information useful for debugging.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);
        #[cfg(feature = "log")]
        ::log::debug!($($arg)*);
    };
}

/// Info-level logging
///
/// Logs general informational messages.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!($($arg)*);
        #[cfg(feature = "log")]
        ::log::info!($($arg)*);
    };
}

/// Warn-level logging
///
/// Logs warning messages.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)*);
        #[cfg(feature = "log")]
        ::log::warn!($($arg)*);
    };
}

/// Error-level logging
///
/// Logs error messages.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::error!($($arg)*);
        #[cfg(feature = "log")]
        ::log::error!($($arg)*);
    };
}

// ============================================================================
// Warnings
// ============================================================================

/// A non-fatal problem. Execution always continues with a defined fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Warning {
    /// A pattern ends in `*` without a preceding `/`; it is treated as `/*`.
    SplatWithoutSlash {
        /// The pattern as written
        path: String,
    },

    /// A captured parameter could not be percent-decoded; the raw value is kept.
    MalformedParam {
        /// Parameter name
        param: String,
        /// Raw captured value
        value: String,
    },

    /// A location override does not start with the pathname matched by the parent routes.
    LocationOutsideParent {
        /// Pathname that was supplied
        pathname: String,
        /// Pathname base of the enclosing match
        parent_base: String,
    },

    /// A pop landed on an entry this history did not create, so it cannot be blocked.
    UnblockablePop {
        /// Pathname of the entry that was popped to
        pathname: String,
    },

    /// A push or replace produced a pathname that does not begin with `/`.
    RelativePathname {
        /// The offending pathname
        pathname: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::SplatWithoutSlash { path } => {
                let corrected = format!("{}/*", path.trim_end_matches('*'));
                write!(
                    f,
                    "Route path \"{path}\" will be treated as if it were \"{corrected}\" \
                     because the `*` character must always follow a `/` in the pattern"
                )
            }
            Warning::MalformedParam { param, value } => write!(
                f,
                "The value for the URL param \"{param}\" will not be decoded because \
                 the string \"{value}\" is a malformed URL segment"
            ),
            Warning::LocationOutsideParent {
                pathname,
                parent_base,
            } => write!(
                f,
                "Location pathname \"{pathname}\" does not begin with the pathname \
                 \"{parent_base}\" matched by all parent routes"
            ),
            Warning::UnblockablePop { pathname } => write!(
                f,
                "Cannot block a pop to \"{pathname}\": the entry was not created by this history"
            ),
            Warning::RelativePathname { pathname } => {
                write!(f, "Relative pathnames are not supported in history: \"{pathname}\"")
            }
        }
    }
}

/// Per-instance record of emitted warnings.
///
/// Each distinct warning is logged once at warn level; repeats are dropped.
#[derive(Debug, Clone, Default)]
pub struct Warnings {
    seen: HashSet<Warning>,
    emitted: Vec<Warning>,
}

impl Warnings {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning, logging it the first time it is seen.
    ///
    /// Returns `true` if the warning was new.
    pub fn warn(&mut self, warning: Warning) -> bool {
        if self.seen.contains(&warning) {
            return false;
        }
        warn_log!("{}", warning);
        self.seen.insert(warning.clone());
        self.emitted.push(warning);
        true
    }

    /// Warnings in the order they were first emitted
    pub fn emitted(&self) -> &[Warning] {
        &self.emitted
    }

    /// Drain the emitted list. The dedupe set is kept.
    pub fn take(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.emitted)
    }

    /// Check whether no warnings have been emitted since the last `take`
    pub fn is_empty(&self) -> bool {
        self.emitted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_are_deduplicated() {
        let mut warnings = Warnings::new();
        let warning = Warning::UnblockablePop {
            pathname: "/foreign".to_string(),
        };

        assert!(warnings.warn(warning.clone()));
        assert!(!warnings.warn(warning));
        assert_eq!(warnings.emitted().len(), 1);
    }

    #[test]
    fn test_take_keeps_dedupe_set() {
        let mut warnings = Warnings::new();
        let warning = Warning::SplatWithoutSlash {
            path: "/files*".to_string(),
        };

        warnings.warn(warning.clone());
        assert_eq!(warnings.take(), vec![warning.clone()]);
        assert!(warnings.is_empty());
        assert!(!warnings.warn(warning));
    }

    #[test]
    fn test_splat_warning_message_suggests_correction() {
        let warning = Warning::SplatWithoutSlash {
            path: "/files*".to_string(),
        };
        assert!(warning.to_string().contains("\"/files/*\""));
    }
}
