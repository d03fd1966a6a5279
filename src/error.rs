//! Error types
//!
//! Configuration problems in a route tree are fatal and reported synchronously
//! from the matching entry points. Everything recoverable is a
//! [`Warning`](crate::logging::Warning) instead.

use thiserror::Error;

// ============================================================================
// Configuration Errors
// ============================================================================

/// A route tree or pattern that cannot be used for matching
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// An absolute child path does not extend the combined path of its parents
    #[error(
        "Absolute route path \"{path}\" nested under path \"{parent}\" is not valid. \
         An absolute child route path must start with the combined path of all its parent routes."
    )]
    AbsolutePathNotNested {
        /// The child path as declared
        path: String,
        /// Accumulated path of the parent routes
        parent: String,
    },

    /// An index route declares children
    #[error(
        "Index routes must not have child routes. Please remove all child routes from route path \"{path}\"."
    )]
    IndexWithChildren {
        /// Accumulated path of the index route
        path: String,
    },

    /// The regex engine refused the compiled form of a pattern
    #[error("Route path \"{path}\" could not be compiled: {message}")]
    InvalidPattern {
        /// The pattern as written
        path: String,
        /// Message from the regex engine
        message: String,
    },
}

// ============================================================================
// Path Generation Errors
// ============================================================================

/// Errors from [`generate_path`](crate::generate_path)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratePathError {
    /// A `:name` segment has no value in the supplied params
    #[error("Missing \":{name}\" param")]
    MissingParam {
        /// Parameter name without the leading `:`
        name: String,
    },
}

// ============================================================================
// Tests
// ============================================================================
