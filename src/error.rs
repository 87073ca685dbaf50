//! Custom error types for the application.
//!
//! This module defines the primary error type, `ScopeError`, for the entire
//! application. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle the different kinds of errors that can occur,
//! from I/O and configuration issues to parameter validation failures.
//!
//! Nothing in this layer is fatal to the hosting process: every interaction
//! level failure (a rejected edit, a locked selector, a mixed-extension file
//! drop) is recoverable and is surfaced to the user through the GUI.

use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, ScopeError>;

#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse parameter file: {0}")]
    ParseTree(String),

    #[error("Unknown parameter path '{0}'")]
    UnknownPath(String),

    #[error("Type mismatch for parameter '{path}' (expected {expected})")]
    TypeMismatch { path: String, expected: &'static str },

    #[error("Value for parameter '{0}' is outside its allowed range")]
    OutOfRange(String),

    #[error("Value for parameter '{0}' is not in its allowed set")]
    NotInSet(String),

    #[error("Parameter '{0}' is not mutable")]
    Immutable(String),

    #[error("Configuration selector is locked during a capture")]
    SelectorLocked,

    #[error("The current configuration cannot be removed")]
    CannotRemoveCurrent,

    #[error("Unknown configuration '{0}'")]
    UnknownConfiguration(String),

    #[error("Dropped files do not all share the same extension")]
    MixedDropExtensions,
}
