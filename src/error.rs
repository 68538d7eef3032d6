//! Error types for repository operations.

use thiserror::Error;

/// Error type produced by validator hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by [`Repository`](crate::Repository) operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A validator hook rejected the pattern before conversion.
    #[error("pattern: \"{pattern}\" failed validation: {source}")]
    Validation {
        /// The pattern as supplied by the caller.
        pattern: String,
        /// The error reported by the failing hook.
        #[source]
        source: HookError,
    },

    /// The pattern converted to an empty key.
    #[error("pattern: \"{pattern}\" converts to an empty key")]
    EmptyKey {
        /// The pattern as supplied by the caller.
        pattern: String,
    },

    /// The selector marker appeared somewhere other than the last character.
    #[error("key: \"{key}\" has a selector before its last character")]
    MisplacedSelector {
        /// The converted key.
        key: String,
    },

    /// Insert on a key that is already present.
    #[error("key: \"{key}\" already exists")]
    KeyAlreadyExists {
        /// The converted key.
        key: String,
    },

    /// Inc on a key (or on the literal prefix of a selector) that was never inserted.
    #[error("key: \"{key}\" not found")]
    KeyNotFound {
        /// The converted key.
        key: String,
    },

    /// Insert called with a selector.
    #[error("key: \"{key}\" is a selector and is not allowed")]
    SelectorNotAllowed {
        /// The converted key.
        key: String,
    },
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
