//! Parse errors for invocation-context values.

use thiserror::Error;

/// Errors raised while interpreting platform and interpreter identifiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    /// The platform identifier is not one of the recognised forms.
    #[error("unrecognised platform identifier {value:?}: {reason}")]
    InvalidPlatform {
        /// The identifier as supplied.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The interpreter version could not be parsed as `MAJOR.MINOR[.PATCH]`.
    #[error("invalid interpreter version {value:?}: {reason}")]
    InvalidInterpreterVersion {
        /// The version as supplied.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A release number contained no leading numeric component.
    #[error("invalid release number {value:?}")]
    InvalidReleaseNumber {
        /// The release string as supplied.
        value: String,
    },
}
