//! Error types for core validation.

use thiserror::Error;

/// Reasons a display name is rejected.
///
/// The session treats every variant as a silent refusal at the input
/// boundary; the typed error exists so callers and tests can tell why.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Name is empty after trimming whitespace
    #[error("display name is empty")]
    Empty,

    /// Name exceeds the character limit
    #[error("display name has {len} characters, maximum is {max}")]
    TooLong {
        /// Character count of the trimmed name
        len: usize,
        /// Configured maximum
        max: usize,
    },
}
