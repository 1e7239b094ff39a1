//! Client error types.

use sunona_core::IdentityError;
use thiserror::Error;

/// Errors surfaced by fallible session entry points.
///
/// The interactive operations ([`crate::Session::join`],
/// [`crate::Session::send_message`]) refuse invalid input silently; the
/// `try_` variants report why instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Display name failed validation.
    #[error("invalid display name: {0}")]
    InvalidIdentity(#[from] IdentityError),

    /// Message text is empty after trimming.
    #[error("message text is empty")]
    EmptyMessage,

    /// Operation requires a joined identity.
    #[error("not joined: choose a display name first")]
    NotJoined,

    /// Operation would emit but the session is detached.
    #[error("session is detached")]
    Detached,
}
