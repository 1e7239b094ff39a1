//! Server error types.
//!
//! - [`HubError`]: rejected events in the Sans-IO hub
//! - [`ServerError`]: runtime failures (bind, socket I/O, encoding)

use sunona_proto::ProtocolError;
use thiserror::Error;

/// Errors from [`crate::RoomHub::process_event`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    /// Session not found in registry.
    ///
    /// Occurs when an event names a session that was never accepted or has
    /// already closed. Transient for a racing close; the event is dropped.
    #[error("session {0} not found")]
    SessionNotFound(u64),

    /// Session already registered.
    ///
    /// Session IDs are assigned by the runtime and must be unique; this is a
    /// logic bug.
    #[error("session {0} already exists")]
    SessionAlreadyExists(u64),
}

/// Errors that can occur in the server runtime.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error (invalid bind address).
    ///
    /// Fatal: prevents server startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Socket I/O error.
    ///
    /// Fatal when binding; otherwise scoped to a single connection.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Outbound signal could not be encoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Hub rejected an event.
    #[error("hub error: {0}")]
    Hub(#[from] HubError),
}
