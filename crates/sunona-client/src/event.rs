//! Session events and actions.

use sunona_proto::{ClientSignal, ServerSignal};

/// Events the caller feeds into the session.
///
/// The caller is responsible for:
/// - Forwarding transport lifecycle and inbound signals
/// - Driving time forward via ticks
///
/// Generic over `I` (Instant type) to support both production
/// (`std::time::Instant`) and virtual-clock environments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent<I = std::time::Instant> {
    /// Transport session established.
    Connected,

    /// Transport session lost.
    Disconnected,

    /// Named signal received from the room.
    Signal(ServerSignal),

    /// Time tick for deferred actions.
    ///
    /// The caller should send ticks periodically (or at
    /// [`crate::Session::next_deadline`]) so the welcome notice, the
    /// stop-typing timer and typer expiry can fire.
    Tick {
        /// Current time from the environment.
        now: I,
    },
}

/// Log levels for session actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational message
    Info,
    /// Warning
    Warn,
}

/// Actions the session produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Send a signal to the room.
    Emit(ClientSignal),

    /// Observable state changed; redraw.
    Render,

    /// Log message for diagnostics.
    Log {
        /// Severity
        level: LogLevel,
        /// Log message
        message: String,
    },
}

impl SessionAction {
    pub(crate) fn debug(message: impl Into<String>) -> Self {
        Self::Log { level: LogLevel::Debug, message: message.into() }
    }

    pub(crate) fn info(message: impl Into<String>) -> Self {
        Self::Log { level: LogLevel::Info, message: message.into() }
    }

    pub(crate) fn warn(message: impl Into<String>) -> Self {
        Self::Log { level: LogLevel::Warn, message: message.into() }
    }
}
