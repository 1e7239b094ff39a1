//! Application input events.
//!
//! This module defines [`AppEvent`], the inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (Keyboard, Resize) and system ticks.
//! - Transport notifications forwarded to the session.

use sunona_proto::ServerSignal;

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick. The app reads the time from its environment.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Transport connected.
    Connected,

    /// Transport disconnected.
    Disconnected,

    /// Signal received from the room.
    Signal(ServerSignal),

    /// Input source closed; shut down.
    Quit,
}
