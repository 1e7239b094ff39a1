//! Room hub.
//!
//! Sans-IO relay logic for the single implicit room. Consumes connection
//! lifecycle and inbound signals, produces [`ServerAction`]s for the runtime.
//!
//! # Fan-out contract
//!
//! Every relayed signal is broadcast to the joined connections *except its
//! origin*. Clients append their own messages optimistically and rely on
//! never receiving them back.

use sunona_core::Identity;
use sunona_proto::{ClientSignal, ServerSignal, WireMessage};

use crate::{
    error::HubError,
    registry::{ConnectionRegistry, SessionInfo},
};

/// Events that the hub processes.
///
/// These are produced by the external runtime (simulation or production).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// A new connection was accepted
    ConnectionAccepted {
        /// Unique connection ID assigned by the runtime
        session_id: u64,
    },

    /// A signal was decoded from a connection
    SignalReceived {
        /// Connection that sent the signal
        session_id: u64,
        /// The decoded signal
        signal: ClientSignal,
    },

    /// A connection was closed (by peer or error)
    ConnectionClosed {
        /// Connection that was closed
        session_id: u64,
        /// Reason for closure
        reason: String,
    },
}

/// Actions that the hub produces.
///
/// These are executed by runtime-specific code (production or simulation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAction {
    /// Broadcast a signal to every joined session
    Broadcast {
        /// Signal to broadcast
        signal: ServerSignal,
        /// Session to exclude from broadcast (the origin)
        exclude_session: Option<u64>,
    },

    /// Close a connection
    CloseConnection {
        /// Session to close
        session_id: u64,
        /// Reason for closure
        reason: String,
    },

    /// Log a message (for debugging/monitoring)
    Log {
        /// Log level
        level: LogLevel,
        /// Message to log
        message: String,
    },
}

impl ServerAction {
    fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log { level, message: message.into() }
    }
}

/// Log levels for server actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational message
    Info,
    /// Warning
    Warn,
}

/// Action-based relay for one room.
#[derive(Debug)]
pub struct RoomHub {
    /// Session registry
    registry: ConnectionRegistry,
    /// Maximum concurrent connections
    max_connections: usize,
}

impl RoomHub {
    /// Create an empty hub.
    pub fn new(max_connections: usize) -> Self {
        Self { registry: ConnectionRegistry::new(), max_connections }
    }

    /// Process a hub event and return actions to execute.
    ///
    /// This is the main entry point for the hub.
    pub fn process_event(&mut self, event: ServerEvent) -> Result<Vec<ServerAction>, HubError> {
        match event {
            ServerEvent::ConnectionAccepted { session_id } => {
                self.handle_connection_accepted(session_id)
            },
            ServerEvent::SignalReceived { session_id, signal } => {
                self.handle_signal(session_id, signal)
            },
            ServerEvent::ConnectionClosed { session_id, reason } => {
                Ok(self.handle_connection_closed(session_id, &reason))
            },
        }
    }

    fn handle_connection_accepted(
        &mut self,
        session_id: u64,
    ) -> Result<Vec<ServerAction>, HubError> {
        if self.registry.len() >= self.max_connections {
            return Ok(vec![ServerAction::CloseConnection {
                session_id,
                reason: "max connections exceeded".to_string(),
            }]);
        }

        if !self.registry.register_session(session_id) {
            return Err(HubError::SessionAlreadyExists(session_id));
        }

        Ok(vec![ServerAction::log(LogLevel::Debug, format!("connection {session_id} accepted"))])
    }

    fn handle_signal(
        &mut self,
        session_id: u64,
        signal: ClientSignal,
    ) -> Result<Vec<ServerAction>, HubError> {
        let info =
            self.registry.session_mut(session_id).ok_or(HubError::SessionNotFound(session_id))?;

        let name = match (&signal, info.name.clone()) {
            (ClientSignal::JoinRoom(raw), _) => return Ok(Self::handle_join(session_id, info, raw)),
            (_, Some(name)) => name,
            (_, None) => {
                return Ok(vec![ServerAction::log(
                    LogLevel::Debug,
                    format!("ignoring {} from unjoined session {session_id}", signal.name()),
                )]);
            },
        };

        let relayed = match signal {
            ClientSignal::ChatMessage(message) => {
                if message.text.trim().is_empty() {
                    return Ok(vec![ServerAction::log(
                        LogLevel::Warn,
                        format!("dropping empty chatMessage from session {session_id}"),
                    )]);
                }
                ServerSignal::ChatMessage(stamp_sender(message, &name))
            },
            ClientSignal::Typing(_) => {
                info.typing = true;
                ServerSignal::Typing(name.into_string())
            },
            ClientSignal::StopTyping(_) | ClientSignal::JoinRoom(_) => {
                info.typing = false;
                ServerSignal::StopTyping(name.into_string())
            },
        };

        Ok(vec![ServerAction::Broadcast { signal: relayed, exclude_session: Some(session_id) }])
    }

    /// Join, or rename when already joined.
    fn handle_join(session_id: u64, info: &mut SessionInfo, raw: &str) -> Vec<ServerAction> {
        let identity = match Identity::parse(raw) {
            Ok(identity) => identity,
            Err(e) => {
                return vec![ServerAction::log(
                    LogLevel::Warn,
                    format!("session {session_id} sent invalid name: {e}"),
                )];
            },
        };

        let mut actions = Vec::new();
        if let Some(previous) = info.name.take()
            && info.typing
        {
            actions.push(ServerAction::Broadcast {
                signal: ServerSignal::StopTyping(previous.into_string()),
                exclude_session: Some(session_id),
            });
        }
        info.typing = false;

        actions.push(ServerAction::log(
            LogLevel::Info,
            format!("session {session_id} joined as {identity}"),
        ));
        actions.push(ServerAction::Broadcast {
            signal: ServerSignal::RoomNotice(identity.as_str().to_owned()),
            exclude_session: Some(session_id),
        });
        info.name = Some(identity);
        actions
    }

    fn handle_connection_closed(&mut self, session_id: u64, reason: &str) -> Vec<ServerAction> {
        let Some(info) = self.registry.unregister_session(session_id) else {
            return vec![];
        };

        let mut actions = vec![ServerAction::log(
            LogLevel::Debug,
            format!("connection {session_id} closed: {reason}"),
        )];

        if let Some(name) = info.name
            && info.typing
        {
            actions.push(ServerAction::Broadcast {
                signal: ServerSignal::StopTyping(name.into_string()),
                exclude_session: Some(session_id),
            });
        }
        actions
    }

    /// Sessions that receive broadcasts, in ID order.
    pub fn joined_sessions(&self) -> impl Iterator<Item = u64> + '_ {
        self.registry.joined_sessions()
    }

    /// Recipients of a broadcast.
    pub fn recipients(&self, exclude_session: Option<u64>) -> impl Iterator<Item = u64> + '_ {
        self.joined_sessions().filter(move |id| Some(*id) != exclude_session)
    }

    /// Session metadata. `None` if session doesn't exist.
    pub fn session(&self, session_id: u64) -> Option<&SessionInfo> {
        self.registry.session(session_id)
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }
}

/// The relayed message carries the name the origin joined under.
fn stamp_sender(mut message: WireMessage, name: &Identity) -> WireMessage {
    message.kind = None;
    message.sender = Some(name.as_str().to_owned());
    message
}
