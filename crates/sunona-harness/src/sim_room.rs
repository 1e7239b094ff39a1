//! In-memory room.
//!
//! Runs the relay's [`RoomHub`] without sockets: every connection gets a
//! delivery queue and broadcasts are pushed onto the recipients' queues in
//! session-ID order. Every delivery is also recorded so tests can check the
//! fan-out contract after the fact.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use sunona_app::AppEvent;
use sunona_client::SessionEvent;
use sunona_proto::{ClientSignal, ServerSignal};
use sunona_server::{RoomHub, ServerAction, ServerEvent};

/// Something the room hands to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The connection was established.
    Connected,
    /// The room closed the connection.
    Disconnected,
    /// A relayed signal.
    Signal(ServerSignal),
}

impl Delivery {
    /// As an application event.
    pub fn into_app_event(self) -> AppEvent {
        match self {
            Self::Connected => AppEvent::Connected,
            Self::Disconnected => AppEvent::Disconnected,
            Self::Signal(signal) => AppEvent::Signal(signal),
        }
    }

    /// As a session event.
    pub fn into_session_event<I>(self) -> SessionEvent<I> {
        match self {
            Self::Connected => SessionEvent::Connected,
            Self::Disconnected => SessionEvent::Disconnected,
            Self::Signal(signal) => SessionEvent::Signal(signal),
        }
    }
}

/// One broadcast delivery, as recorded by the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relayed {
    /// Connection the broadcast was excluded from (its origin).
    pub origin: Option<u64>,
    /// Connection that received it.
    pub recipient: u64,
    /// What was delivered.
    pub signal: ServerSignal,
}

/// Single room with in-memory connections.
#[derive(Debug)]
pub struct SimRoom {
    /// Relay logic under test
    hub: RoomHub,
    next_session: u64,
    inboxes: BTreeMap<u64, VecDeque<Delivery>>,
    /// Closed by the room; the queue lives until drained.
    closed: BTreeSet<u64>,
    relayed: Vec<Relayed>,
}

impl Default for SimRoom {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRoom {
    /// Create an empty room with no connection limit to speak of.
    pub fn new() -> Self {
        Self::with_max_connections(usize::MAX)
    }

    /// Create an empty room that refuses connections beyond `max`.
    pub fn with_max_connections(max: usize) -> Self {
        Self {
            hub: RoomHub::new(max),
            next_session: 1,
            inboxes: BTreeMap::new(),
            closed: BTreeSet::new(),
            relayed: Vec::new(),
        }
    }

    /// Open a connection. Its queue starts with [`Delivery::Connected`].
    ///
    /// Returns the session ID. If the hub refuses the connection, the queue
    /// holds `Connected` followed by `Disconnected`.
    pub fn connect(&mut self) -> u64 {
        let session_id = self.next_session;
        self.next_session += 1;
        self.inboxes.insert(session_id, VecDeque::from([Delivery::Connected]));

        self.process(ServerEvent::ConnectionAccepted { session_id });
        session_id
    }

    /// Deliver a client signal from `session_id` to the hub.
    ///
    /// Signals from closed connections are dropped, as a socket would.
    pub fn send(&mut self, session_id: u64, signal: ClientSignal) {
        if !self.is_open(session_id) {
            tracing::debug!(
                session_id,
                signal = signal.name(),
                "Dropping signal from closed connection"
            );
            return;
        }
        self.process(ServerEvent::SignalReceived { session_id, signal });
    }

    /// Close a connection from the client side.
    ///
    /// Returns false if it was already closed. Queued deliveries are lost.
    pub fn disconnect(&mut self, session_id: u64) -> bool {
        let was_open = self.is_open(session_id);
        self.inboxes.remove(&session_id);
        self.closed.remove(&session_id);
        if !was_open {
            return false;
        }
        self.process(ServerEvent::ConnectionClosed {
            session_id,
            reason: "client disconnected".to_string(),
        });
        true
    }

    /// Take everything queued for `session_id`.
    pub fn drain(&mut self, session_id: u64) -> Vec<Delivery> {
        let drained =
            self.inboxes.get_mut(&session_id).map(|q| q.drain(..).collect()).unwrap_or_default();
        if self.closed.remove(&session_id) {
            self.inboxes.remove(&session_id);
        }
        drained
    }

    /// True if any connection has queued deliveries.
    pub fn has_pending(&self) -> bool {
        self.inboxes.values().any(|q| !q.is_empty())
    }

    /// True while the connection is open.
    pub fn is_open(&self, session_id: u64) -> bool {
        self.inboxes.contains_key(&session_id) && !self.closed.contains(&session_id)
    }

    /// Every broadcast delivery so far, in order.
    pub fn relayed(&self) -> &[Relayed] {
        &self.relayed
    }

    /// The underlying hub.
    pub fn hub(&self) -> &RoomHub {
        &self.hub
    }

    fn process(&mut self, event: ServerEvent) {
        match self.hub.process_event(event) {
            Ok(actions) => self.execute(actions),
            Err(e) => tracing::warn!("Hub rejected event: {}", e),
        }
    }

    fn execute(&mut self, actions: Vec<ServerAction>) {
        for action in actions {
            match action {
                ServerAction::Broadcast { signal, exclude_session } => {
                    let recipients: Vec<u64> = self.hub.recipients(exclude_session).collect();
                    for recipient in recipients {
                        let Some(inbox) = self.inboxes.get_mut(&recipient) else {
                            continue;
                        };
                        inbox.push_back(Delivery::Signal(signal.clone()));
                        self.relayed.push(Relayed {
                            origin: exclude_session,
                            recipient,
                            signal: signal.clone(),
                        });
                    }
                },
                ServerAction::CloseConnection { session_id, reason } => {
                    tracing::debug!(session_id, %reason, "Room closed connection");
                    if let Some(inbox) = self.inboxes.get_mut(&session_id) {
                        inbox.push_back(Delivery::Disconnected);
                        self.closed.insert(session_id);
                    }
                },
                ServerAction::Log { message, .. } => tracing::debug!("{}", message),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sunona_proto::WireMessage;

    use super::*;

    fn signals(deliveries: Vec<Delivery>) -> Vec<ServerSignal> {
        deliveries
            .into_iter()
            .filter_map(|d| match d {
                Delivery::Signal(signal) => Some(signal),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn new_connection_starts_connected() {
        let mut room = SimRoom::new();
        let a = room.connect();

        assert!(room.is_open(a));
        assert_eq!(room.drain(a), [Delivery::Connected]);
        assert!(!room.has_pending());
    }

    #[test]
    fn broadcasts_reach_joined_peers_only() {
        let mut room = SimRoom::new();
        let a = room.connect();
        let b = room.connect();
        let lurker = room.connect();
        room.send(b, ClientSignal::JoinRoom("Bob".into()));
        room.send(a, ClientSignal::JoinRoom("Alice".into()));
        room.send(a, ClientSignal::ChatMessage(WireMessage::chat(1, "Alice", "hi", 0)));

        let to_bob = signals(room.drain(b));
        assert_eq!(to_bob.len(), 2);
        assert_eq!(to_bob[0], ServerSignal::RoomNotice("Alice".into()));
        assert!(matches!(&to_bob[1], ServerSignal::ChatMessage(m) if m.text == "hi"));

        assert_eq!(signals(room.drain(a)), [ServerSignal::RoomNotice("Bob".into())]);
        assert!(signals(room.drain(lurker)).is_empty());
        assert!(room.relayed().iter().all(|r| r.origin != Some(r.recipient)));
    }

    #[test]
    fn over_limit_connection_is_closed() {
        let mut room = SimRoom::with_max_connections(1);
        let a = room.connect();
        let b = room.connect();

        assert!(room.is_open(a));
        assert!(!room.is_open(b));
        assert_eq!(room.drain(b), [Delivery::Connected, Delivery::Disconnected]);
        assert!(room.drain(b).is_empty());
    }

    #[test]
    fn disconnect_stops_typing_for_peers() {
        let mut room = SimRoom::new();
        let a = room.connect();
        let b = room.connect();
        room.send(a, ClientSignal::JoinRoom("Alice".into()));
        room.send(b, ClientSignal::JoinRoom("Bob".into()));
        room.send(a, ClientSignal::Typing("Alice".into()));
        room.drain(b);

        assert!(room.disconnect(a));
        assert!(!room.disconnect(a));
        assert_eq!(signals(room.drain(b)), [ServerSignal::StopTyping("Alice".into())]);
    }

    #[test]
    fn signals_from_closed_connections_are_dropped() {
        let mut room = SimRoom::new();
        let a = room.connect();
        let b = room.connect();
        room.send(b, ClientSignal::JoinRoom("Bob".into()));
        room.disconnect(a);
        room.send(a, ClientSignal::JoinRoom("Ghost".into()));

        assert!(signals(room.drain(b)).is_empty());
        assert_eq!(room.hub().connection_count(), 1);
    }

    #[test]
    fn deliveries_convert_to_events() {
        let signal = ServerSignal::Typing("Bob".into());
        assert_eq!(Delivery::Connected.into_app_event(), AppEvent::Connected);
        assert_eq!(Delivery::Signal(signal.clone()).into_app_event(), AppEvent::Signal(signal));
        assert!(matches!(
            Delivery::Disconnected.into_session_event::<u64>(),
            SessionEvent::Disconnected
        ));
    }
}
