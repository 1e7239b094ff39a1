//! Multi-client simulation.
//!
//! Wires several [`App`]s to one [`SimRoom`] on a shared virtual clock.
//! Outbound signals go straight into the room; deliveries are pumped back
//! into the apps by [`SimWorld::settle`] until the room is quiet. Reconnects
//! replay the client's last `joinRoom` the way the TCP transport does.

use sunona_app::{App, AppAction, AppEvent, KeyInput};
use sunona_client::{ClientSignal, Message, SessionConfig};
use sunona_core::env::test_utils::MockEnv;

use crate::{ClientSnapshot, Delivery, SimRoom, SystemSnapshot};

/// One simulated frontend.
pub struct SimClient {
    /// Application state machine.
    pub app: App<MockEnv>,
    /// Room connection. `None` while disconnected.
    pub session_id: Option<u64>,
    /// Last join sent, replayed on reconnect.
    last_join: Option<ClientSignal>,
    /// Log at the last snapshot.
    previous_messages: Vec<Message>,
    /// Render requests seen.
    pub renders: usize,
}

/// Several clients in one simulated room.
pub struct SimWorld {
    env: MockEnv,
    config: SessionConfig,
    room: SimRoom,
    clients: Vec<SimClient>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    /// Create an empty world with default session timing.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Create an empty world with explicit session timing.
    pub fn with_config(config: SessionConfig) -> Self {
        Self { env: MockEnv::new(), config, room: SimRoom::new(), clients: Vec::new() }
    }

    /// Add a client, attach its session and connect it.
    ///
    /// Returns the client index.
    pub fn add_client(&mut self) -> usize {
        let mut app = App::with_config(self.env.clone(), self.config.clone(), "sim");
        let actions = app.start();

        let index = self.clients.len();
        self.clients.push(SimClient {
            app,
            session_id: None,
            last_join: None,
            previous_messages: Vec::new(),
            renders: 0,
        });
        self.apply(index, actions);
        self.reconnect(index);
        index
    }

    /// Feed a key to a client.
    pub fn key(&mut self, client: usize, key: KeyInput) {
        self.event(client, AppEvent::Key(key));
    }

    /// Type text into a client, one key per character.
    pub fn type_text(&mut self, client: usize, text: &str) {
        for c in text.chars() {
            self.key(client, KeyInput::Char(c));
        }
    }

    /// Type a name into the prompt and press Enter.
    pub fn join(&mut self, client: usize, name: &str) {
        self.type_text(client, name);
        self.key(client, KeyInput::Enter);
    }

    /// Type a message and press Enter.
    pub fn say(&mut self, client: usize, text: &str) {
        self.type_text(client, text);
        self.key(client, KeyInput::Enter);
    }

    /// Feed an arbitrary event to a client and settle the room.
    pub fn event(&mut self, client: usize, event: AppEvent) {
        let Some(c) = self.clients.get_mut(client) else {
            return;
        };
        let actions = c.app.handle(event);
        self.apply(client, actions);
        self.settle();
    }

    /// Drop a client's connection. The client sees `Disconnected`.
    pub fn disconnect(&mut self, client: usize) {
        let Some(session_id) = self.clients.get_mut(client).and_then(|c| c.session_id.take())
        else {
            return;
        };
        self.room.disconnect(session_id);
        self.event(client, AppEvent::Disconnected);
    }

    /// Open a fresh connection for a client, replaying its last join.
    pub fn reconnect(&mut self, client: usize) {
        let Some(c) = self.clients.get_mut(client) else {
            return;
        };
        if c.session_id.is_some() {
            return;
        }

        let session_id = self.room.connect();
        c.session_id = Some(session_id);
        if let Some(join) = c.last_join.clone() {
            self.room.send(session_id, join);
        }
        self.settle();
    }

    /// Advance the shared clock and tick every client.
    pub fn advance_millis(&mut self, millis: u64) {
        self.env.advance_millis(millis);
        for client in 0..self.clients.len() {
            let actions = self.clients[client].app.handle(AppEvent::Tick);
            self.apply(client, actions);
        }
        self.settle();
    }

    /// Pump room deliveries into the apps until nothing is queued.
    pub fn settle(&mut self) {
        while self.room.has_pending() {
            for client in 0..self.clients.len() {
                let Some(session_id) = self.clients[client].session_id else {
                    continue;
                };
                for delivery in self.room.drain(session_id) {
                    let closed = delivery == Delivery::Disconnected;
                    let actions = self.clients[client].app.handle(delivery.into_app_event());
                    self.apply(client, actions);
                    if closed {
                        self.clients[client].session_id = None;
                    }
                }
            }
        }
    }

    /// Execute app actions for one client.
    fn apply(&mut self, client: usize, actions: Vec<AppAction>) {
        for action in actions {
            match action {
                AppAction::Render => self.clients[client].renders += 1,
                AppAction::Quit => {},
                AppAction::Send(signal) => {
                    let c = &mut self.clients[client];
                    if matches!(signal, ClientSignal::JoinRoom(_)) {
                        c.last_join = Some(signal.clone());
                    }
                    match c.session_id {
                        Some(session_id) => self.room.send(session_id, signal),
                        None => {
                            tracing::debug!(client, signal = signal.name(), "Offline, dropping");
                        },
                    }
                },
            }
        }
    }

    /// Capture every client's observable state and the room's record.
    ///
    /// Each call also becomes the baseline for the next append-only check.
    pub fn snapshot(&mut self) -> SystemSnapshot {
        let clients = self
            .clients
            .iter_mut()
            .enumerate()
            .map(|(i, c)| {
                let snapshot = ClientSnapshot::from_app(i, &c.app, &c.previous_messages);
                c.previous_messages = snapshot.messages.clone();
                snapshot
            })
            .collect();

        SystemSnapshot::from_clients(clients).with_relayed(self.room.relayed().to_vec())
    }

    /// A client's app. Panics if out of range.
    pub fn app(&self, client: usize) -> &App<MockEnv> {
        &self.clients[client].app
    }

    /// A client. `None` if out of range.
    pub fn client(&self, client: usize) -> Option<&SimClient> {
        self.clients.get(client)
    }

    /// Number of clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// True if there are no clients.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// The simulated room.
    pub fn room(&self) -> &SimRoom {
        &self.room
    }

    /// The shared clock.
    pub fn env(&self) -> &MockEnv {
        &self.env
    }
}
