//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use sunona_app::App;
use sunona_client::{Connectivity, Environment, Message, SessionPhase};

use crate::Relayed;

/// Snapshot of the entire system state.
///
/// Contains observable state from one or more clients, plus the room's
/// delivery record when a room is simulated.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-client state snapshots.
    pub clients: Vec<ClientSnapshot>,
    /// Broadcast deliveries recorded by the room.
    pub relayed: Vec<Relayed>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no clients).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single client.
    pub fn single(client: ClientSnapshot) -> Self {
        Self { clients: vec![client], relayed: Vec::new() }
    }

    /// Create a snapshot from multiple clients.
    pub fn from_clients(clients: Vec<ClientSnapshot>) -> Self {
        Self { clients, relayed: Vec::new() }
    }

    /// Attach the room's delivery record.
    #[must_use]
    pub fn with_relayed(mut self, relayed: Vec<Relayed>) -> Self {
        self.relayed = relayed;
        self
    }
}

/// Snapshot of a single client's observable state.
#[derive(Debug, Clone, Default)]
pub struct ClientSnapshot {
    /// Client identifier.
    pub id: usize,
    /// Joined display name.
    pub identity: Option<String>,
    /// Prompt or joined.
    pub phase: SessionPhase,
    /// Transport flag.
    pub connectivity: Connectivity,
    /// Message log in display order.
    pub messages: Vec<Message>,
    /// Message log at the previous snapshot (for append-only checks).
    pub previous_messages: Vec<Message>,
    /// Ids of the messages this client authored, in log order.
    pub own_message_ids: Vec<u64>,
    /// Remote typers in arrival order.
    pub typers: Vec<String>,
    /// Session draft.
    pub draft: String,
    /// Text in the frontend's composer.
    pub composer: String,
}

impl ClientSnapshot {
    /// Create a new client snapshot.
    pub fn new(id: usize) -> Self {
        Self { id, ..Default::default() }
    }

    /// Capture an app's observable state.
    pub fn from_app<E: Environment>(id: usize, app: &App<E>, previous: &[Message]) -> Self {
        let session = app.session();
        let messages = session.messages().to_vec();
        let own_message_ids =
            messages.iter().filter(|m| session.is_own(m)).map(|m| m.id).collect();

        Self {
            id,
            identity: session.identity().map(|i| i.as_str().to_owned()),
            phase: session.phase(),
            connectivity: session.connectivity(),
            messages,
            previous_messages: previous.to_vec(),
            own_message_ids,
            typers: session.conversation().typers().names().map(str::to_owned).collect(),
            draft: session.draft().to_owned(),
            composer: app.draft_input().text().to_owned(),
        }
    }
}
