//! Conversation state.
//!
//! Purely reactive store fed by the session's handlers. Folds inbound room
//! signals into three observable collections: the message log, the set of
//! remote typers, and the connectivity flag. Holds no timers of its own;
//! typer expiry is driven by the session's ticks.

use std::{ops::Sub, time::Duration};

use sunona_core::{Message, MessageLog, TyperSet};
use sunona_proto::ServerSignal;

/// Transport connectivity as last reported by lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// No transport session.
    #[default]
    Disconnected,
    /// Transport session established.
    Connected,
}

/// What applying an inbound signal changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationUpdate {
    /// A message was appended to the log.
    Appended,
    /// The typer set changed.
    TypersChanged,
    /// Nothing observable changed (duplicate typing, unknown stopTyping).
    Unchanged,
    /// The signal was discarded.
    Discarded {
        /// Why the signal was not applied
        reason: &'static str,
    },
}

/// Messages, typers and connectivity for the single room.
#[derive(Debug, Clone)]
pub struct Conversation<I> {
    log: MessageLog,
    typers: TyperSet<I>,
    connectivity: Connectivity,
}

impl<I> Default for Conversation<I> {
    fn default() -> Self {
        Self {
            log: MessageLog::new(),
            typers: TyperSet::default(),
            connectivity: Connectivity::default(),
        }
    }
}

impl<I> Conversation<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create an empty, disconnected conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one inbound signal into the state.
    ///
    /// `now` timestamps typer refreshes; `wall_millis` stamps locally
    /// generated notices.
    pub fn apply(&mut self, signal: ServerSignal, now: I, wall_millis: u64) -> ConversationUpdate {
        match signal {
            ServerSignal::RoomNotice(name) => {
                self.log.push_system(format!("{name} joined the conversation"), wall_millis);
                ConversationUpdate::Appended
            },
            ServerSignal::ChatMessage(wire) => {
                if wire.text.trim().is_empty() {
                    return ConversationUpdate::Discarded { reason: "empty message text" };
                }
                self.log.push(Message::from(wire));
                ConversationUpdate::Appended
            },
            ServerSignal::Typing(name) => {
                if self.typers.insert(&name, now) {
                    ConversationUpdate::TypersChanged
                } else {
                    ConversationUpdate::Unchanged
                }
            },
            ServerSignal::StopTyping(name) => {
                if self.typers.remove(&name) {
                    ConversationUpdate::TypersChanged
                } else {
                    ConversationUpdate::Unchanged
                }
            },
        }
    }

    /// Record a lifecycle flip. Returns `true` if the flag changed.
    ///
    /// Messages and typers are left untouched.
    pub fn set_connectivity(&mut self, connectivity: Connectivity) -> bool {
        let changed = self.connectivity != connectivity;
        self.connectivity = connectivity;
        changed
    }

    /// Append a locally created message (optimistic echo or notice).
    pub fn append(&mut self, message: Message) {
        self.log.push(message);
    }

    /// Append a local system notice.
    pub fn push_notice(&mut self, text: impl Into<String>, wall_millis: u64) {
        self.log.push_system(text, wall_millis);
    }

    /// Allocate an id for a locally created message.
    pub fn next_message_id(&mut self, wall_millis: u64) -> u64 {
        self.log.next_id(wall_millis)
    }

    /// Drop typers not refreshed within `ttl`. Returns the removed names.
    pub fn expire_typers(&mut self, now: I, ttl: Duration) -> Vec<String> {
        self.typers.expire(now, ttl)
    }

    /// Indicator text such as `"Bob is typing..."`. `None` when nobody types.
    pub fn typing_indicator(&self) -> Option<String> {
        self.typers.indicator()
    }

    /// Messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    /// The message log.
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Current typers.
    pub fn typers(&self) -> &TyperSet<I> {
        &self.typers
    }

    /// Connectivity flag.
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }
}
