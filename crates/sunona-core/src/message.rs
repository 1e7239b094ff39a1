//! Conversation messages and the append-only log.

use sunona_proto::{WireKind, WireMessage};

/// Message identifier.
///
/// Locally created messages get ids derived from the wall clock; remote
/// messages keep the id their sender allocated.
pub type MessageId = u64;

/// Message category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Presence or lifecycle notice (join notices, welcome banner)
    System,
    /// User-authored text
    Chat,
}

/// A single log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Unique token, monotonic for locally created messages
    pub id: MessageId,
    /// System notice or chat
    pub kind: MessageKind,
    /// Author's display name. `None` for system notices.
    pub sender: Option<String>,
    /// Message body, never empty
    pub text: String,
    /// Creation time in Unix milliseconds
    pub timestamp: u64,
}

impl Message {
    /// Build a system notice.
    pub fn system(id: MessageId, text: impl Into<String>, timestamp: u64) -> Self {
        Self { id, kind: MessageKind::System, sender: None, text: text.into(), timestamp }
    }

    /// Build a chat message.
    pub fn chat(
        id: MessageId,
        sender: impl Into<String>,
        text: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self {
            id,
            kind: MessageKind::Chat,
            sender: Some(sender.into()),
            text: text.into(),
            timestamp,
        }
    }

    /// True for system notices.
    pub fn is_system(&self) -> bool {
        self.kind == MessageKind::System
    }

    /// Wire representation.
    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            id: self.id,
            kind: self.is_system().then_some(WireKind::System),
            sender: self.sender.clone(),
            text: self.text.clone(),
            ts: self.timestamp,
        }
    }
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        let kind = match wire.kind {
            Some(WireKind::System) => MessageKind::System,
            Some(WireKind::Chat) | None => MessageKind::Chat,
        };
        let sender = match kind {
            MessageKind::System => None,
            MessageKind::Chat => wire.sender,
        };
        Self { id: wire.id, kind, sender, text: wire.text, timestamp: wire.ts }
    }
}

/// Append-only, insertion-ordered message log.
///
/// # Invariants
///
/// - Append-only: entries are never removed, reordered or mutated, so the
///   length is monotonically non-decreasing
/// - Display order is insertion order, never timestamp order
/// - Ids handed out by [`MessageLog::next_id`] strictly increase
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Vec<Message>,
    last_local_id: Option<MessageId>,
}

impl MessageLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for a locally created message.
    ///
    /// Uses the wall clock reading when it is ahead of the previous id,
    /// otherwise the previous id plus one. Two messages created within the
    /// same millisecond, or across a wall-clock step backwards, still get
    /// distinct increasing ids.
    pub fn next_id(&mut self, now_millis: u64) -> MessageId {
        let id = match self.last_local_id {
            Some(last) if now_millis <= last => last.saturating_add(1),
            _ => now_millis,
        };
        self.last_local_id = Some(id);
        id
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.entries.push(message);
    }

    /// Append a system notice stamped with `now_millis`.
    pub fn push_system(&mut self, text: impl Into<String>, now_millis: u64) -> &Message {
        let id = self.next_id(now_millis);
        self.entries.push(Message::system(id, text, now_millis));
        &self.entries[self.entries.len() - 1]
    }

    /// Entries in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.entries
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.entries.iter()
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&Message> {
        self.entries.last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no messages were appended yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_within_same_millisecond() {
        let mut log = MessageLog::new();

        let a = log.next_id(1000);
        let b = log.next_id(1000);
        let c = log.next_id(999);
        let d = log.next_id(5000);

        assert_eq!([a, b, c, d], [1000, 1001, 1002, 5000]);
    }

    #[test]
    fn insertion_order_not_timestamp_order() {
        let mut log = MessageLog::new();
        log.push(Message::chat(1, "Bob", "late", 9000));
        log.push(Message::chat(2, "Bob", "early", 1000));

        let texts: Vec<_> = log.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["late", "early"]);
    }

    #[test]
    fn wire_conversion_drops_sender_on_system() {
        let wire = WireMessage {
            id: 3,
            kind: Some(WireKind::System),
            sender: Some("spoofed".into()),
            text: "notice".into(),
            ts: 10,
        };
        let message = Message::from(wire);

        assert!(message.is_system());
        assert_eq!(message.sender, None);
    }

    #[test]
    fn chat_round_trips_through_wire() {
        let message = Message::chat(42, "Alice", "hi", 77);
        assert_eq!(Message::from(message.to_wire()), message);
    }
}
