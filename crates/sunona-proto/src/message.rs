//! Message wire shape.

use serde::{Deserialize, Serialize};

/// Discriminator for system notices.
///
/// Chat messages normally omit the discriminator entirely; only system
/// notices carry `"kind": "system"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireKind {
    /// Presence or lifecycle notice with no sender
    System,
    /// User-authored message
    Chat,
}

/// Message as it travels between peers.
///
/// ```json
/// { "id": 1718000000000, "sender": "Alice", "text": "hi", "ts": 1718000000000 }
/// { "id": 1718000000001, "kind": "system", "text": "Bob joined the conversation",
///   "ts": 1718000000001 }
/// ```
///
/// Older peers spell the discriminator `type`; both keys are accepted on
/// decode, `kind` is always written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Sender-allocated token, monotonic per sender
    pub id: u64,

    /// `Some(System)` for notices, absent for chat
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<WireKind>,

    /// Display name of the author. Absent for system notices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    /// Message body
    pub text: String,

    /// Creation time in Unix milliseconds
    pub ts: u64,
}

impl WireMessage {
    /// Build a chat message.
    pub fn chat(id: u64, sender: impl Into<String>, text: impl Into<String>, ts: u64) -> Self {
        Self { id, kind: None, sender: Some(sender.into()), text: text.into(), ts }
    }

    /// Build a system notice.
    pub fn system(id: u64, text: impl Into<String>, ts: u64) -> Self {
        Self { id, kind: Some(WireKind::System), sender: None, text: text.into(), ts }
    }

    /// True if this is a system notice.
    pub fn is_system(&self) -> bool {
        self.kind == Some(WireKind::System)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_omits_kind() {
        let msg = WireMessage::chat(7, "Alice", "hi", 1000);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "id": 7, "sender": "Alice", "text": "hi", "ts": 1000 })
        );
    }

    #[test]
    fn system_omits_sender() {
        let msg = WireMessage::system(8, "Bob joined the conversation", 1000);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 8,
                "kind": "system",
                "text": "Bob joined the conversation",
                "ts": 1000
            })
        );
    }

    #[test]
    fn legacy_type_key_accepted() {
        let json = r#"{"id":1,"type":"system","text":"hello","ts":2}"#;
        let msg: WireMessage = serde_json::from_str(json).unwrap();

        assert!(msg.is_system());
        assert_eq!(msg.sender, None);
    }

    #[test]
    fn missing_text_rejected() {
        let json = r#"{"id":1,"sender":"Alice","ts":2}"#;
        assert!(serde_json::from_str::<WireMessage>(json).is_err());
    }
}
