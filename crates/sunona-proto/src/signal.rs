//! Named signals.
//!
//! Each signal is encoded as an adjacently tagged JSON object:
//! `{"event": "typing", "data": "Alice"}`. Event names are camelCase to
//! match the room's existing vocabulary (`joinRoom`, `chatMessage`,
//! `typing`, `stopTyping`, `roomNotice`).

use serde::{Deserialize, Serialize};

use crate::WireMessage;

/// Signals a client sends to the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientSignal {
    /// Request to join the single implicit room under a display name.
    JoinRoom(String),
    /// Broadcast a chat message to the room.
    ChatMessage(WireMessage),
    /// Local user is composing.
    Typing(String),
    /// Local user stopped composing.
    StopTyping(String),
}

impl ClientSignal {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom(_) => "joinRoom",
            Self::ChatMessage(_) => "chatMessage",
            Self::Typing(_) => "typing",
            Self::StopTyping(_) => "stopTyping",
        }
    }
}

/// Signals the room delivers to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerSignal {
    /// Another user joined.
    RoomNotice(String),
    /// A chat message to append.
    ChatMessage(WireMessage),
    /// A remote user started composing.
    Typing(String),
    /// A remote user stopped composing.
    StopTyping(String),
}

impl ServerSignal {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoomNotice(_) => "roomNotice",
            Self::ChatMessage(_) => "chatMessage",
            Self::Typing(_) => "typing",
            Self::StopTyping(_) => "stopTyping",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_room_envelope() {
        let json = serde_json::to_string(&ClientSignal::JoinRoom("Alice".into())).unwrap();
        assert_eq!(json, r#"{"event":"joinRoom","data":"Alice"}"#);
    }

    #[test]
    fn stop_typing_envelope() {
        let json = serde_json::to_string(&ServerSignal::StopTyping("Bob".into())).unwrap();
        assert_eq!(json, r#"{"event":"stopTyping","data":"Bob"}"#);
    }

    #[test]
    fn room_notice_is_not_a_client_signal() {
        let json = r#"{"event":"roomNotice","data":"Bob"}"#;
        assert!(serde_json::from_str::<ClientSignal>(json).is_err());
        assert!(serde_json::from_str::<ServerSignal>(json).is_ok());
    }

    #[test]
    fn names_match_serialized_tags() {
        let signal = ServerSignal::ChatMessage(WireMessage::chat(1, "Bob", "yo", 2));
        let value = serde_json::to_value(&signal).unwrap();
        assert_eq!(value["event"], signal.name());
    }
}
