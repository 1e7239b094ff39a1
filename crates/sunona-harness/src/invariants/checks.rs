//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::HashSet;

use sunona_client::SessionPhase;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// The message log is append-only.
///
/// The log at the previous snapshot must be a prefix of the current log:
/// nothing is removed, reordered or edited in place.
pub struct LogAppendOnly;

impl Invariant for LogAppendOnly {
    fn name(&self) -> &'static str {
        "log_append_only"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let prev = &client.previous_messages;
            if prev.len() > client.messages.len() || client.messages[..prev.len()] != prev[..] {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: log of {} messages is not an extension of the previous {}",
                        client.id,
                        client.messages.len(),
                        prev.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Locally authored messages carry strictly increasing ids.
pub struct LocalIdsIncrease;

impl Invariant for LocalIdsIncrease {
    fn name(&self) -> &'static str {
        "local_ids_increase"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            for window in client.own_message_ids.windows(2) {
                if window[1] <= window[0] {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "client {}: local id {} followed by {}",
                            client.id, window[0], window[1]
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Every message has non-blank text; system notices have no sender and
/// chat messages have one.
pub struct MessagesWellFormed;

impl Invariant for MessagesWellFormed {
    fn name(&self) -> &'static str {
        "messages_well_formed"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            for msg in &client.messages {
                let problem = if msg.text.trim().is_empty() {
                    Some("blank text")
                } else if msg.is_system() && msg.sender.is_some() {
                    Some("system notice with a sender")
                } else if !msg.is_system() && msg.sender.is_none() {
                    Some("chat message without a sender")
                } else {
                    None
                };

                if let Some(problem) = problem {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!("client {}: message {}: {problem}", client.id, msg.id),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A name appears at most once in the typer set.
pub struct TypersUnique;

impl Invariant for TypersUnique {
    fn name(&self) -> &'static str {
        "typers_unique"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let mut seen = HashSet::new();
            for name in &client.typers {
                if !seen.insert(name) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!("client {}: {name} listed twice", client.id),
                    });
                }
            }
        }
        Ok(())
    }
}

/// The room never delivers a broadcast back to its origin.
pub struct NoEchoToOrigin;

impl Invariant for NoEchoToOrigin {
    fn name(&self) -> &'static str {
        "no_echo_to_origin"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        match state.relayed.iter().find(|r| r.origin == Some(r.recipient)) {
            Some(echo) => Err(Violation {
                invariant: self.name(),
                message: format!(
                    "session {} received its own {}",
                    echo.recipient,
                    echo.signal.name()
                ),
            }),
            None => Ok(()),
        }
    }
}

/// The frontend's composer shows exactly the session's draft.
pub struct ComposerMirrorsDraft;

impl Invariant for ComposerMirrorsDraft {
    fn name(&self) -> &'static str {
        "composer_mirrors_draft"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if client.composer != client.draft {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: composer {:?} but draft {:?}",
                        client.id, client.composer, client.draft
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A joined session always has an identity.
pub struct IdentityWhenJoined;

impl Invariant for IdentityWhenJoined {
    fn name(&self) -> &'static str {
        "identity_when_joined"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if client.phase == SessionPhase::Joined && client.identity.is_none() {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("client {}: joined without an identity", client.id),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sunona_client::{Message, ServerSignal};

    use super::*;
    use crate::{ClientSnapshot, Relayed};

    fn client_with(messages: Vec<Message>) -> ClientSnapshot {
        ClientSnapshot { messages, ..ClientSnapshot::new(0) }
    }

    #[test]
    fn append_only_accepts_extension() {
        let first = Message::system(1, "hello", 0);
        let mut client = client_with(vec![first.clone(), Message::system(2, "again", 0)]);
        client.previous_messages = vec![first];

        assert!(LogAppendOnly.check(&SystemSnapshot::single(client)).is_ok());
    }

    #[test]
    fn append_only_rejects_rewrite() {
        let mut client = client_with(vec![Message::system(2, "changed", 0)]);
        client.previous_messages = vec![Message::system(1, "hello", 0)];

        assert!(LogAppendOnly.check(&SystemSnapshot::single(client)).is_err());
    }

    #[test]
    fn local_ids_must_increase() {
        let mut client = ClientSnapshot::new(0);
        client.own_message_ids = vec![5, 5];

        assert!(LocalIdsIncrease.check(&SystemSnapshot::single(client)).is_err());
    }

    #[test]
    fn blank_message_is_malformed() {
        let client = client_with(vec![Message::chat(1, "Alice", "  ", 0)]);
        assert!(MessagesWellFormed.check(&SystemSnapshot::single(client)).is_err());
    }

    #[test]
    fn duplicate_typer_detected() {
        let mut client = ClientSnapshot::new(0);
        client.typers = vec!["Bob".into(), "Bob".into()];

        assert!(TypersUnique.check(&SystemSnapshot::single(client)).is_err());
    }

    #[test]
    fn echo_detected() {
        let snapshot = SystemSnapshot::empty().with_relayed(vec![Relayed {
            origin: Some(3),
            recipient: 3,
            signal: ServerSignal::Typing("Carol".into()),
        }]);

        assert!(NoEchoToOrigin.check(&snapshot).is_err());
    }

    #[test]
    fn joined_without_identity_detected() {
        let client = ClientSnapshot { phase: SessionPhase::Joined, ..ClientSnapshot::new(0) };
        assert!(IdentityWhenJoined.check(&SystemSnapshot::single(client)).is_err());
    }
}
