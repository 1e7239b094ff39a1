//! Fuzz target for the relay's room hub
//!
//! # Strategy
//!
//! - Arbitrary connect, disconnect and signal events across a handful of
//!   session IDs, including duplicates and unknown sessions
//!
//! # Invariants
//!
//! - Processing NEVER panics; bad events return structured errors
//! - A broadcast never targets its origin
//! - Relayed chat and typing signals carry the origin's joined name
//! - Unjoined sessions never cause a broadcast

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sunona_proto::{ClientSignal, ServerSignal, WireMessage};
use sunona_server::{RoomHub, ServerAction, ServerEvent};

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Accept(u8),
    Close(u8),
    Join(u8, String),
    Chat(u8, String),
    Typing(u8, String),
    StopTyping(u8, String),
}

fuzz_target!(|input: (u8, Vec<Op>)| {
    let (max, ops) = input;
    let mut hub = RoomHub::new(usize::from(max % 8));

    for op in ops {
        let (origin, event) = match op {
            Op::Accept(s) => {
                let session_id = u64::from(s % 6);
                (session_id, ServerEvent::ConnectionAccepted { session_id })
            },
            Op::Close(s) => {
                let session_id = u64::from(s % 6);
                (session_id, ServerEvent::ConnectionClosed { session_id, reason: "fuzz".into() })
            },
            Op::Join(s, name) => signal(s, ClientSignal::JoinRoom(name)),
            Op::Chat(s, text) => {
                signal(s, ClientSignal::ChatMessage(WireMessage::chat(0, "spoof", text, 0)))
            },
            Op::Typing(s, name) => signal(s, ClientSignal::Typing(name)),
            Op::StopTyping(s, name) => signal(s, ClientSignal::StopTyping(name)),
        };

        let is_signal = matches!(event, ServerEvent::SignalReceived { .. });
        let joined_name = hub.session(origin).and_then(|info| info.name.clone());

        let Ok(actions) = hub.process_event(event) else {
            continue;
        };

        for action in actions {
            let ServerAction::Broadcast { signal, exclude_session } = action else {
                continue;
            };
            assert_eq!(exclude_session, Some(origin));
            assert!(hub.recipients(exclude_session).all(|id| id != origin));

            if !is_signal {
                continue;
            }
            let joined = joined_name.as_ref().map(|n| n.as_str());
            match &signal {
                ServerSignal::ChatMessage(message) => {
                    assert!(joined.is_some());
                    assert_eq!(message.sender.as_deref(), joined);
                },
                ServerSignal::Typing(name) => assert_eq!(Some(name.as_str()), joined),
                ServerSignal::StopTyping(_) | ServerSignal::RoomNotice(_) => {},
            }
        }
    }
});

fn signal(s: u8, signal: ClientSignal) -> (u64, ServerEvent) {
    let session_id = u64::from(s % 6);
    (session_id, ServerEvent::SignalReceived { session_id, signal })
}
