//! Fuzz target for the session state machine
//!
//! # Strategy
//!
//! - Arbitrary interleaving of user actions, transport events, remote
//!   signals and clock jumps against a virtual clock
//!
//! # Invariants
//!
//! - The message log is append-only
//! - Every message has non-blank text
//! - A "stopTyping" is only emitted for a name that announced "typing"
//! - Nothing is emitted while detached

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sunona_client::{
    ClientSignal, Environment, Message, QUICK_EMOJIS, ServerSignal, Session, SessionAction,
    SessionEvent, WireMessage,
};
use sunona_core::env::test_utils::MockEnv;

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Attach,
    Detach,
    Join(String),
    ReopenPrompt,
    SetDraft(String),
    InsertEmoji(u8),
    SendDraft,
    SendMessage(String),
    Connected,
    Disconnected,
    RemoteNotice(String),
    RemoteChat { sender: Option<String>, text: String },
    RemoteTyping(String),
    RemoteStopTyping(String),
    Advance(u16),
}

fuzz_target!(|ops: Vec<Op>| {
    let env = MockEnv::new();
    let mut session = Session::new(env.clone());
    let mut previous: Vec<Message> = Vec::new();
    let mut announced: HashSet<String> = HashSet::new();

    for op in ops {
        let actions = match op {
            Op::Attach => session.attach(),
            Op::Detach => {
                let actions = session.detach();
                announced.clear();
                actions
            },
            Op::Join(name) => session.join(&name),
            Op::ReopenPrompt => session.reopen_prompt(),
            Op::SetDraft(text) => session.set_draft(text),
            Op::InsertEmoji(i) => {
                let emoji = QUICK_EMOJIS[usize::from(i) % QUICK_EMOJIS.len()];
                session.insert_emoji(emoji)
            },
            Op::SendDraft => session.send_draft(),
            Op::SendMessage(text) => session.send_message(&text),
            Op::Connected => session.handle(SessionEvent::Connected),
            Op::Disconnected => session.handle(SessionEvent::Disconnected),
            Op::RemoteNotice(name) => {
                session.handle(SessionEvent::Signal(ServerSignal::RoomNotice(name)))
            },
            Op::RemoteChat { sender, text } => {
                let wire = WireMessage { id: 1, kind: None, sender, text, ts: 0 };
                session.handle(SessionEvent::Signal(ServerSignal::ChatMessage(wire)))
            },
            Op::RemoteTyping(name) => {
                session.handle(SessionEvent::Signal(ServerSignal::Typing(name)))
            },
            Op::RemoteStopTyping(name) => {
                session.handle(SessionEvent::Signal(ServerSignal::StopTyping(name)))
            },
            Op::Advance(millis) => {
                env.advance_millis(u64::from(millis));
                session.handle(SessionEvent::Tick { now: env.now() })
            },
        };

        for action in &actions {
            if let SessionAction::Emit(signal) = action {
                assert!(session.is_attached(), "{} emitted while detached", signal.name());
                match signal {
                    ClientSignal::Typing(name) => {
                        announced.insert(name.clone());
                    },
                    ClientSignal::StopTyping(name) => {
                        assert!(announced.remove(name), "stopTyping for {name} without typing");
                    },
                    ClientSignal::JoinRoom(_) | ClientSignal::ChatMessage(_) => {},
                }
            }
        }

        let messages = session.messages();
        assert!(messages.len() >= previous.len());
        assert_eq!(&messages[..previous.len()], &previous[..]);
        assert!(messages.iter().all(|m| !m.text.trim().is_empty()));
        previous = messages.to_vec();
    }
});
