//! End-to-end session scenarios against a virtual clock.
//!
//! Drives a [`Session`] through the same sequence a user would: join, watch
//! room notices arrive, chat, and observe remote typing.

use std::time::Duration;

use sunona_client::{
    ClientSignal, Connectivity, MessageKind, ServerSignal, Session, SessionAction, SessionEvent,
    SessionPhase, WireMessage,
};
use sunona_core::{Environment, env::test_utils::MockEnv};

fn emitted(actions: &[SessionAction]) -> Vec<ClientSignal> {
    actions
        .iter()
        .filter_map(|a| match a {
            SessionAction::Emit(signal) => Some(signal.clone()),
            _ => None,
        })
        .collect()
}

fn remote(session: &mut Session<MockEnv>, signal: ServerSignal) -> Vec<SessionAction> {
    session.handle(SessionEvent::Signal(signal))
}

fn tick(session: &mut Session<MockEnv>, env: &MockEnv) -> Vec<SessionAction> {
    session.handle(SessionEvent::Tick { now: env.now() })
}

fn texts(session: &Session<MockEnv>) -> Vec<&str> {
    session.messages().iter().map(|m| m.text.as_str()).collect()
}

#[test]
fn alice_and_bob() {
    let env = MockEnv::new();
    let mut alice = Session::new(env.clone());
    alice.attach();
    alice.handle(SessionEvent::Connected);

    let actions = alice.join("Alice");
    assert_eq!(emitted(&actions), [ClientSignal::JoinRoom("Alice".into())]);
    assert_eq!(alice.phase(), SessionPhase::Joined);

    env.advance(Duration::from_millis(500));
    tick(&mut alice, &env);
    assert_eq!(texts(&alice), ["Welcome to SunoNa, Alice!"]);

    remote(&mut alice, ServerSignal::RoomNotice("Bob".into()));
    assert_eq!(texts(&alice), ["Welcome to SunoNa, Alice!", "Bob joined the conversation"]);
    assert!(alice.messages().iter().all(|m| m.kind == MessageKind::System));

    alice.set_draft("hi");
    let actions = alice.send_draft();
    assert!(matches!(
        emitted(&actions).first(),
        Some(ClientSignal::ChatMessage(WireMessage { text, sender: Some(sender), .. }))
            if text == "hi" && sender == "Alice"
    ));
    assert_eq!(alice.draft(), "");

    let last = alice.messages().last().unwrap();
    assert_eq!(last.kind, MessageKind::Chat);
    assert_eq!(last.sender.as_deref(), Some("Alice"));
    assert_eq!(last.text, "hi");

    remote(&mut alice, ServerSignal::Typing("Bob".into()));
    assert_eq!(alice.conversation().typers().names().collect::<Vec<_>>(), ["Bob"]);
    assert_eq!(alice.typing_indicator().as_deref(), Some("Bob is typing..."));

    remote(&mut alice, ServerSignal::StopTyping("Bob".into()));
    assert!(alice.conversation().typers().is_empty());
    assert_eq!(alice.typing_indicator(), None);
    assert_eq!(alice.messages().len(), 3);
}

#[test]
fn disconnect_keeps_typers_and_log() {
    let env = MockEnv::new();
    let mut session = Session::new(env);
    session.attach();
    session.handle(SessionEvent::Connected);
    session.join("Alice");
    session.send_message("hello");

    remote(&mut session, ServerSignal::Typing("Bob".into()));
    remote(&mut session, ServerSignal::Typing("Carol".into()));
    let before = session.messages().to_vec();

    session.handle(SessionEvent::Disconnected);

    assert_eq!(session.connectivity(), Connectivity::Disconnected);
    assert_eq!(session.messages(), before.as_slice());
    assert_eq!(session.typing_indicator().as_deref(), Some("Bob, Carol are typing..."));
}

#[test]
fn typing_then_idle_emits_single_stop() {
    let env = MockEnv::new();
    let mut session = Session::new(env.clone());
    session.attach();
    session.join("Alice");

    let mut signals = Vec::new();
    for text in ["h", "he", "hel", "hell", "hello"] {
        signals.extend(emitted(&session.set_draft(text)));
        env.advance(Duration::from_millis(300));
        signals.extend(emitted(&tick(&mut session, &env)));
    }
    assert!(signals.iter().all(|s| *s == ClientSignal::Typing("Alice".into())));
    assert_eq!(signals.len(), 5);

    env.advance(Duration::from_millis(700));
    let stop = emitted(&tick(&mut session, &env));
    assert_eq!(stop, [ClientSignal::StopTyping("Alice".into())]);

    env.advance(Duration::from_secs(5));
    assert!(emitted(&tick(&mut session, &env)).is_empty());
}

#[test]
fn sending_is_followed_by_stop_typing() {
    let env = MockEnv::new();
    let mut session = Session::new(env.clone());
    session.attach();
    session.join("Alice");
    session.set_draft("hi");
    session.send_draft();

    env.advance(Duration::from_secs(1));
    let actions = tick(&mut session, &env);

    assert_eq!(emitted(&actions), [ClientSignal::StopTyping("Alice".into())]);
}

#[test]
fn rename_stops_typing_under_old_name() {
    let env = MockEnv::new();
    let mut session = Session::new(env.clone());
    session.attach();
    session.join("Alice");
    session.set_draft("draft");

    session.reopen_prompt();
    let actions = session.join("Alicia");

    assert_eq!(emitted(&actions), [
        ClientSignal::JoinRoom("Alicia".into()),
        ClientSignal::StopTyping("Alice".into()),
        ClientSignal::Typing("Alicia".into()),
    ]);
}

#[test]
fn two_sessions_share_a_clock_independently() {
    let env = MockEnv::new();
    let mut alice = Session::new(env.clone());
    let mut bob = Session::new(env.clone());
    alice.attach();
    bob.attach();

    alice.join("Alice");
    env.advance(Duration::from_millis(200));
    bob.join("Bob");

    env.advance(Duration::from_millis(300));
    tick(&mut alice, &env);
    tick(&mut bob, &env);
    assert_eq!(texts(&alice), ["Welcome to SunoNa, Alice!"]);
    assert!(bob.messages().is_empty());

    env.advance(Duration::from_millis(200));
    tick(&mut bob, &env);
    assert_eq!(texts(&bob), ["Welcome to SunoNa, Bob!"]);
}
