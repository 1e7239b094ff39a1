//! Property-based tests for the App state machine.
//!
//! Arbitrary key and transport sequences must keep the composer in sync with
//! the session and respect the prompt's bounds.

use proptest::prelude::*;
use sunona_app::{App, AppAction, AppEvent, Focus, KeyInput};
use sunona_client::{ClientSignal, ServerSignal};
use sunona_core::{MAX_IDENTITY_LEN, env::test_utils::MockEnv};

fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        6 => prop::char::range('a', 'z').prop_map(KeyInput::Char),
        1 => Just(KeyInput::Char(' ')),
        1 => Just(KeyInput::Char('é')),
        1 => Just(KeyInput::Char('🚀')),
        1 => prop::char::range('1', '8').prop_map(KeyInput::Char),
        2 => Just(KeyInput::Enter),
        2 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Delete),
        1 => Just(KeyInput::Tab),
        2 => Just(KeyInput::Left),
        2 => Just(KeyInput::Right),
        1 => Just(KeyInput::Home),
        1 => Just(KeyInput::End),
        1 => Just(KeyInput::Ctrl('n')),
    ]
}

fn event_strategy() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        10 => key_strategy().prop_map(AppEvent::Key),
        2 => Just(AppEvent::Tick),
        1 => (1u16..200, 1u16..100).prop_map(|(c, r)| AppEvent::Resize(c, r)),
        1 => Just(AppEvent::Connected),
        1 => Just(AppEvent::Disconnected),
        1 => Just(AppEvent::Signal(ServerSignal::Typing("Bob".into()))),
        1 => Just(AppEvent::Signal(ServerSignal::StopTyping("Bob".into()))),
        1 => Just(AppEvent::Signal(ServerSignal::RoomNotice("Bob".into()))),
    ]
}

proptest! {
    #[test]
    fn prop_app_invariants_hold(events in prop::collection::vec(event_strategy(), 0..120)) {
        let env = MockEnv::new();
        let mut app = App::new(env.clone(), "localhost:3000");
        app.start();

        for event in events {
            if event == AppEvent::Tick {
                env.advance_millis(400);
            }
            let actions = app.handle(event);

            prop_assert!(!actions.contains(&AppAction::Quit));
            prop_assert_eq!(app.draft_input().text(), app.session().draft());
            prop_assert!(app.draft_input().cursor() <= app.draft_input().char_count());
            prop_assert!(app.name_input().char_count() <= MAX_IDENTITY_LEN);

            if let Focus::EmojiPicker { selected } = app.focus() {
                prop_assert!(selected < sunona_client::QUICK_EMOJIS.len());
            }

            for action in &actions {
                if let AppAction::Send(ClientSignal::ChatMessage(m)) = action {
                    prop_assert!(!m.text.trim().is_empty());
                    let identity = app.session().identity().map(|i| i.as_str());
                    prop_assert_eq!(m.sender.as_deref(), identity);
                }
            }
        }
    }

    #[test]
    fn prop_render_at_most_once_per_event(
        events in prop::collection::vec(event_strategy(), 0..60),
    ) {
        let mut app = App::new(MockEnv::new(), "localhost:3000");
        app.start();

        for event in events {
            let actions = app.handle(event);
            let renders = actions.iter().filter(|a| **a == AppAction::Render).count();
            prop_assert!(renders <= 1);
        }
    }
}
