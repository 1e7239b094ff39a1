//! Session controller.
//!
//! The `Session` owns the lifecycle of the room membership: it establishes
//! the local identity, emits the join request, applies inbound events while
//! attached, and drives the typing debouncer from draft edits.
//!
//! # Handler registration
//!
//! All inbound handlers are registered by [`Session::attach`] before the
//! transport reports readiness, so content events that race the first
//! `Connected` are applied rather than dropped. Events delivered while
//! detached are dropped.

use std::cmp;

use sunona_core::{Deferred, Environment, Identity, Message};
use sunona_proto::ClientSignal;

use crate::{
    ClientError,
    config::SessionConfig,
    conversation::{Connectivity, Conversation, ConversationUpdate},
    debounce::TypingDebouncer,
    event::{SessionAction, SessionEvent},
};

/// Room name shown in the welcome notice.
pub const ROOM_TITLE: &str = "SunoNa";

/// Quick-insert emoji offered by frontends.
pub const QUICK_EMOJIS: [&str; 8] = ["😊", "😂", "👍", "❤️", "🔥", "✨", "💯", "🚀"];

/// Which surface the user is interacting with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Identity prompt is visible; no name chosen (or re-choosing).
    #[default]
    IdentityPrompt,
    /// Joined the room under an identity.
    Joined,
}

/// Chat session state machine.
///
/// Sans-IO: operations return [`SessionAction`]s and never block. One
/// session per client instance; the session context is an explicit value,
/// so several sessions can run side by side in tests.
pub struct Session<E: Environment> {
    /// Environment for time.
    env: E,

    /// Delays and timeouts.
    config: SessionConfig,

    /// Prompt or joined.
    phase: SessionPhase,

    /// Display name. `None` until the first successful join.
    identity: Option<Identity>,

    /// Whether inbound handlers are registered.
    attached: bool,

    /// In-progress outbound text.
    draft: String,

    /// Messages, typers, connectivity.
    conversation: Conversation<E::Instant>,

    /// Outbound typing signals.
    debouncer: TypingDebouncer<E::Instant>,

    /// Pending welcome notice, carrying the joined name.
    welcome: Deferred<E::Instant, Identity>,
}

impl<E: Environment> Session<E> {
    /// Create a session with default timing.
    pub fn new(env: E) -> Self {
        Self::with_config(env, SessionConfig::default())
    }

    /// Create a session with explicit timing.
    pub fn with_config(env: E, config: SessionConfig) -> Self {
        let debouncer = TypingDebouncer::new(config.typing_idle);
        let welcome = Deferred::new(config.welcome_delay);
        Self {
            env,
            config,
            phase: SessionPhase::IdentityPrompt,
            identity: None,
            attached: false,
            draft: String::new(),
            conversation: Conversation::new(),
            debouncer,
            welcome,
        }
    }

    /// Join the room under `name`.
    ///
    /// Invalid names (blank, too long) are refused silently and leave the
    /// identity prompt up, as is any join while detached. On success the
    /// prompt is hidden, `joinRoom` is emitted and a welcome notice is
    /// scheduled.
    pub fn join(&mut self, name: &str) -> Vec<SessionAction> {
        self.try_join(name).unwrap_or_default()
    }

    /// Like [`Session::join`], reporting why a name was refused.
    pub fn try_join(&mut self, name: &str) -> Result<Vec<SessionAction>, ClientError> {
        if !self.attached {
            return Err(ClientError::Detached);
        }
        let identity = Identity::parse(name)?;
        let now = self.env.now();

        let mut actions = vec![
            SessionAction::Emit(ClientSignal::JoinRoom(identity.as_str().to_owned())),
            SessionAction::info(format!("Joining room as {identity}")),
        ];

        self.identity = Some(identity.clone());
        self.phase = SessionPhase::Joined;
        self.welcome.arm(now, identity);

        actions.extend(self.run_debouncer());
        actions.push(SessionAction::Render);
        Ok(actions)
    }

    /// Show the identity prompt again so the user can pick another name.
    ///
    /// The current identity and the message log are kept until the next
    /// successful [`Session::join`].
    pub fn reopen_prompt(&mut self) -> Vec<SessionAction> {
        if self.phase == SessionPhase::IdentityPrompt {
            return vec![];
        }
        self.phase = SessionPhase::IdentityPrompt;
        vec![SessionAction::Render]
    }

    /// Register handlers for inbound events.
    ///
    /// Idempotent: attaching an attached session does nothing.
    pub fn attach(&mut self) -> Vec<SessionAction> {
        if self.attached {
            return vec![];
        }
        self.attached = true;
        vec![SessionAction::debug("Session handlers attached")]
    }

    /// Unregister all handlers and cancel pending timers.
    ///
    /// Idempotent and safe to call on a session that was never attached.
    /// Nothing is emitted after detaching.
    pub fn detach(&mut self) -> Vec<SessionAction> {
        let had_timers = self.debouncer.deadline().is_some() || self.welcome.is_armed();
        self.debouncer.cancel();
        self.welcome.cancel();

        if !self.attached && !had_timers {
            return vec![];
        }
        self.attached = false;
        vec![SessionAction::debug("Session handlers detached")]
    }

    /// Send `text` to the room.
    ///
    /// Blank text, no identity yet, or a detached session is refused
    /// silently. Otherwise the message is appended locally, emitted, and the
    /// draft is cleared.
    pub fn send_message(&mut self, text: &str) -> Vec<SessionAction> {
        self.try_send_message(text).unwrap_or_default()
    }

    /// Like [`Session::send_message`], reporting why text was refused.
    pub fn try_send_message(&mut self, text: &str) -> Result<Vec<SessionAction>, ClientError> {
        if !self.attached {
            return Err(ClientError::Detached);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        let sender = self.identity.as_ref().ok_or(ClientError::NotJoined)?.as_str().to_owned();

        let wall = self.env.wall_clock_millis();
        let id = self.conversation.next_message_id(wall);
        let message = Message::chat(id, sender, text, wall);
        let wire = message.to_wire();

        // Optimistic echo: the room never reflects our own messages back.
        self.conversation.append(message);

        let mut actions = vec![SessionAction::Emit(ClientSignal::ChatMessage(wire))];
        actions.extend(self.set_draft(String::new()));
        if !actions.contains(&SessionAction::Render) {
            actions.push(SessionAction::Render);
        }
        Ok(actions)
    }

    /// Send the current draft.
    pub fn send_draft(&mut self) -> Vec<SessionAction> {
        let draft = self.draft.clone();
        self.send_message(&draft)
    }

    /// Replace the draft text.
    ///
    /// Any actual change runs the typing debouncer while attached; a
    /// detached session only keeps the text.
    pub fn set_draft(&mut self, text: impl Into<String>) -> Vec<SessionAction> {
        let text = text.into();
        if text == self.draft {
            return vec![];
        }
        self.draft = text;

        let mut actions = if self.attached { self.run_debouncer() } else { Vec::new() };
        actions.push(SessionAction::Render);
        actions
    }

    /// Append a quick emoji to the draft.
    pub fn insert_emoji(&mut self, emoji: &str) -> Vec<SessionAction> {
        let mut draft = self.draft.clone();
        draft.push_str(emoji);
        self.set_draft(draft)
    }

    /// Process a transport event and return actions.
    pub fn handle(&mut self, event: SessionEvent<E::Instant>) -> Vec<SessionAction> {
        match event {
            SessionEvent::Tick { now } => self.handle_tick(now),
            SessionEvent::Connected | SessionEvent::Disconnected | SessionEvent::Signal(_)
                if !self.attached =>
            {
                vec![SessionAction::debug(format!("Dropped {event:?} while detached"))]
            },
            SessionEvent::Connected => self.handle_connectivity(Connectivity::Connected),
            SessionEvent::Disconnected => self.handle_connectivity(Connectivity::Disconnected),
            SessionEvent::Signal(signal) => {
                let name = signal.name();
                let now = self.env.now();
                let wall = self.env.wall_clock_millis();

                match self.conversation.apply(signal, now, wall) {
                    ConversationUpdate::Appended | ConversationUpdate::TypersChanged => {
                        vec![SessionAction::Render]
                    },
                    ConversationUpdate::Unchanged => vec![],
                    ConversationUpdate::Discarded { reason } => {
                        vec![SessionAction::warn(format!("Discarded {name}: {reason}"))]
                    },
                }
            },
        }
    }

    fn handle_connectivity(&mut self, connectivity: Connectivity) -> Vec<SessionAction> {
        if !self.conversation.set_connectivity(connectivity) {
            return vec![];
        }
        let message = match connectivity {
            Connectivity::Connected => "Connected to room",
            Connectivity::Disconnected => "Disconnected from room",
        };
        vec![SessionAction::info(message), SessionAction::Render]
    }

    /// Fire due deferred actions.
    fn handle_tick(&mut self, now: E::Instant) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        let mut changed = false;

        if let Some(identity) = self.welcome.fire(now) {
            let wall = self.env.wall_clock_millis();
            self.conversation.push_notice(format!("Welcome to {ROOM_TITLE}, {identity}!"), wall);
            changed = true;
        }

        if let Some(signal) = self.debouncer.poll(now) {
            actions.push(SessionAction::Emit(signal));
        }

        if let Some(ttl) = self.config.typer_expiry {
            for name in self.conversation.expire_typers(now, ttl) {
                actions.push(SessionAction::debug(format!("Typing indicator for {name} expired")));
                changed = true;
            }
        }

        if changed {
            actions.push(SessionAction::Render);
        }
        actions
    }

    fn run_debouncer(&mut self) -> Vec<SessionAction> {
        let now = self.env.now();
        self.debouncer
            .on_change(now, &self.draft, self.identity.as_ref())
            .into_iter()
            .map(SessionAction::Emit)
            .collect()
    }

    /// Earliest instant at which a tick has work to do.
    ///
    /// Typer expiry is not included; callers tick periodically for that.
    pub fn next_deadline(&self) -> Option<E::Instant> {
        match (self.welcome.deadline(), self.debouncer.deadline()) {
            (Some(a), Some(b)) => Some(cmp::min(a, b)),
            (a, b) => a.or(b),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// True while the identity prompt should be shown.
    pub fn is_prompt_visible(&self) -> bool {
        self.phase == SessionPhase::IdentityPrompt
    }

    /// Local display name. `None` before the first join.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// True while inbound handlers are registered.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// In-progress outbound text.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// True if the draft would be accepted by [`Session::send_draft`].
    pub fn can_send(&self) -> bool {
        self.identity.is_some() && !self.draft.trim().is_empty()
    }

    /// Conversation state.
    pub fn conversation(&self) -> &Conversation<E::Instant> {
        &self.conversation
    }

    /// Messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Connectivity flag.
    pub fn connectivity(&self) -> Connectivity {
        self.conversation.connectivity()
    }

    /// Typing indicator text.
    pub fn typing_indicator(&self) -> Option<String> {
        self.conversation.typing_indicator()
    }

    /// True if `message` was authored under the local identity.
    pub fn is_own(&self, message: &Message) -> bool {
        match (&self.identity, &message.sender) {
            (Some(identity), Some(sender)) => !message.is_system() && identity == sender.as_str(),
            _ => false,
        }
    }

    /// The environment.
    pub fn env(&self) -> &E {
        &self.env
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sunona_core::{MessageKind, env::test_utils::MockEnv};
    use sunona_proto::{ServerSignal, WireMessage};

    use super::*;

    fn emitted(actions: &[SessionAction]) -> Vec<ClientSignal> {
        actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::Emit(signal) => Some(signal.clone()),
                _ => None,
            })
            .collect()
    }

    fn attached_session() -> (Session<MockEnv>, MockEnv) {
        let env = MockEnv::new();
        let mut session = Session::new(env.clone());
        session.attach();
        session.handle(SessionEvent::Connected);
        (session, env)
    }

    fn tick(session: &mut Session<MockEnv>, env: &MockEnv) -> Vec<SessionAction> {
        let now = env.now();
        session.handle(SessionEvent::Tick { now })
    }

    #[test]
    fn new_session_shows_prompt() {
        let session = Session::new(MockEnv::new());

        assert_eq!(session.phase(), SessionPhase::IdentityPrompt);
        assert!(session.identity().is_none());
        assert!(!session.is_attached());
        assert_eq!(session.connectivity(), Connectivity::Disconnected);
    }

    #[test]
    fn join_emits_and_hides_prompt() {
        let (mut session, _env) = attached_session();
        let actions = session.join("  Alice ");

        assert_eq!(emitted(&actions), [ClientSignal::JoinRoom("Alice".into())]);
        assert_eq!(session.phase(), SessionPhase::Joined);
        assert_eq!(session.identity().map(Identity::as_str), Some("Alice"));
    }

    #[test]
    fn blank_join_is_noop() {
        let (mut session, _env) = attached_session();

        assert!(session.join("   ").is_empty());
        assert_eq!(session.phase(), SessionPhase::IdentityPrompt);
        assert!(session.identity().is_none());
        assert!(matches!(session.try_join(""), Err(ClientError::InvalidIdentity(_))));
    }

    #[test]
    fn welcome_appears_after_delay() {
        let (mut session, env) = attached_session();
        session.join("Alice");

        env.advance_millis(499);
        tick(&mut session, &env);
        assert!(session.messages().is_empty());

        env.advance_millis(1);
        let actions = tick(&mut session, &env);
        assert!(actions.contains(&SessionAction::Render));

        let message = &session.messages()[0];
        assert_eq!(message.kind, MessageKind::System);
        assert_eq!(message.text, "Welcome to SunoNa, Alice!");
    }

    #[test]
    fn send_appends_emits_and_clears_draft() {
        let (mut session, _env) = attached_session();
        session.join("Alice");
        session.set_draft("hi");

        let actions = session.send_draft();
        let signals = emitted(&actions);

        let Some(ClientSignal::ChatMessage(wire)) = signals.first() else {
            panic!("expected chat message first, got {signals:?}");
        };
        assert_eq!(wire.sender.as_deref(), Some("Alice"));
        assert_eq!(wire.text, "hi");

        assert_eq!(session.draft(), "");
        let last = session.messages().last().unwrap();
        assert_eq!(last.sender.as_deref(), Some("Alice"));
        assert_eq!(last.text, "hi");
        assert!(session.is_own(last));
    }

    #[test]
    fn send_trims_text() {
        let (mut session, _env) = attached_session();
        session.join("Alice");
        session.send_message("  hi there \n");

        assert_eq!(session.messages().last().map(|m| m.text.as_str()), Some("hi there"));
    }

    #[test]
    fn whitespace_send_is_noop() {
        let (mut session, _env) = attached_session();
        session.join("Alice");
        session.set_draft("   ");

        assert!(session.send_draft().is_empty());
        assert!(session.messages().is_empty());
        assert_eq!(session.draft(), "   ");
        assert_eq!(session.try_send_message(" "), Err(ClientError::EmptyMessage));
    }

    #[test]
    fn send_before_join_refused() {
        let (mut session, _env) = attached_session();
        assert_eq!(session.try_send_message("hello"), Err(ClientError::NotJoined));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn local_message_ids_are_unique() {
        let (mut session, _env) = attached_session();
        session.join("Alice");
        session.send_message("one");
        session.send_message("two");

        let ids: Vec<_> = session.messages().iter().map(|m| m.id).collect();
        assert!(ids[0] < ids[1]);
    }

    #[test]
    fn events_before_connect_are_applied() {
        let env = MockEnv::new();
        let mut session = Session::new(env);
        session.attach();

        session.handle(SessionEvent::Signal(ServerSignal::RoomNotice("Bob".into())));
        assert_eq!(session.messages().len(), 1);

        session.handle(SessionEvent::Connected);
        assert_eq!(session.connectivity(), Connectivity::Connected);
    }

    #[test]
    fn events_while_detached_are_dropped() {
        let mut session = Session::new(MockEnv::new());

        session.handle(SessionEvent::Signal(ServerSignal::Typing("Bob".into())));
        session.handle(SessionEvent::Connected);

        assert!(session.conversation().typers().is_empty());
        assert_eq!(session.connectivity(), Connectivity::Disconnected);
    }

    #[test]
    fn detach_is_idempotent_and_silences_timers() {
        let (mut session, env) = attached_session();
        session.join("Alice");
        session.set_draft("typing...");

        assert!(!session.detach().is_empty());
        assert!(session.detach().is_empty());

        env.advance(Duration::from_secs(5));
        let actions = tick(&mut session, &env);
        assert!(emitted(&actions).is_empty());
        assert!(session.messages().is_empty(), "welcome must not fire after detach");
    }

    #[test]
    fn detached_local_ops_emit_nothing() {
        let (mut session, env) = attached_session();
        session.join("Alice");
        session.detach();

        assert_eq!(session.try_join("Bob"), Err(ClientError::Detached));
        assert_eq!(session.try_send_message("hello"), Err(ClientError::Detached));

        let mut actions = session.set_draft("still typing");
        actions.extend(session.insert_emoji(QUICK_EMOJIS[0]));
        actions.extend(session.send_draft());
        assert!(emitted(&actions).is_empty());
        assert_eq!(session.next_deadline(), None);

        env.advance(Duration::from_secs(5));
        assert!(emitted(&tick(&mut session, &env)).is_empty());
        assert!(session.messages().is_empty());
        assert_eq!(session.identity().map(Identity::as_str), Some("Alice"));
    }

    #[test]
    fn never_attached_session_cannot_join() {
        let mut session = Session::new(MockEnv::new());

        assert!(session.join("Alice").is_empty());
        assert!(session.is_prompt_visible());
    }

    #[test]
    fn detach_without_attach_is_safe() {
        let mut session = Session::new(MockEnv::new());
        assert!(session.detach().is_empty());
    }

    #[test]
    fn reopen_prompt_keeps_identity_and_log() {
        let (mut session, _env) = attached_session();
        session.join("Alice");
        session.send_message("hello");

        session.reopen_prompt();
        assert!(session.is_prompt_visible());
        assert_eq!(session.identity().map(Identity::as_str), Some("Alice"));
        assert_eq!(session.messages().len(), 1);

        let actions = session.join("Alicia");
        assert_eq!(emitted(&actions), [ClientSignal::JoinRoom("Alicia".into())]);
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn insert_emoji_appends_to_draft() {
        let (mut session, _env) = attached_session();
        session.join("Alice");
        session.set_draft("nice");

        let actions = session.insert_emoji(QUICK_EMOJIS[2]);

        assert_eq!(session.draft(), "nice👍");
        assert_eq!(emitted(&actions), [ClientSignal::Typing("Alice".into())]);
    }

    #[test]
    fn stale_typer_expires_on_tick() {
        let (mut session, env) = attached_session();
        session.handle(SessionEvent::Signal(ServerSignal::Typing("Bob".into())));

        env.advance(Duration::from_secs(5));
        tick(&mut session, &env);
        assert!(session.conversation().typers().contains("Bob"));

        env.advance(Duration::from_secs(1));
        tick(&mut session, &env);
        assert!(session.conversation().typers().is_empty());
    }

    #[test]
    fn expiry_can_be_disabled() {
        let env = MockEnv::new();
        let config = SessionConfig { typer_expiry: None, ..SessionConfig::default() };
        let mut session = Session::with_config(env.clone(), config);
        session.attach();
        session.handle(SessionEvent::Signal(ServerSignal::Typing("Bob".into())));

        env.advance(Duration::from_secs(3600));
        tick(&mut session, &env);

        assert!(session.conversation().typers().contains("Bob"));
    }

    #[test]
    fn remote_chat_is_not_own() {
        let (mut session, _env) = attached_session();
        session.join("Alice");
        let wire = WireMessage::chat(1, "Bob", "yo", 0);
        session.handle(SessionEvent::Signal(ServerSignal::ChatMessage(wire)));

        let message = session.messages().last().unwrap();
        assert!(!session.is_own(message));
    }

    #[test]
    fn next_deadline_tracks_earliest_timer() {
        let (mut session, env) = attached_session();
        assert_eq!(session.next_deadline(), None);

        session.join("Alice");
        let welcome_at = env.now() + Duration::from_millis(500);
        assert_eq!(session.next_deadline(), Some(welcome_at));
    }
}
