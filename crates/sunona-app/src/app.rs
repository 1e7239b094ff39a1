//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the
//! interactive state of a chat frontend completely decoupled from I/O.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Routes keys to the name prompt, the composer or the emoji picker.
//! - Mirrors the session's draft in a cursor-aware editor.
//! - Translates session actions into app actions and log records.

use sunona_client::{
    Connectivity, Environment, LogLevel, QUICK_EMOJIS, Session, SessionAction,
    SessionConfig, SessionEvent, SessionPhase,
};
use sunona_core::MAX_IDENTITY_LEN;

use crate::{AppAction, AppEvent, Focus, KeyInput, LineEditor};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
pub struct App<E: Environment> {
    /// Chat session.
    session: Session<E>,
    /// Server address for display.
    server_addr: String,
    /// Name typed into the identity prompt.
    name_input: LineEditor,
    /// Composer buffer, kept equal to the session's draft.
    draft_input: LineEditor,
    /// Highlighted emoji while the picker is open.
    emoji_picker: Option<usize>,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl<E: Environment> App<E> {
    /// Create a new App with default session timing.
    pub fn new(env: E, server_addr: impl Into<String>) -> Self {
        Self::with_config(env, SessionConfig::default(), server_addr)
    }

    /// Create a new App with explicit session timing.
    pub fn with_config(env: E, config: SessionConfig, server_addr: impl Into<String>) -> Self {
        Self {
            session: Session::with_config(env, config),
            server_addr: server_addr.into(),
            name_input: LineEditor::with_limit(MAX_IDENTITY_LEN),
            draft_input: LineEditor::new(),
            emoji_picker: None,
            status_message: None,
        }
    }

    /// Register session handlers. Call once before feeding events.
    pub fn start(&mut self) -> Vec<AppAction> {
        let actions = self.session.attach();
        let mut out = self.translate(actions);
        push_render(&mut out);
        out
    }

    /// Unregister session handlers and cancel timers.
    pub fn shutdown(&mut self) -> Vec<AppAction> {
        let actions = self.session.detach();
        self.translate(actions)
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => {
                let now = self.session.env().now();
                self.forward(SessionEvent::Tick { now })
            },
            AppEvent::Resize(..) => vec![AppAction::Render],
            AppEvent::Connected => self.forward(SessionEvent::Connected),
            AppEvent::Disconnected => self.forward(SessionEvent::Disconnected),
            AppEvent::Signal(signal) => self.forward(SessionEvent::Signal(signal)),
            AppEvent::Quit => vec![AppAction::Quit],
        }
    }

    fn forward(&mut self, event: SessionEvent<E::Instant>) -> Vec<AppAction> {
        let actions = self.session.handle(event);
        self.translate(actions)
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if let KeyInput::Ctrl('c' | 'd') = key {
            return vec![AppAction::Quit];
        }

        match self.focus() {
            Focus::NamePrompt => self.handle_prompt_key(key),
            Focus::Draft => self.handle_draft_key(key),
            Focus::EmojiPicker { selected } => self.handle_picker_key(key, selected),
        }
    }

    fn handle_prompt_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        let editor = &mut self.name_input;
        let changed = match key {
            KeyInput::Char(c) => editor.insert(c),
            KeyInput::Backspace => editor.backspace(),
            KeyInput::Delete => editor.delete(),
            KeyInput::Left => editor.left(),
            KeyInput::Right => editor.right(),
            KeyInput::Home => editor.home(),
            KeyInput::End => editor.end(),
            KeyInput::Enter => return self.submit_name(),
            KeyInput::Esc => return vec![AppAction::Quit],
            KeyInput::Tab | KeyInput::Ctrl(_) => false,
        };

        if changed { vec![AppAction::Render] } else { vec![] }
    }

    fn handle_draft_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        let editor = &mut self.draft_input;
        let edited = match key {
            KeyInput::Char(c) => editor.insert(c),
            KeyInput::Backspace => editor.backspace(),
            KeyInput::Delete => editor.delete(),
            KeyInput::Left | KeyInput::Right | KeyInput::Home | KeyInput::End => {
                let moved = match key {
                    KeyInput::Left => editor.left(),
                    KeyInput::Right => editor.right(),
                    KeyInput::Home => editor.home(),
                    _ => editor.end(),
                };
                return if moved { vec![AppAction::Render] } else { vec![] };
            },
            KeyInput::Enter => {
                let actions = self.session.send_draft();
                return self.translate(actions);
            },
            KeyInput::Tab => {
                self.emoji_picker = Some(0);
                return vec![AppAction::Render];
            },
            KeyInput::Ctrl('n') => return self.open_settings(),
            KeyInput::Esc => return vec![AppAction::Quit],
            KeyInput::Ctrl(_) => false,
        };

        if !edited {
            return vec![];
        }
        let text = self.draft_input.text().to_owned();
        let actions = self.session.set_draft(text);
        self.translate(actions)
    }

    fn handle_picker_key(&mut self, key: KeyInput, selected: usize) -> Vec<AppAction> {
        let count = QUICK_EMOJIS.len();
        match key {
            KeyInput::Left => {
                self.emoji_picker = Some((selected + count - 1) % count);
                vec![AppAction::Render]
            },
            KeyInput::Right => {
                self.emoji_picker = Some((selected + 1) % count);
                vec![AppAction::Render]
            },
            KeyInput::Enter => self.pick_emoji(selected),
            KeyInput::Char(c @ '1'..='8') => {
                let index = c.to_digit(10).map_or(0, |d| d as usize - 1);
                self.pick_emoji(index)
            },
            KeyInput::Tab | KeyInput::Esc => {
                self.emoji_picker = None;
                vec![AppAction::Render]
            },
            KeyInput::Char(_)
            | KeyInput::Ctrl(_)
            | KeyInput::Backspace
            | KeyInput::Delete
            | KeyInput::Home
            | KeyInput::End => vec![],
        }
    }

    fn submit_name(&mut self) -> Vec<AppAction> {
        let name = self.name_input.text().to_owned();
        match self.session.try_join(&name) {
            Ok(actions) => {
                self.status_message = None;
                self.translate(actions)
            },
            Err(e) => {
                tracing::debug!(error = %e, "Name refused");
                self.set_status(e.to_string());
                vec![AppAction::Render]
            },
        }
    }

    /// Reopen the identity prompt, prefilled with the current name.
    pub fn open_settings(&mut self) -> Vec<AppAction> {
        if let Some(identity) = self.session.identity() {
            self.name_input.set(identity.as_str());
        }
        self.emoji_picker = None;
        let actions = self.session.reopen_prompt();
        self.translate(actions)
    }

    /// Append a quick emoji to the draft and close the picker.
    pub fn pick_emoji(&mut self, index: usize) -> Vec<AppAction> {
        self.emoji_picker = None;
        let Some(emoji) = QUICK_EMOJIS.get(index) else {
            return vec![AppAction::Render];
        };
        let actions = self.session.insert_emoji(emoji);
        let mut out = self.translate(actions);
        push_render(&mut out);
        out
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Convert session actions, logging `Log` actions via tracing.
    ///
    /// Also re-syncs the composer when the session changed the draft itself
    /// (send clears it, emoji insertion appends).
    fn translate(&mut self, actions: Vec<SessionAction>) -> Vec<AppAction> {
        let mut out = Vec::with_capacity(actions.len());
        for action in actions {
            match action {
                SessionAction::Emit(signal) => out.push(AppAction::Send(signal)),
                SessionAction::Render => push_render(&mut out),
                SessionAction::Log { level, message } => match level {
                    LogLevel::Debug => tracing::debug!("{message}"),
                    LogLevel::Info => tracing::info!("{message}"),
                    LogLevel::Warn => tracing::warn!("{message}"),
                },
            }
        }

        if self.draft_input.text() != self.session.draft() {
            self.draft_input.set(self.session.draft());
            push_render(&mut out);
        }
        out
    }

    /// Surface that currently receives keyboard input.
    pub fn focus(&self) -> Focus {
        match (self.session.phase(), self.emoji_picker) {
            (SessionPhase::IdentityPrompt, _) => Focus::NamePrompt,
            (SessionPhase::Joined, Some(selected)) => Focus::EmojiPicker { selected },
            (SessionPhase::Joined, None) => Focus::Draft,
        }
    }

    /// The chat session.
    pub fn session(&self) -> &Session<E> {
        &self.session
    }

    /// Name being typed into the identity prompt.
    pub fn name_input(&self) -> &LineEditor {
        &self.name_input
    }

    /// Composer buffer.
    pub fn draft_input(&self) -> &LineEditor {
        &self.draft_input
    }

    /// Connectivity flag.
    pub fn connectivity(&self) -> Connectivity {
        self.session.connectivity()
    }

    /// Server address (host:port).
    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

fn push_render(actions: &mut Vec<AppAction>) {
    if !actions.contains(&AppAction::Render) {
        actions.push(AppAction::Render);
    }
}
