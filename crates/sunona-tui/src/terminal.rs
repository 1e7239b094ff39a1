//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The room is reached through
//! the client's TCP transport.

use std::{
    io::{self, Stdout, stdout},
    time::Duration,
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use sunona_app::{App, AppEvent, Driver, KeyInput};
use sunona_client::{
    ClientSignal, Environment,
    transport::{ConnectedClient, TransportEvent},
};
use thiserror::Error;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    time::{Interval, MissedTickBehavior},
};

use crate::ui;

/// Tick period driving the session's timers.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The transport task is gone.
    #[error("transport closed")]
    TransportClosed,
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui), and the room
/// connection (TCP transport).
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    client: ConnectedClient,
    tick: Interval,
}

impl TerminalDriver {
    /// Take over the terminal. Must be called from within a tokio runtime.
    pub fn new(client: ConnectedClient) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        let mut tick = tokio::time::interval(TICK_INTERVAL);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Ok(Self { terminal, event_stream, client, tick })
    }
}

/// Convert a crossterm key event to [`KeyInput`].
pub fn convert_key(key: KeyEvent) -> Option<KeyInput> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char(c) => Some(KeyInput::Ctrl(c.to_ascii_lowercase())),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        KeyCode::Delete => Some(KeyInput::Delete),
        KeyCode::Tab => Some(KeyInput::Tab),
        KeyCode::Esc => Some(KeyInput::Esc),
        KeyCode::Left => Some(KeyInput::Left),
        KeyCode::Right => Some(KeyInput::Right),
        KeyCode::Home => Some(KeyInput::Home),
        KeyCode::End => Some(KeyInput::End),
        _ => None,
    }
}

/// Convert a transport event to [`AppEvent`].
pub fn convert_transport(event: TransportEvent) -> AppEvent {
    match event {
        TransportEvent::Connected => AppEvent::Connected,
        TransportEvent::Disconnected => AppEvent::Disconnected,
        TransportEvent::Signal(signal) => AppEvent::Signal(signal),
    }
}

/// Hand a signal to the transport without waiting.
///
/// A backed-up transport drops the signal rather than stalling the UI loop.
pub fn forward_signal(
    to_server: &mpsc::Sender<ClientSignal>,
    signal: ClientSignal,
) -> Result<(), TerminalError> {
    match to_server.try_send(signal) {
        Ok(()) => Ok(()),
        Err(TrySendError::Full(signal)) => {
            tracing::warn!(signal = signal.name(), "Transport queue full, dropping signal");
            Ok(())
        },
        Err(TrySendError::Closed(_)) => Err(TerminalError::TransportClosed),
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        Ok(convert_key(key).map(AppEvent::Key))
                    },
                    Some(Ok(Event::Resize(cols, rows))) => Ok(Some(AppEvent::Resize(cols, rows))),
                    Some(Ok(_)) => Ok(None),
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    None => Ok(Some(AppEvent::Quit)),
                }
            }

            // Room events
            event = self.client.from_server.recv() => {
                event.map(|e| Some(convert_transport(e))).ok_or(TerminalError::TransportClosed)
            }

            // Periodic tick
            _ = self.tick.tick() => Ok(Some(AppEvent::Tick)),
        }
    }

    async fn send(&mut self, signal: ClientSignal) -> Result<(), Self::Error> {
        forward_signal(&self.client.to_server, signal)
    }

    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    fn stop(&mut self) {
        self.client.stop();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.client.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
