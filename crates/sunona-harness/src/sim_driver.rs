//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as `TerminalDriver` but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`sunona_app::Runtime`] orchestration code runs in both production and
//! simulation.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use sunona_app::{App, AppEvent, Driver};
use sunona_client::{ClientSignal, Environment, Message};
use thiserror::Error;

use crate::invariants::{ClientSnapshot, InvariantRegistry, SystemSnapshot, Violation};

/// Error type for simulation driver.
#[derive(Debug, Clone, Error)]
pub enum SimDriverError {
    /// An invariant failed while rendering.
    #[error("invariant violated at render {render}: {violations:?}")]
    Invariant {
        /// Render count when the check failed.
        render: usize,
        /// Everything that failed.
        violations: Vec<Violation>,
    },
}

/// Shared state for event injection.
///
/// This allows injection from outside async contexts.
#[derive(Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    outgoing: Vec<ClientSignal>,
    renders: usize,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] trait so the same [`sunona_app::Runtime`]
/// orchestration code runs in both production TUI and simulation tests.
/// Clones share state, so a test can keep a handle after moving the driver
/// into a runtime.
#[derive(Clone, Default)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    invariants: Option<Arc<InvariantRegistry>>,
    /// Log at the previous render (for append-only checks).
    previous_messages: Vec<Message>,
}

impl SimDriver {
    /// Create a new simulation driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(Arc::new(registry));
        self
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.lock().pending_events.push_back(event);
    }

    /// Inject several events in order.
    pub fn inject_events(&self, events: impl IntoIterator<Item = AppEvent>) {
        self.lock().pending_events.extend(events);
    }

    /// Inject a tick event.
    pub fn inject_tick(&self) {
        self.inject_event(AppEvent::Tick);
    }

    /// Take all captured outgoing signals.
    pub fn take_outgoing(&self) -> Vec<ClientSignal> {
        std::mem::take(&mut self.lock().outgoing)
    }

    /// Check if there are pending events to process.
    pub fn has_pending(&self) -> bool {
        !self.lock().pending_events.is_empty()
    }

    /// Number of renders so far.
    pub fn render_count(&self) -> usize {
        self.lock().renders
    }

    /// True once the runtime stopped the driver.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.lock().pending_events.pop_front())
    }

    async fn send(&mut self, signal: ClientSignal) -> Result<(), Self::Error> {
        self.lock().outgoing.push(signal);
        Ok(())
    }

    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), Self::Error> {
        let render = {
            let mut state = self.lock();
            state.renders += 1;
            state.renders
        };

        let Some(registry) = &self.invariants else {
            return Ok(());
        };

        let client = ClientSnapshot::from_app(0, app, &self.previous_messages);
        let result = registry.check_all(&SystemSnapshot::single(client.clone()));
        self.previous_messages = client.messages;

        result.map_err(|violations| SimDriverError::Invariant { render, violations })
    }

    fn stop(&mut self) {
        self.lock().stopped = true;
    }
}
