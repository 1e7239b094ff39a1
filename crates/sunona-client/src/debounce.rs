//! Typing-signal debouncer.
//!
//! Translates local draft edits into outbound "typing"/"stopTyping" signals.
//! Every edit with a non-empty draft announces "typing" immediately; a single
//! "stopTyping" follows once the draft has been idle for the whole window.
//!
//! # Invariants
//!
//! - "stopTyping" is only sent for a name that has an outstanding "typing"
//!   announcement, so an idle timer armed on an empty draft fires harmlessly
//! - At most one "stopTyping" per idle period, however many edits occurred
//! - Changing identity while announced stops the old name first

use std::{ops::Add, time::Duration};

use sunona_core::{Deferred, Identity};
use sunona_proto::ClientSignal;

/// Debounces local typing activity.
#[derive(Debug, Clone)]
pub struct TypingDebouncer<I> {
    /// Stop-typing timer, capturing the identity at arm time.
    timer: Deferred<I, Option<Identity>>,
    /// Name with an outstanding "typing" announcement.
    announced: Option<Identity>,
}

impl<I> TypingDebouncer<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create a debouncer with the given idle window.
    pub fn new(idle: Duration) -> Self {
        Self { timer: Deferred::new(idle), announced: None }
    }

    /// React to a change of the draft text or of the identity.
    ///
    /// Cancels the pending timer, announces "typing" when the draft is
    /// non-empty and an identity is set, then re-arms the idle timer.
    pub fn on_change(
        &mut self,
        now: I,
        draft: &str,
        identity: Option<&Identity>,
    ) -> Vec<ClientSignal> {
        let mut signals = Vec::new();
        self.timer.cancel();

        if let Some(previous) = self.announced.take_if(|prev| Some(&*prev) != identity) {
            signals.push(ClientSignal::StopTyping(previous.into_string()));
        }

        if let Some(identity) = identity
            && !draft.is_empty()
        {
            signals.push(ClientSignal::Typing(identity.as_str().to_owned()));
            self.announced = Some(identity.clone());
        }

        self.timer.arm(now, identity.cloned());
        signals
    }

    /// Fire the idle timer if its window has elapsed.
    pub fn poll(&mut self, now: I) -> Option<ClientSignal> {
        let captured = self.timer.fire(now)?;
        let identity = captured?;

        if self.announced.as_ref() == Some(&identity) {
            self.announced = None;
            Some(ClientSignal::StopTyping(identity.into_string()))
        } else {
            None
        }
    }

    /// Cancel the pending timer without emitting anything (teardown).
    pub fn cancel(&mut self) {
        self.timer.cancel();
        self.announced = None;
    }

    /// Deadline of the pending timer.
    pub fn deadline(&self) -> Option<I> {
        self.timer.deadline()
    }

    /// True while a "typing" announcement is outstanding.
    pub fn is_announced(&self) -> bool {
        self.announced.is_some()
    }
}
