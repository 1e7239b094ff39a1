//! Cancellable deferred actions.
//!
//! A [`Deferred`] is a one-shot timer carrying a payload. It never fires on
//! its own: the owner polls it with the current instant (typically from a
//! tick) and receives the payload once the deadline has passed. This keeps
//! timers inside the state machine, where a virtual clock can drive them.

use std::{ops::Add, time::Duration};

/// One-shot timer with a payload.
///
/// # Invariants
///
/// - At most one pending deadline at a time; re-arming replaces it
/// - A payload is yielded at most once per arm
#[derive(Debug, Clone)]
pub struct Deferred<I, T> {
    delay: Duration,
    pending: Option<(I, T)>,
}

impl<I, T> Deferred<I, T>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create a disarmed timer that fires `delay` after each arm.
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Arm (or re-arm) the timer.
    ///
    /// Returns the payload of the timer this replaced, if any was pending.
    pub fn arm(&mut self, now: I, payload: T) -> Option<T> {
        self.pending.replace((now + self.delay, payload)).map(|(_, old)| old)
    }

    /// Disarm the timer, returning its payload if it was pending.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    /// True if a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Pending deadline, if armed.
    pub fn deadline(&self) -> Option<I> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Fire the timer if its deadline has passed.
    ///
    /// Returns the payload exactly once; the timer is disarmed afterwards.
    pub fn fire(&mut self, now: I) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => self.cancel(),
            _ => None,
        }
    }
}
