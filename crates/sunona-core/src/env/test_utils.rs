//! Virtual-clock environment for tests.

use std::{
    ops::{Add, Sub},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use super::Environment;

/// Wall-clock reading at virtual time zero (2024-01-01T00:00:00Z).
pub const DEFAULT_EPOCH_MILLIS: u64 = 1_704_067_200_000;

/// Instant on the virtual clock, measured from its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VirtualInstant(Duration);

impl VirtualInstant {
    /// Time zero.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Instant at the given offset from time zero.
    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Offset from time zero.
    pub fn since_start(self) -> Duration {
        self.0
    }
}

impl Sub for VirtualInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

impl Add<Duration> for VirtualInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs))
    }
}

/// Environment whose clock only moves when told to.
///
/// Clones share the same clock, so a test can hold one handle and advance
/// time while the component under test holds another.
#[derive(Debug, Clone)]
pub struct MockEnv {
    elapsed_millis: Arc<AtomicU64>,
    epoch_millis: u64,
}

impl Default for MockEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEnv {
    /// Create a mock environment at virtual time zero.
    pub fn new() -> Self {
        Self::with_epoch(DEFAULT_EPOCH_MILLIS)
    }

    /// Create a mock environment whose wall clock starts at `epoch_millis`.
    pub fn with_epoch(epoch_millis: u64) -> Self {
        Self { elapsed_millis: Arc::new(AtomicU64::new(0)), epoch_millis }
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: Duration) {
        self.elapsed_millis.fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    /// Move the clock forward by `millis` milliseconds.
    pub fn advance_millis(&self, millis: u64) {
        self.elapsed_millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Environment for MockEnv {
    type Instant = VirtualInstant;

    fn now(&self) -> Self::Instant {
        VirtualInstant::from_millis(self.elapsed_millis.load(Ordering::SeqCst))
    }

    fn wall_clock_millis(&self) -> u64 {
        self.epoch_millis + self.elapsed_millis.load(Ordering::SeqCst)
    }

    /// Advances the virtual clock and completes immediately.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        self.advance(duration);
        std::future::ready(())
    }
}
