//! Environment abstraction for deterministic testing.
//!
//! Decouples session logic from system time. Production code uses
//! [`SystemEnv`]; tests use a virtual clock (see `test_utils::MockEnv`) so
//! debounce windows and scheduled notices can be driven step by step.

mod system;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::{
    fmt::Debug,
    ops::{Add, Sub},
    time::Duration,
};

pub use system::SystemEnv;

/// Abstract environment providing monotonic time, wall-clock time and sleep.
///
/// # Invariants
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards
/// - `wall_clock_millis()` is only used for display and message ids, never
///   for ordering or timeouts
pub trait Environment: Clone + Send + Sync + 'static {
    /// Monotonic instant type.
    ///
    /// Production uses `std::time::Instant`; tests use a virtual instant that
    /// only moves when the test advances it.
    type Instant: Copy
        + Ord
        + Debug
        + Send
        + Sync
        + Sub<Output = Duration>
        + Add<Duration, Output = Self::Instant>;

    /// Current monotonic time.
    fn now(&self) -> Self::Instant;

    /// Current wall-clock time in Unix milliseconds.
    fn wall_clock_millis(&self) -> u64;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code awaits this; state machines take instants as
    /// arguments instead.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
