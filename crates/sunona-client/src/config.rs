//! Session timing configuration.

use std::time::Duration;

/// Delay between joining and the local welcome notice, letting the join
/// settle first.
pub const WELCOME_DELAY: Duration = Duration::from_millis(500);

/// Idle window after the last draft edit before "stopTyping" is sent.
pub const TYPING_IDLE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Time after the last "typing" refresh before a remote typer is dropped.
///
/// Remote clients re-announce "typing" on every keystroke and announce
/// "stopTyping" after [`TYPING_IDLE_TIMEOUT`], so an entry this old means the
/// stop signal was lost.
pub const TYPER_EXPIRY: Duration = Duration::from_secs(6);

/// Session timing configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Delay before the welcome notice after a join.
    pub welcome_delay: Duration,
    /// Idle window before "stopTyping" fires.
    pub typing_idle: Duration,
    /// Remote typer expiry. `None` keeps typers until "stopTyping" arrives.
    pub typer_expiry: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            welcome_delay: WELCOME_DELAY,
            typing_idle: TYPING_IDLE_TIMEOUT,
            typer_expiry: Some(TYPER_EXPIRY),
        }
    }
}
