//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Driver`]: Platform-specific I/O

use sunona_client::Environment;

use crate::{App, AppAction, Driver};

/// Generic runtime that orchestrates App and Driver.
///
/// Detaches the session and stops the driver when dropped, so teardown runs
/// on every exit path (quit, driver error, panic unwinding).
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment for time
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App<E>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Create a new runtime with the given driver and app.
    pub fn new(driver: D, app: App<E>) -> Self {
        Self { driver, app }
    }

    /// Run the main event loop until the app quits.
    ///
    /// This is the core orchestration loop that:
    /// 1. Attaches the session and renders the first frame
    /// 2. Polls for input events from the driver
    /// 3. Feeds them to the App
    /// 4. Executes the resulting actions through the driver
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        let actions = self.app.start();
        if self.process_actions(actions).await? {
            return Ok(());
        }

        loop {
            if self.process_cycle().await? {
                break;
            }
        }

        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    pub async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let Some(event) = self.driver.poll_event().await? else {
            return Ok(false);
        };
        let actions = self.app.handle(event);
        self.process_actions(actions).await
    }

    /// Execute actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        for action in actions {
            match action {
                AppAction::Render => self.driver.render(&self.app)?,
                AppAction::Quit => return Ok(true),
                AppAction::Send(signal) => self.driver.send(signal).await?,
            }
        }
        Ok(false)
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App<E> {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App<E> {
        &mut self.app
    }
}

impl<D, E> Drop for Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    fn drop(&mut self) {
        for action in self.app.shutdown() {
            if let AppAction::Send(signal) = action {
                tracing::warn!(signal = signal.name(), "Signal produced during teardown dropped");
            }
        }
        self.driver.stop();
    }
}
