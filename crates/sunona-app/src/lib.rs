//! Application layer for SunoNa
//!
//! Pure state machine and generic runtime for chat frontends, enabling
//! deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: UI state machine (name prompt, draft editing, emoji picker)
//!   wrapping the [`sunona_client::Session`]
//! - [`LineEditor`]: cursor-aware single-line text buffer
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod driver;
mod event;
mod input;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use driver::Driver;
pub use event::AppEvent;
pub use input::KeyInput;
pub use runtime::Runtime;
pub use state::{Focus, LineEditor};
