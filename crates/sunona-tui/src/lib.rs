//! Terminal UI for SunoNa
//!
//! A thin shell over [`sunona_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`sunona_app::Runtime`]
//!
//! This crate only handles terminal input, the TCP transport hookup and
//! rendering.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod terminal;
pub mod ui;

pub use sunona_app::{App, AppAction, AppEvent, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
