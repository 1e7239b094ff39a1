//! Client
//!
//! Action-based session state machine for a SunoNa chat room. Tracks the
//! local identity, the conversation (message log, typers, connectivity) and
//! the outbound typing signals.
//!
//! # Architecture
//!
//! The session is Sans-IO. It receives transport events ([`SessionEvent`])
//! and local intents (method calls such as [`Session::join`]), updates its
//! state, and returns actions ([`SessionAction`]) for the caller to execute.
//! Time enters only through the [`Environment`] and `Tick` events, so every
//! timer runs against a virtual clock in tests.
//!
//! # Components
//!
//! - [`Session`]: session controller owning identity, draft and handlers
//! - [`Conversation`]: reactive store of messages, typers and connectivity
//! - [`TypingDebouncer`]: keystrokes to typing/stopTyping signals
//! - [`SessionConfig`]: delays and timeouts
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::connect`]: newline-delimited JSON over TCP with automatic
//!   reconnection

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod conversation;
mod debounce;
mod error;
mod event;
mod session;

#[cfg(feature = "transport")]
pub mod transport;

pub use config::{SessionConfig, TYPER_EXPIRY, TYPING_IDLE_TIMEOUT, WELCOME_DELAY};
pub use conversation::{Connectivity, Conversation, ConversationUpdate};
pub use debounce::TypingDebouncer;
pub use error::ClientError;
pub use event::{LogLevel, SessionAction, SessionEvent};
pub use session::{QUICK_EMOJIS, ROOM_TITLE, Session, SessionPhase};
pub use sunona_core::{Environment, Identity, Message, MessageKind};
pub use sunona_proto::{ClientSignal, ServerSignal, WireMessage};
