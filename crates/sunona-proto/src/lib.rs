//! SunoNa wire protocol
//!
//! Named signals exchanged between a chat client and the room relay, the
//! message wire shape, and newline-delimited JSON framing.
//!
//! # Layers
//!
//! - [`ClientSignal`] / [`ServerSignal`]: the named events each direction
//!   carries. Transport lifecycle (connect/disconnect) is not a wire signal.
//! - [`WireMessage`]: `{ id, kind?, sender?, text, ts }` as it appears on the
//!   wire.
//! - [`codec`]: one JSON envelope per line, with a bounded [`LineDecoder`]
//!   for stream reassembly.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod errors;
mod message;
mod signal;

pub use codec::{LineDecoder, MAX_LINE_LEN, decode_signal, encode_signal};
pub use errors::{ProtocolError, Result};
pub use message::{WireKind, WireMessage};
pub use signal::{ClientSignal, ServerSignal};
