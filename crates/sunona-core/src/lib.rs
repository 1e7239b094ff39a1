//! SunoNa core primitives
//!
//! Building blocks shared by the client session and the relay server:
//!
//! - [`env::Environment`]: time source, so every timer in the system can run
//!   against a virtual clock in tests
//! - [`Identity`]: validated display name
//! - [`MessageLog`]: append-only conversation log with monotonic local ids
//! - [`TyperSet`]: unique, arrival-ordered set of users currently typing
//! - [`Deferred`]: explicit cancellable deferred action (arm/cancel/fire)
//!
//! Nothing here performs I/O. Components take the current instant as an
//! argument and return what changed; callers decide what to do with it.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod deferred;
pub mod env;
mod error;
mod identity;
mod message;
mod typers;

pub use deferred::Deferred;
pub use env::{Environment, SystemEnv};
pub use error::IdentityError;
pub use identity::{Identity, MAX_IDENTITY_LEN};
pub use message::{Message, MessageId, MessageKind, MessageLog};
pub use typers::TyperSet;
