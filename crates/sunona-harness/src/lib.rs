//! Deterministic simulation harness for SunoNa.
//!
//! In-memory implementations of the room and the frontend driver, all
//! sharing one virtual clock, for reproducible multi-client testing.
//!
//! # Components
//!
//! - [`SimRoom`]: the relay's [`sunona_server::RoomHub`] with in-memory
//!   delivery queues instead of sockets
//! - [`SimWorld`]: several [`sunona_app::App`]s wired to one [`SimRoom`]
//! - [`SimDriver`]: [`sunona_app::Driver`] for running the generic runtime
//!   in tests
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the
//! conversation invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_room;
pub mod world;

pub use invariants::{
    ClientSnapshot, ComposerMirrorsDraft, IdentityWhenJoined, Invariant, InvariantRegistry,
    InvariantResult, LocalIdsIncrease, LogAppendOnly, MessagesWellFormed, NoEchoToOrigin,
    SystemSnapshot, TypersUnique, Violation,
};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_room::{Delivery, Relayed, SimRoom};
pub use sunona_core::env::test_utils::{MockEnv, VirtualInstant};
pub use world::{SimClient, SimWorld};
