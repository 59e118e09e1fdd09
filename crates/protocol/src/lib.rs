//! Wire and data types for swk wallet sessions.
//!
//! This crate contains the serde-serializable shapes shared by the signer
//! runtime, the session manager, and front-ends:
//!
//! - [`Session`] / [`SessionStatus`]: the single authenticated-identity record
//! - [`SignerId`] / [`SignerOption`]: what a signer agent looks like to a chooser
//! - [`Network`]: the ledger network a signer kit is initialized for
//! - [`agent`]: request/response frames exchanged with out-of-process signer agents
//!
//! Types here carry no behavior beyond construction, validation, and
//! serialization.

pub mod agent;
pub mod network;
pub mod session;
pub mod signer;

pub use network::Network;
pub use session::{InvalidSession, Session, SessionStatus};
pub use signer::{SignerId, SignerOption};
