//! swk runtime - the signer agent adapter boundary
//!
//! Hides zero, one, or many concrete signer families behind one capability
//! set (`list_options`, `select_signer`, `get_address`, `disconnect`):
//!
//! - **Backends**: [`SignerBackend`] names each concrete family; every family
//!   implements [`SignerModule`]
//! - **Kit**: [`SignerKit`] is the initialized signer library, tracking the last
//!   listed options and the bound signer
//! - **Adapter**: [`SignerAgentAdapter`] loads the kit lazily, at most once per
//!   process, through a [`KitLoader`]
//! - **Agents**: [`ProcessSigner`] talks to an out-of-process signer over a
//!   [`PipeTransport`] with [`AgentConnection`] request correlation
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  SignerAgentAdapter  │  lazy, single-flight kit initialization
//! └──────────┬───────────┘
//! ┌──────────▼───────────┐
//! │      SignerKit       │  options, selection, bound signer
//! └──────────┬───────────┘
//! ┌──────────▼───────────┐
//! │    SignerBackend     │  Scripted | Process | Custom
//! └──────────┬───────────┘
//!            │ Process
//! ┌──────────▼───────────┐
//! │   AgentConnection    │  id correlation over PipeTransport
//! └──────────────────────┘
//! ```

pub mod adapter;
pub mod backend;
pub mod connection;
pub mod error;
pub mod kit;
pub mod loader;
pub mod module;
pub mod process;
pub mod scripted;
pub mod transport;

pub use adapter::{InitPhase, SignerAgentAdapter};
pub use backend::SignerBackend;
pub use connection::AgentConnection;
pub use error::{Error, Result};
pub use kit::SignerKit;
pub use loader::{BackendsLoader, KitConfig, KitLoader};
pub use module::SignerModule;
pub use process::ProcessSigner;
pub use scripted::{ScriptedOutcome, ScriptedSigner};
pub use transport::{PipeTransport, PipeTransportReceiver, PipeTransportSender};
