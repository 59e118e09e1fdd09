//! swk - wallet session management over pluggable signer agents
//!
//! One [`WalletSessionManager`] per process owns the authenticated session.
//! It drives a [`SelectionPrompt`] supplied by the UI layer, talks to signers
//! through a [`SignerAgentAdapter`], and publishes every committed change to a
//! [`SessionStore`] that any number of consumers can subscribe to.
//!
//! ```ignore
//! let adapter = SignerAgentAdapter::new(BackendsLoader::new(backends), config.kit_config());
//! let manager = WalletSessionManager::new(adapter, prompt, config);
//!
//! let _sub = manager.on_session_change(|session| println!("{}", session.status()));
//! match manager.connect().await {
//!     Ok(session) => println!("connected as {:?}", session.address()),
//!     Err(err) if err.is_benign() => {}
//!     Err(err) => eprintln!("{err}"),
//! }
//! manager.disconnect().await;
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod prompt;
pub mod store;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use manager::WalletSessionManager;
pub use prompt::{FirstOption, FixedPrompt, Selection, SelectionPrompt};
pub use store::{ListenerId, SessionStore, Subscription};
pub use swk_protocol::{Network, Session, SessionStatus, SignerId, SignerOption};
pub use swk_runtime::{SignerAgentAdapter, SignerBackend};
