//! The process-wide wallet session state machine.
//!
//! ```text
//!                 connect()                address resolved
//! Disconnected ─────────────► Connecting ─────────────────► Connected
//!      ▲                          │                             │
//!      │   cancel / error         │                             │ disconnect()
//!      ├──────────────────────────┘                             ▼
//!      └────────────── teardown done, failed or timed out ─ Disconnecting
//! ```
//!
//! Connect and disconnect each run as a single spawned flight. Callers that
//! arrive while a flight is in progress attach to it instead of starting
//! another one, and a caller that stops waiting does not stop the flight: its
//! result is still committed to the [`SessionStore`].
//!
//! Every transition bumps an epoch under the state lock and publishes to the
//! store after the lock is released, so listeners never run under the
//! manager's lock and a late publication cannot overwrite a newer one.


use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use swk_protocol::{Session, SessionStatus, SignerId, SignerOption};
use swk_runtime::{Error as RuntimeError, SignerAgentAdapter};
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::prompt::{Selection, SelectionPrompt};
use crate::store::{SessionStore, Subscription};

type ConnectFlight = Shared<BoxFuture<'static, Result<Session>>>;
type DisconnectFlight = Shared<BoxFuture<'static, ()>>;

enum Phase {
	Disconnected,
	Connecting(ConnectFlight),
	Connected(Session),
	Disconnecting(DisconnectFlight),
}

impl Phase {
	fn status(&self) -> SessionStatus {
		match self {
			Phase::Disconnected => SessionStatus::Disconnected,
			Phase::Connecting(_) => SessionStatus::Connecting,
			Phase::Connected(_) => SessionStatus::Connected,
			Phase::Disconnecting(_) => SessionStatus::Disconnecting,
		}
	}
}

struct ManagerState {
	phase: Phase,
	epoch: u64,
}

impl ManagerState {
	/// Moves to `phase` and returns the epoch of the new transition.
	fn advance(&mut self, phase: Phase) -> u64 {
		self.phase = phase;
		self.epoch += 1;
		self.epoch
	}
}

enum Pending {
	Connect(ConnectFlight),
	Disconnect(DisconnectFlight),
}

struct Inner {
	adapter: SignerAgentAdapter,
	prompt: Arc<dyn SelectionPrompt>,
	config: SessionConfig,
	state: Mutex<ManagerState>,
	store: SessionStore,
}

/// Owner of the single authenticated session.
///
/// Construct one per process and hand clones to every consumer; clones share
/// the same state, adapter, and store.
#[derive(Clone)]
pub struct WalletSessionManager {
	inner: Arc<Inner>,
}

impl WalletSessionManager {
	pub fn new(adapter: SignerAgentAdapter, prompt: impl SelectionPrompt + 'static, config: SessionConfig) -> Self {
		Self::from_prompt(adapter, Arc::new(prompt), config)
	}

	pub fn from_prompt(adapter: SignerAgentAdapter, prompt: Arc<dyn SelectionPrompt>, config: SessionConfig) -> Self {
		if adapter.config().network != config.network {
			warn!(
				target = "swk.session",
				adapter = %adapter.config().network,
				session = %config.network,
				"adapter and session are configured for different networks"
			);
		}

		Self {
			inner: Arc::new(Inner {
				adapter,
				prompt,
				config,
				state: Mutex::new(ManagerState {
					phase: Phase::Disconnected,
					epoch: 0,
				}),
				store: SessionStore::new(),
			}),
		}
	}

	/// Connects through the selection prompt, or returns the current session.
	///
	/// While a connect is already in flight this resolves with that attempt's
	/// outcome instead of opening a second prompt. While a disconnect is in
	/// flight it waits for the teardown to finish and then connects.
	pub async fn connect(&self) -> Result<Session> {
		loop {
			let (pending, publish) = {
				let mut state = self.inner.state.lock();
				match &state.phase {
					Phase::Connected(session) => return Ok(session.clone()),
					Phase::Connecting(flight) => (Pending::Connect(flight.clone()), None),
					Phase::Disconnecting(flight) => (Pending::Disconnect(flight.clone()), None),
					Phase::Disconnected => {
						let flight = self.spawn_connect();
						let epoch = state.advance(Phase::Connecting(flight.clone()));
						(Pending::Connect(flight), Some(epoch))
					}
				}
			};

			if let Some(epoch) = publish {
				self.inner.publish_transient(epoch, Session::connecting());
			}

			match pending {
				Pending::Connect(flight) => return flight.await,
				Pending::Disconnect(flight) => flight.await,
			}
		}
	}

	/// Ends the session. Always leaves the manager disconnected.
	///
	/// Signer teardown failures and timeouts are logged, never returned. A
	/// connect in flight is allowed to finish first; a resulting session is
	/// then torn down.
	pub async fn disconnect(&self) {
		loop {
			let (pending, publish) = {
				let mut state = self.inner.state.lock();
				match &state.phase {
					Phase::Disconnected => return,
					Phase::Connecting(flight) => (Pending::Connect(flight.clone()), None),
					Phase::Disconnecting(flight) => (Pending::Disconnect(flight.clone()), None),
					Phase::Connected(session) => {
						let signer = session.signer_id().cloned();
						let flight = self.spawn_disconnect(signer);
						let epoch = state.advance(Phase::Disconnecting(flight.clone()));
						(Pending::Disconnect(flight), Some(epoch))
					}
				}
			};

			if let Some(epoch) = publish {
				self.inner.publish_transient(epoch, Session::disconnecting());
			}

			match pending {
				Pending::Connect(flight) => {
					let _ = flight.await;
				}
				Pending::Disconnect(flight) => return flight.await,
			}
		}
	}

	/// Last committed session snapshot.
	pub fn get_session(&self) -> Session {
		self.inner.store.get()
	}

	/// Live phase, including transient states not committed to the store.
	pub fn status(&self) -> SessionStatus {
		self.inner.state.lock().phase.status()
	}

	/// Subscribes to committed session changes.
	pub fn on_session_change<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&Session) + Send + Sync + 'static,
	{
		self.inner.store.subscribe(listener)
	}

	/// Lists available signers without opening a prompt.
	pub async fn options(&self) -> Result<Vec<SignerOption>> {
		Ok(self.inner.adapter.list_options().await?)
	}

	/// Read-only handle to the session store.
	pub fn store(&self) -> SessionStore {
		self.inner.store.clone()
	}

	pub fn adapter(&self) -> &SignerAgentAdapter {
		&self.inner.adapter
	}

	pub fn config(&self) -> &SessionConfig {
		&self.inner.config
	}

	fn spawn_connect(&self) -> ConnectFlight {
		let inner = Arc::clone(&self.inner);
		let task = tokio::spawn(async move {
			let guard = ResetOnDrop::arm(Arc::clone(&inner), "connect");
			let outcome = inner.establish().await;
			guard.disarm();
			inner.finish_connect(&outcome);
			outcome
		});

		async move {
			task.await.unwrap_or_else(|err| {
				Err(SessionError::SignerUnavailable {
					signer: None,
					reason: format!("connect task failed: {err}"),
				})
			})
		}
		.boxed()
		.shared()
	}

	fn spawn_disconnect(&self, signer: Option<SignerId>) -> DisconnectFlight {
		let inner = Arc::clone(&self.inner);
		let task = tokio::spawn(async move {
			let guard = ResetOnDrop::arm(Arc::clone(&inner), "disconnect");
			inner.teardown(signer.as_ref()).await;
			guard.disarm();
			inner.reset();
		});

		async move {
			if let Err(err) = task.await {
				warn!(target = "swk.session", error = %err, "disconnect task failed");
			}
		}
		.boxed()
		.shared()
	}
}

impl Inner {
	async fn establish(&self) -> Result<Session> {
		debug!(target = "swk.session", network = %self.config.network, "connecting");

		let mut options = self.adapter.list_options().await?;
		let mut attempt = 1;
		let signer = loop {
			if options.is_empty() {
				return Err(SessionError::NoSignerAvailable);
			}

			let id = match self.prompt.select(&options).await {
				Selection::Selected(id) => id,
				Selection::Cancelled => return Err(SessionError::Cancelled),
			};

			match self.adapter.select_signer(&id).await {
				Ok(()) => break id,
				Err(RuntimeError::UnknownSigner(id)) if attempt < self.config.max_prompt_attempts => {
					warn!(target = "swk.session", signer = %id, attempt, "selection is not among listed signers; prompting again");
					attempt += 1;
					options = self.adapter.list_options().await?;
				}
				Err(err) => return Err(err.into()),
			}
		};

		let address = self
			.adapter
			.get_address()
			.await
			.map_err(|err| SessionError::from_signer(err, &signer))?;
		if address.is_empty() {
			return Err(SessionError::SignerUnavailable {
				signer: Some(signer),
				reason: "signer returned an empty address".into(),
			});
		}

		Ok(Session::connected(address, signer))
	}

	fn finish_connect(&self, outcome: &Result<Session>) {
		let session = match outcome {
			Ok(session) => {
				info!(
					target = "swk.session",
					signer = ?session.signer_id().map(SignerId::as_str),
					address = ?session.address(),
					"wallet connected"
				);
				session.clone()
			}
			Err(err) if err.is_benign() => {
				debug!(target = "swk.session", error = %err, "connect ended without a session");
				Session::disconnected()
			}
			Err(err) => {
				warn!(target = "swk.session", code = err.code(), error = %err, "connect failed");
				Session::disconnected()
			}
		};

		let epoch = {
			let mut state = self.state.lock();
			let phase = if session.is_connected() {
				Phase::Connected(session.clone())
			} else {
				Phase::Disconnected
			};
			state.advance(phase)
		};
		self.store.commit(epoch, session);
	}

	async fn teardown(&self, signer: Option<&SignerId>) {
		let signer = signer.map(SignerId::as_str);
		debug!(target = "swk.session", ?signer, "disconnecting");

		match tokio::time::timeout(self.config.teardown_timeout, self.adapter.disconnect()).await {
			Ok(()) => debug!(target = "swk.session", ?signer, "signer teardown finished"),
			Err(_) => warn!(
				target = "swk.session",
				?signer,
				timeout_ms = self.config.teardown_timeout.as_millis() as u64,
				"signer teardown timed out; resetting session anyway"
			),
		}
	}

	/// Unconditionally returns to `Disconnected`.
	fn reset(&self) {
		let epoch = self.state.lock().advance(Phase::Disconnected);
		if self.store.commit(epoch, Session::disconnected()) {
			info!(target = "swk.session", "wallet disconnected");
		}
	}

	fn publish_transient(&self, epoch: u64, session: Session) {
		if self.config.publish_transitions {
			self.store.commit(epoch, session);
		}
	}
}

/// Resets the manager if a flight ends without settling, e.g. by panicking.
struct ResetOnDrop {
	inner: Option<Arc<Inner>>,
	flight: &'static str,
}

impl ResetOnDrop {
	fn arm(inner: Arc<Inner>, flight: &'static str) -> Self {
		Self {
			inner: Some(inner),
			flight,
		}
	}

	fn disarm(mut self) {
		self.inner = None;
	}
}

impl Drop for ResetOnDrop {
	fn drop(&mut self) {
		if let Some(inner) = self.inner.take() {
			error!(target = "swk.session", flight = self.flight, "session flight aborted; resetting to disconnected");
			inner.reset();
		}
	}
}

impl std::fmt::Debug for WalletSessionManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WalletSessionManager")
			.field("status", &self.status())
			.field("session", &self.get_session())
			.field("adapter", &self.inner.adapter)
			.field("config", &self.inner.config)
			.finish()
	}
}
