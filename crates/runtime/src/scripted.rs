//! In-memory signer with scripted outcomes.
//!
//! Stands in for a real wallet in tests and demos: availability, the address
//! round-trip, and teardown can each be set to approve, reject, fail, or
//! hang, and call counts are observable.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use swk_protocol::{Network, SignerId};

use crate::error::{Error, Result};
use crate::module::SignerModule;

/// What a scripted round-trip resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum ScriptedOutcome {
	/// Succeed.
	#[default]
	Approve,
	/// Fail as if the user declined in the signer UI.
	Reject(String),
	/// Fail as if the signer disappeared.
	Unavailable(String),
	/// Never resolve.
	Hang,
}

/// Signer whose behavior is set up front and adjustable at runtime.
#[derive(Debug)]
pub struct ScriptedSigner {
	id: SignerId,
	display_name: String,
	address: Mutex<String>,
	available: AtomicBool,
	address_outcome: Mutex<ScriptedOutcome>,
	disconnect_outcome: Mutex<ScriptedOutcome>,
	latency: Option<Duration>,
	address_calls: AtomicUsize,
	disconnect_calls: AtomicUsize,
}

impl ScriptedSigner {
	/// An available signer that approves with `address`.
	pub fn new(id: impl Into<SignerId>, display_name: impl Into<String>, address: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			display_name: display_name.into(),
			address: Mutex::new(address.into()),
			available: AtomicBool::new(true),
			address_outcome: Mutex::new(ScriptedOutcome::Approve),
			disconnect_outcome: Mutex::new(ScriptedOutcome::Approve),
			latency: None,
			address_calls: AtomicUsize::new(0),
			disconnect_calls: AtomicUsize::new(0),
		}
	}

	pub fn with_address_outcome(self, outcome: ScriptedOutcome) -> Self {
		*self.address_outcome.lock() = outcome;
		self
	}

	pub fn with_disconnect_outcome(self, outcome: ScriptedOutcome) -> Self {
		*self.disconnect_outcome.lock() = outcome;
		self
	}

	/// Delays every round-trip by `latency`.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}

	pub fn set_available(&self, available: bool) {
		self.available.store(available, Ordering::SeqCst);
	}

	pub fn set_address(&self, address: impl Into<String>) {
		*self.address.lock() = address.into();
	}

	pub fn set_address_outcome(&self, outcome: ScriptedOutcome) {
		*self.address_outcome.lock() = outcome;
	}

	pub fn set_disconnect_outcome(&self, outcome: ScriptedOutcome) {
		*self.disconnect_outcome.lock() = outcome;
	}

	pub fn address_calls(&self) -> usize {
		self.address_calls.load(Ordering::SeqCst)
	}

	pub fn disconnect_calls(&self) -> usize {
		self.disconnect_calls.load(Ordering::SeqCst)
	}

	async fn play(&self, outcome: ScriptedOutcome) -> Result<()> {
		if let Some(latency) = self.latency {
			tokio::time::sleep(latency).await;
		}

		match outcome {
			ScriptedOutcome::Approve => Ok(()),
			ScriptedOutcome::Reject(reason) => Err(Error::Rejected {
				signer: self.id.clone(),
				reason,
			}),
			ScriptedOutcome::Unavailable(reason) => Err(Error::Unavailable {
				signer: self.id.clone(),
				reason,
			}),
			ScriptedOutcome::Hang => std::future::pending().await,
		}
	}
}

#[async_trait]
impl SignerModule for ScriptedSigner {
	fn id(&self) -> &SignerId {
		&self.id
	}

	fn display_name(&self) -> &str {
		&self.display_name
	}

	async fn is_available(&self) -> bool {
		self.available.load(Ordering::SeqCst)
	}

	async fn get_address(&self, _network: Network) -> Result<String> {
		self.address_calls.fetch_add(1, Ordering::SeqCst);
		let outcome = self.address_outcome.lock().clone();
		self.play(outcome).await?;

		if !self.available.load(Ordering::SeqCst) {
			return Err(Error::Unavailable {
				signer: self.id.clone(),
				reason: "signer was removed".into(),
			});
		}
		Ok(self.address.lock().clone())
	}

	async fn disconnect(&self, _network: Network) -> Result<()> {
		self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
		let outcome = self.disconnect_outcome.lock().clone();
		self.play(outcome).await
	}
}
