//! The initialized signer library.

use std::sync::Arc;

use parking_lot::Mutex;
use swk_protocol::{Network, SignerId, SignerOption};
use tracing::{debug, warn};

use crate::backend::SignerBackend;
use crate::error::{Error, Result};

/// Registered signer backends plus the selection state layered on them.
///
/// A kit is created once per process by the adapter and reused across every
/// connect/disconnect cycle. Locks are never held across an await.
pub struct SignerKit {
	network: Network,
	backends: Vec<SignerBackend>,
	last_listed: Mutex<Vec<SignerId>>,
	bound: Mutex<Option<SignerBackend>>,
}

impl SignerKit {
	pub fn new(network: Network, backends: Vec<SignerBackend>) -> Self {
		Self {
			network,
			backends,
			last_listed: Mutex::new(Vec::new()),
			bound: Mutex::new(None),
		}
	}

	pub fn network(&self) -> Network {
		self.network
	}

	/// All registered backends, available or not.
	pub fn backends(&self) -> &[SignerBackend] {
		&self.backends
	}

	/// Lists currently available signers in registration order.
	///
	/// The result also becomes the set [`select_signer`](Self::select_signer)
	/// accepts ids from.
	pub async fn list_options(&self) -> Vec<SignerOption> {
		let mut options = Vec::with_capacity(self.backends.len());
		for backend in &self.backends {
			if backend.is_available().await {
				options.push(backend.option());
			} else {
				debug!(target = "swk.runtime", signer = %backend.id(), family = backend.family(), "signer not available");
			}
		}

		*self.last_listed.lock() = options.iter().map(|option| option.id.clone()).collect();
		options
	}

	/// Binds the kit to `id`, which must come from the last listing.
	pub fn select_signer(&self, id: &SignerId) -> Result<()> {
		if !self.last_listed.lock().contains(id) {
			return Err(Error::UnknownSigner(id.clone()));
		}

		let backend = self
			.backends
			.iter()
			.find(|backend| backend.id() == id)
			.cloned()
			.ok_or_else(|| Error::UnknownSigner(id.clone()))?;

		debug!(target = "swk.runtime", signer = %id, family = backend.family(), "signer selected");
		*self.bound.lock() = Some(backend);
		Ok(())
	}

	/// Id of the bound signer, if any.
	pub fn bound(&self) -> Option<SignerId> {
		self.bound.lock().as_ref().map(|backend| backend.id().clone())
	}

	/// Asks the bound signer for its current address.
	pub async fn get_address(&self) -> Result<String> {
		let backend = self.bound.lock().clone().ok_or(Error::NotBound)?;
		backend.get_address(self.network).await
	}

	/// Notifies the bound signer that the session ended and clears the binding.
	///
	/// The binding is cleared even when the signer's own teardown fails.
	pub async fn disconnect(&self) -> Result<()> {
		let Some(backend) = self.bound.lock().take() else {
			return Ok(());
		};

		let result = backend.disconnect(self.network).await;
		if let Err(err) = &result {
			warn!(target = "swk.runtime", signer = %backend.id(), error = %err, "signer teardown failed");
		}
		result
	}
}

impl std::fmt::Debug for SignerKit {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SignerKit")
			.field("network", &self.network)
			.field("backends", &self.backends)
			.field("bound", &self.bound())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scripted::{ScriptedOutcome, ScriptedSigner};

	fn kit_with(signers: Vec<Arc<ScriptedSigner>>) -> SignerKit {
		SignerKit::new(Network::Testnet, signers.into_iter().map(SignerBackend::from).collect())
	}

	#[tokio::test]
	async fn lists_only_available_signers_in_order() {
		let freighter = Arc::new(ScriptedSigner::new("freighter", "Freighter", "GFREIGHTER"));
		let albedo = Arc::new(ScriptedSigner::new("albedo", "Albedo", "GALBEDO"));
		let xbull = Arc::new(ScriptedSigner::new("xbull", "xBull", "GXBULL"));
		albedo.set_available(false);

		let kit = kit_with(vec![freighter, albedo, xbull]);
		let ids: Vec<_> = kit.list_options().await.into_iter().map(|o| o.id).collect();
		assert_eq!(ids, vec![SignerId::from("freighter"), SignerId::from("xbull")]);
	}

	#[tokio::test]
	async fn select_requires_id_from_last_listing() {
		let freighter = Arc::new(ScriptedSigner::new("freighter", "Freighter", "GFREIGHTER"));
		let kit = kit_with(vec![freighter.clone()]);

		let err = kit.select_signer(&SignerId::from("freighter")).unwrap_err();
		assert!(matches!(err, Error::UnknownSigner(_)), "nothing listed yet: {err:?}");

		kit.list_options().await;
		kit.select_signer(&SignerId::from("freighter")).unwrap();
		assert_eq!(kit.bound(), Some(SignerId::from("freighter")));

		freighter.set_available(false);
		kit.list_options().await;
		let err = kit.select_signer(&SignerId::from("freighter")).unwrap_err();
		assert!(matches!(err, Error::UnknownSigner(_)), "stale listing: {err:?}");
	}

	#[tokio::test]
	async fn get_address_needs_binding() {
		let kit = kit_with(vec![Arc::new(ScriptedSigner::new("freighter", "Freighter", "GFREIGHTER"))]);
		assert!(matches!(kit.get_address().await, Err(Error::NotBound)));

		kit.list_options().await;
		kit.select_signer(&SignerId::from("freighter")).unwrap();
		assert_eq!(kit.get_address().await.unwrap(), "GFREIGHTER");
	}

	#[tokio::test]
	async fn disconnect_clears_binding_even_when_teardown_fails() {
		let signer = Arc::new(
			ScriptedSigner::new("freighter", "Freighter", "GFREIGHTER").with_disconnect_outcome(ScriptedOutcome::Unavailable("gone".into())),
		);
		let kit = kit_with(vec![signer.clone()]);
		kit.list_options().await;
		kit.select_signer(&SignerId::from("freighter")).unwrap();

		assert!(kit.disconnect().await.is_err());
		assert_eq!(kit.bound(), None);
		assert_eq!(signer.disconnect_calls(), 1);

		kit.disconnect().await.unwrap();
		assert_eq!(signer.disconnect_calls(), 1);
	}
}
