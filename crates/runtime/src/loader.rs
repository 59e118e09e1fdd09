//! Construction of the signer kit.

use async_trait::async_trait;
use swk_protocol::Network;

use crate::backend::SignerBackend;
use crate::error::Result;
use crate::kit::SignerKit;

/// Settings the kit is constructed with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KitConfig {
	pub network: Network,
}

impl KitConfig {
	pub fn new(network: Network) -> Self {
		Self { network }
	}
}

/// Loads the signer library. Called at most once per successful load.
#[async_trait]
pub trait KitLoader: Send + Sync {
	async fn load(&self, config: KitConfig) -> Result<SignerKit>;
}

/// Loader over a fixed set of backends.
#[derive(Debug, Clone, Default)]
pub struct BackendsLoader {
	backends: Vec<SignerBackend>,
}

impl BackendsLoader {
	pub fn new(backends: Vec<SignerBackend>) -> Self {
		Self { backends }
	}

	pub fn with(mut self, backend: impl Into<SignerBackend>) -> Self {
		self.backends.push(backend.into());
		self
	}
}

#[async_trait]
impl KitLoader for BackendsLoader {
	async fn load(&self, config: KitConfig) -> Result<SignerKit> {
		Ok(SignerKit::new(config.network, self.backends.clone()))
	}
}
