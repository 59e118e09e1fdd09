//! Tagged signer families known to the kit.

use std::fmt;
use std::sync::Arc;

use swk_protocol::{Network, SignerId, SignerOption};

use crate::error::Result;
use crate::module::SignerModule;
use crate::process::ProcessSigner;
use crate::scripted::ScriptedSigner;

/// A registered signer, one variant per concrete family.
#[derive(Clone)]
pub enum SignerBackend {
	/// In-memory signer with scripted outcomes.
	Scripted(Arc<ScriptedSigner>),
	/// Out-of-process agent spoken to over stdio.
	Process(Arc<ProcessSigner>),
	/// Any other [`SignerModule`] implementation.
	Custom(Arc<dyn SignerModule>),
}

impl SignerBackend {
	/// Short family tag used in logs and configuration.
	pub fn family(&self) -> &'static str {
		match self {
			SignerBackend::Scripted(_) => "scripted",
			SignerBackend::Process(_) => "process",
			SignerBackend::Custom(_) => "custom",
		}
	}

	fn module(&self) -> &dyn SignerModule {
		match self {
			SignerBackend::Scripted(signer) => signer.as_ref(),
			SignerBackend::Process(signer) => signer.as_ref(),
			SignerBackend::Custom(signer) => signer.as_ref(),
		}
	}

	pub fn id(&self) -> &SignerId {
		self.module().id()
	}

	pub fn option(&self) -> SignerOption {
		self.module().option()
	}

	pub async fn is_available(&self) -> bool {
		self.module().is_available().await
	}

	pub async fn get_address(&self, network: Network) -> Result<String> {
		self.module().get_address(network).await
	}

	pub async fn disconnect(&self, network: Network) -> Result<()> {
		self.module().disconnect(network).await
	}
}

impl fmt::Debug for SignerBackend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SignerBackend")
			.field("family", &self.family())
			.field("id", self.id())
			.finish()
	}
}

impl From<ScriptedSigner> for SignerBackend {
	fn from(signer: ScriptedSigner) -> Self {
		SignerBackend::Scripted(Arc::new(signer))
	}
}

impl From<Arc<ScriptedSigner>> for SignerBackend {
	fn from(signer: Arc<ScriptedSigner>) -> Self {
		SignerBackend::Scripted(signer)
	}
}

impl From<ProcessSigner> for SignerBackend {
	fn from(signer: ProcessSigner) -> Self {
		SignerBackend::Process(Arc::new(signer))
	}
}
