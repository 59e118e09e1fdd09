//! Lazy, memoized access to the signer kit.
//!
//! The kit is loaded on the first call that needs it, never at construction.
//! Initialization is a three-state machine guarded like a single flight:
//!
//! ```text
//! Uninitialized ──first call──► Initializing ──ok──► Ready (process lifetime)
//!       ▲                            │
//!       └─────────────err────────────┘
//! ```
//!
//! Concurrent callers during `Initializing` await the same load. A failed load
//! returns to `Uninitialized` so the next call retries. A caller still holding
//! an older, superseded load never touches the state, so at most one load is
//! in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use swk_protocol::{SignerId, SignerOption};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::kit::SignerKit;
use crate::loader::{KitConfig, KitLoader};

type SharedLoad = Shared<BoxFuture<'static, std::result::Result<Arc<SignerKit>, String>>>;

enum InitState {
	Uninitialized,
	Initializing(SharedLoad),
	Ready(Arc<SignerKit>),
}

/// Observable initialization phase of the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPhase {
	Uninitialized,
	Initializing,
	Ready,
}

/// Single capability boundary over every installed signer family.
#[derive(Clone)]
pub struct SignerAgentAdapter {
	loader: Arc<dyn KitLoader>,
	config: KitConfig,
	state: Arc<Mutex<InitState>>,
	loads: Arc<AtomicUsize>,
}

impl SignerAgentAdapter {
	pub fn new(loader: impl KitLoader + 'static, config: KitConfig) -> Self {
		Self::from_loader(Arc::new(loader), config)
	}

	pub fn from_loader(loader: Arc<dyn KitLoader>, config: KitConfig) -> Self {
		Self {
			loader,
			config,
			state: Arc::new(Mutex::new(InitState::Uninitialized)),
			loads: Arc::new(AtomicUsize::new(0)),
		}
	}

	pub fn config(&self) -> KitConfig {
		self.config
	}

	pub fn phase(&self) -> InitPhase {
		match &*self.state.lock() {
			InitState::Uninitialized => InitPhase::Uninitialized,
			InitState::Initializing(_) => InitPhase::Initializing,
			InitState::Ready(_) => InitPhase::Ready,
		}
	}

	/// Number of loader invocations so far.
	pub fn load_count(&self) -> usize {
		self.loads.load(Ordering::SeqCst)
	}

	/// Returns the kit, loading it first if needed.
	pub async fn kit(&self) -> Result<Arc<SignerKit>> {
		let load = {
			let mut state = self.state.lock();
			match &*state {
				InitState::Ready(kit) => return Ok(Arc::clone(kit)),
				InitState::Initializing(load) => load.clone(),
				InitState::Uninitialized => {
					let load = self.begin_load();
					*state = InitState::Initializing(load.clone());
					load
				}
			}
		};

		let result = load.clone().await;

		let mut state = self.state.lock();
		// Only the waiters of the load still installed may advance the state.
		let current = matches!(&*state, InitState::Initializing(installed) if installed.ptr_eq(&load));
		match result {
			Ok(kit) => {
				if current {
					debug!(target = "swk.runtime", network = %self.config.network, "signer kit ready");
					*state = InitState::Ready(Arc::clone(&kit));
				}
				Ok(kit)
			}
			Err(message) => {
				if current {
					*state = InitState::Uninitialized;
				}
				Err(Error::LoadFailed(message))
			}
		}
	}

	fn begin_load(&self) -> SharedLoad {
		let loader = Arc::clone(&self.loader);
		let loads = Arc::clone(&self.loads);
		let config = self.config;
		debug!(target = "swk.runtime", network = %config.network, "loading signer kit");

		async move {
			loads.fetch_add(1, Ordering::SeqCst);
			loader.load(config).await.map(Arc::new).map_err(|err| {
				warn!(target = "swk.runtime", error = %err, "signer kit failed to load");
				err.to_string()
			})
		}
		.boxed()
		.shared()
	}

	/// Lists the signer options available right now. May be empty.
	pub async fn list_options(&self) -> Result<Vec<SignerOption>> {
		Ok(self.kit().await?.list_options().await)
	}

	/// Binds to `id`, which must come from the last listing.
	pub async fn select_signer(&self, id: &SignerId) -> Result<()> {
		self.kit().await?.select_signer(id)
	}

	/// Asks the bound signer for its address.
	pub async fn get_address(&self) -> Result<String> {
		self.kit().await?.get_address().await
	}

	/// Best-effort teardown notification to the bound signer.
	///
	/// Never fails: teardown errors are logged and dropped. An adapter whose
	/// kit was never loaded has nothing to notify and does not load it.
	pub async fn disconnect(&self) {
		let kit = match &*self.state.lock() {
			InitState::Ready(kit) => Arc::clone(kit),
			_ => return,
		};

		if let Err(err) = kit.disconnect().await {
			warn!(target = "swk.runtime", error = %err, "ignoring signer teardown failure");
		}
	}
}

impl std::fmt::Debug for SignerAgentAdapter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SignerAgentAdapter")
			.field("config", &self.config)
			.field("phase", &self.phase())
			.field("loads", &self.load_count())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicBool;

	use async_trait::async_trait;
	use swk_protocol::Network;
	use tokio::sync::Notify;

	use super::*;
	use crate::backend::SignerBackend;
	use crate::loader::BackendsLoader;
	use crate::scripted::ScriptedSigner;

	struct GatedLoader {
		gate: Arc<Notify>,
		fail_first: AtomicBool,
	}

	#[async_trait]
	impl KitLoader for GatedLoader {
		async fn load(&self, config: KitConfig) -> Result<SignerKit> {
			self.gate.notified().await;
			if self.fail_first.swap(false, Ordering::SeqCst) {
				return Err(Error::LoadFailed("extension script missing".into()));
			}
			let signer = ScriptedSigner::new("freighter", "Freighter", "GFREIGHTER");
			Ok(SignerKit::new(config.network, vec![SignerBackend::from(signer)]))
		}
	}

	#[tokio::test]
	async fn does_not_load_until_first_use() {
		let adapter = SignerAgentAdapter::new(BackendsLoader::default(), KitConfig::default());
		assert_eq!(adapter.phase(), InitPhase::Uninitialized);
		assert_eq!(adapter.load_count(), 0);

		adapter.disconnect().await;
		assert_eq!(adapter.load_count(), 0, "disconnect must not trigger a load");

		assert!(adapter.list_options().await.unwrap().is_empty());
		assert_eq!(adapter.phase(), InitPhase::Ready);
		assert_eq!(adapter.load_count(), 1);

		adapter.list_options().await.unwrap();
		assert_eq!(adapter.load_count(), 1);
	}

	#[tokio::test]
	async fn concurrent_first_calls_share_one_load() {
		let gate = Arc::new(Notify::new());
		let adapter = SignerAgentAdapter::new(
			GatedLoader {
				gate: Arc::clone(&gate),
				fail_first: AtomicBool::new(false),
			},
			KitConfig::new(Network::Mainnet),
		);

		let first = tokio::spawn({
			let adapter = adapter.clone();
			async move { adapter.list_options().await }
		});
		let second = tokio::spawn({
			let adapter = adapter.clone();
			async move { adapter.list_options().await }
		});

		tokio::task::yield_now().await;
		assert_eq!(adapter.phase(), InitPhase::Initializing);
		gate.notify_one();

		assert_eq!(first.await.unwrap().unwrap().len(), 1);
		assert_eq!(second.await.unwrap().unwrap().len(), 1);
		assert_eq!(adapter.load_count(), 1);
		assert_eq!(adapter.kit().await.unwrap().network(), Network::Mainnet);
	}

	#[tokio::test]
	async fn failed_load_resets_and_retries() {
		let gate = Arc::new(Notify::new());
		let adapter = SignerAgentAdapter::new(
			GatedLoader {
				gate: Arc::clone(&gate),
				fail_first: AtomicBool::new(true),
			},
			KitConfig::default(),
		);

		gate.notify_one();
		let err = adapter.list_options().await.unwrap_err();
		assert!(matches!(err, Error::LoadFailed(_)), "got {err:?}");
		assert_eq!(adapter.phase(), InitPhase::Uninitialized);

		gate.notify_one();
		assert_eq!(adapter.list_options().await.unwrap().len(), 1);
		assert_eq!(adapter.load_count(), 2);
	}

	#[tokio::test]
	async fn late_waiter_of_failed_load_keeps_newer_load() {
		let gate = Arc::new(Notify::new());
		let adapter = SignerAgentAdapter::new(
			GatedLoader {
				gate: Arc::clone(&gate),
				fail_first: AtomicBool::new(true),
			},
			KitConfig::default(),
		);

		let mut first = Box::pin(adapter.kit());
		let mut late = Box::pin(adapter.kit());
		assert!(first.as_mut().now_or_never().is_none());
		assert!(late.as_mut().now_or_never().is_none());

		gate.notify_one();
		assert!(matches!(first.as_mut().now_or_never(), Some(Err(Error::LoadFailed(_)))));
		assert_eq!(adapter.phase(), InitPhase::Uninitialized);

		let mut retry = Box::pin(adapter.kit());
		assert!(retry.as_mut().now_or_never().is_none());
		assert_eq!(adapter.load_count(), 2);

		assert!(matches!(late.as_mut().now_or_never(), Some(Err(Error::LoadFailed(_)))));
		assert_eq!(adapter.phase(), InitPhase::Initializing, "retry load must stay installed");

		let mut joiner = Box::pin(adapter.kit());
		assert!(joiner.as_mut().now_or_never().is_none());
		assert_eq!(adapter.load_count(), 2);

		gate.notify_one();
		assert_eq!(retry.await.unwrap().list_options().await.len(), 1);
		assert_eq!(joiner.await.unwrap().list_options().await.len(), 1);
		assert_eq!(adapter.phase(), InitPhase::Ready);
		assert_eq!(adapter.load_count(), 2);
	}
}
