//! Session manager settings.

use std::time::Duration;

use swk_protocol::Network;
use swk_runtime::KitConfig;

/// Default bound on re-prompting after a stale selection.
pub const DEFAULT_MAX_PROMPT_ATTEMPTS: u32 = 3;

/// Default bound on the signer teardown round-trip.
pub const DEFAULT_TEARDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
	/// Prompts opened per `connect()` before giving up on unknown ids. At least 1.
	pub max_prompt_attempts: u32,
	/// How long `disconnect()` waits for the signer before resetting anyway.
	pub teardown_timeout: Duration,
	/// Also commit the transient `Connecting`/`Disconnecting` snapshots.
	pub publish_transitions: bool,
	pub network: Network,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			max_prompt_attempts: DEFAULT_MAX_PROMPT_ATTEMPTS,
			teardown_timeout: DEFAULT_TEARDOWN_TIMEOUT,
			publish_transitions: false,
			network: Network::default(),
		}
	}
}

impl SessionConfig {
	pub fn new(network: Network) -> Self {
		Self {
			network,
			..Self::default()
		}
	}

	pub fn with_max_prompt_attempts(mut self, attempts: u32) -> Self {
		self.max_prompt_attempts = attempts.max(1);
		self
	}

	pub fn with_teardown_timeout(mut self, timeout: Duration) -> Self {
		self.teardown_timeout = timeout;
		self
	}

	pub fn with_publish_transitions(mut self, publish: bool) -> Self {
		self.publish_transitions = publish;
		self
	}

	/// Kit settings for an adapter serving this session.
	pub fn kit_config(&self) -> KitConfig {
		KitConfig::new(self.network)
	}
}
