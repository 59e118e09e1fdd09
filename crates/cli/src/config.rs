//! CLI configuration file.
//!
//! Read from `--config FILE`, else `$XDG_CONFIG_HOME/swk/config.json`, else
//! the platform config directory. A missing file is an empty configuration;
//! a malformed one is an error.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use swk::{Network, SessionConfig, SignerBackend, SignerId};
use swk_runtime::{ProcessSigner, ScriptedOutcome, ScriptedSigner};

use crate::error::{CliError, Result};

const CONFIG_DIR: &str = "swk";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CliConfig {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub network: Option<Network>,
	pub signers: Vec<SignerConfig>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_prompt_attempts: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub teardown_timeout_ms: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub publish_transitions: Option<bool>,
}

/// One registered signer, tagged by family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignerConfig {
	/// Agent launched as a child process speaking framed JSON on stdio.
	Process {
		id: SignerId,
		name: String,
		command: String,
		#[serde(default)]
		args: Vec<String>,
	},
	/// In-process signer with a fixed outcome.
	Scripted {
		id: SignerId,
		name: String,
		address: String,
		#[serde(default)]
		outcome: ScriptedOutcome,
		#[serde(default = "available_by_default")]
		available: bool,
	},
}

fn available_by_default() -> bool {
	true
}

impl SignerConfig {
	pub fn id(&self) -> &SignerId {
		match self {
			SignerConfig::Process { id, .. } | SignerConfig::Scripted { id, .. } => id,
		}
	}

	pub fn to_backend(&self) -> SignerBackend {
		match self {
			SignerConfig::Process { id, name, command, args } => {
				ProcessSigner::new(id.clone(), name.clone(), command.clone()).with_args(args.iter().cloned()).into()
			}
			SignerConfig::Scripted {
				id,
				name,
				address,
				outcome,
				available,
			} => {
				let signer = ScriptedSigner::new(id.clone(), name.clone(), address.clone()).with_address_outcome(outcome.clone());
				signer.set_available(*available);
				signer.into()
			}
		}
	}
}

impl CliConfig {
	/// Loads `path`, treating a missing file as the default configuration.
	pub fn load(path: &Path) -> Result<Self> {
		let content = match fs::read_to_string(path) {
			Ok(content) => content,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				tracing::debug!(target = "swk.cli", path = %path.display(), "no config file; using defaults");
				return Ok(Self::default());
			}
			Err(err) => return Err(err.into()),
		};

		let config: Self = serde_json::from_str(&content).map_err(|err| CliError::Config {
			path: path.to_path_buf(),
			message: err.to_string(),
		})?;
		config.validate(path)?;
		Ok(config)
	}

	fn validate(&self, path: &Path) -> Result<()> {
		let mut seen = std::collections::HashSet::new();
		for signer in &self.signers {
			if !seen.insert(signer.id()) {
				return Err(CliError::Config {
					path: path.to_path_buf(),
					message: format!("duplicate signer id `{}`", signer.id()),
				});
			}
		}
		Ok(())
	}

	/// Effective network: `--network` wins over the file.
	pub fn network(&self, cli_override: Option<Network>) -> Network {
		cli_override.or(self.network).unwrap_or_default()
	}

	pub fn session_config(&self, network: Network) -> SessionConfig {
		let mut config = SessionConfig::new(network);
		if let Some(attempts) = self.max_prompt_attempts {
			config = config.with_max_prompt_attempts(attempts);
		}
		if let Some(ms) = self.teardown_timeout_ms {
			config = config.with_teardown_timeout(Duration::from_millis(ms));
		}
		if let Some(publish) = self.publish_transitions {
			config = config.with_publish_transitions(publish);
		}
		config
	}

	pub fn backends(&self) -> Vec<SignerBackend> {
		self.signers.iter().map(SignerConfig::to_backend).collect()
	}
}

/// Resolves the config file location.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
	if let Some(path) = explicit {
		return path.to_path_buf();
	}

	std::env::var_os("XDG_CONFIG_HOME")
		.filter(|dir| !dir.is_empty())
		.map(PathBuf::from)
		.or_else(dirs::config_dir)
		.unwrap_or_else(|| PathBuf::from("."))
		.join(CONFIG_DIR)
		.join(CONFIG_FILE)
}
