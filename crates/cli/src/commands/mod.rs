mod connect;
mod options;
mod shell;

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use swk::{Network, SelectionPrompt, Session, SignerAgentAdapter, SignerOption, WalletSessionManager};
use swk_runtime::BackendsLoader;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::config::{CliConfig, config_path};
use crate::error::Result;
use crate::output::{CommandResult, OptionsData, OutputFormat, SessionData, print_failure, print_result};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let ctx = CommandContext::load(&cli)?;

	match cli.command {
		Commands::Options => options::execute(&ctx).await,
		Commands::Connect(args) => connect::execute(&ctx, args).await,
		Commands::Shell => shell::execute(&ctx).await,
	}
}

/// Settings resolved once per invocation from flags and the config file.
#[derive(Debug)]
pub struct CommandContext {
	pub format: OutputFormat,
	pub network: Network,
	pub config: CliConfig,
	pub config_path: PathBuf,
}

impl CommandContext {
	pub fn load(cli: &Cli) -> Result<Self> {
		let config_path = config_path(cli.config.as_deref());
		let config = CliConfig::load(&config_path)?;
		let network = config.network(cli.network);
		debug!(
			target = "swk.cli",
			path = %config_path.display(),
			%network,
			signers = config.signers.len(),
			"configuration loaded"
		);

		Ok(Self {
			format: cli.format,
			network,
			config,
			config_path,
		})
	}

	/// Builds the one session manager this invocation uses.
	pub fn manager(&self, prompt: impl SelectionPrompt + 'static) -> WalletSessionManager {
		let session = self.config.session_config(self.network);
		let adapter = SignerAgentAdapter::new(BackendsLoader::new(self.config.backends()), session.kit_config());
		WalletSessionManager::new(adapter, prompt, session)
	}

	pub fn session_data(&self, session: &Session) -> SessionData {
		SessionData::new(session, self.network)
	}

	pub fn options_data(&self, options: Vec<SignerOption>) -> OptionsData {
		OptionsData {
			network: self.network,
			options,
			config: self.config_path.clone(),
		}
	}

	/// Prints `result` as the outcome of `command`.
	pub fn emit<T: Serialize + fmt::Display>(&self, command: &str, result: Result<T>) {
		match result {
			Ok(data) => print_result(&CommandResult::success(command, data), self.format),
			Err(err) => print_failure(command, err.to_command_error(), self.format),
		}
	}
}
