//! Signer agent running as a child process.
//!
//! The agent is launched on first use, not when listed, and the process is
//! kept for the lifetime of the host: a logical disconnect sends
//! `disconnect` but leaves the child running. If the agent exits, the next
//! request relaunches it.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use swk_protocol::agent::{AddressResult, AgentMethod, AgentParams};
use swk_protocol::{Network, SignerId};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::connection::AgentConnection;
use crate::error::{Error, Result};
use crate::module::SignerModule;

struct AgentProcess {
	// Held so the child is killed when the signer is dropped.
	child: Child,
	connection: Arc<AgentConnection>,
}

/// Out-of-process signer spoken to over length-prefixed JSON on stdio.
pub struct ProcessSigner {
	id: SignerId,
	display_name: String,
	command: String,
	args: Vec<String>,
	agent: Mutex<Option<AgentProcess>>,
}

impl ProcessSigner {
	pub fn new(id: impl Into<SignerId>, display_name: impl Into<String>, command: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			display_name: display_name.into(),
			command: command.into(),
			args: Vec::new(),
			agent: Mutex::new(None),
		}
	}

	pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.args = args.into_iter().map(Into::into).collect();
		self
	}

	pub fn command(&self) -> &str {
		&self.command
	}

	/// Path the command resolves to, if it is installed.
	pub fn resolve(&self) -> Option<PathBuf> {
		resolve_command(&self.command)
	}

	/// Process id of the running agent, if one is up and its pipe is open.
	pub async fn pid(&self) -> Option<u32> {
		let agent = self.agent.lock().await;
		agent.as_ref().filter(|process| !process.connection.is_closed()).and_then(|process| process.child.id())
	}

	async fn connection(&self) -> Result<Arc<AgentConnection>> {
		let mut agent = self.agent.lock().await;
		if let Some(process) = agent.as_ref() {
			if !process.connection.is_closed() {
				return Ok(Arc::clone(&process.connection));
			}
			debug!(target = "swk.runtime", signer = %self.id, "agent exited; relaunching");
		}

		let process = self.spawn()?;
		let connection = Arc::clone(&process.connection);
		*agent = Some(process);
		Ok(connection)
	}

	fn spawn(&self) -> Result<AgentProcess> {
		let program = self.resolve().ok_or_else(|| Error::Unavailable {
			signer: self.id.clone(),
			reason: format!("`{}` is not installed", self.command),
		})?;

		let mut child = Command::new(&program)
			.args(&self.args)
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::inherit())
			.kill_on_drop(true)
			.spawn()
			.map_err(|source| Error::Spawn {
				command: self.command.clone(),
				source,
			})?;

		let stdin = child.stdin.take().ok_or_else(|| Error::Transport("agent stdin unavailable".into()))?;
		let stdout = child.stdout.take().ok_or_else(|| Error::Transport("agent stdout unavailable".into()))?;

		info!(target = "swk.runtime", signer = %self.id, program = %program.display(), pid = child.id(), "signer agent started");
		Ok(AgentProcess {
			child,
			connection: AgentConnection::start(stdin, stdout),
		})
	}

	async fn call(&self, method: AgentMethod, network: Network) -> Result<serde_json::Value> {
		let connection = self.connection().await.map_err(|err| err.attribute_to(&self.id))?;
		connection
			.request(method, AgentParams::for_network(network))
			.await
			.map_err(|err| err.attribute_to(&self.id))
	}
}

#[async_trait]
impl SignerModule for ProcessSigner {
	fn id(&self) -> &SignerId {
		&self.id
	}

	fn display_name(&self) -> &str {
		&self.display_name
	}

	async fn is_available(&self) -> bool {
		self.resolve().is_some()
	}

	async fn get_address(&self, network: Network) -> Result<String> {
		let value = self.call(AgentMethod::GetAddress, network).await?;
		let result: AddressResult =
			serde_json::from_value(value).map_err(|err| Error::Protocol(format!("invalid getAddress result from {}: {err}", self.id)))?;
		Ok(result.address)
	}

	async fn disconnect(&self, network: Network) -> Result<()> {
		let connection = {
			let agent = self.agent.lock().await;
			match agent.as_ref() {
				Some(process) if !process.connection.is_closed() => Arc::clone(&process.connection),
				_ => return Ok(()),
			}
		};

		connection
			.request(AgentMethod::Disconnect, AgentParams::for_network(network))
			.await
			.map(|_| ())
			.map_err(|err| err.attribute_to(&self.id))
	}
}

impl std::fmt::Debug for ProcessSigner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProcessSigner")
			.field("id", &self.id)
			.field("command", &self.command)
			.field("args", &self.args)
			.finish()
	}
}

/// Resolves `command` to an executable path.
///
/// Commands containing a path separator are taken as paths and must exist;
/// bare names are looked up on `PATH`.
pub fn resolve_command(command: &str) -> Option<PathBuf> {
	if command.is_empty() {
		return None;
	}

	let path = Path::new(command);
	if path.components().count() > 1 {
		return path.is_file().then(|| path.to_path_buf());
	}

	which::which(command).ok()
}
