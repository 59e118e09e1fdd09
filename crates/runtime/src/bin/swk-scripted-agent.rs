//! Stand-in signer agent speaking the stdio frame protocol.
//!
//! ```text
//! swk-scripted-agent --address <ADDRESS> [--reject <REASON>] [--transcript <PATH>]
//! ```
//!
//! Answers `getAddress` with the configured address (or a rejection) and
//! acknowledges `disconnect` without exiting. With `--transcript`, every
//! request is appended to the file as one JSON line.

use std::path::PathBuf;

use swk_protocol::agent::{AddressResult, AgentError, AgentErrorCode, AgentMethod, AgentRequest, AgentResponse};
use swk_runtime::{Error, PipeTransport, Result};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Default)]
struct AgentArgs {
	address: String,
	reject: Option<String>,
	transcript: Option<PathBuf>,
}

impl AgentArgs {
	fn parse(mut args: impl Iterator<Item = String>) -> std::result::Result<Self, String> {
		let mut parsed = AgentArgs::default();
		while let Some(flag) = args.next() {
			let mut value = || args.next().ok_or_else(|| format!("{flag} needs a value"));
			match flag.as_str() {
				"--address" => parsed.address = value()?,
				"--reject" => parsed.reject = Some(value()?),
				"--transcript" => parsed.transcript = Some(PathBuf::from(value()?)),
				other => return Err(format!("unknown argument `{other}`")),
			}
		}
		if parsed.address.is_empty() {
			return Err("--address is required".into());
		}
		Ok(parsed)
	}

	fn answer(&self, request: &AgentRequest) -> Result<AgentResponse> {
		let mut response = AgentResponse {
			id: request.id,
			result: None,
			error: None,
		};
		match (request.method, &self.reject) {
			(AgentMethod::GetAddress, Some(reason)) => {
				response.error = Some(AgentError {
					code: AgentErrorCode::Rejected,
					message: reason.clone(),
				});
			}
			(AgentMethod::GetAddress, None) => {
				response.result = Some(serde_json::to_value(AddressResult {
					address: self.address.clone(),
				})?);
			}
			(AgentMethod::Disconnect, _) => response.result = Some(serde_json::Value::Null),
		}
		Ok(response)
	}

	async fn record(&self, request: &AgentRequest) -> Result<()> {
		let Some(path) = &self.transcript else {
			return Ok(());
		};
		let mut line = serde_json::to_vec(request)?;
		line.push(b'\n');
		let mut file = tokio::fs::OpenOptions::new().create(true).append(true).open(path).await?;
		file.write_all(&line).await?;
		Ok(())
	}
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	let args = match AgentArgs::parse(std::env::args().skip(1)) {
		Ok(args) => args,
		Err(message) => {
			eprintln!("swk-scripted-agent: {message}");
			std::process::exit(2);
		}
	};

	let (transport, mut inbound) = PipeTransport::new(tokio::io::stdout(), tokio::io::stdin());
	let (mut sender, receiver) = transport.into_parts();
	let reader = tokio::spawn(receiver.run());

	while let Some(frame) = inbound.recv().await {
		let request: AgentRequest = serde_json::from_value(frame)?;
		args.record(&request).await?;
		let response = args.answer(&request)?;
		sender.send(&serde_json::to_value(&response)?).await?;
	}

	reader.await.map_err(|err| Error::Transport(err.to_string()))?
}
