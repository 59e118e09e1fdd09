//! Structured output envelope for all CLI commands.
//!
//! ## Output Contract
//!
//! Every command produces a result envelope on stdout:
//!
//! ```json
//! {
//!   "ok": true,
//!   "command": "connect",
//!   "data": { "status": "connected", "address": "G...", "signerId": "freighter", "network": "testnet" }
//! }
//! ```
//!
//! On failure:
//!
//! ```json
//! {
//!   "ok": false,
//!   "command": "connect",
//!   "error": { "code": "SIGNER_REJECTED", "message": "freighter rejected the connection: declined" }
//! }
//! ```
//!
//! `text` output prints the data's [`Display`](std::fmt::Display) form, or
//! `Error [CODE]: message`.


use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use colored::Colorize;
use serde::{Deserialize, Serialize};
use swk::{Network, Session, SessionStatus, SignerId, SignerOption};

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// JSON envelope (default)
	#[default]
	Json,
	/// Human-readable text
	Text,
}

impl fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OutputFormat::Json => write!(f, "json"),
			OutputFormat::Text => write!(f, "text"),
		}
	}
}

/// The result envelope returned by all commands.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T> {
	pub ok: bool,

	/// Command name (e.g., "options", "connect", "status")
	pub command: String,

	/// Command-specific result data (only present on success)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,

	/// Error information (only present on failure)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
}

impl<T> CommandResult<T> {
	pub fn success(command: impl Into<String>, data: T) -> Self {
		Self {
			ok: true,
			command: command.into(),
			data: Some(data),
			error: None,
		}
	}

	pub fn failure(command: impl Into<String>, error: CommandError) -> Self {
		Self {
			ok: false,
			command: command.into(),
			data: None,
			error: Some(error),
		}
	}
}

/// Error information for failed commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
	pub code: ErrorCode,

	/// Human-readable error message
	pub message: String,

	/// Additional error details (signer id, config path, ...)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Standardized error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// No compatible signer is installed
	NoSignerAvailable,
	/// Selected signer was not among the listed options
	UnknownSigner,
	/// User declined at the signer
	SignerRejected,
	/// Signer disappeared or failed mid-flow
	SignerUnavailable,
	/// User dismissed the selection prompt
	Cancelled,
	/// Configuration file could not be read or parsed
	ConfigError,
	/// Malformed command input
	InvalidInput,
	/// File I/O error
	IoError,
	/// Unknown/internal error
	InternalError,
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let code = match self {
			ErrorCode::NoSignerAvailable => "NO_SIGNER_AVAILABLE",
			ErrorCode::UnknownSigner => "UNKNOWN_SIGNER",
			ErrorCode::SignerRejected => "SIGNER_REJECTED",
			ErrorCode::SignerUnavailable => "SIGNER_UNAVAILABLE",
			ErrorCode::Cancelled => "CANCELLED",
			ErrorCode::ConfigError => "CONFIG_ERROR",
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::IoError => "IO_ERROR",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		};
		f.write_str(code)
	}
}

/// Session snapshot as printed by `connect`, `disconnect`, and `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
	pub status: SessionStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub signer_id: Option<SignerId>,
	pub network: Network,
}

impl SessionData {
	pub fn new(session: &Session, network: Network) -> Self {
		Self {
			status: session.status(),
			address: session.address().map(str::to_owned),
			signer_id: session.signer_id().cloned(),
			network,
		}
	}
}

impl fmt::Display for SessionData {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match (&self.address, &self.signer_id) {
			(Some(address), Some(signer)) => write!(f, "{} {address} via {signer} ({})", "connected".green().bold(), self.network),
			_ => write!(f, "{} ({})", self.status.as_str().yellow(), self.network),
		}
	}
}

/// Signers available right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsData {
	pub network: Network,
	pub options: Vec<SignerOption>,
	/// Config file the signers were read from.
	pub config: PathBuf,
}

impl fmt::Display for OptionsData {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.options.is_empty() {
			return write!(f, "no signers available ({})", self.network);
		}
		for (index, option) in self.options.iter().enumerate() {
			if index > 0 {
				writeln!(f)?;
			}
			write!(f, "{}\t{}", option.id.as_str().cyan(), option.display_name)?;
		}
		Ok(())
	}
}

/// Print a command result to stdout in the specified format
pub fn print_result<T: Serialize + fmt::Display>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => print_result_text(result),
	}
}

fn print_result_text<T: fmt::Display>(result: &CommandResult<T>) {
	let mut stdout = io::stdout().lock();

	if let Some(ref data) = result.data {
		let _ = writeln!(stdout, "{data}");
	} else if let Some(ref error) = result.error {
		let _ = writeln!(stdout, "Error [{}]: {}", error.code, error.message);
	}
}

/// Print an error to stderr in human-readable format
pub fn print_error_stderr(error: &CommandError) {
	eprintln!("{} [{}]: {}", "Error".red().bold(), error.code, error.message);
}

/// Print a failed command's envelope to stdout
pub fn print_failure(command: &str, error: CommandError, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			let result: CommandResult<()> = CommandResult::failure(command, error);
			if let Ok(json) = serde_json::to_string(&result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => println!("Error [{}]: {}", error.code, error.message),
	}
}
