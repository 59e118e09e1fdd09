use std::path::PathBuf;

use swk::SessionError;
use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Session(#[from] SessionError),

	#[error("invalid config {}: {message}", path.display())]
	Config { path: PathBuf, message: String },

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl CliError {
	/// Expected outcomes that still exit successfully.
	pub fn is_benign(&self) -> bool {
		matches!(self, CliError::Session(err) if err.is_benign())
	}

	/// Convert this error to a CommandError for structured output
	pub fn to_command_error(&self) -> CommandError {
		let (code, details) = match self {
			CliError::Session(err) => (ErrorCode::from(err), session_details(err)),
			CliError::Config { path, .. } => (ErrorCode::ConfigError, Some(serde_json::json!({ "path": path }))),
			CliError::InvalidInput(_) => (ErrorCode::InvalidInput, None),
			CliError::Io(_) => (ErrorCode::IoError, None),
			CliError::Json(_) => (ErrorCode::InternalError, None),
		};

		CommandError {
			code,
			message: self.to_string(),
			details,
		}
	}
}

fn session_details(err: &SessionError) -> Option<serde_json::Value> {
	match err {
		SessionError::UnknownSigner { id } => Some(serde_json::json!({ "signer": id })),
		SessionError::SignerRejected { signer, .. } => Some(serde_json::json!({ "signer": signer })),
		SessionError::SignerUnavailable { signer: Some(signer), .. } => Some(serde_json::json!({ "signer": signer, "retryable": true })),
		SessionError::SignerUnavailable { signer: None, .. } => Some(serde_json::json!({ "retryable": true })),
		SessionError::NoSignerAvailable | SessionError::Cancelled => None,
	}
}

impl From<&SessionError> for ErrorCode {
	fn from(err: &SessionError) -> Self {
		match err {
			SessionError::NoSignerAvailable => ErrorCode::NoSignerAvailable,
			SessionError::UnknownSigner { .. } => ErrorCode::UnknownSigner,
			SessionError::SignerRejected { .. } => ErrorCode::SignerRejected,
			SessionError::SignerUnavailable { .. } => ErrorCode::SignerUnavailable,
			SessionError::Cancelled => ErrorCode::Cancelled,
		}
	}
}
