//! Session-level failure taxonomy.
//!
//! Raw adapter errors never reach `connect()` callers; they are normalized
//! into [`SessionError`] at the manager boundary.

use swk_protocol::SignerId;
use swk_runtime::Error as RuntimeError;
use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Typed outcome of a failed `connect()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
	/// No compatible signer is installed.
	#[error("no signer available")]
	NoSignerAvailable,

	/// The prompt kept returning ids that were not among the listed options.
	#[error("unknown signer: {id}")]
	UnknownSigner { id: SignerId },

	/// The user declined at the signer's own UI.
	#[error("{signer} rejected the connection: {reason}")]
	SignerRejected { signer: SignerId, reason: String },

	/// The signer disappeared or failed between listing and use.
	#[error("{} is unavailable: {reason}", signer.as_ref().map_or("signer", |id| id.as_str()))]
	SignerUnavailable { signer: Option<SignerId>, reason: String },

	/// The user dismissed the selection prompt.
	#[error("connection cancelled")]
	Cancelled,
}

impl SessionError {
	/// Expected user outcomes that callers usually ignore silently.
	pub fn is_benign(&self) -> bool {
		matches!(self, SessionError::SignerRejected { .. } | SessionError::Cancelled)
	}

	/// Failures worth offering a retry for.
	pub fn is_retryable(&self) -> bool {
		matches!(self, SessionError::SignerUnavailable { .. } | SessionError::UnknownSigner { .. })
	}

	/// Stable machine-readable name.
	pub fn code(&self) -> &'static str {
		match self {
			SessionError::NoSignerAvailable => "NO_SIGNER_AVAILABLE",
			SessionError::UnknownSigner { .. } => "UNKNOWN_SIGNER",
			SessionError::SignerRejected { .. } => "SIGNER_REJECTED",
			SessionError::SignerUnavailable { .. } => "SIGNER_UNAVAILABLE",
			SessionError::Cancelled => "CANCELLED",
		}
	}

	/// Normalizes a runtime error raised while talking to `signer`.
	pub(crate) fn from_signer(err: RuntimeError, signer: &SignerId) -> Self {
		match Self::from(err.attribute_to(signer)) {
			SessionError::SignerUnavailable { signer: None, reason } => SessionError::SignerUnavailable {
				signer: Some(signer.clone()),
				reason,
			},
			other => other,
		}
	}
}

impl From<RuntimeError> for SessionError {
	fn from(err: RuntimeError) -> Self {
		match err {
			RuntimeError::UnknownSigner(id) => SessionError::UnknownSigner { id },
			RuntimeError::Rejected { signer, reason } => SessionError::SignerRejected { signer, reason },
			RuntimeError::Unavailable { signer, reason } => SessionError::SignerUnavailable {
				signer: Some(signer),
				reason,
			},
			other => SessionError::SignerUnavailable {
				signer: None,
				reason: other.to_string(),
			},
		}
	}
}
