//! Error types for the signer runtime.

use swk_protocol::SignerId;
use swk_protocol::agent::AgentErrorCode;
use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Raw failures from signer backends, the kit, and agent transport.
#[derive(Debug, Error)]
pub enum Error {
	/// Selection referenced an id that was not among the last listed options.
	#[error("unknown signer: {0}")]
	UnknownSigner(SignerId),

	/// An operation needed a bound signer but none was selected.
	#[error("no signer selected")]
	NotBound,

	/// The user declined at the signer's own UI.
	#[error("{signer} rejected the request: {reason}")]
	Rejected { signer: SignerId, reason: String },

	/// The signer cannot serve requests right now.
	#[error("{signer} is unavailable: {reason}")]
	Unavailable { signer: SignerId, reason: String },

	/// The signer kit could not be constructed.
	#[error("failed to load signer kit: {0}")]
	LoadFailed(String),

	/// Launching an out-of-process agent failed.
	#[error("failed to spawn signer agent `{command}`: {source}")]
	Spawn {
		command: String,
		#[source]
		source: std::io::Error,
	},

	/// Error reported by a remote agent, not yet attributed to a signer.
	#[error("agent error ({code:?}): {message}")]
	Remote { code: AgentErrorCode, message: String },

	/// Frame-level failure on the agent pipe.
	#[error("transport error: {0}")]
	Transport(String),

	/// Malformed or unexpected agent message.
	#[error("protocol error: {0}")]
	Protocol(String),

	/// The agent pipe closed while a request was pending.
	#[error("signer channel closed unexpectedly")]
	ChannelClosed,

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Signer the error is attributed to, when known.
	pub fn signer(&self) -> Option<&SignerId> {
		match self {
			Error::UnknownSigner(signer) | Error::Rejected { signer, .. } | Error::Unavailable { signer, .. } => Some(signer),
			_ => None,
		}
	}

	/// Attributes a transport-level or remote failure to `signer`.
	///
	/// Remote `rejected`/`unavailable` codes become [`Error::Rejected`] and
	/// [`Error::Unavailable`]; a lost pipe or spawn failure means the agent is
	/// gone and becomes [`Error::Unavailable`]. Other errors pass through.
	pub fn attribute_to(self, signer: &SignerId) -> Self {
		match self {
			Error::Remote {
				code: AgentErrorCode::Rejected,
				message,
			} => Error::Rejected {
				signer: signer.clone(),
				reason: message,
			},
			Error::Remote {
				code: AgentErrorCode::Unavailable,
				message,
			} => Error::Unavailable {
				signer: signer.clone(),
				reason: message,
			},
			err @ (Error::ChannelClosed | Error::Spawn { .. } | Error::Transport(_)) => Error::Unavailable {
				signer: signer.clone(),
				reason: err.to_string(),
			},
			other => other,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn remote_codes_are_attributed_to_signer() {
		let signer = SignerId::from("agent");
		let err = Error::Remote {
			code: AgentErrorCode::Rejected,
			message: "declined".into(),
		}
		.attribute_to(&signer);
		assert!(matches!(&err, Error::Rejected { reason, .. } if reason == "declined"));
		assert_eq!(err.signer(), Some(&signer));

		let err = Error::ChannelClosed.attribute_to(&signer);
		assert!(matches!(err, Error::Unavailable { .. }));
	}

	#[test]
	fn internal_remote_errors_stay_raw() {
		let err = Error::Remote {
			code: AgentErrorCode::Internal,
			message: "boom".into(),
		}
		.attribute_to(&SignerId::from("agent"));
		assert!(matches!(err, Error::Remote { .. }));
		assert!(err.signer().is_none());
	}
}
