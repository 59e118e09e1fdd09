//! The authenticated-session record.
//!
//! A [`Session`] is either fully connected (address and signer both present)
//! or carries neither. The fields are private so the only way to build a
//! connected session is [`Session::connected`]; deserialization re-checks the
//! same rule and rejects half-populated payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signer::SignerId;

/// Lifecycle status of the wallet session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
	#[default]
	Disconnected,
	Connecting,
	Connected,
	Disconnecting,
}

impl SessionStatus {
	/// Returns true for the states a transition settles in.
	pub fn is_terminal(self) -> bool {
		matches!(self, SessionStatus::Connected | SessionStatus::Disconnected)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			SessionStatus::Disconnected => "disconnected",
			SessionStatus::Connecting => "connecting",
			SessionStatus::Connected => "connected",
			SessionStatus::Disconnecting => "disconnecting",
		}
	}
}

impl fmt::Display for SessionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Snapshot of who, if anyone, is authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawSession")]
pub struct Session {
	address: Option<String>,
	signer_id: Option<SignerId>,
	status: SessionStatus,
}

impl Session {
	/// The empty session every process starts with.
	pub const fn disconnected() -> Self {
		Self::without_identity(SessionStatus::Disconnected)
	}

	pub const fn connecting() -> Self {
		Self::without_identity(SessionStatus::Connecting)
	}

	pub const fn disconnecting() -> Self {
		Self::without_identity(SessionStatus::Disconnecting)
	}

	/// A connected session bound to `address` through `signer_id`.
	pub fn connected(address: impl Into<String>, signer_id: impl Into<SignerId>) -> Self {
		Self {
			address: Some(address.into()),
			signer_id: Some(signer_id.into()),
			status: SessionStatus::Connected,
		}
	}

	const fn without_identity(status: SessionStatus) -> Self {
		Self {
			address: None,
			signer_id: None,
			status,
		}
	}

	pub fn address(&self) -> Option<&str> {
		self.address.as_deref()
	}

	pub fn signer_id(&self) -> Option<&SignerId> {
		self.signer_id.as_ref()
	}

	pub fn status(&self) -> SessionStatus {
		self.status
	}

	pub fn is_connected(&self) -> bool {
		self.status == SessionStatus::Connected
	}
}

impl Default for Session {
	fn default() -> Self {
		Self::disconnected()
	}
}

/// Rejected session payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSession {
	#[error("connected session is missing its {0}")]
	MissingIdentity(&'static str),

	#[error("{status} session must not carry an address or signer")]
	UnexpectedIdentity { status: SessionStatus },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSession {
	#[serde(default)]
	address: Option<String>,
	#[serde(default)]
	signer_id: Option<SignerId>,
	status: SessionStatus,
}

impl TryFrom<RawSession> for Session {
	type Error = InvalidSession;

	fn try_from(raw: RawSession) -> Result<Self, Self::Error> {
		match (raw.status, raw.address, raw.signer_id) {
			(SessionStatus::Connected, Some(address), Some(signer_id)) => Ok(Session::connected(address, signer_id)),
			(SessionStatus::Connected, None, _) => Err(InvalidSession::MissingIdentity("address")),
			(SessionStatus::Connected, _, None) => Err(InvalidSession::MissingIdentity("signer id")),
			(status, None, None) => Ok(Session::without_identity(status)),
			(status, _, _) => Err(InvalidSession::UnexpectedIdentity { status }),
		}
	}
}
