//! Frames exchanged with an out-of-process signer agent.
//!
//! The agent runs as a child process; frames travel over its stdio as
//! length-prefixed JSON. The exchange is strictly request/response:
//!
//! 1. Host sends [`AgentRequest`] with a fresh `id` and an [`AgentMethod`]
//! 2. Agent answers with an [`AgentResponse`] echoing the `id`, carrying
//!    either a `result` or an [`AgentError`]
//!
//! Responses may arrive in any order; the `id` is the only correlation key.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::network::Network;

/// Operation requested from the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AgentMethod {
	/// Ask the agent for its current public identity.
	GetAddress,
	/// Tell the agent the host session ended.
	Disconnect,
}

/// Request frame sent from host to agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
	/// Correlation id, unique per connection.
	pub id: u32,
	pub method: AgentMethod,
	pub params: AgentParams,
}

/// Parameters attached to every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentParams {
	pub network: Network,
	/// Network passphrase, so agents need not hardcode the mapping.
	pub network_passphrase: String,
}

impl AgentParams {
	pub fn for_network(network: Network) -> Self {
		Self {
			network,
			network_passphrase: network.passphrase().to_string(),
		}
	}
}

/// Response frame sent from agent to host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
	/// Id of the request this answers.
	pub id: u32,
	/// Success payload (mutually exclusive with `error`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	/// Failure payload (mutually exclusive with `result`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<AgentError>,
}

/// Failure reported by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentError {
	pub code: AgentErrorCode,
	pub message: String,
}

/// Failure class reported by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentErrorCode {
	/// The user declined in the agent's own UI.
	Rejected,
	/// The agent cannot serve requests (locked, no account, shutting down).
	Unavailable,
	/// Anything else.
	#[serde(other)]
	Internal,
}

/// `result` payload of a [`AgentMethod::GetAddress`] response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressResult {
	pub address: String,
}
