//! Ledger network selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Network passphrase for the Stellar test network.
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Network passphrase for the Stellar public network.
pub const MAINNET_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// Network a signer kit is initialized against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
	#[default]
	Testnet,
	Mainnet,
}

impl Network {
	/// Passphrase signers use to scope signatures to this network.
	pub fn passphrase(self) -> &'static str {
		match self {
			Network::Testnet => TESTNET_PASSPHRASE,
			Network::Mainnet => MAINNET_PASSPHRASE,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Network::Testnet => "testnet",
			Network::Mainnet => "mainnet",
		}
	}
}

impl fmt::Display for Network {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Network {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"testnet" => Ok(Network::Testnet),
			"mainnet" | "public" => Ok(Network::Mainnet),
			_ => Err(format!("unknown network: {s}")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_public_as_mainnet() {
		assert_eq!("public".parse::<Network>(), Ok(Network::Mainnet));
		assert_eq!("TESTNET".parse::<Network>(), Ok(Network::Testnet));
		assert!("devnet".parse::<Network>().is_err());
	}

	#[test]
	fn passphrases_differ_per_network() {
		assert_ne!(Network::Testnet.passphrase(), Network::Mainnet.passphrase());
		assert_eq!(serde_json::to_string(&Network::Mainnet).unwrap(), r#""mainnet""#);
	}
}
