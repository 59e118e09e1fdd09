//! Signer identity types.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a signer agent family (e.g. `"freighter"`, `"albedo"`).
///
/// Ids are compared exactly; they are chosen by whoever registers the signer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignerId(String);

impl SignerId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for SignerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for SignerId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl From<String> for SignerId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl Borrow<str> for SignerId {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl PartialEq<str> for SignerId {
	fn eq(&self, other: &str) -> bool {
		self.0 == other
	}
}

impl PartialEq<&str> for SignerId {
	fn eq(&self, other: &&str) -> bool {
		self.0 == *other
	}
}

/// A signer the user may pick, as offered to a selection prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerOption {
	/// Identifier passed back when this option is selected.
	pub id: SignerId,
	/// Human-readable name shown in the chooser.
	pub display_name: String,
}

impl SignerOption {
	pub fn new(id: impl Into<SignerId>, display_name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			display_name: display_name.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn signer_option_uses_camel_case_display_name() {
		let option = SignerOption::new("freighter", "Freighter");
		let json = serde_json::to_value(&option).unwrap();
		assert_eq!(json, serde_json::json!({ "id": "freighter", "displayName": "Freighter" }));
	}

	#[test]
	fn signer_id_compares_against_str() {
		let id = SignerId::from("xbull");
		assert_eq!(id, "xbull");
		assert_ne!(id, "lobstr");
	}
}
