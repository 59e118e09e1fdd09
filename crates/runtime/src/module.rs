//! The capability set every concrete signer family provides.

use async_trait::async_trait;
use swk_protocol::{Network, SignerId, SignerOption};

use crate::error::Result;

/// One concrete signer family (a wallet extension, an agent process, ...).
///
/// Implementations report failures as [`Error::Rejected`] when the user
/// declined and [`Error::Unavailable`] when the signer cannot be reached.
///
/// [`Error::Rejected`]: crate::Error::Rejected
/// [`Error::Unavailable`]: crate::Error::Unavailable
#[async_trait]
pub trait SignerModule: Send + Sync {
	/// Stable identifier used for selection.
	fn id(&self) -> &SignerId;

	/// Name shown to the user.
	fn display_name(&self) -> &str;

	/// Whether the signer is installed and reachable in this environment.
	///
	/// Must not prompt the user or otherwise change signer state.
	async fn is_available(&self) -> bool;

	/// Asks the signer for its current public identity on `network`.
	async fn get_address(&self, network: Network) -> Result<String>;

	/// Notifies the signer that the host session on `network` ended.
	async fn disconnect(&self, network: Network) -> Result<()>;

	/// Option offered to a selection prompt for this signer.
	fn option(&self) -> SignerOption {
		SignerOption::new(self.id().clone(), self.display_name())
	}
}
