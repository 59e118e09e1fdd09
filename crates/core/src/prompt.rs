//! Interactive signer chooser implemented by the UI layer.

use async_trait::async_trait;
use swk_protocol::{SignerId, SignerOption};

/// Outcome of a selection prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
	Selected(SignerId),
	Cancelled,
}

impl Selection {
	pub fn selected(id: impl Into<SignerId>) -> Self {
		Selection::Selected(id.into())
	}
}

/// Resolves a non-empty list of options to one choice or a cancellation.
///
/// Each call resolves exactly once. The manager opens at most one prompt at a
/// time.
#[async_trait]
pub trait SelectionPrompt: Send + Sync {
	async fn select(&self, options: &[SignerOption]) -> Selection;
}

/// Prompt that always answers with the same selection.
#[derive(Debug, Clone)]
pub struct FixedPrompt {
	selection: Selection,
}

impl FixedPrompt {
	pub fn new(selection: Selection) -> Self {
		Self { selection }
	}

	/// Selects `id` without asking.
	pub fn choose(id: impl Into<SignerId>) -> Self {
		Self::new(Selection::selected(id))
	}

	pub fn cancel() -> Self {
		Self::new(Selection::Cancelled)
	}
}

#[async_trait]
impl SelectionPrompt for FixedPrompt {
	async fn select(&self, _options: &[SignerOption]) -> Selection {
		self.selection.clone()
	}
}

/// Prompt that picks the first listed option.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOption;

#[async_trait]
impl SelectionPrompt for FirstOption {
	async fn select(&self, options: &[SignerOption]) -> Selection {
		options
			.first()
			.map_or(Selection::Cancelled, |option| Selection::Selected(option.id.clone()))
	}
}
