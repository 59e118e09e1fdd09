//! Terminal signer chooser.
//!
//! Options are listed on stderr so stdout stays a clean result stream. The
//! answer is read as one line: a 1-based index or a signer id. An empty
//! line, `q`, or end of input cancels.

use std::io::Write;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use swk::{Selection, SelectionPrompt, SignerId, SignerOption};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::Mutex;

type BoxedLines = Lines<Pin<Box<dyn AsyncBufRead + Send>>>;

/// Line source shared by the shell loop and the prompt.
pub struct LineReader {
	lines: Mutex<BoxedLines>,
}

impl LineReader {
	pub fn stdin() -> Arc<Self> {
		Self::from_reader(BufReader::new(tokio::io::stdin()))
	}

	pub fn from_reader(reader: impl AsyncBufRead + Send + 'static) -> Arc<Self> {
		let reader: Pin<Box<dyn AsyncBufRead + Send>> = Box::pin(reader);
		Arc::new(Self {
			lines: Mutex::new(reader.lines()),
		})
	}

	/// Next line, or `None` at end of input.
	pub async fn next_line(&self) -> std::io::Result<Option<String>> {
		self.lines.lock().await.next_line().await
	}
}

pub struct TerminalPrompt {
	input: Arc<LineReader>,
}

impl TerminalPrompt {
	pub fn new(input: Arc<LineReader>) -> Self {
		Self { input }
	}
}

#[async_trait]
impl SelectionPrompt for TerminalPrompt {
	async fn select(&self, options: &[SignerOption]) -> Selection {
		{
			let mut stderr = std::io::stderr().lock();
			let _ = writeln!(stderr, "Select a signer:");
			for (index, option) in options.iter().enumerate() {
				let _ = writeln!(stderr, "  {}) {} [{}]", index + 1, option.display_name, option.id);
			}
			let _ = write!(stderr, "> ");
			let _ = stderr.flush();
		}

		match self.input.next_line().await {
			Ok(Some(line)) => parse_choice(&line, options),
			Ok(None) => Selection::Cancelled,
			Err(err) => {
				tracing::warn!(target = "swk.cli", error = %err, "failed to read selection");
				Selection::Cancelled
			}
		}
	}
}

/// Interprets one line of prompt input.
pub fn parse_choice(line: &str, options: &[SignerOption]) -> Selection {
	let choice = line.trim();
	if choice.is_empty() || matches!(choice, "q" | "quit" | "cancel") {
		return Selection::Cancelled;
	}

	if let Ok(index) = choice.parse::<usize>() {
		if let Some(option) = index.checked_sub(1).and_then(|index| options.get(index)) {
			return Selection::Selected(option.id.clone());
		}
	}

	Selection::Selected(SignerId::from(choice))
}
