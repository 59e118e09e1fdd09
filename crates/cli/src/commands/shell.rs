//! Interactive loop over a single process-lifetime session.
//!
//! Each line is one command and produces one result envelope. The selection
//! prompt reads from the same input, so `connect` consumes the next line as
//! the choice.

use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use swk::WalletSessionManager;
use tracing::debug;

use super::CommandContext;
use crate::error::{CliError, Result};
use crate::output::SessionData;
use crate::prompt::{LineReader, TerminalPrompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
	Connect,
	Disconnect,
	Status,
	Options,
	Quit,
}

impl ShellCommand {
	fn name(self) -> &'static str {
		match self {
			ShellCommand::Connect => "connect",
			ShellCommand::Disconnect => "disconnect",
			ShellCommand::Status => "status",
			ShellCommand::Options => "options",
			ShellCommand::Quit => "quit",
		}
	}
}

impl FromStr for ShellCommand {
	type Err = CliError;

	fn from_str(line: &str) -> Result<Self> {
		match line.trim().to_lowercase().as_str() {
			"connect" | "c" => Ok(ShellCommand::Connect),
			"disconnect" | "d" => Ok(ShellCommand::Disconnect),
			"status" | "s" => Ok(ShellCommand::Status),
			"options" | "o" | "ls" => Ok(ShellCommand::Options),
			"quit" | "exit" | "q" => Ok(ShellCommand::Quit),
			other => Err(CliError::InvalidInput(format!(
				"unknown command `{other}` (try connect, disconnect, status, options, quit)"
			))),
		}
	}
}

pub async fn execute(ctx: &CommandContext) -> Result<()> {
	let input = LineReader::stdin();
	run(ctx, input).await
}

async fn run(ctx: &CommandContext, input: Arc<LineReader>) -> Result<()> {
	let manager = ctx.manager(TerminalPrompt::new(Arc::clone(&input)));
	let _watch = manager.on_session_change(|session| {
		debug!(target = "swk.cli", status = %session.status(), "session changed");
	});

	loop {
		eprint!("swk> ");
		let _ = std::io::stderr().flush();

		let Some(line) = input.next_line().await? else {
			break;
		};
		if line.trim().is_empty() {
			continue;
		}

		let command = match line.parse::<ShellCommand>() {
			Ok(ShellCommand::Quit) => break,
			Ok(command) => command,
			Err(err) => {
				ctx.emit::<SessionData>("shell", Err(err));
				continue;
			}
		};

		step(ctx, &manager, command).await;
	}

	manager.disconnect().await;
	Ok(())
}

async fn step(ctx: &CommandContext, manager: &WalletSessionManager, command: ShellCommand) {
	match command {
		ShellCommand::Connect => {
			let result = manager.connect().await.map(|session| ctx.session_data(&session));
			ctx.emit(command.name(), result.map_err(CliError::from));
		}
		ShellCommand::Disconnect => {
			manager.disconnect().await;
			ctx.emit(command.name(), Ok(ctx.session_data(&manager.get_session())));
		}
		ShellCommand::Status => {
			ctx.emit(command.name(), Ok(ctx.session_data(&manager.get_session())));
		}
		ShellCommand::Options => {
			let result = manager.options().await.map(|options| ctx.options_data(options));
			ctx.emit(command.name(), result.map_err(CliError::from));
		}
		ShellCommand::Quit => {}
	}
}
