use swk::{FixedPrompt, WalletSessionManager};
use tracing::info;

use super::CommandContext;
use crate::cli::ConnectArgs;
use crate::error::Result;
use crate::output::{CommandResult, print_result};
use crate::prompt::{LineReader, TerminalPrompt};

pub async fn execute(ctx: &CommandContext, args: ConnectArgs) -> Result<()> {
	let manager = match args.signer {
		Some(id) => ctx.manager(FixedPrompt::choose(id)),
		None => ctx.manager(TerminalPrompt::new(LineReader::stdin())),
	};

	let session = manager.connect().await?;
	print_result(&CommandResult::success("connect", ctx.session_data(&session)), ctx.format);

	if args.hold {
		hold(ctx, &manager).await?;
	}
	Ok(())
}

async fn hold(ctx: &CommandContext, manager: &WalletSessionManager) -> Result<()> {
	info!(target = "swk.cli", "holding session; press Ctrl-C to disconnect");
	tokio::signal::ctrl_c().await?;

	manager.disconnect().await;
	print_result(
		&CommandResult::success("disconnect", ctx.session_data(&manager.get_session())),
		ctx.format,
	);
	Ok(())
}
