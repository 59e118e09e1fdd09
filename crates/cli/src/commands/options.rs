use swk::FixedPrompt;

use super::CommandContext;
use crate::error::Result;
use crate::output::{CommandResult, print_result};

pub async fn execute(ctx: &CommandContext) -> Result<()> {
	let manager = ctx.manager(FixedPrompt::cancel());
	let data = ctx.options_data(manager.options().await?);
	print_result(&CommandResult::success("options", data), ctx.format);
	Ok(())
}
