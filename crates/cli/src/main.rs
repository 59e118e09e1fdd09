use clap::Parser;
use swk_cli::cli::Cli;
use swk_cli::error::CliError;
use swk_cli::output::{self, OutputFormat};
use swk_cli::{commands, logging};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let format = cli.format;
	let command = cli.command.name();

	if let Err(err) = commands::dispatch(cli).await {
		let benign = err.is_benign();
		handle_error(command, err, format);
		if !benign {
			std::process::exit(1);
		}
	}
}

fn handle_error(command: &str, err: CliError, format: OutputFormat) {
	let cmd_error = err.to_command_error();

	// Humans reading text output already get the message on stdout
	if format != OutputFormat::Text && !err.is_benign() {
		output::print_error_stderr(&cmd_error);
	}

	output::print_failure(command, cmd_error, format);
}
