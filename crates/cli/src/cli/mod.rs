
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use swk::{Network, SignerId};

use crate::output::OutputFormat;

/// Root CLI for swk.
#[derive(Parser, Debug)]
#[command(name = "swk")]
#[command(about = "Connect to a wallet signer and hold an authenticated session")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: json (default) or text
	#[arg(short = 'f', long, global = true, value_enum, default_value = "json")]
	pub format: OutputFormat,

	/// Config file (default: $XDG_CONFIG_HOME/swk/config.json)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Network to connect on, overriding the config file
	#[arg(long, global = true, value_name = "NETWORK", value_parser = parse_network)]
	pub network: Option<Network>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// List signers available right now.
	Options,
	/// Connect and print the resulting session.
	Connect(ConnectArgs),
	/// Interactive loop over one session (connect, disconnect, status, options, quit).
	Shell,
}

impl Commands {
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Options => "options",
			Commands::Connect(_) => "connect",
			Commands::Shell => "shell",
		}
	}
}

#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
	/// Select this signer instead of prompting.
	#[arg(long, value_name = "ID")]
	pub signer: Option<SignerId>,

	/// Keep the session until Ctrl-C, then disconnect.
	#[arg(long)]
	pub hold: bool,
}

fn parse_network(value: &str) -> Result<Network, String> {
	value.parse()
}
