use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

pub fn init_logging(verbosity: u8) {
	// 0 = warnings from the session layer only, runtime chatter off
	// 1 (-v) = info for swk, warn for the runtime
	// 2+ (-vv) = debug for everything
	let filter = match verbosity {
		0 => "error,swk=warn,swk_runtime=off",
		1 => "warn,swk=info,swk_cli=info,swk_runtime=warn",
		_ => "debug",
	};

	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	let _ = tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(verbosity > 1)
		.with_level(true)
		.compact()
		.try_init();
}
