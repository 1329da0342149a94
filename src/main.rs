use clap::Parser;
use daycare_ml::config::CliArgs;
use daycare_ml::server::{EngineServer, ServerConfig};
use daycare_ml::transport::NdjsonTransport;

fn main() {
	let args = CliArgs::parse();

	// stdout carries the protocol, so logs go to stderr
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
		)
		.init();

	let grouping = args.grouping_config();
	if let Err(e) = grouping.validate() {
		tracing::error!("Invalid grouping configuration: {}", e);
		std::process::exit(2);
	}

	let config = ServerConfig {
		grouping,
		grouping_model_path: args.grouping_model,
		feedback_model_path: args.feedback_model,
	};
	let mut server = EngineServer::new(NdjsonTransport::new(), config);

	tracing::info!("daycare-ml-engine ready");

	if let Err(e) = server.run() {
		tracing::error!("Server error: {}", e);
		std::process::exit(1);
	}
}
