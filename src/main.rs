//! `mia-relay` binary: load configuration from the environment (and `.env`) and serve the relay.

// std
use std::path::Path;
// crates.io
use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
// self
use mia_relay::{
	config::{self, RelayConfig},
	server,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let env_loaded = config::load_env_file(Path::new(config::ENV_FILE))?;

	init_tracing();

	if env_loaded {
		tracing::debug!(path = config::ENV_FILE, "Loaded env file.");
	}

	let config = RelayConfig::parse();

	tracing::debug!(?config, "Configuration loaded.");

	server::serve(&config).await?;

	Ok(())
}

fn init_tracing() {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new("mia_relay=info,tower_http=info"));

	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_target(false).compact())
		.init();
}
