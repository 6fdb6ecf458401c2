//! Tagwatch - container registry push webhook relay
//!
//! Main entry point: loads configuration, sets up logging, and runs the
//! selected command.

use anyhow::Result;
use std::path::Path;

use tagwatch::cli::{Cli, Commands};
use tagwatch::config::Config;
use tagwatch::logging::init_logging;
use tagwatch::metrics::init_metrics_exporter;
use tagwatch::server;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let config = Config::load(&cli.config, &cli)?;

    init_logging(&config.logging)?;

    if !Path::new(&cli.config).exists() {
        tracing::warn!(
            "Config file not found at {}, using environment and defaults",
            cli.config
        );
    }

    match cli.command() {
        Commands::Serve => {
            init_metrics_exporter();
            server::run(config).await?;
        }
        Commands::CheckConfig => {
            config.validate()?;
            tracing::info!("Configuration is valid");
            println!("{}", config.summary());
        }
    }

    Ok(())
}
