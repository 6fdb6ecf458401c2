//! Command-line interface definition for Tagwatch
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand};

/// Tagwatch - registry push webhook to Gotify relay
///
/// Receives push callbacks from a container registry and forwards pushes of
/// watched images to a Gotify server.
#[derive(Parser, Debug, Clone)]
#[command(name = "tagwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to an optional YAML configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "TAGWATCH_CONFIG",
        default_value = "config/tagwatch.yaml"
    )]
    pub config: String,

    /// Address to listen on (overrides config and TAGWATCH_LISTEN_ADDR)
    #[arg(short, long, global = true)]
    pub listen: Option<String>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Command to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for Tagwatch
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the webhook relay server
    Serve,

    /// Validate configuration and print a summary without starting the server
    CheckConfig,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The selected command, `serve` when none was given.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
