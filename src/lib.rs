//! Tagwatch - container registry push webhook relay
//!
//! This library receives push callbacks from a container registry, filters
//! them against a configured watch-list, and forwards matching pushes to a
//! Gotify server as notifications.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `webhook`: Push event parsing, watch-list filtering, and the request pipeline
//! - `gotify`: Notification payload and the Gotify HTTP client
//! - `server`: axum router for `/docker-webhook` and `/health`
//! - `config`: Configuration loading and validation
//! - `logging`: tracing subscriber setup
//! - `metrics`: Outcome counters and delivery timings
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use clap::Parser;
//! use tagwatch::{cli::Cli, server, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cli = Cli::parse_from(["tagwatch"]);
//!     let config = Config::load("config/tagwatch.yaml", &cli)?;
//!     server::run(config).await
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod gotify;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod webhook;

// Re-export commonly used types
pub use config::Config;
pub use error::{RelayError, Result};
pub use gotify::{GotifyClient, Notification, NotificationSender};
pub use webhook::{PushEvent, WatchFilter, WatchList, WebhookHandler, WebhookOutcome};
