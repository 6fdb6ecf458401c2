//! Structured logging setup
//!
//! Every webhook request runs inside a `webhook` span carrying a
//! `request_id`; both output formats render that span so log lines from one
//! request can be correlated. Output goes to STDOUT and optionally to an
//! append-only file.

use crate::config::LoggingConfig;
use anyhow::Result;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initialize logging based on configuration.
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Arguments
///
/// * `config` - Logging configuration
///
/// # Returns
///
/// Returns success or error if the filter is invalid, the log file cannot
/// be opened, or a global subscriber is already installed
///
/// # Examples
///
/// ```no_run
/// use tagwatch::config::LoggingConfig;
/// use tagwatch::logging::init_logging;
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     json_format: true,
///     file_path: None,
/// };
///
/// init_logging(&config).unwrap();
/// ```
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let mut layers = vec![output_layer(config.json_format, true, std::io::stdout)];

    if let Some(file_path) = &config.file_path {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        layers.push(output_layer(config.json_format, false, Arc::new(file)));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

/// Build one formatting layer. JSON output flattens the enclosing `webhook`
/// span into `span`, so `request_id` sits next to each event.
fn output_layer<W>(json: bool, ansi: bool, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(ansi)
        .with_writer(writer);

    if json {
        layer
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed()
    } else {
        layer.boxed()
    }
}
