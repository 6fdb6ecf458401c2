//! Configuration management for Tagwatch
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from an optional YAML file, environment variables, and CLI
//! overrides. Configuration is loaded once at startup and never mutated
//! afterward; an invalid configuration stops the process before any port
//! is bound.

use crate::cli::Cli;
use crate::error::{RelayError, Result};
use crate::gotify::GotifyClientConfig;
use crate::webhook::WatchList;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use url::Url;

/// Main configuration structure for Tagwatch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Inbound HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Gotify notification server settings
    #[serde(default)]
    pub gotify: GotifyConfig,

    /// Watch-list settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Inbound HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind (e.g. `0.0.0.0:5000`)
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:5000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Gotify server configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GotifyConfig {
    /// Base URL of the Gotify server
    #[serde(default = "default_gotify_url")]
    pub url: String,

    /// Application token, sent as the `token` query parameter
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Timeout for a single delivery (seconds)
    #[serde(default = "default_gotify_timeout")]
    pub timeout_seconds: u64,
}

fn default_gotify_url() -> String {
    "http://localhost:80".to_string()
}

fn default_gotify_timeout() -> u64 {
    10
}

impl Default for GotifyConfig {
    fn default() -> Self {
        Self {
            url: default_gotify_url(),
            token: None,
            timeout_seconds: default_gotify_timeout(),
        }
    }
}

impl fmt::Debug for GotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GotifyConfig")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Watch-list configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Watched image identifiers, short (`nginx`) or qualified (`library/nginx`)
    #[serde(default)]
    pub images: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable JSON-formatted logs
    #[serde(default)]
    pub json_format: bool,

    /// Log file path (if None, STDOUT only)
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file; a missing file means defaults
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration, not yet validated
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RelayError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| RelayError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        self.apply_env_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an environment-like lookup.
    ///
    /// `GOTIFY_URL`, `GOTIFY_TOKEN` and `WATCHED_IMAGES` replace their
    /// config values whenever set. `WATCHED_IMAGES` is comma-separated.
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GOTIFY_URL") {
            self.gotify.url = url;
        }

        if let Some(token) = lookup("GOTIFY_TOKEN") {
            self.gotify.token = Some(token);
        }

        if let Some(images) = lookup("WATCHED_IMAGES") {
            self.watch.images = images
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            tracing::debug!(images = ?self.watch.images, "Env override: WATCHED_IMAGES");
        }

        if let Some(timeout) = lookup("TAGWATCH_GOTIFY_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => self.gotify.timeout_seconds = v,
                Err(_) => {
                    tracing::warn!("Invalid TAGWATCH_GOTIFY_TIMEOUT_SECONDS: {}", timeout);
                }
            }
        }

        if let Some(listen_addr) = lookup("TAGWATCH_LISTEN_ADDR") {
            self.server.listen_addr = listen_addr;
        }

        if let Some(level) = lookup("TAGWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(json_logs) = lookup("TAGWATCH_JSON_LOGS") {
            match json_logs.parse::<bool>() {
                Ok(v) => self.logging.json_format = v,
                Err(_) => {
                    tracing::warn!("Invalid value for TAGWATCH_JSON_LOGS: {}", json_logs);
                }
            }
        }

        if let Some(log_file) = lookup("TAGWATCH_LOG_FILE") {
            self.logging.file_path = Some(PathBuf::from(log_file));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(listen) = &cli.listen {
            self.server.listen_addr = listen.clone();
        }

        if cli.verbose {
            self.logging.level = "debug".to_string();
        }

        if cli.json_logs {
            self.logging.json_format = true;
        }
    }

    /// Validate the configuration
    ///
    /// Ensures the Gotify token is present, the watch-list is non-empty,
    /// and the URL, timeout and listen address are usable.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Config` describing the first failed check
    pub fn validate(&self) -> Result<()> {
        self.gotify_client_config()?;
        self.watch_list()?;
        self.listen_addr()?;
        Ok(())
    }

    /// Build the validated watch-list.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Config` if no image is configured
    pub fn watch_list(&self) -> std::result::Result<WatchList, RelayError> {
        WatchList::new(&self.watch.images).map_err(|_| {
            RelayError::Config(
                "WATCHED_IMAGES is required and must list at least one image".to_string(),
            )
        })
    }

    /// Build the validated Gotify client configuration.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Config` if the token is missing, the URL is not
    /// an http(s) URL, or the timeout is zero
    pub fn gotify_client_config(&self) -> std::result::Result<GotifyClientConfig, RelayError> {
        let token = self
            .gotify_token()
            .ok_or_else(|| RelayError::Config("GOTIFY_TOKEN is required".to_string()))?;

        let url = Url::parse(&self.gotify.url).map_err(|e| {
            RelayError::Config(format!("Invalid Gotify URL {}: {}", self.gotify.url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RelayError::Config(format!(
                "Gotify URL must use http or https, got {}",
                url.scheme()
            )));
        }

        if self.gotify.timeout_seconds == 0 {
            return Err(RelayError::Config(
                "gotify.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(GotifyClientConfig {
            base_url: self.gotify.url.clone(),
            token: token.to_string(),
            timeout_secs: self.gotify.timeout_seconds,
        })
    }

    /// The configured token, unless it is missing or blank.
    ///
    /// The value is passed to Gotify verbatim; surrounding whitespace is only
    /// ignored for the blank check.
    fn gotify_token(&self) -> Option<&str> {
        self.gotify
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    /// Parse the configured listen address.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Config` if the address is not `ip:port`
    pub fn listen_addr(&self) -> std::result::Result<SocketAddr, RelayError> {
        self.server.listen_addr.parse().map_err(|e| {
            RelayError::Config(format!(
                "Invalid listen address {}: {}",
                self.server.listen_addr, e
            ))
        })
    }

    /// Human-readable summary with the token redacted.
    pub fn summary(&self) -> String {
        format!(
            "listen={} gotify_url={} token={} timeout={}s watched_images={}",
            self.server.listen_addr,
            self.gotify.url,
            if self.gotify_token().is_some() {
                "<set>"
            } else {
                "<missing>"
            },
            self.gotify.timeout_seconds,
            self.watch.images.join(",")
        )
    }
}
