//! Gotify API client.
//!
//! Posts notifications to a self-hosted Gotify server. Gotify authenticates
//! application messages with a `token` query parameter, so the token is
//! never sent as a header.
//!
//! # Example
//!
//! ```rust,no_run
//! use tagwatch::gotify::{GotifyClient, GotifyClientConfig, Notification, NotificationSender};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GotifyClient::new(GotifyClientConfig {
//!         base_url: "http://localhost:80".to_string(),
//!         token: "app-token".to_string(),
//!         timeout_secs: 10,
//!     })?;
//!
//!     client
//!         .send(&Notification {
//!             title: "hello".to_string(),
//!             message: "world".to_string(),
//!             priority: 5,
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

use crate::gotify::Notification;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Upper bound on how much of an error response body is kept.
const MAX_ERROR_BODY: usize = 512;

/// Errors that can occur while delivering a notification.
#[derive(Error, Debug)]
pub enum GotifyError {
    /// Transport failure (connection refused, DNS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gotify answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body returned by Gotify.
        message: String,
    },
}

impl GotifyError {
    /// HTTP status reported by Gotify, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            GotifyError::Api { status, .. } => Some(*status),
            GotifyError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Delivery seam used by the webhook pipeline.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver one notification.
    ///
    /// Return `Ok(())` only when the notification server accepted the
    /// message. Implementations must not retry.
    async fn send(&self, notification: &Notification) -> Result<(), GotifyError>;
}

/// Gotify client configuration.
#[derive(Clone)]
pub struct GotifyClientConfig {
    /// Base URL of the Gotify server.
    pub base_url: String,
    /// Application token.
    pub token: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl fmt::Debug for GotifyClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GotifyClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// HTTP client for the Gotify message API.
#[derive(Debug, Clone)]
pub struct GotifyClient {
    client: Client,
    config: GotifyClientConfig,
}

impl GotifyClient {
    /// Creates a new Gotify client.
    ///
    /// # Errors
    ///
    /// Returns `GotifyError::Http` if the HTTP client cannot be created.
    pub fn new(config: GotifyClientConfig) -> Result<Self, GotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Configured base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Full URL of the message endpoint, without the token.
    pub fn message_url(&self) -> String {
        format!("{}/message", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl NotificationSender for GotifyClient {
    async fn send(&self, notification: &Notification) -> Result<(), GotifyError> {
        let url = self.message_url();
        debug!(url = %url, priority = notification.priority, "Posting notification to Gotify");

        let response = self
            .client
            .post(&url)
            .query(&[("token", self.config.token.as_str())])
            .json(notification)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Gotify accepted notification");
            Ok(())
        } else {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            Err(GotifyError::Api {
                status: status.as_u16(),
                message: body,
            })
        }
    }
}
