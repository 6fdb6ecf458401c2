//! Gotify integration
//!
//! This module builds notification payloads from matched push events and
//! delivers them to a Gotify server's message API.
//!
//! # Submodules
//!
//! - [`message`]: Notification payload and formatting
//! - [`client`]: HTTP client and the [`NotificationSender`] delivery seam

pub mod client;
pub mod message;

pub use client::{GotifyClient, GotifyClientConfig, GotifyError, NotificationSender};
pub use message::{Notification, NOTIFICATION_PRIORITY, NOTIFICATION_TITLE};
