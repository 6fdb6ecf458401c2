//! Registry webhook ingestion
//!
//! This module turns inbound registry callbacks into forwarded notifications.
//!
//! # Overview
//!
//! Each request flows through a straight pipeline:
//! 1. Decode the payload into a push event
//! 2. Drop non-push actions
//! 3. Match the image against the watch-list
//! 4. Deliver a notification for matched images
//!
//! # Modules
//!
//! - [`event`]: Push event payload and placeholder handling
//! - [`filter`]: Watch-list and exact-match filtering
//! - [`handler`]: The request pipeline and its outcomes

pub mod event;
pub mod filter;
pub mod handler;

pub use event::{PushEvent, PUSH_ACTION, UNKNOWN_FIELD};
pub use filter::{WatchFilter, WatchList};
pub use handler::{WebhookHandler, WebhookOutcome};
