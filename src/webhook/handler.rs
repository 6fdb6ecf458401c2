//! Webhook processing pipeline
//!
//! Runs one inbound request through parse, filter, transform and deliver,
//! resolving it to exactly one terminal outcome:
//!
//! 1. Decode the body into a [`PushEvent`] (failure: `InvalidPayload`)
//! 2. Ignore anything that is not a push ([`WebhookOutcome::NotPush`])
//! 3. Ignore images not on the watch-list ([`WebhookOutcome::Unwatched`])
//! 4. Build a [`Notification`] and deliver it (failure: `Delivery`)

use crate::error::RelayError;
use crate::gotify::{Notification, NotificationSender};
use crate::metrics::{self, DeliveryTimer};
use crate::webhook::{PushEvent, WatchFilter};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Successful terminal states of a webhook request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The event was not a push; nothing was sent.
    NotPush,

    /// The image is not watched; nothing was sent.
    Unwatched {
        /// Fully-qualified image name from the event.
        image: String,
    },

    /// Gotify accepted the notification.
    Delivered {
        /// Fully-qualified image name from the event.
        image: String,
        /// Pushed tag.
        tag: String,
    },
}

impl WebhookOutcome {
    /// Short plain-text response body for this outcome.
    pub fn message(&self) -> String {
        match self {
            WebhookOutcome::NotPush => "Not a push event".to_string(),
            WebhookOutcome::Unwatched { image } => format!("Image {} not in watch list", image),
            WebhookOutcome::Delivered { .. } => "Notification sent".to_string(),
        }
    }
}

/// Processes registry webhooks against a watch-list.
///
/// Cheap to clone; all state is shared and immutable.
#[derive(Clone)]
pub struct WebhookHandler {
    filter: Arc<WatchFilter>,
    sender: Arc<dyn NotificationSender>,
}

impl WebhookHandler {
    /// Create a handler from a filter and a delivery backend.
    pub fn new(filter: WatchFilter, sender: Arc<dyn NotificationSender>) -> Self {
        Self {
            filter: Arc::new(filter),
            sender,
        }
    }

    /// The filter this handler applies.
    pub fn filter(&self) -> &WatchFilter {
        &self.filter
    }

    /// Handle one raw webhook body.
    ///
    /// # Arguments
    ///
    /// * `body` - Raw request body as received
    ///
    /// # Returns
    ///
    /// Returns the benign or delivered outcome
    ///
    /// # Errors
    ///
    /// Returns `RelayError::InvalidPayload` if the body cannot be decoded
    /// Returns `RelayError::Delivery` if Gotify rejects the notification or is unreachable
    pub async fn handle(&self, body: &[u8]) -> Result<WebhookOutcome, RelayError> {
        let event = match PushEvent::from_slice(body) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Rejecting malformed webhook payload");
                metrics::record_webhook(metrics::OUTCOME_INVALID_PAYLOAD);
                return Err(e);
            }
        };

        if !event.is_push() {
            info!(action = ?event.action, "Ignoring non-push event");
            metrics::record_webhook(metrics::OUTCOME_NOT_PUSH);
            return Ok(WebhookOutcome::NotPush);
        }

        if !self.filter.matches(&event) {
            info!(
                image = %event.image(),
                name = %event.repository.name,
                "Image not in watch list"
            );
            metrics::record_webhook(metrics::OUTCOME_UNWATCHED);
            return Ok(WebhookOutcome::Unwatched {
                image: event.image().to_string(),
            });
        }

        let notification = Notification::from_push_event(&event);
        let timer = DeliveryTimer::start();

        match self.sender.send(&notification).await {
            Ok(()) => {
                timer.finish(metrics::OUTCOME_DELIVERED);
                metrics::record_webhook(metrics::OUTCOME_DELIVERED);
                info!(
                    image = %event.image(),
                    tag = %event.target.tag,
                    "Notification sent"
                );
                Ok(WebhookOutcome::Delivered {
                    image: event.repository.repo_name,
                    tag: event.target.tag,
                })
            }
            Err(e) => {
                timer.finish(metrics::OUTCOME_DELIVERY_FAILED);
                metrics::record_webhook(metrics::OUTCOME_DELIVERY_FAILED);
                error!(
                    image = %event.image(),
                    tag = %event.target.tag,
                    status = ?e.status(),
                    error = %e,
                    "Failed to send notification"
                );
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gotify::GotifyError;
    use crate::webhook::WatchList;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records notifications and answers with a fixed status.
    struct RecordingSender {
        sent: Mutex<Vec<Notification>>,
        reject_with: Option<u16>,
    }

    impl RecordingSender {
        fn accepting() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                reject_with: None,
            })
        }

        fn rejecting(status: u16) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                reject_with: Some(status),
            })
        }

        fn sent(&self) -> Vec<Notification> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationSender for RecordingSender {
        async fn send(&self, notification: &Notification) -> Result<(), GotifyError> {
            self.sent.lock().unwrap().push(notification.clone());
            match self.reject_with {
                None => Ok(()),
                Some(status) => Err(GotifyError::Api {
                    status,
                    message: "rejected".to_string(),
                }),
            }
        }
    }

    fn handler(watch: &str, sender: Arc<RecordingSender>) -> WebhookHandler {
        WebhookHandler::new(WatchFilter::new(WatchList::parse(watch).unwrap()), sender)
    }

    const NGINX_PUSH: &[u8] = br#"{
        "action": "push",
        "repository": { "name": "nginx", "repo_name": "library/nginx" },
        "target": { "tag": "1.25.3-alpine", "date": "2023-12-01T14:30:00Z" }
    }"#;

    #[tokio::test]
    async fn test_watched_push_is_delivered() {
        let sender = RecordingSender::accepting();
        let outcome = handler("nginx", sender.clone())
            .handle(NGINX_PUSH)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Delivered {
                image: "library/nginx".to_string(),
                tag: "1.25.3-alpine".to_string(),
            }
        );
        assert_eq!(outcome.message(), "Notification sent");

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].message.contains("library/nginx"));
        assert!(sent[0].message.contains("1.25.3-alpine"));
        assert!(sent[0].message.contains("2023-12-01T14:30:00Z"));
    }

    #[tokio::test]
    async fn test_unwatched_push_is_ignored() {
        let sender = RecordingSender::accepting();
        let outcome = handler("redis", sender.clone())
            .handle(NGINX_PUSH)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Unwatched {
                image: "library/nginx".to_string()
            }
        );
        assert_eq!(outcome.message(), "Image library/nginx not in watch list");
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_non_push_is_ignored_before_filtering() {
        let sender = RecordingSender::accepting();
        let body = br#"{"action": "delete", "repository": {"name": "nginx"}}"#;
        let outcome = handler("nginx", sender.clone()).handle(body).await.unwrap();

        assert_eq!(outcome, WebhookOutcome::NotPush);
        assert_eq!(outcome.message(), "Not a push event");
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_non_string_action_is_ignored() {
        let sender = RecordingSender::accepting();
        let handler = handler("nginx", sender.clone());

        for body in [
            br#"{"action": 42}"#.as_slice(),
            br#"{"action": {"k": "v"}}"#.as_slice(),
        ] {
            let outcome = handler.handle(body).await.unwrap();
            assert_eq!(outcome, WebhookOutcome::NotPush);
        }
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_non_string_repository_name_is_unwatched() {
        let sender = RecordingSender::accepting();
        let body = br#"{"action": "push", "repository": {"name": 42, "repo_name": "x/y"}}"#;
        let outcome = handler("nginx", sender.clone()).handle(body).await.unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Unwatched {
                image: "x/y".to_string()
            }
        );
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_push_without_repository_is_unwatched() {
        let sender = RecordingSender::accepting();
        let outcome = handler("nginx", sender.clone())
            .handle(br#"{"action": "push"}"#)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Unwatched {
                image: "Unknown".to_string()
            }
        );
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_never_reaches_sender() {
        let sender = RecordingSender::accepting();
        let err = handler("nginx", sender.clone())
            .handle(b"<xml/>")
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::InvalidPayload(_)));
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_delivery_is_error() {
        let sender = RecordingSender::rejecting(500);
        let err = handler("library/nginx", sender.clone())
            .handle(NGINX_PUSH)
            .await
            .unwrap_err();

        match err {
            RelayError::Delivery(GotifyError::Api { status, .. }) => assert_eq!(status, 500),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(sender.sent().len(), 1);
    }
}
