//! Notification payload posted to Gotify.

use crate::webhook::PushEvent;
use serde::{Deserialize, Serialize};

/// Title used for every tag release notification.
pub const NOTIFICATION_TITLE: &str = "🐳 New Docker Tag Released";

/// Priority for tag release notifications. Mid-range on Gotify's 0-10
/// scale: shown, but not treated as urgent.
pub const NOTIFICATION_PRIORITY: u8 = 5;

/// Message body accepted by `POST /message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification title.
    pub title: String,

    /// Markdown-formatted body.
    pub message: String,

    /// Gotify priority level.
    pub priority: u8,
}

impl Notification {
    /// Build the release notification for a matched push event.
    ///
    /// The push timestamp is embedded exactly as the registry sent it.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagwatch::gotify::Notification;
    /// use tagwatch::webhook::PushEvent;
    ///
    /// let event = PushEvent::from_slice(br#"{
    ///     "action": "push",
    ///     "repository": {"name": "nginx", "repo_name": "library/nginx"},
    ///     "target": {"tag": "1.25.3-alpine", "date": "2023-12-01T14:30:00Z"}
    /// }"#).unwrap();
    ///
    /// let notification = Notification::from_push_event(&event);
    /// assert_eq!(
    ///     notification.message,
    ///     "**Image:** library/nginx\n**Tag:** 1.25.3-alpine\n**Pushed:** 2023-12-01T14:30:00Z"
    /// );
    /// assert_eq!(notification.priority, 5);
    /// ```
    pub fn from_push_event(event: &PushEvent) -> Self {
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            message: format!(
                "**Image:** {}\n**Tag:** {}\n**Pushed:** {}",
                event.repository.repo_name, event.target.tag, event.target.date
            ),
            priority: NOTIFICATION_PRIORITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::event::{Repository, Target};

    fn event(repo_name: &str, tag: &str, date: &str) -> PushEvent {
        PushEvent {
            action: Some("push".to_string()),
            repository: Repository {
                name: "ignored".to_string(),
                repo_name: repo_name.to_string(),
            },
            target: Target {
                tag: tag.to_string(),
                date: date.to_string(),
            },
        }
    }

    #[test]
    fn test_notification_fields() {
        let n = Notification::from_push_event(&event("library/nginx", "1.25.3", "yesterday"));

        assert_eq!(n.title, NOTIFICATION_TITLE);
        assert_eq!(n.priority, NOTIFICATION_PRIORITY);
        assert!(n.message.contains("library/nginx"));
        assert!(n.message.contains("1.25.3"));
        assert!(n.message.contains("yesterday"));
        assert_eq!(n.message.lines().count(), 3);
    }

    #[test]
    fn test_timestamp_is_not_reformatted() {
        let n = Notification::from_push_event(&event("a/b", "v1", "1701441000"));
        assert!(n.message.ends_with("**Pushed:** 1701441000"));
    }

    #[test]
    fn test_notification_serializes_wire_shape() {
        let n = Notification::from_push_event(&event("a/b", "v1", "now"));
        let json = serde_json::to_value(&n).unwrap();

        assert_eq!(json["title"], NOTIFICATION_TITLE);
        assert_eq!(json["priority"], 5);
        assert!(json["message"].as_str().unwrap().contains("a/b"));
        assert_eq!(json.as_object().unwrap().len(), 3);
    }
}
