//! Push event payload received from the container registry.
//!
//! The registry posts a JSON document shaped like:
//!
//! ```rust
//! use tagwatch::webhook::PushEvent;
//!
//! let body = br#"{
//!   "action": "push",
//!   "repository": { "name": "nginx", "repo_name": "library/nginx" },
//!   "target": { "tag": "1.25.3-alpine", "date": "2023-12-01T14:30:00Z" }
//! }"#;
//!
//! let event = PushEvent::from_slice(body).unwrap();
//! assert!(event.is_push());
//! assert_eq!(event.repository.repo_name, "library/nginx");
//! assert_eq!(event.target.tag, "1.25.3-alpine");
//! ```
//!
//! Only this `action` / `repository` / `target` shape is accepted. Fields that
//! are absent or `null` resolve to [`UNKNOWN_FIELD`] while parsing, so the
//! filter and formatter always see concrete strings. Scalar fields that carry
//! a non-string JSON value keep its JSON text, so `{"action": 42}` is simply
//! not a push.

use crate::error::RelayError;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Placeholder used for any string field missing from the payload.
pub const UNKNOWN_FIELD: &str = "Unknown";

/// Action discriminator that marks a tag push.
pub const PUSH_ACTION: &str = "push";

/// Wire form of the payload. Every field is optional so that a partial
/// payload still decodes; defaults are applied in [`PushEvent::from_wire`].
#[derive(Debug, Default, Deserialize)]
struct WirePushEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    action: Option<String>,
    #[serde(default)]
    repository: Option<WireRepository>,
    #[serde(default)]
    target: Option<WireTarget>,
}

#[derive(Debug, Default, Deserialize)]
struct WireRepository {
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    repo_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireTarget {
    #[serde(default, deserialize_with = "lenient_string")]
    tag: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    date: Option<String>,
}

/// Repository descriptor of a push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Short image name (e.g. `nginx`).
    pub name: String,

    /// Fully-qualified image name (e.g. `library/nginx`).
    pub repo_name: String,
}

/// Target descriptor of a push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Pushed tag (e.g. `1.25.3-alpine`).
    pub tag: String,

    /// Push timestamp, kept verbatim as sent by the registry.
    pub date: String,
}

/// Inbound push event after placeholder resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    /// Action discriminator, `None` when the payload omits it.
    pub action: Option<String>,

    /// Repository the event refers to.
    pub repository: Repository,

    /// Pushed tag and timestamp.
    pub target: Target,
}

impl PushEvent {
    /// Decode a raw request body into a push event.
    ///
    /// # Arguments
    ///
    /// * `body` - Raw bytes of the inbound request
    ///
    /// # Returns
    ///
    /// Returns the decoded event with placeholders applied
    ///
    /// # Errors
    ///
    /// Returns `RelayError::InvalidPayload` if the body is not a JSON object,
    /// or if `repository` or `target` is present but not an object
    ///
    /// # Examples
    ///
    /// ```
    /// use tagwatch::webhook::{PushEvent, UNKNOWN_FIELD};
    ///
    /// let event = PushEvent::from_slice(br#"{"action":"push"}"#).unwrap();
    /// assert_eq!(event.repository.name, UNKNOWN_FIELD);
    ///
    /// assert!(PushEvent::from_slice(b"not json").is_err());
    /// assert!(PushEvent::from_slice(b"[1, 2, 3]").is_err());
    /// ```
    pub fn from_slice(body: &[u8]) -> Result<Self, RelayError> {
        let value: JsonValue = serde_json::from_slice(body)?;

        if !value.is_object() {
            return Err(RelayError::InvalidPayload(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        }

        let wire: WirePushEvent = serde_json::from_value(value)?;
        Ok(Self::from_wire(wire))
    }

    fn from_wire(wire: WirePushEvent) -> Self {
        let repository = wire.repository.unwrap_or_default();
        let target = wire.target.unwrap_or_default();

        Self {
            action: wire.action,
            repository: Repository {
                name: or_unknown(repository.name),
                repo_name: or_unknown(repository.repo_name),
            },
            target: Target {
                tag: or_unknown(target.tag),
                date: or_unknown(target.date),
            },
        }
    }

    /// Whether this event is a tag push.
    pub fn is_push(&self) -> bool {
        self.action.as_deref() == Some(PUSH_ACTION)
    }

    /// Fully-qualified image name, used in responses and log fields.
    pub fn image(&self) -> &str {
        &self.repository.repo_name
    }
}

/// Accept any JSON value for a scalar field. `null` counts as absent and
/// non-string values keep their JSON text.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s),
        other => Some(other.to_string()),
    }))
}

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| UNKNOWN_FIELD.to_string())
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
