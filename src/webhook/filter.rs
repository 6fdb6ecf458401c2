//! Watch-list filtering for push events
//!
//! This module decides which push events should be forwarded. Matching is
//! exact and case-sensitive against either the short or the fully-qualified
//! repository name; there is no wildcard, prefix, or namespace handling.

use crate::error::RelayError;
use crate::webhook::PushEvent;

/// Ordered, non-empty list of watched image identifiers.
///
/// Entries are kept in the order they were configured. Short (`nginx`) and
/// qualified (`library/nginx`) forms are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchList {
    images: Vec<String>,
}

impl WatchList {
    /// Build a watch-list from configured entries.
    ///
    /// Entries are trimmed and blank entries dropped.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Config` if no entries remain
    ///
    /// # Examples
    ///
    /// ```
    /// use tagwatch::webhook::WatchList;
    ///
    /// let list = WatchList::new(vec![" nginx ".to_string(), "".to_string()]).unwrap();
    /// assert_eq!(list.images(), ["nginx"]);
    ///
    /// assert!(WatchList::new(Vec::<String>::new()).is_err());
    /// ```
    pub fn new<I, S>(entries: I) -> Result<Self, RelayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let images: Vec<String> = entries
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if images.is_empty() {
            return Err(RelayError::Config(
                "watch list must contain at least one image".to_string(),
            ));
        }

        Ok(Self { images })
    }

    /// Parse a comma-separated list such as `nginx, library/redis,`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagwatch::webhook::WatchList;
    ///
    /// let list = WatchList::parse("nginx, library/redis,").unwrap();
    /// assert_eq!(list.images(), ["nginx", "library/redis"]);
    /// ```
    pub fn parse(raw: &str) -> Result<Self, RelayError> {
        Self::new(raw.split(','))
    }

    /// Exact membership test.
    pub fn contains(&self, image: &str) -> bool {
        self.images.iter().any(|i| i == image)
    }

    /// Watched images in configured order.
    pub fn images(&self) -> &[String] {
        &self.images
    }
}

/// Decides whether a push event refers to a watched image.
#[derive(Debug, Clone)]
pub struct WatchFilter {
    watch_list: WatchList,
}

impl WatchFilter {
    /// Create a new filter over the given watch-list.
    pub fn new(watch_list: WatchList) -> Self {
        Self { watch_list }
    }

    /// Check whether an event should be forwarded.
    ///
    /// # Arguments
    ///
    /// * `event` - Push event to evaluate
    ///
    /// # Returns
    ///
    /// Returns true if either the short or the fully-qualified repository
    /// name is on the watch-list
    ///
    /// # Examples
    ///
    /// ```
    /// use tagwatch::webhook::{PushEvent, WatchFilter, WatchList};
    ///
    /// let filter = WatchFilter::new(WatchList::parse("nginx").unwrap());
    /// let event = PushEvent::from_slice(
    ///     br#"{"action":"push","repository":{"name":"nginx","repo_name":"library/nginx"}}"#,
    /// )
    /// .unwrap();
    ///
    /// assert!(filter.matches(&event));
    /// ```
    pub fn matches(&self, event: &PushEvent) -> bool {
        self.watch_list.contains(&event.repository.name)
            || self.watch_list.contains(&event.repository.repo_name)
    }

    /// The underlying watch-list.
    pub fn watch_list(&self) -> &WatchList {
        &self.watch_list
    }

    /// Get filter summary for logging.
    pub fn summary(&self) -> String {
        format!("images={}", self.watch_list.images().join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::event::{Repository, Target};

    fn create_test_event(name: &str, repo_name: &str) -> PushEvent {
        PushEvent {
            action: Some("push".to_string()),
            repository: Repository {
                name: name.to_string(),
                repo_name: repo_name.to_string(),
            },
            target: Target {
                tag: "latest".to_string(),
                date: "2023-12-01T14:30:00Z".to_string(),
            },
        }
    }

    fn filter_for(raw: &str) -> WatchFilter {
        WatchFilter::new(WatchList::parse(raw).unwrap())
    }

    #[test]
    fn test_parse_trims_and_drops_empty_entries() {
        let list = WatchList::parse(" nginx ,, library/redis , ").unwrap();
        assert_eq!(list.images(), ["nginx", "library/redis"]);
    }

    #[test]
    fn test_parse_preserves_order() {
        let list = WatchList::parse("zeta,alpha,mid").unwrap();
        assert_eq!(list.images(), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_empty_watch_list_rejected() {
        assert!(WatchList::parse("").is_err());
        assert!(WatchList::parse(" , ,").is_err());
        assert!(matches!(
            WatchList::new(Vec::<String>::new()),
            Err(RelayError::Config(_))
        ));
    }

    #[test]
    fn test_match_by_short_name() {
        let filter = filter_for("nginx");
        assert!(filter.matches(&create_test_event("nginx", "library/nginx")));
    }

    #[test]
    fn test_match_by_qualified_name() {
        let filter = filter_for("library/nginx");
        assert!(filter.matches(&create_test_event("nginx", "library/nginx")));
    }

    #[test]
    fn test_no_match() {
        let filter = filter_for("redis");
        assert!(!filter.matches(&create_test_event("nginx", "library/nginx")));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let filter = filter_for("NGINX");
        assert!(!filter.matches(&create_test_event("nginx", "library/nginx")));
    }

    #[test]
    fn test_no_prefix_or_namespace_matching() {
        let filter = filter_for("library,ngin,myorg/nginx");
        assert!(!filter.matches(&create_test_event("nginx", "library/nginx")));
    }

    #[test]
    fn test_placeholder_does_not_match() {
        let filter = filter_for("nginx,redis");
        assert!(!filter.matches(&create_test_event("Unknown", "Unknown")));
    }

    #[test]
    fn test_filter_summary() {
        let filter = filter_for("nginx,library/redis");
        assert_eq!(filter.summary(), "images=nginx,library/redis");
    }
}
