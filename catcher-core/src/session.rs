//! Navigation events that end a capture session.

use serde::{Deserialize, Serialize};

/// URL fragments of pages that never reset the session: extension pages,
/// browser-internal pages and blank tabs.
const EXCLUDED_URL_MARKERS: [&str; 3] = ["extension://", "chrome://", "about:blank"];

/// A tab state change. `url` is present only when the change includes a new URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEvent {
    #[serde(default)]
    pub url: Option<String>,
}

impl NavigationEvent {
    pub fn to(url: impl Into<String>) -> Self {
        Self { url: Some(url.into()) }
    }

    /// Whether this event is a real page navigation that should reset
    /// captures.
    pub fn is_page_navigation(&self) -> bool {
        match &self.url {
            Some(url) if !url.is_empty() => !EXCLUDED_URL_MARKERS.iter().any(|m| url.contains(m)),
            _ => false,
        }
    }
}
