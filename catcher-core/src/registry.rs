//! Session-scoped store of captured media requests, keyed by URL.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

use crate::classifier::{matched_extension, MIME_MP4};

/// One piece of media traffic detected in the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedRequest {
    pub url: String,
    pub mime_type: String,
    /// Form-encoded request headers, replayed by the player so the origin
    /// sees the same header fingerprint.
    pub header_params: String,
}

impl CapturedRequest {
    pub fn new(url: impl Into<String>, mime_type: impl Into<String>, headers: &[(String, String)]) -> Self {
        Self {
            url: url.into(),
            mime_type: mime_type.into(),
            header_params: encode_header_params(headers),
        }
    }

    /// Short label for listings: the URL's media extension, or one derived
    /// from the MIME type.
    pub fn format_label(&self) -> String {
        match matched_extension(&self.url) {
            Some(ext) => ext.to_ascii_uppercase(),
            None if self.mime_type == MIME_MP4 => "MP4".to_string(),
            None => "M3U8".to_string(),
        }
    }
}

/// Flatten headers and form-encode them.
///
/// A repeated name keeps the position of its first occurrence and the value
/// of its last.
pub fn encode_header_params(headers: &[(String, String)]) -> String {
    let mut flat: Vec<(&str, &str)> = Vec::with_capacity(headers.len());
    for (name, value) in headers {
        match flat.iter_mut().find(|(k, _)| *k == name.as_str()) {
            Some(slot) => slot.1 = value.as_str(),
            None => flat.push((name.as_str(), value.as_str())),
        }
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in flat {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}

/// Mapping from URL to its capture. Lookups ignore insertion order; listings
/// and snapshots follow it.
///
/// A URL present here is never reclassified until the registry is cleared.
#[derive(Debug, Clone, Default)]
pub struct CaptureRegistry {
    index: HashMap<String, usize>,
    entries: Vec<(String, CapturedRequest)>,
}

impl CaptureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<&CapturedRequest> {
        self.index.get(url).map(|&i| &self.entries[i].1)
    }

    /// Insert a capture, replacing any previous entry for the same URL in place.
    pub fn insert(&mut self, url: impl Into<String>, captured: CapturedRequest) {
        let url = url.into();
        match self.index.get(&url) {
            Some(&i) => self.entries[i].1 = captured,
            None => {
                self.index.insert(url.clone(), self.entries.len());
                self.entries.push((url, captured));
            }
        }
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.entries.clear();
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Captures in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CapturedRequest> {
        self.entries.iter().map(|(_, captured)| captured)
    }
}

impl Serialize for CaptureRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (url, captured) in &self.entries {
            map.serialize_entry(url, captured)?;
        }
        map.end()
    }
}
