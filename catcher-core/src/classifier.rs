//! URL and header heuristics that decide whether a request carries media.
//!
//! Everything in here is pure: the same descriptor always classifies the same
//! way and nothing is remembered between calls.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    /// A media file extension anywhere in the URL, not anchored to the path end.
    static ref FORMATS_PATTERN: Regex = Regex::new(r"(?i)\.(mp4|m3u8|webm|ogg|ogv|3gp)").unwrap();
}

pub const MIME_MP4: &str = "video/mp4";
pub const MIME_HLS: &str = "application/x-mpegURL";

/// Resource type the page declared for a request, named after the
/// WebExtension `webRequest` types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    MainFrame,
    SubFrame,
    Stylesheet,
    Script,
    Image,
    Font,
    Object,
    #[serde(rename = "xmlhttprequest")]
    XmlHttpRequest,
    Ping,
    Media,
    Websocket,
    Other,
}

impl ResourceType {
    /// Parse a WebExtension request type name. Unknown names map to `Other`.
    pub fn parse(request_type: &str) -> Self {
        match request_type {
            "main_frame" | "document" => ResourceType::MainFrame,
            "sub_frame" | "subdocument" => ResourceType::SubFrame,
            "stylesheet" | "css" => ResourceType::Stylesheet,
            "script" | "js" => ResourceType::Script,
            "image" | "img" => ResourceType::Image,
            "font" => ResourceType::Font,
            "object" => ResourceType::Object,
            "xmlhttprequest" | "xhr" => ResourceType::XmlHttpRequest,
            "ping" | "beacon" => ResourceType::Ping,
            "media" => ResourceType::Media,
            "websocket" => ResourceType::Websocket,
            _ => ResourceType::Other,
        }
    }

    /// Derive the resource type from a `Sec-Fetch-Dest` header value.
    ///
    /// Proxied requests have no declared type, so Fetch Metadata stands in for
    /// it. A missing header yields `Other`.
    pub fn from_fetch_dest(dest: Option<&str>) -> Self {
        let Some(dest) = dest else {
            return ResourceType::Other;
        };
        match dest.trim().to_ascii_lowercase().as_str() {
            "audio" | "video" | "track" => ResourceType::Media,
            "empty" => ResourceType::XmlHttpRequest,
            "document" => ResourceType::MainFrame,
            "iframe" | "frame" => ResourceType::SubFrame,
            "script" => ResourceType::Script,
            "style" => ResourceType::Stylesheet,
            "image" => ResourceType::Image,
            "font" => ResourceType::Font,
            "object" | "embed" => ResourceType::Object,
            _ => ResourceType::Other,
        }
    }

    /// Type for a request without Fetch Metadata, which browsers only send to
    /// secure origins. Ranged requests and media-extension URLs count as
    /// media; anything else is offered as a scripted fetch.
    pub fn infer(url: &str, has_range: bool) -> Self {
        if has_range || matched_extension(url).is_some() {
            ResourceType::Media
        } else {
            ResourceType::XmlHttpRequest
        }
    }

    /// Whether the interception listener subscribes to this type.
    pub fn is_subscribed(&self) -> bool {
        matches!(self, ResourceType::Media | ResourceType::XmlHttpRequest)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::MainFrame => "main_frame",
            ResourceType::SubFrame => "sub_frame",
            ResourceType::Stylesheet => "stylesheet",
            ResourceType::Script => "script",
            ResourceType::Image => "image",
            ResourceType::Font => "font",
            ResourceType::Object => "object",
            ResourceType::XmlHttpRequest => "xmlhttprequest",
            ResourceType::Ping => "ping",
            ResourceType::Media => "media",
            ResourceType::Websocket => "websocket",
            ResourceType::Other => "other",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending outgoing request as seen by the interception listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub url: String,
    pub resource_type: ResourceType,
    /// Header name/value pairs in the order the platform delivered them.
    /// Repeated names are allowed.
    pub headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            url: url.into(),
            resource_type,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

/// First media extension found in the URL, lowercased.
pub fn matched_extension(url: &str) -> Option<String> {
    FORMATS_PATTERN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// MIME type for a lowercased media extension.
pub fn mime_for_extension(ext: &str) -> String {
    if ext == "m3u8" {
        MIME_HLS.to_string()
    } else {
        format!("video/{}", ext.replace("ogv", "ogg").replace("3gp", "3gpp"))
    }
}

/// Classify a request, returning its MIME type when it looks like media.
///
/// Rules, first match wins:
/// 1. a media extension in the URL decides the MIME type;
/// 2. scripted requests whose URL mentions `m3u8` or `hls` are HLS playlists;
/// 3. other requests are MP4 when the URL mentions `mp4` or a `Range` header
///    is present.
pub fn classify(request: &RequestDescriptor) -> Option<String> {
    if let Some(ext) = matched_extension(&request.url) {
        return Some(mime_for_extension(&ext));
    }

    let lower_url = request.url.to_ascii_lowercase();
    if request.resource_type == ResourceType::XmlHttpRequest {
        if lower_url.contains("m3u8") || lower_url.contains("hls") {
            return Some(MIME_HLS.to_string());
        }
    } else if lower_url.contains("mp4") || request.has_header("range") {
        return Some(MIME_MP4.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_match_derives_mime() {
        let cases = [
            ("https://cdn.example/a.mp4", "video/mp4"),
            ("https://cdn.example/master.M3U8?x=1", "application/x-mpegURL"),
            ("https://cdn.example/clip.webm", "video/webm"),
            ("https://cdn.example/clip.ogg", "video/ogg"),
            ("https://cdn.example/clip.ogv", "video/ogg"),
            ("https://cdn.example/clip.3gp", "video/3gpp"),
        ];
        for (url, mime) in cases {
            let req = RequestDescriptor::new(url, ResourceType::Media);
            assert_eq!(classify(&req).as_deref(), Some(mime), "url: {}", url);
        }
    }

    #[test]
    fn test_extension_match_is_unanchored() {
        let req = RequestDescriptor::new(
            "https://site.example/api?file=movie.mp4&x=1",
            ResourceType::XmlHttpRequest,
        );
        assert_eq!(classify(&req).as_deref(), Some(MIME_MP4));
    }

    #[test]
    fn test_xhr_hls_token() {
        let req = RequestDescriptor::new(
            "https://site.example/api/HLS/stream/42",
            ResourceType::XmlHttpRequest,
        );
        assert_eq!(classify(&req).as_deref(), Some(MIME_HLS));

        // Same URL from a media tag is not an HLS hint
        let req = RequestDescriptor::new(
            "https://site.example/api/HLS/stream/42",
            ResourceType::Media,
        );
        assert_eq!(classify(&req), None);
    }

    #[test]
    fn test_range_header_marks_media() {
        let req = RequestDescriptor::new("https://site.example/blob/9f2c", ResourceType::Media)
            .with_header("RANGE", "bytes=0-");
        assert_eq!(classify(&req).as_deref(), Some(MIME_MP4));

        // Scripted ranged requests are not treated as media
        let req = RequestDescriptor::new(
            "https://site.example/blob/9f2c",
            ResourceType::XmlHttpRequest,
        )
        .with_header("Range", "bytes=0-");
        assert_eq!(classify(&req), None);
    }

    #[test]
    fn test_mp4_token_without_dot() {
        let req = RequestDescriptor::new("https://site.example/get_mp4/77", ResourceType::Media);
        assert_eq!(classify(&req).as_deref(), Some(MIME_MP4));
    }

    #[test]
    fn test_not_media() {
        let req = RequestDescriptor::new("https://site.example/api/user", ResourceType::XmlHttpRequest)
            .with_header("Accept", "application/json");
        assert_eq!(classify(&req), None);
    }

    #[test]
    fn test_resource_type_from_fetch_dest() {
        assert_eq!(ResourceType::from_fetch_dest(Some("video")), ResourceType::Media);
        assert_eq!(ResourceType::from_fetch_dest(Some("audio")), ResourceType::Media);
        assert_eq!(ResourceType::from_fetch_dest(Some("empty")), ResourceType::XmlHttpRequest);
        assert_eq!(ResourceType::from_fetch_dest(Some("document")), ResourceType::MainFrame);
        assert_eq!(ResourceType::from_fetch_dest(Some("iframe")), ResourceType::SubFrame);
        assert_eq!(ResourceType::from_fetch_dest(None), ResourceType::Other);
        assert!(!ResourceType::from_fetch_dest(Some("image")).is_subscribed());
    }

    #[test]
    fn test_resource_type_inferred_without_fetch_metadata() {
        assert_eq!(ResourceType::infer("http://a.example/v/clip.mp4", false), ResourceType::Media);
        assert_eq!(ResourceType::infer("http://a.example/stream", true), ResourceType::Media);
        assert_eq!(
            ResourceType::infer("http://a.example/api/list", false),
            ResourceType::XmlHttpRequest
        );
        assert!(ResourceType::infer("http://a.example/", false).is_subscribed());
    }

    #[test]
    fn test_resource_type_parse() {
        assert_eq!(ResourceType::parse("xmlhttprequest"), ResourceType::XmlHttpRequest);
        assert_eq!(ResourceType::parse("media"), ResourceType::Media);
        assert_eq!(ResourceType::parse("weird"), ResourceType::Other);
        assert_eq!(ResourceType::XmlHttpRequest.to_string(), "xmlhttprequest");
    }
}
