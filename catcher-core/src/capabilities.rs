//! Host browser differences, resolved once at startup.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Chromium,
    Firefox,
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Platform::Chromium),
            "firefox" => Ok(Platform::Firefox),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

/// What the host browser supports, consumed by the components that care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Badge text colour can be set (Firefox only)
    pub supports_badge_text_color: bool,
    /// Request headers such as `Cookie` and `Referer` are hidden unless the
    /// listener opts in explicitly (Chromium only)
    pub requires_extra_headers_flag: bool,
}

impl Capabilities {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Chromium => Self {
                supports_badge_text_color: false,
                requires_extra_headers_flag: true,
            },
            Platform::Firefox => Self {
                supports_badge_text_color: true,
                requires_extra_headers_flag: false,
            },
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::for_platform(Platform::default())
    }
}
