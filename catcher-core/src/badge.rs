//! The visible capture counter.

use serde::Serialize;

use crate::capabilities::Capabilities;

pub const BADGE_BACKGROUND_COLOR: &str = "#ffff00";
pub const BADGE_TEXT_COLOR: &str = "#000000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    /// Decimal capture count, or empty when cleared
    pub text: String,
    pub background_color: String,
    pub text_color: Option<String>,
}

impl Badge {
    pub fn new(capabilities: &Capabilities) -> Self {
        Self {
            text: String::new(),
            background_color: BADGE_BACKGROUND_COLOR.to_string(),
            text_color: capabilities
                .supports_badge_text_color
                .then(|| BADGE_TEXT_COLOR.to_string()),
        }
    }

    pub fn set_count(&mut self, count: usize) {
        self.text = count.to_string();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}
