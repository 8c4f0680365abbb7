//! Request/response messages that let other contexts read and change the
//! capture state without touching it directly.
//!
//! Wire form is `{"type": "...", "data": ...}`:
//!
//! | type             | data             | response   |
//! |------------------|------------------|------------|
//! | `get.everything` | none             | [`Snapshot`] |
//! | `clear.requests` | none             | none       |
//! | `set.settings`   | partial settings | none       |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::registry::CaptureRegistry;
use crate::settings::Settings;

pub const GET_EVERYTHING: &str = "get.everything";
pub const CLEAR_REQUESTS: &str = "clear.requests";
pub const SET_SETTINGS: &str = "set.settings";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawMessage", into = "RawMessage")]
pub enum Message {
    GetEverything,
    ClearRequests,
    /// Partial settings. Missing or non-object `data` is an empty update.
    SetSettings(Map<String, Value>),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl TryFrom<RawMessage> for Message {
    type Error = String;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            GET_EVERYTHING => Ok(Message::GetEverything),
            CLEAR_REQUESTS => Ok(Message::ClearRequests),
            SET_SETTINGS => match raw.data {
                Some(Value::Object(map)) => Ok(Message::SetSettings(map)),
                _ => Ok(Message::SetSettings(Map::new())),
            },
            other => Err(format!("unknown message type: {}", other)),
        }
    }
}

impl From<Message> for RawMessage {
    fn from(message: Message) -> Self {
        match message {
            Message::GetEverything => RawMessage {
                kind: GET_EVERYTHING.to_string(),
                data: None,
            },
            Message::ClearRequests => RawMessage {
                kind: CLEAR_REQUESTS.to_string(),
                data: None,
            },
            Message::SetSettings(map) => RawMessage {
                kind: SET_SETTINGS.to_string(),
                data: Some(Value::Object(map)),
            },
        }
    }
}

/// Point-in-time copy of the capture state. Changing it changes nothing; use
/// `clear.requests` or `set.settings` instead.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub captured_requests: CaptureRegistry,
    pub settings: Settings,
}
