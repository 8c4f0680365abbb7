//! Runtime settings for the capture session.
//!
//! Settings live only in memory; every session starts from the defaults
//! supplied at startup.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub const DEFAULT_PLAYER_HOST: &str = "192.168.0.13";
pub const DEFAULT_PLAYER_PORT: &str = "8080";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Host of the external media player
    pub host: String,
    /// Port of the external media player
    pub port: String,
    /// Cancel captured media requests instead of letting them load
    pub use_blocking: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_PLAYER_HOST.to_string(),
            port: DEFAULT_PLAYER_PORT.to_string(),
            use_blocking: true,
        }
    }
}

impl Settings {
    /// Apply a partial update.
    ///
    /// Only keys that name an existing setting are applied. Unlike a plain
    /// copy of every known key, a value must also have that setting's JSON
    /// type, so `{"useBlocking": "yes"}` is ignored rather than stored.
    /// Returns the keys that were applied.
    pub fn apply_update(&mut self, data: &Map<String, Value>) -> Vec<String> {
        let mut applied = Vec::new();
        for (key, value) in data {
            let accepted = match (key.as_str(), value) {
                ("host", Value::String(s)) => {
                    self.host = s.clone();
                    true
                }
                ("port", Value::String(s)) => {
                    self.port = s.clone();
                    true
                }
                ("useBlocking", Value::Bool(b)) => {
                    self.use_blocking = *b;
                    true
                }
                _ => false,
            };
            if accepted {
                applied.push(key.clone());
            } else {
                debug!("Ignoring settings key {:?}", key);
            }
        }
        applied
    }

    /// Player host, falling back to the default when empty.
    pub fn player_host(&self) -> &str {
        if self.host.is_empty() {
            DEFAULT_PLAYER_HOST
        } else {
            &self.host
        }
    }

    /// Player port, falling back to the default when empty.
    pub fn player_port(&self) -> &str {
        if self.port.is_empty() {
            DEFAULT_PLAYER_PORT
        } else {
            &self.port
        }
    }
}
