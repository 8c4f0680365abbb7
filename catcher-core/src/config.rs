//! Configuration types and utilities

use serde::{Deserialize, Serialize};

use crate::capabilities::Platform;
use crate::error::CatcherError;
use crate::settings::{Settings, DEFAULT_PLAYER_HOST, DEFAULT_PLAYER_PORT};
use crate::Result;

/// Static startup configuration.
/// These settings are read once and do not change while the catcher runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatcherConfig {
    /// Address to listen on
    pub listen_address: String,
    /// Proxy port the browser is pointed at
    pub listen_port: u16,
    /// Admin API port
    pub admin_port: u16,
    /// Directory holding the root CA (`ca.pem`, `ca.key`)
    pub cert_dir: String,
    /// Host browser, decides the capability set
    pub platform: Platform,
    /// Initial player settings for each session
    pub player: PlayerConfig,
}

impl Default for CatcherConfig {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1".to_string(),
            listen_port: 8888,
            admin_port: 8889,
            cert_dir: "./certs".to_string(),
            platform: Platform::default(),
            player: PlayerConfig::default(),
        }
    }
}

impl CatcherConfig {
    pub fn validate(&self) -> Result<()> {
        if self.listen_port == 0 || self.admin_port == 0 {
            return Err(CatcherError::Configuration(
                "validation failed: ports must be non-zero".to_string(),
            ));
        }
        if self.listen_port == self.admin_port {
            return Err(CatcherError::Configuration(format!(
                "validation failed: proxy and admin both use port {}",
                self.listen_port
            )));
        }
        if self.cert_dir.trim().is_empty() {
            return Err(CatcherError::Configuration(
                "validation failed: cert_dir is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings every session starts from.
    pub fn initial_settings(&self) -> Settings {
        Settings {
            host: self.player.host.clone(),
            port: self.player.port.clone(),
            use_blocking: self.player.use_blocking,
        }
    }
}

/// External player defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub host: String,
    pub port: String,
    pub use_blocking: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PLAYER_HOST.to_string(),
            port: DEFAULT_PLAYER_PORT.to_string(),
            use_blocking: true,
        }
    }
}
