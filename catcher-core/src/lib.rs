//! Stream Catcher Core Library
//!
//! Watches browser traffic through an intercepting proxy, recognises
//! streaming media requests (video files and HLS playlists), records enough
//! about each to replay it on an external player, and optionally cancels the
//! in-browser load.

pub mod admin;
pub mod badge;
pub mod ca;
pub mod capabilities;
pub mod classifier;
pub mod controller;
pub mod handlers;
pub mod player;
pub mod protocol;
/// Core proxy functionality modules
pub mod proxy;
pub mod registry;
pub mod service;
pub mod session;
pub mod settings;

/// Configuration types and utilities
pub mod config;

/// Error types for catcher operations
pub mod error;

pub use admin::AdminState;
pub use badge::Badge;
pub use ca::CertificateAuthority;
pub use capabilities::{Capabilities, Platform};
pub use classifier::{classify, RequestDescriptor, ResourceType};
pub use config::{CatcherConfig, PlayerConfig};
pub use controller::{Decision, InterceptController, InterceptStats};
pub use error::CatcherError;
pub use handlers::CatchHandler;
pub use player::{PlayerClient, PlayerPayload};
pub use protocol::{Message, Snapshot};
/// Re-export commonly used types
pub use proxy::ProxyServer;
pub use registry::{CaptureRegistry, CapturedRequest};
pub use service::{CaptureService, CatcherHandle};
pub use session::NavigationEvent;
pub use settings::Settings;

/// Result type alias for catcher operations
pub type Result<T> = std::result::Result<T, CatcherError>;
