//! Error types for catcher operations

use thiserror::Error;

/// Main error type for catcher operations.
///
/// None of these ever reach the interception decision: a failure anywhere on
/// the request path degrades to letting the request through.
#[derive(Debug, Error)]
pub enum CatcherError {
    /// Network-related errors (binding, proxy runtime, player delivery)
    #[error("Network error: {0}")]
    Network(String),
    /// Certificate-related errors
    #[error("Certificate error: {0}")]
    Certificate(String),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The capture service task has stopped
    #[error("Capture service unavailable")]
    ServiceUnavailable,
}
