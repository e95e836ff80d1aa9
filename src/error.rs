//! Error taxonomy shared by every stage of a run.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::loader::ConfigError;

/// Errors that can occur while generating or reconciling the load balancer config.
#[derive(Debug, Error)]
pub enum AutoscaleError {
    /// Connecting to the admin socket did not finish within the deadline.
    #[error("Timed out after {timeout_secs}s connecting to admin socket {}", .path.display())]
    ConnectionTimeout { path: PathBuf, timeout_secs: u64 },

    /// The admin socket could not be connected to (missing, refused, denied).
    #[error("Failed to connect to admin socket {}: {source}", .path.display())]
    ConnectionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A read from the admin socket did not finish within the deadline.
    #[error("Timed out after {timeout_secs}s waiting for admin socket response")]
    ResponseTimeout { timeout_secs: u64 },

    /// A non-blank server-state line could not be interpreted.
    #[error("Malformed server state line: {line:?}")]
    MalformedServerStateLine { line: String },

    /// A template and the values supplied to it do not line up.
    #[error("Template mismatch: {0}")]
    TemplateMismatch(String),

    /// The region could not be derived from instance metadata.
    #[error("Instance metadata unavailable: {0}")]
    MetadataUnavailable(String),

    /// The cloud provider rejected a call or returned something unreadable.
    #[error("Cloud API error: {0}")]
    CloudApi(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for autoscale operations.
pub type AutoscaleResult<T> = Result<T, AutoscaleError>;
