//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from a TOML file and
//! every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::admin::session::DEFAULT_SOCKET_PATH;
use crate::cloud::metadata::AVAILABILITY_ZONE_URL;
use crate::render::{DEFAULT_INDENT, DEFAULT_SERVER_LINE};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AutoscaleConfig {
    /// Region override; detected from instance metadata when unset.
    pub region: Option<String>,

    /// Admin socket settings.
    pub admin: AdminConfig,

    /// Instance metadata settings.
    pub metadata: MetadataConfig,

    /// Template and server line settings.
    pub render: RenderConfig,

    /// Cloud provider settings.
    pub cloud: CloudConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HAProxy admin socket configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Path of the admin Unix socket.
    pub socket_path: String,

    /// Connect and per-read timeout in seconds.
    pub timeout_secs: u64,

    /// Backend whose server state is dumped.
    pub backend: String,

    /// Run the health reconciliation step.
    pub reconcile: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
            timeout_secs: 3,
            backend: "servers".to_string(),
            reconcile: true,
        }
    }
}

/// Instance metadata configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// URL returning the availability zone as plain text.
    pub url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            url: AVAILABILITY_ZONE_URL.to_string(),
            timeout_secs: 3,
        }
    }
}

/// Rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// HAProxy config template file.
    pub template_path: String,

    /// Server line with two `%s` slots: instance ID, then private address.
    pub server_line: String,

    /// Indentation before each server line after the first.
    pub indent: String,

    /// Template placeholder replaced by the server lines.
    pub placeholder: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template_path: "/etc/haproxy/haproxy.cfg.tpl".to_string(),
            server_line: DEFAULT_SERVER_LINE.to_string(),
            indent: DEFAULT_INDENT.to_string(),
            placeholder: "servers".to_string(),
        }
    }
}

/// Cloud provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CloudConfig {
    /// AWS CLI executable.
    pub aws_binary: String,

    /// Honour the group's health check grace period when marking instances.
    pub respect_grace_period: bool,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            aws_binary: "aws".to_string(),
            respect_grace_period: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
