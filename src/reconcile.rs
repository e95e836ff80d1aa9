//! Health reconciliation between HAProxy and the autoscaling group.
//!
//! # Responsibilities
//! - Read server state from the admin socket
//! - Mark every server HAProxy reports down as unhealthy in its group
//!
//! # Design Decisions
//! - The admin session is closed before any remediation call is made
//! - A malformed dump aborts before any instance is touched
//! - Remediation is sequential and stops at the first failure

use std::path::Path;
use std::time::Duration;

use crate::admin::{self, parse_server_state, unhealthy_identifiers};
use crate::cloud::{mark_unhealthy, AutoscalingApi};
use crate::config::AdminConfig;
use crate::error::AutoscaleResult;

/// Server-state source for one reconciliation pass.
#[derive(Debug, Clone)]
pub struct StateSource<'a> {
    pub socket_path: &'a Path,
    pub timeout: Duration,
    pub backend: &'a str,
}

impl<'a> From<&'a AdminConfig> for StateSource<'a> {
    fn from(config: &'a AdminConfig) -> Self {
        Self {
            socket_path: Path::new(&config.socket_path),
            timeout: Duration::from_secs(config.timeout_secs),
            backend: &config.backend,
        }
    }
}

/// Identifiers of servers HAProxy currently considers down.
pub async fn fetch_unhealthy(source: &StateSource<'_>) -> AutoscaleResult<Vec<String>> {
    let command = admin::show_servers_state(source.backend);
    let dump = admin::exchange(source.socket_path, source.timeout, &command).await?;
    let records = parse_server_state(&dump)?;

    tracing::debug!(servers = records.len(), backend = source.backend, "Server state parsed");
    Ok(unhealthy_identifiers(&records))
}

/// Run one pass and return the identifiers that were reported unhealthy.
pub async fn reconcile_health(
    api: &dyn AutoscalingApi,
    source: &StateSource<'_>,
    region: &str,
    respect_grace_period: bool,
) -> AutoscaleResult<Vec<String>> {
    let unhealthy = fetch_unhealthy(source).await?;

    if unhealthy.is_empty() {
        tracing::info!("All servers healthy");
        return Ok(unhealthy);
    }

    tracing::warn!(count = unhealthy.len(), "HAProxy reports unhealthy servers");
    for instance_id in &unhealthy {
        mark_unhealthy(api, region, instance_id, respect_grace_period).await?;
    }

    Ok(unhealthy)
}
