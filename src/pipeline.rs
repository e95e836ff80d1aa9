//! A complete run: reconcile health, then regenerate the config.
//!
//! # Data Flow
//! ```text
//! region (override or metadata)
//!     → read template
//!     → reconcile.rs (admin socket → unhealthy → mark in group)
//!     → cloud (in-service instances for prefix)
//!     → render (server lines → template)
//!     → output (stdout or atomic file replace)
//! ```
//!
//! # Design Decisions
//! - Steps run strictly in order; the first error aborts the run
//! - Output is written last, so a failed run never touches the config

use std::path::Path;
use std::time::Duration;

use tracing::Instrument;
use uuid::Uuid;

use crate::cloud::{in_service_instances, metadata, AutoscalingApi};
use crate::config::AutoscaleConfig;
use crate::error::AutoscaleResult;
use crate::reconcile::{reconcile_health, StateSource};
use crate::render::{join_server_lines, render_server_lines, substitute};
use crate::render::output::OutputTarget;

/// What one run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub region: String,
    /// Instances reported unhealthy, in the order they were reported.
    pub unhealthy: Vec<String>,
    /// Server lines written to the config.
    pub servers: usize,
}

/// Region from the override, otherwise from instance metadata.
pub async fn resolve_region(config: &AutoscaleConfig) -> AutoscaleResult<String> {
    match &config.region {
        Some(region) => Ok(region.clone()),
        None => {
            let timeout = Duration::from_secs(config.metadata.timeout_secs);
            metadata::detect_region(&config.metadata.url, timeout).await
        }
    }
}

/// Run the whole pass for groups whose name starts with `asg_prefix`.
pub async fn run(
    config: &AutoscaleConfig,
    asg_prefix: &str,
    output: &OutputTarget,
    api: &dyn AutoscalingApi,
) -> AutoscaleResult<RunReport> {
    let span = tracing::info_span!("run", run_id = %Uuid::new_v4(), asg_prefix);
    run_steps(config, asg_prefix, output, api).instrument(span).await
}

async fn run_steps(
    config: &AutoscaleConfig,
    asg_prefix: &str,
    output: &OutputTarget,
    api: &dyn AutoscalingApi,
) -> AutoscaleResult<RunReport> {
    let region = resolve_region(config).await?;
    tracing::info!(region = %region, "Starting run");

    let template = tokio::fs::read_to_string(Path::new(&config.render.template_path)).await?;

    let unhealthy = if config.admin.reconcile {
        let source = StateSource::from(&config.admin);
        reconcile_health(api, &source, &region, config.cloud.respect_grace_period).await?
    } else {
        Vec::new()
    };

    let instances = in_service_instances(api, asg_prefix, &region).await?;
    let lines = render_server_lines(&instances, &config.render.server_line)?;
    let servers = join_server_lines(&lines, &config.render.indent);
    let rendered = substitute(&template, &[(config.render.placeholder.as_str(), servers.as_str())])?;

    output.write(&rendered).await?;

    tracing::info!(
        servers = lines.len(),
        unhealthy = unhealthy.len(),
        "Run complete"
    );

    Ok(RunReport {
        region,
        unhealthy,
        servers: lines.len(),
    })
}
