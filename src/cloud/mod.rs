//! Cloud provider subsystem.
//!
//! # Data Flow
//! ```text
//! metadata.rs: availability zone → region
//! AutoscalingApi (aws_cli.rs):
//!     describe instances → prefix + InService filter
//!     → private address lookup → Vec<Instance>
//!     set instance health ← reconcile.rs
//! ```
//!
//! # Design Decisions
//! - The provider sits behind a trait so runs can be exercised without AWS
//! - Group membership is a name prefix match, not an exact name

pub mod aws_cli;
pub mod metadata;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AutoscaleResult;

pub use aws_cli::AwsCli;

/// Lifecycle state of an instance inside its autoscaling group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum LifecycleState {
    Pending,
    InService,
    Terminating,
    Terminated,
    Detaching,
    Detached,
    EnteringStandby,
    Standby,
    #[serde(other)]
    Other,
}

/// Autoscaling group membership of one instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutoscalingInstance {
    pub instance_id: String,
    #[serde(rename = "AutoScalingGroupName")]
    pub group_name: String,
    pub lifecycle_state: LifecycleState,
}

/// An instance and its private address, if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub instance_id: String,
    pub private_ip: Option<String>,
}

/// Operations the run needs from the autoscaling provider.
#[async_trait]
pub trait AutoscalingApi: Send + Sync {
    /// Every autoscaling instance visible in `region`.
    async fn describe_autoscaling_instances(&self, region: &str) -> AutoscaleResult<Vec<AutoscalingInstance>>;

    /// Private addresses for the given instance IDs.
    async fn private_addresses(&self, region: &str, instance_ids: &[String]) -> AutoscaleResult<Vec<Instance>>;

    /// Report an instance as unhealthy to its autoscaling group.
    async fn set_instance_unhealthy(
        &self,
        region: &str,
        instance_id: &str,
        respect_grace_period: bool,
    ) -> AutoscaleResult<()>;
}

/// In-service instances of groups whose name starts with `prefix`, as
/// `(instance_id, private_ip)` pairs. Instances without an address are dropped.
pub async fn in_service_instances(
    api: &dyn AutoscalingApi,
    prefix: &str,
    region: &str,
) -> AutoscaleResult<Vec<(String, String)>> {
    let members = api.describe_autoscaling_instances(region).await?;
    let instance_ids: Vec<String> = members
        .into_iter()
        .filter(|i| i.group_name.starts_with(prefix))
        .filter(|i| i.lifecycle_state == LifecycleState::InService)
        .map(|i| i.instance_id)
        .collect();

    if instance_ids.is_empty() {
        tracing::warn!(prefix, region, "No in-service instances found");
        return Ok(Vec::new());
    }

    let instances = api.private_addresses(region, &instance_ids).await?;
    let total = instances.len();
    let addressed: Vec<(String, String)> = instances
        .into_iter()
        .filter_map(|i| i.private_ip.map(|ip| (i.instance_id, ip)))
        .collect();

    if addressed.len() < total {
        tracing::warn!(dropped = total - addressed.len(), "Skipping instances without a private address");
    }

    Ok(addressed)
}

/// Ask the autoscaling group to replace `instance_id`.
pub async fn mark_unhealthy(
    api: &dyn AutoscalingApi,
    region: &str,
    instance_id: &str,
    respect_grace_period: bool,
) -> AutoscaleResult<()> {
    api.set_instance_unhealthy(region, instance_id, respect_grace_period)
        .await?;
    tracing::info!(instance_id, region, "Marked instance unhealthy");
    Ok(())
}
