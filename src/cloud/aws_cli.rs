//! `AutoscalingApi` backed by the `aws` command line tool.
//!
//! # Responsibilities
//! - Run `aws autoscaling` / `aws ec2` subcommands with JSON output
//! - Decode their responses into provider types
//!
//! # Design Decisions
//! - Credentials and pagination are left to the `aws` tool
//! - A non-zero exit status is an error carrying the tool's stderr

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::cloud::{AutoscalingApi, AutoscalingInstance, Instance};
use crate::error::{AutoscaleError, AutoscaleResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeAutoScalingInstances {
    #[serde(rename = "AutoScalingInstances", default)]
    instances: Vec<AutoscalingInstance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstances {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<Ec2Instance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Ec2Instance {
    instance_id: String,
    #[serde(default)]
    private_ip_address: Option<String>,
}

/// Autoscaling client that shells out to the AWS CLI.
#[derive(Debug, Clone)]
pub struct AwsCli {
    binary: String,
}

impl AwsCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    async fn run(&self, args: &[&str]) -> AutoscaleResult<Vec<u8>> {
        tracing::debug!(binary = %self.binary, ?args, "Invoking AWS CLI");

        let output = tokio::process::Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| AutoscaleError::CloudApi(format!("failed to run {}: {}", self.binary, e)))?;

        if !output.status.success() {
            return Err(AutoscaleError::CloudApi(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(output.stdout)
    }

    async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> AutoscaleResult<T> {
        let stdout = self.run(args).await?;
        serde_json::from_slice(&stdout)
            .map_err(|e| AutoscaleError::CloudApi(format!("unexpected AWS CLI output: {}", e)))
    }
}

impl Default for AwsCli {
    fn default() -> Self {
        Self::new("aws")
    }
}

#[async_trait]
impl AutoscalingApi for AwsCli {
    async fn describe_autoscaling_instances(&self, region: &str) -> AutoscaleResult<Vec<AutoscalingInstance>> {
        let response: DescribeAutoScalingInstances = self
            .run_json(&[
                "autoscaling",
                "describe-auto-scaling-instances",
                "--region",
                region,
                "--output",
                "json",
            ])
            .await?;
        Ok(response.instances)
    }

    async fn private_addresses(&self, region: &str, instance_ids: &[String]) -> AutoscaleResult<Vec<Instance>> {
        let mut args = vec!["ec2", "describe-instances", "--region", region, "--output", "json", "--instance-ids"];
        args.extend(instance_ids.iter().map(String::as_str));

        let response: DescribeInstances = self.run_json(&args).await?;
        Ok(flatten_reservations(response))
    }

    async fn set_instance_unhealthy(
        &self,
        region: &str,
        instance_id: &str,
        respect_grace_period: bool,
    ) -> AutoscaleResult<()> {
        let grace_flag = if respect_grace_period {
            "--should-respect-grace-period"
        } else {
            "--no-should-respect-grace-period"
        };

        self.run(&[
            "autoscaling",
            "set-instance-health",
            "--region",
            region,
            "--instance-id",
            instance_id,
            "--health-status",
            "Unhealthy",
            grace_flag,
        ])
        .await?;
        Ok(())
    }
}

fn flatten_reservations(response: DescribeInstances) -> Vec<Instance> {
    response
        .reservations
        .into_iter()
        .flat_map(|r| r.instances)
        .map(|i| Instance {
            instance_id: i.instance_id,
            private_ip: i.private_ip_address.filter(|ip| !ip.is_empty()),
        })
        .collect()
}
