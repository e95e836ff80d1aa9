//! haproxy-autoscale
//!
//! Regenerates an HAProxy config from the in-service instances of an AWS
//! autoscaling group, after reporting any server HAProxy considers down back
//! to the group so it gets replaced.
//!
//! ```text
//!   instance metadata ──▶ region
//!                            │
//!   admin socket ──▶ server state ──▶ unhealthy ──▶ set-instance-health
//!                            │
//!   autoscaling group ──▶ in-service instances ──▶ server lines
//!                                                      │
//!   template file ───────────────────────────────▶ haproxy.cfg
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use haproxy_autoscale::cloud::AwsCli;
use haproxy_autoscale::config::{load_or_default, validation::validate_config, AutoscaleConfig, ConfigError};
use haproxy_autoscale::observability::logging;
use haproxy_autoscale::render::output::OutputTarget;
use haproxy_autoscale::AutoscaleError;

#[derive(Parser)]
#[command(name = "haproxy-autoscale")]
#[command(about = "Auto-scaling HAProxy configuration.", long_about = None)]
struct Cli {
    /// The name that the auto-scaling group starts with.
    asgname: String,

    /// The AWS region from which to fetch ASG instances. Defaults to fetching region from instance metadata.
    #[arg(long)]
    region: Option<String>,

    /// Path to haproxy template file; replaces ${vars}.
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Path to output file. Default: stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to the HAProxy admin socket.
    #[arg(short, long)]
    socket: Option<PathBuf>,

    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip marking HAProxy-down instances as unhealthy.
    #[arg(long)]
    no_reconcile: bool,
}

impl Cli {
    fn apply(&self, config: &mut AutoscaleConfig) {
        if let Some(region) = &self.region {
            config.region = Some(region.clone());
        }
        if let Some(template) = &self.template {
            config.render.template_path = template.to_string_lossy().into_owned();
        }
        if let Some(socket) = &self.socket {
            config.admin.socket_path = socket.to_string_lossy().into_owned();
        }
        if self.no_reconcile {
            config.admin.reconcile = false;
        }
    }
}

fn build_config(cli: &Cli) -> Result<AutoscaleConfig, ConfigError> {
    let mut config = load_or_default(cli.config.as_deref())?;
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[error] {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability.log_level);

    let api = AwsCli::new(config.cloud.aws_binary.clone());
    let output = OutputTarget::from_path(cli.output.clone());

    match haproxy_autoscale::run(&config, &cli.asgname, &output, &api).await {
        Ok(report) => {
            tracing::debug!(?report, "Finished");
            ExitCode::SUCCESS
        }
        Err(AutoscaleError::MetadataUnavailable(reason)) => {
            eprintln!(
                "[error] Unable to fetch instance metadata ({}). If you are not running this on an EC2 instance, you need to supply the --region command line argument.",
                reason
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            eprintln!("[error] {}", e);
            ExitCode::FAILURE
        }
    }
}
