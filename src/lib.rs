//! HAProxy configuration from AWS autoscaling groups.

pub mod admin;
pub mod cloud;
pub mod config;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod reconcile;
pub mod render;

pub use config::schema::AutoscaleConfig;
pub use error::{AutoscaleError, AutoscaleResult};
pub use pipeline::{run, RunReport};
