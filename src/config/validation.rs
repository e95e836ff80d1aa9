//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0)
//! - Check templates and URLs before a run touches anything
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AutoscaleConfig → Result<(), Vec<ValidationError>>

use crate::config::schema::AutoscaleConfig;
use crate::render::{is_identifier, LineTemplate};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check every semantic constraint and collect all failures.
pub fn validate_config(config: &AutoscaleConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.admin.timeout_secs == 0 {
        errors.push(ValidationError::new("admin.timeout_secs", "must be greater than 0"));
    }
    if config.admin.socket_path.trim().is_empty() {
        errors.push(ValidationError::new("admin.socket_path", "must not be empty"));
    }
    if config.admin.backend.trim().is_empty() {
        errors.push(ValidationError::new("admin.backend", "must not be empty"));
    }

    if config.metadata.timeout_secs == 0 {
        errors.push(ValidationError::new("metadata.timeout_secs", "must be greater than 0"));
    }
    match url::Url::parse(&config.metadata.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "metadata.url",
            format!("unsupported scheme {:?}", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("metadata.url", e.to_string())),
    }

    if let Err(e) = LineTemplate::server_line(&config.render.server_line) {
        errors.push(ValidationError::new("render.server_line", e.to_string()));
    }
    if !is_identifier(&config.render.placeholder) {
        errors.push(ValidationError::new(
            "render.placeholder",
            format!("{:?} is not a valid placeholder name", config.render.placeholder),
        ));
    }

    if config.cloud.aws_binary.trim().is_empty() {
        errors.push(ValidationError::new("cloud.aws_binary", "must not be empty"));
    }

    if let Some(region) = &config.region {
        if region.trim().is_empty() {
            errors.push(ValidationError::new("region", "must not be empty when set"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
