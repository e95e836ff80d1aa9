//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI flags override individual fields
//!     → AutoscaleConfig (validated, immutable for the run)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults, so no file is needed at all
//! - Validation separates syntactic (serde) from semantic checks
//! - Overrides are validated again after they are applied

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::AutoscaleConfig;
pub use schema::{AdminConfig, CloudConfig, MetadataConfig, ObservabilityConfig, RenderConfig};
