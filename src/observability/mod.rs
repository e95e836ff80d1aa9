//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (session open/close, remediation, run summary)
//!     → one span per run carrying a run ID
//!
//! Consumers:
//!     → logging.rs subscriber (stderr)
//! ```

pub mod logging;
