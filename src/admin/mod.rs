//! HAProxy admin socket subsystem.
//!
//! # Data Flow
//! ```text
//! session.rs: open socket → "show servers state <backend>\r\n" → read to EOF → close
//!     → state.rs: parse dump → ServerStateRecord per line
//!     → unhealthy_identifiers → reconcile.rs
//! ```

pub mod session;
pub mod state;

pub use session::{exchange, AdminSession};
pub use state::{parse_server_state, unhealthy_identifiers, ServerStateRecord};

/// Build the state dump command for one backend.
pub fn show_servers_state(backend: &str) -> String {
    format!("show servers state {backend}")
}
