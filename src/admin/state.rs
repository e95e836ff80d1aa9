//! Server-state dump parsing.
//!
//! # Responsibilities
//! - Turn the text of `show servers state` into `ServerStateRecord`s
//! - Select the identifiers of servers HAProxy considers down
//!
//! # Design Decisions
//! - Blank lines and `#` header lines are skipped, never malformed
//! - Any other line that cannot be read aborts the whole parse
//! - Any nonzero health-check status counts as healthy

use crate::error::{AutoscaleError, AutoscaleResult};

/// Position of the server name within a state line.
pub const SERVER_NAME_FIELD: usize = 3;

/// Position of the health-check status within a state line.
pub const CHECK_STATUS_FIELD: usize = 5;

/// One backend server as reported by the state dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStateRecord {
    /// Server name; operators register servers under their instance ID.
    pub server_identifier: String,
    /// Whether HAProxy's health check currently passes.
    pub is_healthy: bool,
}

impl ServerStateRecord {
    /// Parse a single non-blank state line.
    pub fn from_line(line: &str) -> AutoscaleResult<Self> {
        let malformed = || AutoscaleError::MalformedServerStateLine {
            line: line.to_string(),
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() <= CHECK_STATUS_FIELD {
            return Err(malformed());
        }

        let status: i64 = fields[CHECK_STATUS_FIELD].parse().map_err(|_| malformed())?;

        Ok(Self {
            server_identifier: fields[SERVER_NAME_FIELD].to_string(),
            is_healthy: status != 0,
        })
    }
}

/// Parse a full state dump into records, preserving line order.
///
/// Malformed lines are reported with their literal text.
pub fn parse_server_state(text: &str) -> AutoscaleResult<Vec<ServerStateRecord>> {
    text.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(ServerStateRecord::from_line)
        .collect()
}

/// Identifiers of every unhealthy record, in input order, duplicates kept.
pub fn unhealthy_identifiers(records: &[ServerStateRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|record| !record.is_healthy)
        .map(|record| record.server_identifier.clone())
        .collect()
}
