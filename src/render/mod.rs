//! HAProxy config rendering.
//!
//! # Data Flow
//! ```text
//! (instance_id, private_ip) pairs
//!     → LineTemplate ("server %s %s:8443 check port 8000")
//!     → joined with newline + indentation
//!     → substitute into the template file's ${servers} placeholder
//!     → output.rs (stdout or all-or-nothing file replace)
//! ```
//!
//! # Design Decisions
//! - Templates are checked before any value is formatted
//! - Unknown or unterminated placeholders fail instead of passing through

pub mod output;

use crate::error::{AutoscaleError, AutoscaleResult};

/// Server line used when none is configured.
pub const DEFAULT_SERVER_LINE: &str = "server %s %s:8443 check port 8000";

/// Indentation placed before every server line after the first.
pub const DEFAULT_INDENT: &str = "  ";

/// Number of `%s` slots a server line must have: identifier, then address.
pub const SERVER_LINE_SLOTS: usize = 2;

/// A printf-style line template made of literal text and `%s` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTemplate {
    /// Literal text around the slots; always one longer than the slot count.
    literals: Vec<String>,
}

impl LineTemplate {
    /// Parse `source`, accepting `%s` slots and `%%` escapes only.
    pub fn parse(source: &str) -> AutoscaleResult<Self> {
        let mut literals = Vec::new();
        let mut current = String::new();
        let mut chars = source.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                current.push(c);
                continue;
            }
            match chars.next() {
                Some('s') => literals.push(std::mem::take(&mut current)),
                Some('%') => current.push('%'),
                other => {
                    let conversion = other.map(|c| format!("%{c}")).unwrap_or_else(|| "%".to_string());
                    return Err(AutoscaleError::TemplateMismatch(format!(
                        "unsupported conversion {:?} in line template {:?}",
                        conversion, source
                    )));
                }
            }
        }

        literals.push(current);
        Ok(Self { literals })
    }

    /// Parse a server line and check it has exactly two slots.
    pub fn server_line(source: &str) -> AutoscaleResult<Self> {
        let template = Self::parse(source)?;
        if template.slots() != SERVER_LINE_SLOTS {
            return Err(AutoscaleError::TemplateMismatch(format!(
                "server line {:?} has {} slots, expected {}",
                source,
                template.slots(),
                SERVER_LINE_SLOTS
            )));
        }
        Ok(template)
    }

    pub fn slots(&self) -> usize {
        self.literals.len() - 1
    }

    /// Fill the slots in order with `values`.
    pub fn format(&self, values: &[&str]) -> AutoscaleResult<String> {
        if values.len() != self.slots() {
            return Err(AutoscaleError::TemplateMismatch(format!(
                "{} values supplied for {} slots",
                values.len(),
                self.slots()
            )));
        }

        let mut line = self.literals[0].clone();
        for (value, literal) in values.iter().zip(&self.literals[1..]) {
            line.push_str(value);
            line.push_str(literal);
        }
        Ok(line)
    }
}

/// One formatted line per `(identifier, address)` pair, in input order.
pub fn render_server_lines(instances: &[(String, String)], server_line: &str) -> AutoscaleResult<Vec<String>> {
    let template = LineTemplate::server_line(server_line)?;
    instances
        .iter()
        .map(|(id, ip)| template.format(&[id.as_str(), ip.as_str()]))
        .collect()
}

/// Join lines for embedding in an indented block of the config template.
pub fn join_server_lines(lines: &[String], indent: &str) -> String {
    lines.join(&format!("\n{indent}"))
}

/// Replace `$name` and `${name}` placeholders in `template` with `vars`.
/// `$$` yields a literal `$`.
pub fn substitute(template: &str, vars: &[(&str, &str)]) -> AutoscaleResult<String> {
    let lookup = |name: &str| {
        vars.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| AutoscaleError::TemplateMismatch(format!("no value for placeholder ${name}")))
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
        } else if let Some(braced) = after.strip_prefix('{') {
            let end = braced.find('}').ok_or_else(|| {
                AutoscaleError::TemplateMismatch("unterminated ${ placeholder".to_string())
            })?;
            let name = &braced[..end];
            if !is_identifier(name) {
                return Err(AutoscaleError::TemplateMismatch(format!("invalid placeholder ${{{name}}}")));
            }
            out.push_str(lookup(name)?);
            rest = &braced[end + 1..];
        } else {
            let len = identifier_len(after);
            if len == 0 {
                return Err(AutoscaleError::TemplateMismatch(format!(
                    "invalid placeholder at byte {}",
                    template.len() - rest.len() + pos
                )));
            }
            out.push_str(lookup(&after[..len])?);
            rest = &after[len..];
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Whether `name` is usable as a placeholder name.
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty() && identifier_len(name) == name.len()
}

fn identifier_len(s: &str) -> usize {
    let mut len = 0;
    for (i, c) in s.char_indices() {
        let ok = c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit());
        if !ok {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}
