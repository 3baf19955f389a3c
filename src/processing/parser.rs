use crate::core::constants::SUCCESS_MARKER;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of one command/response round-trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeOutcome {
    /// Reply carried the success marker
    Acknowledged,
    /// A reply arrived but it was negative or unrecognised
    Rejected,
    /// Nothing was read before the read timeout
    Timeout,
}

impl ExchangeOutcome {
    pub fn is_acknowledged(self) -> bool {
        self == ExchangeOutcome::Acknowledged
    }
}

/// How strictly replies are checked for the success marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerPolicy {
    /// The status field of a reply line (the text after `:` or `=`) must
    /// start with `0`. Lines echoing a command are ignored.
    #[default]
    Strict,
    /// Any `0` byte anywhere in the reply counts as success.
    Lenient,
}

/// Errors that can occur while parsing query replies
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no reply received")]
    Empty,
    #[error("invalid reply format: {details}")]
    InvalidFormat { details: String },
}

/// Parser for SA818 textual replies
#[derive(Debug, Clone, Default)]
pub struct ResponseParser {
    policy: MarkerPolicy,
}

impl ResponseParser {
    pub fn new(policy: MarkerPolicy) -> Self {
        Self { policy }
    }

    /// Classify a raw reply.
    ///
    /// This is the single success-marker check used for every command.
    pub fn classify(&self, reply: &[u8]) -> ExchangeOutcome {
        if reply.is_empty() {
            return ExchangeOutcome::Timeout;
        }

        let acknowledged = match self.policy {
            MarkerPolicy::Lenient => reply.contains(&SUCCESS_MARKER),
            MarkerPolicy::Strict => reply_lines(reply)
                .filter(|line| !is_echo(line))
                .filter_map(status_field)
                .any(|status| status.as_bytes().first() == Some(&SUCCESS_MARKER)),
        };

        if acknowledged {
            ExchangeOutcome::Acknowledged
        } else {
            ExchangeOutcome::Rejected
        }
    }

    /// Parse an `RSSI=<n>` reply
    pub fn parse_rssi(&self, reply: &[u8]) -> Result<u8, ParseError> {
        let value = self.find_field(reply, "RSSI=")?;
        value.parse().map_err(|_| ParseError::InvalidFormat {
            details: format!("RSSI value '{}' is not in 0-255", value),
        })
    }

    /// Parse a `+VERSION:<text>` reply
    pub fn parse_version(&self, reply: &[u8]) -> Result<String, ParseError> {
        let version = self.find_field(reply, "+VERSION:")?;
        if version.is_empty() {
            return Err(ParseError::InvalidFormat {
                details: "empty version string".to_string(),
            });
        }
        Ok(version)
    }

    fn find_field(&self, reply: &[u8], prefix: &str) -> Result<String, ParseError> {
        if reply.is_empty() {
            return Err(ParseError::Empty);
        }

        reply_lines(reply)
            .find_map(|line| line.strip_prefix(prefix).map(|v| v.trim().to_string()))
            .ok_or_else(|| ParseError::InvalidFormat {
                details: format!(
                    "expected '{}' in reply {:?}",
                    prefix,
                    String::from_utf8_lossy(reply)
                ),
            })
    }
}

/// Non-empty, trimmed text lines of a reply
fn reply_lines(reply: &[u8]) -> impl Iterator<Item = &str> {
    // Non UTF-8 noise on the line can never carry a marker
    reply
        .split(|&b| b == b'\r' || b == b'\n')
        .filter_map(|line| std::str::from_utf8(line).ok())
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

/// Commands echoed back by the module start like the commands themselves
fn is_echo(line: &str) -> bool {
    line.starts_with("AT") || line.starts_with("S+") || line.ends_with('?')
}

fn status_field(line: &str) -> Option<&str> {
    line.find(|c: char| c == ':' || c == '=').map(|pos| line[pos + 1..].trim())
}
