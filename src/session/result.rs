//! Per-step records and their aggregation into one session outcome

use crate::processing::ExchangeOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Steps of a configuration session, in the order they are issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Connect,
    SetGroup,
    Scan,
    SetVolume,
    SetFilter,
}

impl StepKind {
    pub const SEQUENCE: [StepKind; 5] = [
        StepKind::Connect,
        StepKind::SetGroup,
        StepKind::Scan,
        StepKind::SetVolume,
        StepKind::SetFilter,
    ];

    /// Mandatory steps decide overall success; the scan is advisory
    pub fn is_mandatory(self) -> bool {
        self != StepKind::Scan
    }

    pub fn label(self) -> &'static str {
        match self {
            StepKind::Connect => "connect",
            StepKind::SetGroup => "set group",
            StepKind::Scan => "scan",
            StepKind::SetVolume => "set volume",
            StepKind::SetFilter => "set filter",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One round-trip as it happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub kind: StepKind,
    /// Command text without line terminator
    pub command: String,
    /// Reply text, lossily decoded and trimmed
    pub reply: String,
    pub outcome: ExchangeOutcome,
}

impl StepRecord {
    pub fn new(kind: StepKind, command: String, reply: &[u8], outcome: ExchangeOutcome) -> Self {
        Self {
            kind,
            command,
            reply: String::from_utf8_lossy(reply).trim().to_string(),
            outcome,
        }
    }

    /// Short status word shown to the user
    pub fn status(&self) -> &'static str {
        match (self.kind, self.outcome) {
            (StepKind::Scan, ExchangeOutcome::Acknowledged) => "channel found",
            (StepKind::Scan, ExchangeOutcome::Rejected) => "channel not found",
            (StepKind::Scan, ExchangeOutcome::Timeout) => "no scan reply",
            (_, ExchangeOutcome::Acknowledged) => "ok",
            (_, ExchangeOutcome::Rejected) => "command rejected",
            (_, ExchangeOutcome::Timeout) => "device unresponsive",
        }
    }

    /// Whether this step counts against overall success
    pub fn is_failure(&self) -> bool {
        self.kind.is_mandatory() && !self.outcome.is_acknowledged()
    }
}

/// Why a session did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    /// The module did not acknowledge the handshake; nothing else was sent
    HandshakeFailed { outcome: ExchangeOutcome },
    /// One or more configuration steps were rejected or unanswered
    StepsFailed { steps: Vec<StepKind> },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::HandshakeFailed { outcome } => match outcome {
                ExchangeOutcome::Timeout => write!(f, "handshake failed: device unresponsive"),
                _ => write!(f, "handshake failed: connect rejected"),
            },
            FailureReason::StepsFailed { steps } => {
                let labels: Vec<&str> = steps.iter().map(|s| s.label()).collect();
                write!(f, "failed steps: {}", labels.join(", "))
            }
        }
    }
}

/// Aggregated outcome of one configuration run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    steps: Vec<StepRecord>,
    overall_success: bool,
    failure: Option<FailureReason>,
    dry_run: bool,
}

impl SessionResult {
    pub(crate) fn new(dry_run: bool) -> Self {
        Self {
            steps: Vec::with_capacity(StepKind::SEQUENCE.len()),
            overall_success: false,
            failure: None,
            dry_run,
        }
    }

    pub(crate) fn record(&mut self, step: StepRecord) {
        self.steps.push(step);
    }

    /// Close the session after a failed handshake
    pub(crate) fn abort_handshake(&mut self, outcome: ExchangeOutcome) {
        self.overall_success = false;
        self.failure = Some(FailureReason::HandshakeFailed { outcome });
    }

    /// Close the session after the last step
    pub(crate) fn finalize(&mut self) {
        let failed: Vec<StepKind> = self
            .steps
            .iter()
            .filter(|step| step.is_failure())
            .map(|step| step.kind)
            .collect();

        let complete = StepKind::SEQUENCE
            .iter()
            .filter(|kind| kind.is_mandatory())
            .all(|kind| self.step(*kind).is_some());

        self.overall_success = complete && failed.is_empty();
        self.failure = if failed.is_empty() {
            None
        } else {
            Some(FailureReason::StepsFailed { steps: failed })
        };
    }

    pub fn overall_success(&self) -> bool {
        self.overall_success
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        self.failure.as_ref()
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn step(&self, kind: StepKind) -> Option<&StepRecord> {
        self.steps.iter().find(|step| step.kind == kind)
    }

    /// Advisory scan result; `None` when the scan never ran
    pub fn channel_found(&self) -> Option<bool> {
        self.step(StepKind::Scan)
            .map(|step| step.outcome.is_acknowledged())
    }

    /// Encoded commands in issue order
    pub fn commands(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.command.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: StepKind, outcome: ExchangeOutcome) -> StepRecord {
        StepRecord::new(kind, kind.label().to_string(), b"", outcome)
    }

    #[test]
    fn test_scan_never_fails_session() {
        let mut result = SessionResult::new(false);
        for kind in StepKind::SEQUENCE {
            let outcome = if kind == StepKind::Scan {
                ExchangeOutcome::Rejected
            } else {
                ExchangeOutcome::Acknowledged
            };
            result.record(record(kind, outcome));
        }
        result.finalize();

        assert!(result.overall_success());
        assert_eq!(result.channel_found(), Some(false));
        assert!(result.failure().is_none());
    }

    #[test]
    fn test_failed_steps_are_listed() {
        let mut result = SessionResult::new(false);
        result.record(record(StepKind::Connect, ExchangeOutcome::Acknowledged));
        result.record(record(StepKind::SetGroup, ExchangeOutcome::Timeout));
        result.record(record(StepKind::Scan, ExchangeOutcome::Acknowledged));
        result.record(record(StepKind::SetVolume, ExchangeOutcome::Rejected));
        result.record(record(StepKind::SetFilter, ExchangeOutcome::Acknowledged));
        result.finalize();

        assert!(!result.overall_success());
        assert_eq!(
            result.failure(),
            Some(&FailureReason::StepsFailed {
                steps: vec![StepKind::SetGroup, StepKind::SetVolume]
            })
        );
    }

    #[test]
    fn test_incomplete_session_is_not_successful() {
        let mut result = SessionResult::new(false);
        result.record(record(StepKind::Connect, ExchangeOutcome::Acknowledged));
        result.finalize();
        assert!(!result.overall_success());
    }

    #[test]
    fn test_status_words() {
        assert_eq!(record(StepKind::Scan, ExchangeOutcome::Acknowledged).status(), "channel found");
        assert_eq!(record(StepKind::SetGroup, ExchangeOutcome::Timeout).status(), "device unresponsive");
        assert_eq!(record(StepKind::SetGroup, ExchangeOutcome::Rejected).status(), "command rejected");
    }
}
