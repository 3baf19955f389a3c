//! Session output formatting and serialization

use crate::core::ConfigurationProfile;
use crate::session::{SessionResult, StepRecord};
use serde::Serialize;

/// Everything reported about one run
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport<'a> {
    pub device: &'a str,
    pub profile: &'a ConfigurationProfile,
    pub result: &'a SessionResult,
}

/// Plain text formatter for terminal output
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    /// Also print the raw reply of each step
    pub show_replies: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies() -> Self {
        Self { show_replies: true }
    }

    /// One status line for a step
    pub fn format_step(&self, step: &StepRecord) -> String {
        let mark = if step.outcome.is_acknowledged() {
            "  ok "
        } else if step.kind.is_mandatory() {
            "FAIL "
        } else {
            " info"
        };

        let mut line = format!("[{}] {:<10} {:<18} {}", mark, step.kind.label(), step.status(), step.command);
        if self.show_replies && !step.reply.is_empty() {
            line.push_str(&format!("  <- {}", step.reply));
        }
        line
    }

    /// Final one-line verdict
    pub fn format_summary(&self, result: &SessionResult) -> String {
        let prefix = if result.is_dry_run() { "dry run: " } else { "" };
        match result.failure() {
            None if result.overall_success() => {
                format!("{}configuration applied successfully", prefix)
            }
            None => format!("{}configuration incomplete", prefix),
            Some(reason) => format!("{}configuration failed ({})", prefix, reason),
        }
    }

    /// Per-step breakdown followed by the summary
    pub fn format_report(&self, report: &SessionReport<'_>) -> String {
        let mut output = format!("SA818 on {}\n", report.device);
        for step in report.result.steps() {
            output.push_str(&self.format_step(step));
            output.push('\n');
        }
        output.push_str(&self.format_summary(report.result));
        output.push('\n');
        output
    }
}

/// JSON formatter for machine consumption
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Pretty print JSON
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pretty-printing JSON formatter
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn format_json(&self, report: &SessionReport<'_>) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::MockChannel;
    use crate::session::{run_session, RunOptions, StepKind};
    use std::time::Duration;

    fn session(channel: &mut MockChannel) -> SessionResult {
        let options = RunOptions::default().with_settle_delay(Duration::ZERO);
        run_session(Some(channel), &ConfigurationProfile::default(), &options).unwrap()
    }

    #[test]
    fn test_text_report() {
        let mut channel = MockChannel::new();
        channel
            .push_reply("+DMOCONNECT:0")
            .push_reply("+DMOSETGROUP:0")
            .push_reply("S=1");
        let result = session(&mut channel);
        let profile = ConfigurationProfile::default();

        let text = TextFormatter::new().format_report(&SessionReport {
            device: "/dev/ttyUSB0",
            profile: &profile,
            result: &result,
        });

        assert!(text.starts_with("SA818 on /dev/ttyUSB0\n"));
        assert_eq!(text.lines().count(), 7);
        assert!(text.contains("channel not found"));
        assert!(text.contains("AT+DMOSETVOLUME=8"));
        assert!(text.trim_end().ends_with("configuration applied successfully"));
    }

    #[test]
    fn test_failed_step_is_marked() {
        let mut channel = MockChannel::new();
        channel.push_reply("+DMOCONNECT:0").push_silence();
        let result = session(&mut channel);

        let formatter = TextFormatter::with_replies();
        let line = formatter.format_step(result.step(StepKind::SetGroup).unwrap());
        assert!(line.starts_with("[FAIL ]"));
        assert!(line.contains("device unresponsive"));

        let line = formatter.format_step(result.step(StepKind::Connect).unwrap());
        assert!(line.ends_with("<- +DMOCONNECT:0"));

        assert_eq!(
            formatter.format_summary(&result),
            "configuration failed (failed steps: set group)"
        );
    }

    #[test]
    fn test_json_report() {
        let mut channel = MockChannel::silent();
        let result = session(&mut channel);
        let profile = ConfigurationProfile::default();
        let report = SessionReport {
            device: "mock",
            profile: &profile,
            result: &result,
        };

        let json = JsonFormatter::new().format_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["device"], "mock");
        assert_eq!(value["profile"]["volume"], 8);
        assert_eq!(value["result"]["overall_success"], false);
        assert_eq!(value["result"]["failure"]["reason"], "handshake_failed");
        assert_eq!(value["result"]["failure"]["outcome"], "timeout");
        assert_eq!(value["result"]["steps"][0]["kind"], "connect");
        assert_eq!(value["result"]["steps"][0]["outcome"], "timeout");
    }
}
