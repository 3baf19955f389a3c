use thiserror::Error;

/// A profile field that cannot be sent to the module
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value parsed but falls outside what the firmware accepts
    #[error("{field} = {value} is out of range (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Value could not be parsed at all
    #[error("invalid {field} '{value}': {reason}")]
    Malformed {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// Transmit and receive frequencies belong to different module variants
    #[error("tx frequency {tx} and rx frequency {rx} are not in the same band")]
    BandMismatch { tx: String, rx: String },
}
