//! Reporting surface for session results
//! 
//! Human-readable status lines for the terminal and a JSON rendering for
//! scripts driving the tool.

pub mod formatting;

pub use formatting::{JsonFormatter, SessionReport, TextFormatter};
