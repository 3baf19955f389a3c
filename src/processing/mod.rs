//! AT command encoding and reply parsing

pub mod command;
pub mod parser;

pub use command::Command;
pub use parser::{ExchangeOutcome, MarkerPolicy, ParseError, ResponseParser};
