//! Profile validation ahead of command encoding

pub mod data;
pub mod error;

pub use data::ProfileValidator;
pub use error::ValidationError;
