//! Core types and constants for SA818 module configuration

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
