//! Persistence of the last applied configuration

pub mod config;

pub use config::{ConfigError, FileProfileStore, ProfileStore};
