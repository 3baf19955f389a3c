//! SA818 Module Configuration
//! 
//! Configures SA818 radio transceiver modules over a serial link by sending
//! a fixed sequence of AT commands and checking their acknowledgements.

pub mod core;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod hardware;
pub mod session;
pub mod api;

// Re-export commonly used types
pub use crate::core::{Bandwidth, ConfigurationProfile, FilterConfig, Frequency, SubAudioCode};
pub use crate::hardware::{Channel, CommError, MockChannel, SerialChannel, SerialSettings};
pub use crate::processing::{Command, ExchangeOutcome, MarkerPolicy};
pub use crate::session::{apply_profile, run_session, RunOptions, SessionError, SessionResult};
pub use crate::utils::{FileProfileStore, ProfileStore};
