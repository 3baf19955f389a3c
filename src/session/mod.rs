//! Command exchange engine driving one configuration session

pub mod engine;
pub mod error;
pub mod options;
pub mod result;

pub use engine::{apply_profile, query_rssi, query_version, run_session};
pub use error::SessionError;
pub use options::RunOptions;
pub use result::{FailureReason, SessionResult, StepKind, StepRecord};
