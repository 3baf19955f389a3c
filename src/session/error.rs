use crate::hardware::CommError;
use crate::utils::config::ConfigError;
use crate::validation::ValidationError;
use thiserror::Error;

/// Fatal errors that end a session before or during the exchange
///
/// Per-step rejections and timeouts are not errors; they are recorded in
/// the [`SessionResult`](crate::session::SessionResult).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("channel failure: {0}")]
    Comm(#[from] CommError),

    #[error("invalid profile: {0}")]
    Validation(#[from] ValidationError),

    #[error("could not persist applied profile: {0}")]
    Persistence(#[from] ConfigError),

    #[error("invalid run options: {reason}")]
    InvalidOptions { reason: String },

    #[error("no channel to the device and dry-run is off")]
    NoChannel,
}
