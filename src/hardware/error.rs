//! Communication error types and handling

use thiserror::Error;

/// Communication error types for the serial channel
#[derive(Debug, Error)]
pub enum CommError {
    /// The device node could not be opened
    #[error("cannot open {path}: {reason}")]
    DeviceUnavailable { path: String, reason: String },

    /// The port refused the requested line parameters
    #[error("configuration error: invalid {parameter} = {value}")]
    ConfigurationError { parameter: String, value: String },

    /// Read or write failed for a reason other than a read timeout
    #[error("i/o error during {operation}")]
    Io {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Response buffer bound is unusable
    #[error("buffer error during {operation}")]
    BufferError { operation: String },
}

/// Result type for communication operations
pub type CommResult<T> = Result<T, CommError>;
