//! Hardware abstraction layer for the SA818 serial link
//! 
//! This module provides the channel contract used by the command exchange
//! engine: a blocking write, settle, bounded read, settle round-trip.

pub mod channel;
pub mod serial;
pub mod mock;
pub mod error;

pub use channel::{Channel, Parity, SerialSettings};
pub use serial::SerialChannel;
pub use mock::{MockChannel, MockReply};
pub use error::{CommError, CommResult};
