//! Channel interface trait and serial line settings

use crate::hardware::{CommError, CommResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Duplex byte channel to an SA818 module.
///
/// One call is one logical round-trip and the only unit of I/O the engine
/// uses. Implementations never retry.
pub trait Channel {
    /// Write `payload` fully, wait `settle_delay`, read at most
    /// `response_capacity` bytes with a bounded read timeout, wait
    /// `settle_delay` again and return what was read.
    ///
    /// A read that times out is not an error: it yields an empty reply.
    fn exchange(
        &mut self,
        payload: &[u8],
        response_capacity: usize,
        settle_delay: Duration,
    ) -> CommResult<Vec<u8>>;

    /// Human readable identity for logs
    fn describe(&self) -> String;
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn exchange(
        &mut self,
        payload: &[u8],
        response_capacity: usize,
        settle_delay: Duration,
    ) -> CommResult<Vec<u8>> {
        (**self).exchange(payload, response_capacity, settle_delay)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Parity setting for the UART
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    None,
    Odd,
    Even,
}

/// UART parameters for the module link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialSettings {
    /// Baud rate for serial communication
    pub baud_rate: u32,
    /// Data bits per character (5-8)
    pub data_bits: u8,
    pub parity: Parity,
    /// Stop bits (1 or 2)
    pub stop_bits: u8,
    /// Hardware flow control (RTS/CTS)
    pub flow_control: bool,
    /// Upper bound for a single blocking read (milliseconds)
    pub read_timeout_ms: u64,
}

impl Default for SerialSettings {
    /// 9600 8N1, no flow control, 0.5 s read timeout
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: 1,
            flow_control: false,
            read_timeout_ms: 500,
        }
    }
}

impl SerialSettings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn validate(&self) -> CommResult<()> {
        if self.baud_rate == 0 {
            return Err(CommError::ConfigurationError {
                parameter: "baud_rate".to_string(),
                value: self.baud_rate.to_string(),
            });
        }

        if !(5..=8).contains(&self.data_bits) {
            return Err(CommError::ConfigurationError {
                parameter: "data_bits".to_string(),
                value: self.data_bits.to_string(),
            });
        }

        if !matches!(self.stop_bits, 1 | 2) {
            return Err(CommError::ConfigurationError {
                parameter: "stop_bits".to_string(),
                value: self.stop_bits.to_string(),
            });
        }

        // A zero timeout would turn every read into a poll or, on some
        // platforms, an unbounded wait.
        if self.read_timeout_ms == 0 {
            return Err(CommError::ConfigurationError {
                parameter: "read_timeout_ms".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }
}
