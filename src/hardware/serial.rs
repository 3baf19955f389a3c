//! Serial/UART channel backed by the `serialport` crate

use crate::hardware::{Channel, CommError, CommResult, Parity, SerialSettings};
use serialport::{ClearBuffer, DataBits, FlowControl, SerialPort, StopBits};
use std::io::{ErrorKind, Read, Write};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// Serial channel to an SA818 module
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
    path: String,
    settings: SerialSettings,
}

impl SerialChannel {
    /// Open the device node and apply `settings`
    pub fn open(path: &str, settings: &SerialSettings) -> CommResult<Self> {
        settings.validate()?;

        let port = serialport::new(path, settings.baud_rate)
            .timeout(settings.read_timeout())
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::InvalidInput => CommError::ConfigurationError {
                    parameter: "port".to_string(),
                    value: e.to_string(),
                },
                _ => CommError::DeviceUnavailable {
                    path: path.to_string(),
                    reason: e.to_string(),
                },
            })?;

        let mut channel = Self {
            port,
            path: path.to_string(),
            settings: settings.clone(),
        };
        channel.configure(settings)?;

        debug!(
            "opened {} at {} baud, read timeout {}ms",
            channel.path, settings.baud_rate, settings.read_timeout_ms
        );
        Ok(channel)
    }

    /// Apply line parameters to the open port
    pub fn configure(&mut self, settings: &SerialSettings) -> CommResult<()> {
        settings.validate()?;

        let data_bits = match settings.data_bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            _ => DataBits::Eight,
        };
        let stop_bits = match settings.stop_bits {
            2 => StopBits::Two,
            _ => StopBits::One,
        };
        let parity = match settings.parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        };
        let flow_control = if settings.flow_control {
            FlowControl::Hardware
        } else {
            FlowControl::None
        };

        let rejected = |parameter: &str, value: String| CommError::ConfigurationError {
            parameter: parameter.to_string(),
            value,
        };

        self.port
            .set_baud_rate(settings.baud_rate)
            .map_err(|e| rejected("baud_rate", e.to_string()))?;
        self.port
            .set_data_bits(data_bits)
            .map_err(|e| rejected("data_bits", e.to_string()))?;
        self.port
            .set_parity(parity)
            .map_err(|e| rejected("parity", e.to_string()))?;
        self.port
            .set_stop_bits(stop_bits)
            .map_err(|e| rejected("stop_bits", e.to_string()))?;
        self.port
            .set_flow_control(flow_control)
            .map_err(|e| rejected("flow_control", e.to_string()))?;
        self.port
            .set_timeout(settings.read_timeout())
            .map_err(|e| rejected("read_timeout_ms", e.to_string()))?;

        self.settings = settings.clone();
        Ok(())
    }
}

impl Channel for SerialChannel {
    fn exchange(
        &mut self,
        payload: &[u8],
        response_capacity: usize,
        settle_delay: Duration,
    ) -> CommResult<Vec<u8>> {
        if response_capacity == 0 {
            return Err(CommError::BufferError {
                operation: "read with zero capacity".to_string(),
            });
        }

        // Drop leftovers so a late reply to the previous command is not
        // taken for this one.
        if let Err(e) = self.port.clear(ClearBuffer::Input) {
            trace!("could not clear input buffer on {}: {}", self.path, e);
        }

        self.port
            .write_all(payload)
            .map_err(|source| CommError::Io { operation: "write", source })?;
        self.port
            .flush()
            .map_err(|source| CommError::Io { operation: "flush", source })?;

        thread::sleep(settle_delay);

        let mut reply = vec![0u8; response_capacity];
        let read = match self.port.read(&mut reply) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::TimedOut => 0,
            Err(source) => return Err(CommError::Io { operation: "read", source }),
        };
        reply.truncate(read);

        thread::sleep(settle_delay);

        Ok(reply)
    }

    fn describe(&self) -> String {
        format!("{} ({} baud)", self.path, self.settings.baud_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_device() {
        let result = SerialChannel::open("/dev/sa818-does-not-exist", &SerialSettings::default());
        assert!(matches!(result, Err(CommError::DeviceUnavailable { .. })));
    }

    #[test]
    fn test_invalid_settings_rejected_before_open() {
        let settings = SerialSettings {
            baud_rate: 0,
            ..Default::default()
        };
        let result = SerialChannel::open("/dev/sa818-does-not-exist", &settings);
        assert!(matches!(result, Err(CommError::ConfigurationError { .. })));
    }
}
