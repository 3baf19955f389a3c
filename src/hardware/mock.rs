//! Mock channel implementation for testing and development

use crate::hardware::{Channel, CommError, CommResult};
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// Scripted behaviour for one round-trip
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Bytes returned by the read
    Bytes(Vec<u8>),
    /// The read times out with nothing received
    Silence,
    /// The write fails with an I/O error
    Failure(String),
}

/// Mock channel emulating an SA818 module
///
/// Scripted replies are consumed first, in order. Once the script is
/// exhausted the mock either answers like healthy firmware (the default)
/// or stays silent.
pub struct MockChannel {
    script: VecDeque<MockReply>,
    sent_messages: Vec<Vec<u8>>,
    emulate_firmware: bool,
    firmware_version: String,
    rssi: u8,
}

impl MockChannel {
    /// Create a mock that acknowledges every command
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            sent_messages: Vec::new(),
            emulate_firmware: true,
            firmware_version: "SA818_V4.2".to_string(),
            rssi: 42,
        }
    }

    /// Create a mock that never answers unless scripted
    pub fn silent() -> Self {
        Self {
            emulate_firmware: false,
            ..Self::new()
        }
    }

    /// Queue a textual reply for the next unscripted round-trip
    pub fn push_reply(&mut self, reply: &str) -> &mut Self {
        self.script.push_back(MockReply::Bytes(reply.as_bytes().to_vec()));
        self
    }

    /// Queue a read timeout
    pub fn push_silence(&mut self) -> &mut Self {
        self.script.push_back(MockReply::Silence);
        self
    }

    /// Queue an I/O failure
    pub fn push_failure(&mut self, description: &str) -> &mut Self {
        self.script.push_back(MockReply::Failure(description.to_string()));
        self
    }

    pub fn set_rssi(&mut self, rssi: u8) {
        self.rssi = rssi;
    }

    pub fn set_firmware_version(&mut self, version: &str) {
        self.firmware_version = version.to_string();
    }

    /// Every payload written so far, in order
    pub fn get_sent_messages(&self) -> &[Vec<u8>] {
        &self.sent_messages
    }

    /// Written payloads decoded as text
    pub fn sent_commands(&self) -> Vec<String> {
        self.sent_messages
            .iter()
            .map(|m| String::from_utf8_lossy(m).into_owned())
            .collect()
    }

    /// Number of scripted replies not consumed yet
    pub fn queued_reply_count(&self) -> usize {
        self.script.len()
    }

    /// Reply healthy firmware would give to `command`
    fn firmware_reply(&self, command: &str) -> Vec<u8> {
        let command = command.trim_end();
        let reply = if command == "RSSI?" {
            format!("RSSI={:03}", self.rssi)
        } else if command == "AT+VERSION" {
            format!("+VERSION:{}", self.firmware_version)
        } else if command.starts_with("S+") {
            "S=0".to_string()
        } else if command.starts_with("AT+SETFILTER") {
            "+DMOSETFILTER:0".to_string()
        } else if let Some(rest) = command.strip_prefix("AT+") {
            let name = rest.split('=').next().unwrap_or(rest);
            format!("+{}:0", name)
        } else {
            return Vec::new();
        };

        format!("{}\r\n", reply).into_bytes()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel for MockChannel {
    fn exchange(
        &mut self,
        payload: &[u8],
        response_capacity: usize,
        _settle_delay: Duration,
    ) -> CommResult<Vec<u8>> {
        if response_capacity == 0 {
            return Err(CommError::BufferError {
                operation: "read with zero capacity".to_string(),
            });
        }

        let mut reply = match self.script.pop_front() {
            Some(MockReply::Failure(description)) => {
                return Err(CommError::Io {
                    operation: "write",
                    source: io::Error::new(io::ErrorKind::BrokenPipe, description),
                });
            }
            Some(MockReply::Bytes(bytes)) => bytes,
            Some(MockReply::Silence) => Vec::new(),
            None if self.emulate_firmware => {
                self.firmware_reply(&String::from_utf8_lossy(payload))
            }
            None => Vec::new(),
        };
        reply.truncate(response_capacity);

        self.sent_messages.push(payload.to_vec());

        Ok(reply)
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
