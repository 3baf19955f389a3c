//! AT command set understood by SA818 modules

use crate::core::constants::LINE_END;
use crate::core::{Bandwidth, ConfigurationProfile, FilterConfig, Frequency, SubAudioCode};
use std::fmt;

/// One command line sent to the module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Session handshake
    Connect,
    /// Bandwidth, frequencies, sub-audio and squelch in one go
    SetGroup {
        bandwidth: Bandwidth,
        tx_frequency: Frequency,
        rx_frequency: Frequency,
        tx_sub_audio: SubAudioCode,
        squelch: u8,
        rx_sub_audio: SubAudioCode,
    },
    /// Probe a frequency for a carrier
    Scan(Frequency),
    SetVolume(u8),
    SetFilter(FilterConfig),
    /// Received signal strength query
    ReadRssi,
    /// Firmware version query
    ReadVersion,
}

impl Command {
    pub fn set_group(profile: &ConfigurationProfile) -> Self {
        Command::SetGroup {
            bandwidth: profile.bandwidth,
            tx_frequency: profile.tx_frequency,
            rx_frequency: profile.rx_frequency,
            tx_sub_audio: profile.tx_sub_audio.clone(),
            squelch: profile.squelch,
            rx_sub_audio: profile.rx_sub_audio.clone(),
        }
    }

    /// Command text without the line terminator
    pub fn body(&self) -> String {
        match self {
            Command::Connect => "AT+DMOCONNECT".to_string(),
            Command::SetGroup {
                bandwidth,
                tx_frequency,
                rx_frequency,
                tx_sub_audio,
                squelch,
                rx_sub_audio,
            } => format!(
                "AT+DMOSETGROUP={},{},{},{},{},{}",
                bandwidth.flag(),
                tx_frequency,
                rx_frequency,
                tx_sub_audio,
                squelch,
                rx_sub_audio
            ),
            Command::Scan(frequency) => format!("S+{}", frequency),
            Command::SetVolume(volume) => format!("AT+DMOSETVOLUME={}", volume),
            Command::SetFilter(filter) => format!("AT+SETFILTER={}", filter),
            Command::ReadRssi => "RSSI?".to_string(),
            Command::ReadVersion => "AT+VERSION".to_string(),
        }
    }

    /// Full CR-LF terminated line as written to the wire
    pub fn encode(&self) -> String {
        format!("{}{}", self.body(), LINE_END)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body())
    }
}
