//! Device limits and protocol constants

/// Frequency fields are carried in units of 100 Hz (4 decimal places of MHz)
pub const FREQUENCY_SCALE: u32 = 10_000;

/// VHF variant frequency window (MHz)
pub const VHF_MIN_MHZ: u32 = 134;
pub const VHF_MAX_MHZ: u32 = 174;

/// UHF variant frequency window (MHz)
pub const UHF_MIN_MHZ: u32 = 400;
pub const UHF_MAX_MHZ: u32 = 480;

pub const SQUELCH_MAX: u8 = 8;
pub const VOLUME_MIN: u8 = 1;
pub const VOLUME_MAX: u8 = 8;

/// Highest CTCSS tone index accepted by the module
pub const CTCSS_MAX_INDEX: u16 = 38;

/// Sub-audio code meaning "no tone"
pub const SUB_AUDIO_NONE: &str = "0000";

/// Success marker used by the firmware in every acknowledgement
pub const SUCCESS_MARKER: u8 = b'0';

/// Command line terminator
pub const LINE_END: &str = "\r\n";

/// Default reply buffer bound (bytes)
pub const DEFAULT_RESPONSE_CAPACITY: usize = 100;

/// Quiescent interval the firmware needs around each command (milliseconds)
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;
