//! Core data types for SA818 configuration profiles

use crate::core::constants::*;
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Channel bandwidth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bandwidth {
    /// 12.5 kHz
    Narrow,
    /// 25 kHz
    Wide,
}

impl Bandwidth {
    /// Wire flag: 0 for narrow, 1 for wide
    pub fn flag(self) -> u8 {
        match self {
            Bandwidth::Narrow => 0,
            Bandwidth::Wide => 1,
        }
    }

    pub fn from_flag(flag: u8) -> Result<Self, ValidationError> {
        match flag {
            0 => Ok(Bandwidth::Narrow),
            1 => Ok(Bandwidth::Wide),
            other => Err(ValidationError::OutOfRange {
                field: "bandwidth",
                value: other.to_string(),
                expected: "0 or 1",
            }),
        }
    }
}

impl FromStr for Bandwidth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "narrow" => Ok(Bandwidth::Narrow),
            "1" | "wide" => Ok(Bandwidth::Wide),
            other => Err(ValidationError::Malformed {
                field: "bandwidth",
                value: other.to_string(),
                reason: "expected 0, 1, narrow or wide".to_string(),
            }),
        }
    }
}

/// Frequency band a module variant operates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    Vhf,
    Uhf,
}

impl Band {
    /// Inclusive window in frequency units
    pub fn range(self) -> (u32, u32) {
        match self {
            Band::Vhf => (VHF_MIN_MHZ * FREQUENCY_SCALE, VHF_MAX_MHZ * FREQUENCY_SCALE),
            Band::Uhf => (UHF_MIN_MHZ * FREQUENCY_SCALE, UHF_MAX_MHZ * FREQUENCY_SCALE),
        }
    }

    pub fn contains(self, frequency: Frequency) -> bool {
        let (low, high) = self.range();
        (low..=high).contains(&frequency.units())
    }

    /// Band a frequency falls into, if any
    pub fn of(frequency: Frequency) -> Option<Band> {
        [Band::Vhf, Band::Uhf].into_iter().find(|band| band.contains(frequency))
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Vhf => f.write_str("VHF"),
            Band::Uhf => f.write_str("UHF"),
        }
    }
}

impl FromStr for Band {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v" | "vhf" => Ok(Band::Vhf),
            "u" | "uhf" => Ok(Band::Uhf),
            other => Err(ValidationError::Malformed {
                field: "band",
                value: other.to_string(),
                reason: "expected vhf or uhf".to_string(),
            }),
        }
    }
}

/// Radio frequency stored as an integer count of 100 Hz steps.
///
/// Keeping the value integral makes the `%.4f` wire rendering exact:
/// `150` always encodes as `150.0000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Frequency(u32);

impl Frequency {
    pub fn from_units(units: u32) -> Self {
        Self(units)
    }

    /// Round a floating point MHz value to the nearest 100 Hz step
    pub fn from_mhz(mhz: f64) -> Result<Self, ValidationError> {
        if !mhz.is_finite() || mhz < 0.0 || mhz > (u32::MAX / FREQUENCY_SCALE) as f64 {
            return Err(ValidationError::Malformed {
                field: "frequency",
                value: mhz.to_string(),
                reason: "not a representable frequency".to_string(),
            });
        }
        Ok(Self((mhz * FREQUENCY_SCALE as f64).round() as u32))
    }

    pub fn units(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:04}", self.0 / FREQUENCY_SCALE, self.0 % FREQUENCY_SCALE)
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let malformed = |reason: &str| ValidationError::Malformed {
            field: "frequency",
            value: text.to_string(),
            reason: reason.to_string(),
        };

        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("expected decimal MHz such as 150.0000"));
        }
        if fraction.len() > 4 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("at most 4 decimal digits are supported"));
        }

        let whole: u32 = whole.parse().map_err(|_| malformed("value too large"))?;
        let padded = format!("{:0<4}", fraction);
        let fraction: u32 = padded.parse().map_err(|_| malformed("invalid fraction"))?;

        whole
            .checked_mul(FREQUENCY_SCALE)
            .and_then(|units| units.checked_add(fraction))
            .map(Frequency)
            .ok_or_else(|| malformed("value too large"))
    }
}

impl TryFrom<String> for Frequency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.to_string()
    }
}

/// CTCSS/DCS sub-audio selector, always four characters on the wire.
///
/// `0000` disables the tone, `0001`..`0038` select a CTCSS tone and
/// `NNNN`/`NNNI` (three octal digits plus polarity) select a DCS code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubAudioCode(String);

impl SubAudioCode {
    pub fn none() -> Self {
        Self(SUB_AUDIO_NONE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == SUB_AUDIO_NONE
    }
}

impl Default for SubAudioCode {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for SubAudioCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SubAudioCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        let malformed = |reason: &str| ValidationError::Malformed {
            field: "sub_audio",
            value: code.clone(),
            reason: reason.to_string(),
        };

        if code.len() != 4 || !code.is_ascii() {
            return Err(malformed("sub-audio codes are exactly 4 characters"));
        }

        let bytes = code.as_bytes();
        if bytes.iter().all(|b| b.is_ascii_digit()) {
            let index: u16 = code.parse().map_err(|_| malformed("invalid CTCSS index"))?;
            if index > CTCSS_MAX_INDEX {
                return Err(malformed("CTCSS index must be 0000-0038"));
            }
            return Ok(Self(code));
        }

        let octal = bytes[..3].iter().all(|b| (b'0'..=b'7').contains(b));
        if octal && matches!(bytes[3], b'N' | b'I') {
            return Ok(Self(code));
        }

        Err(malformed("expected a CTCSS index or a DCS code like 023N"))
    }
}

impl TryFrom<String> for SubAudioCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SubAudioCode> for String {
    fn from(value: SubAudioCode) -> Self {
        value.0
    }
}

/// Audio filter flags, rendered on the wire as `e,h,l`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilterConfig {
    /// Pre-emphasis / de-emphasis
    pub emphasis: bool,
    pub high_pass: bool,
    pub low_pass: bool,
}

impl FilterConfig {
    pub fn new(emphasis: bool, high_pass: bool, low_pass: bool) -> Self {
        Self { emphasis, high_pass, low_pass }
    }
}

impl fmt::Display for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            u8::from(self.emphasis),
            u8::from(self.high_pass),
            u8::from(self.low_pass)
        )
    }
}

impl FromStr for FilterConfig {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let flags: Vec<&str> = s.trim().split(',').map(str::trim).collect();
        let malformed = || ValidationError::Malformed {
            field: "filter",
            value: s.trim().to_string(),
            reason: "expected three comma-separated 0/1 flags".to_string(),
        };

        if flags.len() != 3 {
            return Err(malformed());
        }

        let mut parsed = [false; 3];
        for (slot, flag) in parsed.iter_mut().zip(&flags) {
            *slot = match *flag {
                "0" => false,
                "1" => true,
                _ => return Err(malformed()),
            };
        }

        Ok(Self::new(parsed[0], parsed[1], parsed[2]))
    }
}

impl TryFrom<String> for FilterConfig {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FilterConfig> for String {
    fn from(value: FilterConfig) -> Self {
        value.to_string()
    }
}

/// Desired module state applied by one configuration session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationProfile {
    pub bandwidth: Bandwidth,
    pub tx_frequency: Frequency,
    pub rx_frequency: Frequency,
    pub tx_sub_audio: SubAudioCode,
    pub rx_sub_audio: SubAudioCode,
    /// 0 (open) to 8
    pub squelch: u8,
    /// Frequency probed for carrier presence
    pub scan_frequency: Frequency,
    /// 1 to 8
    pub volume: u8,
    pub filter: FilterConfig,
}

impl Default for ConfigurationProfile {
    fn default() -> Self {
        let frequency = Frequency::from_units(150 * FREQUENCY_SCALE);
        Self {
            bandwidth: Bandwidth::Narrow,
            tx_frequency: frequency,
            rx_frequency: frequency,
            tx_sub_audio: SubAudioCode::none(),
            rx_sub_audio: SubAudioCode::none(),
            squelch: SQUELCH_MAX,
            scan_frequency: frequency,
            volume: VOLUME_MAX,
            filter: FilterConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_formatting() {
        let freq: Frequency = "150".parse().unwrap();
        assert_eq!(freq.to_string(), "150.0000");

        let freq: Frequency = "145.525".parse().unwrap();
        assert_eq!(freq.to_string(), "145.5250");

        let freq = Frequency::from_mhz(446.00626).unwrap();
        assert_eq!(freq.to_string(), "446.0063");
    }

    #[test]
    fn test_frequency_rejects_garbage() {
        assert!("".parse::<Frequency>().is_err());
        assert!("abc".parse::<Frequency>().is_err());
        assert!("150.12345".parse::<Frequency>().is_err());
        assert!("-150".parse::<Frequency>().is_err());
        assert!(Frequency::from_mhz(f64::NAN).is_err());
    }

    #[test]
    fn test_band_detection() {
        assert_eq!(Band::of("134.0000".parse().unwrap()), Some(Band::Vhf));
        assert_eq!(Band::of("174.0000".parse().unwrap()), Some(Band::Vhf));
        assert_eq!(Band::of("446.1000".parse().unwrap()), Some(Band::Uhf));
        assert_eq!(Band::of("174.0001".parse().unwrap()), None);
        assert_eq!(Band::of("300".parse().unwrap()), None);

        assert_eq!("UHF".parse::<Band>().unwrap(), Band::Uhf);
        assert_eq!("v".parse::<Band>().unwrap().to_string(), "VHF");
        assert!("hf".parse::<Band>().is_err());
    }

    #[test]
    fn test_sub_audio_codes() {
        assert!("0000".parse::<SubAudioCode>().unwrap().is_none());
        assert_eq!("0012".parse::<SubAudioCode>().unwrap().as_str(), "0012");
        assert_eq!("023n".parse::<SubAudioCode>().unwrap().as_str(), "023N");
        assert_eq!("754I".parse::<SubAudioCode>().unwrap().as_str(), "754I");

        assert!("0039".parse::<SubAudioCode>().is_err());
        assert!("089N".parse::<SubAudioCode>().is_err());
        assert!("12".parse::<SubAudioCode>().is_err());
        assert!("023X".parse::<SubAudioCode>().is_err());
    }

    #[test]
    fn test_filter_parsing() {
        let filter: FilterConfig = "1,0,1".parse().unwrap();
        assert!(filter.emphasis);
        assert!(!filter.high_pass);
        assert!(filter.low_pass);
        assert_eq!(filter.to_string(), "1,0,1");

        assert!("1,0".parse::<FilterConfig>().is_err());
        assert!("1,0,2".parse::<FilterConfig>().is_err());
    }

    #[test]
    fn test_bandwidth_flags() {
        assert_eq!("wide".parse::<Bandwidth>().unwrap(), Bandwidth::Wide);
        assert_eq!("0".parse::<Bandwidth>().unwrap().flag(), 0);
        assert!(Bandwidth::from_flag(2).is_err());
    }

    #[test]
    fn test_profile_json_uses_wire_text() {
        let profile = ConfigurationProfile::default();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["tx_frequency"], "150.0000");
        assert_eq!(json["filter"], "0,0,0");
        assert_eq!(json["bandwidth"], "narrow");

        let back: ConfigurationProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile);
    }
}
