//! Range checks applied to a profile before any command is encoded

use crate::core::constants::*;
use crate::core::{Band, ConfigurationProfile, Frequency};
use crate::validation::ValidationError;

/// Validator for configuration profiles.
///
/// A validator may be pinned to one module variant; otherwise the band is
/// inferred from the transmit frequency and the other frequencies must
/// agree with it.
#[derive(Debug, Clone, Default)]
pub struct ProfileValidator {
    band: Option<Band>,
}

impl ProfileValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept frequencies of the given module variant
    pub fn for_band(band: Band) -> Self {
        Self { band: Some(band) }
    }

    /// Validate a profile, stopping at the first problem
    pub fn validate(&self, profile: &ConfigurationProfile) -> Result<(), ValidationError> {
        match self.validate_all(profile).into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Collect every problem in the profile
    pub fn validate_all(&self, profile: &ConfigurationProfile) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let tx_band = self.check_frequency("tx_frequency", profile.tx_frequency, &mut errors);
        let rx_band = self.check_frequency("rx_frequency", profile.rx_frequency, &mut errors);
        let scan_band = self.check_frequency("scan_frequency", profile.scan_frequency, &mut errors);

        if let (Some(tx), Some(rx)) = (tx_band, rx_band) {
            if tx != rx {
                errors.push(ValidationError::BandMismatch {
                    tx: profile.tx_frequency.to_string(),
                    rx: profile.rx_frequency.to_string(),
                });
            }
        }
        if let (Some(tx), Some(scan)) = (tx_band, scan_band) {
            if tx != scan {
                errors.push(ValidationError::BandMismatch {
                    tx: profile.tx_frequency.to_string(),
                    rx: profile.scan_frequency.to_string(),
                });
            }
        }

        if profile.squelch > SQUELCH_MAX {
            errors.push(ValidationError::OutOfRange {
                field: "squelch",
                value: profile.squelch.to_string(),
                expected: "0-8",
            });
        }

        if !(VOLUME_MIN..=VOLUME_MAX).contains(&profile.volume) {
            errors.push(ValidationError::OutOfRange {
                field: "volume",
                value: profile.volume.to_string(),
                expected: "1-8",
            });
        }

        errors
    }

    fn check_frequency(
        &self,
        field: &'static str,
        frequency: Frequency,
        errors: &mut Vec<ValidationError>,
    ) -> Option<Band> {
        let band = match self.band {
            Some(band) if band.contains(frequency) => Some(band),
            Some(_) => None,
            None => Band::of(frequency),
        };

        if band.is_none() {
            errors.push(ValidationError::OutOfRange {
                field,
                value: frequency.to_string(),
                expected: match self.band {
                    Some(Band::Vhf) => "134.0000-174.0000",
                    Some(Band::Uhf) => "400.0000-480.0000",
                    None => "134.0000-174.0000 or 400.0000-480.0000",
                },
            });
        }

        band
    }
}
