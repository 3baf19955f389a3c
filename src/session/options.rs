use crate::core::constants::{DEFAULT_RESPONSE_CAPACITY, DEFAULT_SETTLE_DELAY_MS};
use crate::processing::MarkerPolicy;
use crate::session::SessionError;
use std::time::Duration;

/// Immutable switches for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Surface encoded commands instead of sending them
    pub dry_run: bool,
    /// Upper bound on bytes read per reply
    pub response_capacity: usize,
    /// Quiet time before reading and after each reply
    pub settle_delay: Duration,
    pub marker_policy: MarkerPolicy,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            response_capacity: DEFAULT_RESPONSE_CAPACITY,
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            marker_policy: MarkerPolicy::Strict,
        }
    }
}

impl RunOptions {
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Default::default()
        }
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn with_response_capacity(mut self, response_capacity: usize) -> Self {
        self.response_capacity = response_capacity;
        self
    }

    pub fn with_marker_policy(mut self, marker_policy: MarkerPolicy) -> Self {
        self.marker_policy = marker_policy;
        self
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.response_capacity == 0 {
            return Err(SessionError::InvalidOptions {
                reason: "response capacity must be at least one byte".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RunOptions::default();
        assert!(!options.dry_run);
        assert_eq!(options.response_capacity, 100);
        assert_eq!(options.settle_delay, Duration::from_secs(1));
        assert_eq!(options.marker_policy, MarkerPolicy::Strict);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let options = RunOptions::default().with_response_capacity(0);
        assert!(matches!(
            options.validate(),
            Err(SessionError::InvalidOptions { .. })
        ));
    }
}
