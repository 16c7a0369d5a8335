// ABOUTME: Estimator configuration
// ABOUTME: Smoothing factor and sampling period, with defaults, validation and serde support

use crate::error::Error;
use crate::scheduler::sampler::check_period;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default smoothing factor
pub const DEFAULT_ALPHA: f64 = 0.2;
/// Default sampling period
pub const DEFAULT_UPDATE_PERIOD: Duration = Duration::from_millis(10_000);

/// Estimator configuration
///
/// Serialized as `{ "alpha": 0.2, "updatePeriod": 10000 }`, period in milliseconds.
/// Missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EstimatorConfig {
    /// Weight of each new sample, in (0, 1]. Higher converges faster but
    /// lets more network jitter through.
    pub alpha: f64,

    /// How often automatic samples fire
    #[serde(with = "millis")]
    pub update_period: Duration,
}

impl EstimatorConfig {
    /// Set the smoothing factor
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the sampling period
    pub fn with_update_period(mut self, update_period: Duration) -> Self {
        self.update_period = update_period;
        self
    }

    /// Check that both values are in range
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        check_period(self.update_period)
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            update_period: DEFAULT_UPDATE_PERIOD,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::MAX_PERIOD;

    #[test]
    fn test_defaults() {
        let config = EstimatorConfig::default();
        assert_eq!(config.alpha, 0.2);
        assert_eq!(config.update_period, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_alpha_range() {
        let base = EstimatorConfig::default();
        assert!(base.with_alpha(1.0).validate().is_ok());
        assert!(base.with_alpha(0.0).validate().is_err());
        assert!(base.with_alpha(1.5).validate().is_err());
        assert!(base.with_alpha(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_zero_period_rejected() {
        let config = EstimatorConfig::default().with_update_period(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_period_upper_bound() {
        let base = EstimatorConfig::default();
        assert!(base.with_update_period(MAX_PERIOD).validate().is_ok());
        assert!(base
            .with_update_period(MAX_PERIOD + Duration::from_millis(1))
            .validate()
            .is_err());
        assert!(base.with_update_period(Duration::MAX).validate().is_err());
    }
}
