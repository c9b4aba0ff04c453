//! # Jitter multiplier for retry delays.
//!
//! [`Multiplier`] scales a base delay by a factor drawn uniformly from
//! `[min, max]`, spreading retries of many simultaneously failing tasks so
//! they do not hit a recovering dependency at the same instant.
//!
//! - `min >= max` → deterministic, the factor is exactly `max`
//! - `min < max`  → uniform random factor in the closed range

use rand::Rng;
use std::time::Duration;

use crate::config::check_multiplier_range;
use crate::error::ConfigError;
use crate::policies::secs;

/// Delay multiplier range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Multiplier {
    min: f64,
    max: f64,
}

impl Default for Multiplier {
    /// Returns the identity multiplier (exactly 1.0).
    fn default() -> Self {
        Self { min: 1.0, max: 1.0 }
    }
}

impl Multiplier {
    /// Creates a multiplier range.
    ///
    /// Bounds must be finite, non-negative and `min <= max`.
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        check_multiplier_range(min, max)?;
        Ok(Self { min, max })
    }

    /// Builds from optional validated bounds; absent means identity.
    pub(crate) fn from_validated(min: Option<f64>, max: Option<f64>) -> Self {
        match (min, max) {
            (Some(min), Some(max)) => Self { min, max },
            _ => Self::default(),
        }
    }

    /// Lower bound.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Returns `true` when sampling is random (`min < max`).
    pub fn is_random(&self) -> bool {
        self.min < self.max
    }

    /// Draws a factor: uniform in `[min, max]`, or exactly `max` for a degenerate range.
    pub fn sample(&self) -> f64 {
        if !self.is_random() {
            return self.max;
        }
        rand::rng().random_range(self.min..=self.max)
    }

    /// Scales `delay` by a freshly sampled factor, saturating on overflow.
    pub fn apply(&self, delay: Duration) -> Duration {
        let factor = self.sample();
        if factor == 1.0 {
            return delay;
        }
        secs(delay.as_secs_f64() * factor)
    }
}
