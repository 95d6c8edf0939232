//! Closed numeric ranges used for per-particle sampling.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A closed `[min, max]` interval.
///
/// Serialized as a two element array so config files read `radius = [0.5, 3]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// Create a new range. Bounds are not checked here, see [`Range::validate`].
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A degenerate range holding a single value.
    pub const fn fixed(value: f64) -> Self {
        Self::new(value, value)
    }

    /// Whether both bounds are whole numbers.
    ///
    /// Integral ranges sample inclusive integers instead of reals.
    pub fn is_integral(&self) -> bool {
        self.min.fract() == 0.0 && self.max.fract() == 0.0
    }

    /// Whether `value` lies inside the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Check that both bounds are finite and ordered.
    pub fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::invalid(field, "bounds must be finite"));
        }
        if self.min > self.max {
            return Err(ConfigError::invalid(
                field,
                format!("min {} is greater than max {}", self.min, self.max),
            ));
        }
        Ok(())
    }

    /// Like [`Range::validate`], additionally requiring `min >= 0`.
    pub fn validate_non_negative(&self, field: &'static str) -> Result<(), ConfigError> {
        self.validate(field)?;
        if self.min < 0.0 {
            return Err(ConfigError::invalid(field, "bounds must not be negative"));
        }
        Ok(())
    }
}

impl From<[f64; 2]> for Range {
    fn from([min, max]: [f64; 2]) -> Self {
        Self::new(min, max)
    }
}

impl From<Range> for [f64; 2] {
    fn from(range: Range) -> Self {
        [range.min, range.max]
    }
}
