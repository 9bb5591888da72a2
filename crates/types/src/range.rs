use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` delay bounds. The unit is decided by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DelayRange {
    pub min: f64,
    pub max: f64,
}

impl DelayRange {
    pub const ZERO: DelayRange = DelayRange { min: 0.0, max: 0.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && 0.0 <= self.min && self.min <= self.max
    }

    /// Uniform draw in `[min, max]`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max <= self.min {
            return self.min.max(0.0);
        }
        self.min + rng.gen::<f64>() * (self.max - self.min)
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Inclusive `[min, max]` count bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Bounds for a randomized token amount and the number of decimals it is rounded to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min_value: f64,
    pub max_value: f64,
    pub min_precision: u32,
    pub max_precision: u32,
}

impl AmountRange {
    pub fn is_valid(&self) -> bool {
        self.min_value.is_finite()
            && self.max_value.is_finite()
            && 0.0 <= self.min_value
            && self.min_value <= self.max_value
            && self.min_precision <= self.max_precision
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Decimal {
        let value = DelayRange::new(self.min_value, self.max_value).sample(rng);
        let precision = if self.max_precision <= self.min_precision {
            self.min_precision
        } else {
            rng.gen_range(self.min_precision..=self.max_precision)
        };

        Decimal::from_f64_retain(value)
            .unwrap_or_default()
            .round_dp(precision)
    }
}

impl Default for AmountRange {
    fn default() -> Self {
        Self {
            min_value: 0.1,
            max_value: 1.0,
            min_precision: 1,
            max_precision: 3,
        }
    }
}
