//! Uniform random scalars over bounded ranges.
//!
//! The generator is injected so scheduling logic can run against a seeded
//! source in tests.

use rand::distr::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Error;

#[derive(Debug, Clone)]
pub struct RandomSource<R = StdRng> {
    rng: R,
}

impl RandomSource<StdRng> {
    /// Source seeded from the operating system.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic source; equal seeds produce equal sequences.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSource<StdRng> {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

impl<R: Rng> RandomSource<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// `true` with probability `p`.
    ///
    /// Never fails: `p` is clamped into `[0, 1]`, so `p >= 1` always hits and
    /// `p <= 0` never does. A NaN probability is treated as 0 and returns `false`.
    pub fn uniform_bool(&mut self, p: f64) -> bool {
        if p.is_nan() {
            return false;
        }
        self.rng.random_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform in `[min, max)`. A collapsed range (`min == max`) yields `min`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] if `max < min`, either bound is not
    /// finite, or the span `max - min` overflows.
    pub fn uniform_f64(&mut self, min: f64, max: f64) -> Result<f64, Error> {
        if !min.is_finite() || !max.is_finite() || max < min {
            return Err(Error::InvalidRange { min, max });
        }
        if max == min {
            return Ok(min);
        }
        let dist = Uniform::new(min, max).map_err(|_| Error::InvalidRange { min, max })?;
        Ok(self.rng.sample(dist))
    }

    /// Uniform in `[min, max)`. A collapsed range (`min == max`) yields `min`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] if `max < min`, either bound is not
    /// finite, or the span `max - min` overflows.
    pub fn uniform_f32(&mut self, min: f32, max: f32) -> Result<f32, Error> {
        let invalid = || Error::InvalidRange {
            min: f64::from(min),
            max: f64::from(max),
        };
        if !min.is_finite() || !max.is_finite() || max < min {
            return Err(invalid());
        }
        if max == min {
            return Ok(min);
        }
        let dist = Uniform::new(min, max).map_err(|_| invalid())?;
        Ok(self.rng.sample(dist))
    }

    /// Uniform integer in `[min, max)`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] if `max <= min`.
    pub fn uniform_int(&mut self, min: i64, max: i64) -> Result<i64, Error> {
        let dist = Uniform::new(min, max).map_err(|_| Error::InvalidRange {
            min: min as f64,
            max: max as f64,
        })?;
        Ok(self.rng.sample(dist))
    }
}
