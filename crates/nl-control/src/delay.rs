//! Compute-latency models for processing blocks.
//!
//! A delay answers one question: how long does this block's computation
//! take, in the same milliseconds the virtual clock runs on. Constant
//! delays model a known compute cost; the stochastic variants model
//! jittery hardware or network hops. Randomized delays draw from a seeded
//! `ChaCha8Rng` so an experiment can be replayed exactly.

use crate::error::{ControlError, ControlResult};
use nl_core::{ensure_finite, ensure_non_negative};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal, Uniform};

/// Source of per-computation latency samples.
///
/// `compute` returns a duration in milliseconds, always `>= 0`, and is safe
/// to call any number of times; randomized implementations draw
/// independently on each call.
pub trait Delay {
    /// Sample the latency of one computation.
    fn compute(&mut self) -> f64;
}

/// Fixed compute latency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantDelay {
    delay_ms: f64,
}

impl ConstantDelay {
    /// Create a constant delay.
    ///
    /// # Errors
    ///
    /// Returns an error if `delay_ms` is negative or non-finite.
    pub fn new(delay_ms: f64) -> ControlResult<Self> {
        ensure_non_negative(delay_ms, "delay_ms must be finite and >= 0")?;
        Ok(Self { delay_ms })
    }
}

impl Delay for ConstantDelay {
    fn compute(&mut self) -> f64 {
        self.delay_ms
    }
}

/// Latency drawn uniformly from `[low_ms, high_ms]`.
#[derive(Debug, Clone)]
pub struct UniformDelay {
    dist: Uniform<f64>,
    rng: ChaCha8Rng,
}

impl UniformDelay {
    /// Create a uniform delay seeded from OS entropy.
    pub fn new(low_ms: f64, high_ms: f64) -> ControlResult<Self> {
        Self::from_rng(low_ms, high_ms, ChaCha8Rng::from_entropy())
    }

    /// Create a uniform delay with a fixed seed for reproducible runs.
    pub fn with_seed(low_ms: f64, high_ms: f64, seed: u64) -> ControlResult<Self> {
        Self::from_rng(low_ms, high_ms, ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(low_ms: f64, high_ms: f64, rng: ChaCha8Rng) -> ControlResult<Self> {
        ensure_non_negative(low_ms, "low_ms must be finite and >= 0")?;
        ensure_finite(high_ms, "high_ms")?;
        if high_ms < low_ms {
            return Err(ControlError::InvalidArg {
                what: "high_ms must be >= low_ms",
            });
        }
        Ok(Self {
            dist: Uniform::new_inclusive(low_ms, high_ms),
            rng,
        })
    }
}

impl Delay for UniformDelay {
    fn compute(&mut self) -> f64 {
        self.dist.sample(&mut self.rng)
    }
}

/// Normally distributed latency, clamped at zero.
///
/// The clamp keeps the `Delay` contract (durations are non-negative) for
/// parameter sets whose lower tail crosses zero.
#[derive(Debug, Clone)]
pub struct GaussianDelay {
    dist: Normal<f64>,
    rng: ChaCha8Rng,
}

impl GaussianDelay {
    /// Create a gaussian delay seeded from OS entropy.
    pub fn new(mean_ms: f64, std_ms: f64) -> ControlResult<Self> {
        Self::from_rng(mean_ms, std_ms, ChaCha8Rng::from_entropy())
    }

    /// Create a gaussian delay with a fixed seed for reproducible runs.
    pub fn with_seed(mean_ms: f64, std_ms: f64, seed: u64) -> ControlResult<Self> {
        Self::from_rng(mean_ms, std_ms, ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(mean_ms: f64, std_ms: f64, rng: ChaCha8Rng) -> ControlResult<Self> {
        ensure_finite(mean_ms, "mean_ms")?;
        ensure_non_negative(std_ms, "std_ms must be finite and >= 0")?;
        let dist = Normal::new(mean_ms, std_ms).map_err(|_| ControlError::InvalidArg {
            what: "invalid gaussian delay parameters",
        })?;
        Ok(Self { dist, rng })
    }
}

impl Delay for GaussianDelay {
    fn compute(&mut self) -> f64 {
        self.dist.sample(&mut self.rng).max(0.0)
    }
}
