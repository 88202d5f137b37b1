//! Measurement conditioning blocks.
//!
//! Raw sampled state is often too noisy to feed a controller directly; an
//! estimator block sits between the measurement and the feedback law.

use serde::{Deserialize, Serialize};

use crate::block::Transform;
use crate::error::ControlResult;
use nl_core::{ensure_non_negative, ensure_positive};

/// Exponential-filter spike-rate estimator.
///
/// Input is the spike count observed over the last sample period; output
/// is a smoothed firing rate in Hz. Discretized first-order low-pass:
/// `alpha = tau / (tau + dt)`, `rate <- alpha * rate + (1 - alpha) * inst`.
/// With `tau_ms = 0` the filter is a passthrough of the instantaneous
/// rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiringRateEstimator {
    /// Filter time constant (milliseconds).
    pub tau_ms: f64,
    /// Rate reported before any input has arrived, and after reset (Hz).
    pub initial_rate_hz: f64,
    /// Counting window: the loop's sample period (milliseconds).
    sample_period_ms: f64,
    /// Current smoothed rate (Hz).
    rate_hz: f64,
}

impl FiringRateEstimator {
    /// Create a rate estimator.
    ///
    /// # Errors
    ///
    /// Returns an error if `tau_ms` is negative or `sample_period_ms` is
    /// not positive.
    pub fn new(tau_ms: f64, sample_period_ms: f64) -> ControlResult<Self> {
        ensure_non_negative(tau_ms, "tau_ms must be finite and >= 0")?;
        ensure_positive(sample_period_ms, "sample_period_ms must be positive")?;
        Ok(Self {
            tau_ms,
            initial_rate_hz: 0.0,
            sample_period_ms,
            rate_hz: 0.0,
        })
    }

    /// Start (and reset) from a non-zero rate estimate.
    pub fn with_initial_rate(mut self, rate_hz: f64) -> Self {
        self.initial_rate_hz = rate_hz;
        self.rate_hz = rate_hz;
        self
    }

    /// The current smoothed rate (Hz).
    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }
}

impl Transform for FiringRateEstimator {
    type Input = f64;
    type Output = f64;

    fn apply(&mut self, spike_count: f64, _in_time_ms: f64) -> ControlResult<f64> {
        // Counts per ms -> Hz
        let inst_rate_hz = spike_count / self.sample_period_ms * 1000.0;
        let alpha = self.tau_ms / (self.tau_ms + self.sample_period_ms);
        self.rate_hz = alpha * self.rate_hz + (1.0 - alpha) * inst_rate_hz;
        Ok(self.rate_hz)
    }

    fn reset(&mut self) {
        self.rate_hz = self.initial_rate_hz;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tau_is_passthrough() {
        let mut est = FiringRateEstimator::new(0.0, 1.0).unwrap();
        // 3 spikes in 1 ms = 3000 Hz, unfiltered.
        assert_eq!(est.apply(3.0, 0.0).unwrap(), 3000.0);
        assert_eq!(est.apply(0.0, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn converges_to_steady_rate() {
        let mut est = FiringRateEstimator::new(10.0, 1.0).unwrap();
        let mut rate = 0.0;
        for i in 0..200 {
            // 2 spikes per 1 ms window = 2000 Hz steady input.
            rate = est.apply(2.0, i as f64).unwrap();
        }
        assert!((rate - 2000.0).abs() < 1.0);
    }

    #[test]
    fn smooths_a_burst() {
        let mut est = FiringRateEstimator::new(10.0, 1.0).unwrap();
        est.apply(0.0, 0.0).unwrap();
        let burst = est.apply(5.0, 1.0).unwrap();
        // One bursty window moves the estimate only partway to 5000 Hz.
        assert!(burst > 0.0);
        assert!(burst < 5000.0 * 0.5);
    }

    #[test]
    fn reset_restores_initial_rate() {
        let mut est = FiringRateEstimator::new(10.0, 1.0)
            .unwrap()
            .with_initial_rate(100.0);
        est.apply(5.0, 0.0).unwrap();
        est.reset();
        assert_eq!(est.rate_hz(), 100.0);
    }

    #[test]
    fn invalid_parameters() {
        assert!(FiringRateEstimator::new(-1.0, 1.0).is_err());
        assert!(FiringRateEstimator::new(1.0, 0.0).is_err());
    }
}
