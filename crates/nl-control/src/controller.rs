//! Feedback controller blocks.
//!
//! Controllers are [`Transform`]s: they slot into a
//! [`ProcessingBlock`](crate::block::ProcessingBlock) like any other
//! computation, so a feedback law picks up compute latency and history
//! recording for free. The PI law here operates in sampled mode — one
//! update per loop sample — and includes:
//! - Anti-windup protection (integral freeze on output saturation)
//! - Output clamping
//! - Optional integral clamping

use serde::{Deserialize, Serialize};

use crate::block::Transform;
use crate::error::{ControlError, ControlResult};
use nl_core::ensure_positive;

/// Sampled proportional-integral controller.
///
/// Input is the measured process variable; output is the clamped command.
/// The error convention is `setpoint - measurement`: positive error means
/// the measurement is below target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiController {
    /// Proportional gain.
    pub kp: f64,
    /// Integral time constant (milliseconds). Larger values reduce
    /// integral action.
    pub ti_ms: f64,
    /// Target value for the measured variable.
    pub setpoint: f64,
    /// Minimum output value.
    pub out_min: f64,
    /// Maximum output value.
    pub out_max: f64,
    /// Integral windup limit (optional). If None, relies on the freeze.
    pub integral_limit: Option<f64>,
    /// Update interval (milliseconds): the loop's sample period.
    sample_period_ms: f64,
    /// Integral accumulator (error·ms).
    integral: f64,
}

impl PiController {
    /// Create a new PI controller.
    ///
    /// # Arguments
    ///
    /// * `kp` - Proportional gain
    /// * `ti_ms` - Integral time constant (milliseconds)
    /// * `setpoint` - Target value
    /// * `sample_period_ms` - Update interval (milliseconds)
    ///
    /// Output limits default to unbounded; see
    /// [`with_output_limits`](Self::with_output_limits).
    ///
    /// # Errors
    ///
    /// Returns an error if `ti_ms` or `sample_period_ms` is not positive.
    pub fn new(kp: f64, ti_ms: f64, setpoint: f64, sample_period_ms: f64) -> ControlResult<Self> {
        ensure_positive(ti_ms, "ti_ms must be positive")?;
        ensure_positive(sample_period_ms, "sample_period_ms must be positive")?;
        Ok(Self {
            kp,
            ti_ms,
            setpoint,
            out_min: f64::NEG_INFINITY,
            out_max: f64::INFINITY,
            integral_limit: None,
            sample_period_ms,
            integral: 0.0,
        })
    }

    /// Clamp the command to `[out_min, out_max]`.
    ///
    /// # Errors
    ///
    /// Returns an error if `out_min >= out_max`.
    pub fn with_output_limits(mut self, out_min: f64, out_max: f64) -> ControlResult<Self> {
        if out_min >= out_max {
            return Err(ControlError::InvalidArg {
                what: "out_min must be less than out_max",
            });
        }
        self.out_min = out_min;
        self.out_max = out_max;
        Ok(self)
    }

    /// Set integral windup limit.
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = Some(limit);
        self
    }

    /// Move the target mid-experiment.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }
}

impl Transform for PiController {
    type Input = f64;
    type Output = f64;

    fn apply(&mut self, measurement: f64, _in_time_ms: f64) -> ControlResult<f64> {
        let error = self.setpoint - measurement;

        // Proportional term
        let p_term = self.kp * error;

        // Integral term with anti-windup
        let ki = self.kp / self.ti_ms;
        let new_integral = self.integral + error * self.sample_period_ms;
        let clamped_integral = match self.integral_limit {
            Some(limit) => new_integral.clamp(-limit, limit),
            None => new_integral,
        };
        let i_term = ki * clamped_integral;

        let output_raw = p_term + i_term;
        let output = output_raw.clamp(self.out_min, self.out_max);

        // If the output is saturated, don't accumulate integral.
        self.integral = if output == output_raw {
            clamped_integral
        } else {
            self.integral
        };

        Ok(output)
    }

    fn reset(&mut self) {
        self.integral = 0.0;
    }
}
