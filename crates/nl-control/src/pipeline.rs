//! The state-to-signal computation seam.
//!
//! A [`ControlPipeline`] turns one sampled state map into one control
//! signal map plus the virtual time at which that signal is ready, usually
//! by pushing values through one or more
//! [`ProcessingBlock`](crate::block::ProcessingBlock)s. The scheduler only
//! sees this trait; how many blocks sit behind it, and in what shape, is
//! the experiment implementer's business.

use crate::error::ControlResult;
use crate::signal::SignalMap;

/// User-supplied computation from sampled state to control signal.
pub trait ControlPipeline {
    /// Compute the control signal for one sample.
    ///
    /// Returns the signal map and the virtual time it becomes available,
    /// computed relative to `sample_time_ms` (the scheduler applies its
    /// processing policy on top). Errors propagate to the caller uncaught;
    /// a failure here is a caller bug, not a transient condition.
    fn compute(
        &mut self,
        state: &SignalMap,
        sample_time_ms: f64,
    ) -> ControlResult<(SignalMap, f64)>;

    /// Clear block history and transform state. No-op by default.
    fn reset(&mut self) {}
}

/// Pipeline that samples state without producing any control.
///
/// Use this if all the experiment does is record: the output is an empty
/// map, available immediately at sample time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordOnlyPipeline;

impl ControlPipeline for RecordOnlyPipeline {
    fn compute(
        &mut self,
        _state: &SignalMap,
        sample_time_ms: f64,
    ) -> ControlResult<(SignalMap, f64)> {
        Ok((SignalMap::new(), sample_time_ms))
    }
}
