//! ProcessModel trait for pluggable simulated processes.

use crate::error::SimResult;
use nl_control::SignalMap;

/// Trait for the external process a closed loop measures and stimulates.
///
/// The scheduler never touches the model; the run loop mediates. A model
/// must implement:
/// - State capture: named measurements at a virtual time
/// - Control application: accept a named control signal
/// - Dynamics: advance its own state by one time step
pub trait ProcessModel {
    /// Capture the measured state at virtual time `t_ms`.
    fn sample_state(&mut self, t_ms: f64) -> SignalMap;

    /// Apply a delivered control signal at virtual time `t_ms`.
    fn apply_ctrl(&mut self, signal: &SignalMap, t_ms: f64);

    /// Advance the process dynamics by `dt_ms`.
    ///
    /// Note: takes `&mut self`; models integrate their own state however
    /// they see fit.
    fn advance(&mut self, dt_ms: f64) -> SimResult<()>;
}
