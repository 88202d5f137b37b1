//! Latency-wrapped processing stages.
//!
//! A [`ProcessingBlock`] pairs a user-supplied pure computation (a
//! [`Transform`]) with an optional [`Delay`] and an optional history log.
//! The block maps an input arriving at one virtual time to an output
//! available at a later virtual time; chaining blocks into a multi-stage
//! pipeline is left to the experiment implementer.

use crate::delay::Delay;
use crate::error::ControlResult;

/// User-supplied computation of a processing block.
///
/// Implementations hold whatever state the computation needs (filter
/// memory, controller integrals) and mutate it on each call. The
/// computation is assumed total over its declared input domain; an error
/// here propagates out of the block and the scheduler untouched.
pub trait Transform {
    type Input;
    type Output;

    /// Compute the output for one input, without regard for latency.
    ///
    /// `in_time_ms` is the virtual time the input arrived, for
    /// time-dependent computations.
    fn apply(&mut self, input: Self::Input, in_time_ms: f64) -> ControlResult<Self::Output>;

    /// Clear internal state, keeping configuration. No-op by default.
    fn reset(&mut self) {}
}

/// Per-call record of a block's activity: three parallel sequences, equal
/// in length, with `t_in_ms` non-decreasing (inputs arrive in time order).
#[derive(Debug, Clone, Default)]
pub struct BlockHistory<V> {
    /// Virtual time each input arrived.
    pub t_in_ms: Vec<f64>,
    /// Virtual time each output becomes available.
    pub t_out_ms: Vec<f64>,
    /// Each output value.
    pub values: Vec<V>,
}

impl<V> BlockHistory<V> {
    fn new() -> Self {
        Self {
            t_in_ms: Vec::new(),
            t_out_ms: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of recorded calls.
    pub fn len(&self) -> usize {
        self.t_in_ms.len()
    }

    /// Whether anything has been recorded.
    pub fn is_empty(&self) -> bool {
        self.t_in_ms.is_empty()
    }
}

/// A latency-wrapped computation stage.
pub struct ProcessingBlock<T: Transform> {
    transform: T,
    delay: Option<Box<dyn Delay>>,
    history: Option<BlockHistory<T::Output>>,
}

impl<T: Transform> ProcessingBlock<T>
where
    T::Output: Clone,
{
    /// Create a zero-latency block: outputs are available at input time.
    pub fn new(transform: T) -> Self {
        Self {
            transform,
            delay: None,
            history: None,
        }
    }

    /// Attach a compute-latency model.
    pub fn with_delay(mut self, delay: Box<dyn Delay>) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Record `(t_in, t_out, value)` for every call.
    pub fn with_history(mut self) -> Self {
        self.history = Some(BlockHistory::new());
        self
    }

    /// Compute output and output time for one input.
    ///
    /// The output time is the input time plus one delay draw (or the input
    /// time itself for a zero-latency block). History, when enabled, is
    /// appended on every call — including when the transform produced an
    /// empty output.
    pub fn process(&mut self, input: T::Input, in_time_ms: f64) -> ControlResult<(T::Output, f64)> {
        let output = self.transform.apply(input, in_time_ms)?;
        let out_time_ms = match &mut self.delay {
            Some(delay) => in_time_ms + delay.compute(),
            None => in_time_ms,
        };
        if let Some(history) = &mut self.history {
            history.t_in_ms.push(in_time_ms);
            history.t_out_ms.push(out_time_ms);
            history.values.push(output.clone());
        }
        Ok((output, out_time_ms))
    }

    /// The recorded history, if recording is enabled.
    pub fn history(&self) -> Option<&BlockHistory<T::Output>> {
        self.history.as_ref()
    }

    /// The wrapped transform.
    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Mutable access to the wrapped transform (e.g. to move a setpoint).
    pub fn transform_mut(&mut self) -> &mut T {
        &mut self.transform
    }

    /// Clear history and transform state. Configuration (delay, whether
    /// history is recorded) is untouched.
    pub fn reset(&mut self) {
        if let Some(history) = &mut self.history {
            history.t_in_ms.clear();
            history.t_out_ms.clear();
            history.values.clear();
        }
        self.transform.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::ConstantDelay;

    /// Adds the arrival time to the input.
    struct AddTime;

    impl Transform for AddTime {
        type Input = f64;
        type Output = f64;

        fn apply(&mut self, input: f64, in_time_ms: f64) -> ControlResult<f64> {
            Ok(input + in_time_ms)
        }
    }

    #[test]
    fn delay_shifts_output_time() {
        let mut block =
            ProcessingBlock::new(AddTime).with_delay(Box::new(ConstantDelay::new(5.0).unwrap()));

        let (out, out_t) = block.process(42.0, 2.0).unwrap();
        assert_eq!(out, 44.0);
        assert_eq!(out_t, 7.0);

        let (out, out_t) = block.process(-1.0, 9.0).unwrap();
        assert_eq!(out, 8.0);
        assert_eq!(out_t, 14.0);
    }

    #[test]
    fn no_delay_is_passthrough_in_time() {
        let mut block = ProcessingBlock::new(AddTime);
        let (_, out_t) = block.process(1.0, 3.25).unwrap();
        assert_eq!(out_t, 3.25);
    }

    #[test]
    fn history_grows_one_entry_per_call() {
        let mut block = ProcessingBlock::new(AddTime)
            .with_delay(Box::new(ConstantDelay::new(5.0).unwrap()))
            .with_history();

        assert!(block.history().unwrap().is_empty());

        for (i, (t, input)) in [(2.0, 42.0), (9.0, -1.0)].iter().enumerate() {
            block.process(*input, *t).unwrap();
            let h = block.history().unwrap();
            assert_eq!(h.t_in_ms.len(), i + 1);
            assert_eq!(h.t_out_ms.len(), i + 1);
            assert_eq!(h.values.len(), i + 1);
        }

        let h = block.history().unwrap();
        assert_eq!(h.t_in_ms, vec![2.0, 9.0]);
        assert_eq!(h.t_out_ms, vec![7.0, 14.0]);
        assert_eq!(h.values, vec![44.0, 8.0]);
    }

    #[test]
    fn reset_clears_history_not_configuration() {
        let mut block = ProcessingBlock::new(AddTime)
            .with_delay(Box::new(ConstantDelay::new(5.0).unwrap()))
            .with_history();

        block.process(1.0, 0.0).unwrap();
        block.reset();
        assert!(block.history().unwrap().is_empty());

        // Delay still attached after reset.
        let (_, out_t) = block.process(1.0, 1.0).unwrap();
        assert_eq!(out_t, 6.0);
    }

    #[test]
    fn history_disabled_records_nothing() {
        let mut block = ProcessingBlock::new(AddTime);
        block.process(1.0, 0.0).unwrap();
        assert!(block.history().is_none());
    }
}
