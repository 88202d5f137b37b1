//! Latency-aware sampling scheduler.
//!
//! [`LatencyScheduler`] owns the loop's temporal semantics: when state is
//! sampled, how a sample's computed output time is adjusted by the
//! processing policy, and when a buffered control signal is released. The
//! external simulation driver holds the clock; every method here reacts to
//! a query at a given virtual time and returns immediately. Nothing
//! actually runs "in flight" — a pending computation is just an
//! un-released buffer entry.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ControlError, ControlResult};
use crate::pipeline::ControlPipeline;
use crate::signal::SignalMap;
use nl_core::{ensure_positive, time::is_period_multiple};

/// When samples are taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingPolicy {
    /// Sample at every period multiple, with no exceptions. If the
    /// pipeline is still busy, a new sample is taken anyway and its
    /// computation overlaps the pending ones.
    #[default]
    Fixed,
    /// Sample at a period multiple only when idle. A scheduled sample that
    /// finds the loop busy is deferred and taken at the first subsequent
    /// query, on-schedule or not, at which the loop has gone idle.
    WhenIdle,
}

/// How a sample's effective output time is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingPolicy {
    /// Output time = sample time + this sample's own delay. Overlapping
    /// computations are allowed; a later sample with a shorter delay can
    /// come due before an earlier one (release order stays FIFO).
    #[default]
    Parallel,
    /// Output time = previous entry's output time + this sample's own
    /// delay: a computation cannot start until the prior output would have
    /// been delivered. Output times are monotone across the buffer.
    Serial,
}

/// Scheduler configuration: period plus the two policy choices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Sampling period in milliseconds. Must be positive.
    pub sample_period_ms: f64,
    /// Sampling policy (default: fixed).
    #[serde(default)]
    pub sampling: SamplingPolicy,
    /// Processing policy (default: parallel).
    #[serde(default)]
    pub processing: ProcessingPolicy,
}

impl SchedulerConfig {
    /// Create a configuration with default policies.
    ///
    /// # Errors
    ///
    /// Returns an error unless `sample_period_ms` is finite and positive.
    pub fn new(sample_period_ms: f64) -> ControlResult<Self> {
        let config = Self {
            sample_period_ms,
            sampling: SamplingPolicy::default(),
            processing: ProcessingPolicy::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the sampling policy.
    pub fn with_sampling(mut self, sampling: SamplingPolicy) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set the processing policy.
    pub fn with_processing(mut self, processing: ProcessingPolicy) -> Self {
        self.processing = processing;
        self
    }

    /// Validate the configuration. Deserialized configs re-check here.
    pub fn validate(&self) -> ControlResult<()> {
        ensure_positive(
            self.sample_period_ms,
            "sample_period_ms must be finite and > 0",
        )?;
        Ok(())
    }
}

/// One control signal waiting for its delivery time.
#[derive(Debug, Clone)]
struct BufferedOutput {
    signal: SignalMap,
    out_time_ms: f64,
}

/// Scheduler delivering control signals some time after measurement.
///
/// Owns an insertion-ordered FIFO of pending outputs. Under the serial
/// processing policy the buffer is also monotone in output time; under the
/// parallel policy it need not be, and release still happens strictly from
/// the head so signals reach downstream stimulators in the order their
/// inputs were sampled.
pub struct LatencyScheduler<P: ControlPipeline> {
    config: SchedulerConfig,
    pipeline: P,
    out_buffer: VecDeque<BufferedOutput>,
    missed_sample: bool,
}

impl<P: ControlPipeline> LatencyScheduler<P> {
    /// Create a scheduler over a user-supplied pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration (non-positive or
    /// non-finite sample period).
    pub fn new(config: SchedulerConfig, pipeline: P) -> ControlResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pipeline,
            out_buffer: VecDeque::new(),
            missed_sample: false,
        })
    }

    /// The scheduler's configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The wrapped pipeline.
    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Mutable access to the wrapped pipeline.
    pub fn pipeline_mut(&mut self) -> &mut P {
        &mut self.pipeline
    }

    /// Number of buffered outputs not yet released.
    pub fn pending(&self) -> usize {
        self.out_buffer.len()
    }

    /// Whether the driver should sample state at `query_time_ms`.
    ///
    /// Advisory: the scheduler never pulls state itself. The driver is
    /// expected to call [`put_state`](Self::put_state) when this returns
    /// true. Under the when-idle policy this call mutates the
    /// missed-sample flag, so call it once per query time.
    pub fn is_sampling_now(&mut self, query_time_ms: f64) -> bool {
        let on_schedule = is_period_multiple(query_time_ms, self.config.sample_period_ms);
        match self.config.sampling {
            SamplingPolicy::Fixed => on_schedule,
            SamplingPolicy::WhenIdle => {
                if on_schedule {
                    if self.is_currently_idle(query_time_ms) {
                        self.missed_sample = false;
                        true
                    } else {
                        trace!(query_time_ms, "scheduled sample deferred: loop busy");
                        self.missed_sample = true;
                        false
                    }
                } else {
                    // Off-schedule: only the catch-up for a missed period,
                    // and only once the loop has gone idle.
                    self.missed_sample && self.is_currently_idle(query_time_ms)
                }
            }
        }
    }

    /// Ingest one sampled state at `sample_time_ms`.
    ///
    /// Runs the pipeline, applies the processing policy to the output
    /// time, and appends the result to the buffer tail. Atomic with
    /// respect to the buffer: on a pipeline error nothing is appended.
    pub fn put_state(&mut self, state: &SignalMap, sample_time_ms: f64) -> ControlResult<()> {
        let (signal, pipeline_out_time_ms) = self.pipeline.compute(state, sample_time_ms)?;
        let out_time_ms = match (self.config.processing, self.out_buffer.back()) {
            (ProcessingPolicy::Serial, Some(prev)) => {
                // This sample's own delay, stacked on the previous output.
                prev.out_time_ms + (pipeline_out_time_ms - sample_time_ms)
            }
            _ => pipeline_out_time_ms,
        };
        debug!(
            sample_time_ms,
            out_time_ms,
            pending = self.out_buffer.len() + 1,
            "sample ingested"
        );
        self.out_buffer.push_back(BufferedOutput {
            signal,
            out_time_ms,
        });
        self.missed_sample = false;
        Ok(())
    }

    /// Release the oldest buffered output whose time has come.
    ///
    /// Only the head is ever inspected: a later entry whose output time
    /// has already passed stays buffered until it becomes the head.
    pub fn get_ctrl_signal(&mut self, query_time_ms: f64) -> Option<SignalMap> {
        let head = self.out_buffer.front()?;
        if query_time_ms >= head.out_time_ms {
            let released = self.out_buffer.pop_front().map(|b| b.signal);
            debug!(
                query_time_ms,
                pending = self.out_buffer.len(),
                "control signal released"
            );
            released
        } else {
            None
        }
    }

    /// Clear the buffer, the missed-sample flag, and pipeline history.
    /// Policies, period, and delay configuration are untouched. Safe to
    /// call at any point, including mid-buffer.
    pub fn reset(&mut self) {
        self.out_buffer.clear();
        self.missed_sample = false;
        self.pipeline.reset();
    }

    /// Idle: no buffered output still awaiting its delivery time.
    fn is_currently_idle(&self, query_time_ms: f64) -> bool {
        match self.out_buffer.front() {
            None => true,
            Some(head) => head.out_time_ms <= query_time_ms,
        }
    }
}
