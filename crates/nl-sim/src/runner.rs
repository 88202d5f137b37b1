//! Closed-loop runner and result recording.

use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::model::ProcessModel;
use nl_control::{ControlPipeline, LatencyScheduler, SignalMap};

/// Options for closed-loop runs.
#[derive(Clone, Debug)]
pub struct LoopOptions {
    /// Fixed time step (milliseconds)
    pub dt_ms: f64,
    /// Final virtual time (milliseconds)
    pub t_end_ms: f64,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            dt_ms: 0.1,
            t_end_ms: 100.0,
            max_steps: 100_000,
        }
    }
}

/// Record of one closed-loop run.
#[derive(Clone, Debug, Default)]
pub struct LoopRecord {
    /// Virtual times at which state was sampled.
    pub sample_times_ms: Vec<f64>,
    /// Delivered control signals and their delivery times.
    pub deliveries: Vec<(f64, SignalMap)>,
    /// Steps actually taken.
    pub steps: usize,
}

/// Drive a closed loop from `t = 0` to `t_end_ms` on a fixed step.
///
/// Per step, in order: ask the scheduler whether to sample, on yes pull
/// state from the model and ingest it; poll for a due control signal and
/// on delivery apply it to the model; advance the model dynamics. The
/// query at `t_end_ms` itself is included, so a signal coming due exactly
/// at the end is still delivered.
pub fn run_loop<M: ProcessModel, P: ControlPipeline>(
    model: &mut M,
    scheduler: &mut LatencyScheduler<P>,
    opts: &LoopOptions,
) -> SimResult<LoopRecord> {
    if opts.dt_ms <= 0.0 || !opts.dt_ms.is_finite() {
        return Err(SimError::InvalidArg {
            what: "dt_ms must be positive",
        });
    }
    if opts.t_end_ms < 0.0 {
        return Err(SimError::InvalidArg {
            what: "t_end_ms must be non-negative",
        });
    }
    if opts.max_steps == 0 {
        return Err(SimError::InvalidArg {
            what: "max_steps must be positive",
        });
    }

    let mut record = LoopRecord::default();
    let mut t = 0.0;

    loop {
        if scheduler.is_sampling_now(t) {
            let state = model.sample_state(t);
            scheduler.put_state(&state, t)?;
            debug!(t_ms = t, "state sampled");
            record.sample_times_ms.push(t);
        }
        if let Some(signal) = scheduler.get_ctrl_signal(t) {
            model.apply_ctrl(&signal, t);
            debug!(t_ms = t, "control signal delivered");
            record.deliveries.push((t, signal));
        }

        if t >= opts.t_end_ms || record.steps >= opts.max_steps {
            break;
        }
        model.advance(opts.dt_ms)?;
        t += opts.dt_ms;
        record.steps += 1;
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nl_control::{RecordOnlyPipeline, SchedulerConfig};

    struct InertModel;

    impl ProcessModel for InertModel {
        fn sample_state(&mut self, _t_ms: f64) -> SignalMap {
            SignalMap::new()
        }

        fn apply_ctrl(&mut self, _signal: &SignalMap, _t_ms: f64) {}

        fn advance(&mut self, _dt_ms: f64) -> SimResult<()> {
            Ok(())
        }
    }

    #[test]
    fn loop_options_defaults() {
        let opts = LoopOptions::default();
        assert_eq!(opts.dt_ms, 0.1);
        assert_eq!(opts.t_end_ms, 100.0);
        assert_eq!(opts.max_steps, 100_000);
    }

    #[test]
    fn invalid_options_fail_fast() {
        let mut scheduler =
            LatencyScheduler::new(SchedulerConfig::new(1.0).unwrap(), RecordOnlyPipeline).unwrap();

        for opts in [
            LoopOptions {
                dt_ms: 0.0,
                ..Default::default()
            },
            LoopOptions {
                t_end_ms: -1.0,
                ..Default::default()
            },
            LoopOptions {
                max_steps: 0,
                ..Default::default()
            },
        ] {
            assert!(run_loop(&mut InertModel, &mut scheduler, &opts).is_err());
        }
    }

    #[test]
    fn step_cap_bounds_the_run() {
        let mut scheduler =
            LatencyScheduler::new(SchedulerConfig::new(1.0).unwrap(), RecordOnlyPipeline).unwrap();
        let opts = LoopOptions {
            dt_ms: 0.1,
            t_end_ms: 1e9,
            max_steps: 10,
        };
        let record = run_loop(&mut InertModel, &mut scheduler, &opts).unwrap();
        assert_eq!(record.steps, 10);
    }

    #[test]
    fn samples_on_the_period_including_both_ends() {
        let mut scheduler =
            LatencyScheduler::new(SchedulerConfig::new(1.0).unwrap(), RecordOnlyPipeline).unwrap();
        let opts = LoopOptions {
            dt_ms: 0.5,
            t_end_ms: 3.0,
            max_steps: 100,
        };
        let record = run_loop(&mut InertModel, &mut scheduler, &opts).unwrap();
        assert_eq!(record.sample_times_ms, vec![0.0, 1.0, 2.0, 3.0]);
    }
}
