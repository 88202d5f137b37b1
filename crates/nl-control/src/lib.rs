//! Closed-loop control core for neuroloop.
//!
//! This crate provides the temporal heart of a closed-loop experiment: a
//! virtual-time scheduler that samples state from an external process,
//! pushes it through a latency-bearing computation pipeline, and releases
//! the resulting control signal at a later, policy-determined time.
//!
//! # Architecture
//!
//! - State and control signals are mappings of named values ([`SignalMap`])
//! - A [`ProcessingBlock`] wraps one pure computation with a compute-latency
//!   model ([`Delay`]) and optional history recording
//! - A [`ControlPipeline`] composes blocks into the sample-to-signal
//!   computation; composition shape is the experiment's business
//! - The [`LatencyScheduler`] decides when to sample, buffers pending
//!   outputs, and releases them in FIFO order once due
//!
//! # Design Principles
//!
//! - **Virtual time**: a scalar clock in milliseconds, driven externally;
//!   every call is synchronous and returns immediately
//! - **Policies over mechanisms**: fixed vs. when-idle sampling and
//!   parallel vs. serial processing are construction-time choices
//! - **Fail fast**: invalid configuration errors at construction, and
//!   transform failures propagate to the caller uncaught

pub mod block;
pub mod controller;
pub mod delay;
pub mod error;
pub mod estimator;
pub mod pipeline;
pub mod scheduler;
pub mod signal;

pub use block::{BlockHistory, ProcessingBlock, Transform};
pub use controller::PiController;
pub use delay::{ConstantDelay, Delay, GaussianDelay, UniformDelay};
pub use error::{ControlError, ControlResult};
pub use estimator::FiringRateEstimator;
pub use pipeline::{ControlPipeline, RecordOnlyPipeline};
pub use scheduler::{LatencyScheduler, ProcessingPolicy, SamplingPolicy, SchedulerConfig};
pub use signal::{SignalMap, SignalValue};
