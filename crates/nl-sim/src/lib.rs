//! Closed-loop run driver for neuroloop.
//!
//! Provides:
//! - ProcessModel trait for the simulated process under control
//! - Fixed-step virtual-time run loop wiring a model to a scheduler
//! - Run records (sample times, delivered control signals)

pub mod error;
pub mod model;
pub mod runner;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use model::ProcessModel;
pub use runner::{LoopOptions, LoopRecord, run_loop};
