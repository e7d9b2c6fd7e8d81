//! Bounded partition-parallel consumption for the detector.
//!
//! One task per partition pulls messages and classifies them, a shared
//! [`Countdown`] tracks the remaining-message budget across all workers,
//! and a watcher task fires a one-shot stop signal once the budget is
//! exhausted.

pub mod countdown;
pub mod partition;
pub mod supervisor;

pub use countdown::Countdown;
pub use partition::PartitionWorker;
pub use supervisor::{RunReport, Supervisor, SupervisorConfig};
