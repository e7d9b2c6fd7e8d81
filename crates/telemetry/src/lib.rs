//! Internal telemetry for the sleep deprivation detector.
//!
//! Counters live in-process and are logged as a snapshot at the end of a
//! run; there is no external metrics system.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::*;
pub use tracing_setup::*;
