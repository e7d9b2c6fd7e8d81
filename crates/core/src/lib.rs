//! Core types and classification for the sleep deprivation detector.

pub mod classify;
pub mod dataset;
pub mod error;
pub mod student;

pub use classify::detect_sleep_deprivation;
pub use error::{Error, Result};
pub use student::Student;
