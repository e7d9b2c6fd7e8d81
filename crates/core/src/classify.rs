//! Sleep deprivation classification.

use crate::error::{Error, Result};
use crate::student::Student;

/// Decodes a message payload and tests it against the deprivation threshold.
///
/// Returns `true` when the student's sleep hours are at or below the
/// threshold (the boundary is inclusive). Pure: no shared state, safe to
/// call concurrently from any number of workers.
pub fn detect_sleep_deprivation(payload: &[u8], threshold: f32) -> Result<bool> {
    let student: Student = serde_json::from_slice(payload).map_err(Error::Decode)?;
    Ok(student.sleep_hours <= threshold)
}
