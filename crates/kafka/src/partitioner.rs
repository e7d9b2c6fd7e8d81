//! Partition routing for produced records.

use std::hash::{Hash, Hasher};

/// Computes a stable partition for a student id.
///
/// The same id always lands on the same partition, so all records for one
/// student stay ordered within their partition.
pub fn partition_for(student_id: &str, num_partitions: i32) -> i32 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    student_id.hash(&mut hasher);
    let hash = hasher.finish();
    (hash % num_partitions as u64) as i32
}
