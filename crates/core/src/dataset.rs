//! Students CSV dataset loading.

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::Result;
use crate::student::{Student, StudentRow};

/// Loads the students dataset from a CSV file.
///
/// The file must carry the dataset's header row (`Student ID`, `Date`,
/// `Class Time`, ...); rows map into [`Student`] records.
pub fn load_students(path: impl AsRef<Path>) -> Result<Vec<Student>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;

    let mut students = Vec::new();
    for row in reader.deserialize::<StudentRow>() {
        students.push(row?.into());
    }

    Ok(students)
}

/// Shuffles the dataset deterministically.
///
/// The same seed always yields the same order, so producer runs are
/// reproducible.
pub fn shuffle_students(students: &mut [Student], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    students.shuffle(&mut rng);
}
