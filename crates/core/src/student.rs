//! Student monitoring record types.
//!
//! The wire format is a JSON object with fixed snake_case field names;
//! the source dataset is a CSV file with human-readable headers. The two
//! shapes are separate types so serde can own both mappings.

use serde::{Deserialize, Serialize};

/// One per-student monitoring record.
///
/// Immutable once decoded; owned by the worker processing it and
/// discarded after classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: String,
    pub date: String,
    pub class_time: String,
    pub attendance_status: String,
    pub stress_level: f32,
    pub sleep_hours: f32,
    pub anxiety_level: i32,
    pub mood_score: i32,
    pub risk_level: String,
}

/// One row of the students CSV dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentRow {
    #[serde(rename = "Student ID")]
    pub student_id: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Class Time")]
    pub class_time: String,
    #[serde(rename = "Attendance Status")]
    pub attendance_status: String,
    #[serde(rename = "Stress Level (GSR)")]
    pub stress_level: f32,
    #[serde(rename = "Sleep Hours")]
    pub sleep_hours: f32,
    #[serde(rename = "Anxiety Level")]
    pub anxiety_level: i32,
    #[serde(rename = "Mood Score")]
    pub mood_score: i32,
    #[serde(rename = "Risk Level")]
    pub risk_level: String,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self {
            student_id: row.student_id,
            date: row.date,
            class_time: row.class_time,
            attendance_status: row.attendance_status,
            stress_level: row.stress_level,
            sleep_hours: row.sleep_hours,
            anxiety_level: row.anxiety_level,
            mood_score: row.mood_score,
            risk_level: row.risk_level,
        }
    }
}
