//! Test fixtures.

use detector_core::Student;

/// A well-formed student record with the given sleep hours.
pub fn student(sleep_hours: f32) -> Student {
    Student {
        student_id: "S-100".to_string(),
        date: "2024-03-01".to_string(),
        class_time: "09:00".to_string(),
        attendance_status: "Present".to_string(),
        stress_level: 2.0,
        sleep_hours,
        anxiety_level: 4,
        mood_score: 6,
        risk_level: "Low".to_string(),
    }
}

/// JSON payload for a student with the given sleep hours.
pub fn student_payload(sleep_hours: f32) -> Vec<u8> {
    serde_json::to_vec(&student(sleep_hours)).expect("student serializes")
}

/// Bytes that are not valid JSON.
pub fn malformed_payload() -> Vec<u8> {
    b"definitely not json".to_vec()
}
