//! Normalization of backend records into the one shape the dashboard renders.

use shared::{
    domain::{CourseId, SubjectId},
    protocol::PerformanceRecordWire,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PerformanceRecord {
    pub id: Option<i64>,
    pub student_id: String,
    pub student_name: String,
    pub course_name: String,
    pub course_id: Option<CourseId>,
    pub subject_name: String,
    pub subject_id: Option<SubjectId>,
    pub grade: String,
    pub submitted_on: String,
    pub modified_on: String,
}

impl From<PerformanceRecordWire> for PerformanceRecord {
    fn from(wire: PerformanceRecordWire) -> Self {
        Self {
            id: wire.id,
            student_id: wire.student_id.unwrap_or_default(),
            student_name: wire.student_name.unwrap_or_default(),
            course_name: first_non_empty(wire.course_name, wire.course),
            course_id: wire.course_id.or(wire.course_id_camel).map(CourseId),
            subject_name: first_non_empty(wire.subject_name, wire.subject),
            subject_id: wire.subject_id.or(wire.subject_id_camel).map(SubjectId),
            grade: wire.grade.unwrap_or_default(),
            submitted_on: wire.submitted_on.unwrap_or_default(),
            modified_on: wire.modified_on.unwrap_or_default(),
        }
    }
}

// An empty legacy name falls through to the newer field.
fn first_non_empty(preferred: Option<String>, fallback: Option<String>) -> String {
    preferred
        .filter(|value| !value.is_empty())
        .or(fallback)
        .unwrap_or_default()
}

pub fn normalize_all(records: Vec<PerformanceRecordWire>) -> Vec<PerformanceRecord> {
    records.into_iter().map(PerformanceRecord::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(value: serde_json::Value) -> PerformanceRecordWire {
        serde_json::from_value(value).expect("wire record")
    }

    #[test]
    fn legacy_names_win_over_new_names() {
        let record = PerformanceRecord::from(wire(serde_json::json!({
            "course_name": "Physics",
            "course": "ignored",
            "subject": "Optics",
        })));
        assert_eq!(record.course_name, "Physics");
        assert_eq!(record.subject_name, "Optics");
    }

    #[test]
    fn empty_legacy_name_falls_back() {
        let record = PerformanceRecord::from(wire(serde_json::json!({
            "course_name": "",
            "course": "Chemistry",
        })));
        assert_eq!(record.course_name, "Chemistry");
    }

    #[test]
    fn ids_are_read_from_either_spelling() {
        let record = PerformanceRecord::from(wire(serde_json::json!({
            "courseId": 12,
            "subject_id": 4,
        })));
        assert_eq!(record.course_id, Some(CourseId(12)));
        assert_eq!(record.subject_id, Some(SubjectId(4)));
    }
}
