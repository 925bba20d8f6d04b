use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{CourseId, PageSize, SortDirection, SortField, SubjectId};

/// Query string sent with every data request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<CourseId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,
    pub page: u32,
    pub page_size: PageSize,
    pub sort_by: SortField,
    pub sort_direction: SortDirection,
}

/// Query string for requests that only bound the page size: the reachability
/// probe and the filter-option sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSizeOnlyQuery {
    pub page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default = "first_page")]
    pub current_page: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerformancePageResponse {
    #[serde(default)]
    pub data: Vec<PerformanceRecordWire>,
    #[serde(default)]
    pub pagination: Option<PaginationMeta>,
}

/// A record exactly as the backend sent it. Different backend versions use
/// different field names for the course and subject columns, so both spellings
/// are kept here and reconciled by the client's normalization step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerformanceRecordWire {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,
    #[serde(rename = "studentId", default, deserialize_with = "lenient_text")]
    pub student_id: Option<String>,
    #[serde(rename = "studentName", default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub course_id: Option<i64>,
    #[serde(rename = "courseId", default, deserialize_with = "lenient_id")]
    pub course_id_camel: Option<i64>,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub subject_id: Option<i64>,
    #[serde(rename = "subjectId", default, deserialize_with = "lenient_id")]
    pub subject_id_camel: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub grade: Option<String>,
    #[serde(rename = "submittedOn", default)]
    pub submitted_on: Option<String>,
    #[serde(rename = "modifiedOn", default)]
    pub modified_on: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Int(v) => v.to_string(),
        Scalar::Float(v) => v.to_string(),
        Scalar::Bool(v) => v.to_string(),
        Scalar::Text(v) => v,
    }))
}

// Ids that cannot be read as integers are dropped rather than failing the page.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<Scalar>::deserialize(deserializer)?.and_then(|value| match value {
            Scalar::Int(v) => Some(v),
            Scalar::Float(v) if v.fract() == 0.0 => Some(v as i64),
            Scalar::Text(v) => v.trim().parse().ok(),
            _ => None,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_record_accepts_both_naming_conventions() {
        let legacy: PerformanceRecordWire = serde_json::from_value(serde_json::json!({
            "studentId": 42,
            "studentName": "Ada",
            "course_name": "Math",
            "course_id": "7",
            "subject_name": "Algebra",
            "grade": 91.5,
        }))
        .expect("legacy record");
        assert_eq!(legacy.student_id.as_deref(), Some("42"));
        assert_eq!(legacy.course_name.as_deref(), Some("Math"));
        assert_eq!(legacy.course_id, Some(7));
        assert_eq!(legacy.grade.as_deref(), Some("91.5"));

        let current: PerformanceRecordWire = serde_json::from_value(serde_json::json!({
            "studentId": "S-1",
            "course": "Art",
            "courseId": 3,
            "subject": "Drawing",
            "subjectId": null,
            "grade": "A",
        }))
        .expect("current record");
        assert_eq!(current.course.as_deref(), Some("Art"));
        assert_eq!(current.course_id_camel, Some(3));
        assert_eq!(current.subject_id_camel, None);
    }

    #[test]
    fn non_numeric_ids_are_dropped() {
        let record: PerformanceRecordWire =
            serde_json::from_value(serde_json::json!({ "courseId": "abc" })).expect("record");
        assert_eq!(record.course_id_camel, None);
    }

    #[test]
    fn query_serializes_with_camel_case_names() {
        let query = PerformanceQuery {
            search: None,
            course_id: Some(CourseId(4)),
            subject_id: None,
            page: 2,
            page_size: PageSize::default(),
            sort_by: SortField::SubmittedOn,
            sort_direction: SortDirection::Desc,
        };
        let value = serde_json::to_value(&query).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "courseId": 4,
                "page": 2,
                "pageSize": 10,
                "sortBy": "submittedOn",
                "sortDirection": "desc",
            })
        );
    }
}
