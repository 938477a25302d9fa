use serde::Serialize;

/// A lecturer teaching a course in a given academic term.
#[derive(Debug, Clone, Serialize)]
pub struct CourseAssignment {
    pub id: i64,
    pub course_id: i64,
    pub lecturer_id: i64,
    pub academic_year: String,
    pub semester: String,
    pub is_active: bool,
    pub assigned_by: Option<i64>,
    pub assigned_at: String,
}
