use serde::Serialize;

/// Flat attendance row shared by every export format.
#[derive(Serialize, Clone, Debug)]
pub struct AttendanceExport {
    pub id: i64,
    pub date: String,
    pub start_time: String,
    pub course: String,
    pub session: String,
    pub student: String,
    pub student_id: String,
    pub status: String,
    pub marked_at: String,
    pub face_verified: bool,
    pub method: String,
}

pub(crate) fn get_headers() -> Vec<&'static str> {
    vec![
        "id",
        "date",
        "start_time",
        "course",
        "session",
        "student",
        "student_id",
        "status",
        "marked_at",
        "face_verified",
        "method",
    ]
}

pub(crate) fn record_to_row(r: &AttendanceExport) -> Vec<String> {
    vec![
        r.id.to_string(),
        r.date.clone(),
        r.start_time.clone(),
        r.course.clone(),
        r.session.clone(),
        r.student.clone(),
        r.student_id.clone(),
        r.status.clone(),
        r.marked_at.clone(),
        r.face_verified.to_string(),
        r.method.clone(),
    ]
}

pub(crate) fn records_to_table(records: &[AttendanceExport]) -> Vec<Vec<String>> {
    records.iter().map(record_to_row).collect()
}
