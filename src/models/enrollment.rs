use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
    Withdrawn,
    Completed,
}

impl EnrollmentStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Approved => "approved",
            EnrollmentStatus::Rejected => "rejected",
            EnrollmentStatus::Withdrawn => "withdrawn",
            EnrollmentStatus::Completed => "completed",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(EnrollmentStatus::Pending),
            "approved" => Some(EnrollmentStatus::Approved),
            "rejected" => Some(EnrollmentStatus::Rejected),
            "withdrawn" => Some(EnrollmentStatus::Withdrawn),
            "completed" => Some(EnrollmentStatus::Completed),
            _ => None,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::from_db_str(&code.to_lowercase())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub assignment_id: i64,
    pub status: EnrollmentStatus,
    pub requested_at: String,
    pub processed_at: Option<String>,
    pub processed_by: Option<i64>,
    pub notes: String,
}
