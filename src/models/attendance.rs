use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Excused => "excused",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            "late" => Some(AttendanceStatus::Late),
            "excused" => Some(AttendanceStatus::Excused),
            _ => None,
        }
    }

    /// Helper: CLI input, any case, single-letter shortcuts allowed
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "p" => Some(AttendanceStatus::Present),
            "a" => Some(AttendanceStatus::Absent),
            "l" => Some(AttendanceStatus::Late),
            "e" => Some(AttendanceStatus::Excused),
            other => AttendanceStatus::from_db_str(other),
        }
    }

    /// Present and late both count as attended.
    pub fn is_attended(&self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

/// Origin of an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkMethod {
    /// Student marked within the window.
    SelfMark,
    /// Lecturer/admin set the status.
    Manual,
    /// Filled in as absent when the session was closed.
    Close,
}

impl MarkMethod {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            MarkMethod::SelfMark => "self",
            MarkMethod::Manual => "manual",
            MarkMethod::Close => "close",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "self" => Some(MarkMethod::SelfMark),
            "manual" => Some(MarkMethod::Manual),
            "close" => Some(MarkMethod::Close),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub session_id: i64,
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub marked_at: String,
    pub face_verified: bool,
    pub method: MarkMethod,
    pub notes: String,
}
