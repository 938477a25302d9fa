use super::room::Room;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassType {
    Lecture,
    Tutorial,
    Practical,
    Seminar,
    Exam,
}

impl ClassType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ClassType::Lecture => "lecture",
            ClassType::Tutorial => "tutorial",
            ClassType::Practical => "practical",
            ClassType::Seminar => "seminar",
            ClassType::Exam => "exam",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lecture" => Some(ClassType::Lecture),
            "tutorial" => Some(ClassType::Tutorial),
            "practical" => Some(ClassType::Practical),
            "seminar" => Some(ClassType::Seminar),
            "exam" => Some(ClassType::Exam),
            _ => None,
        }
    }
}

/// How students may record presence for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceMethod {
    Manual,
    FaceRecognition,
    Both,
}

impl AttendanceMethod {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AttendanceMethod::Manual => "manual",
            AttendanceMethod::FaceRecognition => "face_recognition",
            AttendanceMethod::Both => "both",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "manual" => Some(AttendanceMethod::Manual),
            "face_recognition" | "face" => Some(AttendanceMethod::FaceRecognition),
            "both" => Some(AttendanceMethod::Both),
            _ => None,
        }
    }

    pub fn requires_face(&self) -> bool {
        matches!(self, AttendanceMethod::FaceRecognition)
    }

    pub fn accepts_face(&self) -> bool {
        !matches!(self, AttendanceMethod::Manual)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    None,
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl Recurrence {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Biweekly => "biweekly",
            Recurrence::Monthly => "monthly",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Recurrence::None),
            "daily" => Some(Recurrence::Daily),
            "weekly" => Some(Recurrence::Weekly),
            "biweekly" => Some(Recurrence::Biweekly),
            "monthly" => Some(Recurrence::Monthly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassSession {
    pub id: i64,
    pub assignment_id: i64,
    pub title: String,
    pub description: String,
    pub class_type: ClassType,

    pub scheduled_date: NaiveDate, // ⇔ class_sessions.scheduled_date (TEXT "YYYY-MM-DD")
    pub start_time: NaiveTime,     // ⇔ class_sessions.start_time (TEXT "HH:MM")
    pub end_time: NaiveTime,       // ⇔ class_sessions.end_time (TEXT "HH:MM")

    pub room_id: Option<i64>,
    pub custom_location: String,
    pub meeting_link: String,

    /// Minutes before start_time when marking opens (None → default).
    pub window_before: Option<i64>,
    /// Minutes after start_time when marking closes (None → default).
    pub window_after: Option<i64>,
    pub attendance_required: bool,
    pub attendance_method: AttendanceMethod,

    pub recurrence: Recurrence,
    pub recurrence_end: Option<NaiveDate>,
    pub parent_session: Option<i64>,

    pub is_active: bool,
    pub is_cancelled: bool,
    pub cancellation_reason: String,
    pub max_capacity: Option<u32>,
    pub created_at: String,
}

impl ClassSession {
    pub fn date_str(&self) -> String {
        self.scheduled_date.format("%Y-%m-%d").to_string()
    }

    pub fn start_str(&self) -> String {
        self.start_time.format("%H:%M").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end_time.format("%H:%M").to_string()
    }

    /// Room label, else custom location, else a placeholder.
    pub fn effective_location(&self, room: Option<&Room>) -> String {
        if let Some(r) = room {
            return r.label();
        }
        if self.custom_location.trim().is_empty() {
            "Location TBD".to_string()
        } else {
            self.custom_location.clone()
        }
    }

    pub fn effective_meeting_link(&self, room: Option<&Room>) -> Option<String> {
        if !self.meeting_link.is_empty() {
            return Some(self.meeting_link.clone());
        }
        match room {
            Some(r) if r.is_virtual() && !r.meeting_link.is_empty() => Some(r.meeting_link.clone()),
            _ => None,
        }
    }

    pub fn capacity(&self, room: Option<&Room>) -> Option<u32> {
        self.max_capacity.or(room.map(|r| r.capacity))
    }

    /// Same-day time overlap with another session.
    pub fn overlaps(&self, other: &ClassSession) -> bool {
        self.scheduled_date == other.scheduled_date
            && self.start_time < other.end_time
            && self.end_time > other.start_time
    }
}
