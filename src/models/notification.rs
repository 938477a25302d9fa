use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    EnrollmentRequest,
    EnrollmentApproved,
    EnrollmentRejected,
    ClassScheduled,
    ClassCancelled,
    ClassUpdated,
    AssignmentCreated,
    General,
}

impl NotificationKind {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            NotificationKind::EnrollmentRequest => "enrollment_request",
            NotificationKind::EnrollmentApproved => "enrollment_approved",
            NotificationKind::EnrollmentRejected => "enrollment_rejected",
            NotificationKind::ClassScheduled => "class_scheduled",
            NotificationKind::ClassCancelled => "class_cancelled",
            NotificationKind::ClassUpdated => "class_updated",
            NotificationKind::AssignmentCreated => "assignment_created",
            NotificationKind::General => "general",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "enrollment_request" => Some(NotificationKind::EnrollmentRequest),
            "enrollment_approved" => Some(NotificationKind::EnrollmentApproved),
            "enrollment_rejected" => Some(NotificationKind::EnrollmentRejected),
            "class_scheduled" => Some(NotificationKind::ClassScheduled),
            "class_cancelled" => Some(NotificationKind::ClassCancelled),
            "class_updated" => Some(NotificationKind::ClassUpdated),
            "assignment_created" => Some(NotificationKind::AssignmentCreated),
            "general" => Some(NotificationKind::General),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: i64,
    pub recipient_id: i64,
    pub sender_id: Option<i64>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub enrollment_id: Option<i64>,
    pub session_id: Option<i64>,
    pub created_at: String,
}

/// Draft of a notification before it gets an id.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: i64,
    pub sender_id: Option<i64>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub enrollment_id: Option<i64>,
    pub session_id: Option<i64>,
}
