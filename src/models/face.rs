use serde::Serialize;

/// Reference image registered for a user; identity matching itself is external.
#[derive(Debug, Clone, Serialize)]
pub struct FaceRegistration {
    pub id: i64,
    pub user_id: i64,
    pub image_path: String,
    pub file_size: i64,
    pub registered_at: String,
    pub is_active: bool,
}

/// Outcome class of a verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Success,
    /// The verifier rejected the capture.
    Failed,
    /// The capture itself was unusable (missing, empty, too big, wrong format).
    PoorQuality,
}

impl VerificationStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            VerificationStatus::Success => "success",
            VerificationStatus::Failed => "failed",
            VerificationStatus::PoorQuality => "poor_quality",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "success" => Some(VerificationStatus::Success),
            "failed" => Some(VerificationStatus::Failed),
            "poor_quality" => Some(VerificationStatus::PoorQuality),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FaceAttempt {
    pub id: i64,
    pub user_id: i64,
    pub session_id: Option<i64>,
    pub status: VerificationStatus,
    pub image_path: String,
    pub message: String,
    pub attempted_at: String,
}
