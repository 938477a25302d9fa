//! Academic catalog rows: colleges, departments and courses.

use super::role::Level;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct College {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub college_id: i64,
    pub description: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub description: String,
    pub department_id: i64,
    pub level: Level,
    pub credit_units: i32,
    pub is_active: bool,
    pub created_at: String,
}

/// Codes are stored upper-case and without surrounding blanks.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
