use super::role::{Level, Role};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub student_id: Option<String>,
    pub lecturer_id: Option<String>,
    pub department_id: Option<i64>,
    pub level: Option<Level>,
    pub is_active: bool,
    pub created_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Institutional id shown in tables (student or staff number).
    pub fn display_id(&self) -> &str {
        self.student_id
            .as_deref()
            .or(self.lecturer_id.as_deref())
            .unwrap_or("N/A")
    }
}

/// Who is performing a mutating command.
///
/// `Operator` is the local owner of the database file and carries admin rights;
/// `User` is a named account passed with `--by`.
#[derive(Debug, Clone)]
pub enum Actor {
    Operator,
    User(User),
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        match self {
            Actor::Operator => true,
            Actor::User(u) => u.is_admin(),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            Actor::Operator => None,
            Actor::User(u) => Some(u.id),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Actor::Operator => "operator".to_string(),
            Actor::User(u) => u.email.clone(),
        }
    }
}
