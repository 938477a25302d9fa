use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Lecturer,
    Student,
}

impl Role {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Lecturer => "lecturer",
            Role::Student => "student",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "lecturer" => Some(Role::Lecturer),
            "student" => Some(Role::Student),
            _ => None,
        }
    }

    /// Helper: convert input code from CLI (any case, single-letter shortcuts allowed)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "a" => Some(Role::Admin),
            "l" => Some(Role::Lecturer),
            "s" => Some(Role::Student),
            other => Role::from_db_str(other),
        }
    }
}

/// Academic level of courses and students (100..500).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Level(u16);

impl Level {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "100" => Some(Level(100)),
            "200" => Some(Level(200)),
            "300" => Some(Level(300)),
            "400" => Some(Level(400)),
            "500" => Some(Level(500)),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> String {
        self.0.to_string()
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}
