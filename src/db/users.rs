use crate::db::{conversion_error, non_empty};
use crate::errors::{AppError, AppResult};
use crate::models::role::{Level, Role};
use crate::models::user::User;
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str =
    "id, email, full_name, role, student_id, lecturer_id, department_id, level, is_active, created_at";

pub fn map_row(row: &Row) -> rusqlite::Result<User> {
    let role_str: String = row.get("role")?;
    let role = Role::from_db_str(&role_str)
        .ok_or_else(|| conversion_error(AppError::InvalidRole(role_str.clone())))?;

    let level = match row.get::<_, Option<String>>("level")? {
        Some(s) => Some(
            Level::parse(&s)
                .ok_or_else(|| conversion_error(AppError::InvalidValue(format!("level {s}"))))?,
        ),
        None => None,
    };

    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        full_name: row.get("full_name")?,
        role,
        student_id: non_empty(row.get("student_id")?),
        lecturer_id: non_empty(row.get("lecturer_id")?),
        department_id: row.get("department_id")?,
        level,
        is_active: row.get::<_, i32>("is_active")? == 1,
        created_at: row.get("created_at")?,
    })
}

pub struct NewUser<'a> {
    pub email: &'a str,
    pub full_name: &'a str,
    pub role: Role,
    pub student_id: Option<&'a str>,
    pub lecturer_id: Option<&'a str>,
    pub department_id: Option<i64>,
    pub level: Option<Level>,
}

pub fn insert_user(conn: &Connection, u: &NewUser) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO users (email, full_name, role, student_id, lecturer_id, department_id, level, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            u.email,
            u.full_name,
            u.role.to_db_str(),
            u.student_id,
            u.lecturer_id,
            u.department_id,
            u.level.map(|l| l.to_db_str()),
            Local::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_email(conn: &Connection, email: &str) -> AppResult<Option<User>> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE email = ?1");
    Ok(conn
        .query_row(&sql, [email.trim().to_lowercase()], map_row)
        .optional()?)
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<User>> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], map_row).optional()?)
}

pub fn id_taken(conn: &Connection, column: &str, value: &str) -> AppResult<bool> {
    // column comes from a fixed set in core::users, never from user input
    let sql = format!("SELECT 1 FROM users WHERE {column} = ?1 LIMIT 1");
    let mut stmt = conn.prepare(&sql)?;
    Ok(stmt.exists([value])?)
}

pub fn list_users(
    conn: &Connection,
    role: Option<Role>,
    department_id: Option<i64>,
    include_inactive: bool,
) -> AppResult<Vec<User>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM users
         WHERE (?1 IS NULL OR role = ?1)
           AND (?2 IS NULL OR department_id = ?2)
           AND (?3 = 1 OR is_active = 1)
         ORDER BY role ASC, full_name ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![
            role.map(|r| r.to_db_str()),
            department_id,
            include_inactive as i32
        ],
        map_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn set_active(conn: &Connection, id: i64, active: bool) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE users SET is_active = ?1 WHERE id = ?2",
        params![active as i32, id],
    )?)
}

pub fn count_users(conn: &Connection, role: Option<Role>) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM users WHERE (?1 IS NULL OR role = ?1)",
        [role.map(|r| r.to_db_str())],
        |r| r.get(0),
    )?)
}
