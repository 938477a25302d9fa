//! Queries for colleges, departments and courses.

use crate::db::conversion_error;
use crate::errors::{AppError, AppResult};
use crate::models::catalog::{College, Course, Department};
use crate::models::role::Level;
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_college(row: &Row) -> rusqlite::Result<College> {
    Ok(College {
        id: row.get("id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        description: row.get("description")?,
        is_active: row.get::<_, i32>("is_active")? == 1,
        created_at: row.get("created_at")?,
    })
}

fn map_department(row: &Row) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get("id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        college_id: row.get("college_id")?,
        description: row.get("description")?,
        is_active: row.get::<_, i32>("is_active")? == 1,
        created_at: row.get("created_at")?,
    })
}

pub fn map_course(row: &Row) -> rusqlite::Result<Course> {
    let level_str: String = row.get("level")?;
    let level = Level::parse(&level_str)
        .ok_or_else(|| conversion_error(AppError::InvalidValue(format!("level {level_str}"))))?;

    Ok(Course {
        id: row.get("id")?,
        code: row.get("code")?,
        title: row.get("title")?,
        description: row.get("description")?,
        department_id: row.get("department_id")?,
        level,
        credit_units: row.get("credit_units")?,
        is_active: row.get::<_, i32>("is_active")? == 1,
        created_at: row.get("created_at")?,
    })
}

fn collect<T>(rows: impl Iterator<Item = rusqlite::Result<T>>) -> AppResult<Vec<T>> {
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------
// Colleges
// ---------------------------

pub fn insert_college(conn: &Connection, code: &str, name: &str, description: &str) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO colleges (code, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![code, name, description, Local::now().to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_college(
    conn: &Connection,
    id: i64,
    name: Option<&str>,
    description: Option<&str>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE colleges SET name = COALESCE(?1, name), description = COALESCE(?2, description)
         WHERE id = ?3",
        params![name, description, id],
    )?;
    Ok(())
}

pub fn find_college(conn: &Connection, code: &str) -> AppResult<Option<College>> {
    Ok(conn
        .query_row("SELECT * FROM colleges WHERE code = ?1", [code], map_college)
        .optional()?)
}

pub fn list_colleges(conn: &Connection, include_inactive: bool) -> AppResult<Vec<College>> {
    let mut stmt =
        conn.prepare("SELECT * FROM colleges WHERE (?1 = 1 OR is_active = 1) ORDER BY code ASC")?;
    let rows = stmt.query_map([include_inactive as i32], map_college)?;
    collect(rows)
}

pub fn deactivate_college(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("UPDATE colleges SET is_active = 0 WHERE id = ?1", [id])?;
    Ok(())
}

// ---------------------------
// Departments
// ---------------------------

pub fn insert_department(
    conn: &Connection,
    code: &str,
    name: &str,
    college_id: i64,
    description: &str,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO departments (code, name, college_id, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![code, name, college_id, description, Local::now().to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_department(
    conn: &Connection,
    id: i64,
    name: Option<&str>,
    description: Option<&str>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE departments SET name = COALESCE(?1, name), description = COALESCE(?2, description)
         WHERE id = ?3",
        params![name, description, id],
    )?;
    Ok(())
}

pub fn find_department(conn: &Connection, code: &str) -> AppResult<Option<Department>> {
    Ok(conn
        .query_row("SELECT * FROM departments WHERE code = ?1", [code], map_department)
        .optional()?)
}

pub fn find_department_by_id(conn: &Connection, id: i64) -> AppResult<Option<Department>> {
    Ok(conn
        .query_row("SELECT * FROM departments WHERE id = ?1", [id], map_department)
        .optional()?)
}

pub fn list_departments(
    conn: &Connection,
    college_id: Option<i64>,
    include_inactive: bool,
) -> AppResult<Vec<Department>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM departments
         WHERE (?1 IS NULL OR college_id = ?1) AND (?2 = 1 OR is_active = 1)
         ORDER BY code ASC",
    )?;
    let rows = stmt.query_map(params![college_id, include_inactive as i32], map_department)?;
    collect(rows)
}

pub fn deactivate_department(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("UPDATE departments SET is_active = 0 WHERE id = ?1", [id])?;
    Ok(())
}

// ---------------------------
// Courses
// ---------------------------

pub struct NewCourse<'a> {
    pub code: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub department_id: i64,
    pub level: Level,
    pub credit_units: i32,
}

pub fn insert_course(conn: &Connection, c: &NewCourse) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO courses (code, title, description, department_id, level, credit_units, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            c.code,
            c.title,
            c.description,
            c.department_id,
            c.level.to_db_str(),
            c.credit_units,
            Local::now().to_rfc3339()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_course(
    conn: &Connection,
    id: i64,
    title: Option<&str>,
    description: Option<&str>,
    credit_units: Option<i32>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE courses SET title = COALESCE(?1, title),
                            description = COALESCE(?2, description),
                            credit_units = COALESCE(?3, credit_units)
         WHERE id = ?4",
        params![title, description, credit_units, id],
    )?;
    Ok(())
}

pub fn find_course(conn: &Connection, code: &str) -> AppResult<Option<Course>> {
    Ok(conn
        .query_row("SELECT * FROM courses WHERE code = ?1", [code], map_course)
        .optional()?)
}

pub fn find_course_by_id(conn: &Connection, id: i64) -> AppResult<Option<Course>> {
    Ok(conn
        .query_row("SELECT * FROM courses WHERE id = ?1", [id], map_course)
        .optional()?)
}

pub fn list_courses(
    conn: &Connection,
    department_id: Option<i64>,
    level: Option<Level>,
    search: Option<&str>,
    include_inactive: bool,
) -> AppResult<Vec<Course>> {
    let pattern = search.map(|s| format!("%{}%", s.trim().to_lowercase()));
    let mut stmt = conn.prepare(
        "SELECT * FROM courses
         WHERE (?1 IS NULL OR department_id = ?1)
           AND (?2 IS NULL OR level = ?2)
           AND (?3 IS NULL OR lower(code) LIKE ?3 OR lower(title) LIKE ?3)
           AND (?4 = 1 OR is_active = 1)
         ORDER BY code ASC",
    )?;
    let rows = stmt.query_map(
        params![
            department_id,
            level.map(|l| l.to_db_str()),
            pattern,
            include_inactive as i32
        ],
        map_course,
    )?;
    collect(rows)
}

pub fn deactivate_course(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("UPDATE courses SET is_active = 0 WHERE id = ?1", [id])?;
    Ok(())
}

pub fn count_active(conn: &Connection, table: &str) -> AppResult<i64> {
    // table comes from a fixed set in core::report
    Ok(conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE is_active = 1"),
        [],
        |r| r.get(0),
    )?)
}
