use crate::db::conversion_error;
use crate::errors::{AppError, AppResult};
use crate::models::enrollment::{Enrollment, EnrollmentStatus};
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn map_row(row: &Row) -> rusqlite::Result<Enrollment> {
    let status_str: String = row.get("status")?;
    let status = EnrollmentStatus::from_db_str(&status_str)
        .ok_or_else(|| conversion_error(AppError::InvalidStatus(status_str.clone())))?;

    Ok(Enrollment {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        assignment_id: row.get("assignment_id")?,
        status,
        requested_at: row.get("requested_at")?,
        processed_at: row.get("processed_at")?,
        processed_by: row.get("processed_by")?,
        notes: row.get("notes")?,
    })
}

pub fn insert_enrollment(
    conn: &Connection,
    student_id: i64,
    assignment_id: i64,
    status: EnrollmentStatus,
    processed_by: Option<i64>,
) -> AppResult<i64> {
    let now = Local::now().to_rfc3339();
    let processed_at = (status != EnrollmentStatus::Pending).then(|| now.clone());

    conn.execute(
        "INSERT INTO enrollments (student_id, assignment_id, status, requested_at, processed_at, processed_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            student_id,
            assignment_id,
            status.to_db_str(),
            now,
            processed_at,
            processed_by
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find(conn: &Connection, student_id: i64, assignment_id: i64) -> AppResult<Option<Enrollment>> {
    Ok(conn
        .query_row(
            "SELECT * FROM enrollments WHERE student_id = ?1 AND assignment_id = ?2",
            params![student_id, assignment_id],
            map_row,
        )
        .optional()?)
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<Enrollment>> {
    Ok(conn
        .query_row("SELECT * FROM enrollments WHERE id = ?1", [id], map_row)
        .optional()?)
}

pub fn update_status(
    conn: &Connection,
    id: i64,
    status: EnrollmentStatus,
    processed_by: Option<i64>,
    notes: &str,
) -> AppResult<()> {
    conn.execute(
        "UPDATE enrollments SET status = ?1, processed_at = ?2, processed_by = ?3, notes = ?4
         WHERE id = ?5",
        params![
            status.to_db_str(),
            Local::now().to_rfc3339(),
            processed_by,
            notes,
            id
        ],
    )?;
    Ok(())
}

pub fn is_approved(conn: &Connection, student_id: i64, assignment_id: i64) -> AppResult<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM enrollments
         WHERE student_id = ?1 AND assignment_id = ?2 AND status = 'approved'",
    )?;
    Ok(stmt.exists(params![student_id, assignment_id])?)
}

/// Student ids with an approved enrollment in the assignment.
pub fn approved_students(conn: &Connection, assignment_id: i64) -> AppResult<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT student_id FROM enrollments
         WHERE assignment_id = ?1 AND status = 'approved'
         ORDER BY student_id ASC",
    )?;
    let rows = stmt.query_map([assignment_id], |r| r.get(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Assignment ids the student is approved for.
pub fn approved_assignments(conn: &Connection, student_id: i64) -> AppResult<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT assignment_id FROM enrollments
         WHERE student_id = ?1 AND status = 'approved'
         ORDER BY assignment_id ASC",
    )?;
    let rows = stmt.query_map([student_id], |r| r.get(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn list_enrollments(
    conn: &Connection,
    student_id: Option<i64>,
    lecturer_id: Option<i64>,
    assignment_id: Option<i64>,
    status: Option<EnrollmentStatus>,
) -> AppResult<Vec<Enrollment>> {
    let mut stmt = conn.prepare(
        "SELECT e.* FROM enrollments e
         JOIN course_assignments a ON a.id = e.assignment_id
         WHERE (?1 IS NULL OR e.student_id = ?1)
           AND (?2 IS NULL OR a.lecturer_id = ?2)
           AND (?3 IS NULL OR e.assignment_id = ?3)
           AND (?4 IS NULL OR e.status = ?4)
         ORDER BY e.requested_at DESC, e.id DESC",
    )?;
    let rows = stmt.query_map(
        params![
            student_id,
            lecturer_id,
            assignment_id,
            status.map(|s| s.to_db_str())
        ],
        map_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_by_status(conn: &Connection, status: Option<EnrollmentStatus>) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM enrollments WHERE (?1 IS NULL OR status = ?1)",
        [status.map(|s| s.to_db_str())],
        |r| r.get(0),
    )?)
}

pub fn distinct_students_for_lecturer(conn: &Connection, lecturer_id: i64) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(DISTINCT e.student_id) FROM enrollments e
         JOIN course_assignments a ON a.id = e.assignment_id
         WHERE a.lecturer_id = ?1 AND e.status = 'approved'",
        [lecturer_id],
        |r| r.get(0),
    )?)
}
