use crate::db::conversion_error;
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceRecord, AttendanceStatus, MarkMethod};
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn map_row(row: &Row) -> rusqlite::Result<AttendanceRecord> {
    let status_str: String = row.get("status")?;
    let status = AttendanceStatus::from_db_str(&status_str)
        .ok_or_else(|| conversion_error(AppError::InvalidStatus(status_str.clone())))?;

    let method_str: String = row.get("method")?;
    let method = MarkMethod::from_db_str(&method_str)
        .ok_or_else(|| conversion_error(AppError::InvalidValue(format!("method {method_str}"))))?;

    Ok(AttendanceRecord {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        student_id: row.get("student_id")?,
        status,
        marked_at: row.get("marked_at")?,
        face_verified: row.get::<_, i32>("face_verified")? == 1,
        method,
        notes: row.get("notes")?,
    })
}

/// Insert a record; a second insert for the same (session, student) fails
/// on the UNIQUE constraint.
pub fn insert_record(conn: &Connection, rec: &AttendanceRecord) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO class_attendances (session_id, student_id, status, marked_at, face_verified, method, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            rec.session_id,
            rec.student_id,
            rec.status.to_db_str(),
            rec.marked_at,
            rec.face_verified as i32,
            rec.method.to_db_str(),
            rec.notes,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_record(conn: &Connection, rec: &AttendanceRecord) -> AppResult<()> {
    conn.execute(
        "UPDATE class_attendances SET status = ?1, marked_at = ?2, method = ?3, notes = ?4
         WHERE id = ?5",
        params![
            rec.status.to_db_str(),
            rec.marked_at,
            rec.method.to_db_str(),
            rec.notes,
            rec.id
        ],
    )?;
    Ok(())
}

pub fn find(conn: &Connection, session_id: i64, student_id: i64) -> AppResult<Option<AttendanceRecord>> {
    Ok(conn
        .query_row(
            "SELECT * FROM class_attendances WHERE session_id = ?1 AND student_id = ?2",
            params![session_id, student_id],
            map_row,
        )
        .optional()?)
}

pub fn has_record(conn: &Connection, session_id: i64, student_id: i64) -> AppResult<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM class_attendances WHERE session_id = ?1 AND student_id = ?2",
    )?;
    Ok(stmt.exists(params![session_id, student_id])?)
}

pub fn list_for_session(conn: &Connection, session_id: i64) -> AppResult<Vec<AttendanceRecord>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM class_attendances WHERE session_id = ?1 ORDER BY marked_at ASC, id ASC",
    )?;
    let rows = stmt.query_map([session_id], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Session ids the student already has a record for.
pub fn sessions_marked_by(conn: &Connection, student_id: i64) -> AppResult<Vec<i64>> {
    let mut stmt =
        conn.prepare("SELECT session_id FROM class_attendances WHERE student_id = ?1")?;
    let rows = stmt.query_map([student_id], |r| r.get(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Record count per status for a session.
pub fn status_counts(conn: &Connection, session_id: i64) -> AppResult<Vec<(AttendanceStatus, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM class_attendances WHERE session_id = ?1 GROUP BY status",
    )?;
    let rows = stmt.query_map([session_id], |r| {
        let s: String = r.get(0)?;
        let status = AttendanceStatus::from_db_str(&s)
            .ok_or_else(|| conversion_error(AppError::InvalidStatus(s.clone())))?;
        Ok((status, r.get(1)?))
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
