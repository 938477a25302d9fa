use crate::db::conversion_error;
use crate::errors::{AppError, AppResult};
use crate::models::face::{FaceAttempt, FaceRegistration, VerificationStatus};
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_row(row: &Row) -> rusqlite::Result<FaceRegistration> {
    Ok(FaceRegistration {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        image_path: row.get("image_path")?,
        file_size: row.get("file_size")?,
        registered_at: row.get("registered_at")?,
        is_active: row.get::<_, i32>("is_active")? == 1,
    })
}

/// Insert or replace the registration of a user (one per user).
pub fn upsert_registration(
    conn: &Connection,
    user_id: i64,
    image_path: &str,
    file_size: i64,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO face_registrations (user_id, image_path, file_size, registered_at, is_active)
         VALUES (?1, ?2, ?3, ?4, 1)
         ON CONFLICT(user_id) DO UPDATE SET
            image_path = excluded.image_path,
            file_size = excluded.file_size,
            registered_at = excluded.registered_at,
            is_active = 1",
        params![user_id, image_path, file_size, Local::now().to_rfc3339()],
    )?;
    Ok(())
}

pub fn find_active(conn: &Connection, user_id: i64) -> AppResult<Option<FaceRegistration>> {
    Ok(conn
        .query_row(
            "SELECT * FROM face_registrations WHERE user_id = ?1 AND is_active = 1",
            [user_id],
            map_row,
        )
        .optional()?)
}

/// Returns false when the user had no active registration.
pub fn deactivate(conn: &Connection, user_id: i64) -> AppResult<bool> {
    let n = conn.execute(
        "UPDATE face_registrations SET is_active = 0 WHERE user_id = ?1 AND is_active = 1",
        [user_id],
    )?;
    Ok(n > 0)
}

fn map_attempt(row: &Row) -> rusqlite::Result<FaceAttempt> {
    let status_str: String = row.get("status")?;
    let status = VerificationStatus::from_db_str(&status_str).ok_or_else(|| {
        conversion_error(AppError::InvalidValue(format!("verification status {status_str}")))
    })?;

    Ok(FaceAttempt {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        session_id: row.get("session_id")?,
        status,
        image_path: row.get("image_path")?,
        message: row.get("message")?,
        attempted_at: row.get("attempted_at")?,
    })
}

pub fn log_attempt(
    conn: &Connection,
    user_id: i64,
    session_id: Option<i64>,
    status: VerificationStatus,
    image_path: &str,
    message: &str,
    attempted_at: &str,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO face_verification_logs
            (user_id, session_id, status, image_path, message, attempted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![user_id, session_id, status.to_db_str(), image_path, message, attempted_at],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent attempts first; `limit` of `None` returns all.
pub fn list_attempts(conn: &Connection, user_id: i64, limit: Option<usize>) -> AppResult<Vec<FaceAttempt>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM face_verification_logs
         WHERE user_id = ?1
         ORDER BY attempted_at DESC, id DESC
         LIMIT ?2",
    )?;
    let limit = limit.map(|n| n as i64).unwrap_or(-1);
    let rows = stmt.query_map(params![user_id, limit], map_attempt)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
