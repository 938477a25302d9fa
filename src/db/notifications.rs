use crate::db::conversion_error;
use crate::errors::{AppError, AppResult};
use crate::models::notification::{NewNotification, Notification, NotificationKind};
use chrono::Local;
use rusqlite::{Connection, Row, params};

fn map_row(row: &Row) -> rusqlite::Result<Notification> {
    let kind_str: String = row.get("kind")?;
    let kind = NotificationKind::from_db_str(&kind_str).ok_or_else(|| {
        conversion_error(AppError::InvalidValue(format!("notification kind {kind_str}")))
    })?;

    Ok(Notification {
        id: row.get("id")?,
        recipient_id: row.get("recipient_id")?,
        sender_id: row.get("sender_id")?,
        kind,
        title: row.get("title")?,
        message: row.get("message")?,
        is_read: row.get::<_, i32>("is_read")? == 1,
        enrollment_id: row.get("enrollment_id")?,
        session_id: row.get("session_id")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_notification(conn: &Connection, n: &NewNotification) -> AppResult<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO notifications
            (recipient_id, sender_id, kind, title, message, enrollment_id, session_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    stmt.execute(params![
        n.recipient_id,
        n.sender_id,
        n.kind.to_db_str(),
        n.title,
        n.message,
        n.enrollment_id,
        n.session_id,
        Local::now().to_rfc3339(),
    ])?;
    Ok(conn.last_insert_rowid())
}

/// Newest first.
pub fn list_for_user(
    conn: &Connection,
    recipient_id: i64,
    unread_only: bool,
) -> AppResult<Vec<Notification>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM notifications
         WHERE recipient_id = ?1 AND (?2 = 0 OR is_read = 0)
         ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![recipient_id, unread_only as i32], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Returns false when no notification with that id belongs to the recipient.
pub fn mark_read(conn: &Connection, id: i64, recipient_id: i64) -> AppResult<bool> {
    let n = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND recipient_id = ?2",
        params![id, recipient_id],
    )?;
    Ok(n > 0)
}

pub fn mark_all_read(conn: &Connection, recipient_id: i64) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE recipient_id = ?1 AND is_read = 0",
        [recipient_id],
    )?)
}

pub fn count_unread(conn: &Connection, recipient_id: i64) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1 AND is_read = 0",
        [recipient_id],
        |r| r.get(0),
    )?)
}
