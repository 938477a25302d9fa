use crate::core::users::{require_self_or_admin, require_user};
use crate::db::notifications as q;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::notification::{NewNotification, Notification, NotificationKind};
use crate::models::user::Actor;
use rusqlite::Connection;

/// Queue one notification inside the caller's transaction.
pub fn send(
    conn: &Connection,
    recipient_id: i64,
    sender: &Actor,
    kind: NotificationKind,
    title: impl Into<String>,
    message: impl Into<String>,
) -> AppResult<i64> {
    q::insert_notification(
        conn,
        &NewNotification {
            recipient_id,
            sender_id: sender.user_id(),
            kind,
            title: title.into(),
            message: message.into(),
            enrollment_id: None,
            session_id: None,
        },
    )
}

/// Same as `send`, linked to an enrollment or a session.
pub fn send_linked(conn: &Connection, n: NewNotification) -> AppResult<i64> {
    q::insert_notification(conn, &n)
}

pub struct NotifyLogic;

impl NotifyLogic {
    pub fn list(
        pool: &DbPool,
        actor: &Actor,
        email: &str,
        unread_only: bool,
    ) -> AppResult<Vec<Notification>> {
        let user = require_user(&pool.conn, email)?;
        require_self_or_admin(actor, &user, "read notifications")?;
        q::list_for_user(&pool.conn, user.id, unread_only)
    }

    pub fn read(pool: &mut DbPool, actor: &Actor, email: &str, id: i64) -> AppResult<()> {
        let user = require_user(&pool.conn, email)?;
        require_self_or_admin(actor, &user, "read notifications")?;
        if !q::mark_read(&pool.conn, id, user.id)? {
            return Err(AppError::NotFound(format!(
                "notification {id} for {}",
                user.email
            )));
        }
        Ok(())
    }

    /// Returns how many notifications changed state.
    pub fn read_all(pool: &mut DbPool, actor: &Actor, email: &str) -> AppResult<usize> {
        let user = require_user(&pool.conn, email)?;
        require_self_or_admin(actor, &user, "read notifications")?;
        q::mark_all_read(&pool.conn, user.id)
    }
}
