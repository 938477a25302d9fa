use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists. Migrations record themselves there.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20251006_0001_initial_schema",
        description: "Created catalog, enrollment, session and attendance tables",
        sql: r#"
        CREATE TABLE IF NOT EXISTS colleges (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            code        TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            is_active   INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS departments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            code        TEXT NOT NULL UNIQUE,
            college_id  INTEGER NOT NULL REFERENCES colleges(id) ON DELETE CASCADE,
            description TEXT NOT NULL DEFAULT '',
            is_active   INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            email         TEXT NOT NULL UNIQUE,
            full_name     TEXT NOT NULL,
            role          TEXT NOT NULL CHECK(role IN ('admin','lecturer','student')),
            student_id    TEXT UNIQUE,
            lecturer_id   TEXT UNIQUE,
            department_id INTEGER REFERENCES departments(id) ON DELETE SET NULL,
            level         TEXT CHECK(level IS NULL OR level IN ('100','200','300','400','500')),
            is_active     INTEGER NOT NULL DEFAULT 1,
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS courses (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            code          TEXT NOT NULL UNIQUE,
            title         TEXT NOT NULL,
            description   TEXT NOT NULL DEFAULT '',
            department_id INTEGER NOT NULL REFERENCES departments(id) ON DELETE CASCADE,
            level         TEXT NOT NULL CHECK(level IN ('100','200','300','400','500')),
            credit_units  INTEGER NOT NULL DEFAULT 3,
            is_active     INTEGER NOT NULL DEFAULT 1,
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS course_assignments (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            course_id     INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
            lecturer_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            academic_year TEXT NOT NULL,
            semester      TEXT NOT NULL,
            is_active     INTEGER NOT NULL DEFAULT 1,
            assigned_by   INTEGER REFERENCES users(id) ON DELETE SET NULL,
            assigned_at   TEXT NOT NULL,
            UNIQUE(course_id, lecturer_id, academic_year, semester)
        );

        CREATE TABLE IF NOT EXISTS enrollments (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            assignment_id INTEGER NOT NULL REFERENCES course_assignments(id) ON DELETE CASCADE,
            status        TEXT NOT NULL DEFAULT 'pending'
                          CHECK(status IN ('pending','approved','rejected','withdrawn','completed')),
            requested_at  TEXT NOT NULL,
            processed_at  TEXT,
            processed_by  INTEGER REFERENCES users(id) ON DELETE SET NULL,
            notes         TEXT NOT NULL DEFAULT '',
            UNIQUE(student_id, assignment_id)
        );

        CREATE TABLE IF NOT EXISTS rooms (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            code         TEXT NOT NULL UNIQUE,
            name         TEXT NOT NULL,
            room_type    TEXT NOT NULL CHECK(room_type IN ('physical','virtual')),
            capacity     INTEGER NOT NULL CHECK(capacity >= 0),
            building     TEXT NOT NULL DEFAULT '',
            floor        TEXT NOT NULL DEFAULT '',
            facilities   TEXT NOT NULL DEFAULT '',
            platform     TEXT,
            meeting_link TEXT NOT NULL DEFAULT '',
            is_available INTEGER NOT NULL DEFAULT 1,
            notes        TEXT NOT NULL DEFAULT '',
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS class_sessions (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            assignment_id       INTEGER NOT NULL REFERENCES course_assignments(id) ON DELETE CASCADE,
            title               TEXT NOT NULL,
            description         TEXT NOT NULL DEFAULT '',
            class_type          TEXT NOT NULL DEFAULT 'lecture',
            scheduled_date      TEXT NOT NULL,
            start_time          TEXT NOT NULL,
            end_time            TEXT NOT NULL,
            room_id             INTEGER REFERENCES rooms(id) ON DELETE SET NULL,
            custom_location     TEXT NOT NULL DEFAULT '',
            meeting_link        TEXT NOT NULL DEFAULT '',
            window_before       INTEGER,
            window_after        INTEGER,
            attendance_required INTEGER NOT NULL DEFAULT 1,
            attendance_method   TEXT NOT NULL DEFAULT 'face_recognition',
            recurrence          TEXT NOT NULL DEFAULT 'none',
            recurrence_end      TEXT,
            parent_session      INTEGER REFERENCES class_sessions(id) ON DELETE CASCADE,
            is_active           INTEGER NOT NULL DEFAULT 1,
            is_cancelled        INTEGER NOT NULL DEFAULT 0,
            cancellation_reason TEXT NOT NULL DEFAULT '',
            max_capacity        INTEGER,
            created_at          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS class_attendances (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id    INTEGER NOT NULL REFERENCES class_sessions(id) ON DELETE CASCADE,
            student_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            status        TEXT NOT NULL DEFAULT 'present'
                          CHECK(status IN ('present','absent','late','excused')),
            marked_at     TEXT NOT NULL,
            face_verified INTEGER NOT NULL DEFAULT 0,
            method        TEXT NOT NULL DEFAULT 'self',
            notes         TEXT NOT NULL DEFAULT '',
            UNIQUE(session_id, student_id)
        );

        CREATE TABLE IF NOT EXISTS notifications (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            recipient_id  INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            sender_id     INTEGER REFERENCES users(id) ON DELETE SET NULL,
            kind          TEXT NOT NULL,
            title         TEXT NOT NULL,
            message       TEXT NOT NULL,
            is_read       INTEGER NOT NULL DEFAULT 0,
            enrollment_id INTEGER REFERENCES enrollments(id) ON DELETE CASCADE,
            session_id    INTEGER REFERENCES class_sessions(id) ON DELETE CASCADE,
            created_at    TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20251020_0002_face_registrations",
        description: "Added face_registrations table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS face_registrations (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
            image_path    TEXT NOT NULL,
            file_size     INTEGER NOT NULL,
            registered_at TEXT NOT NULL,
            is_active     INTEGER NOT NULL DEFAULT 1
        );
        "#,
    },
    Migration {
        version: "20251103_0003_lookup_indexes",
        description: "Added lookup indexes on sessions, enrollments and attendance",
        sql: r#"
        CREATE INDEX IF NOT EXISTS idx_sessions_date_start ON class_sessions(scheduled_date, start_time);
        CREATE INDEX IF NOT EXISTS idx_sessions_assignment_date ON class_sessions(assignment_id, scheduled_date);
        CREATE INDEX IF NOT EXISTS idx_sessions_room_date ON class_sessions(room_id, scheduled_date);
        CREATE INDEX IF NOT EXISTS idx_enrollments_assignment_status ON enrollments(assignment_id, status);
        CREATE INDEX IF NOT EXISTS idx_attendance_student ON class_attendances(student_id);
        CREATE INDEX IF NOT EXISTS idx_notifications_recipient ON notifications(recipient_id, is_read);
        "#,
    },
    Migration {
        version: "20251117_0004_face_verification_logs",
        description: "Added face_verification_logs table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS face_verification_logs (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id      INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            session_id   INTEGER REFERENCES class_sessions(id) ON DELETE SET NULL,
            status       TEXT NOT NULL CHECK(status IN ('success','failed','poor_quality')),
            image_path   TEXT NOT NULL DEFAULT '',
            message      TEXT NOT NULL DEFAULT '',
            attempted_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_face_logs_user ON face_verification_logs(user_id, attempted_at);
        "#,
    },
];

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> Result<()> {
    conn.execute_batch("BEGIN;")?;

    let outcome = conn.execute_batch(m.sql).and_then(|_| {
        conn.execute(
            "INSERT INTO log (date, operation, target, message)
             VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
            [m.version, m.description],
        )
    });

    match outcome {
        Ok(_) => conn.execute_batch("COMMIT;"),
        Err(e) => {
            conn.execute_batch("ROLLBACK;").ok();
            Err(e)
        }
    }
}

/// Versions that have not been applied yet, in order.
pub fn pending_migrations(conn: &Connection) -> Result<Vec<&'static str>> {
    ensure_log_table(conn)?;
    let mut out = Vec::new();
    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            out.push(m.version);
        }
    }
    Ok(out)
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;

    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }

        apply(conn, m)?;
        success(format!("Migration applied: {} → {}", m.version, m.description));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        assert!(pending_migrations(&conn).unwrap().is_empty());

        run_pending_migrations(&conn).unwrap();
        let applied: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(applied as usize, MIGRATIONS.len());
    }
}
