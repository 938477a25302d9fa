use crate::db::{DATE_FMT, TIME_FMT, conversion_error, parse_db_date, parse_db_time};
use crate::errors::{AppError, AppResult};
use crate::models::class_session::{AttendanceMethod, ClassSession, ClassType, Recurrence};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn map_row(row: &Row) -> rusqlite::Result<ClassSession> {
    let date_str: String = row.get("scheduled_date")?;
    let start_str: String = row.get("start_time")?;
    let end_str: String = row.get("end_time")?;

    let type_str: String = row.get("class_type")?;
    let class_type = ClassType::from_db_str(&type_str)
        .ok_or_else(|| conversion_error(AppError::InvalidValue(format!("class type {type_str}"))))?;

    let method_str: String = row.get("attendance_method")?;
    let attendance_method = AttendanceMethod::from_db_str(&method_str).ok_or_else(|| {
        conversion_error(AppError::InvalidValue(format!(
            "attendance method {method_str}"
        )))
    })?;

    let rec_str: String = row.get("recurrence")?;
    let recurrence = Recurrence::from_db_str(&rec_str)
        .ok_or_else(|| conversion_error(AppError::InvalidValue(format!("recurrence {rec_str}"))))?;

    let recurrence_end = match row.get::<_, Option<String>>("recurrence_end")? {
        Some(s) => Some(parse_db_date(&s)?),
        None => None,
    };

    Ok(ClassSession {
        id: row.get("id")?,
        assignment_id: row.get("assignment_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        class_type,
        scheduled_date: parse_db_date(&date_str)?,
        start_time: parse_db_time(&start_str)?,
        end_time: parse_db_time(&end_str)?,
        room_id: row.get("room_id")?,
        custom_location: row.get("custom_location")?,
        meeting_link: row.get("meeting_link")?,
        window_before: row.get("window_before")?,
        window_after: row.get("window_after")?,
        attendance_required: row.get::<_, i32>("attendance_required")? == 1,
        attendance_method,
        recurrence,
        recurrence_end,
        parent_session: row.get("parent_session")?,
        is_active: row.get::<_, i32>("is_active")? == 1,
        is_cancelled: row.get::<_, i32>("is_cancelled")? == 1,
        cancellation_reason: row.get("cancellation_reason")?,
        max_capacity: row.get("max_capacity")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_session(conn: &Connection, s: &ClassSession) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO class_sessions (
            assignment_id, title, description, class_type, scheduled_date, start_time, end_time,
            room_id, custom_location, meeting_link, window_before, window_after,
            attendance_required, attendance_method, recurrence, recurrence_end, parent_session,
            max_capacity, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        params![
            s.assignment_id,
            s.title,
            s.description,
            s.class_type.to_db_str(),
            s.scheduled_date.format(DATE_FMT).to_string(),
            s.start_time.format(TIME_FMT).to_string(),
            s.end_time.format(TIME_FMT).to_string(),
            s.room_id,
            s.custom_location,
            s.meeting_link,
            s.window_before,
            s.window_after,
            s.attendance_required as i32,
            s.attendance_method.to_db_str(),
            s.recurrence.to_db_str(),
            s.recurrence_end.map(|d| d.format(DATE_FMT).to_string()),
            s.parent_session,
            s.max_capacity,
            Local::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<ClassSession>> {
    Ok(conn
        .query_row("SELECT * FROM class_sessions WHERE id = ?1", [id], map_row)
        .optional()?)
}

/// Rewrites the editable fields of one session; recurrence and series links stay.
pub fn update_session(conn: &Connection, s: &ClassSession) -> AppResult<()> {
    conn.execute(
        "UPDATE class_sessions SET
            title = ?1, description = ?2, class_type = ?3, scheduled_date = ?4,
            start_time = ?5, end_time = ?6, room_id = ?7, custom_location = ?8,
            meeting_link = ?9, window_before = ?10, window_after = ?11,
            attendance_method = ?12, max_capacity = ?13
         WHERE id = ?14",
        params![
            s.title,
            s.description,
            s.class_type.to_db_str(),
            s.scheduled_date.format(DATE_FMT).to_string(),
            s.start_time.format(TIME_FMT).to_string(),
            s.end_time.format(TIME_FMT).to_string(),
            s.room_id,
            s.custom_location,
            s.meeting_link,
            s.window_before,
            s.window_after,
            s.attendance_method.to_db_str(),
            s.max_capacity,
            s.id,
        ],
    )?;
    Ok(())
}

pub fn cancel(conn: &Connection, id: i64, reason: &str) -> AppResult<()> {
    conn.execute(
        "UPDATE class_sessions SET is_cancelled = 1, cancellation_reason = ?1 WHERE id = ?2",
        params![reason, id],
    )?;
    Ok(())
}

/// Filters for session listings; every field is optional.
#[derive(Debug, Default, Clone)]
pub struct SessionFilter {
    pub course_id: Option<i64>,
    pub assignment_id: Option<i64>,
    pub lecturer_id: Option<i64>,
    /// Restrict to assignments the student is approved for.
    pub student_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub include_cancelled: bool,
}

pub fn list_sessions(conn: &Connection, f: &SessionFilter) -> AppResult<Vec<ClassSession>> {
    let mut stmt = conn.prepare(
        "SELECT s.* FROM class_sessions s
         JOIN course_assignments a ON a.id = s.assignment_id
         WHERE s.is_active = 1
           AND (?1 IS NULL OR a.course_id = ?1)
           AND (?2 IS NULL OR s.assignment_id = ?2)
           AND (?3 IS NULL OR a.lecturer_id = ?3)
           AND (?4 IS NULL OR s.assignment_id IN (
                    SELECT assignment_id FROM enrollments
                    WHERE student_id = ?4 AND status = 'approved'))
           AND (?5 IS NULL OR s.scheduled_date >= ?5)
           AND (?6 IS NULL OR s.scheduled_date <= ?6)
           AND (?7 = 1 OR s.is_cancelled = 0)
         ORDER BY s.scheduled_date ASC, s.start_time ASC, s.id ASC",
    )?;

    let rows = stmt.query_map(
        params![
            f.course_id,
            f.assignment_id,
            f.lecturer_id,
            f.student_id,
            f.from.map(|d| d.format(DATE_FMT).to_string()),
            f.to.map(|d| d.format(DATE_FMT).to_string()),
            f.include_cancelled as i32,
        ],
        map_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// A scheduled session with the context needed by conflict detection.
#[derive(Debug, Clone)]
pub struct ScheduledSlot {
    pub session: ClassSession,
    pub lecturer_id: i64,
    pub department_id: i64,
    pub level: String,
    pub course_code: String,
}

/// Active, non-cancelled sessions on a date, joined with course context.
pub fn slots_on_date(conn: &Connection, date: NaiveDate) -> AppResult<Vec<ScheduledSlot>> {
    let mut stmt = conn.prepare(
        "SELECT s.*, a.lecturer_id AS ctx_lecturer, c.department_id AS ctx_department,
                c.level AS ctx_level, c.code AS ctx_code
         FROM class_sessions s
         JOIN course_assignments a ON a.id = s.assignment_id
         JOIN courses c ON c.id = a.course_id
         WHERE s.scheduled_date = ?1 AND s.is_active = 1 AND s.is_cancelled = 0
         ORDER BY s.start_time ASC",
    )?;

    let rows = stmt.query_map([date.format(DATE_FMT).to_string()], |row| {
        Ok(ScheduledSlot {
            session: map_row(row)?,
            lecturer_id: row.get("ctx_lecturer")?,
            department_id: row.get("ctx_department")?,
            level: row.get("ctx_level")?,
            course_code: row.get("ctx_code")?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_active(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM class_sessions WHERE is_active = 1 AND is_cancelled = 0",
        [],
        |r| r.get(0),
    )?)
}
