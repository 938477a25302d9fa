//! Class sessions: validation, conflict detection, recurrence and
//! cancellation, plus the "what can I mark now" listing for students.

use crate::config::Config;
use crate::core::assign::{assignment_by_id, load_row, require_teaching_rights};
use crate::core::catalog::{course_by_code, room_by_code};
use crate::core::notify;
use crate::core::users::{require_role, require_user};
use crate::core::window::{AttendanceWindow, DEFAULT_WINDOW_MINUTES, MAX_WINDOW_MINUTES};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::sessions::{self as q, SessionFilter};
use crate::db::{attendance, enrollments, rooms};
use crate::errors::{AppError, AppResult};
use crate::models::class_session::{AttendanceMethod, ClassSession, ClassType, Recurrence};
use crate::models::notification::{NewNotification, NotificationKind};
use crate::models::role::{Level, Role};
use crate::models::room::Room;
use crate::models::user::Actor;
use crate::ui::messages::warning;
use crate::utils::date::{parse_date, shift_months};
use crate::utils::time::parse_time;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    Room,
    Lecturer,
    Student,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::Room => "room",
            ConflictKind::Lecturer => "lecturer",
            ConflictKind::Student => "student",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub session_id: i64,
    pub date: NaiveDate,
    pub message: String,
}

/// Fields accepted by `session add`.
#[derive(Debug, Clone, Default)]
pub struct SessionInput {
    pub assignment_id: i64,
    pub title: String,
    pub description: String,
    pub class_type: Option<String>,
    pub date: String,
    pub start: String,
    pub end: String,
    pub room: Option<String>,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub window_before: Option<i64>,
    pub window_after: Option<i64>,
    pub attendance_optional: bool,
    pub method: Option<String>,
    pub recurrence: Option<String>,
    pub recurrence_end: Option<String>,
    pub max_capacity: Option<u32>,
    pub allow_conflicts: bool,
}

/// Outcome of a successful `session add`.
#[derive(Debug, Clone)]
pub struct Scheduled {
    pub session_id: i64,
    pub date: NaiveDate,
    /// Dates of the repeats after the first session.
    pub occurrences: Vec<NaiveDate>,
    pub conflicts: Vec<Conflict>,
}

impl Scheduled {
    /// Sessions created, the first one included.
    pub fn total(&self) -> usize {
        self.occurrences.len() + 1
    }

    pub fn last_date(&self) -> NaiveDate {
        self.occurrences.last().copied().unwrap_or(self.date)
    }
}

/// Changes accepted by `session edit`; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct SessionEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub class_type: Option<String>,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub room: Option<String>,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub window_before: Option<i64>,
    pub window_after: Option<i64>,
    pub method: Option<String>,
    pub max_capacity: Option<u32>,
    pub allow_conflicts: bool,
}

/// Outcome of a successful `session edit`.
#[derive(Debug, Clone)]
pub struct Updated {
    pub session: ClassSession,
    pub changes: Vec<&'static str>,
    pub conflicts: Vec<Conflict>,
}

/// A session with the labels needed to print it.
#[derive(Debug, Clone)]
pub struct SessionRow {
    pub session: ClassSession,
    pub course_code: String,
    pub room: Option<Room>,
}

impl SessionRow {
    pub fn location(&self) -> String {
        self.session.effective_location(self.room.as_ref())
    }
}

/// A session whose window is open for the student right now.
#[derive(Debug, Clone)]
pub struct AvailableSession {
    pub row: SessionRow,
    pub remaining: Duration,
}

/// Dates of the occurrences that follow `start`, up to `end` inclusive.
///
/// Monthly recurrence keeps the day of month and skips months that do not
/// have it (a class on the 31st only repeats in 31-day months).
pub fn recurrence_dates(start: NaiveDate, pattern: Recurrence, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();

    let step = match pattern {
        Recurrence::None => return out,
        Recurrence::Daily => 1,
        Recurrence::Weekly => 7,
        Recurrence::Biweekly => 14,
        Recurrence::Monthly => {
            let mut k = 1;
            loop {
                let Some(first) = shift_months(start.with_day(1).unwrap_or(start), k) else {
                    break;
                };
                if first > end {
                    break;
                }
                if let Some(d) = first.with_day(start.day())
                    && d <= end
                {
                    out.push(d);
                }
                k += 1;
            }
            return out;
        }
    };

    let mut d = start + Duration::days(step);
    while d <= end {
        out.push(d);
        d += Duration::days(step);
    }
    out
}

/// Overlapping active sessions on the candidate's date.
pub fn detect_conflicts(
    conn: &Connection,
    candidate: &ClassSession,
    lecturer_id: i64,
    department_id: i64,
    level: Level,
) -> AppResult<Vec<Conflict>> {
    let mut out = Vec::new();
    let level = level.to_db_str();

    for slot in q::slots_on_date(conn, candidate.scheduled_date)? {
        let other = &slot.session;
        if other.id == candidate.id || !candidate.overlaps(other) {
            continue;
        }

        let span = format!("{}-{}", other.start_str(), other.end_str());

        if candidate.room_id.is_some() && candidate.room_id == other.room_id {
            out.push(Conflict {
                kind: ConflictKind::Room,
                session_id: other.id,
                date: other.scheduled_date,
                message: format!("room already booked by {} ({span})", slot.course_code),
            });
        }
        if slot.lecturer_id == lecturer_id {
            out.push(Conflict {
                kind: ConflictKind::Lecturer,
                session_id: other.id,
                date: other.scheduled_date,
                message: format!("lecturer has another class: {} ({span})", slot.course_code),
            });
        }
        if slot.department_id == department_id && slot.level == level {
            out.push(Conflict {
                kind: ConflictKind::Student,
                session_id: other.id,
                date: other.scheduled_date,
                message: format!("students have conflicting class: {} ({span})", slot.course_code),
            });
        }
    }

    Ok(out)
}

fn check_offsets(before: i64, after: i64) -> AppResult<()> {
    if before < 0 || after < 0 {
        return Err(AppError::Validation(
            "attendance window offsets must not be negative".into(),
        ));
    }
    if before > MAX_WINDOW_MINUTES || after > MAX_WINDOW_MINUTES {
        return Err(AppError::Validation(format!(
            "attendance window offsets must not exceed {MAX_WINDOW_MINUTES} minutes"
        )));
    }
    Ok(())
}

fn parse_class_type(s: &str) -> AppResult<ClassType> {
    ClassType::from_db_str(s).ok_or_else(|| AppError::InvalidValue(format!("class type '{s}'")))
}

fn parse_method(s: &str) -> AppResult<AttendanceMethod> {
    AttendanceMethod::from_db_str(s)
        .ok_or_else(|| AppError::InvalidValue(format!("attendance method '{s}'")))
}

fn available_room(conn: &Connection, code: &str) -> AppResult<Room> {
    let r = room_by_code(conn, code)?;
    if !r.is_available {
        return Err(AppError::Validation(format!("room {} is not available", r.code)));
    }
    Ok(r)
}

fn conflict_error(conflicts: &[Conflict]) -> AppError {
    let first = &conflicts[0];
    AppError::Conflict(format!(
        "{} conflict(s), first on {}: {} (use --allow-conflicts to schedule anyway)",
        conflicts.len(),
        first.date.format("%Y-%m-%d"),
        first.message
    ))
}

fn load_session_row(conn: &Connection, session: ClassSession) -> AppResult<SessionRow> {
    let assignment = assignment_by_id(conn, session.assignment_id)?;
    let row = load_row(conn, assignment)?;
    let room = match session.room_id {
        Some(id) => rooms::find_room_by_id(conn, id)?,
        None => None,
    };
    Ok(SessionRow {
        session,
        course_code: row.course.code,
        room,
    })
}

pub fn session_by_id(conn: &Connection, id: i64) -> AppResult<ClassSession> {
    q::find_by_id(conn, id)?.ok_or_else(|| AppError::NotFound(format!("session {id}")))
}

pub struct ScheduleLogic;

impl ScheduleLogic {
    pub fn create(
        pool: &mut DbPool,
        actor: &Actor,
        cfg: &Config,
        input: &SessionInput,
    ) -> AppResult<Scheduled> {
        let assignment = assignment_by_id(&pool.conn, input.assignment_id)?;
        if !assignment.is_active {
            return Err(AppError::NotFound(format!("assignment {}", input.assignment_id)));
        }
        require_teaching_rights(actor, &assignment, "schedule classes for this course")?;

        if input.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".into()));
        }

        let date = parse_date(&input.date).ok_or_else(|| AppError::InvalidDate(input.date.clone()))?;
        let start = parse_time(&input.start).ok_or_else(|| AppError::InvalidTime(input.start.clone()))?;
        let end = parse_time(&input.end).ok_or_else(|| AppError::InvalidTime(input.end.clone()))?;
        if end <= start {
            return Err(AppError::Validation("end time must be after start time".into()));
        }

        let before = input.window_before.unwrap_or(cfg.default_window_before);
        let after = input.window_after.unwrap_or(cfg.default_window_after);
        check_offsets(before, after)?;
        AttendanceWindow::new(date, start, Some(before), Some(after))?;

        let class_type = match input.class_type.as_deref() {
            Some(t) => parse_class_type(t)?,
            None => ClassType::Lecture,
        };
        let method = match input.method.as_deref() {
            Some(m) => parse_method(m)?,
            None => AttendanceMethod::FaceRecognition,
        };

        let recurrence = match input.recurrence.as_deref() {
            Some(r) => Recurrence::from_db_str(r)
                .ok_or_else(|| AppError::InvalidValue(format!("recurrence '{r}'")))?,
            None => Recurrence::None,
        };
        let recurrence_end = match input.recurrence_end.as_deref() {
            Some(s) => Some(parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string()))?),
            None => None,
        };
        match (recurrence, recurrence_end) {
            (Recurrence::None, Some(_)) => {
                return Err(AppError::Validation(
                    "a recurrence end date needs a recurrence pattern".into(),
                ));
            }
            (Recurrence::None, None) => {}
            (_, None) => {
                return Err(AppError::Validation(
                    "recurring sessions need a recurrence end date".into(),
                ));
            }
            (_, Some(e)) if e < date => {
                return Err(AppError::Validation(
                    "recurrence end date must not precede the scheduled date".into(),
                ));
            }
            _ => {}
        }

        if matches!(input.max_capacity, Some(0)) {
            return Err(AppError::Validation("max capacity must be positive".into()));
        }

        let room = match input.room.as_deref() {
            Some(code) => Some(available_room(&pool.conn, code)?),
            None => None,
        };

        let row = load_row(&pool.conn, assignment)?;

        let parent = ClassSession {
            id: 0,
            assignment_id: input.assignment_id,
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            class_type,
            scheduled_date: date,
            start_time: start,
            end_time: end,
            room_id: room.as_ref().map(|r| r.id),
            custom_location: input.location.clone().unwrap_or_default(),
            meeting_link: input.meeting_link.clone().unwrap_or_default(),
            window_before: Some(before),
            window_after: Some(after),
            attendance_required: !input.attendance_optional,
            attendance_method: method,
            recurrence,
            recurrence_end,
            parent_session: None,
            is_active: true,
            is_cancelled: false,
            cancellation_reason: String::new(),
            max_capacity: input.max_capacity,
            created_at: String::new(),
        };

        let occurrences = match recurrence_end {
            Some(e) => recurrence_dates(date, recurrence, e),
            None => Vec::new(),
        };

        // Every occurrence is checked, not only the first.
        let mut conflicts = detect_conflicts(
            &pool.conn,
            &parent,
            row.lecturer.id,
            row.course.department_id,
            row.course.level,
        )?;
        for d in &occurrences {
            let occurrence = ClassSession {
                scheduled_date: *d,
                ..parent.clone()
            };
            conflicts.extend(detect_conflicts(
                &pool.conn,
                &occurrence,
                row.lecturer.id,
                row.course.department_id,
                row.course.level,
            )?);
        }

        if !conflicts.is_empty() && !input.allow_conflicts {
            return Err(conflict_error(&conflicts));
        }

        let tx = pool.conn.transaction()?;
        let parent_id = q::insert_session(&tx, &parent)?;
        for d in &occurrences {
            let child = ClassSession {
                scheduled_date: *d,
                recurrence: Recurrence::None,
                recurrence_end: None,
                parent_session: Some(parent_id),
                ..parent.clone()
            };
            q::insert_session(&tx, &child)?;
        }

        let when = format!(
            "{} {}-{}",
            parent.date_str(),
            parent.start_str(),
            parent.end_str()
        );
        let mut message = format!(
            "{} ({}) is scheduled on {when} at {}.",
            parent.title,
            row.course.code,
            parent.effective_location(room.as_ref())
        );
        if let Some(e) = recurrence_end
            && recurrence != Recurrence::None
        {
            message.push_str(&format!(
                " Repeats {} until {}.",
                recurrence.to_db_str(),
                e.format("%Y-%m-%d")
            ));
        }

        for student_id in enrollments::approved_students(&tx, input.assignment_id)? {
            notify::send_linked(
                &tx,
                NewNotification {
                    recipient_id: student_id,
                    sender_id: actor.user_id(),
                    kind: NotificationKind::ClassScheduled,
                    title: format!("New class scheduled: {}", row.course.code),
                    message: message.clone(),
                    enrollment_id: None,
                    session_id: Some(parent_id),
                },
            )?;
        }

        audit(
            &tx,
            "schedule",
            &format!("session:{parent_id}"),
            &format!(
                "{} {when} ({} occurrence(s))",
                row.course.code,
                occurrences.len() + 1
            ),
        )?;
        tx.commit()?;

        Ok(Scheduled {
            session_id: parent_id,
            date,
            occurrences,
            conflicts,
        })
    }

    /// Edits a single session. Moving it in time or space re-runs the
    /// conflict checks; enrolled students get a `class_updated` notice.
    pub fn update(
        pool: &mut DbPool,
        actor: &Actor,
        session_id: i64,
        edit: &SessionEdit,
    ) -> AppResult<Updated> {
        let current = session_by_id(&pool.conn, session_id)?;
        let assignment = assignment_by_id(&pool.conn, current.assignment_id)?;
        require_teaching_rights(actor, &assignment, "edit this class")?;
        if !current.is_active || current.is_cancelled {
            return Err(AppError::Validation(format!(
                "session {session_id} is cancelled or inactive"
            )));
        }

        let mut s = current.clone();
        let mut changes = Vec::new();

        if let Some(t) = &edit.title {
            if t.trim().is_empty() {
                return Err(AppError::Validation("title must not be empty".into()));
            }
            s.title = t.trim().to_string();
            changes.push("title");
        }
        if let Some(d) = &edit.description {
            s.description = d.clone();
            changes.push("description");
        }
        if let Some(t) = edit.class_type.as_deref() {
            s.class_type = parse_class_type(t)?;
            changes.push("type");
        }
        if let Some(d) = edit.date.as_deref() {
            s.scheduled_date = parse_date(d).ok_or_else(|| AppError::InvalidDate(d.to_string()))?;
            changes.push("date");
        }
        if let Some(t) = edit.start.as_deref() {
            s.start_time = parse_time(t).ok_or_else(|| AppError::InvalidTime(t.to_string()))?;
            changes.push("start");
        }
        if let Some(t) = edit.end.as_deref() {
            s.end_time = parse_time(t).ok_or_else(|| AppError::InvalidTime(t.to_string()))?;
            changes.push("end");
        }
        if s.end_time <= s.start_time {
            return Err(AppError::Validation("end time must be after start time".into()));
        }

        let mut room = match s.room_id {
            Some(id) => rooms::find_room_by_id(&pool.conn, id)?,
            None => None,
        };
        if let Some(code) = edit.room.as_deref() {
            let r = available_room(&pool.conn, code)?;
            s.room_id = Some(r.id);
            room = Some(r);
            changes.push("room");
        }
        if let Some(l) = &edit.location {
            s.custom_location = l.clone();
            changes.push("location");
        }
        if let Some(l) = &edit.meeting_link {
            s.meeting_link = l.clone();
            changes.push("meeting link");
        }

        if edit.window_before.is_some() || edit.window_after.is_some() {
            s.window_before = edit.window_before.or(s.window_before);
            s.window_after = edit.window_after.or(s.window_after);
            changes.push("window");
        }
        check_offsets(
            s.window_before.unwrap_or(DEFAULT_WINDOW_MINUTES),
            s.window_after.unwrap_or(DEFAULT_WINDOW_MINUTES),
        )?;
        AttendanceWindow::for_session(&s)?;

        if let Some(m) = edit.method.as_deref() {
            s.attendance_method = parse_method(m)?;
            changes.push("method");
        }
        if let Some(cap) = edit.max_capacity {
            if cap == 0 {
                return Err(AppError::Validation("max capacity must be positive".into()));
            }
            s.max_capacity = Some(cap);
            changes.push("capacity");
        }

        if changes.is_empty() {
            return Err(AppError::Validation(format!(
                "nothing to change for session {session_id}"
            )));
        }

        let row = load_row(&pool.conn, assignment)?;

        let moved = s.scheduled_date != current.scheduled_date
            || s.start_time != current.start_time
            || s.end_time != current.end_time
            || s.room_id != current.room_id;
        let conflicts = if moved {
            detect_conflicts(
                &pool.conn,
                &s,
                row.lecturer.id,
                row.course.department_id,
                row.course.level,
            )?
        } else {
            Vec::new()
        };
        if !conflicts.is_empty() && !edit.allow_conflicts {
            return Err(conflict_error(&conflicts));
        }

        let tx = pool.conn.transaction()?;
        q::update_session(&tx, &s)?;

        let message = format!(
            "{} ({}) has been updated ({}). It is now on {} {}-{} at {}.",
            s.title,
            row.course.code,
            changes.join(", "),
            s.date_str(),
            s.start_str(),
            s.end_str(),
            s.effective_location(room.as_ref())
        );
        for student_id in enrollments::approved_students(&tx, s.assignment_id)? {
            notify::send_linked(
                &tx,
                NewNotification {
                    recipient_id: student_id,
                    sender_id: actor.user_id(),
                    kind: NotificationKind::ClassUpdated,
                    title: format!("Class updated: {}", row.course.code),
                    message: message.clone(),
                    enrollment_id: None,
                    session_id: Some(s.id),
                },
            )?;
        }

        audit(&tx, "edit", &format!("session:{}", s.id), &changes.join(", "))?;
        tx.commit()?;

        Ok(Updated {
            session: s,
            changes,
            conflicts,
        })
    }

    pub fn cancel(pool: &mut DbPool, actor: &Actor, session_id: i64, reason: &str) -> AppResult<()> {
        let session = session_by_id(&pool.conn, session_id)?;
        let assignment = assignment_by_id(&pool.conn, session.assignment_id)?;
        require_teaching_rights(actor, &assignment, "cancel this class")?;

        if reason.trim().is_empty() {
            return Err(AppError::Validation("a cancellation reason is required".into()));
        }
        if session.is_cancelled {
            return Err(AppError::Validation(format!("session {session_id} is already cancelled")));
        }

        let row = load_row(&pool.conn, assignment)?;
        let tx = pool.conn.transaction()?;
        q::cancel(&tx, session.id, reason.trim())?;

        for student_id in enrollments::approved_students(&tx, session.assignment_id)? {
            notify::send_linked(
                &tx,
                NewNotification {
                    recipient_id: student_id,
                    sender_id: actor.user_id(),
                    kind: NotificationKind::ClassCancelled,
                    title: format!("Class cancelled: {}", row.course.code),
                    message: format!(
                        "{} on {} at {} has been cancelled. Reason: {}",
                        session.title,
                        session.date_str(),
                        session.start_str(),
                        reason.trim()
                    ),
                    enrollment_id: None,
                    session_id: Some(session.id),
                },
            )?;
        }

        audit(&tx, "cancel", &format!("session:{}", session.id), reason.trim())?;
        tx.commit()?;
        Ok(())
    }

    pub fn show(pool: &DbPool, session_id: i64) -> AppResult<SessionRow> {
        load_session_row(&pool.conn, session_by_id(&pool.conn, session_id)?)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn list(
        pool: &DbPool,
        course: Option<&str>,
        lecturer: Option<&str>,
        student: Option<&str>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        include_cancelled: bool,
    ) -> AppResult<Vec<SessionRow>> {
        let filter = SessionFilter {
            course_id: match course {
                Some(c) => Some(course_by_code(&pool.conn, c)?.id),
                None => None,
            },
            lecturer_id: match lecturer {
                Some(e) => Some(require_user(&pool.conn, e)?.id),
                None => None,
            },
            student_id: match student {
                Some(e) => Some(require_user(&pool.conn, e)?.id),
                None => None,
            },
            from,
            to,
            include_cancelled,
            ..Default::default()
        };

        let mut out = Vec::new();
        for s in q::list_sessions(&pool.conn, &filter)? {
            out.push(load_session_row(&pool.conn, s)?);
        }
        Ok(out)
    }

    /// Sessions the student may mark at `now`.
    ///
    /// If the student's existing records cannot be loaded the failure is
    /// reported and every session counts as not yet attended.
    pub fn available(
        pool: &DbPool,
        student: &str,
        now: NaiveDateTime,
    ) -> AppResult<Vec<AvailableSession>> {
        let student = require_user(&pool.conn, student)?;
        require_role(&student, Role::Student)?;

        // A window reaches at most MAX_WINDOW_MINUTES from its start.
        let reach = Duration::minutes(MAX_WINDOW_MINUTES);
        let filter = SessionFilter {
            student_id: Some(student.id),
            from: now.checked_sub_signed(reach).map(|t| t.date()),
            to: now.checked_add_signed(reach).map(|t| t.date()),
            ..Default::default()
        };
        let sessions = q::list_sessions(&pool.conn, &filter)?;

        let marked: HashSet<i64> = match attendance::sessions_marked_by(&pool.conn, student.id) {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                warning(format!("Could not load attendance records: {e}"));
                HashSet::new()
            }
        };

        let mut out = Vec::new();
        for s in sessions {
            if !s.is_active || s.is_cancelled || !s.attendance_required || marked.contains(&s.id) {
                continue;
            }

            let window = match AttendanceWindow::for_session(&s) {
                Ok(w) => w,
                Err(e) => {
                    warning(format!("Session {}: {e}", s.id));
                    continue;
                }
            };

            if let Some(remaining) = window.remaining(now)
                && window.is_open(now)
            {
                out.push(AvailableSession {
                    row: load_session_row(&pool.conn, s)?,
                    remaining,
                });
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assign::AssignLogic;
    use crate::core::catalog::CatalogLogic;
    use crate::core::test_support::{Campus, add_lecturer};
    use crate::db::notifications;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn input(c: &Campus, date: &str, start: &str, end: &str) -> SessionInput {
        SessionInput {
            assignment_id: c.assignment_id,
            title: "Lecture".into(),
            date: date.into(),
            start: start.into(),
            end: end.into(),
            room: Some("LT1".into()),
            ..Default::default()
        }
    }

    fn schedule(c: &mut Campus, date: &str, start: &str, end: &str) -> AppResult<Scheduled> {
        let i = input(c, date, start, end);
        ScheduleLogic::create(&mut c.pool, &Actor::Operator, &Config::default(), &i)
    }

    #[test]
    fn weekly_and_biweekly_steps() {
        let w = recurrence_dates(d("2025-03-03"), Recurrence::Weekly, d("2025-03-24"));
        assert_eq!(w, vec![d("2025-03-10"), d("2025-03-17"), d("2025-03-24")]);

        let b = recurrence_dates(d("2025-03-03"), Recurrence::Biweekly, d("2025-03-30"));
        assert_eq!(b, vec![d("2025-03-17")]);

        let daily = recurrence_dates(d("2025-03-03"), Recurrence::Daily, d("2025-03-05"));
        assert_eq!(daily.len(), 2);
    }

    #[test]
    fn monthly_skips_months_without_the_day() {
        let m = recurrence_dates(d("2025-01-31"), Recurrence::Monthly, d("2025-06-30"));
        assert_eq!(m, vec![d("2025-03-31"), d("2025-05-31")]);
    }

    #[test]
    fn end_must_follow_start() {
        let mut c = Campus::new();
        let err = schedule(&mut c, "2025-03-03", "10:00", "10:00").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn offsets_must_be_non_negative_and_at_most_a_day() {
        let mut c = Campus::new();
        let cfg = Config::default();

        for (before, after) in [(-1, 5), (5, -1), (MAX_WINDOW_MINUTES + 1, 5), (5, i64::MAX)] {
            let mut i = input(&c, "2025-03-03", "10:00", "11:00");
            i.window_before = Some(before);
            i.window_after = Some(after);
            let err = ScheduleLogic::create(&mut c.pool, &Actor::Operator, &cfg, &i).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{before}/{after}");
        }

        let mut i = input(&c, "2025-03-03", "10:00", "11:00");
        i.window_before = Some(MAX_WINDOW_MINUTES);
        i.window_after = Some(MAX_WINDOW_MINUTES);
        assert!(ScheduleLogic::create(&mut c.pool, &Actor::Operator, &cfg, &i).is_ok());
    }

    #[test]
    fn recurrence_needs_pattern_and_end() {
        let mut c = Campus::new();
        let cfg = Config::default();

        let mut i = input(&c, "2025-03-03", "10:00", "11:00");
        i.recurrence = Some("weekly".into());
        assert!(ScheduleLogic::create(&mut c.pool, &Actor::Operator, &cfg, &i).is_err());

        i.recurrence_end = Some("2025-03-01".into());
        assert!(ScheduleLogic::create(&mut c.pool, &Actor::Operator, &cfg, &i).is_err());

        i.recurrence_end = Some("2025-03-17".into());
        let s = ScheduleLogic::create(&mut c.pool, &Actor::Operator, &cfg, &i).unwrap();
        assert_eq!(s.occurrences.len(), 2);
        assert_eq!(s.total(), 3);
        assert_eq!(s.last_date(), d("2025-03-17"));

        let all = ScheduleLogic::list(&c.pool, Some("CSC201"), None, None, None, None, false).unwrap();
        assert_eq!(all.len(), s.total());
        assert_eq!(all[1].session.parent_session, Some(s.session_id));
    }

    #[test]
    fn room_lecturer_and_cohort_conflicts() {
        let mut c = Campus::new();
        let cfg = Config::default();
        let op = Actor::Operator;
        schedule(&mut c, "2025-03-03", "10:00", "12:00").unwrap();

        // Same room, lecturer and cohort, overlapping by an hour.
        let err = schedule(&mut c, "2025-03-03", "11:00", "13:00").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Touching intervals do not overlap.
        schedule(&mut c, "2025-03-03", "12:00", "13:00").unwrap();

        // Another course of the same department and level, different lecturer and room.
        CatalogLogic::add_course(&mut c.pool, &op, "CSC203", "Discrete Maths", "CSC", "200", 3, "")
            .unwrap();
        add_lecturer(&mut c.pool, "other@uni.edu");
        let other =
            AssignLogic::assign(&mut c.pool, &op, "CSC203", "other@uni.edu", "2024/2025", "First")
                .unwrap();
        let mut i = input(&c, "2025-03-03", "10:30", "11:30");
        i.assignment_id = other;
        i.room = None;

        let row = load_row(&c.pool.conn, assignment_by_id(&c.pool.conn, other).unwrap()).unwrap();
        let candidate = ClassSession {
            id: 0,
            assignment_id: other,
            title: "Discrete".into(),
            description: String::new(),
            class_type: ClassType::Lecture,
            scheduled_date: d("2025-03-03"),
            start_time: parse_time("10:30").unwrap(),
            end_time: parse_time("11:30").unwrap(),
            room_id: None,
            custom_location: String::new(),
            meeting_link: String::new(),
            window_before: None,
            window_after: None,
            attendance_required: true,
            attendance_method: AttendanceMethod::Manual,
            recurrence: Recurrence::None,
            recurrence_end: None,
            parent_session: None,
            is_active: true,
            is_cancelled: false,
            cancellation_reason: String::new(),
            max_capacity: None,
            created_at: String::new(),
        };
        let found = detect_conflicts(
            &c.pool.conn,
            &candidate,
            row.lecturer.id,
            row.course.department_id,
            row.course.level,
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, ConflictKind::Student);

        i.allow_conflicts = true;
        let s = ScheduleLogic::create(&mut c.pool, &op, &cfg, &i).unwrap();
        assert_eq!(s.conflicts.len(), 1);
    }

    #[test]
    fn scheduling_and_cancelling_notify_students() {
        let mut c = Campus::new();
        let s = schedule(&mut c, "2025-03-03", "10:00", "11:00").unwrap();
        ScheduleLogic::cancel(&mut c.pool, &Actor::Operator, s.session_id, "Public holiday").unwrap();

        let inbox = notifications::list_for_user(&c.pool.conn, c.student.id, false).unwrap();
        let kinds: Vec<_> = inbox.iter().map(|n| n.kind).collect();
        assert!(kinds.contains(&NotificationKind::ClassScheduled));
        assert!(kinds.contains(&NotificationKind::ClassCancelled));

        let visible = ScheduleLogic::list(&c.pool, None, None, None, None, None, false).unwrap();
        assert!(visible.is_empty());
    }

    #[test]
    fn editing_reschedules_and_notifies() {
        let mut c = Campus::new();
        let first = schedule(&mut c, "2025-03-03", "10:00", "11:00").unwrap();
        let second = schedule(&mut c, "2025-03-03", "12:00", "13:00").unwrap();
        let lecturer = Actor::User(c.lecturer.clone());

        let nothing = ScheduleLogic::update(&mut c.pool, &lecturer, first.session_id, &SessionEdit::default());
        assert!(matches!(nothing.unwrap_err(), AppError::Validation(_)));

        // Moving onto the second session clashes on room, lecturer and cohort.
        let clash = SessionEdit {
            start: Some("12:30".into()),
            end: Some("13:30".into()),
            ..Default::default()
        };
        let err = ScheduleLogic::update(&mut c.pool, &lecturer, first.session_id, &clash).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let edit = SessionEdit {
            date: Some("2025-03-04".into()),
            start: Some("09:00".into()),
            end: Some("10:30".into()),
            window_after: Some(20),
            ..Default::default()
        };
        let updated = ScheduleLogic::update(&mut c.pool, &lecturer, first.session_id, &edit).unwrap();
        assert_eq!(updated.changes, vec!["date", "start", "end", "window"]);

        let stored = session_by_id(&c.pool.conn, first.session_id).unwrap();
        assert_eq!(stored.scheduled_date, d("2025-03-04"));
        assert_eq!(stored.window_before, Some(5));
        assert_eq!(stored.window_after, Some(20));

        let inbox = notifications::list_for_user(&c.pool.conn, c.student.id, false).unwrap();
        let notice = inbox
            .iter()
            .find(|n| n.kind == NotificationKind::ClassUpdated)
            .unwrap();
        assert!(notice.message.contains("2025-03-04 09:00-10:30"));

        // Title-only edits skip conflict checks.
        let rename = SessionEdit {
            title: Some("Heaps".into()),
            ..Default::default()
        };
        assert!(ScheduleLogic::update(&mut c.pool, &lecturer, second.session_id, &rename).is_ok());
    }

    #[test]
    fn editing_revalidates_the_window() {
        let mut c = Campus::new();
        let s = schedule(&mut c, "2025-03-03", "10:00", "11:00").unwrap();

        let edit = SessionEdit {
            window_before: Some(MAX_WINDOW_MINUTES + 1),
            ..Default::default()
        };
        let err = ScheduleLogic::update(&mut c.pool, &Actor::Operator, s.session_id, &edit).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let student = Actor::User(c.student.clone());
        let title = SessionEdit {
            title: Some("Mine now".into()),
            ..Default::default()
        };
        let err = ScheduleLogic::update(&mut c.pool, &student, s.session_id, &title).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
    }

    #[test]
    fn available_lists_only_open_windows() {
        let mut c = Campus::new();
        let s = schedule(&mut c, "2025-03-03", "10:00", "11:00").unwrap();

        let before = d("2025-03-03").and_hms_opt(9, 50, 0).unwrap();
        assert!(ScheduleLogic::available(&c.pool, "stu@uni.edu", before).unwrap().is_empty());

        let during = d("2025-03-03").and_hms_opt(10, 2, 0).unwrap();
        let open = ScheduleLogic::available(&c.pool, "stu@uni.edu", during).unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].row.session.id, s.session_id);
        assert_eq!(open[0].remaining, Duration::minutes(3));

        let after = d("2025-03-03").and_hms_opt(10, 6, 0).unwrap();
        assert!(ScheduleLogic::available(&c.pool, "stu@uni.edu", after).unwrap().is_empty());
    }

    #[test]
    fn available_follows_day_long_windows() {
        let mut c = Campus::new();
        let cfg = Config::default();

        // Opens 2025-03-04 10:00, closes 2025-03-06 10:00.
        let mut i = input(&c, "2025-03-05", "10:00", "11:00");
        i.window_before = Some(MAX_WINDOW_MINUTES);
        i.window_after = Some(MAX_WINDOW_MINUTES);
        let s = ScheduleLogic::create(&mut c.pool, &Actor::Operator, &cfg, &i).unwrap();

        for now in [
            d("2025-03-04").and_hms_opt(10, 0, 0).unwrap(),
            d("2025-03-04").and_hms_opt(12, 0, 0).unwrap(),
            d("2025-03-06").and_hms_opt(9, 59, 0).unwrap(),
        ] {
            let open = ScheduleLogic::available(&c.pool, "stu@uni.edu", now).unwrap();
            assert_eq!(open.len(), 1, "{now}");
            assert_eq!(open[0].row.session.id, s.session_id);
        }

        let early = d("2025-03-04").and_hms_opt(9, 59, 0).unwrap();
        assert!(ScheduleLogic::available(&c.pool, "stu@uni.edu", early).unwrap().is_empty());
    }
}
