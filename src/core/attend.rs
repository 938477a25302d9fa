//! Attendance marking: student self-service within the window, manual
//! overrides by the lecturer, and closing a session.

use crate::config::Config;
use crate::core::assign::{assignment_by_id, load_row, require_teaching_rights};
use crate::core::face::FaceVerifier;
use crate::core::schedule::session_by_id;
use crate::core::users::{require_role, require_self_or_admin, require_user};
use crate::core::window::AttendanceWindow;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{attendance as q, enrollments, faces, users};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceRecord, AttendanceStatus, MarkMethod};
use crate::models::class_session::ClassSession;
use crate::models::face::VerificationStatus;
use crate::models::role::Role;
use crate::models::user::{Actor, User};
use chrono::NaiveDateTime;
use rusqlite::ErrorCode;
use std::path::Path;

const MARKED_AT_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// A record with its student, for listings.
#[derive(Debug, Clone)]
pub struct AttendanceRow {
    pub record: AttendanceRecord,
    pub student: User,
}

/// `late` once more than `late_after` minutes have passed since the start.
pub fn classify(session: &ClassSession, now: NaiveDateTime, late_after: i64) -> AttendanceStatus {
    let start = session.scheduled_date.and_time(session.start_time);
    if (now - start).num_minutes() > late_after {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

fn require_live(session: &ClassSession) -> AppResult<()> {
    if !session.is_active || session.is_cancelled {
        return Err(AppError::Validation(format!(
            "session {} is cancelled or inactive",
            session.id
        )));
    }
    Ok(())
}

fn require_enrolled(conn: &rusqlite::Connection, session: &ClassSession, student: &User) -> AppResult<()> {
    if !enrollments::is_approved(conn, student.id, session.assignment_id)? {
        return Err(AppError::PermissionDenied(format!(
            "{} is not enrolled in the course of session {}",
            student.email, session.id
        )));
    }
    Ok(())
}

fn record_attempt(
    conn: &rusqlite::Connection,
    student: &User,
    session: &ClassSession,
    status: VerificationStatus,
    image: &Path,
    message: &str,
    now: NaiveDateTime,
) -> AppResult<()> {
    faces::log_attempt(
        conn,
        student.id,
        Some(session.id),
        status,
        &image.to_string_lossy(),
        message,
        &now.format(MARKED_AT_FMT).to_string(),
    )?;
    Ok(())
}

fn already_marked(session: &ClassSession, student: &User) -> AppError {
    AppError::AlreadyMarked {
        session: session.id,
        student: student.email.clone(),
    }
}

pub struct AttendLogic;

impl AttendLogic {
    /// Student self-service marking.
    #[allow(clippy::too_many_arguments)]
    pub fn mark(
        pool: &mut DbPool,
        cfg: &Config,
        actor: &Actor,
        session_id: i64,
        student_email: &str,
        image: Option<&Path>,
        verifier: &dyn FaceVerifier,
        now: NaiveDateTime,
    ) -> AppResult<AttendanceRecord> {
        let student = require_user(&pool.conn, student_email)?;
        require_role(&student, Role::Student)?;
        require_self_or_admin(actor, &student, "mark attendance")?;

        let session = session_by_id(&pool.conn, session_id)?;
        require_live(&session)?;
        if !session.attendance_required {
            return Err(AppError::Validation(format!(
                "session {session_id} does not take attendance"
            )));
        }
        require_enrolled(&pool.conn, &session, &student)?;

        let window = AttendanceWindow::for_session(&session)?;
        if !window.is_open(now) {
            return Err(AppError::WindowNotOpen(session_id));
        }

        if q::has_record(&pool.conn, session.id, student.id)? {
            return Err(already_marked(&session, &student));
        }

        let method = session.attendance_method;
        let face_verified = match image {
            Some(img) if method.accepts_face() => {
                // Every attempt is logged, rejected ones included.
                let outcome = match verifier.verify(&pool.conn, &student, img) {
                    Ok(m) => m,
                    Err(AppError::FaceVerification(message)) => {
                        let status = VerificationStatus::PoorQuality;
                        record_attempt(&pool.conn, &student, &session, status, img, &message, now)?;
                        return Err(AppError::FaceVerification(message));
                    }
                    Err(e) => return Err(e),
                };
                let status = if outcome.success {
                    VerificationStatus::Success
                } else {
                    VerificationStatus::Failed
                };
                record_attempt(&pool.conn, &student, &session, status, img, &outcome.message, now)?;
                if !outcome.success {
                    return Err(AppError::FaceVerification(outcome.message));
                }
                true
            }
            None if method.requires_face() => {
                return Err(AppError::FaceVerification(
                    "this session requires a face image (--image)".into(),
                ));
            }
            _ => false,
        };

        let mut record = AttendanceRecord {
            id: 0,
            session_id: session.id,
            student_id: student.id,
            status: classify(&session, now, cfg.late_after_minutes),
            marked_at: now.format(MARKED_AT_FMT).to_string(),
            face_verified,
            method: MarkMethod::SelfMark,
            notes: String::new(),
        };

        let tx = pool.conn.transaction()?;
        record.id = match q::insert_record(&tx, &record) {
            Ok(id) => id,
            Err(AppError::Db(rusqlite::Error::SqliteFailure(f, _)))
                if f.code == ErrorCode::ConstraintViolation =>
            {
                return Err(already_marked(&session, &student));
            }
            Err(e) => return Err(e),
        };
        audit(
            &tx,
            "mark",
            &format!("session:{}", session.id),
            &format!("{} {}", student.email, record.status.to_db_str()),
        )?;
        tx.commit()?;

        Ok(record)
    }

    /// Record or override the status of an enrolled student.
    #[allow(clippy::too_many_arguments)]
    pub fn set(
        pool: &mut DbPool,
        actor: &Actor,
        session_id: i64,
        student_email: &str,
        status: &str,
        notes: Option<&str>,
        now: NaiveDateTime,
    ) -> AppResult<AttendanceRecord> {
        let status =
            AttendanceStatus::from_code(status).ok_or_else(|| AppError::InvalidStatus(status.into()))?;

        let session = session_by_id(&pool.conn, session_id)?;
        let assignment = assignment_by_id(&pool.conn, session.assignment_id)?;
        require_teaching_rights(actor, &assignment, "record attendance for this class")?;
        require_live(&session)?;

        let student = require_user(&pool.conn, student_email)?;
        require_role(&student, Role::Student)?;
        require_enrolled(&pool.conn, &session, &student)?;

        let tx = pool.conn.transaction()?;
        let record = match q::find(&tx, session.id, student.id)? {
            Some(mut existing) => {
                existing.status = status;
                existing.marked_at = now.format(MARKED_AT_FMT).to_string();
                existing.method = MarkMethod::Manual;
                if let Some(n) = notes {
                    existing.notes = n.to_string();
                }
                q::update_record(&tx, &existing)?;
                existing
            }
            None => {
                let mut rec = AttendanceRecord {
                    id: 0,
                    session_id: session.id,
                    student_id: student.id,
                    status,
                    marked_at: now.format(MARKED_AT_FMT).to_string(),
                    face_verified: false,
                    method: MarkMethod::Manual,
                    notes: notes.unwrap_or_default().to_string(),
                };
                rec.id = q::insert_record(&tx, &rec)?;
                rec
            }
        };
        audit(
            &tx,
            "edit",
            &format!("session:{}", session.id),
            &format!("{} {}", student.email, status.to_db_str()),
        )?;
        tx.commit()?;

        Ok(record)
    }

    /// Marks every approved student without a record as absent.
    /// Refused while the window is still open.
    pub fn close(
        pool: &mut DbPool,
        actor: &Actor,
        session_id: i64,
        now: NaiveDateTime,
    ) -> AppResult<usize> {
        let session = session_by_id(&pool.conn, session_id)?;
        let assignment = assignment_by_id(&pool.conn, session.assignment_id)?;
        require_teaching_rights(actor, &assignment, "close this class")?;
        require_live(&session)?;

        let window = AttendanceWindow::for_session(&session)?;
        if now <= window.closes_at() {
            return Err(AppError::Validation(format!(
                "attendance window of session {session_id} is open until {}",
                window.closes_at().format("%Y-%m-%d %H:%M")
            )));
        }

        let tx = pool.conn.transaction()?;
        let mut closed = 0;
        for student_id in enrollments::approved_students(&tx, session.assignment_id)? {
            if q::has_record(&tx, session.id, student_id)? {
                continue;
            }
            q::insert_record(
                &tx,
                &AttendanceRecord {
                    id: 0,
                    session_id: session.id,
                    student_id,
                    status: AttendanceStatus::Absent,
                    marked_at: now.format(MARKED_AT_FMT).to_string(),
                    face_verified: false,
                    method: MarkMethod::Close,
                    notes: String::new(),
                },
            )?;
            closed += 1;
        }
        audit(
            &tx,
            "mark",
            &format!("session:{}", session.id),
            &format!("closed, {closed} absent"),
        )?;
        tx.commit()?;

        Ok(closed)
    }

    pub fn list(pool: &DbPool, actor: &Actor, session_id: i64) -> AppResult<Vec<AttendanceRow>> {
        let session = session_by_id(&pool.conn, session_id)?;
        let assignment = assignment_by_id(&pool.conn, session.assignment_id)?;
        require_teaching_rights(actor, &assignment, "view attendance of this class")?;

        let mut out = Vec::new();
        for record in q::list_for_session(&pool.conn, session.id)? {
            let student = users::find_by_id(&pool.conn, record.student_id)?
                .ok_or_else(|| AppError::NotFound(format!("student #{}", record.student_id)))?;
            out.push(AttendanceRow { record, student });
        }
        Ok(out)
    }

    /// Course code of a session, for messages.
    pub fn course_code(pool: &DbPool, session: &ClassSession) -> AppResult<String> {
        let assignment = assignment_by_id(&pool.conn, session.assignment_id)?;
        Ok(load_row(&pool.conn, assignment)?.course.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::face::FaceMatch;
    use crate::core::schedule::{ScheduleLogic, SessionInput};
    use crate::core::test_support::{Campus, add_student};
    use chrono::NaiveDate;
    use rusqlite::Connection;

    struct Always(bool);

    impl FaceVerifier for Always {
        fn verify(&self, _conn: &Connection, _student: &User, _image: &Path) -> AppResult<FaceMatch> {
            Ok(FaceMatch {
                success: self.0,
                message: if self.0 { "ok".into() } else { "face mismatch".into() },
            })
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    /// 10:00-11:00 on 2025-03-03 with the given method and window.
    fn session(c: &mut Campus, method: &str, before: i64, after: i64) -> i64 {
        let input = SessionInput {
            assignment_id: c.assignment_id,
            title: "Lecture".into(),
            date: "2025-03-03".into(),
            start: "10:00".into(),
            end: "11:00".into(),
            method: Some(method.into()),
            window_before: Some(before),
            window_after: Some(after),
            ..Default::default()
        };
        ScheduleLogic::create(&mut c.pool, &Actor::Operator, &Config::default(), &input)
            .unwrap()
            .session_id
    }

    fn mark(c: &mut Campus, id: i64, email: &str, now: NaiveDateTime) -> AppResult<AttendanceRecord> {
        AttendLogic::mark(
            &mut c.pool,
            &Config::default(),
            &Actor::Operator,
            id,
            email,
            None,
            &Always(true),
            now,
        )
    }

    #[test]
    fn marking_twice_fails() {
        let mut c = Campus::new();
        let id = session(&mut c, "manual", 5, 5);

        let rec = mark(&mut c, id, "stu@uni.edu", at(10, 1, 0)).unwrap();
        assert_eq!(rec.status, AttendanceStatus::Present);
        assert_eq!(rec.marked_at, "2025-03-03 10:01:00");

        let err = mark(&mut c, id, "stu@uni.edu", at(10, 2, 0)).unwrap_err();
        assert!(matches!(err, AppError::AlreadyMarked { session, .. } if session == id));
    }

    #[test]
    fn marking_outside_the_window_fails() {
        let mut c = Campus::new();
        let id = session(&mut c, "manual", 5, 5);

        assert!(matches!(
            mark(&mut c, id, "stu@uni.edu", at(9, 54, 59)).unwrap_err(),
            AppError::WindowNotOpen(_)
        ));
        assert!(matches!(
            mark(&mut c, id, "stu@uni.edu", at(10, 5, 1)).unwrap_err(),
            AppError::WindowNotOpen(_)
        ));
        assert!(mark(&mut c, id, "stu@uni.edu", at(10, 5, 0)).is_ok());
    }

    #[test]
    fn students_outside_the_course_cannot_mark() {
        let mut c = Campus::new();
        let id = session(&mut c, "manual", 5, 5);
        add_student(&mut c.pool, "out@uni.edu", "CSC", "200");

        let err = mark(&mut c, id, "out@uni.edu", at(10, 0, 0)).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
    }

    #[test]
    fn late_after_threshold() {
        let mut c = Campus::new();
        let id = session(&mut c, "manual", 0, 30);
        let s = session_by_id(&c.pool.conn, id).unwrap();

        assert_eq!(classify(&s, at(10, 15, 59), 15), AttendanceStatus::Present);
        assert_eq!(classify(&s, at(10, 16, 0), 15), AttendanceStatus::Late);

        let rec = mark(&mut c, id, "stu@uni.edu", at(10, 20, 0)).unwrap();
        assert_eq!(rec.status, AttendanceStatus::Late);
    }

    #[test]
    fn face_sessions_need_a_verified_image() {
        let mut c = Campus::new();
        let id = session(&mut c, "face_recognition", 5, 5);
        let cfg = Config::default();
        let img = Path::new("/tmp/capture.jpg");

        let missing = mark(&mut c, id, "stu@uni.edu", at(10, 0, 0)).unwrap_err();
        assert!(matches!(missing, AppError::FaceVerification(_)));

        let rejected = AttendLogic::mark(
            &mut c.pool, &cfg, &Actor::Operator, id, "stu@uni.edu", Some(img), &Always(false), at(10, 0, 0),
        )
        .unwrap_err();
        assert!(matches!(rejected, AppError::FaceVerification(m) if m == "face mismatch"));

        let ok = AttendLogic::mark(
            &mut c.pool, &cfg, &Actor::Operator, id, "stu@uni.edu", Some(img), &Always(true), at(10, 0, 0),
        )
        .unwrap();
        assert!(ok.face_verified);

        // The missing image is not an attempt; the two verifications are.
        let attempts = faces::list_attempts(&c.pool.conn, c.student.id, None).unwrap();
        let statuses: Vec<_> = attempts.iter().map(|a| a.status).collect();
        assert_eq!(statuses, vec![VerificationStatus::Success, VerificationStatus::Failed]);
        assert_eq!(attempts[1].message, "face mismatch");
        assert_eq!(attempts[0].session_id, Some(id));
    }

    #[test]
    fn unusable_captures_are_logged_as_poor_quality() {
        let mut c = Campus::new();
        let id = session(&mut c, "both", 5, 5);
        let cfg = Config::default();
        let verifier = crate::core::face::RegisteredFaceVerifier::new(&cfg);

        let err = AttendLogic::mark(
            &mut c.pool,
            &cfg,
            &Actor::Operator,
            id,
            "stu@uni.edu",
            Some(Path::new("/nonexistent/capture.png")),
            &verifier,
            at(10, 0, 0),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::FaceVerification(_)));

        let attempts = faces::list_attempts(&c.pool.conn, c.student.id, Some(5)).unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].status, VerificationStatus::PoorQuality);
        assert_eq!(attempts[0].attempted_at, "2025-03-03 10:00:00");
        assert!(!q::has_record(&c.pool.conn, id, c.student.id).unwrap());
    }

    #[test]
    fn close_marks_the_rest_absent_and_set_overrides() {
        let mut c = Campus::new();
        let id = session(&mut c, "manual", 5, 5);
        add_student(&mut c.pool, "two@uni.edu", "CSC", "200");
        crate::core::enroll::EnrollLogic::enroll_direct(&mut c.pool, &Actor::Operator, "two@uni.edu", c.assignment_id)
            .unwrap();

        mark(&mut c, id, "stu@uni.edu", at(10, 0, 0)).unwrap();

        let lecturer = Actor::User(c.lecturer.clone());
        assert!(AttendLogic::close(&mut c.pool, &lecturer, id, at(10, 3, 0)).is_err());
        assert_eq!(AttendLogic::close(&mut c.pool, &lecturer, id, at(11, 0, 0)).unwrap(), 1);
        assert_eq!(AttendLogic::close(&mut c.pool, &lecturer, id, at(11, 1, 0)).unwrap(), 0);

        let rec = AttendLogic::set(&mut c.pool, &lecturer, id, "two@uni.edu", "e", Some("medical"), at(12, 0, 0))
            .unwrap();
        assert_eq!(rec.status, AttendanceStatus::Excused);
        assert_eq!(rec.method, MarkMethod::Manual);

        let rows = AttendLogic::list(&c.pool, &lecturer, id).unwrap();
        assert_eq!(rows.len(), 2);

        let student = Actor::User(c.student.clone());
        assert!(matches!(
            AttendLogic::list(&c.pool, &student, id).unwrap_err(),
            AppError::PermissionDenied(_)
        ));
    }
}
