//! Attendance summaries and role dashboards.

use crate::core::assign::{assignment_by_id, require_teaching_rights};
use crate::core::catalog::course_by_code;
use crate::core::schedule::{ScheduleLogic, SessionRow, session_by_id};
use crate::core::users::{require_admin, require_role, require_self_or_admin, require_user};
use crate::db::pool::DbPool;
use crate::db::{assignments, attendance, catalog, enrollments, notifications, sessions, users};
use crate::errors::AppResult;
use crate::models::attendance::AttendanceStatus;
use crate::models::enrollment::EnrollmentStatus;
use crate::models::role::Role;
use crate::models::user::{Actor, User};
use chrono::{NaiveDate, NaiveDateTime};

const UPCOMING_LIMIT: usize = 5;

/// (present + late) / enrolled × 100, or 0 without enrollees.
pub fn attendance_rate(attended: i64, total: i64) -> f64 {
    if total <= 0 {
        0.0
    } else {
        attended as f64 * 100.0 / total as f64
    }
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub row: SessionRow,
    pub enrolled: i64,
    pub present: i64,
    pub late: i64,
    pub absent: i64,
    pub excused: i64,
    pub unmarked: i64,
    pub rate: f64,
}

#[derive(Debug, Clone)]
pub struct StudentLine {
    pub row: SessionRow,
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone)]
pub struct StudentSummary {
    pub student: User,
    pub lines: Vec<StudentLine>,
    pub held: i64,
    pub attended: i64,
    pub rate: f64,
}

#[derive(Debug, Clone)]
pub enum Dashboard {
    Admin {
        users: i64,
        courses: i64,
        departments: i64,
        enrollments: i64,
        pending_enrollments: i64,
        sessions: i64,
        assignments: i64,
    },
    Lecturer {
        user: User,
        assignments_total: i64,
        assignments_active: i64,
        students: i64,
        today: Vec<SessionRow>,
        upcoming: Vec<SessionRow>,
    },
    Student {
        user: User,
        courses: usize,
        today: Vec<SessionRow>,
        rate: f64,
        upcoming: Vec<SessionRow>,
        unread: i64,
    },
}

fn summarize(pool: &DbPool, row: SessionRow) -> AppResult<SessionSummary> {
    let enrolled = enrollments::approved_students(&pool.conn, row.session.assignment_id)?.len() as i64;

    let (mut present, mut late, mut absent, mut excused) = (0, 0, 0, 0);
    for (status, n) in attendance::status_counts(&pool.conn, row.session.id)? {
        match status {
            AttendanceStatus::Present => present = n,
            AttendanceStatus::Late => late = n,
            AttendanceStatus::Absent => absent = n,
            AttendanceStatus::Excused => excused = n,
        }
    }
    let marked = present + late + absent + excused;

    Ok(SessionSummary {
        row,
        enrolled,
        present,
        late,
        absent,
        excused,
        unmarked: (enrolled - marked).max(0),
        rate: attendance_rate(present + late, enrolled),
    })
}

fn has_ended(row: &SessionRow, now: NaiveDateTime) -> bool {
    row.session.scheduled_date.and_time(row.session.end_time) <= now
}

fn has_started(row: &SessionRow, now: NaiveDateTime) -> bool {
    row.session.scheduled_date.and_time(row.session.start_time) <= now
}

pub struct ReportLogic;

impl ReportLogic {
    pub fn session_summary(pool: &DbPool, actor: &Actor, session_id: i64) -> AppResult<SessionSummary> {
        let session = session_by_id(&pool.conn, session_id)?;
        let assignment = assignment_by_id(&pool.conn, session.assignment_id)?;
        require_teaching_rights(actor, &assignment, "view reports for this class")?;
        summarize(pool, ScheduleLogic::show(pool, session_id)?)
    }

    /// One summary per non-cancelled session of the course in the range.
    pub fn course_summary(
        pool: &DbPool,
        actor: &Actor,
        course: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<SessionSummary>> {
        let course = course_by_code(&pool.conn, course)?;

        let mut out = Vec::new();
        for row in ScheduleLogic::list(pool, Some(&course.code), None, None, from, to, false)? {
            let assignment = assignment_by_id(&pool.conn, row.session.assignment_id)?;
            require_teaching_rights(actor, &assignment, "view reports for this course")?;
            out.push(summarize(pool, row)?);
        }
        Ok(out)
    }

    /// Past, non-cancelled sessions of the student's approved courses.
    pub fn student_summary(
        pool: &DbPool,
        actor: &Actor,
        email: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        now: NaiveDateTime,
    ) -> AppResult<StudentSummary> {
        let student = require_user(&pool.conn, email)?;
        require_role(&student, Role::Student)?;
        require_self_or_admin(actor, &student, "view the attendance report")?;

        let mut lines = Vec::new();
        let mut attended = 0;
        for row in ScheduleLogic::list(pool, None, None, Some(&student.email), from, to, false)? {
            if !row.session.attendance_required || !has_ended(&row, now) {
                continue;
            }
            let status = attendance::find(&pool.conn, row.session.id, student.id)?.map(|r| r.status);
            if status.is_some_and(|s| s.is_attended()) {
                attended += 1;
            }
            lines.push(StudentLine { row, status });
        }

        let held = lines.len() as i64;
        Ok(StudentSummary {
            student,
            lines,
            held,
            attended,
            rate: attendance_rate(attended, held),
        })
    }

    /// Admin dashboard without `email`, otherwise the user's own.
    pub fn dashboard(
        pool: &DbPool,
        actor: &Actor,
        email: Option<&str>,
        now: NaiveDateTime,
    ) -> AppResult<Dashboard> {
        let Some(email) = email else {
            require_admin(actor, "view the admin dashboard")?;
            return Self::admin_dashboard(pool);
        };

        let user = require_user(&pool.conn, email)?;
        require_self_or_admin(actor, &user, "view the dashboard")?;

        match user.role {
            Role::Admin => Self::admin_dashboard(pool),
            Role::Lecturer => Self::lecturer_dashboard(pool, user, now),
            Role::Student => Self::student_dashboard(pool, actor, user, now),
        }
    }

    fn admin_dashboard(pool: &DbPool) -> AppResult<Dashboard> {
        let conn = &pool.conn;
        Ok(Dashboard::Admin {
            users: users::count_users(conn, None)?,
            courses: catalog::count_active(conn, "courses")?,
            departments: catalog::count_active(conn, "departments")?,
            enrollments: enrollments::count_by_status(conn, None)?,
            pending_enrollments: enrollments::count_by_status(conn, Some(EnrollmentStatus::Pending))?,
            sessions: sessions::count_active(conn)?,
            assignments: catalog::count_active(conn, "course_assignments")?,
        })
    }

    fn lecturer_dashboard(pool: &DbPool, user: User, now: NaiveDateTime) -> AppResult<Dashboard> {
        let today = now.date();
        let today_rows =
            ScheduleLogic::list(pool, None, Some(&user.email), None, Some(today), Some(today), false)?;
        let upcoming = ScheduleLogic::list(pool, None, Some(&user.email), None, Some(today), None, false)?
            .into_iter()
            .filter(|r| !has_started(r, now))
            .take(UPCOMING_LIMIT)
            .collect();

        Ok(Dashboard::Lecturer {
            assignments_total: assignments::count_for_lecturer(&pool.conn, user.id, false)?,
            assignments_active: assignments::count_for_lecturer(&pool.conn, user.id, true)?,
            students: enrollments::distinct_students_for_lecturer(&pool.conn, user.id)?,
            today: today_rows,
            upcoming,
            user,
        })
    }

    fn student_dashboard(pool: &DbPool, actor: &Actor, user: User, now: NaiveDateTime) -> AppResult<Dashboard> {
        let today = now.date();
        let today_rows =
            ScheduleLogic::list(pool, None, None, Some(&user.email), Some(today), Some(today), false)?;
        let upcoming = ScheduleLogic::list(pool, None, None, Some(&user.email), Some(today), None, false)?
            .into_iter()
            .filter(|r| !has_started(r, now))
            .take(UPCOMING_LIMIT)
            .collect();
        let summary = Self::student_summary(pool, actor, &user.email, None, None, now)?;

        Ok(Dashboard::Student {
            courses: enrollments::approved_assignments(&pool.conn, user.id)?.len(),
            today: today_rows,
            rate: summary.rate,
            upcoming,
            unread: notifications::count_unread(&pool.conn, user.id)?,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::attend::AttendLogic;
    use crate::core::enroll::EnrollLogic;
    use crate::core::schedule::SessionInput;
    use crate::core::test_support::{Campus, add_student};

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn schedule(c: &mut Campus, date: &str) -> i64 {
        let input = SessionInput {
            assignment_id: c.assignment_id,
            title: "Lecture".into(),
            date: date.into(),
            start: "10:00".into(),
            end: "11:00".into(),
            method: Some("manual".into()),
            ..Default::default()
        };
        ScheduleLogic::create(&mut c.pool, &Actor::Operator, &Config::default(), &input)
            .unwrap()
            .session_id
    }

    #[test]
    fn rate_is_zero_without_enrollees() {
        assert_eq!(attendance_rate(0, 0), 0.0);
        assert_eq!(attendance_rate(2, 4), 50.0);
    }

    #[test]
    fn session_rate_counts_present_and_late() {
        let mut c = Campus::new();
        for email in ["b@uni.edu", "c@uni.edu"] {
            add_student(&mut c.pool, email, "CSC", "200");
            EnrollLogic::enroll_direct(&mut c.pool, &Actor::Operator, email, c.assignment_id).unwrap();
        }
        let id = schedule(&mut c, "2025-03-03");

        let op = Actor::Operator;
        AttendLogic::set(&mut c.pool, &op, id, "stu@uni.edu", "present", None, at(3, 10, 0)).unwrap();
        AttendLogic::set(&mut c.pool, &op, id, "b@uni.edu", "late", None, at(3, 10, 20)).unwrap();

        let s = ReportLogic::session_summary(&c.pool, &op, id).unwrap();
        assert_eq!(s.enrolled, 3);
        assert_eq!((s.present, s.late, s.absent, s.unmarked), (1, 1, 0, 1));
        assert!((s.rate - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn student_summary_only_counts_ended_sessions() {
        let mut c = Campus::new();
        let first = schedule(&mut c, "2025-03-03");
        schedule(&mut c, "2025-03-10");

        AttendLogic::set(&mut c.pool, &Actor::Operator, first, "stu@uni.edu", "late", None, at(3, 10, 30))
            .unwrap();

        let s = ReportLogic::student_summary(&c.pool, &Actor::Operator, "stu@uni.edu", None, None, at(5, 9, 0))
            .unwrap();
        assert_eq!((s.held, s.attended), (1, 1));
        assert_eq!(s.rate, 100.0);

        let later = ReportLogic::student_summary(&c.pool, &Actor::Operator, "stu@uni.edu", None, None, at(11, 9, 0))
            .unwrap();
        assert_eq!((later.held, later.attended), (2, 1));
        assert_eq!(later.rate, 50.0);
    }

    #[test]
    fn dashboards_follow_the_role() {
        let mut c = Campus::new();
        schedule(&mut c, "2025-03-03");
        schedule(&mut c, "2025-03-10");

        let lecturer = Actor::User(c.lecturer.clone());
        match ReportLogic::dashboard(&c.pool, &lecturer, Some("lec@uni.edu"), at(3, 9, 0)).unwrap() {
            Dashboard::Lecturer { students, today, upcoming, assignments_active, .. } => {
                assert_eq!(students, 1);
                assert_eq!(today.len(), 1);
                assert_eq!(upcoming.len(), 2);
                assert_eq!(assignments_active, 1);
            }
            other => panic!("unexpected dashboard {other:?}"),
        }

        match ReportLogic::dashboard(&c.pool, &Actor::Operator, Some("stu@uni.edu"), at(3, 12, 0)).unwrap() {
            Dashboard::Student { courses, upcoming, rate, unread, .. } => {
                assert_eq!(courses, 1);
                assert_eq!(upcoming.len(), 1);
                assert_eq!(rate, 0.0);
                assert!(unread >= 2);
            }
            other => panic!("unexpected dashboard {other:?}"),
        }

        assert!(ReportLogic::dashboard(&c.pool, &lecturer, None, at(3, 9, 0)).is_err());
        match ReportLogic::dashboard(&c.pool, &Actor::Operator, None, at(3, 9, 0)).unwrap() {
            Dashboard::Admin { users, courses, sessions, .. } => {
                assert_eq!(users, 2);
                assert_eq!(courses, 1);
                assert_eq!(sessions, 2);
            }
            other => panic!("unexpected dashboard {other:?}"),
        }
    }
}
