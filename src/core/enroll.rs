use crate::core::assign::{assignment_by_id, load_row, require_teaching_rights};
use crate::core::notify;
use crate::core::users::{require_admin, require_role, require_self_or_admin, require_user};
use crate::db::enrollments as q;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::users;
use crate::errors::{AppError, AppResult};
use crate::models::enrollment::{Enrollment, EnrollmentStatus};
use crate::models::notification::{NewNotification, NotificationKind};
use crate::models::role::{Level, Role};
use crate::models::user::{Actor, User};
use rusqlite::Connection;

pub fn enrollment_by_id(conn: &Connection, id: i64) -> AppResult<Enrollment> {
    q::find_by_id(conn, id)?.ok_or_else(|| AppError::NotFound(format!("enrollment {id}")))
}

/// Department and level of the student must match the course.
fn check_eligibility(student: &User, dept_id: i64, level: Level) -> AppResult<()> {
    if student.department_id != Some(dept_id) {
        return Err(AppError::Validation(
            "students can only enroll in courses from their department".into(),
        ));
    }
    if student.level != Some(level) {
        return Err(AppError::Validation(
            "students can only enroll in courses for their level".into(),
        ));
    }
    Ok(())
}

pub struct EnrollLogic;

impl EnrollLogic {
    pub fn request(
        pool: &mut DbPool,
        actor: &Actor,
        student: &str,
        assignment_id: i64,
    ) -> AppResult<i64> {
        let student = require_user(&pool.conn, student)?;
        require_role(&student, Role::Student)?;
        require_self_or_admin(actor, &student, "request enrollment")?;

        let assignment = assignment_by_id(&pool.conn, assignment_id)?;
        if !assignment.is_active {
            return Err(AppError::NotFound(format!("assignment {assignment_id}")));
        }
        let row = load_row(&pool.conn, assignment)?;
        check_eligibility(&student, row.course.department_id, row.course.level)?;

        if q::find(&pool.conn, student.id, assignment_id)?.is_some() {
            return Err(AppError::Validation(format!(
                "{} has already requested enrollment in {}",
                student.email, row.course.code
            )));
        }

        let tx = pool.conn.transaction()?;
        let id = q::insert_enrollment(&tx, student.id, assignment_id, EnrollmentStatus::Pending, None)?;

        notify::send_linked(
            &tx,
            NewNotification {
                recipient_id: row.lecturer.id,
                sender_id: Some(student.id),
                kind: NotificationKind::EnrollmentRequest,
                title: format!("New Enrollment Request for {}", row.course.code),
                message: format!(
                    "{} ({}) has requested to enroll in {}.",
                    student.full_name,
                    student.display_id(),
                    row.course.code
                ),
                enrollment_id: Some(id),
                session_id: None,
            },
        )?;

        audit(
            &tx,
            "enroll",
            &format!("enrollment:{id}"),
            &format!("{} requested {}", student.email, row.course.code),
        )?;
        tx.commit()?;

        Ok(id)
    }

    /// Approve or reject a pending request.
    pub fn process(
        pool: &mut DbPool,
        actor: &Actor,
        enrollment_id: i64,
        approve: bool,
        notes: Option<&str>,
    ) -> AppResult<EnrollmentStatus> {
        let enrollment = enrollment_by_id(&pool.conn, enrollment_id)?;
        let assignment = assignment_by_id(&pool.conn, enrollment.assignment_id)?;
        require_teaching_rights(actor, &assignment, "process this enrollment")?;

        if enrollment.status != EnrollmentStatus::Pending {
            return Err(AppError::Validation(format!(
                "enrollment {enrollment_id} is already {}",
                enrollment.status.to_db_str()
            )));
        }

        let row = load_row(&pool.conn, assignment)?;
        let (status, kind, verb) = if approve {
            (EnrollmentStatus::Approved, NotificationKind::EnrollmentApproved, "approved")
        } else {
            (EnrollmentStatus::Rejected, NotificationKind::EnrollmentRejected, "rejected")
        };

        let notes = notes.unwrap_or("").trim();
        let mut message = format!(
            "Your enrollment request for {} has been {verb}.",
            row.course.code
        );
        if !notes.is_empty() {
            message.push_str(&format!(" Notes: {notes}"));
        }

        let tx = pool.conn.transaction()?;
        q::update_status(&tx, enrollment.id, status, actor.user_id(), notes)?;
        notify::send_linked(
            &tx,
            NewNotification {
                recipient_id: enrollment.student_id,
                sender_id: actor.user_id(),
                kind,
                title: format!("Enrollment {}: {}", capitalize(verb), row.course.code),
                message,
                enrollment_id: Some(enrollment.id),
                session_id: None,
            },
        )?;
        audit(
            &tx,
            "enroll",
            &format!("enrollment:{}", enrollment.id),
            &format!("Enrollment {verb} by {}", actor.label()),
        )?;
        tx.commit()?;

        Ok(status)
    }

    pub fn withdraw(pool: &mut DbPool, actor: &Actor, enrollment_id: i64) -> AppResult<()> {
        let enrollment = enrollment_by_id(&pool.conn, enrollment_id)?;
        let student = users::find_by_id(&pool.conn, enrollment.student_id)?
            .ok_or_else(|| AppError::NotFound(format!("student #{}", enrollment.student_id)))?;
        require_self_or_admin(actor, &student, "withdraw")?;

        if !matches!(
            enrollment.status,
            EnrollmentStatus::Pending | EnrollmentStatus::Approved
        ) {
            return Err(AppError::Validation(format!(
                "cannot withdraw a {} enrollment",
                enrollment.status.to_db_str()
            )));
        }

        q::update_status(
            &pool.conn,
            enrollment.id,
            EnrollmentStatus::Withdrawn,
            actor.user_id(),
            &enrollment.notes,
        )?;
        audit(
            &pool.conn,
            "enroll",
            &format!("enrollment:{}", enrollment.id),
            &format!("{} withdrew", student.email),
        )?;
        Ok(())
    }

    /// Admin enrollment: skips the request step and starts approved.
    pub fn enroll_direct(
        pool: &mut DbPool,
        actor: &Actor,
        student: &str,
        assignment_id: i64,
    ) -> AppResult<i64> {
        require_admin(actor, "enroll students directly")?;
        let student = require_user(&pool.conn, student)?;
        require_role(&student, Role::Student)?;

        let assignment = assignment_by_id(&pool.conn, assignment_id)?;
        if !assignment.is_active {
            return Err(AppError::NotFound(format!("assignment {assignment_id}")));
        }
        let row = load_row(&pool.conn, assignment)?;
        check_eligibility(&student, row.course.department_id, row.course.level)?;

        if q::find(&pool.conn, student.id, assignment_id)?.is_some() {
            return Err(AppError::Validation(format!(
                "{} is already enrolled in {}",
                student.email, row.course.code
            )));
        }

        let tx = pool.conn.transaction()?;
        let id = q::insert_enrollment(
            &tx,
            student.id,
            assignment_id,
            EnrollmentStatus::Approved,
            actor.user_id(),
        )?;
        notify::send_linked(
            &tx,
            NewNotification {
                recipient_id: student.id,
                sender_id: actor.user_id(),
                kind: NotificationKind::EnrollmentApproved,
                title: format!("Enrolled: {}", row.course.code),
                message: format!("You have been enrolled in {} - {}.", row.course.code, row.course.title),
                enrollment_id: Some(id),
                session_id: None,
            },
        )?;
        audit(
            &tx,
            "enroll",
            &format!("enrollment:{id}"),
            &format!("{} enrolled in {} by {}", student.email, row.course.code, actor.label()),
        )?;
        tx.commit()?;

        Ok(id)
    }

    pub fn list(
        pool: &DbPool,
        student: Option<&str>,
        lecturer: Option<&str>,
        assignment_id: Option<i64>,
        status: Option<&str>,
    ) -> AppResult<Vec<Enrollment>> {
        let student_id = match student {
            Some(e) => Some(require_user(&pool.conn, e)?.id),
            None => None,
        };
        let lecturer_id = match lecturer {
            Some(e) => Some(require_user(&pool.conn, e)?.id),
            None => None,
        };
        let status = match status {
            Some(s) => Some(
                EnrollmentStatus::from_code(s).ok_or_else(|| AppError::InvalidStatus(s.to_string()))?,
            ),
            None => None,
        };
        q::list_enrollments(&pool.conn, student_id, lecturer_id, assignment_id, status)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{Campus, add_student};
    use crate::db::notifications;

    #[test]
    fn request_then_approve_notifies_both_sides() {
        let mut c = Campus::new();
        let other = add_student(&mut c.pool, "new@uni.edu", "CSC", "200");

        // The lecturer already holds the assignment notice.
        let unread = notifications::count_unread(&c.pool.conn, c.lecturer.id).unwrap();
        let id = EnrollLogic::request(&mut c.pool, &Actor::Operator, "new@uni.edu", c.assignment_id)
            .unwrap();
        assert_eq!(
            notifications::count_unread(&c.pool.conn, c.lecturer.id).unwrap(),
            unread + 1
        );
        let inbox = notifications::list_for_user(&c.pool.conn, c.lecturer.id, true).unwrap();
        assert_eq!(inbox[0].kind, NotificationKind::EnrollmentRequest);

        let lecturer = Actor::User(c.lecturer.clone());
        let status = EnrollLogic::process(&mut c.pool, &lecturer, id, true, Some("welcome")).unwrap();
        assert_eq!(status, EnrollmentStatus::Approved);

        let inbox = notifications::list_for_user(&c.pool.conn, other.id, false).unwrap();
        assert!(inbox[0].message.contains("Notes: welcome"));
        assert!(q::is_approved(&c.pool.conn, other.id, c.assignment_id).unwrap());
    }

    #[test]
    fn duplicate_request_is_rejected() {
        let mut c = Campus::new();
        add_student(&mut c.pool, "dup@uni.edu", "CSC", "200");
        EnrollLogic::request(&mut c.pool, &Actor::Operator, "dup@uni.edu", c.assignment_id).unwrap();
        let err = EnrollLogic::request(&mut c.pool, &Actor::Operator, "dup@uni.edu", c.assignment_id)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn department_and_level_must_match() {
        let mut c = Campus::new();
        add_student(&mut c.pool, "fresh@uni.edu", "CSC", "100");
        let err = EnrollLogic::request(&mut c.pool, &Actor::Operator, "fresh@uni.edu", c.assignment_id)
            .unwrap_err();
        assert!(err.to_string().contains("level"));

        add_student(&mut c.pool, "math@uni.edu", "MTH", "200");
        let err = EnrollLogic::request(&mut c.pool, &Actor::Operator, "math@uni.edu", c.assignment_id)
            .unwrap_err();
        assert!(err.to_string().contains("department"));
    }

    #[test]
    fn only_the_assigned_lecturer_processes() {
        let mut c = Campus::new();
        add_student(&mut c.pool, "p@uni.edu", "CSC", "200");
        let id =
            EnrollLogic::request(&mut c.pool, &Actor::Operator, "p@uni.edu", c.assignment_id).unwrap();

        let student = Actor::User(c.student.clone());
        let err = EnrollLogic::process(&mut c.pool, &student, id, true, None).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
    }

    #[test]
    fn withdraw_moves_approved_to_withdrawn() {
        let mut c = Campus::new();
        let e = q::find(&c.pool.conn, c.student.id, c.assignment_id)
            .unwrap()
            .unwrap();
        let me = Actor::User(c.student.clone());
        EnrollLogic::withdraw(&mut c.pool, &me, e.id).unwrap();
        assert_eq!(
            enrollment_by_id(&c.pool.conn, e.id).unwrap().status,
            EnrollmentStatus::Withdrawn
        );
        assert!(EnrollLogic::withdraw(&mut c.pool, &me, e.id).is_err());
    }
}
