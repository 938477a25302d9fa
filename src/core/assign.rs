use crate::core::catalog::course_by_code;
use crate::core::notify;
use crate::core::users::{require_admin, require_role, require_user};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{assignments as q, catalog, users};
use crate::errors::{AppError, AppResult};
use crate::models::assignment::CourseAssignment;
use crate::models::catalog::Course;
use crate::models::notification::NotificationKind;
use crate::models::role::Role;
use crate::models::user::{Actor, User};
use regex::Regex;
use rusqlite::Connection;

/// An assignment joined with the rows needed to print it.
#[derive(Debug, Clone)]
pub struct AssignmentRow {
    pub assignment: CourseAssignment,
    pub course: Course,
    pub lecturer: User,
}

pub fn assignment_by_id(conn: &Connection, id: i64) -> AppResult<CourseAssignment> {
    q::find_by_id(conn, id)?.ok_or_else(|| AppError::NotFound(format!("assignment {id}")))
}

pub fn load_row(conn: &Connection, assignment: CourseAssignment) -> AppResult<AssignmentRow> {
    let course = catalog::find_course_by_id(conn, assignment.course_id)?
        .ok_or_else(|| AppError::NotFound(format!("course #{}", assignment.course_id)))?;
    let lecturer = users::find_by_id(conn, assignment.lecturer_id)?
        .ok_or_else(|| AppError::NotFound(format!("lecturer #{}", assignment.lecturer_id)))?;
    Ok(AssignmentRow {
        assignment,
        course,
        lecturer,
    })
}

/// The assigned lecturer and admins may act on an assignment's classes.
pub fn require_teaching_rights(
    actor: &Actor,
    assignment: &CourseAssignment,
    action: &str,
) -> AppResult<()> {
    match actor {
        Actor::Operator => Ok(()),
        Actor::User(u) if u.is_admin() || u.id == assignment.lecturer_id => Ok(()),
        Actor::User(u) => Err(AppError::PermissionDenied(format!(
            "{} may not {action}: not the assigned lecturer",
            u.email
        ))),
    }
}

fn validate_academic_year(year: &str) -> AppResult<()> {
    let re = Regex::new(r"^(\d{4})/(\d{4})$").map_err(|e| AppError::Other(e.to_string()))?;
    let caps = re
        .captures(year)
        .ok_or_else(|| AppError::Validation(format!("academic year '{year}' (use YYYY/YYYY)")))?;

    let first: i32 = caps[1].parse().unwrap_or(0);
    let second: i32 = caps[2].parse().unwrap_or(0);
    if second != first + 1 {
        return Err(AppError::Validation(format!(
            "academic year '{year}' must span consecutive years"
        )));
    }
    Ok(())
}

pub struct AssignLogic;

impl AssignLogic {
    pub fn assign(
        pool: &mut DbPool,
        actor: &Actor,
        course: &str,
        lecturer: &str,
        academic_year: &str,
        semester: &str,
    ) -> AppResult<i64> {
        require_admin(actor, "assign lecturers")?;
        validate_academic_year(academic_year)?;
        if semester.trim().is_empty() {
            return Err(AppError::Validation("semester must not be empty".into()));
        }

        let course = course_by_code(&pool.conn, course)?;
        if !course.is_active {
            return Err(AppError::Validation(format!("course {} is inactive", course.code)));
        }

        let lecturer = require_user(&pool.conn, lecturer)?;
        require_role(&lecturer, Role::Lecturer)?;

        let semester = semester.trim();
        if q::exists(&pool.conn, course.id, lecturer.id, academic_year, semester)? {
            return Err(AppError::Validation(format!(
                "{} is already assigned to {} for {academic_year} {semester}",
                lecturer.email, course.code
            )));
        }

        let tx = pool.conn.transaction()?;
        let id = q::insert_assignment(
            &tx,
            course.id,
            lecturer.id,
            academic_year,
            semester,
            actor.user_id(),
        )?;

        notify::send(
            &tx,
            lecturer.id,
            actor,
            NotificationKind::AssignmentCreated,
            format!("New course assignment: {}", course.code),
            format!(
                "You have been assigned to teach {} - {} for {academic_year} ({semester} semester).",
                course.code, course.title
            ),
        )?;

        audit(
            &tx,
            "add",
            &format!("assignment:{id}"),
            &format!("{} -> {} ({academic_year} {semester})", course.code, lecturer.email),
        )?;
        tx.commit()?;

        Ok(id)
    }

    pub fn list(
        pool: &DbPool,
        lecturer: Option<&str>,
        course: Option<&str>,
        academic_year: Option<&str>,
        semester: Option<&str>,
    ) -> AppResult<Vec<AssignmentRow>> {
        let lecturer_id = match lecturer {
            Some(e) => Some(require_user(&pool.conn, e)?.id),
            None => None,
        };
        let course_id = match course {
            Some(c) => Some(course_by_code(&pool.conn, c)?.id),
            None => None,
        };

        let mut out = Vec::new();
        for a in q::list_assignments(&pool.conn, lecturer_id, course_id, academic_year, semester)? {
            out.push(load_row(&pool.conn, a)?);
        }
        Ok(out)
    }

    pub fn remove(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<()> {
        require_admin(actor, "remove assignments")?;
        let a = assignment_by_id(&pool.conn, id)?;
        q::set_active(&pool.conn, a.id, false)?;
        audit(&pool.conn, "del", &format!("assignment:{id}"), "Assignment deactivated")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn academic_year_must_be_consecutive() {
        assert!(validate_academic_year("2024/2025").is_ok());
        assert!(validate_academic_year("2024/2026").is_err());
        assert!(validate_academic_year("2024-2025").is_err());
    }
}
