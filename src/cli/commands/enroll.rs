use crate::cli::commands::{open_as, open_pool};
use crate::cli::parser::{Cli, Commands, EnrollCmd};
use crate::config::Config;
use crate::core::assign::{assignment_by_id, load_row};
use crate::core::enroll::EnrollLogic;
use crate::db::users;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::colors::{color_for_enrollment, paint};
use crate::utils::table::Table;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Enroll { action } = &cli.command else {
        return Ok(());
    };

    match action {
        EnrollCmd::Request {
            student,
            assignment,
        } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            let id = EnrollLogic::request(&mut pool, &actor, student, *assignment)?;
            success(format!("Enrollment request {id} submitted, waiting for approval"));
        }

        EnrollCmd::Approve { id, notes } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            let status = EnrollLogic::process(&mut pool, &actor, *id, true, notes.as_deref())?;
            success(format!("Enrollment {id} {}", status.to_db_str()));
        }

        EnrollCmd::Reject { id, notes } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            let status = EnrollLogic::process(&mut pool, &actor, *id, false, notes.as_deref())?;
            success(format!("Enrollment {id} {}", status.to_db_str()));
        }

        EnrollCmd::Withdraw { id } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            EnrollLogic::withdraw(&mut pool, &actor, *id)?;
            success(format!("Enrollment {id} withdrawn"));
        }

        EnrollCmd::Add {
            student,
            assignment,
        } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            let id = EnrollLogic::enroll_direct(&mut pool, &actor, student, *assignment)?;
            success(format!("{student} enrolled (enrollment {id})"));
        }

        EnrollCmd::List {
            student,
            lecturer,
            assignment,
            status,
        } => {
            let pool = open_pool(cfg)?;
            let rows = EnrollLogic::list(
                &pool,
                student.as_deref(),
                lecturer.as_deref(),
                *assignment,
                status.as_deref(),
            )?;
            if rows.is_empty() {
                info("No enrollments found.");
                return Ok(());
            }

            let mut t = Table::new(&["ID", "Student", "Course", "Period", "Status", "Requested", "Notes"]);
            for e in rows {
                let student = users::find_by_id(&pool.conn, e.student_id)?
                    .map(|u| u.email)
                    .unwrap_or_else(|| format!("#{}", e.student_id));
                let row = load_row(&pool.conn, assignment_by_id(&pool.conn, e.assignment_id)?)?;
                let status = e.status.to_db_str();
                t.add_row(vec![
                    e.id.to_string(),
                    student,
                    row.course.code,
                    format!("{} {}", row.assignment.academic_year, row.assignment.semester),
                    paint(color_for_enrollment(status), status),
                    e.requested_at,
                    e.notes,
                ]);
            }
            print!("{}", t.render());
        }
    }

    Ok(())
}
