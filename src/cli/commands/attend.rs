use crate::cli::commands::{acting_now, open_as};
use crate::cli::parser::{AttendCmd, Cli, Commands};
use crate::config::Config;
use crate::core::attend::AttendLogic;
use crate::core::face::RegisteredFaceVerifier;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::colors::{color_for_status, paint};
use crate::utils::formatting::yes_no;
use crate::utils::path::expand_tilde;
use crate::utils::table::Table;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Attend { action } = &cli.command else {
        return Ok(());
    };

    match action {
        AttendCmd::Mark {
            session,
            student,
            image,
            at,
        } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            let now = acting_now(cli, &actor, at.as_deref())?;
            let image = image.as_deref().map(expand_tilde);
            let verifier = RegisteredFaceVerifier::new(cfg);

            let record = AttendLogic::mark(
                &mut pool,
                cfg,
                &actor,
                *session,
                student,
                image.as_deref(),
                &verifier,
                now,
            )?;
            let status = record.status.to_db_str();
            success(format!(
                "Attendance marked for {student} in session {session}: {}{}",
                paint(color_for_status(status), status),
                if record.face_verified { " (face verified)" } else { "" }
            ));
        }

        AttendCmd::Set {
            session,
            student,
            status,
            notes,
            at,
        } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            let now = acting_now(cli, &actor, at.as_deref())?;
            let record = AttendLogic::set(&mut pool, &actor, *session, student, status, notes.as_deref(), now)?;
            let status = record.status.to_db_str();
            success(format!(
                "{student} set to {} for session {session}",
                paint(color_for_status(status), status)
            ));
        }

        AttendCmd::Close { session, at } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            let now = acting_now(cli, &actor, at.as_deref())?;
            let n = AttendLogic::close(&mut pool, &actor, *session, now)?;
            success(format!("Session {session} closed, {n} student(s) marked absent"));
        }

        AttendCmd::List { session } => {
            let (pool, actor) = open_as(cli, cfg)?;
            let rows = AttendLogic::list(&pool, &actor, *session)?;
            if rows.is_empty() {
                info(format!("No attendance recorded for session {session}."));
                return Ok(());
            }

            let mut t = Table::new(&["Student", "Name", "Status", "Marked at", "Method", "Face", "Notes"]);
            for r in rows {
                let status = r.record.status.to_db_str();
                t.add_row(vec![
                    r.student.display_id().to_string(),
                    r.student.full_name.clone(),
                    paint(color_for_status(status), status),
                    r.record.marked_at.clone(),
                    r.record.method.to_db_str().into(),
                    yes_no(r.record.face_verified).into(),
                    r.record.notes.clone(),
                ]);
            }
            print!("{}", t.render());
        }
    }

    Ok(())
}
