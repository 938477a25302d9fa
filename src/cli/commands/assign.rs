use crate::cli::commands::{open_as, open_pool};
use crate::cli::parser::{AssignCmd, Cli, Commands};
use crate::config::Config;
use crate::core::assign::AssignLogic;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::formatting::{truncate, yes_no};
use crate::utils::table::Table;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Assign { action } = &cli.command else {
        return Ok(());
    };

    match action {
        AssignCmd::Add {
            course,
            lecturer,
            year,
            semester,
        } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            let year = year.as_deref().unwrap_or(&cfg.academic_year);
            let semester = semester.as_deref().unwrap_or(&cfg.semester);
            let id = AssignLogic::assign(&mut pool, &actor, course, lecturer, year, semester)?;
            success(format!(
                "{} assigned to {lecturer} for {year} {semester} (assignment {id})",
                course.to_uppercase()
            ));
        }

        AssignCmd::List {
            lecturer,
            course,
            year,
            semester,
        } => {
            let pool = open_pool(cfg)?;
            let rows = AssignLogic::list(
                &pool,
                lecturer.as_deref(),
                course.as_deref(),
                year.as_deref(),
                semester.as_deref(),
            )?;
            if rows.is_empty() {
                info("No assignments found.");
                return Ok(());
            }

            let mut t = Table::new(&["ID", "Course", "Title", "Lecturer", "Year", "Semester", "Active"]);
            for r in rows {
                t.add_row(vec![
                    r.assignment.id.to_string(),
                    r.course.code,
                    truncate(&r.course.title, 32),
                    r.lecturer.full_name,
                    r.assignment.academic_year,
                    r.assignment.semester,
                    yes_no(r.assignment.is_active).into(),
                ]);
            }
            print!("{}", t.render());
        }

        AssignCmd::Del { id } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            AssignLogic::remove(&mut pool, &actor, *id)?;
            success(format!("Assignment {id} deactivated"));
        }
    }

    Ok(())
}
