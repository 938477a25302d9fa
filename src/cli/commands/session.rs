//! `session` subcommands: scheduling, editing, listing and cancelling classes.

use crate::cli::commands::{open_as, open_pool};
use crate::cli::parser::{Cli, Commands, SessionCmd};
use crate::config::Config;
use crate::core::schedule::{Conflict, ScheduleLogic, SessionEdit, SessionInput, SessionRow};
use crate::core::window::{AttendanceWindow, WindowState};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors::{GREEN, GREY, RED, RESET, YELLOW};
use crate::utils::date::{now, parse_date, parse_range, resolve_now};
use crate::utils::formatting::{bold, truncate, yes_no};
use crate::utils::table::Table;
use crate::utils::time::format_remaining;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Session { action } = &cli.command else {
        return Ok(());
    };

    match action {
        SessionCmd::Add {
            assignment,
            title,
            description,
            class_type,
            date,
            start,
            end,
            room,
            location,
            link,
            before,
            after,
            optional,
            method,
            recurrence,
            until,
            capacity,
            allow_conflicts,
        } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            let input = SessionInput {
                assignment_id: *assignment,
                title: title.clone(),
                description: description.clone(),
                class_type: class_type.clone(),
                date: date.clone(),
                start: start.clone(),
                end: end.clone(),
                room: room.clone(),
                location: location.clone(),
                meeting_link: link.clone(),
                window_before: *before,
                window_after: *after,
                attendance_optional: *optional,
                method: method.clone(),
                recurrence: recurrence.clone(),
                recurrence_end: until.clone(),
                max_capacity: *capacity,
                allow_conflicts: *allow_conflicts,
            };

            let scheduled = ScheduleLogic::create(&mut pool, &actor, cfg, &input)?;
            warn_conflicts(&scheduled.conflicts);

            if scheduled.occurrences.is_empty() {
                success(format!("Session {} scheduled", scheduled.session_id));
            } else {
                success(format!(
                    "Session {} scheduled with {} occurrences ({} to {})",
                    scheduled.session_id,
                    scheduled.total(),
                    scheduled.date.format("%Y-%m-%d"),
                    scheduled.last_date().format("%Y-%m-%d"),
                ));
            }
        }

        SessionCmd::Edit {
            id,
            title,
            description,
            class_type,
            date,
            start,
            end,
            room,
            location,
            link,
            before,
            after,
            method,
            capacity,
            allow_conflicts,
        } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            let edit = SessionEdit {
                title: title.clone(),
                description: description.clone(),
                class_type: class_type.clone(),
                date: date.clone(),
                start: start.clone(),
                end: end.clone(),
                room: room.clone(),
                location: location.clone(),
                meeting_link: link.clone(),
                window_before: *before,
                window_after: *after,
                method: method.clone(),
                max_capacity: *capacity,
                allow_conflicts: *allow_conflicts,
            };

            let updated = ScheduleLogic::update(&mut pool, &actor, *id, &edit)?;
            warn_conflicts(&updated.conflicts);
            let s = &updated.session;
            success(format!(
                "Session {id} updated ({}): {} {}-{}, enrolled students notified",
                updated.changes.join(", "),
                s.date_str(),
                s.start_str(),
                s.end_str()
            ));
        }

        SessionCmd::List {
            course,
            date,
            range,
            lecturer,
            student,
            all,
        } => {
            let (from, to) = match (date, range) {
                (Some(d), _) => {
                    let d = parse_date(d).ok_or_else(|| AppError::InvalidDate(d.clone()))?;
                    (Some(d), Some(d))
                }
                (None, Some(r)) if r != "all" => {
                    let (a, b) = parse_range(r)?;
                    (Some(a), Some(b))
                }
                _ => (None, None),
            };

            let pool = open_pool(cfg)?;
            let rows = ScheduleLogic::list(
                &pool,
                course.as_deref(),
                lecturer.as_deref(),
                student.as_deref(),
                from,
                to,
                *all,
            )?;
            if rows.is_empty() {
                info("No sessions found.");
                return Ok(());
            }

            let mut t = Table::new(&["ID", "Date", "Time", "Course", "Title", "Type", "Location", "State"]);
            for r in &rows {
                t.add_row(vec![
                    r.session.id.to_string(),
                    r.session.date_str(),
                    format!("{}-{}", r.session.start_str(), r.session.end_str()),
                    r.course_code.clone(),
                    truncate(&r.session.title, 30),
                    r.session.class_type.to_db_str().into(),
                    truncate(&r.location(), 32),
                    state_label(r),
                ]);
            }
            print!("{}", t.render());
        }

        SessionCmd::Show { id } => {
            let pool = open_pool(cfg)?;
            let row = ScheduleLogic::show(&pool, *id)?;
            print_details(&row)?;
        }

        SessionCmd::Cancel { id, reason } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            ScheduleLogic::cancel(&mut pool, &actor, *id, reason)?;
            success(format!("Session {id} cancelled, enrolled students notified"));
        }

        SessionCmd::Available { student, at } => {
            let now = resolve_now(at.as_deref())?;
            let pool = open_pool(cfg)?;
            let rows = ScheduleLogic::available(&pool, student, now)?;
            if rows.is_empty() {
                info("No sessions are open for marking right now.");
                return Ok(());
            }

            let mut t = Table::new(&["ID", "Course", "Title", "Time", "Location", "Closes in"]);
            for a in rows {
                t.add_row(vec![
                    a.row.session.id.to_string(),
                    a.row.course_code.clone(),
                    truncate(&a.row.session.title, 30),
                    format!("{}-{}", a.row.session.start_str(), a.row.session.end_str()),
                    truncate(&a.row.location(), 32),
                    format!("{GREEN}{}{RESET}", format_remaining(a.remaining)),
                ]);
            }
            print!("{}", t.render());
        }
    }

    Ok(())
}

fn warn_conflicts(conflicts: &[Conflict]) {
    for c in conflicts {
        warning(format!(
            "{} conflict on {} with session {}: {}",
            c.kind.as_str(),
            c.date.format("%Y-%m-%d"),
            c.session_id,
            c.message
        ));
    }
}

fn state_label(r: &SessionRow) -> String {
    if r.session.is_cancelled {
        format!("{RED}cancelled{RESET}")
    } else if !r.session.is_active {
        format!("{GREY}inactive{RESET}")
    } else {
        "scheduled".into()
    }
}

fn print_details(row: &SessionRow) -> AppResult<()> {
    let s = &row.session;
    header(format!("Session {} - {} {}", s.id, row.course_code, s.title));

    let field = |k: &str, v: String| println!("  {:<14} {}", bold(k), v);
    field("Date", s.date_str());
    field("Time", format!("{}-{}", s.start_str(), s.end_str()));
    field("Type", s.class_type.to_db_str().into());
    field("Location", row.location());
    if let Some(link) = s.effective_meeting_link(row.room.as_ref()) {
        field("Meeting link", link);
    }
    if let Some(cap) = s.capacity(row.room.as_ref()) {
        field("Capacity", cap.to_string());
    }
    if !s.description.is_empty() {
        field("Description", s.description.clone());
    }
    field("Attendance", yes_no(s.attendance_required).into());
    field("Method", s.attendance_method.to_db_str().into());
    if let Some(parent) = s.parent_session {
        field("Series", format!("occurrence of session {parent}"));
    } else if s.recurrence.to_db_str() != "none" {
        let until = s
            .recurrence_end
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        field("Recurrence", format!("{} until {until}", s.recurrence.to_db_str()));
    }

    let window = AttendanceWindow::for_session(s)?;
    field(
        "Window",
        format!(
            "{} - {}",
            window.opens_at().format("%Y-%m-%d %H:%M"),
            window.closes_at().format("%Y-%m-%d %H:%M")
        ),
    );

    if s.is_cancelled {
        field("State", format!("{RED}cancelled{RESET} ({})", s.cancellation_reason));
    } else {
        let state = match window.evaluate(now()) {
            WindowState::Pending { opens_in } => {
                format!("{YELLOW}opens in {}{RESET}", format_remaining(opens_in))
            }
            WindowState::Open { remaining } => {
                format!("{GREEN}open, {} left{RESET}", format_remaining(remaining))
            }
            WindowState::Closed => format!("{GREY}closed{RESET}"),
        };
        field("State", state);
    }

    Ok(())
}
