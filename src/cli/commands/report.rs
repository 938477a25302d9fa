//! Attendance reports and the per-role dashboard.

use crate::cli::commands::open_as;
use crate::cli::parser::{Cli, Commands, ReportCmd};
use crate::config::Config;
use crate::core::report::{Dashboard, ReportLogic, SessionSummary};
use crate::core::schedule::SessionRow;
use crate::errors::AppResult;
use crate::ui::messages::{header, info};
use crate::utils::colors::{GREY, RESET, color_for_rate, color_for_status, paint};
use crate::utils::date::{parse_range, resolve_now};
use crate::utils::formatting::{bold, percent, truncate};
use crate::utils::table::Table;
use chrono::NaiveDate;

type Range = (Option<NaiveDate>, Option<NaiveDate>);

fn range_bounds(range: Option<&str>) -> AppResult<Range> {
    match range {
        Some(r) if r != "all" => {
            let (a, b) = parse_range(r)?;
            Ok((Some(a), Some(b)))
        }
        _ => Ok((None, None)),
    }
}

fn rate_cell(rate: f64) -> String {
    paint(color_for_rate(rate), &percent(rate))
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Report { action } => report(cli, cfg, action),
        Commands::Dashboard { user, at } => dashboard(cli, cfg, user.as_deref(), at.as_deref()),
        _ => Ok(()),
    }
}

fn report(cli: &Cli, cfg: &Config, action: &ReportCmd) -> AppResult<()> {
    let (pool, actor) = open_as(cli, cfg)?;

    match action {
        ReportCmd::Session { id } => {
            let s = ReportLogic::session_summary(&pool, &actor, *id)?;
            header(format!(
                "{} {} - {} {}",
                s.row.course_code,
                s.row.session.title,
                s.row.session.date_str(),
                s.row.session.start_str()
            ));
            print_summaries(std::slice::from_ref(&s));
        }

        ReportCmd::Course { code, range } => {
            let (from, to) = range_bounds(range.as_deref())?;
            let rows = ReportLogic::course_summary(&pool, &actor, code, from, to)?;
            if rows.is_empty() {
                info(format!("No sessions found for {}.", code.to_uppercase()));
                return Ok(());
            }
            header(format!("Attendance for {}", code.to_uppercase()));
            print_summaries(&rows);
        }

        ReportCmd::Student { email, range, at } => {
            let now = resolve_now(at.as_deref())?;
            let (from, to) = range_bounds(range.as_deref())?;
            let s = ReportLogic::student_summary(&pool, &actor, email, from, to, now)?;

            header(format!("Attendance for {} ({})", s.student.full_name, s.student.display_id()));
            if s.lines.is_empty() {
                info("No completed sessions in this period.");
                return Ok(());
            }

            let mut t = Table::new(&["Date", "Time", "Course", "Title", "Status"]);
            for line in &s.lines {
                let status = match line.status {
                    Some(st) => paint(color_for_status(st.to_db_str()), st.to_db_str()),
                    None => format!("{GREY}unmarked{RESET}"),
                };
                t.add_row(vec![
                    line.row.session.date_str(),
                    line.row.session.start_str(),
                    line.row.course_code.clone(),
                    truncate(&line.row.session.title, 30),
                    status,
                ]);
            }
            print!("{}", t.render());
            println!(
                "\n{} {}/{} sessions attended, rate {}",
                bold("Total:"),
                s.attended,
                s.held,
                rate_cell(s.rate)
            );
        }
    }

    Ok(())
}

fn print_summaries(rows: &[SessionSummary]) {
    let mut t = Table::new(&[
        "ID", "Date", "Title", "Enrolled", "Present", "Late", "Absent", "Excused", "Unmarked", "Rate",
    ]);
    for s in rows {
        t.add_row(vec![
            s.row.session.id.to_string(),
            s.row.session.date_str(),
            truncate(&s.row.session.title, 28),
            s.enrolled.to_string(),
            s.present.to_string(),
            s.late.to_string(),
            s.absent.to_string(),
            s.excused.to_string(),
            s.unmarked.to_string(),
            rate_cell(s.rate),
        ]);
    }
    print!("{}", t.render());
}

fn print_sessions(title: &str, rows: &[SessionRow]) {
    println!("\n{}", bold(title));
    if rows.is_empty() {
        println!("  {GREY}none{RESET}");
        return;
    }
    for r in rows {
        println!(
            "  {} {}-{}  {}  {}  ({})",
            r.session.date_str(),
            r.session.start_str(),
            r.session.end_str(),
            r.course_code,
            truncate(&r.session.title, 30),
            r.location()
        );
    }
}

fn dashboard(cli: &Cli, cfg: &Config, user: Option<&str>, at: Option<&str>) -> AppResult<()> {
    let now = resolve_now(at)?;
    let (pool, actor) = open_as(cli, cfg)?;

    match ReportLogic::dashboard(&pool, &actor, user, now)? {
        Dashboard::Admin {
            users,
            courses,
            departments,
            enrollments,
            pending_enrollments,
            sessions,
            assignments,
        } => {
            header("Administration overview");
            let line = |k: &str, v: i64| println!("  {:<22} {v}", bold(k));
            line("Users", users);
            line("Departments", departments);
            line("Courses", courses);
            line("Assignments", assignments);
            line("Enrollments", enrollments);
            line("Pending enrollments", pending_enrollments);
            line("Active sessions", sessions);
        }

        Dashboard::Lecturer {
            user,
            assignments_total,
            assignments_active,
            students,
            today,
            upcoming,
        } => {
            header(format!("Welcome, {}", user.full_name));
            println!("  {:<22} {assignments_active} active / {assignments_total} total", bold("Courses"));
            println!("  {:<22} {students}", bold("Students"));
            print_sessions("Today", &today);
            print_sessions("Upcoming", &upcoming);
        }

        Dashboard::Student {
            user,
            courses,
            today,
            rate,
            upcoming,
            unread,
        } => {
            header(format!("Welcome, {} ({})", user.full_name, user.display_id()));
            println!("  {:<22} {courses}", bold("Enrolled courses"));
            println!("  {:<22} {}", bold("Attendance rate"), rate_cell(rate));
            println!("  {:<22} {unread}", bold("Unread notifications"));
            print_sessions("Today", &today);
            print_sessions("Upcoming", &upcoming);
        }
    }

    Ok(())
}
