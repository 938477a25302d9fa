use crate::core::catalog::course_by_code;
use crate::core::users::require_user;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::AttendanceExport;
use crate::export::pdf_export::export_pdf;
use crate::export::xlsx::export_xlsx;
use crate::models::attendance::AttendanceStatus;
use crate::ui::messages::warning;
use crate::utils::date::parse_range;
use crate::utils::path::ensure_writable;
use chrono::NaiveDate;
use rusqlite::{Row, params};
use std::path::Path;

/// Optional filters of `export`.
#[derive(Debug, Default, Clone)]
pub struct ExportFilter {
    /// `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `A:B` or `all`.
    pub range: Option<String>,
    pub course: Option<String>,
    pub student: Option<String>,
    pub status: Option<String>,
}

struct Resolved {
    bounds: Option<(NaiveDate, NaiveDate)>,
    course_id: Option<i64>,
    student_id: Option<i64>,
    status: Option<AttendanceStatus>,
}

pub struct ExportLogic;

impl ExportLogic {
    /// Writes the filtered attendance records to `file`.
    /// Returns how many rows were written (0 writes nothing).
    pub fn export(
        pool: &DbPool,
        format: ExportFormat,
        file: &str,
        filter: &ExportFilter,
        force: bool,
    ) -> AppResult<usize> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "output file path must be absolute: {file}"
            )));
        }

        let resolved = resolve(pool, filter)?;
        let records = load_records(pool, &resolved)?;

        if records.is_empty() {
            warning("No attendance records match the selected filters.");
            return Ok(0);
        }

        ensure_writable(path, force)?;

        match format {
            ExportFormat::Csv => export_csv(&records, path)?,
            ExportFormat::Json => export_json(&records, path)?,
            ExportFormat::Xlsx => export_xlsx(&records, path)?,
            ExportFormat::Pdf => export_pdf(&records, path, &build_pdf_title(filter))?,
        }

        Ok(records.len())
    }
}

fn resolve(pool: &DbPool, filter: &ExportFilter) -> AppResult<Resolved> {
    let bounds = match filter.range.as_deref() {
        None => None,
        Some(r) if r.eq_ignore_ascii_case("all") => None,
        Some(r) => Some(parse_range(r)?),
    };
    let course_id = match filter.course.as_deref() {
        Some(c) => Some(course_by_code(&pool.conn, c)?.id),
        None => None,
    };
    let student_id = match filter.student.as_deref() {
        Some(e) => Some(require_user(&pool.conn, e)?.id),
        None => None,
    };
    let status = match filter.status.as_deref() {
        Some(s) => Some(AttendanceStatus::from_code(s).ok_or_else(|| AppError::InvalidStatus(s.into()))?),
        None => None,
    };

    Ok(Resolved {
        bounds,
        course_id,
        student_id,
        status,
    })
}

fn build_pdf_title(filter: &ExportFilter) -> String {
    let mut title = String::from("Attendance records");

    if let Some(c) = &filter.course {
        title.push_str(&format!(" for {}", c.to_uppercase()));
    }

    match filter.range.as_deref() {
        None => {}
        Some(r) if r.eq_ignore_ascii_case("all") => {}
        Some(r) => match r.split_once(':') {
            Some((a, b)) => title.push_str(&format!(" from {a} to {b}")),
            None => title.push_str(&format!(" ({r})")),
        },
    }

    title
}

fn load_records(pool: &DbPool, f: &Resolved) -> AppResult<Vec<AttendanceExport>> {
    let mut stmt = pool.conn.prepare(
        "SELECT r.id, s.scheduled_date, s.start_time, c.code, s.title,
                u.email, COALESCE(u.student_id, ''), r.status, r.marked_at,
                r.face_verified, r.method
         FROM class_attendances r
         JOIN class_sessions s ON s.id = r.session_id
         JOIN course_assignments a ON a.id = s.assignment_id
         JOIN courses c ON c.id = a.course_id
         JOIN users u ON u.id = r.student_id
         WHERE (?1 IS NULL OR s.scheduled_date >= ?1)
           AND (?2 IS NULL OR s.scheduled_date <= ?2)
           AND (?3 IS NULL OR c.id = ?3)
           AND (?4 IS NULL OR r.student_id = ?4)
           AND (?5 IS NULL OR r.status = ?5)
         ORDER BY s.scheduled_date ASC, s.start_time ASC, c.code ASC, u.email ASC",
    )?;

    let (from, to) = match f.bounds {
        Some((a, b)) => (
            Some(a.format("%Y-%m-%d").to_string()),
            Some(b.format("%Y-%m-%d").to_string()),
        ),
        None => (None, None),
    };

    let rows = stmt.query_map(
        params![from, to, f.course_id, f.student_id, f.status.map(|s| s.to_db_str())],
        map_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<AttendanceExport> {
    Ok(AttendanceExport {
        id: row.get(0)?,
        date: row.get(1)?,
        start_time: row.get(2)?,
        course: row.get(3)?,
        session: row.get(4)?,
        student: row.get(5)?,
        student_id: row.get(6)?,
        status: row.get(7)?,
        marked_at: row.get(8)?,
        face_verified: row.get::<_, i32>(9)? == 1,
        method: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_titles() {
        let f = ExportFilter {
            range: Some("2025-03-01:2025-03-31".into()),
            course: Some("csc201".into()),
            ..Default::default()
        };
        assert_eq!(build_pdf_title(&f), "Attendance records for CSC201 from 2025-03-01 to 2025-03-31");
        assert_eq!(build_pdf_title(&ExportFilter::default()), "Attendance records");
    }
}
