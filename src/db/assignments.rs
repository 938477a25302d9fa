use crate::errors::AppResult;
use crate::models::assignment::CourseAssignment;
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn map_row(row: &Row) -> rusqlite::Result<CourseAssignment> {
    Ok(CourseAssignment {
        id: row.get("id")?,
        course_id: row.get("course_id")?,
        lecturer_id: row.get("lecturer_id")?,
        academic_year: row.get("academic_year")?,
        semester: row.get("semester")?,
        is_active: row.get::<_, i32>("is_active")? == 1,
        assigned_by: row.get("assigned_by")?,
        assigned_at: row.get("assigned_at")?,
    })
}

pub fn insert_assignment(
    conn: &Connection,
    course_id: i64,
    lecturer_id: i64,
    academic_year: &str,
    semester: &str,
    assigned_by: Option<i64>,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO course_assignments (course_id, lecturer_id, academic_year, semester, assigned_by, assigned_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            course_id,
            lecturer_id,
            academic_year,
            semester,
            assigned_by,
            Local::now().to_rfc3339()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn exists(
    conn: &Connection,
    course_id: i64,
    lecturer_id: i64,
    academic_year: &str,
    semester: &str,
) -> AppResult<bool> {
    let mut stmt = conn.prepare(
        "SELECT 1 FROM course_assignments
         WHERE course_id = ?1 AND lecturer_id = ?2 AND academic_year = ?3 AND semester = ?4",
    )?;
    Ok(stmt.exists(params![course_id, lecturer_id, academic_year, semester])?)
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<CourseAssignment>> {
    Ok(conn
        .query_row(
            "SELECT * FROM course_assignments WHERE id = ?1",
            [id],
            map_row,
        )
        .optional()?)
}

pub fn list_assignments(
    conn: &Connection,
    lecturer_id: Option<i64>,
    course_id: Option<i64>,
    academic_year: Option<&str>,
    semester: Option<&str>,
) -> AppResult<Vec<CourseAssignment>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM course_assignments
         WHERE is_active = 1
           AND (?1 IS NULL OR lecturer_id = ?1)
           AND (?2 IS NULL OR course_id = ?2)
           AND (?3 IS NULL OR academic_year = ?3)
           AND (?4 IS NULL OR semester = ?4)
         ORDER BY academic_year DESC, semester ASC, id ASC",
    )?;
    let rows = stmt.query_map(
        params![lecturer_id, course_id, academic_year, semester],
        map_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn set_active(conn: &Connection, id: i64, active: bool) -> AppResult<()> {
    conn.execute(
        "UPDATE course_assignments SET is_active = ?1 WHERE id = ?2",
        params![active as i32, id],
    )?;
    Ok(())
}

pub fn count_for_lecturer(conn: &Connection, lecturer_id: i64, active_only: bool) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM course_assignments
         WHERE lecturer_id = ?1 AND (?2 = 0 OR is_active = 1)",
        params![lecturer_id, active_only as i32],
        |r| r.get(0),
    )?)
}
