use crate::db::conversion_error;
use crate::errors::{AppError, AppResult};
use crate::models::room::{Room, RoomType, VirtualPlatform};
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn map_row(row: &Row) -> rusqlite::Result<Room> {
    let type_str: String = row.get("room_type")?;
    let room_type = RoomType::from_db_str(&type_str)
        .ok_or_else(|| conversion_error(AppError::InvalidValue(format!("room type {type_str}"))))?;

    let platform = row
        .get::<_, Option<String>>("platform")?
        .and_then(|p| VirtualPlatform::from_db_str(&p));

    Ok(Room {
        id: row.get("id")?,
        code: row.get("code")?,
        name: row.get("name")?,
        room_type,
        capacity: row.get("capacity")?,
        building: row.get("building")?,
        floor: row.get("floor")?,
        facilities: row.get("facilities")?,
        platform,
        meeting_link: row.get("meeting_link")?,
        is_available: row.get::<_, i32>("is_available")? == 1,
        notes: row.get("notes")?,
    })
}

pub fn insert_room(conn: &Connection, r: &Room) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO rooms (code, name, room_type, capacity, building, floor, facilities,
                            platform, meeting_link, is_available, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            r.code,
            r.name,
            r.room_type.to_db_str(),
            r.capacity,
            r.building,
            r.floor,
            r.facilities,
            r.platform.map(|p| p.to_db_str()),
            r.meeting_link,
            r.is_available as i32,
            r.notes,
            Local::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_room(conn: &Connection, r: &Room) -> AppResult<()> {
    conn.execute(
        "UPDATE rooms SET name = ?1, capacity = ?2, building = ?3, floor = ?4, facilities = ?5,
                          platform = ?6, meeting_link = ?7, is_available = ?8, notes = ?9
         WHERE id = ?10",
        params![
            r.name,
            r.capacity,
            r.building,
            r.floor,
            r.facilities,
            r.platform.map(|p| p.to_db_str()),
            r.meeting_link,
            r.is_available as i32,
            r.notes,
            r.id,
        ],
    )?;
    Ok(())
}

pub fn find_room(conn: &Connection, code: &str) -> AppResult<Option<Room>> {
    Ok(conn
        .query_row("SELECT * FROM rooms WHERE code = ?1", [code], map_row)
        .optional()?)
}

pub fn find_room_by_id(conn: &Connection, id: i64) -> AppResult<Option<Room>> {
    Ok(conn
        .query_row("SELECT * FROM rooms WHERE id = ?1", [id], map_row)
        .optional()?)
}

pub fn list_rooms(
    conn: &Connection,
    room_type: Option<RoomType>,
    available_only: bool,
) -> AppResult<Vec<Room>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM rooms
         WHERE (?1 IS NULL OR room_type = ?1) AND (?2 = 0 OR is_available = 1)
         ORDER BY room_type ASC, name ASC",
    )?;
    let rows = stmt.query_map(
        params![room_type.map(|t| t.to_db_str()), available_only as i32],
        map_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
