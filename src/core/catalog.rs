//! Colleges, departments, courses and rooms.
//!
//! Codes are normalized to upper case before every lookup. Deleting is a
//! soft operation: rows are deactivated (rooms become unavailable) so that
//! historical sessions and attendance keep their references.

use crate::core::users::require_admin;
use crate::db::catalog::{self as q, NewCourse};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::rooms;
use crate::errors::{AppError, AppResult};
use crate::models::catalog::{College, Course, Department, normalize_code};
use crate::models::role::Level;
use crate::models::room::{Room, RoomType, VirtualPlatform};
use crate::models::user::Actor;
use rusqlite::Connection;

fn require_code(code: &str) -> AppResult<String> {
    let code = normalize_code(code);
    if code.is_empty() {
        return Err(AppError::Validation("code must not be empty".into()));
    }
    Ok(code)
}

fn require_text(label: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{label} must not be empty")));
    }
    Ok(())
}

pub fn college_by_code(conn: &Connection, code: &str) -> AppResult<College> {
    q::find_college(conn, &normalize_code(code))?
        .ok_or_else(|| AppError::NotFound(format!("college {code}")))
}

pub fn department_by_code(conn: &Connection, code: &str) -> AppResult<Department> {
    q::find_department(conn, &normalize_code(code))?
        .ok_or_else(|| AppError::NotFound(format!("department {code}")))
}

pub fn course_by_code(conn: &Connection, code: &str) -> AppResult<Course> {
    q::find_course(conn, &normalize_code(code))?
        .ok_or_else(|| AppError::NotFound(format!("course {code}")))
}

pub fn room_by_code(conn: &Connection, code: &str) -> AppResult<Room> {
    rooms::find_room(conn, &normalize_code(code))?
        .ok_or_else(|| AppError::NotFound(format!("room {code}")))
}

pub fn parse_level(s: &str) -> AppResult<Level> {
    Level::parse(s).ok_or_else(|| {
        AppError::InvalidValue(format!("level '{s}' (use 100, 200, 300, 400 or 500)"))
    })
}

/// Room fields accepted by `room add` / `room update`.
#[derive(Debug, Default, Clone)]
pub struct RoomInput {
    pub code: String,
    pub name: Option<String>,
    pub room_type: Option<String>,
    pub capacity: Option<u32>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub facilities: Option<String>,
    pub platform: Option<String>,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
}

fn parse_platform(p: &str) -> AppResult<VirtualPlatform> {
    VirtualPlatform::from_db_str(p)
        .ok_or_else(|| AppError::InvalidValue(format!("platform '{p}'")))
}

pub struct CatalogLogic;

impl CatalogLogic {
    // ---------------------------
    // Colleges
    // ---------------------------

    pub fn add_college(
        pool: &mut DbPool,
        actor: &Actor,
        code: &str,
        name: &str,
        description: &str,
    ) -> AppResult<i64> {
        require_admin(actor, "manage colleges")?;
        let code = require_code(code)?;
        require_text("name", name)?;

        if q::find_college(&pool.conn, &code)?.is_some() {
            return Err(AppError::Validation(format!("college code {code} already exists")));
        }

        let id = q::insert_college(&pool.conn, &code, name.trim(), description)?;
        audit(&pool.conn, "add", &format!("college:{code}"), name.trim())?;
        Ok(id)
    }

    pub fn update_college(
        pool: &mut DbPool,
        actor: &Actor,
        code: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<()> {
        require_admin(actor, "manage colleges")?;
        if let Some(n) = name {
            require_text("name", n)?;
        }
        let college = college_by_code(&pool.conn, code)?;
        q::update_college(&pool.conn, college.id, name.map(str::trim), description)?;
        audit(&pool.conn, "edit", &format!("college:{}", college.code), "College updated")?;
        Ok(())
    }

    pub fn delete_college(pool: &mut DbPool, actor: &Actor, code: &str) -> AppResult<()> {
        require_admin(actor, "manage colleges")?;
        let college = college_by_code(&pool.conn, code)?;
        q::deactivate_college(&pool.conn, college.id)?;
        audit(&pool.conn, "del", &format!("college:{}", college.code), "College deactivated")?;
        Ok(())
    }

    pub fn list_colleges(pool: &DbPool, include_inactive: bool) -> AppResult<Vec<College>> {
        q::list_colleges(&pool.conn, include_inactive)
    }

    // ---------------------------
    // Departments
    // ---------------------------

    pub fn add_department(
        pool: &mut DbPool,
        actor: &Actor,
        code: &str,
        name: &str,
        college: &str,
        description: &str,
    ) -> AppResult<i64> {
        require_admin(actor, "manage departments")?;
        let code = require_code(code)?;
        require_text("name", name)?;

        let college = college_by_code(&pool.conn, college)?;
        if !college.is_active {
            return Err(AppError::Validation(format!("college {} is inactive", college.code)));
        }
        if q::find_department(&pool.conn, &code)?.is_some() {
            return Err(AppError::Validation(format!("department code {code} already exists")));
        }

        let id = q::insert_department(&pool.conn, &code, name.trim(), college.id, description)?;
        audit(
            &pool.conn,
            "add",
            &format!("department:{code}"),
            &format!("{} ({})", name.trim(), college.code),
        )?;
        Ok(id)
    }

    pub fn update_department(
        pool: &mut DbPool,
        actor: &Actor,
        code: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<()> {
        require_admin(actor, "manage departments")?;
        if let Some(n) = name {
            require_text("name", n)?;
        }
        let dept = department_by_code(&pool.conn, code)?;
        q::update_department(&pool.conn, dept.id, name.map(str::trim), description)?;
        audit(&pool.conn, "edit", &format!("department:{}", dept.code), "Department updated")?;
        Ok(())
    }

    pub fn delete_department(pool: &mut DbPool, actor: &Actor, code: &str) -> AppResult<()> {
        require_admin(actor, "manage departments")?;
        let dept = department_by_code(&pool.conn, code)?;
        q::deactivate_department(&pool.conn, dept.id)?;
        audit(&pool.conn, "del", &format!("department:{}", dept.code), "Department deactivated")?;
        Ok(())
    }

    pub fn list_departments(
        pool: &DbPool,
        college: Option<&str>,
        include_inactive: bool,
    ) -> AppResult<Vec<Department>> {
        let college_id = match college {
            Some(c) => Some(college_by_code(&pool.conn, c)?.id),
            None => None,
        };
        q::list_departments(&pool.conn, college_id, include_inactive)
    }

    // ---------------------------
    // Courses
    // ---------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn add_course(
        pool: &mut DbPool,
        actor: &Actor,
        code: &str,
        title: &str,
        department: &str,
        level: &str,
        credit_units: i32,
        description: &str,
    ) -> AppResult<i64> {
        require_admin(actor, "manage courses")?;
        let code = require_code(code)?;
        require_text("title", title)?;
        let level = parse_level(level)?;

        if credit_units <= 0 {
            return Err(AppError::Validation("credit units must be positive".into()));
        }

        let dept = department_by_code(&pool.conn, department)?;
        if !dept.is_active {
            return Err(AppError::Validation(format!("department {} is inactive", dept.code)));
        }
        if q::find_course(&pool.conn, &code)?.is_some() {
            return Err(AppError::Validation(format!("course code {code} already exists")));
        }

        let id = q::insert_course(
            &pool.conn,
            &NewCourse {
                code: &code,
                title: title.trim(),
                description,
                department_id: dept.id,
                level,
                credit_units,
            },
        )?;
        audit(&pool.conn, "add", &format!("course:{code}"), title.trim())?;
        Ok(id)
    }

    pub fn update_course(
        pool: &mut DbPool,
        actor: &Actor,
        code: &str,
        title: Option<&str>,
        description: Option<&str>,
        credit_units: Option<i32>,
    ) -> AppResult<()> {
        require_admin(actor, "manage courses")?;
        if let Some(t) = title {
            require_text("title", t)?;
        }
        if matches!(credit_units, Some(c) if c <= 0) {
            return Err(AppError::Validation("credit units must be positive".into()));
        }
        let course = course_by_code(&pool.conn, code)?;
        q::update_course(&pool.conn, course.id, title.map(str::trim), description, credit_units)?;
        audit(&pool.conn, "edit", &format!("course:{}", course.code), "Course updated")?;
        Ok(())
    }

    pub fn delete_course(pool: &mut DbPool, actor: &Actor, code: &str) -> AppResult<()> {
        require_admin(actor, "manage courses")?;
        let course = course_by_code(&pool.conn, code)?;
        q::deactivate_course(&pool.conn, course.id)?;
        audit(&pool.conn, "del", &format!("course:{}", course.code), "Course deactivated")?;
        Ok(())
    }

    pub fn list_courses(
        pool: &DbPool,
        department: Option<&str>,
        level: Option<&str>,
        search: Option<&str>,
        include_inactive: bool,
    ) -> AppResult<Vec<Course>> {
        let department_id = match department {
            Some(d) => Some(department_by_code(&pool.conn, d)?.id),
            None => None,
        };
        let level = match level {
            Some(l) => Some(parse_level(l)?),
            None => None,
        };
        q::list_courses(&pool.conn, department_id, level, search, include_inactive)
    }

    // ---------------------------
    // Rooms
    // ---------------------------

    pub fn add_room(pool: &mut DbPool, actor: &Actor, input: &RoomInput) -> AppResult<i64> {
        require_admin(actor, "manage rooms")?;
        let code = require_code(&input.code)?;

        let name = input.name.as_deref().unwrap_or("").trim().to_string();
        require_text("name", &name)?;

        let type_code = input.room_type.as_deref().unwrap_or("physical");
        let room_type = RoomType::from_code(type_code)
            .ok_or_else(|| AppError::InvalidValue(format!("room type '{type_code}'")))?;

        let capacity = input
            .capacity
            .ok_or_else(|| AppError::Validation("capacity is required".into()))?;
        if capacity == 0 {
            return Err(AppError::Validation("capacity must be positive".into()));
        }

        let platform = match input.platform.as_deref() {
            Some(p) => Some(parse_platform(p)?),
            None => None,
        };
        if platform.is_some() && room_type == RoomType::Physical {
            return Err(AppError::Validation("only virtual rooms have a platform".into()));
        }

        if rooms::find_room(&pool.conn, &code)?.is_some() {
            return Err(AppError::Validation(format!("room code {code} already exists")));
        }

        let room = Room {
            id: 0,
            code: code.clone(),
            name,
            room_type,
            capacity,
            building: input.building.clone().unwrap_or_default(),
            floor: input.floor.clone().unwrap_or_default(),
            facilities: input.facilities.clone().unwrap_or_default(),
            platform,
            meeting_link: input.meeting_link.clone().unwrap_or_default(),
            is_available: true,
            notes: input.notes.clone().unwrap_or_default(),
        };

        let id = rooms::insert_room(&pool.conn, &room)?;
        audit(&pool.conn, "add", &format!("room:{code}"), &room.label())?;
        Ok(id)
    }

    /// Update the given fields; `available` re-opens or closes the room.
    pub fn update_room(
        pool: &mut DbPool,
        actor: &Actor,
        input: &RoomInput,
        available: Option<bool>,
    ) -> AppResult<()> {
        require_admin(actor, "manage rooms")?;
        let mut room = room_by_code(&pool.conn, &input.code)?;

        if let Some(n) = &input.name {
            require_text("name", n)?;
            room.name = n.trim().to_string();
        }
        if let Some(c) = input.capacity {
            if c == 0 {
                return Err(AppError::Validation("capacity must be positive".into()));
            }
            room.capacity = c;
        }
        if let Some(p) = &input.platform {
            if !room.is_virtual() {
                return Err(AppError::Validation("only virtual rooms have a platform".into()));
            }
            room.platform = Some(parse_platform(p)?);
        }
        if let Some(v) = &input.building {
            room.building = v.clone();
        }
        if let Some(v) = &input.floor {
            room.floor = v.clone();
        }
        if let Some(v) = &input.facilities {
            room.facilities = v.clone();
        }
        if let Some(v) = &input.meeting_link {
            room.meeting_link = v.clone();
        }
        if let Some(v) = &input.notes {
            room.notes = v.clone();
        }
        if let Some(a) = available {
            room.is_available = a;
        }

        rooms::update_room(&pool.conn, &room)?;
        audit(&pool.conn, "edit", &format!("room:{}", room.code), "Room updated")?;
        Ok(())
    }

    pub fn delete_room(pool: &mut DbPool, actor: &Actor, code: &str) -> AppResult<()> {
        require_admin(actor, "manage rooms")?;
        let mut room = room_by_code(&pool.conn, code)?;
        room.is_available = false;
        rooms::update_room(&pool.conn, &room)?;
        audit(&pool.conn, "del", &format!("room:{}", room.code), "Room marked unavailable")?;
        Ok(())
    }

    pub fn list_rooms(
        pool: &DbPool,
        room_type: Option<&str>,
        available_only: bool,
    ) -> AppResult<Vec<Room>> {
        let room_type = match room_type {
            Some(t) => Some(
                RoomType::from_code(t)
                    .ok_or_else(|| AppError::InvalidValue(format!("room type '{t}'")))?,
            ),
            None => None,
        };
        rooms::list_rooms(&pool.conn, room_type, available_only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;

    fn pool() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        init_db(&pool.conn).unwrap();
        pool
    }

    #[test]
    fn codes_are_uppercased_and_unique() {
        let mut pool = pool();
        let op = Actor::Operator;
        CatalogLogic::add_college(&mut pool, &op, " cos ", "College of Science", "").unwrap();
        assert_eq!(college_by_code(&pool.conn, "COS").unwrap().code, "COS");

        let err = CatalogLogic::add_college(&mut pool, &op, "Cos", "Again", "").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn soft_delete_hides_unless_all() {
        let mut pool = pool();
        let op = Actor::Operator;
        CatalogLogic::add_college(&mut pool, &op, "COS", "Science", "").unwrap();
        CatalogLogic::add_department(&mut pool, &op, "CSC", "Computer Science", "cos", "").unwrap();
        CatalogLogic::add_course(&mut pool, &op, "csc101", "Intro", "CSC", "100", 3, "").unwrap();
        CatalogLogic::add_course(&mut pool, &op, "CSC201", "Data Structures", "CSC", "200", 3, "")
            .unwrap();

        CatalogLogic::delete_course(&mut pool, &op, "CSC101").unwrap();

        let visible = CatalogLogic::list_courses(&pool, None, None, None, false).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].code, "CSC201");

        let all = CatalogLogic::list_courses(&pool, None, None, None, true).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn course_search_matches_code_or_title() {
        let mut pool = pool();
        let op = Actor::Operator;
        CatalogLogic::add_college(&mut pool, &op, "COS", "Science", "").unwrap();
        CatalogLogic::add_department(&mut pool, &op, "CSC", "Computer Science", "COS", "").unwrap();
        CatalogLogic::add_course(&mut pool, &op, "CSC101", "Intro to Computing", "CSC", "100", 3, "")
            .unwrap();
        CatalogLogic::add_course(&mut pool, &op, "CSC305", "Operating Systems", "CSC", "300", 3, "")
            .unwrap();

        let hits = CatalogLogic::list_courses(&pool, None, None, Some("operating"), false).unwrap();
        assert_eq!(hits.len(), 1);
        let by_level = CatalogLogic::list_courses(&pool, Some("csc"), Some("100"), None, false).unwrap();
        assert_eq!(by_level[0].code, "CSC101");
    }

    #[test]
    fn deleted_room_becomes_unavailable() {
        let mut pool = pool();
        let op = Actor::Operator;
        let input = RoomInput {
            code: "lt1".into(),
            name: Some("Lecture Theatre 1".into()),
            capacity: Some(200),
            ..Default::default()
        };
        CatalogLogic::add_room(&mut pool, &op, &input).unwrap();
        CatalogLogic::delete_room(&mut pool, &op, "LT1").unwrap();

        assert!(CatalogLogic::list_rooms(&pool, None, true).unwrap().is_empty());
        assert!(!room_by_code(&pool.conn, "LT1").unwrap().is_available);
    }

    #[test]
    fn physical_rooms_reject_platforms() {
        let mut pool = pool();
        let input = RoomInput {
            code: "R1".into(),
            name: Some("Room".into()),
            capacity: Some(10),
            platform: Some("zoom".into()),
            ..Default::default()
        };
        let err = CatalogLogic::add_room(&mut pool, &Actor::Operator, &input).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
