//! `college`, `dept`, `course` and `room` subcommands.

use crate::cli::commands::{open_as, open_pool};
use crate::cli::parser::{Cli, CollegeCmd, Commands, CourseCmd, DeptCmd, RoomArgs, RoomCmd};
use crate::config::Config;
use crate::core::catalog::{CatalogLogic, RoomInput};
use crate::db::catalog::find_department_by_id;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::formatting::{truncate, yes_no};
use crate::utils::table::Table;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::College { action } => college(cli, cfg, action),
        Commands::Dept { action } => dept(cli, cfg, action),
        Commands::Course { action } => course(cli, cfg, action),
        Commands::Room { action } => room(cli, cfg, action),
        _ => Ok(()),
    }
}

fn college(cli: &Cli, cfg: &Config, action: &CollegeCmd) -> AppResult<()> {
    match action {
        CollegeCmd::Add {
            code,
            name,
            description,
        } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            CatalogLogic::add_college(&mut pool, &actor, code, name, description)?;
            success(format!("College {} added", code.to_uppercase()));
        }
        CollegeCmd::Edit {
            code,
            name,
            description,
        } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            CatalogLogic::update_college(&mut pool, &actor, code, name.as_deref(), description.as_deref())?;
            success(format!("College {} updated", code.to_uppercase()));
        }
        CollegeCmd::Del { code } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            CatalogLogic::delete_college(&mut pool, &actor, code)?;
            success(format!("College {} deactivated", code.to_uppercase()));
        }
        CollegeCmd::List { all } => {
            let pool = open_pool(cfg)?;
            let rows = CatalogLogic::list_colleges(&pool, *all)?;
            if rows.is_empty() {
                info("No colleges found.");
                return Ok(());
            }
            let mut t = Table::new(&["Code", "Name", "Description", "Active"]);
            for c in rows {
                t.add_row(vec![
                    c.code,
                    c.name,
                    truncate(&c.description, 40),
                    yes_no(c.is_active).into(),
                ]);
            }
            print!("{}", t.render());
        }
    }
    Ok(())
}

fn dept(cli: &Cli, cfg: &Config, action: &DeptCmd) -> AppResult<()> {
    match action {
        DeptCmd::Add {
            code,
            name,
            college,
            description,
        } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            CatalogLogic::add_department(&mut pool, &actor, code, name, college, description)?;
            success(format!("Department {} added", code.to_uppercase()));
        }
        DeptCmd::Edit {
            code,
            name,
            description,
        } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            CatalogLogic::update_department(&mut pool, &actor, code, name.as_deref(), description.as_deref())?;
            success(format!("Department {} updated", code.to_uppercase()));
        }
        DeptCmd::Del { code } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            CatalogLogic::delete_department(&mut pool, &actor, code)?;
            success(format!("Department {} deactivated", code.to_uppercase()));
        }
        DeptCmd::List { college, all } => {
            let pool = open_pool(cfg)?;
            let rows = CatalogLogic::list_departments(&pool, college.as_deref(), *all)?;
            if rows.is_empty() {
                info("No departments found.");
                return Ok(());
            }
            let mut t = Table::new(&["Code", "Name", "Description", "Active"]);
            for d in rows {
                t.add_row(vec![
                    d.code,
                    d.name,
                    truncate(&d.description, 40),
                    yes_no(d.is_active).into(),
                ]);
            }
            print!("{}", t.render());
        }
    }
    Ok(())
}

fn course(cli: &Cli, cfg: &Config, action: &CourseCmd) -> AppResult<()> {
    match action {
        CourseCmd::Add {
            code,
            title,
            dept,
            level,
            credits,
            description,
        } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            CatalogLogic::add_course(&mut pool, &actor, code, title, dept, level, *credits, description)?;
            success(format!("Course {} added", code.to_uppercase()));
        }
        CourseCmd::Edit {
            code,
            title,
            description,
            credits,
        } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            CatalogLogic::update_course(
                &mut pool,
                &actor,
                code,
                title.as_deref(),
                description.as_deref(),
                *credits,
            )?;
            success(format!("Course {} updated", code.to_uppercase()));
        }
        CourseCmd::Del { code } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            CatalogLogic::delete_course(&mut pool, &actor, code)?;
            success(format!("Course {} deactivated", code.to_uppercase()));
        }
        CourseCmd::List {
            dept,
            level,
            search,
            all,
        } => {
            let pool = open_pool(cfg)?;
            let rows = CatalogLogic::list_courses(&pool, dept.as_deref(), level.as_deref(), search.as_deref(), *all)?;
            if rows.is_empty() {
                info("No courses found.");
                return Ok(());
            }
            let mut t = Table::new(&["Code", "Title", "Dept", "Level", "Units", "Active"]);
            for c in rows {
                let dept = find_department_by_id(&pool.conn, c.department_id)?
                    .map(|d| d.code)
                    .unwrap_or_default();
                t.add_row(vec![
                    c.code,
                    truncate(&c.title, 40),
                    dept,
                    c.level.to_db_str(),
                    c.credit_units.to_string(),
                    yes_no(c.is_active).into(),
                ]);
            }
            print!("{}", t.render());
        }
    }
    Ok(())
}

fn room_input(r: &RoomArgs) -> RoomInput {
    RoomInput {
        code: r.code.clone(),
        name: r.name.clone(),
        room_type: r.room_type.clone(),
        capacity: r.capacity,
        building: r.building.clone(),
        floor: r.floor.clone(),
        facilities: r.facilities.clone(),
        platform: r.platform.clone(),
        meeting_link: r.link.clone(),
        notes: r.notes.clone(),
    }
}

fn room(cli: &Cli, cfg: &Config, action: &RoomCmd) -> AppResult<()> {
    match action {
        RoomCmd::Add(args) => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            CatalogLogic::add_room(&mut pool, &actor, &room_input(args))?;
            success(format!("Room {} added", args.code.to_uppercase()));
        }
        RoomCmd::Edit { room, available } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            CatalogLogic::update_room(&mut pool, &actor, &room_input(room), *available)?;
            success(format!("Room {} updated", room.code.to_uppercase()));
        }
        RoomCmd::Del { code } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            CatalogLogic::delete_room(&mut pool, &actor, code)?;
            success(format!("Room {} marked unavailable", code.to_uppercase()));
        }
        RoomCmd::List {
            room_type,
            available,
        } => {
            let pool = open_pool(cfg)?;
            let rows = CatalogLogic::list_rooms(&pool, room_type.as_deref(), *available)?;
            if rows.is_empty() {
                info("No rooms found.");
                return Ok(());
            }
            let mut t = Table::new(&["Code", "Name", "Type", "Capacity", "Where", "Available"]);
            for r in rows {
                let place = if r.is_virtual() {
                    r.platform
                        .map(|p| p.to_db_str().to_string())
                        .unwrap_or_default()
                } else {
                    [r.building.as_str(), r.floor.as_str()]
                        .iter()
                        .filter(|s| !s.is_empty())
                        .copied()
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                t.add_row(vec![
                    r.code,
                    r.name,
                    r.room_type.to_db_str().into(),
                    r.capacity.to_string(),
                    place,
                    yes_no(r.is_available).into(),
                ]);
            }
            print!("{}", t.render());
        }
    }
    Ok(())
}
