use crate::cli::commands::{open_as, open_pool};
use crate::cli::parser::{Cli, Commands, UserCmd};
use crate::config::Config;
use crate::core::users::{UserInput, UserLogic};
use crate::db::catalog::find_department_by_id;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::colors::{GREY, RESET};
use crate::utils::table::Table;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::User { action } = &cli.command else {
        return Ok(());
    };

    match action {
        UserCmd::Add {
            email,
            name,
            role,
            student_id,
            lecturer_id,
            dept,
            level,
        } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            let input = UserInput {
                email: email.clone(),
                full_name: name.clone(),
                role: role.clone(),
                student_id: student_id.clone(),
                lecturer_id: lecturer_id.clone(),
                department: dept.clone(),
                level: level.clone(),
            };
            let id = UserLogic::add(&mut pool, &actor, &input)?;
            success(format!("User {email} added (id {id})"));
        }

        UserCmd::List { role, dept, all } => {
            let pool = open_pool(cfg)?;
            let users = UserLogic::list(&pool, role.as_deref(), dept.as_deref(), *all)?;
            if users.is_empty() {
                info("No users found.");
                return Ok(());
            }

            let mut t = Table::new(&["ID", "Email", "Name", "Role", "Number", "Dept", "Level", "Active"]);
            for u in &users {
                let dept = match u.department_id {
                    Some(id) => find_department_by_id(&pool.conn, id)?
                        .map(|d| d.code)
                        .unwrap_or_default(),
                    None => String::new(),
                };
                let active = if u.is_active {
                    "yes".to_string()
                } else {
                    format!("{GREY}no{RESET}")
                };
                t.add_row(vec![
                    u.id.to_string(),
                    u.email.clone(),
                    u.full_name.clone(),
                    u.role.to_db_str().to_string(),
                    u.display_id().to_string(),
                    dept,
                    u.level.map(|l| l.to_db_str()).unwrap_or_default(),
                    active,
                ]);
            }
            print!("{}", t.render());
        }

        UserCmd::Deactivate { email } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            UserLogic::deactivate(&mut pool, &actor, email)?;
            success(format!("User {email} deactivated"));
        }
    }

    Ok(())
}
