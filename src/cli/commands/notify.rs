use crate::cli::commands::open_as;
use crate::cli::parser::{Cli, Commands, NotifyCmd};
use crate::config::Config;
use crate::core::notify::NotifyLogic;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use crate::utils::colors::{CYAN, GREY, RESET};
use crate::utils::formatting::truncate;
use crate::utils::table::Table;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Notify { action } = &cli.command else {
        return Ok(());
    };

    match action {
        NotifyCmd::List { user, unread } => {
            let (pool, actor) = open_as(cli, cfg)?;
            let rows = NotifyLogic::list(&pool, &actor, user, *unread)?;
            if rows.is_empty() {
                info("No notifications.");
                return Ok(());
            }

            let mut t = Table::new(&["ID", "When", "Kind", "Title", "Message"]);
            for n in rows {
                let title = if n.is_read {
                    format!("{GREY}{}{RESET}", n.title)
                } else {
                    format!("{CYAN}{}{RESET}", n.title)
                };
                t.add_row(vec![
                    n.id.to_string(),
                    n.created_at,
                    n.kind.to_db_str().into(),
                    title,
                    truncate(&n.message, 60),
                ]);
            }
            print!("{}", t.render());
        }

        NotifyCmd::Read { user, id, all } => {
            let (mut pool, actor) = open_as(cli, cfg)?;
            if *all {
                let n = NotifyLogic::read_all(&mut pool, &actor, user)?;
                success(format!("{n} notification(s) marked as read"));
            } else {
                let id = id.ok_or_else(|| AppError::Validation("--id or --all is required".into()))?;
                NotifyLogic::read(&mut pool, &actor, user, id)?;
                success(format!("Notification {id} marked as read"));
            }
        }
    }

    Ok(())
}
