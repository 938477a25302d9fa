use crate::cli::commands::open_as;
use crate::cli::parser::{Cli, Commands, FaceCmd};
use crate::config::Config;
use crate::core::face::FaceLogic;
use crate::errors::AppResult;
use crate::models::face::VerificationStatus;
use crate::ui::messages::{info, success};
use crate::utils::colors::{GREEN, RED, YELLOW, paint};
use crate::utils::formatting::truncate;
use crate::utils::path::expand_tilde;
use crate::utils::table::Table;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Face { action } = &cli.command else {
        return Ok(());
    };

    let (mut pool, actor) = open_as(cli, cfg)?;
    match action {
        FaceCmd::Register { user, image } => {
            let stored = FaceLogic::register(&mut pool, &actor, cfg, user, &expand_tilde(image))?;
            success(format!("Face registered for {user}: {}", stored.display()));
        }
        FaceCmd::Remove { user } => {
            FaceLogic::remove(&mut pool, &actor, user)?;
            success(format!("Face registration removed for {user}"));
        }
        FaceCmd::Log { user, last } => {
            let attempts = FaceLogic::attempts(&pool, &actor, user, *last)?;
            if attempts.is_empty() {
                info(format!("No face verification attempts for {user}."));
                return Ok(());
            }

            let mut t = Table::new(&["When", "Session", "Status", "Image", "Message"]);
            for a in attempts {
                let color = match a.status {
                    VerificationStatus::Success => GREEN,
                    VerificationStatus::Failed => RED,
                    VerificationStatus::PoorQuality => YELLOW,
                };
                t.add_row(vec![
                    a.attempted_at.clone(),
                    a.session_id.map(|id| id.to_string()).unwrap_or_default(),
                    paint(color, a.status.to_db_str()),
                    truncate(&a.image_path, 40),
                    a.message.clone(),
                ]);
            }
            print!("{}", t.render());
        }
    }

    Ok(())
}
