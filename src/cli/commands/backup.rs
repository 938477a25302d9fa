use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backup::BackupLogic;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Backup {
        file,
        compress,
        force,
    } = cmd
    {
        // validates the file and brings the schema up to date before copying
        drop(open_pool(cfg)?);
        BackupLogic::backup(&cfg.database, file, *compress, *force)?;
    }

    Ok(())
}
