use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::log::LogLogic;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Log { print, op, last } = cmd
        && (*print || op.is_some() || last.is_some())
    {
        let pool = open_pool(cfg)?;
        LogLogic::print_log(&pool, op.as_deref(), *last)?;
    }

    Ok(())
}
