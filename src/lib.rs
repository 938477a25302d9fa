//! rattendance library root.
//! Exposes the CLI parser, the high-level run() function and the internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::commands;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => commands::log::handle(&cli.command, cfg),
        Commands::Backup { .. } => commands::backup::handle(&cli.command, cfg),
        Commands::Export { .. } => commands::export::handle(&cli.command, cfg),
        Commands::User { .. } => commands::user::handle(cli, cfg),
        Commands::College { .. }
        | Commands::Dept { .. }
        | Commands::Course { .. }
        | Commands::Room { .. } => commands::catalog::handle(cli, cfg),
        Commands::Assign { .. } => commands::assign::handle(cli, cfg),
        Commands::Enroll { .. } => commands::enroll::handle(cli, cfg),
        Commands::Session { .. } => commands::session::handle(cli, cfg),
        Commands::Attend { .. } => commands::attend::handle(cli, cfg),
        Commands::Face { .. } => commands::face::handle(cli, cfg),
        Commands::Notify { .. } => commands::notify::handle(cli, cfg),
        Commands::Report { .. } | Commands::Dashboard { .. } => commands::report::handle(cli, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // configuration is loaded once and handed down
    let mut cfg = Config::load()?;

    if let Some(custom_db) = &cli.db {
        cfg.database = Config::resolve_db_path(custom_db).to_string_lossy().to_string();
    }

    dispatch(&cli, &cfg)
}
