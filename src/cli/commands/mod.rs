pub mod assign;
pub mod attend;
pub mod backup;
pub mod catalog;
pub mod config;
pub mod db;
pub mod enroll;
pub mod export;
pub mod face;
pub mod init;
pub mod log;
pub mod notify;
pub mod report;
pub mod session;
pub mod user;

use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::users::resolve_actor;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::user::Actor;
use crate::utils::date::resolve_now;
use chrono::NaiveDateTime;
use std::path::Path;

/// Open the configured database, bringing its schema up to date.
pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    if !Path::new(&cfg.database).exists() {
        return Err(AppError::NotFound(format!(
            "database {} (run `rattendance init` first)",
            cfg.database
        )));
    }
    let pool = DbPool::new(&cfg.database)?;
    run_pending_migrations(&pool.conn)?;
    Ok(pool)
}

/// Pool plus the actor named by `--by`.
pub(crate) fn open_as(cli: &Cli, cfg: &Config) -> AppResult<(DbPool, Actor)> {
    let pool = open_pool(cfg)?;
    let actor = resolve_actor(&pool.conn, cli.by.as_deref())?;
    Ok((pool, actor))
}

/// Instant a recording command acts at. A caller-supplied `--at` is only
/// honoured for admins or in test mode.
pub(crate) fn acting_now(cli: &Cli, actor: &Actor, at: Option<&str>) -> AppResult<NaiveDateTime> {
    if at.is_some() && !cli.test && !actor.is_admin() {
        return Err(AppError::PermissionDenied(format!(
            "{} may not override the clock with --at",
            actor.label()
        )));
    }
    resolve_now(at)
}
