use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::export::{ExportFilter, ExportLogic};
use crate::errors::AppResult;
use crate::ui::messages::info;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        range,
        course,
        student,
        status,
        force,
    } = cmd
    {
        let pool = open_pool(cfg)?;
        let filter = ExportFilter {
            range: range.clone(),
            course: course.clone(),
            student: student.clone(),
            status: status.clone(),
        };
        let n = ExportLogic::export(&pool, *format, file, &filter, *force)?;
        if n > 0 {
            info(format!("{n} attendance record(s) written as {}", format.as_str()));
        }
    }
    Ok(())
}
