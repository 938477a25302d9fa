pub mod assignments;
pub mod attendance;
pub mod catalog;
pub mod enrollments;
pub mod faces;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod notifications;
pub mod pool;
pub mod rooms;
pub mod sessions;
pub mod stats;
pub mod users;

use crate::errors::AppError;
use chrono::{NaiveDate, NaiveTime};

pub(crate) const DATE_FMT: &str = "%Y-%m-%d";
pub(crate) const TIME_FMT: &str = "%H:%M";

/// Wrap a domain parse error into the rusqlite error expected by row mappers.
pub(crate) fn conversion_error(err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

pub(crate) fn parse_db_date(s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FMT)
        .map_err(|_| conversion_error(AppError::InvalidDate(s.to_string())))
}

pub(crate) fn parse_db_time(s: &str) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FMT)
        .map_err(|_| conversion_error(AppError::InvalidTime(s.to_string())))
}

/// Empty strings are stored for optional text fields; read them back as None.
pub(crate) fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}
