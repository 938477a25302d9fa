use crate::errors::{AppError, AppResult};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parse the `--at` override: "YYYY-MM-DD HH:MM" (seconds optional).
pub fn parse_datetime(s: &str) -> AppResult<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|_| AppError::InvalidDate(s.to_string()))
}

/// Resolve an optional `--at` value, falling back to the local clock.
pub fn resolve_now(at: Option<&str>) -> AppResult<NaiveDateTime> {
    match at {
        Some(s) => parse_datetime(s),
        None => Ok(now()),
    }
}

/// First day of the month `months` after the month of `d`.
pub fn shift_months(d: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total = d.year() * 12 + d.month0() as i32 + months as i32;
    NaiveDate::from_ymd_opt(total.div_euclid(12), total.rem_euclid(12) as u32 + 1, 1)
}

fn last_day_of_month(y: i32, m: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(y, m, 1)?;
    shift_months(first, 1)?.pred_opt()
}

fn bounds(part: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let bad = || AppError::InvalidDate(part.to_string());

    match part.len() {
        // YYYY
        4 => {
            let y: i32 = part.parse().map_err(|_| bad())?;
            let first = NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(bad)?;
            let last = NaiveDate::from_ymd_opt(y, 12, 31).ok_or_else(bad)?;
            Ok((first, last))
        }
        // YYYY-MM
        7 => {
            let (y, m) = part.split_once('-').ok_or_else(bad)?;
            let y: i32 = y.parse().map_err(|_| bad())?;
            let m: u32 = m.parse().map_err(|_| bad())?;
            let first = NaiveDate::from_ymd_opt(y, m, 1).ok_or_else(bad)?;
            let last = last_day_of_month(y, m).ok_or_else(bad)?;
            Ok((first, last))
        }
        // YYYY-MM-DD
        10 => {
            let d = parse_date(part).ok_or_else(bad)?;
            Ok((d, d))
        }
        _ => Err(bad()),
    }
}

/// Parse a `--range` value into inclusive bounds.
///
/// Accepted: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, or two values of the same
/// shape joined by `:`.
pub fn parse_range(r: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let r = r.trim();

    let Some((start, end)) = r.split_once(':') else {
        return bounds(r);
    };

    let (start, end) = (start.trim(), end.trim());
    if start.len() != end.len() {
        return Err(AppError::InvalidDate(format!(
            "{r} (start and end must have the same format)"
        )));
    }

    let (from, _) = bounds(start)?;
    let (_, to) = bounds(end)?;
    if to < from {
        return Err(AppError::InvalidDate(format!("{r} (end precedes start)")));
    }
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn range_shapes() {
        assert_eq!(parse_range("2025").unwrap(), (d("2025-01-01"), d("2025-12-31")));
        assert_eq!(parse_range("2024-02").unwrap(), (d("2024-02-01"), d("2024-02-29")));
        assert_eq!(
            parse_range("2025-03-01:2025-03-15").unwrap(),
            (d("2025-03-01"), d("2025-03-15"))
        );
        assert_eq!(parse_range("2025-01:2025-02").unwrap(), (d("2025-01-01"), d("2025-02-28")));
    }

    #[test]
    fn range_rejects_mixed_and_reversed() {
        assert!(parse_range("2025:2025-03").is_err());
        assert!(parse_range("2025-03-10:2025-03-01").is_err());
        assert!(parse_range("25-3").is_err());
    }

    #[test]
    fn at_override_formats() {
        let a = parse_datetime("2025-03-03 10:02").unwrap();
        let b = parse_datetime("2025-03-03 10:02:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_datetime("03/03/2025").is_err());
    }

    #[test]
    fn month_shift_wraps_years() {
        assert_eq!(shift_months(d("2025-11-30"), 3), Some(d("2026-02-01")));
    }
}
