use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Excel serial and number format for date, datetime or time strings.
pub(crate) fn parse_to_excel_date(s: &str) -> Option<(&'static str, f64)> {
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(("yyyy-mm-dd hh:mm:ss", excel_serial(&dt)?));
        }
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(("yyyy-mm-dd", excel_serial(&d.and_hms_opt(0, 0, 0)?)?));
    }

    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M") {
        return Some(("hh:mm", t.num_seconds_from_midnight() as f64 / 86400.0));
    }

    None
}

fn excel_serial(dt: &NaiveDateTime) -> Option<f64> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let secs = (*dt - epoch).num_seconds() as f64;
    Some(secs / 86400.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serials() {
        assert_eq!(parse_to_excel_date("1900-01-01"), Some(("yyyy-mm-dd", 2.0)));
        assert_eq!(parse_to_excel_date("10:30"), Some(("hh:mm", 0.4375)));
        let (fmt, v) = parse_to_excel_date("1900-01-01 12:00:00").unwrap();
        assert_eq!(fmt, "yyyy-mm-dd hh:mm:ss");
        assert_eq!(v, 2.5);
        assert_eq!(parse_to_excel_date("CSC201"), None);
    }
}
