//! Time utilities: parsing HH:MM and formatting durations.

use chrono::{Duration, NaiveTime};

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    let t = t.trim();
    NaiveTime::parse_from_str(t, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
        .ok()
}

/// "4m 30s", "1h 05m" style rendering of a window countdown.
pub fn format_remaining(d: Duration) -> String {
    let secs = d.num_seconds().max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_rendering() {
        assert_eq!(format_remaining(Duration::seconds(270)), "4m 30s");
        assert_eq!(format_remaining(Duration::seconds(3900)), "1h 05m");
        assert_eq!(format_remaining(Duration::seconds(-5)), "0s");
    }
}
