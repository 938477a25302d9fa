//! Attendance window evaluation.
//!
//! A session's window spans `[start - before, start + after]` on its
//! scheduled date, both bounds inclusive. The evaluator is pure: callers
//! pass the current instant and get back the state, so it is recomputed on
//! every request and never stored.

use crate::errors::{AppError, AppResult};
use crate::models::class_session::ClassSession;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Minutes applied on either side of the start time when a session has no offset.
pub const DEFAULT_WINDOW_MINUTES: i64 = 5;

/// Largest offset accepted when scheduling: one day on either side.
pub const MAX_WINDOW_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Not open yet.
    Pending { opens_in: Duration },
    /// Open; `remaining` reaches zero exactly at the closing instant.
    Open { remaining: Duration },
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceWindow {
    starts_at: NaiveDateTime,
    opens_at: NaiveDateTime,
    closes_at: NaiveDateTime,
}

impl AttendanceWindow {
    pub fn new(
        date: NaiveDate,
        start: NaiveTime,
        before: Option<i64>,
        after: Option<i64>,
    ) -> AppResult<Self> {
        let before = before.unwrap_or(DEFAULT_WINDOW_MINUTES);
        let after = after.unwrap_or(DEFAULT_WINDOW_MINUTES);

        let starts_at = date.and_time(start);
        let out_of_range =
            |m: i64| AppError::InvalidWindow(format!("offset of {m} minutes is out of range"));
        let opens_at = Duration::try_minutes(before)
            .and_then(|d| starts_at.checked_sub_signed(d))
            .ok_or_else(|| out_of_range(before))?;
        let closes_at = Duration::try_minutes(after)
            .and_then(|d| starts_at.checked_add_signed(d))
            .ok_or_else(|| out_of_range(after))?;

        if closes_at < opens_at {
            return Err(AppError::InvalidWindow(format!(
                "window closes at {} before it opens at {}",
                closes_at.format("%Y-%m-%d %H:%M"),
                opens_at.format("%Y-%m-%d %H:%M")
            )));
        }

        Ok(Self {
            starts_at,
            opens_at,
            closes_at,
        })
    }

    pub fn for_session(session: &ClassSession) -> AppResult<Self> {
        Self::new(
            session.scheduled_date,
            session.start_time,
            session.window_before,
            session.window_after,
        )
    }

    pub fn evaluate(&self, now: NaiveDateTime) -> WindowState {
        if now < self.opens_at {
            WindowState::Pending {
                opens_in: self.opens_at - now,
            }
        } else if now <= self.closes_at {
            WindowState::Open {
                remaining: self.closes_at - now,
            }
        } else {
            WindowState::Closed
        }
    }

    pub fn is_open(&self, now: NaiveDateTime) -> bool {
        matches!(self.evaluate(now), WindowState::Open { .. })
    }

    /// Time left to mark. `None` while pending, zero once closed.
    pub fn remaining(&self, now: NaiveDateTime) -> Option<Duration> {
        match self.evaluate(now) {
            WindowState::Pending { .. } => None,
            WindowState::Open { remaining } => Some(remaining),
            WindowState::Closed => Some(Duration::zero()),
        }
    }

    pub fn contains(&self, now: NaiveDateTime) -> bool {
        self.opens_at <= now && now <= self.closes_at
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.starts_at
    }

    pub fn opens_at(&self) -> NaiveDateTime {
        self.opens_at
    }

    pub fn closes_at(&self) -> NaiveDateTime {
        self.closes_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn default_window() -> AttendanceWindow {
        AttendanceWindow::new(
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn default_window_is_open_on_every_minute_of_its_span() {
        let w = default_window();
        for minute in 55..60 {
            assert!(w.is_open(at(9, minute, 0)), "09:{minute} should be open");
        }
        for minute in 0..=5 {
            assert!(w.is_open(at(10, minute, 0)), "10:0{minute} should be open");
        }
    }

    #[test]
    fn closed_one_second_outside_either_bound() {
        let w = default_window();
        assert!(!w.is_open(at(9, 54, 59)));
        assert!(!w.is_open(at(10, 5, 1)));
        assert!(matches!(w.evaluate(at(9, 54, 59)), WindowState::Pending { .. }));
        assert_eq!(w.evaluate(at(10, 5, 1)), WindowState::Closed);
    }

    #[test]
    fn remaining_decreases_and_hits_zero_at_close() {
        let w = default_window();
        let mut last = w.remaining(at(9, 55, 0)).unwrap();
        assert_eq!(last, Duration::minutes(10));

        for (h, m) in [(9, 58), (10, 0), (10, 3), (10, 5)] {
            let r = w.remaining(at(h, m, 0)).unwrap();
            assert!(r < last);
            last = r;
        }
        assert_eq!(last, Duration::zero());
        assert_eq!(w.remaining(at(11, 0, 0)), Some(Duration::zero()));
    }

    #[test]
    fn remaining_is_undefined_before_opening() {
        let w = default_window();
        assert_eq!(w.remaining(at(9, 0, 0)), None);
        assert_eq!(
            w.evaluate(at(9, 50, 0)),
            WindowState::Pending {
                opens_in: Duration::minutes(5)
            }
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = AttendanceWindow::new(
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            Some(-10),
            Some(5),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidWindow(_)));
    }

    #[test]
    fn huge_offsets_are_rejected_not_overflowed() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let start = NaiveTime::from_hms_opt(10, 0, 0).unwrap();

        for (before, after) in [(i64::MAX / 60_000 + 1, 5), (5, i64::MAX), (i64::MIN, 5)] {
            let err = AttendanceWindow::new(date, start, Some(before), Some(after)).unwrap_err();
            assert!(matches!(err, AppError::InvalidWindow(_)), "{before}/{after}");
        }
    }

    #[test]
    fn zero_width_window_opens_only_at_start() {
        let w = AttendanceWindow::new(
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            Some(0),
            Some(0),
        )
        .unwrap();
        assert!(w.is_open(at(10, 0, 0)));
        assert_eq!(w.remaining(at(10, 0, 0)), Some(Duration::zero()));
        assert!(!w.contains(at(10, 0, 1)));
        assert!(!w.contains(at(9, 59, 59)));
    }

    #[test]
    fn custom_offsets_widen_the_window() {
        let w = AttendanceWindow::new(
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            Some(15),
            Some(30),
        )
        .unwrap();
        assert!(w.is_open(at(9, 45, 0)));
        assert!(w.is_open(at(10, 30, 0)));
        assert!(!w.is_open(at(10, 30, 1)));
    }
}
