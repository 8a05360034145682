//! # market::session
//!
//! Regular trading session: weekdays 09:30 – 16:00, server wall-clock time.
//! No holiday calendar.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::Serialize;

const OPEN_MINUTE: i64 = 9 * 60 + 30;
const CLOSE_MINUTE: i64 = 16 * 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub is_open: bool,
    pub next_open: NaiveDateTime,
    pub next_close: NaiveDateTime,
}

pub fn status(now: NaiveDateTime) -> SessionStatus {
    SessionStatus {
        is_open:    is_open(now),
        next_open:  next_open(now),
        next_close: next_close(now),
    }
}

pub fn is_open(now: NaiveDateTime) -> bool {
    let minute = minute_of_day(now);
    is_trading_day(now.date()) && (OPEN_MINUTE..CLOSE_MINUTE).contains(&minute)
}

/// The first session open strictly after `now`.
pub fn next_open(now: NaiveDateTime) -> NaiveDateTime {
    let mut day = now.date();
    if !(is_trading_day(day) && minute_of_day(now) < OPEN_MINUTE) {
        day = next_trading_day(day);
    }
    at_minute(day, OPEN_MINUTE)
}

/// Today's close while the session is open, otherwise the close of the next
/// session.
pub fn next_close(now: NaiveDateTime) -> NaiveDateTime {
    if is_open(now) {
        at_minute(now.date(), CLOSE_MINUTE)
    } else {
        at_minute(next_open(now).date(), CLOSE_MINUTE)
    }
}

fn is_trading_day(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

fn next_trading_day(day: NaiveDate) -> NaiveDate {
    let mut next = day + Duration::days(1);
    while !is_trading_day(next) {
        next = next + Duration::days(1);
    }
    next
}

fn minute_of_day(t: NaiveDateTime) -> i64 {
    (t.hour() * 60 + t.minute()) as i64
}

fn at_minute(day: NaiveDate, minute: i64) -> NaiveDateTime {
    day.and_time(NaiveTime::default()) + Duration::minutes(minute)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    // 2024-01-03 is a Wednesday, 2024-01-05 a Friday, 2024-01-06 a Saturday.

    #[test]
    fn test_open_during_weekday_session() {
        assert!(is_open(at(2024, 1, 3, 10, 0)));
        assert!(is_open(at(2024, 1, 3, 9, 30)));
        assert!(!is_open(at(2024, 1, 3, 9, 29)));
        assert!(!is_open(at(2024, 1, 3, 16, 0)));
    }

    #[test]
    fn test_closed_on_weekend() {
        assert!(!is_open(at(2024, 1, 6, 11, 0)));
    }

    #[test]
    fn test_next_open_same_day_before_bell() {
        assert_eq!(next_open(at(2024, 1, 3, 8, 0)), at(2024, 1, 3, 9, 30));
    }

    #[test]
    fn test_next_open_skips_weekend() {
        assert_eq!(next_open(at(2024, 1, 5, 17, 0)), at(2024, 1, 8, 9, 30));
        assert_eq!(next_open(at(2024, 1, 6, 12, 0)), at(2024, 1, 8, 9, 30));
    }

    #[test]
    fn test_next_close() {
        assert_eq!(next_close(at(2024, 1, 3, 11, 0)), at(2024, 1, 3, 16, 0));
        assert_eq!(next_close(at(2024, 1, 5, 18, 0)), at(2024, 1, 8, 16, 0));
    }
}
