//! Filing-deadline urgency.

use chrono::{DateTime, NaiveDate, Utc};

const URGENT_HOURS: i64 = 48;
const SOON_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineState {
    Passed,
    /// 48 hours or less remain. Hours are rounded up.
    Urgent { hours_left: i64 },
    /// Days are rounded up; `soon` is set when a week or less remains.
    Upcoming { days_left: i64, soon: bool },
}

/// Classify a deadline date (taken as midnight UTC) relative to `now`.
pub fn deadline_state(deadline: NaiveDate, now: DateTime<Utc>) -> DeadlineState {
    let due = deadline.and_time(chrono::NaiveTime::MIN).and_utc();
    let remaining = due - now;
    let ms = remaining.num_milliseconds();
    if ms < 0 {
        return DeadlineState::Passed;
    }

    let hours_left = ceil_div(ms, 3_600_000);
    if hours_left <= URGENT_HOURS {
        return DeadlineState::Urgent { hours_left };
    }
    let days_left = ceil_div(ms, 86_400_000);
    DeadlineState::Upcoming {
        days_left,
        soon: days_left <= SOON_DAYS,
    }
}

fn ceil_div(n: i64, d: i64) -> i64 {
    (n + d - 1) / d
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn past_deadline() {
        let now = Utc.with_ymd_and_hms(2024, 2, 16, 0, 0, 1).unwrap();
        assert_eq!(deadline_state(date(2024, 2, 16), now), DeadlineState::Passed);
    }

    #[test]
    fn exactly_at_deadline_is_urgent_not_passed() {
        let now = Utc.with_ymd_and_hms(2024, 2, 16, 0, 0, 0).unwrap();
        assert_eq!(
            deadline_state(date(2024, 2, 16), now),
            DeadlineState::Urgent { hours_left: 0 }
        );
    }

    #[test]
    fn within_two_days_is_urgent() {
        let now = Utc.with_ymd_and_hms(2024, 2, 14, 12, 30, 0).unwrap();
        assert_eq!(
            deadline_state(date(2024, 2, 16), now),
            DeadlineState::Urgent { hours_left: 36 }
        );
    }

    #[test]
    fn within_a_week_is_soon() {
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 6, 0, 0).unwrap();
        assert_eq!(
            deadline_state(date(2024, 2, 16), now),
            DeadlineState::Upcoming {
                days_left: 6,
                soon: true
            }
        );
    }

    #[test]
    fn far_deadline_is_not_soon() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            deadline_state(date(2024, 2, 1), now),
            DeadlineState::Upcoming {
                days_left: 31,
                soon: false
            }
        );
    }
}
