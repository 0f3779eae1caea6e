//! Fixed weekly schedule with pure next-fire-time computation.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, Utc, Weekday};

use gamedex_common::config::AppConfig;

/// A fixed day-of-week/hour/minute recurrence, evaluated in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySchedule {
    pub weekday: Weekday,
    pub hour: u32,
    pub minute: u32,
}

impl WeeklySchedule {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            weekday: config.newsletter_weekday,
            hour: config.newsletter_hour,
            minute: config.newsletter_minute,
        }
    }

    /// The first instant strictly after `now` that matches this schedule.
    ///
    /// Pure so the boundary cases (same-day before/after the fire time,
    /// exact hits) are unit-testable without a clock.
    pub fn next_fire_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let days_ahead = i64::from(
            (self.weekday.num_days_from_monday() + 7 - now.weekday().num_days_from_monday()) % 7,
        );

        let fire_time =
            NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN);
        let candidate_day = now.date_naive() + Duration::days(days_ahead);
        let candidate = NaiveDateTime::new(candidate_day, fire_time).and_utc();

        if candidate > now {
            candidate
        } else {
            candidate + Duration::days(7)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn monday_0830() -> WeeklySchedule {
        WeeklySchedule {
            weekday: Weekday::Mon,
            hour: 8,
            minute: 30,
        }
    }

    #[test]
    fn test_fires_later_the_same_day() {
        // 2026-08-03 is a Monday.
        let now = Utc.with_ymd_and_hms(2026, 8, 3, 6, 0, 0).unwrap();
        let next = monday_0830().next_fire_after(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 8, 3, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_already_past_today_waits_a_week() {
        let now = Utc.with_ymd_and_hms(2026, 8, 3, 9, 0, 0).unwrap();
        let next = monday_0830().next_fire_after(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 8, 10, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_exact_fire_instant_schedules_next_week() {
        let now = Utc.with_ymd_and_hms(2026, 8, 3, 8, 30, 0).unwrap();
        let next = monday_0830().next_fire_after(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 8, 10, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_wraps_across_the_week() {
        // 2026-08-05 is a Wednesday; next Monday is 2026-08-10.
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap();
        let next = monday_0830().next_fire_after(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 8, 10, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_other_weekday() {
        let schedule = WeeklySchedule {
            weekday: Weekday::Fri,
            hour: 17,
            minute: 0,
        };
        // From a Monday, next Friday is four days out.
        let now = Utc.with_ymd_and_hms(2026, 8, 3, 0, 0, 0).unwrap();
        let next = schedule.next_fire_after(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 8, 7, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_wraps_across_month_boundary() {
        // 2026-08-31 is a Monday; after the fire time the next one is in September.
        let now = Utc.with_ymd_and_hms(2026, 8, 31, 10, 0, 0).unwrap();
        let next = monday_0830().next_fire_after(now);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 9, 7, 8, 30, 0).unwrap());
    }
}
