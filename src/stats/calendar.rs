//! Local-calendar boundaries. Weeks start on Monday everywhere in the crate.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone};

/// Midnight of `date` in `tz`. A midnight skipped by a DST jump resolves to the
/// first instant after the gap; a repeated one to its earlier occurrence.
pub fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(first, second) => {
            if first <= second {
                first
            } else {
                second
            }
        }
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    local_midnight(&now.timezone(), now.date_naive())
}

/// End of the calendar day containing `now` (exclusive). 23 or 25 hours after
/// `start_of_day` on DST transition days.
pub fn start_of_next_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    local_midnight(&now.timezone(), now.date_naive() + Duration::days(1))
}

pub fn week_start_date<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    let today = now.date_naive();
    today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
}

/// Monday 00:00 local time of the week containing `now`.
pub fn start_of_week<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    local_midnight(&now.timezone(), week_start_date(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc, Weekday};

    #[test]
    fn day_bounds_follow_the_given_offset() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        // 2024-03-05 01:30 in UTC+9 is still 2024-03-04 in UTC.
        let now = tz.with_ymd_and_hms(2024, 3, 5, 1, 30, 0).unwrap();

        let start = start_of_day(&now);
        assert_eq!(start, tz.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
        assert_eq!(start_of_next_day(&now) - start, Duration::hours(24));
        assert_eq!(
            start.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn week_starts_on_monday() {
        // Sunday
        let sunday = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap();
        let start = start_of_week(&sunday);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap());
        assert_eq!(start.weekday(), Weekday::Mon);

        let monday = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
        assert_eq!(start_of_week(&monday), monday);
    }
}
