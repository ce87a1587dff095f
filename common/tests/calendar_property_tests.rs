// Property-based tests for the notice calendar

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use common::models::DateFormat;
use common::schedule::{default_timezone, FixedClock, NoticeCalendar};
use proptest::prelude::*;
use std::sync::Arc;

fn calendar_at(secs: i64, format: DateFormat) -> NoticeCalendar {
    let now = Utc.timestamp_opt(secs, 0).unwrap();
    NoticeCalendar::new(Arc::new(FixedClock(now)), default_timezone(), format)
}

proptest! {
    /// *For any* instant between 15:00 UTC and the next 15:00 UTC, "today" is
    /// the Seoul date that starts at that 15:00 UTC.
    #[test]
    fn property_today_follows_seoul_midnight(
        day_offset in 0i64..3650,
        second_of_day in 0i64..86_400,
    ) {
        let seoul_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(day_offset);
        let seoul_midnight_utc = seoul_date.and_hms_opt(0, 0, 0).unwrap().and_utc() - Duration::hours(9);
        let secs = seoul_midnight_utc.timestamp() + second_of_day;

        let calendar = calendar_at(secs, DateFormat::Dotted);

        prop_assert_eq!(calendar.today(), seoul_date.format("%Y.%m.%d").to_string());
        prop_assert_eq!(
            calendar.today_all_formats(),
            vec![
                seoul_date.format("%Y.%m.%d").to_string(),
                seoul_date.format("%Y-%m-%d").to_string(),
            ]
        );
    }

    /// *For any* instant, the family format only changes the separators.
    #[test]
    fn property_formats_agree_on_the_day(secs in 1_500_000_000i64..2_500_000_000i64) {
        let dotted = calendar_at(secs, DateFormat::Dotted).today();
        let dashed = calendar_at(secs, DateFormat::Dashed).today();
        prop_assert_eq!(dotted.replace('.', "-"), dashed);
    }
}
