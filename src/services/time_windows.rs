use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, TimeZone, Timelike, Weekday};
use tracing::debug;

use crate::models::meeting::TimeWindow;

/// Business hours are `[10:00, 19:00)` local time.
pub const BUSINESS_START_HOUR: u32 = 10;
pub const BUSINESS_END_HOUR: u32 = 19;

/// Day offsets `0..=SEARCH_DAYS` after the meeting's end date are searched.
pub const SEARCH_DAYS: u64 = 7;

/// Business-hour windows for the week following `meeting_end`, in the time zone of `now`.
///
/// Weekends are skipped. On the first day the window starts at the current hour
/// once business hours are under way, and the day is dropped entirely from
/// 19:00 on. The result is lazy; clone it to walk the windows again.
pub fn plan_windows<Tz: TimeZone>(meeting_end: &DateTime<FixedOffset>, now: &DateTime<Tz>) -> TimeWindows<Tz> {
    let zone = now.timezone();
    let first_day = meeting_end.with_timezone(&zone).date_naive();

    TimeWindows {
        first_day,
        now_hour: now.hour(),
        offset: 0,
        zone,
    }
}

#[derive(Debug, Clone)]
pub struct TimeWindows<Tz: TimeZone> {
    zone: Tz,
    first_day: NaiveDate,
    now_hour: u32,
    offset: u64,
}

impl<Tz: TimeZone> TimeWindows<Tz> {
    fn window_on(&self, day: NaiveDate, start_hour: u32) -> Option<TimeWindow> {
        let start = self
            .zone
            .from_local_datetime(&day.and_hms_opt(start_hour, 0, 0)?)
            .earliest()?;
        let end = self
            .zone
            .from_local_datetime(&day.and_hms_opt(BUSINESS_END_HOUR, 0, 0)?)
            .earliest()?;

        if start >= end {
            return None;
        }

        Some(TimeWindow {
            start: start.fixed_offset(),
            end: end.fixed_offset(),
        })
    }
}

impl<Tz: TimeZone> Iterator for TimeWindows<Tz> {
    type Item = TimeWindow;

    fn next(&mut self) -> Option<TimeWindow> {
        while self.offset <= SEARCH_DAYS {
            let offset = self.offset;
            self.offset += 1;

            let day = self.first_day.checked_add_days(Days::new(offset))?;
            if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }

            let mut start_hour = BUSINESS_START_HOUR;
            if offset == 0 {
                if self.now_hour >= BUSINESS_END_HOUR {
                    debug!("Business hours are over on {}, skipping", day);
                    continue;
                }
                if self.now_hour > BUSINESS_START_HOUR {
                    start_hour = self.now_hour;
                }
            }

            match self.window_on(day, start_hour) {
                Some(window) => return Some(window),
                None => debug!("No usable window on {}", day),
            }
        }

        None
    }
}
