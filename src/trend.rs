use chrono::NaiveTime;

use crate::dates::{self, WeekWindow};
use crate::models::{DayBucket, Event};

pub const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Counts events per day of the week `offset_weeks` away from now.
pub fn aggregate_by_day(events: &[Event], offset_weeks: i32) -> Vec<DayBucket> {
    aggregate_window(events, &WeekWindow::current(offset_weeks))
}

/// Buckets are always Monday-first; events with an unparseable date are
/// skipped.
pub fn aggregate_window(events: &[Event], window: &WeekWindow) -> Vec<DayBucket> {
    let mut buckets: Vec<DayBucket> = DAY_LABELS
        .iter()
        .zip(0u32..)
        .map(|(&label, index)| DayBucket {
            label,
            date_key: window.day(index).format("%d.%m").to_string(),
            count: 0,
        })
        .collect();

    let start = window.start();

    for event in events {
        let Some(parsed) = dates::parse_event_date(&event.event_date) else {
            continue;
        };

        let day_start = parsed.date().and_time(NaiveTime::MIN);
        if !window.contains(day_start) {
            continue;
        }

        let index = (day_start - start).num_days();
        if let Some(bucket) = usize::try_from(index)
            .ok()
            .and_then(|index| buckets.get_mut(index))
        {
            bucket.count += 1;
        }
    }

    buckets
}
