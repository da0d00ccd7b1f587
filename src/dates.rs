use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

const GENERIC_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses an event timestamp as local wall-clock time.
///
/// `DD.MM.YYYY HH:MM` is read positionally; anything else falls back to
/// RFC 3339 and a handful of ISO-8601 shapes. `None` means the date is
/// unknown and the event is left out of any aggregation.
pub fn parse_event_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    parse_dotted(text).or_else(|| parse_generic(text))
}

fn parse_dotted(text: &str) -> Option<NaiveDateTime> {
    let bytes = text.as_bytes();
    if bytes.len() != 16
        || bytes[2] != b'.'
        || bytes[5] != b'.'
        || bytes[10] != b' '
        || bytes[13] != b':'
    {
        return None;
    }

    let day = digits(&bytes[0..2])?;
    let month = digits(&bytes[3..5])?;
    let year = digits(&bytes[6..10])?;
    let hour = digits(&bytes[11..13])?;
    let minute = digits(&bytes[14..16])?;

    NaiveDate::from_ymd_opt(year as i32, month, day)?.and_hms_opt(hour, minute, 0)
}

fn digits(bytes: &[u8]) -> Option<u32> {
    bytes.iter().try_fold(0u32, |acc, byte| {
        byte.is_ascii_digit()
            .then(|| acc * 10 + u32::from(byte - b'0'))
    })
}

fn parse_generic(text: &str) -> Option<NaiveDateTime> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Local).naive_local());
    }

    for format in GENERIC_DATETIME_FORMATS {
        if let Ok(instant) = NaiveDateTime::parse_from_str(text, format) {
            return Some(instant);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Monday 00:00 of the week `offset_weeks` away from the current local week.
pub fn start_of_week(offset_weeks: i32) -> NaiveDateTime {
    start_of_week_at(Local::now().date_naive(), offset_weeks)
}

pub fn start_of_week_at(today: NaiveDate, offset_weeks: i32) -> NaiveDateTime {
    let weekday = i64::from(today.weekday().number_from_monday());
    let shift = Duration::days(-(weekday - 1) + i64::from(offset_weeks) * 7);

    let monday = today.checked_add_signed(shift).unwrap_or(if offset_weeks < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    });

    monday.and_time(NaiveTime::MIN)
}

/// Seven-day window starting on a Monday; the end is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    offset: i32,
    start: NaiveDateTime,
}

impl WeekWindow {
    pub fn current(offset_weeks: i32) -> Self {
        Self::at(Local::now().date_naive(), offset_weeks)
    }

    pub fn at(today: NaiveDate, offset_weeks: i32) -> Self {
        Self {
            offset: offset_weeks,
            start: start_of_week_at(today, offset_weeks),
        }
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start
            .checked_add_signed(Duration::days(7))
            .unwrap_or(NaiveDateTime::MAX)
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end()
    }

    pub fn day(&self, index: u32) -> NaiveDate {
        self.start
            .date()
            .checked_add_signed(Duration::days(i64::from(index)))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn title(&self) -> String {
        let first = self.day(0);
        let last = self.day(6);
        let mut title = format!("{} – {}", first.format("%d %b"), last.format("%d %b"));

        match self.offset {
            0 => title.push_str(" (current)"),
            -1 => title.push_str(" (previous)"),
            _ => {}
        }

        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn parses_dotted_format_positionally() {
        let parsed = parse_event_date("15.12.2025 15:43").unwrap();
        assert_eq!(parsed.date(), date(2025, 12, 15));
        assert_eq!(parsed.month0(), 11);
        assert_eq!(parsed.hour(), 15);
        assert_eq!(parsed.minute(), 43);
    }

    #[test]
    fn rejects_garbage_without_panicking() {
        assert_eq!(parse_event_date("not-a-date"), None);
        assert_eq!(parse_event_date(""), None);
        assert_eq!(parse_event_date("   "), None);
        assert_eq!(parse_event_date("ab.cd.efgh ij:kl"), None);
        assert_eq!(parse_event_date("15.12.2025 1543x"), None);
        assert_eq!(parse_event_date("15.12.2025 15:4Я"), None);
    }

    #[test]
    fn rejects_out_of_range_dotted_values() {
        assert_eq!(parse_event_date("31.02.2025 10:00"), None);
        assert_eq!(parse_event_date("15.13.2025 10:00"), None);
        assert_eq!(parse_event_date("15.12.2025 24:00"), None);
        assert_eq!(parse_event_date("15.12.2025 10:60"), None);
    }

    #[test]
    fn falls_back_to_iso_shapes() {
        assert_eq!(
            parse_event_date("2025-01-07"),
            Some(date(2025, 1, 7).and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_event_date("2025-01-07T09:30:00"),
            Some(date(2025, 1, 7).and_hms_opt(9, 30, 0).unwrap())
        );
        assert_eq!(
            parse_event_date("2025-01-07 09:30"),
            Some(date(2025, 1, 7).and_hms_opt(9, 30, 0).unwrap())
        );
        assert!(parse_event_date("2025-01-07T09:30:00+03:00").is_some());
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert!(parse_event_date("  15.12.2025 15:43\n").is_some());
    }

    #[test]
    fn week_starts_on_monday() {
        let wednesday = date(2025, 12, 17);
        assert_eq!(
            start_of_week_at(wednesday, 0),
            date(2025, 12, 15).and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(
            start_of_week_at(wednesday, -1),
            date(2025, 12, 8).and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn sunday_belongs_to_the_preceding_monday() {
        let sunday = date(2025, 12, 21);
        assert_eq!(start_of_week_at(sunday, 0).date(), date(2025, 12, 15));

        let monday = date(2025, 12, 15);
        assert_eq!(start_of_week_at(monday, 0).date(), date(2025, 12, 15));
    }

    #[test]
    fn offsets_cross_year_boundaries_and_allow_future_weeks() {
        let today = date(2026, 1, 2);
        assert_eq!(start_of_week_at(today, 0).date(), date(2025, 12, 29));
        assert_eq!(start_of_week_at(today, -1).date(), date(2025, 12, 22));
        assert_eq!(start_of_week_at(today, 2).date(), date(2026, 1, 12));
    }

    #[test]
    fn extreme_offsets_saturate_instead_of_panicking() {
        let start = start_of_week_at(date(2025, 12, 17), i32::MIN);
        assert_eq!(start.date(), NaiveDate::MIN);
    }

    #[test]
    fn window_is_half_open() {
        let window = WeekWindow::at(date(2025, 12, 17), 0);
        assert!(window.contains(date(2025, 12, 15).and_hms_opt(0, 0, 0).unwrap()));
        assert!(window.contains(date(2025, 12, 21).and_hms_opt(23, 59, 0).unwrap()));
        assert!(!window.contains(date(2025, 12, 22).and_hms_opt(0, 0, 0).unwrap()));
        assert!(!window.contains(date(2025, 12, 14).and_hms_opt(23, 59, 0).unwrap()));
    }

    #[test]
    fn window_title_marks_current_and_previous() {
        let today = date(2025, 12, 17);
        assert_eq!(WeekWindow::at(today, 0).title(), "15 Dec – 21 Dec (current)");
        assert_eq!(WeekWindow::at(today, -1).title(), "08 Dec – 14 Dec (previous)");
        assert_eq!(WeekWindow::at(today, -2).title(), "01 Dec – 07 Dec");
    }
}
