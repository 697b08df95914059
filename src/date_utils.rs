use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Interpret a raw JSON value as a point in time.
///
/// Strings may be plain dates, naive date-times or RFC 3339 timestamps (the
/// offset is dropped and the wall-clock time kept). Integers are epoch
/// milliseconds. Anything else yields `None`.
pub fn parse_date_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_date_str(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

pub fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Weekday index counted from Sunday = 0.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Snap `date` back to the most recent day (inclusive) whose weekday index is
/// `close_day`. `None` when that day lies before the first representable date.
pub fn statement_week_start(date: NaiveDate, close_day: u32) -> Option<NaiveDate> {
    let days_back = (weekday_index(date) + 7 - close_day % 7) % 7;
    date.checked_sub_signed(Duration::try_days(days_back as i64)?)
}

/// Case-insensitive ordering with the exact string as tie-breaker, so
/// "apple" sorts next to "Apple" while the result stays total.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Human-readable label for an inclusive date range, e.g. "Jan 5 – 11, 2024",
/// "Jan 26 – Feb 1, 2024" or "Dec 29, 2023 – Jan 4, 2024".
pub fn range_label(from: NaiveDate, to: NaiveDate) -> String {
    let from_fmt = from.format("%b %-d");
    if from.year() == to.year() {
        if from.month() == to.month() {
            format!("{} – {}, {}", from_fmt, to.format("%-d"), to.format("%Y"))
        } else {
            format!(
                "{} – {}, {}",
                from_fmt,
                to.format("%b %-d"),
                to.format("%Y")
            )
        }
    } else {
        format!(
            "{}, {} – {}, {}",
            from_fmt,
            from.format("%Y"),
            to.format("%b %-d"),
            to.format("%Y")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_plain_dates() {
        let expected = ymd(2024, 1, 3).and_time(NaiveTime::MIN);
        assert_eq!(parse_date_str("2024-01-03"), Some(expected));
        assert_eq!(parse_date_str("2024/01/03"), Some(expected));
        assert_eq!(parse_date_str("01/03/2024"), Some(expected));
        assert_eq!(parse_date_str("  2024-01-03 "), Some(expected));
    }

    #[test]
    fn test_parse_datetimes() {
        let parsed = parse_date_str("2024-01-03T18:30:00Z").unwrap();
        assert_eq!(parsed.date(), ymd(2024, 1, 3));

        let parsed = parse_date_str("2024-01-03T23:30:00-05:00").unwrap();
        assert_eq!(parsed.date(), ymd(2024, 1, 3));

        let parsed = parse_date_str("2024-01-03 08:15:00").unwrap();
        assert_eq!(parsed.date(), ymd(2024, 1, 3));
    }

    #[test]
    fn test_rejects_invalid_dates() {
        assert_eq!(parse_date_str(""), None);
        assert_eq!(parse_date_str("yesterday"), None);
        assert_eq!(parse_date_str("2024-02-30"), None);
        assert_eq!(parse_date_value(&json!(null)), None);
        assert_eq!(parse_date_value(&json!(true)), None);
        assert_eq!(parse_date_value(&json!({"date": "2024-01-01"})), None);
    }

    #[test]
    fn test_parse_epoch_millis() {
        // 2024-01-03T00:00:00Z
        let parsed = parse_date_value(&json!(1_704_240_000_000_i64)).unwrap();
        assert_eq!(parsed.date(), ymd(2024, 1, 3));
    }

    #[test]
    fn test_statement_week_start() {
        // 2024-01-03 is a Wednesday (index 3)
        let wed = ymd(2024, 1, 3);
        assert_eq!(weekday_index(wed), 3);
        assert_eq!(statement_week_start(wed, 3), Some(wed));
        // Friday close day snaps back to Friday 2023-12-29
        assert_eq!(statement_week_start(wed, 5), Some(ymd(2023, 12, 29)));
        // Sunday close day snaps back to 2023-12-31
        assert_eq!(statement_week_start(wed, 0), Some(ymd(2023, 12, 31)));
    }

    #[test]
    fn test_statement_week_start_at_range_edge() {
        let first = NaiveDate::MIN;
        let close_day = (weekday_index(first) + 1) % 7;
        assert_eq!(statement_week_start(first, weekday_index(first)), Some(first));
        assert_eq!(statement_week_start(first, close_day), None);
    }

    #[test]
    fn test_locale_cmp() {
        let mut names = vec!["rent", "Food", "apple", "Apple"];
        names.sort_by(|a, b| locale_cmp(a, b));
        assert_eq!(names, vec!["Apple", "apple", "Food", "rent"]);
    }

    #[test]
    fn test_range_label() {
        assert_eq!(range_label(ymd(2024, 1, 5), ymd(2024, 1, 11)), "Jan 5 – 11, 2024");
        assert_eq!(
            range_label(ymd(2024, 1, 26), ymd(2024, 2, 1)),
            "Jan 26 – Feb 1, 2024"
        );
        assert_eq!(
            range_label(ymd(2023, 12, 29), ymd(2024, 1, 4)),
            "Dec 29, 2023 – Jan 4, 2024"
        );
    }
}
