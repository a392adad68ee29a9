use chrono::{Datelike, NaiveDate, Timelike};
use voltport::utils::datetime::{format_listed, parse_timestamp};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_parse_timestamp_formats() {
    let rfc = parse_timestamp("2025-01-15T14:30:00+02:00").unwrap();
    assert_eq!(rfc.hour(), 12);

    let millis = parse_timestamp("2025-01-15T14:30:00.123").unwrap();
    assert_eq!(millis.minute(), 30);

    let spaced = parse_timestamp("2025-01-15 14:30:00").unwrap();
    assert_eq!(spaced.hour(), 14);

    let day = parse_timestamp(" 2025-01-15 ").unwrap();
    assert_eq!((day.year(), day.month(), day.day(), day.hour()), (2025, 1, 15, 0));

    assert!(parse_timestamp("last tuesday").is_none());
    assert!(parse_timestamp("").is_none());
}

#[test]
fn test_format_listed() {
    let today = date(2025, 6, 20);
    assert_eq!(format_listed(today, today), "today");
    assert_eq!(format_listed(date(2025, 6, 19), today), "yesterday");
    assert_eq!(format_listed(date(2025, 6, 10), today), "10 days ago");
    assert_eq!(format_listed(date(2025, 1, 5), today), "Jan 05");
    assert_eq!(format_listed(date(2024, 12, 24), today), "Dec 24, 2024");
}
