//! Date parsing for form input and the display formats used by the views.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Accepts the HTML `datetime-local` shape (`2030-01-01T00:00`, optionally with
/// seconds), a bare date, or a full RFC 3339 timestamp. Naive inputs are UTC.
pub fn parse_datetime_input(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Long form, e.g. `January 1st, 2030`.
pub fn long_date(dt: &DateTime<Utc>) -> String {
    format!(
        "{} {}, {}",
        dt.format("%B"),
        ordinal(dt.day()),
        dt.year()
    )
}

/// Medium form, e.g. `Jan 1, 2030`.
pub fn medium_date(dt: &DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y").to_string()
}

fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{day}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_local() {
        let dt = parse_datetime_input("2030-01-01T00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_datetime_input("2030-06-15T12:30:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2030, 6, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_bare_date() {
        let dt = parse_datetime_input("2031-02-03").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2031, 2, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_datetime_input("").is_none());
        assert!(parse_datetime_input("next tuesday").is_none());
        assert!(parse_datetime_input("2030-13-01T00:00").is_none());
    }

    #[test]
    fn test_long_date_ordinals() {
        let cases = [
            (1, "January 1st, 2030"),
            (2, "January 2nd, 2030"),
            (3, "January 3rd, 2030"),
            (4, "January 4th, 2030"),
            (11, "January 11th, 2030"),
            (12, "January 12th, 2030"),
            (13, "January 13th, 2030"),
            (21, "January 21st, 2030"),
            (22, "January 22nd, 2030"),
            (31, "January 31st, 2030"),
        ];
        for (day, expected) in cases {
            let dt = Utc.with_ymd_and_hms(2030, 1, day, 9, 0, 0).unwrap();
            assert_eq!(long_date(&dt), expected);
        }
    }

    #[test]
    fn test_medium_date() {
        let dt = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(medium_date(&dt), "Jan 1, 2030");
    }
}
