//! Strict RFC 1123 date checking for feed `pubDate` values.
//!
//! Feed dates use a single fixed layout, `Mon, 02 Jan 2006 15:04:05 -0700`.
//! Plain parsing accepts any weekday name and throws it away, so a date is
//! only considered valid when formatting the parsed instant reproduces the
//! input byte for byte.

use chrono::{DateTime, FixedOffset, Timelike};
use thiserror::Error;

/// Layout used both to render dates and to check round trips.
pub const RFC1123Z: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Layout of everything after the `<Weekday>, ` prefix.
const DATE_TIME_LAYOUT: &str = "%d %b %Y %H:%M:%S %z";

/// Character classes of the text after the weekday: `d` digit, `a` letter,
/// `s` offset sign, anything else must match literally.
const DATE_TIME_SHAPE: &[u8] = b"dd aaa dddd dd:dd:dd sdddd";

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Why a date string was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid date format in {value}")]
    Format { value: String },

    #[error("day of week is not correct: expected {expected}, got {actual}")]
    DayOfWeekMismatch { expected: String, actual: String },
}

impl DateError {
    fn format(value: &str) -> Self {
        DateError::Format {
            value: value.to_string(),
        }
    }
}

/// Parse a feed date without checking its weekday token.
///
/// The token must still name a weekday, but which one is ignored. Every
/// other field must have exactly the width of the layout, and the seconds
/// must be in `00..=59`. Weekday and month names are matched without regard
/// to case.
pub fn parse_date(value: &str) -> Result<DateTime<FixedOffset>, DateError> {
    let (weekday, rest) = split_weekday(value).ok_or_else(|| DateError::format(value))?;
    if !WEEKDAYS.iter().any(|day| day.eq_ignore_ascii_case(weekday)) || !has_fixed_shape(rest) {
        return Err(DateError::format(value));
    }

    let parsed =
        DateTime::parse_from_str(rest, DATE_TIME_LAYOUT).map_err(|_| DateError::format(value))?;
    // chrono reads second 60 as a leap second
    if parsed.nanosecond() >= 1_000_000_000 {
        return Err(DateError::format(value));
    }
    Ok(parsed)
}

/// Parse a feed date and require that it round-trips exactly.
///
/// Anything that parses but does not come back byte for byte is reported as
/// a day-of-week mismatch, with the canonical rendering as the expected
/// value. Returns the parsed instant so callers can compare dates without
/// parsing twice.
pub fn validate_date(value: &str) -> Result<DateTime<FixedOffset>, DateError> {
    let parsed = parse_date(value)?;
    let canonical = format_date(&parsed);
    if canonical == value {
        Ok(parsed)
    } else {
        Err(DateError::DayOfWeekMismatch {
            expected: canonical,
            actual: value.to_string(),
        })
    }
}

/// Render an instant in the feed date layout.
pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.format(RFC1123Z).to_string()
}

fn split_weekday(value: &str) -> Option<(&str, &str)> {
    value.split_once(", ")
}

fn has_fixed_shape(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == DATE_TIME_SHAPE.len()
        && bytes
            .iter()
            .zip(DATE_TIME_SHAPE)
            .all(|(&byte, &class)| match class {
                b'd' => byte.is_ascii_digit(),
                b'a' => byte.is_ascii_alphabetic(),
                b's' => byte == b'+' || byte == b'-',
                literal => byte == literal,
            })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, TimeZone, Utc, Weekday};
    use proptest::prelude::*;

    #[test]
    fn test_accepts_reference_date() {
        let parsed = validate_date("Mon, 02 Jan 2006 15:04:05 -0700").unwrap();
        assert_eq!(parsed.weekday(), Weekday::Mon);
        assert_eq!(parsed.offset().local_minus_utc(), -7 * 3600);
    }

    #[test]
    fn test_accepts_utc_offset() {
        assert!(validate_date("Tue, 01 Jan 2019 00:00:00 +0000").is_ok());
    }

    #[test]
    fn test_rejects_wrong_weekday() {
        let err = validate_date("Tue, 02 Jan 2006 15:04:05 -0700").unwrap_err();
        assert_eq!(
            err,
            DateError::DayOfWeekMismatch {
                expected: "Mon, 02 Jan 2006 15:04:05 -0700".to_string(),
                actual: "Tue, 02 Jan 2006 15:04:05 -0700".to_string(),
            }
        );
        assert!(err.to_string().starts_with("day of week is not correct"));
    }

    #[test]
    fn test_parse_ignores_weekday() {
        let wrong = parse_date("Fri, 02 Jan 2006 15:04:05 -0700").unwrap();
        let right = parse_date("Mon, 02 Jan 2006 15:04:05 -0700").unwrap();
        assert_eq!(wrong, right);
    }

    #[test]
    fn test_rejects_unknown_weekday_name() {
        assert!(matches!(
            parse_date("Xyz, 02 Jan 2006 15:04:05 -0700"),
            Err(DateError::Format { .. })
        ));
        assert!(matches!(
            parse_date("Monday, 02 Jan 2006 15:04:05 -0700"),
            Err(DateError::Format { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_dates() {
        let cases = [
            "",
            "not a date",
            "Mon 02 Jan 2006 15:04:05 -0700",
            "Mon, 02 Jan 2006 15:04:05",
            "Mon, 02 Jan 2006 15:04 -0700",
            "Mon, 32 Jan 2006 15:04:05 -0700",
            "Mon, 02 Foo 2006 15:04:05 -0700",
            "Mon, 02 Jan 2006 25:04:05 -0700",
            "Mon, 02 Jan 2006 15:04:05 GMT",
            "Mon, 02 Jan 2006 15:04:05 -0700 trailing",
            "Mon, aa Jan 2006 15:04:05 -0700",
            "Mon, 02 Jan 2006 15:04:60 -0700",
            "Mon, 02 Jan 2006 15:04:61 -0700",
            "Mon, 2 Jan 2006 15:04:05 -0700",
            "Mon,  02 Jan 2006 15:04:05 -0700",
            "Mon, 02  Jan 2006 15:04:05 -0700",
            "Tue, 01 Jan 2019 00:00:00 +00:00",
            "Mon, 02 Jan 06 15:04:05 -0700",
            "Mon, 02 January 2006 15:04:05 -0700",
        ];
        for case in cases {
            let err = validate_date(case).unwrap_err();
            assert_eq!(
                err,
                DateError::Format {
                    value: case.to_string()
                },
                "case {case:?}"
            );
        }
    }

    #[test]
    fn test_non_canonical_spelling_is_a_day_of_week_mismatch() {
        // Parses, but does not reproduce the input.
        for (case, canonical) in [
            (
                "Mon, 02 jan 2006 15:04:05 -0700",
                "Mon, 02 Jan 2006 15:04:05 -0700",
            ),
            (
                "Tue, 01 Jan 2019 00:00:00 -0000",
                "Tue, 01 Jan 2019 00:00:00 +0000",
            ),
            (
                "tue, 01 Jan 2019 00:00:00 +0000",
                "Tue, 01 Jan 2019 00:00:00 +0000",
            ),
        ] {
            assert!(parse_date(case).is_ok(), "case {case:?} should parse");
            assert_eq!(
                validate_date(case),
                Err(DateError::DayOfWeekMismatch {
                    expected: canonical.to_string(),
                    actual: case.to_string(),
                }),
                "case {case:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_loose_fields() {
        for case in [
            "Tue, 01 Jan 2019 00:00:00 +00:00",
            "Tue, 1 Jan 2019 00:00:00 +0000",
            "Tue, 01 Jan 2019  00:00:00 +0000",
            "Tue, 01 Jan 2019 00:00:60 +0000",
        ] {
            assert_eq!(
                parse_date(case),
                Err(DateError::Format {
                    value: case.to_string()
                }),
                "case {case:?}"
            );
        }
    }

    #[test]
    fn test_negative_zero_offset_is_same_instant() {
        let plus = parse_date("Tue, 01 Jan 2019 00:00:00 +0000").unwrap();
        let minus = parse_date("Tue, 01 Jan 2019 00:00:00 -0000").unwrap();
        assert_eq!(plus, minus);
    }

    #[test]
    fn test_format_date_matches_layout() {
        let date = FixedOffset::west_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2006, 1, 2, 15, 4, 5)
            .unwrap();
        assert_eq!(format_date(&date), "Mon, 02 Jan 2006 15:04:05 -0700");
    }

    fn arb_date() -> impl Strategy<Value = DateTime<FixedOffset>> {
        // 1970..2100, offsets on quarter-hour boundaries within -12h..+14h
        (0i64..4_102_444_800, -48i32..=56).prop_map(|(secs, quarters)| {
            let offset = FixedOffset::east_opt(quarters * 15 * 60).unwrap();
            Utc.timestamp_opt(secs, 0).unwrap().with_timezone(&offset)
        })
    }

    proptest! {
        #[test]
        fn prop_formatted_dates_round_trip(date in arb_date()) {
            let text = format_date(&date);
            prop_assert_eq!(validate_date(&text), Ok(date));
        }

        #[test]
        fn prop_wrong_weekday_is_rejected(date in arb_date(), shift in 1i64..7) {
            let text = format_date(&date);
            let wrong_day = (date + Duration::days(shift)).format("%a").to_string();
            let tampered = format!("{}{}", wrong_day, &text[3..]);
            let is_mismatch = matches!(
                validate_date(&tampered),
                Err(DateError::DayOfWeekMismatch { .. })
            );
            prop_assert!(is_mismatch);
        }

        #[test]
        fn prop_seconds_past_59_are_rejected(date in arb_date(), second in 60u32..100) {
            let text = format_date(&date);
            // "Mon, 02 Jan 2006 15:04:05 -0700": seconds sit at bytes 23..25
            let tampered = format!("{}{:02}{}", &text[..23], second, &text[25..]);
            prop_assert_eq!(
                validate_date(&tampered),
                Err(DateError::Format { value: tampered.clone() })
            );
        }
    }
}
