use chrono::{DateTime, TimeZone, Utc};

/// Checks the `YYYY-MM` month token, months 01-12 only.
pub fn is_valid_month(value: &str) -> bool {
    let b = value.as_bytes();
    b.len() == 7
        && b[..4].iter().all(|c| c.is_ascii_digit())
        && b[4] == b'-'
        && matches!((b[5], b[6]), (b'0', b'1'..=b'9') | (b'1', b'0'..=b'2'))
}

/// Half-open UTC window `[start of month, start of next month)`.
///
/// Returns `None` for anything `is_valid_month` rejects.
pub fn month_range(month: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    if !is_valid_month(month) {
        return None;
    }
    let year: i32 = month[..4].parse().ok()?;
    let m: u32 = month[5..].parse().ok()?;
    let start = Utc.with_ymd_and_hms(year, m, 1, 0, 0, 0).single()?;
    let (next_year, next_month) = if m == 12 { (year + 1, 1) } else { (year, m + 1) };
    let end = Utc.with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0).single()?;
    Some((start, end))
}

/// Parses only full ISO-8601 datetimes:
/// `YYYY-MM-DDTHH:MM:SS[.fff](Z|+HH:MM|-HH:MM)`.
///
/// Date-only strings and locale formats are rejected. The previous backend
/// accepted anything its date constructor could guess at, which let ambiguous
/// formats through; the shape check closes that gap before chrono parses.
pub fn parse_strict_iso_date(value: &str) -> Option<DateTime<Utc>> {
    if !strict_iso_shape(value) {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn strict_iso_shape(value: &str) -> bool {
    let b = value.as_bytes();
    if b.len() < 20 {
        return false;
    }
    // Fixed head: YYYY-MM-DDTHH:MM:SS
    for (i, &c) in b[..19].iter().enumerate() {
        let ok = match i {
            4 | 7 => c == b'-',
            10 => c == b'T',
            13 | 16 => c == b':',
            _ => c.is_ascii_digit(),
        };
        if !ok {
            return false;
        }
    }
    let mut rest = &b[19..];
    if rest.first() == Some(&b'.') {
        let digits = rest[1..].iter().take_while(|c| c.is_ascii_digit()).count();
        if !(1..=3).contains(&digits) {
            return false;
        }
        rest = &rest[1 + digits..];
    }
    match rest {
        [b'Z'] => true,
        [sign, h1, h2, b':', m1, m2] => {
            matches!(sign, b'+' | b'-')
                && h1.is_ascii_digit()
                && h2.is_ascii_digit()
                && m1.is_ascii_digit()
                && m2.is_ascii_digit()
        }
        _ => false,
    }
}

/// Amounts must be positive and finite; everything else is rejected at the
/// boundary before any write.
pub fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_token_accepts_only_yyyy_mm() {
        assert!(is_valid_month("2026-01"));
        assert!(is_valid_month("2026-12"));
        assert!(!is_valid_month("2026-13"));
        assert!(!is_valid_month("2026-00"));
        assert!(!is_valid_month("02-2026"));
        assert!(!is_valid_month("2026-02-01"));
        assert!(!is_valid_month("2026/02"));
        assert!(!is_valid_month(""));
    }

    #[test]
    fn month_range_is_half_open_one_month_wide() {
        let (start, end) = month_range("2026-02").unwrap();
        assert_eq!(start.to_rfc3339(), "2026-02-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-03-01T00:00:00+00:00");
    }

    #[test]
    fn month_range_rolls_over_the_year() {
        let (start, end) = month_range("2026-12").unwrap();
        assert_eq!(start.to_rfc3339(), "2026-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2027-01-01T00:00:00+00:00");
    }

    #[test]
    fn strict_iso_accepts_full_datetimes() {
        assert!(parse_strict_iso_date("2026-02-24T12:30:45Z").is_some());
        assert!(parse_strict_iso_date("2026-02-24T12:30:45.123Z").is_some());
        assert!(parse_strict_iso_date("2026-02-24T12:30:45+02:00").is_some());
        assert!(parse_strict_iso_date("2026-02-24T12:30:45.5-05:00").is_some());
    }

    #[test]
    fn strict_iso_rejects_partial_and_locale_formats() {
        assert!(parse_strict_iso_date("2026-02-24").is_none());
        assert!(parse_strict_iso_date("24/02/2026").is_none());
        assert!(parse_strict_iso_date("2026-02-24T12:30").is_none());
        assert!(parse_strict_iso_date("2026-02-24T12:30:45").is_none());
        assert!(parse_strict_iso_date("2026-02-24T12:30:45.1234Z").is_none());
        assert!(parse_strict_iso_date("2026-02-24 12:30:45Z").is_none());
        assert!(parse_strict_iso_date("").is_none());
    }

    #[test]
    fn strict_iso_normalizes_offsets_to_utc() {
        let parsed = parse_strict_iso_date("2026-02-24T02:00:00+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-02-24T00:00:00+00:00");
    }

    #[test]
    fn amount_must_be_positive_and_finite() {
        assert!(is_valid_amount(0.01));
        assert!(!is_valid_amount(0.0));
        assert!(!is_valid_amount(-5.0));
        assert!(!is_valid_amount(f64::NAN));
        assert!(!is_valid_amount(f64::INFINITY));
    }
}
