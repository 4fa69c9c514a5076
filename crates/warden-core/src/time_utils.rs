use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses an RFC 3339 timestamp into a timezone-aware instant.
pub fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|value| value.with_timezone(&Utc))
}

/// Parses a timestamp that may omit the offset or the time component.
///
/// Config files and CLI flags accept `2026-01-01`, `2026-01-01T12:00:00`
/// and full RFC 3339 forms; naive values are interpreted as UTC.
pub fn parse_rfc3339_lenient(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Some(parsed) = parse_rfc3339(trimmed) {
        return Some(parsed);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Formats an instant as RFC 3339 with seconds precision in UTC.
pub fn format_rfc3339(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::{format_rfc3339, parse_rfc3339, parse_rfc3339_lenient};

    #[test]
    fn unit_parse_rfc3339_normalizes_offset_to_utc() {
        let parsed = parse_rfc3339("2026-01-01T02:00:00+02:00").expect("parse");
        assert_eq!(format_rfc3339(parsed), "2026-01-01T00:00:00Z");
    }

    #[test]
    fn functional_parse_rfc3339_lenient_accepts_naive_forms() {
        let date_only = parse_rfc3339_lenient("2026-01-01").expect("date");
        assert_eq!(format_rfc3339(date_only), "2026-01-01T00:00:00Z");

        let naive = parse_rfc3339_lenient("2026-01-01T12:30:00").expect("naive");
        assert_eq!(format_rfc3339(naive), "2026-01-01T12:30:00Z");
    }

    #[test]
    fn unit_parse_rfc3339_rejects_garbage() {
        assert!(parse_rfc3339("not a timestamp").is_none());
        assert!(parse_rfc3339_lenient("").is_none());
    }
}
