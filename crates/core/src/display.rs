use chrono::{DateTime, Utc};

/// Pattern used for every timestamp rendered to users (`dd/mm/yyyy HH:MM`).
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Formats a UTC timestamp in the fixed display representation.
#[must_use]
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format(DISPLAY_TIMESTAMP_FORMAT).to_string()
}

/// Parses an RFC3339 timestamp string, returning `None` for malformed input.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{format_timestamp, parse_timestamp};

    #[test]
    fn formats_day_first() {
        let value = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).single();
        assert_eq!(value.map(format_timestamp).as_deref(), Some("07/03/2024 09:05"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-03-07T09:05:00+01:00").is_some());
    }
}
