use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DAY_FORMAT: &str = "%Y-%m-%d";

enum Stamp {
    Day(NaiveDate),
    Time(NaiveDateTime),
}

// Accepts RFC 3339, the "2017-02-02T07:30:45 -01:00" form of the user export, naive
// timestamps and plain days.
fn parse(raw: &str) -> Option<Stamp> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let compact = trimmed.replace(' ', "");
    if let Ok(dt) = DateTime::parse_from_rfc3339(&compact) {
        return Some(Stamp::Time(dt.naive_local()));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Stamp::Time(dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(Stamp::Time(dt));
    }
    NaiveDate::parse_from_str(trimmed, DAY_FORMAT)
        .ok()
        .map(Stamp::Day)
}

/// Calendar day of a stored timestamp, in the timestamp's own offset.
pub fn normalize_day(raw: &str) -> Option<NaiveDate> {
    match parse(raw)? {
        Stamp::Day(d) => Some(d),
        Stamp::Time(t) => Some(t.date()),
    }
}

/// Display form of the "Date Joined" column, e.g. `Dec 1, 2023, 7:30 AM`.
/// Unparseable values are shown as stored.
pub fn format_user_date(raw: &str) -> String {
    match parse(raw) {
        None => raw.trim().to_string(),
        Some(Stamp::Day(d)) => d.format("%b %-d, %Y").to_string(),
        Some(Stamp::Time(t)) => t.format("%b %-d, %Y, %-I:%M %p").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_offsets_with_a_space_are_understood() {
        assert_eq!(
            format_user_date("2017-02-02T07:30:45 -01:00"),
            "Feb 2, 2017, 7:30 AM"
        );
        assert_eq!(
            normalize_day("2017-02-02T07:30:45 -01:00"),
            NaiveDate::from_ymd_opt(2017, 2, 2)
        );
    }

    #[test]
    fn plain_days_and_garbage() {
        assert_eq!(format_user_date("2023-12-01"), "Dec 1, 2023");
        assert_eq!(format_user_date("yesterday"), "yesterday");
        assert_eq!(format_user_date(""), "");
        assert_eq!(normalize_day("not a date"), None);
    }
}
