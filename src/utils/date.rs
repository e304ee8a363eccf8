//! Timestamp helpers

use chrono::{DateTime, Local, TimeZone};

/// Display format used for the `created` field of playlists
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time in the display format
pub fn date_now() -> String {
    format_display(&Local::now())
}

pub fn format_display<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, Utc};

    #[test]
    fn test_format_display() {
        let naive =
            NaiveDateTime::parse_from_str("2024-03-09 07:05:01", DISPLAY_FORMAT).unwrap();
        let at = Utc.from_utc_datetime(&naive);
        assert_eq!(format_display(&at), "2024-03-09 07:05:01");
    }

    #[test]
    fn test_date_now_parses_back() {
        let now = date_now();
        assert_eq!(now.len(), 19);
        assert!(NaiveDateTime::parse_from_str(&now, DISPLAY_FORMAT).is_ok());
    }
}
