// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Local, Utc};

/// Render a chat's `last_updated` timestamp relative to `now`.
///
/// Same day shows the local clock time, then "Yesterday", then "N days ago"
/// for the rest of the week, and a plain date beyond that. Unparsable input
/// is returned unchanged.
pub fn format_last_updated(raw: &str, now: DateTime<Utc>) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(raw) else {
        return raw.to_string();
    };
    let date = parsed.with_timezone(&Utc);

    let diff_days = (now - date).num_days().abs();
    match diff_days {
        0 => date.with_timezone(&Local).format("%H:%M").to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{} days ago", diff_days),
        _ => date.with_timezone(&Local).format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, SecondsFormat};

    fn ago(now: DateTime<Utc>, d: Duration) -> String {
        (now - d).to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    #[test]
    fn test_same_day_shows_clock_time() {
        let now = Utc::now();
        let formatted = format_last_updated(&ago(now, Duration::minutes(5)), now);
        assert_eq!(formatted.len(), 5);
        assert_eq!(formatted.chars().nth(2), Some(':'));
    }

    #[test]
    fn test_recent_days() {
        let now = Utc::now();
        assert_eq!(
            format_last_updated(&ago(now, Duration::hours(30)), now),
            "Yesterday"
        );
        assert_eq!(
            format_last_updated(&ago(now, Duration::days(3)), now),
            "3 days ago"
        );
    }

    #[test]
    fn test_older_dates_show_calendar_date() {
        let now = Utc::now();
        let formatted = format_last_updated(&ago(now, Duration::days(30)), now);
        assert_eq!(formatted.len(), 10);
        assert_eq!(formatted.matches('-').count(), 2);
    }

    #[test]
    fn test_unparsable_passthrough() {
        assert_eq!(format_last_updated("not a date", Utc::now()), "not a date");
    }
}
