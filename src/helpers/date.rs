//! Date helper functions

use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Format a date the way the given locale prints a short date
///
/// # Examples
/// ```ignore
/// locale_date(&date, &chrono_tz::Asia::Tokyo, "ja") // -> "2023/5/30"
/// locale_date(&date, &chrono_tz::UTC, "en")         // -> "5/30/2023"
/// ```
pub fn locale_date<Tz: TimeZone>(date: &DateTime<Utc>, tz: &Tz, lang: &str) -> String {
    let local = date.with_timezone(tz);
    let (year, month, day) = (local.year(), local.month(), local.day());
    match lang {
        "en" | "en-US" => format!("{}/{}/{}", month, day, year),
        "en-GB" | "fr" | "de" => format!("{:02}/{:02}/{}", day, month, year),
        // ja-JP style, also the default
        _ => format!("{}/{}/{}", year, month, day),
    }
}

/// Format a date in ISO 8601 form
pub fn date_xml(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
