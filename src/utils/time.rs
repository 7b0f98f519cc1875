use std::fmt::Display;

use chrono::{DateTime, TimeZone};


/// This is the standard way of showing a moment in whatnext: zero padded
/// 24-hour wall clock time, or `-` when the moment is absent.
pub fn format_clock<Tz: TimeZone>(moment: Option<&DateTime<Tz>>) -> String
where
    Tz::Offset: Display,
{
    match moment {
        Some(v) => v.format("%H:%M").to_string(),
        None => "-".to_string(),
    }
}
