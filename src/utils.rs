use chrono::{NaiveTime, Timelike};

use crate::network::Timestamp;

pub const SECONDS_PER_DAY: Timestamp = 24 * 3600;

// Last representable second of a service day. Costs that cross midnight are folded through it.
pub const END_OF_DAY: Timestamp = SECONDS_PER_DAY - 1;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("Invalid time \"{0}\", expected HH:MM:SS.")]
    InvalidTime(String),
}

// Parses "HH:MM:SS" into seconds since midnight.
// Hours past 24 (next-day trips in timetable exports) are folded onto the same day.
pub fn parse_time(s: &str) -> Result<Timestamp, TimeParseError> {
    let invalid = || TimeParseError::InvalidTime(s.to_owned());

    let trimmed = s.trim();
    let (hour, rest) = trimmed.split_once(':').ok_or_else(invalid)?;
    if hour.is_empty() || !hour.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let hour: u32 = hour.parse().map_err(|_| invalid())?;

    let normalised = format!("{:02}:{rest}", hour % 24);
    let time = NaiveTime::parse_from_str(&normalised, "%H:%M:%S").map_err(|_| invalid())?;
    Ok(time.num_seconds_from_midnight())
}

// Same as parse_time, but also accepts "HH:MM" (seconds default to zero).
pub fn parse_clock(s: &str) -> Result<Timestamp, TimeParseError> {
    let trimmed = s.trim();
    if trimmed.matches(':').count() == 1 {
        parse_time(&format!("{trimmed}:00"))
    } else {
        parse_time(trimmed)
    }
}

pub fn get_time_str(time: Timestamp) -> String {
    let hours = time / 3600;
    let minutes = (time % 3600) / 60;
    let seconds = time % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

pub fn get_short_time_str(time: Timestamp) -> String {
    format!("{:02}:{:02}", time / 3600, (time % 3600) / 60)
}
