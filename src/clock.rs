use chrono::NaiveTime;

use crate::error::{ParseWarning, Result};

/// Start of the placeholder block drawn for a course whose times are unreadable.
pub const DEFAULT_START_TIME: NaiveTime = time(9, 0);
/// End of the placeholder block.
pub const DEFAULT_END_TIME: NaiveTime = time(10, 0);

const fn time(hour: u32, minute: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(time) => time,
        None => panic!("invalid constant time"),
    }
}

#[derive(Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

/// Reads `HH:MM` (24-hour) or `H:MM am/pm` (12-hour).
///
/// Meridiem matching ignores case, dots and a space before it, so `9:15am`,
/// `9:15 PM` and `9:15 p.m.` all work. A trailing `:SS` is accepted and
/// dropped. `12am` is midnight, `12pm` is noon.
pub fn try_parse_wall_clock_time(raw: &str) -> Result<NaiveTime> {
    let warning = || ParseWarning::Time(raw.to_owned());

    let lowered = raw.trim().to_ascii_lowercase().replace('.', "");
    let (clock, meridiem) = if let Some(rest) = lowered.strip_suffix("am") {
        (rest.trim_end(), Some(Meridiem::Am))
    } else if let Some(rest) = lowered.strip_suffix("pm") {
        (rest.trim_end(), Some(Meridiem::Pm))
    } else {
        (lowered.as_str(), None)
    };

    let mut parts = clock.split(':');
    let hour = parts.next().and_then(|h| digits(h, 1)).ok_or_else(warning)?;
    let minute = match parts.next() {
        Some(m) => digits(m, 2).ok_or_else(warning)?,
        // "9am"
        None if meridiem.is_some() => 0,
        None => return Err(warning()),
    };
    if let Some(seconds) = parts.next() {
        digits(seconds, 2).filter(|s| *s < 60).ok_or_else(warning)?;
    }
    if parts.next().is_some() {
        return Err(warning());
    }

    let hour = match meridiem {
        None => hour,
        Some(_) if !(1..=12).contains(&hour) => return Err(warning()),
        Some(Meridiem::Am) if hour == 12 => 0,
        Some(Meridiem::Am) => hour,
        Some(Meridiem::Pm) if hour == 12 => 12,
        Some(Meridiem::Pm) => hour + 12,
    };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(warning)
}

/// Like [`try_parse_wall_clock_time`], but falls back to
/// [`DEFAULT_START_TIME`] instead of failing.
pub fn parse_wall_clock_time(raw: &str) -> NaiveTime {
    parse_wall_clock_time_or(raw, DEFAULT_START_TIME)
}

pub(crate) fn parse_wall_clock_time_or(raw: &str, default: NaiveTime) -> NaiveTime {
    try_parse_wall_clock_time(raw).unwrap_or_else(|warning| {
        tracing::warn!(%warning, fallback = %default.format("%H:%M"), "using default time");
        default
    })
}

/// One or two ASCII digits for an hour (`min_len` 1), exactly two otherwise.
fn digits(s: &str, min_len: usize) -> Option<u32> {
    if s.len() < min_len || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
