use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ParseWarning, Result};

/// Academic year substituted when a course carries no usable term dates.
pub const DEFAULT_TERM: TermRange = TermRange {
    start: date(2024, 9, 3),
    end: date(2025, 6, 13),
};

/// Longest term, in days, that a course may span. Longer ones are treated as
/// unreadable and replaced by [`DEFAULT_TERM`].
pub const MAX_TERM_DAYS: i64 = 400;

const fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid constant date"),
    }
}

/// Inclusive start/end calendar dates bounding recurrence generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TermRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Days from `start` to `end`, negative for an inverted term.
    pub fn len_days(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_days()
    }

    /// Every date of the term in ascending order. Empty when `start > end`.
    pub fn days(&self) -> DayRange {
        DayRange::new(self.start, self.end)
    }
}

/// Iterator over consecutive dates, both ends included.
#[derive(Debug, Clone)]
pub struct DayRange(Option<NaiveDate>, NaiveDate);

impl DayRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self(Some(start), end)
    }

    pub fn empty() -> Self {
        Self(None, NaiveDate::MIN)
    }
}

impl Iterator for DayRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.0.filter(|date| *date <= self.1)?;
        self.0 = current.succ_opt();
        Some(current)
    }
}

/// Parses `"M/D-M/D"`, placing both endpoints in `year`.
pub fn try_resolve_term_range(range: &str, year: i32) -> Result<TermRange> {
    let warning = || ParseWarning::TermRange(range.to_owned());

    let (start, end) = range
        .split_once(|c: char| c == '-' || c == '\u{2013}')
        .ok_or_else(warning)?;

    let start = month_day(start, year).ok_or_else(warning)??;
    let end = month_day(end, year).ok_or_else(warning)??;

    Ok(TermRange { start, end })
}

/// Like [`try_resolve_term_range`], but never fails: missing or unreadable
/// input yields [`DEFAULT_TERM`].
pub fn resolve_term_range(range: Option<&str>, year: i32) -> TermRange {
    let Some(range) = range else {
        tracing::warn!("no term range given, using default term");
        return DEFAULT_TERM;
    };

    try_resolve_term_range(range, year).unwrap_or_else(|warning| {
        tracing::warn!(%warning, "using default term");
        DEFAULT_TERM
    })
}

/// `None` when the text is not `M/D`; `Some(Err)` when it is, but the date
/// does not exist in `year`.
fn month_day(raw: &str, year: i32) -> Option<Result<NaiveDate>> {
    let (month, day) = raw.trim().split_once('/')?;
    let month = month.trim().parse::<u32>().ok()?;
    let day = day.trim().parse::<u32>().ok()?;

    Some(
        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(ParseWarning::Date { year, month, day }),
    )
}
