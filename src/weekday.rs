use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Recurring meeting days as they arrive from upstream records.
///
/// Either a compact code string (`"MWF"`, `"TR"`, `"Asynchronous"`) or a list
/// of day names (`["Mon", "Wed"]`, `["Tuesday", "Thursday"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DaySpec {
    Code(String),
    Names(Vec<String>),
}

impl Default for DaySpec {
    fn default() -> Self {
        DaySpec::Code(String::new())
    }
}

impl DaySpec {
    pub fn weekdays(&self) -> DaySet {
        parse_weekdays(self)
    }
}

/// Canonical set of weekdays, iterated Monday first.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DaySet(u8);

impl DaySet {
    pub const fn new() -> Self {
        DaySet(0)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> {
        let set = *self;
        WEEK.into_iter().filter(move |day| set.contains(*day))
    }
}

impl FromIterator<Weekday> for DaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = DaySet::new();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl fmt::Debug for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Resolves a [`DaySpec`] into the weekdays it names.
///
/// Unknown tokens are dropped, so a schedule with nothing recognizable (an
/// asynchronous course, say) yields an empty set.
pub fn parse_weekdays(days: &DaySpec) -> DaySet {
    let mut set = DaySet::new();

    match days {
        DaySpec::Code(code) => read_tokens(code, &mut set),
        DaySpec::Names(names) => {
            for name in names {
                read_tokens(name, &mut set);
            }
        }
    }

    set
}

fn read_tokens(raw: &str, set: &mut DaySet) {
    for token in raw
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|token| !token.is_empty())
    {
        if let Ok(day) = token.parse::<Weekday>() {
            set.insert(day);
            continue;
        }

        // Mixed-case tokens are words: "Tu", "Thurs", or prose such as
        // "Asynchronous". Only all-caps tokens are read as codes.
        if token.chars().any(|c| c.is_ascii_lowercase()) {
            match weekday_from_abbreviation(token) {
                Some(day) => set.insert(day),
                None => tracing::debug!(token, "dropping unrecognized day token"),
            }
            continue;
        }

        for c in token.chars() {
            match weekday_from_code(c) {
                Some(day) => set.insert(day),
                None => tracing::debug!(code = %c, "dropping unrecognized day code"),
            }
        }
    }
}

/// Single-letter codes. `R` and `U` keep Thursday and Sunday apart from
/// Tuesday and Saturday.
pub fn weekday_from_code(code: char) -> Option<Weekday> {
    match code {
        'M' => Some(Weekday::Mon),
        'T' => Some(Weekday::Tue),
        'W' => Some(Weekday::Wed),
        'R' => Some(Weekday::Thu),
        'F' => Some(Weekday::Fri),
        'S' => Some(Weekday::Sat),
        'U' => Some(Weekday::Sun),
        _ => None,
    }
}

fn weekday_from_abbreviation(word: &str) -> Option<Weekday> {
    match word.to_ascii_lowercase().as_str() {
        "mo" => Some(Weekday::Mon),
        "tu" | "tues" => Some(Weekday::Tue),
        "we" | "weds" => Some(Weekday::Wed),
        "th" | "thur" | "thurs" => Some(Weekday::Thu),
        "fr" => Some(Weekday::Fri),
        "sa" => Some(Weekday::Sat),
        "su" => Some(Weekday::Sun),
        _ => None,
    }
}
