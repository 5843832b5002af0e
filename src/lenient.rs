//! Field deserializers for upstream schedule records.
//!
//! Records are hand-entered or scraped, so a field of the wrong type or with
//! an unreadable value is logged and treated as missing instead of failing
//! the whole payload.

use chrono::NaiveDate;
use serde::{de::IgnoredAny, Deserialize, Deserializer};

use crate::weekday::DaySpec;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDays {
    Code(String),
    List(Vec<Scalar>),
    Other(IgnoredAny),
}

fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Scalar>, D::Error> {
    Option::<Scalar>::deserialize(deserializer)
}

/// Strings pass through, numbers are written out, anything else is `None`.
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match scalar(deserializer)? {
        None => None,
        Some(Scalar::Text(text)) => Some(text),
        Some(Scalar::Integer(n)) => Some(n.to_string()),
        Some(Scalar::Float(n)) => Some(n.to_string()),
        Some(Scalar::Other(_)) => {
            tracing::warn!("ignoring non-text field value");
            None
        }
    })
}

/// Course ids arrive as strings or numbers.
pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(text(deserializer)?.unwrap_or_default())
}

pub fn title<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(text(deserializer)?.unwrap_or_default())
}

/// `YYYY-MM-DD`, optionally followed by a time part
/// (`2024-01-08T00:00:00`, `2024-01-08 00:00:00+00`).
pub fn date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let Some(raw) = text(deserializer)? else {
        return Ok(None);
    };

    let day = raw.trim().split(['T', ' ']).next().unwrap_or_default();
    match day.parse::<NaiveDate>() {
        Ok(date) => Ok(Some(date)),
        Err(err) => {
            tracing::warn!(raw, %err, "ignoring unreadable date");
            Ok(None)
        }
    }
}

pub fn year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    let year = match scalar(deserializer)? {
        None => return Ok(None),
        Some(Scalar::Integer(n)) => i32::try_from(n).ok(),
        Some(Scalar::Text(text)) => text.trim().parse().ok(),
        Some(Scalar::Float(n)) if n.fract() == 0.0 => i32::try_from(n as i64).ok(),
        Some(_) => None,
    };

    if year.is_none() {
        tracing::warn!("ignoring unreadable year");
    }
    Ok(year)
}

/// Time strings pass through to the wall-clock parser. Integers are read as
/// military time, so `900` is `9:00` and `1430` is `14:30`.
pub fn time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match scalar(deserializer)? {
        None => None,
        Some(Scalar::Text(text)) => Some(text),
        Some(Scalar::Integer(n)) if (0..2400).contains(&n) && n % 100 < 60 => {
            Some(format!("{}:{:02}", n / 100, n % 100))
        }
        Some(_) => {
            tracing::warn!("ignoring unreadable time");
            None
        }
    })
}

/// A code string, or a list whose non-string entries are dropped.
pub fn days<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DaySpec, D::Error> {
    Ok(match Option::<RawDays>::deserialize(deserializer)? {
        None => DaySpec::default(),
        Some(RawDays::Code(code)) => DaySpec::Code(code),
        Some(RawDays::List(entries)) => DaySpec::Names(
            entries
                .into_iter()
                .filter_map(|entry| match entry {
                    Scalar::Text(name) => Some(name),
                    _ => {
                        tracing::warn!("dropping non-text day entry");
                        None
                    }
                })
                .collect(),
        ),
        Some(RawDays::Other(_)) => {
            tracing::warn!("ignoring unreadable days, course has no meeting days");
            DaySpec::default()
        }
    })
}
