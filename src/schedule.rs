use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::clock::{parse_wall_clock_time_or, DEFAULT_END_TIME, DEFAULT_START_TIME};
use crate::color::{color_for, TEXT_COLOR};
use crate::lenient;
use crate::term::{resolve_term_range, DayRange, TermRange, DEFAULT_TERM, MAX_TERM_DAYS};
use crate::weekday::{DaySet, DaySpec};

/// A course's recurring meeting pattern, normalized from whatever shape the
/// upstream record had.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSchedule {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::title")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::days")]
    pub days: DaySpec,
    #[serde(default, deserialize_with = "lenient::time")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::time")]
    pub end_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub end_date: Option<NaiveDate>,
    /// `"M/D-M/D"`, used for whichever of `start_date`/`end_date` is missing.
    #[serde(default, deserialize_with = "lenient::text")]
    pub date_range: Option<String>,
    #[serde(default, deserialize_with = "lenient::year")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub instructor: Option<String>,
}

/// One concrete, display-only meeting of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarOccurrence {
    /// `{course id}-{weekday}-{date}`, stable across regenerations.
    pub id: String,
    pub calendar_id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    pub color: &'static str,
    pub background_color: &'static str,
    pub border_color: &'static str,
    pub is_read_only: bool,
}

impl CourseSchedule {
    pub fn new(id: impl Into<String>, days: DaySpec) -> Self {
        Self {
            id: id.into(),
            days,
            ..Default::default()
        }
    }

    pub fn weekdays(&self) -> DaySet {
        self.days.weekdays()
    }

    /// Explicit dates win; a `date_range` with a `year` fills in whatever is
    /// missing; otherwise the default term does. A term longer than
    /// [`MAX_TERM_DAYS`] is replaced by the default term.
    pub fn term(&self) -> TermRange {
        let term = self.given_term();
        if term.len_days() > MAX_TERM_DAYS {
            tracing::warn!(course = %self.id, ?term, "term too long, using default term");
            return DEFAULT_TERM;
        }
        term
    }

    fn given_term(&self) -> TermRange {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            return TermRange::new(start, end);
        }

        let fallback = match (self.date_range.as_deref(), self.year) {
            (Some(range), Some(year)) => resolve_term_range(Some(range), year),
            (Some(range), None) => {
                tracing::warn!(course = %self.id, range, "term range has no year, using default term");
                DEFAULT_TERM
            }
            (None, _) => {
                tracing::warn!(course = %self.id, "missing term dates, using default term");
                DEFAULT_TERM
            }
        };

        TermRange::new(
            self.start_date.unwrap_or(fallback.start),
            self.end_date.unwrap_or(fallback.end),
        )
    }

    /// Lazily walks the term, yielding one occurrence per meeting day.
    pub fn occurrences(&self) -> Occurrences<'_> {
        Occurrences::new(self)
    }
}

/// Iterator returned by [`CourseSchedule::occurrences`].
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    schedule: &'a CourseSchedule,
    days: DaySet,
    dates: DayRange,
    start: NaiveTime,
    end: NaiveTime,
    color: &'static str,
    span: tracing::Span,
}

impl<'a> Occurrences<'a> {
    fn new(schedule: &'a CourseSchedule) -> Self {
        let span = tracing::debug_span!("materialize", course = %schedule.id);
        let entered = span.enter();

        let days = schedule.weekdays();
        let (dates, start, end) = if days.is_empty() {
            tracing::debug!("no meeting days, course contributes no occurrences");
            (DayRange::empty(), DEFAULT_START_TIME, DEFAULT_END_TIME)
        } else {
            (
                schedule.term().days(),
                wall_clock(schedule.start_time.as_deref(), "start", DEFAULT_START_TIME),
                wall_clock(schedule.end_time.as_deref(), "end", DEFAULT_END_TIME),
            )
        };
        drop(entered);

        Self {
            schedule,
            days,
            dates,
            start,
            end,
            color: color_for(&schedule.id),
            span,
        }
    }

    fn occurrence_on(&self, date: NaiveDate) -> CalendarOccurrence {
        let schedule = self.schedule;

        CalendarOccurrence {
            id: format!("{}-{}-{date}", schedule.id, date.weekday()),
            calendar_id: schedule.id.clone(),
            title: schedule.title.clone(),
            start: date.and_time(self.start),
            end: date.and_time(self.end),
            location: schedule.location.clone(),
            instructor: schedule.instructor.clone(),
            color: TEXT_COLOR,
            background_color: self.color,
            border_color: self.color,
            is_read_only: true,
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = CalendarOccurrence;

    fn next(&mut self) -> Option<Self::Item> {
        let _entered = self.span.enter();

        let days = self.days;
        let date = self.dates.find(|date| days.contains(date.weekday()))?;
        tracing::trace!(%date, "yielding occurrence");
        Some(self.occurrence_on(date))
    }
}

fn wall_clock(raw: Option<&str>, which: &str, default: NaiveTime) -> NaiveTime {
    match raw {
        Some(raw) => parse_wall_clock_time_or(raw, default),
        None => {
            tracing::warn!(which, "missing time, using default");
            default
        }
    }
}

/// Every meeting of one course, ascending by date. Never fails: bad input
/// degrades to defaults or to no occurrences at all.
pub fn materialize(schedule: &CourseSchedule) -> Vec<CalendarOccurrence> {
    schedule.occurrences().collect()
}

/// Occurrences of all courses, course by course. Courses meeting at the same
/// time all keep their occurrences.
pub fn materialize_all(schedules: &[CourseSchedule]) -> Vec<CalendarOccurrence> {
    schedules
        .iter()
        .flat_map(CourseSchedule::occurrences)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn course(days: &str) -> CourseSchedule {
        CourseSchedule {
            id: "bio-101".into(),
            title: "Biology".into(),
            days: DaySpec::Code(days.into()),
            start_time: Some("1:00pm".into()),
            end_time: Some("2:15pm".into()),
            start_date: Some(ymd(2024, 1, 8)),
            end_date: Some(ymd(2024, 1, 14)),
            location: Some("Lab 2".into()),
            ..Default::default()
        }
    }

    #[test]
    fn occurrence_carries_course_metadata() {
        let occurrences = materialize(&course("W"));
        assert_eq!(occurrences.len(), 1);

        let occurrence = &occurrences[0];
        assert_eq!(occurrence.id, "bio-101-Wed-2024-01-10");
        assert_eq!(occurrence.calendar_id, "bio-101");
        assert_eq!(occurrence.title, "Biology");
        assert_eq!(occurrence.start, ymd(2024, 1, 10).and_hms_opt(13, 0, 0).unwrap());
        assert_eq!(occurrence.end, ymd(2024, 1, 10).and_hms_opt(14, 15, 0).unwrap());
        assert_eq!(occurrence.location.as_deref(), Some("Lab 2"));
        assert_eq!(occurrence.background_color, color_for("bio-101"));
        assert_eq!(occurrence.border_color, occurrence.background_color);
        assert_eq!(occurrence.color, TEXT_COLOR);
        assert!(occurrence.is_read_only);
    }

    #[test]
    fn iterator_is_lazy_and_ordered() {
        let mut schedule = course("MTWRFSU");
        schedule.end_date = Some(ymd(2024, 12, 31));

        let first: Vec<_> = schedule.occurrences().take(3).map(|o| o.start.date()).collect();
        assert_eq!(first, [ymd(2024, 1, 8), ymd(2024, 1, 9), ymd(2024, 1, 10)]);
    }

    #[test]
    fn inverted_term_is_empty() {
        let mut schedule = course("MTWRF");
        schedule.start_date = Some(ymd(2024, 2, 1));
        schedule.end_date = Some(ymd(2024, 1, 1));
        assert!(materialize(&schedule).is_empty());
    }

    #[test_log::test]
    fn unreadable_times_use_default_window() {
        let mut schedule = course("M");
        schedule.start_time = Some("noonish".into());
        schedule.end_time = None;

        let occurrence = &materialize(&schedule)[0];
        assert_eq!(occurrence.start.time(), DEFAULT_START_TIME);
        assert_eq!(occurrence.end.time(), DEFAULT_END_TIME);
    }

    #[test_log::test]
    fn term_precedence() {
        let mut schedule = course("M");
        schedule.date_range = Some("3/1-3/31".into());
        schedule.year = Some(2024);
        assert_eq!(schedule.term(), TermRange::new(ymd(2024, 1, 8), ymd(2024, 1, 14)));

        schedule.end_date = None;
        assert_eq!(schedule.term(), TermRange::new(ymd(2024, 1, 8), ymd(2024, 3, 31)));

        schedule.start_date = None;
        assert_eq!(schedule.term(), TermRange::new(ymd(2024, 3, 1), ymd(2024, 3, 31)));

        schedule.year = None;
        assert_eq!(schedule.term(), DEFAULT_TERM);

        schedule.date_range = None;
        assert_eq!(schedule.term(), DEFAULT_TERM);
    }

    #[test]
    fn deserializes_upstream_shapes() {
        let schedule: CourseSchedule = serde_json::from_str(
            r#"{
                "id": 42,
                "title": "Algebra I",
                "days": ["Mon", "Wed"],
                "startTime": "09:00",
                "endTime": "09:50",
                "startDate": "2024-01-08",
                "endDate": "2024-01-19",
                "instructor": "Ms. Ortiz"
            }"#,
        )
        .unwrap();

        assert_eq!(schedule.id, "42");
        assert_eq!(schedule.days, DaySpec::Names(vec!["Mon".into(), "Wed".into()]));
        assert_eq!(schedule.start_date, Some(ymd(2024, 1, 8)));
        assert_eq!(schedule.location, None);
        assert_eq!(materialize(&schedule).len(), 4);

        let schedule: CourseSchedule =
            serde_json::from_str(r#"{"id": "art", "days": null}"#).unwrap();
        assert_eq!(schedule.days, DaySpec::default());
        assert!(materialize(&schedule).is_empty());
    }

    #[test_log::test]
    fn tolerates_garbled_fields() {
        let schedule: CourseSchedule = serde_json::from_str(
            r#"{
                "id": 7,
                "title": null,
                "days": ["Tue", 3, null, "Thu"],
                "startTime": 900,
                "endTime": 1050,
                "startDate": "2024-01-08T00:00:00Z",
                "endDate": "",
                "dateRange": "1/8-1/18",
                "year": "2024",
                "location": {"room": 12},
                "instructor": 3
            }"#,
        )
        .unwrap();

        assert_eq!(schedule.id, "7");
        assert_eq!(schedule.title, "");
        assert_eq!(schedule.days, DaySpec::Names(vec!["Tue".into(), "Thu".into()]));
        assert_eq!(schedule.start_time.as_deref(), Some("9:00"));
        assert_eq!(schedule.end_time.as_deref(), Some("10:50"));
        assert_eq!(schedule.start_date, Some(ymd(2024, 1, 8)));
        assert_eq!(schedule.end_date, None);
        assert_eq!(schedule.year, Some(2024));
        assert_eq!(schedule.location, None);
        assert_eq!(schedule.instructor.as_deref(), Some("3"));

        let occurrences = materialize(&schedule);
        assert_eq!(occurrences.len(), 4);
        assert_eq!(occurrences[3].end, ymd(2024, 1, 18).and_hms_opt(10, 50, 0).unwrap());
    }

    #[test_log::test]
    fn unreadable_field_values_count_as_missing() {
        let schedule: CourseSchedule = serde_json::from_str(
            r#"{
                "id": "geo",
                "days": {"mon": true},
                "startTime": 2500,
                "endTime": [10],
                "startDate": "next monday",
                "endDate": 20240119,
                "year": "MMXXIV"
            }"#,
        )
        .unwrap();

        assert_eq!(schedule.days, DaySpec::default());
        assert_eq!(schedule.start_time, None);
        assert_eq!(schedule.end_time, None);
        assert_eq!(schedule.start_date, None);
        assert_eq!(schedule.end_date, None);
        assert_eq!(schedule.year, None);
        assert!(materialize(&schedule).is_empty());
    }

    #[test_log::test]
    fn overlong_term_uses_default_term() {
        let mut schedule = course("MTWRFSU");
        schedule.start_date = Some(NaiveDate::MIN);
        schedule.end_date = Some(NaiveDate::MAX);
        assert_eq!(schedule.term(), DEFAULT_TERM);
        assert_eq!(materialize(&schedule).len(), 284);

        schedule.start_date = Some(ymd(2024, 1, 1));
        schedule.end_date = Some(ymd(2025, 2, 4));
        assert_eq!(schedule.term().len_days(), MAX_TERM_DAYS);
        assert_eq!(schedule.term().start, ymd(2024, 1, 1));
    }

    #[test]
    fn iteration_logs_inside_course_span() {
        use std::io;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let schedule = course("W");
        tracing::subscriber::with_default(subscriber, || {
            let mut occurrences = schedule.occurrences();
            assert!(occurrences.next().is_some());
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let yielded = logs
            .lines()
            .find(|line| line.contains("yielding occurrence"))
            .unwrap();
        assert!(yielded.contains("materialize{course=bio-101}"), "{yielded}");
    }

    #[test]
    fn serializes_for_calendar_widget() {
        let occurrence = &materialize(&course("F"))[0];
        let json = serde_json::to_value(occurrence).unwrap();

        assert_eq!(json["id"], "bio-101-Fri-2024-01-12");
        assert_eq!(json["calendarId"], "bio-101");
        assert_eq!(json["start"], "2024-01-12T13:00:00");
        assert_eq!(json["end"], "2024-01-12T14:15:00");
        assert_eq!(json["location"], "Lab 2");
        assert_eq!(json["isReadOnly"], true);
        assert!(json.get("instructor").is_none());
        assert!(json["backgroundColor"].as_str().unwrap().starts_with('#'));
    }
}
