use chrono::NaiveDateTime;
use ics::{
    escape_text,
    properties::{Description, DtEnd, DtStart, Location, Summary},
};
use serde::Serialize;

use crate::schedule::{materialize_all, CalendarOccurrence, CourseSchedule};

/// A named set of occurrences, ready to be sent to a calendar view or
/// exported as iCalendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calendar {
    pub name: String,
    pub occurrences: Vec<CalendarOccurrence>,
}

impl Calendar {
    pub fn from_schedules<S: Into<String>>(name: S, schedules: &[CourseSchedule]) -> Self {
        Self {
            name: name.into(),
            occurrences: materialize_all(schedules),
        }
    }

    /// Times are floating local times, so no VTIMEZONE is emitted.
    #[must_use]
    pub fn to_ics(&self) -> ics::ICalendar<'_> {
        let mut icalendar = ics::ICalendar::new("2.0", escape_text(self.name.as_str()));

        for occurrence in &self.occurrences {
            icalendar.add_event(occurrence.to_ics());
        }

        icalendar
    }
}

impl CalendarOccurrence {
    #[must_use]
    pub fn to_ics(&self) -> ics::Event<'_> {
        let start = ics_datetime(self.start);
        let end = ics_datetime(self.end);

        let mut ics_event = ics::Event::new(escape_text(self.id.as_str()), start.clone());

        ics_event.push(DtStart::new(start));
        ics_event.push(DtEnd::new(end));
        ics_event.push(Summary::new(escape_text(self.title.as_str())));

        if let Some(location) = &self.location {
            ics_event.push(Location::new(escape_text(location.as_str())));
        }

        if let Some(instructor) = &self.instructor {
            ics_event.push(Description::new(escape_text(format!(
                "Instructor: {instructor}"
            ))));
        }

        ics_event
    }
}

fn ics_datetime(datetime: NaiveDateTime) -> String {
    datetime.format("%Y%m%dT%H%M%S").to_string()
}
