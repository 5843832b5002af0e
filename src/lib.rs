//! Turns course meeting patterns ("MWF 9:00am-9:50am, Jan 8 to May 24") into
//! the concrete, dated occurrences a calendar view draws.
//!
//! Materialization never fails. Unreadable days, times or term dates are
//! logged through `tracing` and replaced by defaults, so one badly entered
//! course cannot blank out a whole calendar.

pub mod calendar;
pub mod cli;
pub mod clock;
pub mod color;
pub mod error;
mod lenient;
pub mod schedule;
pub mod server;
pub mod term;
pub mod weekday;

pub use calendar::Calendar;
pub use clock::{parse_wall_clock_time, try_parse_wall_clock_time};
pub use color::color_for;
pub use error::ParseWarning;
pub use schedule::{materialize, materialize_all, CalendarOccurrence, CourseSchedule, Occurrences};
pub use term::{resolve_term_range, try_resolve_term_range, TermRange, MAX_TERM_DAYS};
pub use weekday::{parse_weekdays, DaySet, DaySpec};
