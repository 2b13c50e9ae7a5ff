pub mod calendar;
pub mod course;

pub use calendar::{
    CalendarEvent, CalendarExtraction, EventCategory, calendar_config, extract_calendar_events,
};
pub use course::{Course, CourseExtraction, course_config, extract_courses};

/// The portal's upload screens show one warning banner, not a list.
pub(crate) fn collapse_errors(errors: &[String]) -> Option<String> {
    if errors.is_empty() {
        None
    } else {
        Some(errors.join("; "))
    }
}
