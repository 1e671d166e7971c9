//! Turning normalized events into calendar entries, either on a remote
//! Google calendar or as a portable iCalendar document.

mod google;
mod ics;
mod materialize;

pub use self::google::{CalendarService, CreatedEvent, EventBody, EventDate, GoogleCalendarClient};
pub use self::ics::{calendar_document, calendar_document_at, PRODID};
pub use self::materialize::{
    description_text, end_date, event_body, materialize_remote, FailedEvent, MaterializeReport,
};
