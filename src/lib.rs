//! Syllabus Calendar
//!
//! Reads a course outline, asks Gemini for exam and assignment dates, and
//! turns the answer into Google Calendar events or an iCalendar file.

pub mod calendar;
pub mod config;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod preprocess;

pub use config::Config;
pub use error::{CalendarError, ModelError, RecoveryFailed, RequestError};
pub use model::{
    Category, ExtractedItem, ExtractionRequest, ExtractionResult, MaterializedEvent,
    NormalizedEvent, ScheduleEntry,
};
pub use pipeline::{Extraction, FileResponse, Pipeline, RemoteResponse};
