//! Data model shared by every pipeline stage.
//!
//! Everything here lives for a single request and is dropped once the
//! response has been produced.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of assessment an outline item describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Exam,
    Assignment,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Exam => "Exam",
            Category::Assignment => "Assignment",
        }
    }

    /// Google Calendar `colorId` used to tell categories apart.
    pub fn color_id(&self) -> &'static str {
        match self {
            Category::Exam => "11",
            Category::Assignment => "9",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    #[serde(rename = "course_outline", default)]
    pub outline_text: Option<String>,
    #[serde(rename = "calendar_id", default, skip_serializing_if = "Option::is_none")]
    pub target_calendar_id: Option<String>,
    /// Outline arrived as a `text/plain` form post and still carries `+`
    /// and `%XX` encoding.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub form_encoded: bool,
}

impl ExtractionRequest {
    pub fn new(outline_text: impl Into<String>) -> Self {
        Self {
            outline_text: Some(outline_text.into()),
            target_calendar_id: None,
            form_encoded: false,
        }
    }

    pub fn with_calendar(mut self, calendar_id: impl Into<String>) -> Self {
        self.target_calendar_id = Some(calendar_id.into());
        self
    }

    pub fn form_encoded(mut self) -> Self {
        self.form_encoded = true;
        self
    }
}

/// An exam or assignment as the model reported it. Nothing is validated yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExtractedItem {
    pub fn new(category: Category, name: &str, due_date: &str) -> Self {
        Self {
            category,
            name: Some(name.to_string()),
            due_date: Some(due_date.to_string()),
            description: None,
        }
    }
}

/// A recurring class meeting. Carried through for display only, never
/// turned into calendar events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub day_of_week: String,
    pub time: String,
}

/// Structured result of asking the model about an outline.
///
/// Always well formed: when the model could not be understood the
/// sequences are empty and `diagnostic` says why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub exams: Vec<ExtractedItem>,
    pub assignments: Vec<ExtractedItem>,
    pub schedule: Vec<ScheduleEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl ExtractionResult {
    pub fn degraded(diagnostic: String) -> Self {
        Self {
            diagnostic: Some(diagnostic),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exams.is_empty() && self.assignments.is_empty() && self.schedule.is_empty()
    }

    /// Exams followed by assignments, in the order the model listed them.
    pub fn items(&self) -> impl Iterator<Item = &ExtractedItem> {
        self.exams.iter().chain(self.assignments.iter())
    }
}

/// An item whose date has been checked to be a real calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub category: Category,
    pub name: String,
    pub due_date: NaiveDate,
    pub description: Option<String>,
}

impl NormalizedEvent {
    pub fn summary(&self) -> String {
        format!("{}: {}", self.category, self.name)
    }
}

/// A normalized event after it has been written somewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedEvent {
    #[serde(rename = "type")]
    pub category: Category,
    pub name: String,
    pub due_date: NaiveDate,
    #[serde(rename = "event_link", skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
}
