//! Request-level entry points: validate the request, extract, normalize and
//! materialize, then shape the response the HTTP layer hands back.

use std::borrow::Cow;

use log::info;
use serde::Serialize;

use crate::calendar::{calendar_document, materialize_remote, CalendarService, FailedEvent};
use crate::error::RequestError;
use crate::extract::Extractor;
use crate::gemini::LanguageModel;
use crate::model::{ExtractionRequest, ExtractionResult, MaterializedEvent, NormalizedEvent};
use crate::normalize::normalize;
use crate::preprocess::decode_form_text;

pub const CALENDAR_MEDIA_TYPE: &str = "text/calendar";
pub const CALENDAR_FILENAME: &str = "course_dates.ics";

/// What came out of the model, before anything is materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub result: ExtractionResult,
    pub events: Vec<NormalizedEvent>,
    pub dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteResponse {
    pub success: bool,
    pub parsed_data: ExtractionResult,
    pub calendar_events: Vec<MaterializedEvent>,
    pub failures: Vec<FailedEvent>,
    pub dropped_items: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResponse {
    pub media_type: &'static str,
    pub filename: &'static str,
    pub document: String,
    pub parsed_data: ExtractionResult,
    pub dropped_items: usize,
}

struct RemoteCalendar {
    service: Box<dyn CalendarService>,
    default_calendar_id: Option<String>,
}

pub struct Pipeline<M> {
    extractor: Extractor<M>,
    calendar: Option<RemoteCalendar>,
}

impl<M: LanguageModel> Pipeline<M> {
    pub fn new(model: M) -> Self {
        Self {
            extractor: Extractor::new(model),
            calendar: None,
        }
    }

    pub fn with_calendar(
        mut self,
        service: Box<dyn CalendarService>,
        default_calendar_id: Option<String>,
    ) -> Self {
        self.calendar = Some(RemoteCalendar {
            service,
            default_calendar_id,
        });
        self
    }

    pub async fn extract(&self, request: &ExtractionRequest) -> Result<Extraction, RequestError> {
        let outline = request
            .outline_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .ok_or(RequestError::MissingField("course_outline"))?;
        let outline = if request.form_encoded {
            decode_form_text(outline)
        } else {
            Cow::Borrowed(outline)
        };
        info!("Extracting from outline of {} bytes", outline.len());

        let result = self.extractor.extract(&outline).await;
        let normalized = normalize(result.items());

        Ok(Extraction {
            result,
            events: normalized.events,
            dropped: normalized.dropped,
        })
    }

    /// Create one calendar event per exam and assignment.
    ///
    /// Individual insert failures are reported alongside the created events.
    /// Only when every insert fails does the request itself fail, with the
    /// first item's error.
    pub async fn run_remote(
        &self,
        request: &ExtractionRequest,
    ) -> Result<RemoteResponse, RequestError> {
        let calendar = self
            .calendar
            .as_ref()
            .ok_or(RequestError::CalendarNotConfigured)?;
        let calendar_id = request
            .target_calendar_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .or(calendar.default_calendar_id.as_deref())
            .ok_or(RequestError::MissingField("calendar_id"))?;

        let extraction = self.extract(request).await?;
        let report =
            materialize_remote(calendar.service.as_ref(), calendar_id, &extraction.events).await;

        if let (true, Some(failure)) = (report.created.is_empty(), report.failures.first()) {
            return Err(failure.error.clone().into());
        }

        Ok(RemoteResponse {
            success: true,
            parsed_data: extraction.result,
            calendar_events: report.created,
            failures: report.failures,
            dropped_items: extraction.dropped,
        })
    }

    /// Render the extracted exams and assignments as an iCalendar file.
    pub async fn run_file(&self, request: &ExtractionRequest) -> Result<FileResponse, RequestError> {
        let extraction = self.extract(request).await?;

        Ok(FileResponse {
            media_type: CALENDAR_MEDIA_TYPE,
            filename: CALENDAR_FILENAME,
            document: calendar_document(&extraction.events),
            parsed_data: extraction.result,
            dropped_items: extraction.dropped,
        })
    }
}
