//! Error taxonomy for the extraction pipeline.
//!
//! Only [`RequestError`] ever reaches a caller. Model and recovery failures
//! are folded into the extraction result, and per-item calendar failures are
//! reported next to the events that did get created.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

/// Failure talking to the language-model service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Connection failed, timed out, or the body could not be read.
    #[error("language model unavailable: {0}")]
    ServiceUnavailable(String),

    /// The service answered with a non-success status.
    #[error("language model rejected request (status {status}): {message}")]
    ServiceRejected { status: u16, message: String },
}

/// No structured object could be found in the model's reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not recover structured data from model response: {0}")]
pub struct RecoveryFailed(pub String);

/// Failure creating a single event on the remote calendar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("calendar access denied: {0}")]
    AccessDenied(String),

    #[error("calendar service error: {0}")]
    CalendarServiceError(String),
}

impl CalendarError {
    /// Short machine-readable tag used in JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            CalendarError::CalendarNotFound(_) => "calendar_not_found",
            CalendarError::AccessDenied(_) => "access_denied",
            CalendarError::CalendarServiceError(_) => "calendar_service_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            CalendarError::CalendarNotFound(_) => 400,
            CalendarError::AccessDenied(_) => 403,
            CalendarError::CalendarServiceError(_) => 500,
        }
    }

    /// Classify a non-success HTTP status from the calendar API.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            404 => CalendarError::CalendarNotFound(message),
            401 | 403 => CalendarError::AccessDenied(message),
            _ => CalendarError::CalendarServiceError(format!("status {}: {}", status, message)),
        }
    }
}

impl Serialize for CalendarError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CalendarError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Caller-facing contract violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("calendar service is not configured")]
    CalendarNotConfigured,

    /// Every calendar insert in the batch failed the same way.
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

impl RequestError {
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::MissingField(_) => 400,
            RequestError::CalendarNotConfigured => 500,
            RequestError::Calendar(err) => err.status_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_statuses_are_classified() {
        assert!(matches!(
            CalendarError::from_status(404, "gone".into()),
            CalendarError::CalendarNotFound(_)
        ));
        assert!(matches!(
            CalendarError::from_status(403, "no".into()),
            CalendarError::AccessDenied(_)
        ));
        assert!(matches!(
            CalendarError::from_status(502, "bad gateway".into()),
            CalendarError::CalendarServiceError(_)
        ));
    }

    #[test]
    fn calendar_error_serializes_kind_and_message() {
        let json = serde_json::to_value(CalendarError::CalendarNotFound("abc".into())).unwrap();
        assert_eq!(json["kind"], "calendar_not_found");
        assert_eq!(json["message"], "calendar not found: abc");
    }

    #[test]
    fn request_errors_map_to_http_statuses() {
        assert_eq!(RequestError::MissingField("course_outline").status_code(), 400);
        assert_eq!(RequestError::CalendarNotConfigured.status_code(), 500);
        assert_eq!(
            RequestError::from(CalendarError::AccessDenied("x".into())).status_code(),
            403
        );
        assert_eq!(
            RequestError::from(CalendarError::CalendarNotFound("x".into())).status_code(),
            400
        );
    }
}
