use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;

use crate::calendar::google::{CalendarService, EventBody, EventDate};
use crate::error::CalendarError;
use crate::model::{Category, MaterializedEvent, NormalizedEvent};

const DESCRIPTION_HEADER: &str = "Auto-generated from course outline.";

/// Free-text description shared by remote events and calendar files.
pub fn description_text(event: &NormalizedEvent) -> String {
    match event.description.as_deref().map(str::trim) {
        Some(extra) if !extra.is_empty() => format!("{}\n{}", DESCRIPTION_HEADER, extra),
        _ => DESCRIPTION_HEADER.to_string(),
    }
}

/// Exclusive end date of a one-day, all-day event.
pub fn end_date(event: &NormalizedEvent) -> NaiveDate {
    event.due_date.succ_opt().unwrap_or(event.due_date)
}

pub fn event_body(event: &NormalizedEvent) -> EventBody {
    EventBody {
        summary: event.summary(),
        description: description_text(event),
        start: EventDate {
            date: event.due_date.format("%Y-%m-%d").to_string(),
        },
        end: EventDate {
            date: end_date(event).format("%Y-%m-%d").to_string(),
        },
        color_id: event.category.color_id().to_string(),
    }
}

/// An event the calendar refused to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedEvent {
    #[serde(rename = "type")]
    pub category: Category,
    pub name: String,
    pub due_date: NaiveDate,
    pub error: CalendarError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    pub created: Vec<MaterializedEvent>,
    pub failures: Vec<FailedEvent>,
}

/// Create every event on `calendar_id`, one at a time and in order. A failed
/// insert is recorded and the rest of the batch still goes ahead.
pub async fn materialize_remote<C>(
    calendar: &C,
    calendar_id: &str,
    events: &[NormalizedEvent],
) -> MaterializeReport
where
    C: CalendarService + ?Sized,
{
    let mut report = MaterializeReport::default();

    for event in events {
        match calendar.insert_event(calendar_id, &event_body(event)).await {
            Ok(created) => {
                info!("Created '{}' on {}", event.summary(), event.due_date);
                report.created.push(MaterializedEvent {
                    category: event.category,
                    name: event.name.clone(),
                    due_date: event.due_date,
                    external_link: created.html_link,
                });
            }
            Err(error) => {
                warn!("Failed to create '{}': {}", event.summary(), error);
                report.failures.push(FailedEvent {
                    category: event.category,
                    name: event.name.clone(),
                    due_date: event.due_date,
                    error,
                });
            }
        }
    }

    info!(
        "Materialized {} events, {} failed",
        report.created.len(),
        report.failures.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::google::CreatedEvent;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records inserts and fails any whose summary is listed.
    #[derive(Default)]
    struct RecordingCalendar {
        inserted: Mutex<Vec<(String, EventBody)>>,
        failing: Vec<(&'static str, CalendarError)>,
    }

    #[async_trait]
    impl CalendarService for RecordingCalendar {
        async fn insert_event(
            &self,
            calendar_id: &str,
            body: &EventBody,
        ) -> Result<CreatedEvent, CalendarError> {
            self.inserted
                .lock()
                .unwrap()
                .push((calendar_id.to_string(), body.clone()));
            if let Some((_, err)) = self.failing.iter().find(|(s, _)| *s == body.summary) {
                return Err(err.clone());
            }
            Ok(CreatedEvent {
                id: Some("id".into()),
                html_link: Some(format!("https://calendar.example/{}", body.start.date)),
            })
        }
    }

    fn event(category: Category, name: &str, y: i32, m: u32, d: u32) -> NormalizedEvent {
        NormalizedEvent {
            category,
            name: name.to_string(),
            due_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            description: None,
        }
    }

    #[test]
    fn body_is_all_day_with_category_color() {
        let mut exam = event(Category::Exam, "Final", 2025, 12, 31);
        exam.description = Some("Room 101".into());

        let body = event_body(&exam);

        assert_eq!(body.summary, "Exam: Final");
        assert_eq!(body.start.date, "2025-12-31");
        assert_eq!(body.end.date, "2026-01-01");
        assert_eq!(body.color_id, "11");
        assert!(body.description.ends_with("\nRoom 101"));

        let assignment = event_body(&event(Category::Assignment, "A1", 2025, 1, 1));
        assert_ne!(assignment.color_id, body.color_id);
        assert_eq!(assignment.description, DESCRIPTION_HEADER);
    }

    #[tokio::test]
    async fn creates_events_in_order() {
        let calendar = RecordingCalendar::default();
        let events = vec![
            event(Category::Exam, "Midterm", 2025, 10, 10),
            event(Category::Assignment, "A1", 2025, 10, 20),
        ];

        let report = materialize_remote(&calendar, "primary", &events).await;

        assert!(report.failures.is_empty());
        assert_eq!(report.created.len(), 2);
        assert_eq!(report.created[0].name, "Midterm");
        assert_eq!(
            report.created[1].external_link.as_deref(),
            Some("https://calendar.example/2025-10-20")
        );

        let inserted = calendar.inserted.lock().unwrap();
        let summaries: Vec<_> = inserted.iter().map(|(_, b)| b.summary.as_str()).collect();
        assert_eq!(summaries, ["Exam: Midterm", "Assignment: A1"]);
        assert!(inserted.iter().all(|(id, _)| id == "primary"));
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_batch() {
        let calendar = RecordingCalendar {
            failing: vec![(
                "Exam: Quiz",
                CalendarError::AccessDenied("read-only calendar".into()),
            )],
            ..Default::default()
        };
        let events = vec![
            event(Category::Exam, "Quiz", 2025, 9, 1),
            event(Category::Exam, "Final", 2025, 12, 1),
        ];

        let report = materialize_remote(&calendar, "primary", &events).await;

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].name, "Final");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "Quiz");
        assert!(matches!(report.failures[0].error, CalendarError::AccessDenied(_)));
    }
}
